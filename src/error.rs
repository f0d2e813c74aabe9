use thiserror::Error;

/// Errors raised while loading or validating a [Track](crate::Track).
#[derive(Error, Debug)]
pub enum TrackError {
    /// The track file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the track file was malformed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The track width is not a positive number.
    #[error("Invalid track width: {0}")]
    InvalidWidth(f64),

    /// A boundary has fewer than two points, so it has no segments.
    #[error("The {side:?} boundary needs at least 2 points, got {count}")]
    TooFewPoints {
        side: crate::BoundarySide,
        count: usize,
    },

    /// The left and right boundaries have a different number of points.
    #[error("Left and right boundary point counts differ ({left} vs {right})")]
    BoundaryMismatch { left: usize, right: usize },
}
