//! Parser for the plain-text track format.
//!
//! ```text
//! WIDTH 3.5
//! SEGMENTS 1
//!
//! SEGMENT 0
//! CONTROL_POINTS 4
//! 0 0
//! 1 0
//! 2 0
//! 3 0
//!
//! LEFT_BOUNDARY 2
//! 0 -1.75
//! 3 -1.75
//!
//! RIGHT_BOUNDARY 2
//! 0 1.75
//! 3 1.75
//! ```
//!
//! Blank lines are ignored.

use super::Track;
use crate::error::TrackError;
use crate::math::Point2d;
use log::info;
use std::path::Path;
use std::str::FromStr;

/// The number of control points in each centre line segment.
const CONTROL_POINTS_PER_SEGMENT: usize = 4;

impl Track {
    /// Loads a track from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let track = contents.parse::<Track>()?;
        info!(
            "Loaded track {} ({} boundary points, length {:.2})",
            path.display(),
            track.left_boundary().len(),
            track.total_length()
        );
        Ok(track)
    }
}

impl FromStr for Track {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = Lines::new(s);

        let width = lines.keyword("WIDTH")?;
        let num_segments = lines.keyword("SEGMENTS")?;

        // Counts come from the file, so storage grows as entries are actually read
        let mut control_points = vec![];
        for _ in 0..num_segments {
            lines.header("SEGMENT")?;
            let count = lines.keyword::<usize>("CONTROL_POINTS")?;
            if count != CONTROL_POINTS_PER_SEGMENT {
                return Err(lines.error(format!(
                    "expected {} control points, got {}",
                    CONTROL_POINTS_PER_SEGMENT, count
                )));
            }
            control_points.push([lines.point()?, lines.point()?, lines.point()?, lines.point()?]);
        }

        let left = lines.boundary("LEFT_BOUNDARY")?;
        let right = lines.boundary("RIGHT_BOUNDARY")?;

        Track::new(width, left, right, control_points)
    }
}

/// A cursor over the non-blank lines of a track file.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    /// The 1-based number of the most recently read line.
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            inner: s.lines().enumerate(),
            line: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> TrackError {
        TrackError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    /// Reads the next non-blank line.
    fn next_line(&mut self) -> Result<&'a str, TrackError> {
        for (idx, line) in self.inner.by_ref() {
            self.line = idx + 1;
            let line = line.trim();
            if !line.is_empty() {
                return Ok(line);
            }
        }
        Err(self.error("unexpected end of file"))
    }

    /// Reads a line of the form `KEYWORD value`.
    fn keyword<T: FromStr>(&mut self, keyword: &str) -> Result<T, TrackError> {
        let line = self.next_line()?;
        let value = line
            .strip_prefix(keyword)
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .ok_or_else(|| self.error(format!("expected {}", keyword)))?;
        value
            .trim()
            .parse()
            .map_err(|_| self.error(format!("invalid value for {}: {:?}", keyword, value.trim())))
    }

    /// Reads a line starting with `keyword`, ignoring anything after it.
    fn header(&mut self, keyword: &str) -> Result<(), TrackError> {
        let line = self.next_line()?;
        match line.strip_prefix(keyword) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => Ok(()),
            _ => Err(self.error(format!("expected {}", keyword))),
        }
    }

    /// Reads a line of the form `x y`.
    fn point(&mut self) -> Result<Point2d, TrackError> {
        let line = self.next_line()?;
        let mut coords = line.split_whitespace().map(f64::from_str);
        match (coords.next(), coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y)), None) => Ok(Point2d::new(x, y)),
            _ => Err(self.error(format!("expected point coordinates, got {:?}", line))),
        }
    }

    /// Reads a boundary header followed by its points.
    fn boundary(&mut self, keyword: &str) -> Result<Vec<Point2d>, TrackError> {
        let count = self.keyword::<usize>(keyword)?;
        let mut points = vec![];
        for _ in 0..count {
            points.push(self.point()?);
        }
        Ok(points)
    }
}
