use crate::error::TrackError;
use crate::math::{rot90, Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod loader;

/// Which edge of the track a boundary belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundarySide {
    Left,
    Right,
}

/// A single edge of a track boundary polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundarySegment {
    /// The first end point.
    pub start: Point2d,
    /// The second end point.
    pub end: Point2d,
    /// A unit normal pointing towards the track interior.
    /// Zero if the segment has zero length.
    pub normal: Vector2d,
    /// The length of the segment.
    pub length: f64,
    /// The boundary the segment belongs to.
    pub side: BoundarySide,
}

/// A closed race track, bounded by a left and right polyline.
#[derive(Clone, Debug)]
pub struct Track {
    /// The lane width, for informational purposes.
    width: f64,
    /// The points of the left boundary.
    left: Vec<Point2d>,
    /// The points of the right boundary.
    right: Vec<Point2d>,
    /// The segments of the left boundary.
    left_segments: Vec<BoundarySegment>,
    /// The segments of the right boundary.
    right_segments: Vec<BoundarySegment>,
    /// The arc length along the left boundary at each of its points.
    cumulative_length: Vec<f64>,
    /// Control points of the cubic Bézier curves making up the centre line.
    control_points: Vec<[Point2d; 4]>,
}

impl BoundarySegment {
    /// Creates a boundary segment whose normal points towards `interior`.
    pub fn new(start: Point2d, end: Point2d, side: BoundarySide, interior: Point2d) -> Self {
        let dir = end - start;
        let length = dir.magnitude();
        let normal = if length > 0.0 {
            let normal = rot90(dir) / length;
            if (interior - start).dot(normal) < 0.0 {
                -normal
            } else {
                normal
            }
        } else {
            Vector2d::zero()
        };
        Self {
            start,
            end,
            normal,
            length,
            side,
        }
    }

    /// Whether the segment has (near) zero length and hence no valid normal.
    pub fn is_degenerate(&self) -> bool {
        self.length <= 1e-6
    }

    /// Whether the two segments have identical end points.
    pub fn same_ends(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Track {
    /// Creates a track from its left and right boundary points.
    ///
    /// # Parameters
    /// * `width` - The lane width, must be positive
    /// * `left` - The points of the left boundary
    /// * `right` - The points of the right boundary, one per left point
    /// * `control_points` - The centre line's Bézier control points, may be empty
    pub fn new(
        width: f64,
        left: Vec<Point2d>,
        right: Vec<Point2d>,
        control_points: Vec<[Point2d; 4]>,
    ) -> Result<Self, TrackError> {
        if !(width > 0.0) {
            return Err(TrackError::InvalidWidth(width));
        }
        for (side, points) in [(BoundarySide::Left, &left), (BoundarySide::Right, &right)] {
            if points.len() < 2 {
                return Err(TrackError::TooFewPoints {
                    side,
                    count: points.len(),
                });
            }
        }
        if left.len() != right.len() {
            return Err(TrackError::BoundaryMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let left_segments = Self::create_segments(&left, &right, BoundarySide::Left);
        let right_segments = Self::create_segments(&right, &left, BoundarySide::Right);

        let cumulative_length = std::iter::once(0.0)
            .chain(left.iter().tuple_windows().scan(0.0, |total, (a, b)| {
                *total += a.distance(*b);
                Some(*total)
            }))
            .collect();

        Ok(Self {
            width,
            left,
            right,
            left_segments,
            right_segments,
            cumulative_length,
            control_points,
        })
    }

    /// Creates the segments of one boundary, with normals facing the other boundary.
    fn create_segments(
        points: &[Point2d],
        opposite: &[Point2d],
        side: BoundarySide,
    ) -> Vec<BoundarySegment> {
        points
            .iter()
            .tuple_windows()
            .zip(opposite)
            .enumerate()
            .map(|(idx, ((start, end), interior))| {
                let segment = BoundarySegment::new(*start, *end, side, *interior);
                if segment.is_degenerate() {
                    warn!("{:?} boundary segment {} has zero length", side, idx);
                }
                segment
            })
            .collect()
    }

    /// The lane width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// The length of the track, measured along the left boundary.
    pub fn total_length(&self) -> f64 {
        self.cumulative_length.last().copied().unwrap_or(0.0)
    }

    /// The points of the left boundary.
    pub fn left_boundary(&self) -> &[Point2d] {
        &self.left
    }

    /// The points of the right boundary.
    pub fn right_boundary(&self) -> &[Point2d] {
        &self.right
    }

    /// The segments of the left boundary.
    pub fn left_segments(&self) -> &[BoundarySegment] {
        &self.left_segments
    }

    /// The segments of the right boundary.
    pub fn right_segments(&self) -> &[BoundarySegment] {
        &self.right_segments
    }

    /// All boundary segments, left followed by right.
    pub fn segments(&self) -> impl Iterator<Item = &BoundarySegment> {
        self.left_segments.iter().chain(&self.right_segments)
    }

    /// All boundary points, left followed by right.
    pub fn points(&self) -> impl Iterator<Item = &Point2d> {
        self.left.iter().chain(&self.right)
    }

    /// The arc length along the left boundary at each of its points.
    pub fn cumulative_length(&self) -> &[f64] {
        &self.cumulative_length
    }

    /// The centre line's Bézier control points.
    pub fn control_points(&self) -> &[[Point2d; 4]] {
        &self.control_points
    }

    /// Gets the index of the centre line sample closest to `point`,
    /// where each sample is the midpoint of a pair of boundary points.
    pub fn nearest_point_index(&self, point: Point2d) -> usize {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| l.midpoint(*r).distance2(point))
            .position_min_by(|a, b| a.total_cmp(b))
            .unwrap_or(0)
    }
}
