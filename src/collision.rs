//! Detecting cars which have left the track.

use crate::car::Car;
use crate::math::{point_segment_dist_sq, rot270, Point2d};
use crate::quadtree::{Bounds, QuadTree};
use crate::track::{BoundarySegment, BoundarySide};
use arrayvec::ArrayVec;
use cgmath::prelude::*;
use log::debug;

/// The maximum number of boundary segments considered per collision check.
pub const MAX_COLLISION_CHECKS: usize = 128;

/// The car's bounding box is grown by this much when searching for nearby segments,
/// so the nearest boundary on each side is found even when it lies outside the box.
pub const COLLISION_PADDING: f64 = 2.5;

/// Computes the corners of a car in world space,
/// in the order front-right, back-right, back-left, front-left.
pub fn car_corners(car: &Car) -> [Point2d; 4] {
    let fwd = car.direction() * car.half_length();
    let right = rot270(car.direction()) * car.half_width();
    let pos = car.position();
    [
        pos + fwd + right,
        pos - fwd + right,
        pos - fwd - right,
        pos + fwd - right,
    ]
}

/// The closest boundary segment found so far on one side of a corner.
#[derive(Clone, Copy)]
struct Nearest<'a> {
    dist_sq: f64,
    segment: Option<&'a BoundarySegment>,
}

impl<'a> Nearest<'a> {
    const NONE: Self = Self {
        dist_sq: f64::INFINITY,
        segment: None,
    };

    fn offer(&mut self, corner: Point2d, segment: &'a BoundarySegment) {
        let dist_sq = point_segment_dist_sq(corner, segment.start, segment.end);
        if dist_sq < self.dist_sq {
            self.dist_sq = dist_sq;
            self.segment = Some(segment);
        }
    }

    /// Whether the corner lies on the outer side of the nearest segment.
    /// A corner with no nearby segment at all is considered off the track.
    fn is_wrong_side(&self, corner: Point2d) -> bool {
        match self.segment {
            Some(segment) => (corner - segment.start).dot(segment.normal) < 0.0,
            None => true,
        }
    }
}

/// Checks whether the car is still within the track boundaries.
///
/// Each corner of the car is tested against the nearest left and the nearest
/// right boundary segment. If any corner is on the wrong side of either,
/// the car is killed and `false` is returned. Otherwise the car is untouched.
///
/// Only segments within [COLLISION_PADDING] of the car's bounding box are
/// considered, so a car further than that from either boundary is off the track.
pub fn check_car_collision(car: &mut Car, tree: &QuadTree) -> bool {
    check_car_collision_padded(car, tree, COLLISION_PADDING)
}

/// Checks whether the car is still within the track boundaries,
/// searching for boundary segments within `padding` of the car's bounding box.
/// [Read more](check_car_collision).
pub fn check_car_collision_padded(car: &mut Car, tree: &QuadTree, padding: f64) -> bool {
    let corners = car_corners(car);

    // Query with an inflated bounding box to find nearby segments
    let region = Bounds::from_points(&corners)
        .map(|b| b.inflate(padding))
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0));
    let mut nearby = ArrayVec::<BoundarySegment, MAX_COLLISION_CHECKS>::new();
    tree.query_region(&region, &mut nearby);

    let mut left = [Nearest::NONE; 4];
    let mut right = [Nearest::NONE; 4];
    for segment in nearby.iter().filter(|s| !s.is_degenerate()) {
        let nearest = match segment.side {
            BoundarySide::Left => &mut left,
            BoundarySide::Right => &mut right,
        };
        for (corner, nearest) in corners.iter().zip(nearest.iter_mut()) {
            nearest.offer(*corner, segment);
        }
    }

    let off_track = corners
        .iter()
        .zip(left.iter().zip(&right))
        .any(|(corner, (l, r))| l.is_wrong_side(*corner) || r.is_wrong_side(*corner));

    if off_track {
        debug!(
            "Car {:?} left the track at ({:.2}, {:.2})",
            car.id(),
            car.position().x,
            car.position().y
        );
        #[cfg(feature = "debug")]
        crate::debug::debug_crash(car.position(), &corners);
        car.kill();
        false
    } else {
        true
    }
}
