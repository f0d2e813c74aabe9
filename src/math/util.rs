use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use std::f64::consts::TAU;

/// Rotates a vector 90 degrees anti-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Rotates a vector 90 degrees clockwise.
pub fn rot270(vec: Vector2d) -> Vector2d {
    Vector2d::new(vec.y, -vec.x)
}

/// The unit vector pointing in the direction of `angle`, in radians.
pub fn unit_vector(angle: f64) -> Vector2d {
    let (sin, cos) = angle.sin_cos();
    Vector2d::new(cos, sin)
}

/// Wraps an angle into the range `[0, 2π)` using a floored modulo.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // `rem_euclid` can round up to exactly 2π for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Computes the squared distance between a point and the line segment `start..end`.
///
/// The closest point is clamped to the segment, so the distance is measured
/// to an end point when the projection falls outside of it.
/// A zero-length segment is treated as a single point.
pub fn point_segment_dist_sq(point: Point2d, start: Point2d, end: Point2d) -> f64 {
    let seg = end - start;
    let len_sq = seg.magnitude2();
    if len_sq == 0.0 {
        return point.distance2(start);
    }
    let t = ((point - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance2(start + t * seg)
}
