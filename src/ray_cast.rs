//! Casting rays against the track boundary.

use crate::math::{unit_vector, Point2d, Vector2d};
use crate::quadtree::{Bounds, QuadTree, QuadTreeNode};
use crate::track::BoundarySegment;
use crate::util::Interval;

/// Directions or determinants smaller than this are treated as zero.
const EPSILON: f64 = 1e-10;

/// The result of casting a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// The point where the ray hit a boundary.
    pub point: Point2d,
    /// The distance from the ray's origin to `point`.
    /// Meaningless if `hit` is false.
    pub distance: f64,
    /// Whether the ray hit a boundary.
    pub hit: bool,
}

impl RayHit {
    /// A ray which hit nothing within `max_distance`.
    fn miss(origin: Point2d, max_distance: f64) -> Self {
        Self {
            point: origin,
            distance: max_distance,
            hit: false,
        }
    }
}

/// A ray, with its direction as a unit vector.
#[derive(Clone, Copy)]
struct Ray {
    origin: Point2d,
    dir: Vector2d,
}

impl Ray {
    /// Performs a slab test of the ray against an axis-aligned rectangle,
    /// only considering the part of the ray up to `max_distance`.
    fn intersects_bounds(&self, bounds: &Bounds, max_distance: f64) -> bool {
        let axes = [
            (self.origin.x, self.dir.x, bounds.x_range()),
            (self.origin.y, self.dir.y, bounds.y_range()),
        ];
        let mut range = Interval::new(0.0, max_distance);
        for (origin, dir, slab) in axes {
            if dir.abs() > EPSILON {
                let entry_exit = Interval::spanning((slab.min - origin) / dir, (slab.max - origin) / dir);
                range = range.intersect(&entry_exit);
            } else if !slab.contains(origin) {
                return false;
            }
        }
        !range.is_empty()
    }

    /// Finds where the ray crosses a segment, if it does.
    fn intersect_segment(&self, segment: &BoundarySegment) -> Option<RayHit> {
        let seg = segment.end - segment.start;
        let det = self.dir.x * seg.y - self.dir.y * seg.x;
        if det.abs() < EPSILON {
            return None;
        }

        let to_start = segment.start - self.origin;
        // Distance along the ray
        let t = (to_start.x * seg.y - to_start.y * seg.x) / det;
        // Position along the segment, in [0, 1] if between the end points
        let s = (to_start.x * self.dir.y - to_start.y * self.dir.x) / det;

        if t >= 0.0 && Interval::new(0.0, 1.0).contains(s) {
            Some(RayHit {
                point: self.origin + t * self.dir,
                distance: t,
                hit: true,
            })
        } else {
            None
        }
    }

    /// Finds the closest hit within the node closer than `max_distance`.
    fn cast(&self, node: &QuadTreeNode, max_distance: f64) -> RayHit {
        let mut result = RayHit::miss(self.origin, max_distance);
        if !self.intersects_bounds(node.bounds(), max_distance) {
            return result;
        }

        if node.is_leaf() {
            for segment in node.segments() {
                if let Some(hit) = self.intersect_segment(segment) {
                    if hit.distance < result.distance {
                        result = hit;
                    }
                }
            }
        } else {
            for child in node.children() {
                let hit = self.cast(child, result.distance);
                if hit.hit && hit.distance < result.distance {
                    result = hit;
                }
            }
        }

        result
    }
}

/// Casts a ray through the quad-tree, returning the closest boundary hit
/// no further than `max_distance` from the origin.
///
/// # Parameters
/// * `tree` - The boundary quad-tree
/// * `origin` - The start of the ray
/// * `direction` - The direction of the ray in radians
/// * `max_distance` - The maximum length of the ray
pub fn cast_ray(tree: &QuadTree, origin: Point2d, direction: f64, max_distance: f64) -> RayHit {
    let ray = Ray {
        origin,
        dir: unit_vector(direction),
    };
    ray.cast(tree.root(), max_distance)
}
