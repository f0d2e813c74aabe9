//! A quad-tree over the boundary segments of a track.

use crate::math::Point2d;
use crate::track::{BoundarySegment, Track};
use crate::util::Interval;
use arrayvec::ArrayVec;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The default maximum depth of the tree.
pub const MAX_DEPTH: usize = 10;

/// The default number of segments a node may hold before it is subdivided.
pub const MAX_SEGMENTS_PER_NODE: usize = 30;

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Configures how the quad-tree is subdivided.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuadTreeConfig {
    /// Nodes at this depth are never subdivided.
    pub max_depth: usize,
    /// Nodes holding at most this many segments are never subdivided.
    pub max_segments_per_node: usize,
}

/// A node of the quad-tree.
#[derive(Clone, Debug)]
pub struct QuadTreeNode {
    /// The region covered by the node.
    bounds: Bounds,
    /// The segments intersecting the node's region. Empty unless the node is a leaf.
    segments: Vec<BoundarySegment>,
    /// The bottom-left, bottom-right, top-left and top-right quadrants.
    children: [Option<Box<QuadTreeNode>>; 4],
}

/// A spatial index over track boundary segments.
///
/// The tree is immutable once built, so it can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct QuadTree {
    root: QuadTreeNode,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_segments_per_node: MAX_SEGMENTS_PER_NODE,
        }
    }
}

impl Bounds {
    /// Creates a new rectangle.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Computes the smallest rectangle containing all of the points.
    /// Returns `None` if there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2d>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(points.fold(init, |b, p| Self {
            min_x: f64::min(b.min_x, p.x),
            min_y: f64::min(b.min_y, p.y),
            max_x: f64::max(b.max_x, p.x),
            max_y: f64::max(b.max_y, p.y),
        }))
    }

    /// The bounding box of a segment.
    pub fn of_segment(segment: &BoundarySegment) -> Self {
        Self::from_intervals(
            Interval::spanning(segment.start.x, segment.end.x),
            Interval::spanning(segment.start.y, segment.end.y),
        )
    }

    fn from_intervals(x: Interval<f64>, y: Interval<f64>) -> Self {
        Self::new(x.min, y.min, x.max, y.max)
    }

    /// The extent of the rectangle along the x-axis.
    pub fn x_range(&self) -> Interval<f64> {
        Interval::new(self.min_x, self.max_x)
    }

    /// The extent of the rectangle along the y-axis.
    pub fn y_range(&self) -> Interval<f64> {
        Interval::new(self.min_y, self.max_y)
    }

    /// Grows the rectangle by `padding` on every side.
    pub fn inflate(&self, padding: f64) -> Self {
        Self::from_intervals(self.x_range().inflate(padding), self.y_range().inflate(padding))
    }

    /// Whether the point lies within the rectangle, including its edges.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x_range().contains(point.x) && self.y_range().contains(point.y)
    }

    /// Whether the two rectangles overlap, including touching edges.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x_range().overlaps(&other.x_range()) && self.y_range().overlaps(&other.y_range())
    }

    /// Conservatively tests whether a segment intersects the rectangle.
    ///
    /// The segment is accepted if either end point lies inside, or if its
    /// bounding box overlaps. This never rejects a true intersection,
    /// but accepts some segments which only pass near a corner.
    pub fn intersects_segment(&self, segment: &BoundarySegment) -> bool {
        self.contains(segment.start)
            || self.contains(segment.end)
            || self.overlaps(&Self::of_segment(segment))
    }

    /// Splits the rectangle into four equal quadrants:
    /// bottom-left, bottom-right, top-left and top-right.
    pub fn quadrants(&self) -> [Self; 4] {
        let mid_x = self.x_range().midpoint();
        let mid_y = self.y_range().midpoint();
        [
            Self::new(self.min_x, self.min_y, mid_x, mid_y),
            Self::new(mid_x, self.min_y, self.max_x, mid_y),
            Self::new(self.min_x, mid_y, mid_x, self.max_y),
            Self::new(mid_x, mid_y, self.max_x, self.max_y),
        ]
    }
}

impl QuadTreeNode {
    /// Recursively builds a node covering `bounds` from the given segments.
    fn build(
        bounds: Bounds,
        segments: &[BoundarySegment],
        depth: usize,
        config: &QuadTreeConfig,
    ) -> Self {
        if segments.len() <= config.max_segments_per_node || depth >= config.max_depth {
            return Self {
                bounds,
                segments: segments.to_vec(),
                children: Default::default(),
            };
        }

        let children = bounds.quadrants().map(|quadrant| {
            let contained = segments
                .iter()
                .filter(|segment| quadrant.intersects_segment(segment))
                .copied()
                .collect::<SmallVec<[BoundarySegment; 32]>>();
            if contained.is_empty() {
                None
            } else {
                Some(Box::new(Self::build(quadrant, &contained, depth + 1, config)))
            }
        });

        Self {
            bounds,
            segments: vec![],
            children,
        }
    }

    /// The region covered by the node.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The segments held by the node. Empty unless the node is a leaf.
    pub fn segments(&self) -> &[BoundarySegment] {
        &self.segments
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// The node's present children.
    pub fn children(&self) -> impl Iterator<Item = &QuadTreeNode> {
        self.children.iter().flatten().map(|child| &**child)
    }

    /// Finds the segments intersecting `region`, appending them to `results`
    /// until it is full. Segments already in `results` are not added again.
    pub fn query_region<const CAP: usize>(
        &self,
        region: &Bounds,
        results: &mut ArrayVec<BoundarySegment, CAP>,
    ) {
        if !self.bounds.overlaps(region) {
            return;
        }

        if self.is_leaf() {
            for segment in &self.segments {
                if results.is_full() {
                    return;
                }
                if region.intersects_segment(segment)
                    && !results.iter().any(|other| other.same_ends(segment))
                {
                    results.push(*segment);
                }
            }
        } else {
            for child in self.children() {
                if results.is_full() {
                    return;
                }
                child.query_region(region, results);
            }
        }
    }

    /// Counts the nodes in this subtree, including this one.
    fn node_count(&self) -> usize {
        1 + self.children().map(Self::node_count).sum::<usize>()
    }

    /// Computes the depth of this subtree, where a leaf has depth zero.
    fn depth(&self) -> usize {
        self.children().map(|c| c.depth() + 1).max().unwrap_or(0)
    }
}

impl QuadTree {
    /// Builds a quad-tree over `segments` covering the region `bounds`.
    pub fn build(segments: &[BoundarySegment], bounds: Bounds, config: &QuadTreeConfig) -> Self {
        let tree = Self {
            root: QuadTreeNode::build(bounds, segments, 0, config),
        };
        debug!(
            "Built quad-tree over {} segments: {} nodes, depth {}",
            segments.len(),
            tree.root.node_count(),
            tree.root.depth()
        );
        tree
    }

    /// Builds a quad-tree over all boundary segments of a track.
    pub fn from_track(track: &Track, config: &QuadTreeConfig) -> Self {
        let segments = track.segments().copied().collect::<Vec<_>>();
        // A valid track always has at least two points per boundary
        let bounds = Bounds::from_points(track.points()).unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
        Self::build(&segments, bounds, config)
    }

    /// The root node.
    pub fn root(&self) -> &QuadTreeNode {
        &self.root
    }

    /// The region covered by the tree.
    pub fn bounds(&self) -> &Bounds {
        &self.root.bounds
    }

    /// Finds the segments intersecting `region`, appending them to `results`
    /// until it is full. [Read more](QuadTreeNode::query_region).
    pub fn query_region<const CAP: usize>(
        &self,
        region: &Bounds,
        results: &mut ArrayVec<BoundarySegment, CAP>,
    ) {
        self.root.query_region(region, results)
    }
}
