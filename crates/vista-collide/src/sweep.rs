use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use vista_geom::{Aabb, Transform, Triangle, Vec3};

use crate::Obstacle;

/// The moving shape of a sweep, positioned at the start of the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SweepShape {
    Point(Vec3),
    Triangle(Triangle),
}

/// A shape translated by `delta`. The same value describes a sweep in world
/// space and, after [`Sweep::transformed`], in an obstacle's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    pub shape: SweepShape,
    pub delta: Vec3,
}

impl Sweep {
    pub fn ray(start: Vec3, end: Vec3) -> Self {
        Self {
            shape: SweepShape::Point(start),
            delta: end - start,
        }
    }

    pub fn prism(triangle: Triangle, delta: Vec3) -> Self {
        Self {
            shape: SweepShape::Triangle(triangle),
            delta,
        }
    }

    /// Centre of the shape at the start of the path.
    pub fn anchor(&self) -> Vec3 {
        match &self.shape {
            SweepShape::Point(p) => *p,
            SweepShape::Triangle(t) => t.centroid(),
        }
    }

    /// Radius of the sphere around [`Sweep::anchor`] enclosing the shape.
    pub fn radius(&self) -> f32 {
        match &self.shape {
            SweepShape::Point(_) => 0.0,
            SweepShape::Triangle(t) => {
                let c = t.centroid();
                t.v.iter().map(|v| v.distance(c)).fold(0.0, f32::max)
            }
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.delta.length()
    }

    pub fn bounds(&self) -> Aabb {
        match &self.shape {
            SweepShape::Point(p) => Aabb::from_points([*p, *p + self.delta]),
            SweepShape::Triangle(t) => {
                let start = t.bounds();
                start.union(&Aabb::new(start.min + self.delta, start.max + self.delta))
            }
        }
    }

    pub fn transformed(&self, t: &Transform) -> Sweep {
        let shape = match &self.shape {
            SweepShape::Point(p) => SweepShape::Point(t.apply_point(*p)),
            SweepShape::Triangle(tri) => SweepShape::Triangle(tri.transformed(t)),
        };
        Sweep {
            shape,
            delta: t.apply_vector(self.delta),
        }
    }

    /// Min and max signed distance of the swept volume from the plane
    /// `normal . p = d`.
    pub fn plane_range(&self, normal: Vec3, d: f32) -> (f32, f32) {
        let step = normal.dot(self.delta);
        let (lo, hi) = match &self.shape {
            SweepShape::Point(p) => {
                let s = normal.dot(*p) - d;
                (s, s)
            }
            SweepShape::Triangle(t) => t.v.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
                let s = normal.dot(*v) - d;
                (lo.min(s), hi.max(s))
            }),
        };
        (lo.min(lo + step), hi.max(hi + step))
    }

    /// Exact test against one triangle; the fraction of `delta` at contact.
    pub fn hit_fraction(&self, triangle: &Triangle) -> Option<f32> {
        match &self.shape {
            SweepShape::Point(p) => triangle.intersect_segment(*p, self.delta),
            SweepShape::Triangle(t) => triangle.sweep_triangle(t, self.delta),
        }
    }
}

/// Continuation returned by a collision visitor for each reported hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollideVerdict {
    /// End the sweep now.
    Stop,
    /// Only hits closer than this one are of further interest.
    CollideBefore,
    /// Only hits further than this one are of further interest.
    CollideAfter,
    /// Keep reporting every hit.
    CollideAll,
}

pub trait CollisionVisitor {
    fn visit(&mut self, obstacle: &Obstacle, triangle: &Triangle, distance: f32) -> CollideVerdict;
}

impl<F> CollisionVisitor for F
where
    F: FnMut(&Obstacle, &Triangle, f32) -> CollideVerdict,
{
    fn visit(&mut self, obstacle: &Obstacle, triangle: &Triangle, distance: f32) -> CollideVerdict {
        self(obstacle, triangle, distance)
    }
}

struct PendingHit {
    distance: f32,
    seq: u64,
    obstacle: Arc<Obstacle>,
    triangle: Triangle,
}

impl PartialEq for PendingHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingHit {}

impl PartialOrd for PendingHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingHit {
    // Reversed so the max-heap pops the nearest (then earliest) hit first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Per-sweep continuation state.
///
/// Hits are buffered as obstacles are tested and released to the visitor in
/// non-decreasing distance order once the traversal has moved past them. The
/// visitor's verdicts narrow which later hits are reported.
pub struct CollisionState {
    pending: BinaryHeap<PendingHit>,
    seq: u64,
    only_less: bool,
    only_more: bool,
    threshold: f32,
    closest: Option<f32>,
    stopped: bool,
}

impl Default for CollisionState {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionState {
    pub fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            seq: 0,
            only_less: false,
            only_more: false,
            threshold: 0.0,
            closest: None,
            stopped: false,
        }
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn push(&mut self, distance: f32, obstacle: &Arc<Obstacle>, triangle: Triangle) {
        self.seq += 1;
        self.pending.push(PendingHit {
            distance,
            seq: self.seq,
            obstacle: Arc::clone(obstacle),
            triangle,
        });
    }

    /// Reports every buffered hit at or before `up_to`. Returns false once a
    /// visitor has stopped the sweep.
    pub fn flush(&mut self, up_to: f32, visitor: &mut dyn CollisionVisitor) -> bool {
        while !self.stopped {
            match self.pending.peek() {
                Some(next) if next.distance <= up_to => {}
                _ => break,
            }
            let Some(hit) = self.pending.pop() else { break };
            self.emit(hit, visitor);
        }
        !self.stopped
    }

    fn emit(&mut self, hit: PendingHit, visitor: &mut dyn CollisionVisitor) {
        if self.only_less && hit.distance >= self.threshold {
            return;
        }
        if self.only_more && hit.distance <= self.threshold {
            return;
        }
        let verdict = visitor.visit(&hit.obstacle, &hit.triangle, hit.distance);
        self.closest = Some(match self.closest {
            Some(c) => c.min(hit.distance),
            None => hit.distance,
        });
        match verdict {
            CollideVerdict::Stop => self.stopped = true,
            CollideVerdict::CollideBefore => {
                self.only_less = true;
                self.only_more = false;
                self.threshold = hit.distance;
            }
            CollideVerdict::CollideAfter => {
                self.only_less = false;
                self.only_more = true;
                self.threshold = hit.distance;
            }
            CollideVerdict::CollideAll => {
                self.only_less = false;
                self.only_more = false;
            }
        }
    }

    /// True when nothing at or beyond `travel` can still be reported. Call
    /// after flushing up to `travel`.
    pub fn exhausted(&self, travel: f32) -> bool {
        self.stopped || (self.only_less && self.threshold <= travel)
    }

    /// Drains the remaining hits and returns the closest distance passed to
    /// the visitor, or `-1.0` when nothing was.
    pub fn finish(mut self, visitor: &mut dyn CollisionVisitor) -> f32 {
        self.flush(f32::INFINITY, visitor);
        self.closest.unwrap_or(-1.0)
    }
}
