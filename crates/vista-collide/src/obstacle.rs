use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use vista_geom::{Aabb, Transform, Triangle};

use crate::{ShapeAdapter, Sweep};

/// The collidable part of a region item. Obstacles refer back to it weakly;
/// dropping the last strong handle detaches every obstacle built from it.
#[derive(Debug)]
pub struct CollisionItem {
    pub name: String,
    pub region: String,
    /// World-space bounds shared by every obstacle of this item.
    pub bounds: Aabb,
}

impl CollisionItem {
    pub fn new(name: impl Into<String>, region: impl Into<String>, bounds: Aabb) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            region: region.into(),
            bounds,
        })
    }
}

/// Mark carried by an obstacle no query has visited yet.
pub const UNMARKED: u32 = 0;

/// Hands out query generations. Each top-level sweep takes one, which
/// invalidates every obstacle's visited flag without touching the obstacles.
#[derive(Debug)]
pub struct MarkClock {
    current: AtomicU32,
}

impl Default for MarkClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkClock {
    pub fn new() -> Self {
        Self {
            current: AtomicU32::new(0),
        }
    }

    /// A clock whose next mark follows `mark`.
    pub fn starting_at(mark: u32) -> Self {
        Self {
            current: AtomicU32::new(mark),
        }
    }

    /// Never hands out [`UNMARKED`], so a fresh obstacle is unvisited by
    /// every query, across wrap-around too.
    pub fn next(&self) -> QueryContext {
        loop {
            let mark = self.current.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            if mark != UNMARKED {
                return QueryContext { mark };
            }
        }
    }
}

/// Generation of one sweep, passed down to the index and the obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryContext {
    mark: u32,
}

impl QueryContext {
    #[inline]
    pub fn mark(&self) -> u32 {
        self.mark
    }
}

pub struct Obstacle {
    owner: Weak<CollisionItem>,
    transform: Transform,
    inverse: Transform,
    shape: ShapeAdapter,
    mark: AtomicU32,
}

impl std::fmt::Debug for Obstacle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Obstacle")
            .field("owner", &self.owner.upgrade().map(|o| o.name.clone()))
            .field("origin", &self.transform.origin)
            .field("mark", &self.mark.load(Ordering::Relaxed))
            .finish()
    }
}

impl Obstacle {
    /// `None` when `transform` cannot be inverted.
    pub fn new(owner: &Arc<CollisionItem>, transform: Transform, shape: ShapeAdapter) -> Option<Self> {
        let inverse = transform.inverse()?;
        Some(Self {
            owner: Arc::downgrade(owner),
            transform,
            inverse,
            shape,
            mark: AtomicU32::new(UNMARKED),
        })
    }

    #[inline]
    pub fn owner(&self) -> Option<Arc<CollisionItem>> {
        self.owner.upgrade()
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        self.owner.strong_count() == 0
    }

    /// The owner's bounds, while the owner is alive.
    pub fn bounds(&self) -> Option<Aabb> {
        self.owner.upgrade().map(|o| o.bounds)
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn shape(&self) -> &ShapeAdapter {
        &self.shape
    }

    /// Returns true if this obstacle was already visited by the query `ctx`,
    /// otherwise records the visit and returns false.
    #[inline]
    pub fn mark(&self, ctx: &QueryContext) -> bool {
        self.mark.swap(ctx.mark, Ordering::Relaxed) == ctx.mark
    }

    #[inline]
    pub fn last_mark(&self) -> u32 {
        self.mark.load(Ordering::Relaxed)
    }

    /// Runs the exact test for a world-space sweep. `hit` receives each hit
    /// triangle in world space and its fraction along the path; returning
    /// false ends the test early.
    pub fn collide(&self, sweep: &Sweep, hit: &mut dyn FnMut(&Triangle, f32) -> bool) -> bool {
        let local = sweep.transformed(&self.inverse);
        let world = &self.transform;
        self.shape
            .collide(&local, &mut |tri: &Triangle, t: f32| hit(&tri.transformed(world), t))
    }
}
