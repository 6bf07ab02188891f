//! Sweep queries over the column grid.

use vista_collide::{
    AnyObstacle, ClosestObstacle, ClosestTerrain, CollisionState, CollisionVisitor, GridWalk,
    Sweep,
};
use vista_geom::{Triangle, Vec3};

use crate::World;

impl World {
    /// Sweeps `sweep` through the grid, reporting hits to `visitor` in
    /// non-decreasing distance order. Returns the closest distance reported,
    /// or `-1.0` if nothing was.
    ///
    /// Each traversed cell's index is asked for candidates along the part of
    /// the path inside that cell, widened by the shape's radius; a candidate
    /// runs the exact test over the whole path the first time this sweep
    /// meets it and is skipped after that.
    pub fn collide(&self, sweep: &Sweep, visitor: &mut dyn CollisionVisitor) -> f32 {
        let ctx = self.marks.next();
        let length = sweep.length();
        let radius = sweep.radius();
        let anchor = sweep.anchor();
        let dir = if length > 0.0 {
            sweep.delta / length
        } else {
            Vec3::ZERO
        };

        let mut state = CollisionState::new();
        let mut walk = GridWalk::new(anchor, anchor + sweep.delta, radius, self.grid.grid_size()).peekable();
        while let Some(step) = walk.next() {
            if let Some(column) = self.grid.column_at(step.x, step.z) {
                if column.is_stale() {
                    log::trace!(target: "collide", "sweeping stale column ({}, {})", step.x, step.z);
                }
                let from = anchor + dir * (step.s_travel - radius);
                let to = anchor + dir * (step.e_travel + radius);
                for obstacle in column.index().traverse(from, to, radius) {
                    if obstacle.mark(&ctx) {
                        continue;
                    }
                    if obstacle.is_detached() {
                        log::trace!(target: "collide", "skipping detached obstacle");
                        continue;
                    }
                    obstacle.collide(sweep, &mut |tri: &Triangle, t: f32| {
                        state.push(t * length, obstacle, *tri);
                        true
                    });
                }
            }
            let next = walk.peek().map_or(f32::INFINITY, |s| s.s_travel - radius);
            if !state.flush(next, visitor) || state.exhausted(next) {
                break;
            }
        }
        state.finish(visitor)
    }

    pub fn collide_ray(&self, start: Vec3, end: Vec3, visitor: &mut dyn CollisionVisitor) -> f32 {
        self.collide(&Sweep::ray(start, end), visitor)
    }

    pub fn collide_prism(&self, triangle: Triangle, delta: Vec3, visitor: &mut dyn CollisionVisitor) -> f32 {
        self.collide(&Sweep::prism(triangle, delta), visitor)
    }

    /// True when nothing lies on the segment between `a` and `b`.
    pub fn line_of_sight(&self, a: Vec3, b: Vec3) -> bool {
        let mut any = AnyObstacle::default();
        self.collide_ray(a, b, &mut any);
        !any.hit
    }

    /// First point below `pos` (within `max_drop`) that anything occupies.
    pub fn find_drop_point(&self, pos: Vec3, max_drop: f32) -> Option<Vec3> {
        let mut closest = ClosestObstacle::default();
        let d = self.collide_ray(pos, pos - Vec3::UP * max_drop, &mut closest);
        (d >= 0.0).then(|| pos - Vec3::UP * d)
    }

    /// Height of the first surface found scanning down from `range` above
    /// `pos` to `range` below it.
    pub fn ground(&self, pos: Vec3, range: f32) -> Option<f32> {
        let top = pos + Vec3::UP * range;
        let mut closest = ClosestObstacle::default();
        let d = self.collide_ray(top, pos - Vec3::UP * range, &mut closest);
        (d >= 0.0).then(|| top.y - d)
    }

    /// Like [`World::ground`] but only terrain counts.
    pub fn terrain_ground(&self, pos: Vec3, range: f32) -> Option<f32> {
        let top = pos + Vec3::UP * range;
        let mut terrain = ClosestTerrain::default();
        self.collide_ray(top, pos - Vec3::UP * range, &mut terrain);
        terrain.distance.map(|d| top.y - d)
    }
}
