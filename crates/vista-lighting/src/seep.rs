//! Boundary walks: the full aggregate rebuild and the incremental update
//! for one moving light.

use vista_geom::Vec3;
use vista_world::{RegionId, World};

use crate::{LightContainer, LightHandle, LightingStore};

/// Distinct regions one move can touch; further regions are left alone.
pub const MOVE_COUNTER_CAPACITY: usize = 6;

/// One step outward: the region left and the index of its boundary crossed.
type Hop = (RegionId, usize);

/// True when the sphere touches every boundary on `path`, each tested in
/// its owner's local space. Stops at the first miss, nearest hop first.
fn passes(world: &World, path: &[Hop], center: Vec3, radius: f32) -> bool {
    path.iter().rev().all(|(rid, bi)| {
        let Some(region) = world.region(*rid) else {
            return false;
        };
        let Some(boundary) = region.boundaries.get(*bi) else {
            return false;
        };
        let local = region.inverse.apply_point(center);
        boundary
            .polygon
            .intersects_sphere(local, radius * region.inverse.max_scale())
    })
}

/// Small fixed-capacity map of region to net reference change.
#[derive(Debug, Default)]
pub(crate) struct RegionCounter {
    pub(crate) entries: Vec<(RegionId, i32)>,
}

impl RegionCounter {
    pub(crate) fn bump(&mut self, id: RegionId, delta: i32) {
        if let Some(entry) = self.entries.iter_mut().find(|(r, _)| *r == id) {
            entry.1 += delta;
            return;
        }
        if self.entries.len() >= MOVE_COUNTER_CAPACITY {
            log::trace!(target: "lighting", "move counter full, region {} dropped", id);
            return;
        }
        self.entries.push((id, delta));
    }
}

impl LightingStore {
    /// Builds the aggregate for `id` from scratch: its own lights still
    /// inside its box, the sky if it sees it, and whatever seeps in from
    /// regions at most `max_seep_depth` boundaries away.
    pub fn collect(&self, world: &World, id: RegionId) -> LightContainer {
        let mut out = LightContainer::new();
        let Some(region) = world.region(id) else {
            return out;
        };
        if let Some(cache) = self.caches.get(&id) {
            for light in cache.own.iter() {
                let inside = light
                    .bounds()
                    .is_none_or(|bb| bb.intersects(&region.world_bounds));
                if inside {
                    out.add(light);
                } else {
                    log::trace!(target: "lighting", "region {} own light outside its box", id);
                }
            }
            if cache.sees_sky {
                out.ambient = self.ambient;
                out.add(&self.sun);
            }
        }
        if self.max_seep_depth == 0 {
            return out;
        }
        let mut path = Vec::with_capacity(self.max_seep_depth as usize);
        for (bi, n) in region.neighbors() {
            path.push((id, bi));
            self.seep_into(world, n, &mut path, &mut out);
            path.pop();
        }
        out
    }

    fn seep_into(&self, world: &World, at: RegionId, path: &mut Vec<Hop>, out: &mut LightContainer) {
        if let Some(cache) = self.caches.get(&at) {
            for light in cache.own.iter() {
                if out.contains(light) {
                    continue;
                }
                let visible = match light.sphere() {
                    None => true,
                    Some((c, r)) => passes(world, path, c, r),
                };
                if visible {
                    out.add(light);
                }
            }
        }
        if path.len() >= self.max_seep_depth as usize {
            return;
        }
        let Some(region) = world.region(at) else {
            return;
        };
        let parent = path.last().map(|(r, _)| *r);
        for (bi, n) in region.neighbors() {
            if Some(n) == parent {
                continue;
            }
            path.push((at, bi));
            self.seep_into(world, n, path, out);
            path.pop();
        }
    }

    /// Patches the aggregates around `owner` after `light` moved from a
    /// sphere at `old_position` with `old_radius` to its current geometry.
    ///
    /// Every path out of `owner` adds one reference where the new sphere
    /// passes and, unless `transient`, removes one where only the old sphere
    /// did. A region ending non-negative keeps (or gains) the light; one
    /// ending negative loses it. Regions whose aggregate was never built are
    /// skipped.
    pub fn move_light(
        &mut self,
        world: &World,
        light: &LightHandle,
        old_position: Vec3,
        old_radius: f32,
        owner: RegionId,
        transient: bool,
    ) {
        let Some((position, radius)) = light.sphere() else {
            return;
        };
        let Some(region) = world.region(owner) else {
            return;
        };
        let inside = light
            .bounds()
            .is_some_and(|bb| bb.intersects(&region.world_bounds));
        if let Some(cache) = self.caches.get_mut(&owner) {
            if let (true, Some(all)) = (cache.own.contains(light), cache.all.as_mut()) {
                if inside {
                    all.add(light);
                } else {
                    all.remove(light);
                }
            }
        }
        if self.max_seep_depth == 0 {
            return;
        }

        let mut counter = RegionCounter::default();
        let mut path = Vec::with_capacity(self.max_seep_depth as usize);
        let walk = MoveWalk {
            world,
            owner,
            new: (position, radius),
            old: (old_position, old_radius),
            transient,
            max_depth: self.max_seep_depth as usize,
        };
        for (bi, n) in region.neighbors() {
            path.push((owner, bi));
            walk.visit(n, &mut path, &mut counter);
            path.pop();
        }

        for (id, net) in counter.entries {
            let Some(all) = self.caches.get_mut(&id).and_then(|c| c.all.as_mut()) else {
                continue;
            };
            if net >= 0 {
                all.add(light);
            } else {
                all.remove(light);
            }
        }
    }

    /// Moves a positional light owned by `owner` to `to` and patches the
    /// surrounding aggregates.
    pub fn relocate_light(&mut self, world: &World, light: &LightHandle, to: Vec3, owner: RegionId, transient: bool) {
        let Some((from, radius)) = light.sphere() else {
            return;
        };
        light.set_position(to);
        self.move_light(world, light, from, radius, owner, transient);
    }
}

struct MoveWalk<'w> {
    world: &'w World,
    owner: RegionId,
    new: (Vec3, f32),
    old: (Vec3, f32),
    transient: bool,
    max_depth: usize,
}

impl MoveWalk<'_> {
    fn visit(&self, at: RegionId, path: &mut Vec<Hop>, counter: &mut RegionCounter) {
        if at == self.owner {
            return;
        }
        if passes(self.world, path, self.new.0, self.new.1) {
            counter.bump(at, 1);
        } else if passes(self.world, path, self.old.0, self.old.1) {
            if !self.transient {
                counter.bump(at, -1);
            }
        } else {
            return;
        }
        if path.len() >= self.max_depth {
            return;
        }
        let Some(region) = self.world.region(at) else {
            return;
        };
        let parent = path.last().map(|(r, _)| *r);
        for (bi, n) in region.neighbors() {
            if Some(n) == parent {
                continue;
            }
            path.push((at, bi));
            self.visit(n, path, counter);
            path.pop();
        }
    }
}
