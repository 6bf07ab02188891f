use std::sync::Arc;

use hashbrown::HashMap;
use vista_collide::{CollisionItem, MarkClock, Obstacle, ShapeAdapter};
use vista_geom::{Aabb, Transform, Vec3};

use crate::record::PreparedRegion;
use crate::region::RegionArena;
use crate::{
    BOUNDARY_EPSILON, GridSpan, PendingMappings, Region, RegionGrid, RegionId, RegionRecordError,
    SpaceConfig,
};

/// Handle for an obstacle added with [`World::add_dynamic_obstacle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DynamicId(u64);

struct DynamicEntry {
    obstacle: Arc<Obstacle>,
    bounds: Aabb,
}

/// Owns the region arena and the column grid. Mutated from one thread; sweep
/// queries take `&self`.
pub struct World {
    config: SpaceConfig,
    pub(crate) regions: RegionArena,
    names: HashMap<String, RegionId>,
    pub(crate) grid: RegionGrid,
    blurred: Vec<RegionId>,
    dynamic: HashMap<DynamicId, DynamicEntry>,
    next_dynamic: u64,
    pub(crate) marks: MarkClock,
    pending: PendingMappings,
}

impl World {
    pub fn new(config: SpaceConfig) -> Self {
        let grid = RegionGrid::new(&config);
        Self {
            config,
            regions: RegionArena::default(),
            names: HashMap::new(),
            grid,
            blurred: Vec::new(),
            dynamic: HashMap::new(),
            next_dynamic: 1,
            marks: MarkClock::new(),
            pending: PendingMappings::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    /// Names of regions being prepared off-thread.
    #[inline]
    pub fn pending(&self) -> &PendingMappings {
        &self.pending
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn region_id(&self, name: &str) -> Option<RegionId> {
        self.names.get(name).copied()
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions.iter()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_bound(&self, id: RegionId) -> bool {
        self.regions.get(id).is_some_and(|r| r.bound)
    }

    /// Regions queued for focusing.
    pub fn blurred(&self) -> &[RegionId] {
        &self.blurred
    }

    /// Adds a prepared region to the arena, unbound.
    pub fn load_region(&mut self, prepared: PreparedRegion) -> Result<RegionId, RegionRecordError> {
        if self.names.contains_key(&prepared.name) {
            return Err(RegionRecordError::DuplicateRegion(prepared.name));
        }
        let inverse = prepared
            .transform
            .inverse()
            .ok_or_else(|| RegionRecordError::SingularTransform {
                region: prepared.name.clone(),
            })?;
        self.pending.remove(&prepared.name);
        let name = prepared.name.clone();
        let id = self.regions.insert(Region::from_prepared(prepared, inverse));
        self.names.insert(name.clone(), id);
        log::debug!(target: "world", "region {} loaded as {}", name, id);
        Ok(id)
    }

    /// Links the region to its loaded, bound neighbours and focuses it into
    /// the grid.
    pub fn bind_region(&mut self, id: RegionId) {
        let Some(region) = self.regions.get(id) else {
            debug_assert!(false, "bind of unknown region {}", id);
            return;
        };
        if region.bound {
            debug_assert!(false, "region {} bound twice", region.name);
            return;
        }
        let name = region.name.clone();
        let wanted: Vec<(usize, String)> = region
            .boundaries
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.neighbor_name.clone().map(|n| (i, n)))
            .collect();

        let mut refresh = Vec::new();
        for (bi, neighbor_name) in wanted {
            let Some(nid) = self.names.get(&neighbor_name).copied() else {
                log::trace!(target: "world", "region {} boundary {} waits for {}", name, bi, neighbor_name);
                continue;
            };
            let Some(matched) = self.match_boundary(id, bi, nid) else {
                continue;
            };
            let collide = self.boundary_collide(id, bi) || self.boundary_collide(nid, matched);
            if let Some(r) = self.regions.get_mut(id) {
                r.boundaries[bi].neighbor = Some(nid);
            }
            if let Some(n) = self.regions.get_mut(nid) {
                n.boundaries[matched].neighbor = Some(id);
                if n.boundaries[matched].collide {
                    n.rebuild_obstacles();
                }
            }
            if collide {
                refresh.push(nid);
            }
        }

        if let Some(r) = self.regions.get_mut(id) {
            r.bound = true;
            r.rebuild_obstacles();
        }
        log::debug!(target: "world", "region {} bound", name);
        self.notice_region(id);
        for nid in refresh {
            self.refresh_region(nid);
        }
        self.focus();
    }

    fn boundary_collide(&self, id: RegionId, bi: usize) -> bool {
        self.regions
            .get(id)
            .and_then(|r| r.boundaries.get(bi))
            .is_some_and(|b| b.collide)
    }

    /// Finds the boundary of bound region `nid` that names `id` and coincides
    /// with boundary `bi` of `id` in world space.
    fn match_boundary(&self, id: RegionId, bi: usize, nid: RegionId) -> Option<usize> {
        let region = self.regions.get(id)?;
        let neighbor = self.regions.get(nid)?;
        if !neighbor.bound {
            return None;
        }
        let ours = &region.boundaries[bi];
        let found = neighbor.boundaries.iter().position(|b| {
            b.neighbor.is_none()
                && b.neighbor_name.as_deref() == Some(region.name.as_str())
                && b.world_polygon.coincides(&ours.world_polygon, BOUNDARY_EPSILON)
        });
        if found.is_none() {
            log::warn!(
                target: "world",
                "region {} boundary {} has no coincident partner in {}",
                region.name,
                bi,
                neighbor.name
            );
        }
        found
    }

    /// Unlinks the region from its neighbours and removes it from the grid.
    pub fn unbind_region(&mut self, id: RegionId) {
        let Some(region) = self.regions.get_mut(id) else {
            debug_assert!(false, "unbind of unknown region {}", id);
            return;
        };
        if !region.bound {
            return;
        }
        let links: Vec<(usize, RegionId)> = region.neighbors().collect();
        for b in region.boundaries.iter_mut() {
            b.neighbor = None;
        }
        let name = region.name.clone();
        let bounds = region.world_bounds;

        for (_, nid) in links {
            let mut refresh = false;
            if let Some(n) = self.regions.get_mut(nid) {
                for b in n.boundaries.iter_mut().filter(|b| b.neighbor == Some(id)) {
                    b.neighbor = None;
                    refresh |= b.collide;
                }
                if refresh {
                    n.rebuild_obstacles();
                }
            }
            if refresh {
                self.refresh_region(nid);
            }
        }

        self.ignore_region(id, &bounds);
        if let Some(r) = self.regions.get_mut(id) {
            r.bound = false;
            r.obstacles.clear();
        }
        self.blurred.retain(|b| *b != id);
        log::debug!(target: "world", "region {} unbound", name);
        self.focus();
    }

    /// Unbinds if needed and drops the region. Its items are released, which
    /// detaches any obstacle still referring to them.
    pub fn unload_region(&mut self, id: RegionId) -> Option<Region> {
        if self.is_bound(id) {
            self.unbind_region(id);
        }
        let region = self.regions.remove(id)?;
        self.names.remove(&region.name);
        log::debug!(target: "world", "region {} unloaded", region.name);
        Some(region)
    }

    /// Drops one item's collision handle without touching the grid. Columns
    /// keep the obstacle until the next [`World::focus`] rebuilds the
    /// region; sweeps skip it meanwhile.
    pub fn detach_item(&mut self, id: RegionId, item: &str) -> bool {
        let Some(region) = self.regions.get_mut(id) else {
            return false;
        };
        let before = region.items.len();
        region.items.retain(|i| i.info.name != item);
        let removed = region.items.len() != before;
        region.items_detached |= removed;
        removed
    }

    /// Destroys the columns around a region so no query sees a partial
    /// index. Other regions held by those columns are queued for focusing,
    /// and dynamic obstacles in destroyed cells are put straight back.
    pub fn ignore_region(&mut self, id: RegionId, bounds: &Aabb) {
        let cells: Vec<(i32, i32)> = self.grid.margin_cells(bounds).collect();
        for other in self.grid.ignore_region(bounds) {
            if other != id && self.is_bound(other) {
                self.notice_region(other);
            }
        }
        self.restore_dynamic(&cells, Some(id));
    }

    /// Recreates the columns among `cells` that a dynamic obstacle overlaps,
    /// seeding each with its dynamic obstacles and queueing the bound regions
    /// over it, other than `skip`.
    fn restore_dynamic(&mut self, cells: &[(i32, i32)], skip: Option<RegionId>) {
        if self.dynamic.is_empty() {
            return;
        }
        let g = self.grid.grid_size();
        for &(x, z) in cells {
            if !self.dynamic.values().any(|e| overlaps_cell(&e.bounds, x, z, g)) {
                continue;
            }
            let Some((column, created)) = self.grid.column_at_mut(x, z, true) else {
                continue;
            };
            if !created {
                continue;
            }
            for entry in self.dynamic.values() {
                if overlaps_cell(&entry.bounds, x, z, g) {
                    column.index_mut().add_to_root(Arc::clone(&entry.obstacle));
                }
            }
            log::trace!(target: "world", "column ({}, {}) restored for dynamic obstacles", x, z);
            let over: Vec<RegionId> = self
                .regions
                .iter()
                .filter(|(rid, r)| Some(*rid) != skip && r.bound && overlaps_cell(&r.world_bounds, x, z, g))
                .map(|(rid, _)| rid)
                .collect();
            for rid in over {
                self.notice_region(rid);
            }
        }
    }

    /// Queues a bound region for focusing and marks the columns it
    /// overlaps as stale until then.
    pub fn notice_region(&mut self, id: RegionId) {
        let Some(region) = self.regions.get(id) else {
            return;
        };
        debug_assert!(region.bound, "notice of unbound region {}", region.name);
        let cells: Vec<(i32, i32)> = self.grid.cells_overlapping(&region.world_bounds).collect();
        for (x, z) in cells {
            if let Some((column, _)) = self.grid.column_at_mut(x, z, false) {
                if !column.holds(id) {
                    column.stale = true;
                }
            }
        }
        if !self.blurred.contains(&id) {
            self.blurred.push(id);
        }
    }

    fn refresh_region(&mut self, id: RegionId) {
        let Some(bounds) = self.regions.get(id).map(|r| r.world_bounds) else {
            return;
        };
        self.ignore_region(id, &bounds);
        if self.is_bound(id) {
            self.notice_region(id);
        }
    }

    /// Inserts every queued region's obstacles into the columns it overlaps,
    /// creating columns inside the span as needed.
    pub fn focus(&mut self) {
        let pruned: Vec<RegionId> = self
            .regions
            .iter()
            .filter(|(_, r)| r.bound && r.items_detached)
            .map(|(id, _)| id)
            .collect();
        for id in pruned {
            if let Some(r) = self.regions.get_mut(id) {
                r.rebuild_obstacles();
            }
            log::trace!(target: "world", "region {} rebuilt after item detach", id);
            self.refresh_region(id);
        }
        let queue = std::mem::take(&mut self.blurred);
        for id in queue {
            let Some(region) = self.regions.get(id) else { continue };
            if !region.bound {
                continue;
            }
            let bounds = region.world_bounds;
            let obstacles = region.obstacles.clone();
            let cells: Vec<(i32, i32)> = self.grid.cells_overlapping(&bounds).collect();
            let mut outside = 0usize;
            let grid_size = self.grid.grid_size();
            for (x, z) in cells {
                let stale = self.blurred_overlapping(x, z);
                let Some((column, created)) = self.grid.column_at_mut(x, z, true) else {
                    outside += 1;
                    continue;
                };
                if created {
                    for entry in self.dynamic.values() {
                        if overlaps_cell(&entry.bounds, x, z, grid_size) {
                            column.index_mut().add_to_root(Arc::clone(&entry.obstacle));
                        }
                    }
                }
                if column.holds(id) {
                    continue;
                }
                column.add_region(id);
                for (obstacle, ob_bounds) in &obstacles {
                    if overlaps_cell(ob_bounds, x, z, grid_size) {
                        column.index_mut().add(Arc::clone(obstacle), ob_bounds);
                    }
                }
                column.stale = stale;
            }
            if outside > 0 {
                log::debug!(target: "world", "region {} has {} cells outside the grid span", id, outside);
            }
        }
    }

    fn blurred_overlapping(&self, x: i32, z: i32) -> bool {
        let g = self.grid.grid_size();
        self.blurred.iter().any(|id| {
            self.regions
                .get(*id)
                .is_some_and(|r| overlaps_cell(&r.world_bounds, x, z, g))
        })
    }

    /// Moves the grid span. Columns outside it are dropped; every bound
    /// region is refocused into whatever part of it is inside, including
    /// cells that just came back into the span.
    pub fn recenter(&mut self, span: GridSpan) {
        let evicted = self.grid.set_span(span);
        log::debug!(target: "world", "span moved, {} regions lost columns", evicted.len());
        let bound: Vec<RegionId> = self
            .regions
            .iter()
            .filter(|(_, r)| r.bound)
            .map(|(id, _)| id)
            .collect();
        for id in bound {
            self.notice_region(id);
        }
        let cells: Vec<(i32, i32)> = self
            .dynamic
            .values()
            .flat_map(|e| self.grid.cells_overlapping(&e.bounds))
            .filter(|(x, z)| span.contains(*x, *z))
            .collect();
        self.restore_dynamic(&cells, None);
        self.focus();
    }

    /// Smallest bound region whose world box contains `point`.
    pub fn find_region(&self, point: Vec3) -> Option<RegionId> {
        let column = self.grid.column(point)?;
        let fudge = Vec3::new(0.0, 1e-4, 0.0);
        column
            .regions()
            .iter()
            .filter_map(|id| self.regions.get(*id).map(|r| (*id, r)))
            .filter(|(_, r)| {
                r.bound && {
                    let bb = Aabb::new(r.world_bounds.min - fudge, r.world_bounds.max + fudge);
                    bb.contains(point)
                }
            })
            .min_by(|a, b| a.1.world_bounds.volume().total_cmp(&b.1.world_bounds.volume()))
            .map(|(id, _)| id)
    }

    /// Sets the collision flag on the boundary of `id` nearest `point`, and
    /// on its partner. Returns false when the region has no boundaries.
    pub fn set_boundary_collision(&mut self, id: RegionId, point: Vec3, enabled: bool) -> bool {
        let Some(region) = self.regions.get(id) else {
            return false;
        };
        let nearest = region
            .boundaries
            .iter()
            .enumerate()
            .map(|(i, b)| (i, b.world_polygon.distance_to_point(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((bi, _)) = nearest else { return false };
        let neighbor = region.boundaries[bi].neighbor;
        let polygon = region.boundaries[bi].world_polygon.clone();

        let mut touched = vec![id];
        if let Some(r) = self.regions.get_mut(id) {
            r.boundaries[bi].collide = enabled;
        }
        if let Some(nid) = neighbor {
            if let Some(n) = self.regions.get_mut(nid) {
                for b in n.boundaries.iter_mut().filter(|b| {
                    b.neighbor == Some(id) && b.world_polygon.coincides(&polygon, BOUNDARY_EPSILON)
                }) {
                    b.collide = enabled;
                }
            }
            touched.push(nid);
        }
        for rid in touched {
            if let Some(r) = self.regions.get_mut(rid) {
                if r.bound {
                    r.rebuild_obstacles();
                }
            }
            self.refresh_region(rid);
        }
        self.focus();
        true
    }

    /// Adds an obstacle that is not part of any region. It sits at the root
    /// of each overlapping column's index.
    pub fn add_dynamic_obstacle(
        &mut self,
        item: &Arc<CollisionItem>,
        transform: Transform,
        shape: ShapeAdapter,
    ) -> Option<DynamicId> {
        let bounds = shape.local_bounds().transformed(&transform);
        let obstacle = Arc::new(Obstacle::new(item, transform, shape)?);
        let id = DynamicId(self.next_dynamic);
        self.next_dynamic += 1;
        self.insert_dynamic(&obstacle, &bounds);
        self.dynamic.insert(id, DynamicEntry { obstacle, bounds });
        Some(id)
    }

    fn insert_dynamic(&mut self, obstacle: &Arc<Obstacle>, bounds: &Aabb) {
        let cells: Vec<(i32, i32)> = self.grid.cells_overlapping(bounds).collect();
        let g = self.grid.grid_size();
        for (x, z) in cells {
            let created = match self.grid.column_at_mut(x, z, true) {
                Some((column, created)) => {
                    if created {
                        for entry in self.dynamic.values() {
                            if overlaps_cell(&entry.bounds, x, z, g) {
                                column.index_mut().add_to_root(Arc::clone(&entry.obstacle));
                            }
                        }
                    }
                    column.index_mut().add_to_root(Arc::clone(obstacle));
                    created
                }
                None => false,
            };
            if created {
                // A fresh column must still receive the regions over it.
                let over: Vec<RegionId> = self
                    .regions
                    .iter()
                    .filter(|(_, r)| r.bound && overlaps_cell(&r.world_bounds, x, z, g))
                    .map(|(id, _)| id)
                    .collect();
                for id in over {
                    self.notice_region(id);
                }
            }
        }
        self.focus();
    }

    fn remove_dynamic_entry(&mut self, obstacle: &Arc<Obstacle>, bounds: &Aabb) {
        let cells: Vec<(i32, i32)> = self.grid.cells_overlapping(bounds).collect();
        for (x, z) in cells {
            if let Some((column, _)) = self.grid.column_at_mut(x, z, false) {
                column.index_mut().remove_from_root(obstacle);
            }
        }
    }

    pub fn move_dynamic_obstacle(&mut self, id: DynamicId, transform: Transform) -> bool {
        let Some(entry) = self.dynamic.remove(&id) else {
            return false;
        };
        self.remove_dynamic_entry(&entry.obstacle, &entry.bounds);
        let Some(owner) = entry.obstacle.owner() else {
            log::trace!(target: "world", "dynamic obstacle {:?} lost its owner", id);
            return false;
        };
        let shape = entry.obstacle.shape().clone();
        let bounds = shape.local_bounds().transformed(&transform);
        let Some(obstacle) = Obstacle::new(&owner, transform, shape).map(Arc::new) else {
            return false;
        };
        self.insert_dynamic(&obstacle, &bounds);
        self.dynamic.insert(id, DynamicEntry { obstacle, bounds });
        true
    }

    pub fn remove_dynamic_obstacle(&mut self, id: DynamicId) -> bool {
        match self.dynamic.remove(&id) {
            Some(entry) => {
                self.remove_dynamic_entry(&entry.obstacle, &entry.bounds);
                true
            }
            None => false,
        }
    }
}

#[inline]
fn overlaps_cell(bb: &Aabb, x: i32, z: i32, grid_size: f32) -> bool {
    let (x0, z0) = (x as f32 * grid_size, z as f32 * grid_size);
    bb.min.x <= x0 + grid_size && bb.max.x >= x0 && bb.min.z <= z0 + grid_size && bb.max.z >= z0
}
