use hashbrown::HashMap;
use rayon::prelude::*;
use vista_geom::Vec3;
use vista_world::{RegionId, SpaceConfig, World};

use crate::{EmissionCache, LightContainer, LightHandle};

/// Emission caches for every region the lighting side knows about.
///
/// The store follows the world's lifecycle: call [`LightingStore::bind`]
/// after the world binds a region, and [`LightingStore::unbind`] before the
/// world unbinds it, while its neighbours are still linked.
#[derive(Debug)]
pub struct LightingStore {
    pub(crate) caches: HashMap<RegionId, EmissionCache>,
    pub(crate) sun: LightHandle,
    pub(crate) ambient: [f32; 3],
    pub(crate) max_seep_depth: u32,
}

impl LightingStore {
    pub fn new(config: &SpaceConfig) -> Self {
        Self {
            caches: HashMap::new(),
            sun: LightHandle::directional(Vec3::from_array(config.sky.sun_direction), config.sky.sun_colour),
            ambient: config.sky.ambient,
            max_seep_depth: config.max_seep_depth,
        }
    }

    #[inline]
    pub fn sun(&self) -> &LightHandle {
        &self.sun
    }

    #[inline]
    pub fn max_seep_depth(&self) -> u32 {
        self.max_seep_depth
    }

    pub fn cache(&self, id: RegionId) -> Option<&EmissionCache> {
        self.caches.get(&id)
    }

    pub fn is_dirty(&self, id: RegionId) -> bool {
        self.caches.get(&id).is_some_and(|c| c.dirty)
    }

    /// Creates an empty cache for a loaded region so lights can be declared
    /// before it binds.
    pub fn touch(&mut self, id: RegionId) -> &mut EmissionCache {
        self.caches.entry(id).or_insert_with(|| EmissionCache {
            dirty: true,
            ..EmissionCache::default()
        })
    }

    /// Brings a freshly bound region's aggregate up to date and invalidates
    /// the neighbourhood that can now see its lights.
    pub fn bind(&mut self, world: &World, id: RegionId) {
        debug_assert!(world.is_bound(id), "lighting bind of unbound region {}", id);
        let sees_sky = world.region(id).is_some_and(|r| r.sees_sky);
        self.touch(id).sees_sky = sees_sky;
        self.dirty_seep(world, id, self.max_seep_depth, None);
        self.update(world, id);
        log::debug!(target: "lighting", "region {} bound, sky {}", id, sees_sky);
    }

    /// Invalidates everything that could see this region's lights and drops
    /// its aggregate. Own lights are kept for a later bind.
    pub fn unbind(&mut self, world: &World, id: RegionId) {
        self.dirty_seep(world, id, self.max_seep_depth, None);
        if let Some(cache) = self.caches.get_mut(&id) {
            cache.all = None;
        }
        log::debug!(target: "lighting", "region {} unbound", id);
    }

    pub fn unload(&mut self, id: RegionId) -> Option<EmissionCache> {
        self.caches.remove(&id)
    }

    pub fn add_light(&mut self, world: &World, id: RegionId, light: &LightHandle) -> bool {
        if !self.touch(id).own.add(light) {
            return false;
        }
        self.dirty_seep(world, id, self.max_seep_depth, None);
        true
    }

    pub fn remove_light(&mut self, world: &World, id: RegionId, light: &LightHandle) -> bool {
        let removed = self.caches.get_mut(&id).is_some_and(|c| c.own.remove(light));
        if removed {
            self.dirty_seep(world, id, self.max_seep_depth, None);
        }
        removed
    }

    /// Marks `id` dirty and, while `depth` lasts, every bound neighbour but
    /// `exclude`, passing itself as the neighbour's exclusion.
    pub fn dirty_seep(&mut self, world: &World, id: RegionId, depth: u32, exclude: Option<RegionId>) {
        if let Some(cache) = self.caches.get_mut(&id) {
            cache.dirty = true;
        }
        if depth == 0 {
            return;
        }
        let Some(region) = world.region(id) else {
            return;
        };
        let next: Vec<RegionId> = region
            .neighbors()
            .map(|(_, n)| n)
            .filter(|n| Some(*n) != exclude)
            .collect();
        for n in next {
            self.dirty_seep(world, n, depth - 1, Some(id));
        }
    }

    /// Recomputes the aggregate of a dirty, bound region.
    pub fn update(&mut self, world: &World, id: RegionId) {
        if !self.is_dirty(id) || !world.is_bound(id) {
            return;
        }
        let all = self.collect(world, id);
        if let Some(cache) = self.caches.get_mut(&id) {
            log::trace!(target: "lighting", "region {} aggregate rebuilt with {} lights", id, all.len());
            cache.all = Some(all);
            cache.dirty = false;
        }
    }

    pub fn own_lights(&self, id: RegionId) -> Option<&LightContainer> {
        self.caches.get(&id).map(|c| &c.own)
    }

    /// Aggregate for `id`, recomputed first if dirty. `None` for regions
    /// that are not bound or have no cache.
    pub fn all_lights(&mut self, world: &World, id: RegionId) -> Option<&LightContainer> {
        self.update(world, id);
        self.caches.get(&id).and_then(|c| c.all.as_ref())
    }

    /// Recomputes every dirty bound cache in parallel and installs the
    /// results. Returns how many were rebuilt.
    pub fn refresh_dirty(&mut self, world: &World) -> usize {
        let dirty: Vec<RegionId> = self
            .caches
            .iter()
            .filter(|(id, c)| c.dirty && world.is_bound(**id))
            .map(|(id, _)| *id)
            .collect();
        let this = &*self;
        let rebuilt: Vec<(RegionId, LightContainer)> = dirty
            .par_iter()
            .map(|id| (*id, this.collect(world, *id)))
            .collect();
        let count = rebuilt.len();
        for (id, all) in rebuilt {
            if let Some(cache) = self.caches.get_mut(&id) {
                cache.all = Some(all);
                cache.dirty = false;
            }
        }
        if count > 0 {
            log::debug!(target: "lighting", "refreshed {} dirty caches", count);
        }
        count
    }
}
