//! Region-partitioned world with sweep queries and boundary light seeping.
//!
//! [`Space`] ties a [`World`] to its [`LightingStore`] so region lifecycle
//! events reach both in the right order. [`RegionLoader`] prepares regions
//! on worker threads and hands them back to the thread that owns the space.
#![forbid(unsafe_code)]

pub mod loader;
pub mod scene;

use std::sync::Arc;

use vista_geom::Vec3;
use vista_lighting::{LightContainer, LightHandle, LightingStore};
use vista_world::{CollisionAssets, PreparedRegion, RegionId, RegionRecordError, SpaceConfig, World};

pub use loader::{LoadOut, RegionLoader};
pub use scene::{LightRecord, RegionEntry, Scene};

pub struct Space {
    world: World,
    lighting: LightingStore,
    assets: Arc<CollisionAssets>,
}

impl Space {
    pub fn new(config: SpaceConfig, assets: CollisionAssets) -> Self {
        let lighting = LightingStore::new(&config);
        Self {
            world: World::new(config),
            lighting,
            assets: Arc::new(assets),
        }
    }

    /// Loads and binds every region of `scene` on the calling thread.
    pub fn from_scene(scene: &Scene, config: SpaceConfig) -> Result<Self, RegionRecordError> {
        let assets = CollisionAssets::from_records(&scene.assets)?;
        let mut space = Space::new(config, assets);
        let mut ids = Vec::with_capacity(scene.regions.len());
        for entry in &scene.regions {
            let prepared = entry.record.prepare(&space.assets)?;
            ids.push(space.insert_region(prepared, &entry.lights)?);
        }
        for id in ids {
            space.bind(id);
        }
        space.refresh_lighting();
        Ok(space)
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for obstacle edits. Region lifecycle changes
    /// must go through [`Space`] so lighting follows.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn lighting(&self) -> &LightingStore {
        &self.lighting
    }

    #[inline]
    pub fn assets(&self) -> &Arc<CollisionAssets> {
        &self.assets
    }

    /// Adds a prepared region, unbound, with its lights placed in the world
    /// through the region transform.
    pub fn insert_region(
        &mut self,
        prepared: PreparedRegion,
        lights: &[LightRecord],
    ) -> Result<RegionId, RegionRecordError> {
        let transform = prepared.transform;
        let id = self.world.load_region(prepared)?;
        self.lighting.touch(id);
        for record in lights {
            let light = record.instantiate(&transform);
            self.lighting.add_light(&self.world, id, &light);
        }
        Ok(id)
    }

    pub fn bind(&mut self, id: RegionId) {
        self.world.bind_region(id);
        self.lighting.bind(&self.world, id);
    }

    pub fn unbind(&mut self, id: RegionId) {
        if !self.world.is_bound(id) {
            return;
        }
        self.lighting.unbind(&self.world, id);
        self.world.unbind_region(id);
    }

    pub fn unload(&mut self, id: RegionId) -> bool {
        self.unbind(id);
        self.lighting.unload(id);
        self.world.unload_region(id).is_some()
    }

    pub fn add_light(&mut self, id: RegionId, light: &LightHandle) -> bool {
        self.lighting.add_light(&self.world, id, light)
    }

    pub fn remove_light(&mut self, id: RegionId, light: &LightHandle) -> bool {
        self.lighting.remove_light(&self.world, id, light)
    }

    /// Moves a light declared by `owner` and patches neighbouring aggregates.
    pub fn move_light(&mut self, light: &LightHandle, to: Vec3, owner: RegionId, transient: bool) {
        self.lighting.relocate_light(&self.world, light, to, owner, transient);
    }

    pub fn set_boundary_collision(&mut self, id: RegionId, point: Vec3, enabled: bool) -> bool {
        self.world.set_boundary_collision(id, point, enabled)
    }

    pub fn own_lights(&self, id: RegionId) -> Option<&LightContainer> {
        self.lighting.own_lights(id)
    }

    pub fn all_lights(&mut self, id: RegionId) -> Option<&LightContainer> {
        self.lighting.all_lights(&self.world, id)
    }

    pub fn refresh_lighting(&mut self) -> usize {
        self.lighting.refresh_dirty(&self.world)
    }
}
