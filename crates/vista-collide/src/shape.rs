use std::sync::Arc;

use vista_geom::{Aabb, Triangle};

use crate::{BspTree, HeightField, Sweep};

/// Collidable surface behind an obstacle, in the obstacle's local space.
#[derive(Clone, Debug)]
pub enum ShapeAdapter {
    /// Precomputed static mesh, shared between every item using the asset.
    Mesh(Arc<BspTree>),
    /// Triangles generated on demand from a height field.
    Terrain(Arc<HeightField>),
}

impl ShapeAdapter {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            ShapeAdapter::Mesh(bsp) => bsp.bounds(),
            ShapeAdapter::Terrain(field) => field.bounds(),
        }
    }

    /// Visits every local-space triangle hit by `sweep` with its contact
    /// fraction. Returns false if `hit` asked to stop.
    pub fn collide(&self, sweep: &Sweep, hit: &mut dyn FnMut(&Triangle, f32) -> bool) -> bool {
        match self {
            ShapeAdapter::Mesh(bsp) => bsp.collide(sweep, hit),
            ShapeAdapter::Terrain(field) => field.collide(sweep, hit),
        }
    }
}
