//! Region records as handed over by the loading collaborator, and their
//! validation into [`PreparedRegion`]s.
//!
//! Preparation is pure (no world access) so it can run on a worker thread;
//! only the prepared value is handed to the thread that owns the world.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Deserialize;
use vista_collide::{BspTree, HeightField, ShapeAdapter};
use vista_geom::{Aabb, ConvexPolygon, Transform, Triangle, Vec3};

use crate::RegionRecordError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TransformRecord {
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
}

impl TransformRecord {
    pub fn to_transform(&self) -> Transform {
        Transform::from_yaw_translation(
            self.yaw_degrees.to_radians(),
            Vec3::from_array(self.translation),
        )
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BoundsRecord {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BoundaryRecord {
    /// Name of the region on the other side; absent for external boundaries.
    #[serde(default)]
    pub neighbor: Option<String>,
    /// Convex polygon in the owning region's local space.
    pub points: Vec<[f32; 3]>,
    #[serde(default)]
    pub collide: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default)]
    pub transform: TransformRecord,
    /// Collision asset name; items without one carry no obstacle.
    #[serde(default)]
    pub mesh: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainRecord {
    pub spacing: f32,
    pub width: usize,
    pub depth: usize,
    pub heights: Vec<f32>,
    #[serde(default)]
    pub holes: Vec<bool>,
    #[serde(default)]
    pub offset: [f32; 3],
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RegionRecord {
    pub name: String,
    #[serde(default)]
    pub transform: TransformRecord,
    /// Local-space bounds.
    pub bounds: BoundsRecord,
    #[serde(default)]
    pub sees_sky: bool,
    #[serde(default, rename = "boundary")]
    pub boundaries: Vec<BoundaryRecord>,
    #[serde(default, rename = "item")]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub terrain: Option<TerrainRecord>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AssetRecord {
    pub name: String,
    #[serde(default)]
    pub half_extents: Option<[f32; 3]>,
    #[serde(default)]
    pub triangles: Vec<[[f32; 3]; 3]>,
}

/// Static-mesh collision surfaces keyed by asset name.
#[derive(Clone, Debug, Default)]
pub struct CollisionAssets {
    meshes: HashMap<String, Arc<BspTree>>,
}

impl CollisionAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[AssetRecord]) -> Result<Self, RegionRecordError> {
        let mut assets = Self::new();
        for rec in records {
            let bsp = match (rec.half_extents, rec.triangles.is_empty()) {
                (Some(h), true) => BspTree::cuboid(Vec3::from_array(h)),
                (None, false) => BspTree::new(
                    rec.triangles
                        .iter()
                        .map(|t| {
                            Triangle::new(
                                Vec3::from_array(t[0]),
                                Vec3::from_array(t[1]),
                                Vec3::from_array(t[2]),
                            )
                        })
                        .collect(),
                ),
                _ => {
                    return Err(RegionRecordError::BadAsset {
                        asset: rec.name.clone(),
                    });
                }
            };
            assets.insert(&rec.name, bsp);
        }
        Ok(assets)
    }

    pub fn insert(&mut self, name: &str, bsp: BspTree) {
        self.meshes.insert(name.to_string(), Arc::new(bsp));
    }

    pub fn get(&self, name: &str) -> Option<Arc<BspTree>> {
        self.meshes.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct PreparedBoundary {
    pub polygon: ConvexPolygon,
    pub neighbor: Option<String>,
    pub collide: bool,
}

#[derive(Clone, Debug)]
pub struct PreparedItem {
    pub name: String,
    /// Item-to-region transform.
    pub transform: Transform,
    pub shape: Option<ShapeAdapter>,
}

/// A validated region with its collision shapes built, ready to be linked
/// into a world.
#[derive(Clone, Debug)]
pub struct PreparedRegion {
    pub name: String,
    pub transform: Transform,
    pub local_bounds: Aabb,
    pub sees_sky: bool,
    pub boundaries: Vec<PreparedBoundary>,
    pub items: Vec<PreparedItem>,
}

/// Name given to the item that carries a region's height field.
pub const TERRAIN_ITEM: &str = "terrain";

impl RegionRecord {
    pub fn prepare(&self, assets: &CollisionAssets) -> Result<PreparedRegion, RegionRecordError> {
        let region = || self.name.clone();
        let transform = self.transform.to_transform();
        if transform.inverse().is_none() {
            return Err(RegionRecordError::SingularTransform { region: region() });
        }
        let local_bounds = Aabb::new(
            Vec3::from_array(self.bounds.min),
            Vec3::from_array(self.bounds.max),
        );
        if local_bounds.is_empty() {
            return Err(RegionRecordError::EmptyBounds { region: region() });
        }

        let mut boundaries = Vec::with_capacity(self.boundaries.len());
        for (index, b) in self.boundaries.iter().enumerate() {
            let points = b.points.iter().copied().map(Vec3::from_array).collect();
            let polygon = ConvexPolygon::new(points).ok_or(RegionRecordError::DegenerateBoundary {
                region: region(),
                index,
            })?;
            boundaries.push(PreparedBoundary {
                polygon,
                neighbor: b.neighbor.clone(),
                collide: b.collide,
            });
        }

        let mut items = Vec::with_capacity(self.items.len() + 1);
        for item in &self.items {
            let shape = match &item.mesh {
                Some(asset) => Some(ShapeAdapter::Mesh(assets.get(asset).ok_or_else(|| {
                    RegionRecordError::UnknownAsset {
                        region: region(),
                        item: item.name.clone(),
                        asset: asset.clone(),
                    }
                })?)),
                None => None,
            };
            items.push(PreparedItem {
                name: item.name.clone(),
                transform: item.transform.to_transform(),
                shape,
            });
        }

        if let Some(t) = &self.terrain {
            let field = HeightField::new(t.spacing, t.width, t.depth, t.heights.clone(), t.holes.clone())
                .ok_or(RegionRecordError::BadTerrain { region: region() })?;
            items.push(PreparedItem {
                name: TERRAIN_ITEM.to_string(),
                transform: Transform::translation(Vec3::from_array(t.offset)),
                shape: Some(ShapeAdapter::Terrain(Arc::new(field))),
            });
        }

        Ok(PreparedRegion {
            name: self.name.clone(),
            transform,
            local_bounds,
            sees_sky: self.sees_sky,
            boundaries,
            items,
        })
    }
}
