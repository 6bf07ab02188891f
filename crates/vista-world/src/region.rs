use std::sync::Arc;

use vista_collide::{BspTree, CollisionItem, Obstacle, ShapeAdapter};
use vista_geom::{Aabb, ConvexPolygon, Transform, TriangleFlags};

use crate::record::PreparedRegion;

/// Stable handle into the region arena. A handle outlives its region; once
/// the slot is reused the stale handle simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId {
    index: u32,
    generation: u32,
}

impl RegionId {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// One side of a gate between two regions.
#[derive(Debug)]
pub struct Boundary {
    /// Polygon in the owning region's local space.
    pub polygon: ConvexPolygon,
    pub world_polygon: ConvexPolygon,
    pub neighbor_name: Option<String>,
    /// Set only while both regions are bound and the pair matched.
    pub neighbor: Option<RegionId>,
    pub collide: bool,
    gate: Arc<CollisionItem>,
    gate_shape: ShapeAdapter,
}

impl Boundary {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.neighbor_name.is_none()
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.neighbor.is_some()
    }
}

/// A region item with a collision shape; the region keeps the strong handle
/// its obstacles point back to.
#[derive(Debug)]
pub struct RegionItem {
    pub info: Arc<CollisionItem>,
    /// Item-to-world transform.
    pub transform: Transform,
    pub shape: ShapeAdapter,
}

#[derive(Debug)]
pub struct Region {
    pub name: String,
    pub transform: Transform,
    /// World-to-local transform.
    pub inverse: Transform,
    pub local_bounds: Aabb,
    pub world_bounds: Aabb,
    pub boundaries: Vec<Boundary>,
    pub items: Vec<RegionItem>,
    pub sees_sky: bool,
    pub(crate) bound: bool,
    /// Set when an item was dropped since the obstacles were last built.
    pub(crate) items_detached: bool,
    /// Obstacles shared by every column this region is focused into.
    pub(crate) obstacles: Vec<(Arc<Obstacle>, Aabb)>,
}

impl Region {
    pub(crate) fn from_prepared(p: PreparedRegion, inverse: Transform) -> Self {
        let world_bounds = p.local_bounds.transformed(&p.transform);
        let boundaries = p
            .boundaries
            .into_iter()
            .enumerate()
            .map(|(i, b)| {
                let world_polygon = b.polygon.transformed(&p.transform);
                let gate = CollisionItem::new(
                    format!("gate{}", i),
                    p.name.clone(),
                    world_polygon.bounds(),
                );
                let tris = b
                    .polygon
                    .triangles()
                    .into_iter()
                    .map(|t| t.with_flags(TriangleFlags::GATE))
                    .collect();
                Boundary {
                    polygon: b.polygon,
                    world_polygon,
                    neighbor_name: b.neighbor,
                    neighbor: None,
                    collide: b.collide,
                    gate,
                    gate_shape: ShapeAdapter::Mesh(Arc::new(BspTree::new(tris))),
                }
            })
            .collect();
        let items = p
            .items
            .into_iter()
            .filter_map(|item| {
                let shape = item.shape?;
                let transform = p.transform.then_from(&item.transform);
                let bounds = shape.local_bounds().transformed(&transform);
                Some(RegionItem {
                    info: CollisionItem::new(item.name, p.name.clone(), bounds),
                    transform,
                    shape,
                })
            })
            .collect();
        Region {
            name: p.name,
            transform: p.transform,
            inverse,
            local_bounds: p.local_bounds,
            world_bounds,
            boundaries,
            items,
            sees_sky: p.sees_sky,
            bound: false,
            items_detached: false,
            obstacles: Vec::new(),
        }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Bound neighbours with the index of the boundary leading to each.
    pub fn neighbors(&self) -> impl Iterator<Item = (usize, RegionId)> + '_ {
        self.boundaries
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.neighbor.map(|n| (i, n)))
    }

    /// Rebuilds the obstacles for this region's items and closed gates.
    pub(crate) fn rebuild_obstacles(&mut self) {
        let mut obstacles = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match Obstacle::new(&item.info, item.transform, item.shape.clone()) {
                Some(o) => obstacles.push((Arc::new(o), item.info.bounds)),
                None => log::warn!(
                    target: "world",
                    "region {} item {} has a singular transform; no obstacle",
                    self.name,
                    item.info.name
                ),
            }
        }
        for b in self.boundaries.iter().filter(|b| b.collide && b.is_bound()) {
            if let Some(o) = Obstacle::new(&b.gate, self.transform, b.gate_shape.clone()) {
                obstacles.push((Arc::new(o), b.gate.bounds));
            }
        }
        self.obstacles = obstacles;
        self.items_detached = false;
    }
}

struct Slot {
    generation: u32,
    region: Option<Region>,
}

/// Owns every loaded region; boundaries refer to each other by [`RegionId`].
#[derive(Default)]
pub(crate) struct RegionArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl RegionArena {
    pub fn insert(&mut self, region: Region) -> RegionId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.region = Some(region);
            return RegionId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            region: Some(region),
        });
        RegionId { index, generation: 0 }
    }

    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let region = slot.region.take()?;
        self.free.push(id.index);
        Some(region)
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.region.as_ref())
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.region.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.region.as_ref().map(|r| {
                (
                    RegionId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    r,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.region.is_some()).count()
    }
}
