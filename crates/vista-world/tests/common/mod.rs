#![allow(dead_code)]

use vista_world::record::{
    AssetRecord, BoundaryRecord, BoundsRecord, ItemRecord, RegionRecord, TransformRecord,
};
use vista_world::{CollisionAssets, RegionId, SpaceConfig, World};

#[derive(Clone, Copy, Debug)]
pub enum Side {
    East,
    West,
    North,
    South,
}

/// Wall polygon on one side of the local square `[0, size]^2`, spanning
/// heights `y0..y1`.
pub fn wall(side: Side, size: f32, y0: f32, y1: f32) -> Vec<[f32; 3]> {
    match side {
        Side::East => vec![[size, y0, 0.0], [size, y0, size], [size, y1, size], [size, y1, 0.0]],
        Side::West => vec![[0.0, y0, 0.0], [0.0, y1, 0.0], [0.0, y1, size], [0.0, y0, size]],
        Side::North => vec![[0.0, y0, size], [0.0, y1, size], [size, y1, size], [size, y0, size]],
        Side::South => vec![[0.0, y0, 0.0], [size, y0, 0.0], [size, y1, 0.0], [0.0, y1, 0.0]],
    }
}

pub fn gate(side: Side, size: f32, neighbor: &str) -> BoundaryRecord {
    BoundaryRecord {
        neighbor: Some(neighbor.to_string()),
        points: wall(side, size, 0.0, size),
        collide: false,
    }
}

/// Cube region `[0, size]^3` whose local origin sits at `origin`.
pub fn square(name: &str, origin: [f32; 3], size: f32, boundaries: Vec<BoundaryRecord>) -> RegionRecord {
    block(name, origin, [size, size, size], boundaries)
}

pub fn block(name: &str, origin: [f32; 3], extent: [f32; 3], boundaries: Vec<BoundaryRecord>) -> RegionRecord {
    RegionRecord {
        name: name.to_string(),
        transform: TransformRecord {
            translation: origin,
            yaw_degrees: 0.0,
        },
        bounds: BoundsRecord {
            min: [0.0, 0.0, 0.0],
            max: extent,
        },
        sees_sky: false,
        boundaries,
        items: Vec::new(),
        terrain: None,
    }
}

pub fn item(name: &str, mesh: &str, at: [f32; 3]) -> ItemRecord {
    ItemRecord {
        name: name.to_string(),
        transform: TransformRecord {
            translation: at,
            yaw_degrees: 0.0,
        },
        mesh: Some(mesh.to_string()),
    }
}

pub fn assets() -> CollisionAssets {
    CollisionAssets::from_records(&[
        AssetRecord {
            name: "crate".into(),
            half_extents: Some([1.0, 1.0, 1.0]),
            triangles: Vec::new(),
        },
        // One upright triangle in the plane x = 0, long in z.
        AssetRecord {
            name: "fin".into(),
            half_extents: None,
            triangles: vec![[[0.0, 0.0, -8.0], [0.0, 0.0, 8.0], [0.0, 10.0, 0.0]]],
        },
    ])
    .unwrap()
}

pub fn config(grid_size: f32) -> SpaceConfig {
    SpaceConfig {
        grid_size,
        ..SpaceConfig::default()
    }
}

pub fn build(records: &[RegionRecord], grid_size: f32) -> (World, Vec<RegionId>) {
    let assets = assets();
    let mut world = World::new(config(grid_size));
    let mut ids = Vec::new();
    for r in records {
        let prepared = r.prepare(&assets).unwrap();
        ids.push(world.load_region(prepared).unwrap());
    }
    for id in &ids {
        world.bind_region(*id);
    }
    (world, ids)
}
