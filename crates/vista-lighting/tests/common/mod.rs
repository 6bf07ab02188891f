#![allow(dead_code)]

use hashbrown::HashMap;
use vista_lighting::{LightHandle, LightingStore};
use vista_world::record::{BoundaryRecord, BoundsRecord, RegionRecord, TransformRecord};
use vista_world::{CollisionAssets, RegionId, SpaceConfig, World};

#[derive(Clone, Copy, Debug)]
pub enum Side {
    East,
    West,
    North,
    South,
}

/// Gate on one side of the local cube `[0, 10]^3`, spanning heights
/// `0..height`.
pub fn gate(side: Side, neighbor: &str, height: f32) -> BoundaryRecord {
    let s = 10.0;
    let points = match side {
        Side::East => vec![[s, 0.0, 0.0], [s, 0.0, s], [s, height, s], [s, height, 0.0]],
        Side::West => vec![[0.0, 0.0, 0.0], [0.0, height, 0.0], [0.0, height, s], [0.0, 0.0, s]],
        Side::North => vec![[0.0, 0.0, s], [0.0, height, s], [s, height, s], [s, 0.0, s]],
        Side::South => vec![[0.0, 0.0, 0.0], [s, 0.0, 0.0], [s, height, 0.0], [0.0, height, 0.0]],
    };
    BoundaryRecord {
        neighbor: Some(neighbor.to_string()),
        points,
        collide: false,
    }
}

pub fn cell(name: &str, origin: [f32; 3], boundaries: Vec<BoundaryRecord>) -> RegionRecord {
    RegionRecord {
        name: name.to_string(),
        transform: TransformRecord {
            translation: origin,
            yaw_degrees: 0.0,
        },
        bounds: BoundsRecord {
            min: [0.0; 3],
            max: [10.0; 3],
        },
        sees_sky: false,
        boundaries,
        items: Vec::new(),
        terrain: None,
    }
}

pub struct Scene {
    pub world: World,
    pub lighting: LightingStore,
    pub ids: HashMap<String, RegionId>,
}

impl Scene {
    pub fn new(records: &[RegionRecord], max_seep_depth: u32) -> Self {
        let config = SpaceConfig {
            grid_size: 10.0,
            max_seep_depth,
            ..SpaceConfig::default()
        };
        let mut world = World::new(config.clone());
        let mut lighting = LightingStore::new(&config);
        let assets = CollisionAssets::new();
        let mut ids = HashMap::new();
        for r in records {
            let id = world.load_region(r.prepare(&assets).unwrap()).unwrap();
            lighting.touch(id);
            ids.insert(r.name.clone(), id);
        }
        for r in records {
            let id = ids[&r.name];
            world.bind_region(id);
            lighting.bind(&world, id);
        }
        lighting.refresh_dirty(&world);
        Scene { world, lighting, ids }
    }

    pub fn id(&self, name: &str) -> RegionId {
        self.ids[name]
    }

    /// Declares a light in `region` and brings every cache up to date.
    pub fn add(&mut self, region: &str, light: &LightHandle) {
        let id = self.id(region);
        assert!(self.lighting.add_light(&self.world, id, light));
        self.lighting.refresh_dirty(&self.world);
    }

    /// How many times `light` appears in the aggregate of `region`.
    pub fn count(&mut self, region: &str, light: &LightHandle) -> usize {
        let id = self.id(region);
        self.lighting
            .all_lights(&self.world, id)
            .map_or(0, |all| all.iter().filter(|l| l.ptr_eq(light)).count())
    }

    pub fn sees(&mut self, region: &str, light: &LightHandle) -> bool {
        self.count(region, light) == 1
    }
}

/// Four cells in a square: A at the origin, B east of it, C north, D
/// diagonal. A and B share a gate only `ab_height` tall.
pub fn diamond(ab_height: f32) -> Vec<RegionRecord> {
    vec![
        cell(
            "a",
            [0.0, 0.0, 0.0],
            vec![gate(Side::East, "b", ab_height), gate(Side::North, "c", 10.0)],
        ),
        cell(
            "b",
            [10.0, 0.0, 0.0],
            vec![gate(Side::West, "a", ab_height), gate(Side::North, "d", 10.0)],
        ),
        cell(
            "c",
            [0.0, 0.0, 10.0],
            vec![gate(Side::South, "a", 10.0), gate(Side::East, "d", 10.0)],
        ),
        cell(
            "d",
            [10.0, 0.0, 10.0],
            vec![gate(Side::South, "b", 10.0), gate(Side::West, "c", 10.0)],
        ),
    ]
}

/// `n` cells in a row along +x, each gated to the next.
pub fn chain(n: usize) -> Vec<RegionRecord> {
    (0..n)
        .map(|i| {
            let mut gates = Vec::new();
            if i > 0 {
                gates.push(gate(Side::West, &format!("x{}", i - 1), 10.0));
            }
            if i + 1 < n {
                gates.push(gate(Side::East, &format!("x{}", i + 1), 10.0));
            }
            cell(&format!("x{}", i), [i as f32 * 10.0, 0.0, 0.0], gates)
        })
        .collect()
}
