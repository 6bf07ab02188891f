//! Scene files: collision assets, regions and the lights they declare.

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use vista_geom::{Transform, Vec3};
use vista_lighting::{Light, LightHandle, LightKind};
use vista_world::SpaceConfig;
use vista_world::record::{AssetRecord, RegionRecord};

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LightShapeRecord {
    Directional {
        direction: [f32; 3],
    },
    Omni {
        position: [f32; 3],
        #[serde(default)]
        inner_radius: f32,
        outer_radius: f32,
    },
    Spot {
        position: [f32; 3],
        direction: [f32; 3],
        #[serde(default)]
        inner_radius: f32,
        outer_radius: f32,
        /// Cone half-angle.
        #[serde(default = "default_cone_degrees")]
        cone_degrees: f32,
    },
}

fn default_cone_degrees() -> f32 {
    30.0
}

fn default_colour() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A light declared in its region's local space.
#[derive(Clone, Debug, Deserialize)]
pub struct LightRecord {
    #[serde(flatten)]
    pub shape: LightShapeRecord,
    #[serde(default = "default_colour")]
    pub colour: [f32; 3],
    #[serde(default)]
    pub priority: i32,
}

impl LightRecord {
    pub fn local_kind(&self) -> LightKind {
        match self.shape {
            LightShapeRecord::Directional { direction } => LightKind::Directional {
                direction: Vec3::from_array(direction).normalized(),
            },
            LightShapeRecord::Omni {
                position,
                inner_radius,
                outer_radius,
            } => LightKind::Omni {
                position: Vec3::from_array(position),
                inner_radius,
                outer_radius,
            },
            LightShapeRecord::Spot {
                position,
                direction,
                inner_radius,
                outer_radius,
                cone_degrees,
            } => LightKind::Spot {
                position: Vec3::from_array(position),
                direction: Vec3::from_array(direction).normalized(),
                inner_radius,
                outer_radius,
                cone_cos: cone_degrees.to_radians().cos(),
            },
        }
    }

    /// Builds the light placed in the world by `region_transform`.
    pub fn instantiate(&self, region_transform: &Transform) -> LightHandle {
        LightHandle::new(Light::new(
            self.local_kind().transformed(region_transform),
            self.colour,
            self.priority,
        ))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionEntry {
    #[serde(flatten)]
    pub record: RegionRecord,
    #[serde(default, rename = "light")]
    pub lights: Vec<LightRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: Option<SpaceConfig>,
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetRecord>,
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionEntry>,
}

impl Scene {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let scene: Scene = toml::from_str(s)?;
        if let Some(cfg) = &scene.config {
            cfg.validate()?;
        }
        Ok(scene)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
