use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct SpaceConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
    #[serde(default = "default_obstacle_tree_depth")]
    pub obstacle_tree_depth: u32,
    #[serde(default = "default_max_seep_depth")]
    pub max_seep_depth: u32,
    #[serde(default)]
    pub span: GridSpan,
    #[serde(default)]
    pub sky: SkyConfig,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            obstacle_tree_depth: default_obstacle_tree_depth(),
            max_seep_depth: default_max_seep_depth(),
            span: GridSpan::default(),
            sky: SkyConfig::default(),
        }
    }
}

fn default_grid_size() -> f32 {
    100.0
}
fn default_obstacle_tree_depth() -> u32 {
    5
}
fn default_max_seep_depth() -> u32 {
    2
}

impl SpaceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: SpaceConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(self.grid_size > 0.0) {
            return Err(format!("grid_size must be positive, got {}", self.grid_size).into());
        }
        if self.span.min_x > self.span.max_x || self.span.min_z > self.span.max_z {
            return Err("span min must not exceed max".into());
        }
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

/// Inclusive range of grid coordinates in which columns may exist.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct GridSpan {
    #[serde(default = "default_span_min")]
    pub min_x: i32,
    #[serde(default = "default_span_min")]
    pub min_z: i32,
    #[serde(default = "default_span_max")]
    pub max_x: i32,
    #[serde(default = "default_span_max")]
    pub max_z: i32,
}

fn default_span_min() -> i32 {
    -64
}
fn default_span_max() -> i32 {
    63
}

impl Default for GridSpan {
    fn default() -> Self {
        Self {
            min_x: default_span_min(),
            min_z: default_span_min(),
            max_x: default_span_max(),
            max_z: default_span_max(),
        }
    }
}

impl GridSpan {
    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Lighting seeded into regions that can see the sky.
#[derive(Clone, Debug, Deserialize)]
pub struct SkyConfig {
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],
    #[serde(default = "default_sun_direction")]
    pub sun_direction: [f32; 3],
    #[serde(default = "default_sun_colour")]
    pub sun_colour: [f32; 3],
}

fn default_ambient() -> [f32; 3] {
    [0.1, 0.1, 0.12]
}
fn default_sun_direction() -> [f32; 3] {
    [0.3, -1.0, 0.2]
}
fn default_sun_colour() -> [f32; 3] {
    [1.0, 0.95, 0.85]
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            ambient: default_ambient(),
            sun_direction: default_sun_direction(),
            sun_colour: default_sun_colour(),
        }
    }
}
