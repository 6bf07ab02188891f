//! Region partition of the world: the region arena and boundary graph, the
//! column grid with its per-column obstacle index, and sweep queries over it.
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod grid;
mod pending;
pub mod record;
mod region;
mod world;

pub use config::{GridSpan, SkyConfig, SpaceConfig};
pub use error::RegionRecordError;
pub use grid::{Column, RegionGrid};
pub use pending::PendingMappings;
pub use record::{CollisionAssets, PreparedRegion, RegionRecord};
pub use region::{Boundary, Region, RegionId, RegionItem};
pub use world::{DynamicId, World};

/// Two boundary polygons closer than this (per vertex) are one gate.
pub const BOUNDARY_EPSILON: f32 = 0.01;
