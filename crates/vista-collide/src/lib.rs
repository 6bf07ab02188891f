//! Collision primitives: shape adapters, obstacles, the per-column obstacle
//! index, grid traversal and the sweep continuation state machine.
#![forbid(unsafe_code)]

pub mod bsp;
mod grid_walk;
mod obstacle;
mod quad_tree;
mod shape;
mod sweep;
pub mod terrain;
mod visitors;

pub use bsp::BspTree;
pub use grid_walk::{GridStep, GridWalk};
pub use obstacle::{CollisionItem, MarkClock, Obstacle, QueryContext, UNMARKED};
pub use quad_tree::{ObstacleIndex, Traverse};
pub use shape::ShapeAdapter;
pub use sweep::{CollideVerdict, CollisionState, CollisionVisitor, Sweep, SweepShape};
pub use terrain::HeightField;
pub use visitors::{AnyObstacle, ClosestObstacle, ClosestTerrain, ClosestTriangle, HitRecorder, RecordedHit};
