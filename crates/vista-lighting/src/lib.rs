//! Light visibility across region boundaries.
//!
//! Every region keeps an [`EmissionCache`]: the lights it declares itself and
//! an aggregate of every light that can reach it through at most
//! `max_seep_depth` boundaries. The aggregate is rebuilt lazily when dirty,
//! or patched in place when a single light moves.
#![forbid(unsafe_code)]

mod container;
mod light;
mod seep;
mod store;

pub use container::{EmissionCache, LightContainer};
pub use light::{Light, LightHandle, LightKind};
pub use seep::MOVE_COUNTER_CAPACITY;
pub use store::LightingStore;
