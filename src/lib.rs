//! Brickfall - a tiny 2D arcade engine and the brick breakout game on top
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, AABB physics, engine loop)
//! - `renderer`: Drawing contract, viewport and backends
//! - `assets`: Asset loading bookkeeping and load events
//! - `input`: Keyboard state
//! - `platform`: Browser glue (animation frames, key listeners, image fetch)
//! - `breakout`: The game script

pub mod assets;
pub mod breakout;
pub mod config;
pub mod error;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::WorldConfig;
pub use error::{AssetError, ConfigError};
pub use sim::{Engine, EntityId, SceneObject};

/// Engine configuration constants
pub mod consts {
    /// Default fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock delta banked per frame (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;
}
