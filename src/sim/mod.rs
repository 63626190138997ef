//! Simulation core
//!
//! Bodies, the lazy-removal registries, AABB physics and the fixed-step
//! engine loop. Single threaded and deterministic:
//! - Fixed timestep only
//! - Registration order drives every iteration
//! - Removal is deferred to sweep points, never done mid-walk

pub mod body;
pub mod clock;
pub mod collider;
pub mod engine;
pub mod physics;
pub mod scene_list;
pub mod world;

pub use body::{Body, Edges, Rect};
pub use clock::FixedClock;
pub use collider::{ColliderId, HitCallback};
pub use engine::{Behavior, Draw, Engine, SceneObject, UpdateContext};
pub use physics::{Physics, clamp_to_bounds, resolve_collision};
pub use scene_list::SceneList;
pub use world::{Entity, EntityId, World};
