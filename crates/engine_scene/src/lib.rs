//! # engine_scene
//!
//! Scenes and the game loop built on top of state-driven entities.
//!
//! - [`ComponentSystems`]: the order in which a scene updates component kinds.
//! - [`Scene`] / [`SceneEntity`]: the entities presenting a game state.
//! - [`GameState`] / [`GameCoordinator`]: the shared top-level state machine
//!   and the scene switching that follows it.
//! - [`TickLoop`] / [`TickConfig`]: fixed-timestep driving of the coordinator.

pub mod coordinator;
pub mod scene;
pub mod scene_entity;
pub mod systems;
pub mod tick;

pub use coordinator::{GameCoordinator, GameState};
pub use scene::Scene;
pub use scene_entity::SceneEntity;
pub use systems::{ComponentSystems, OrderProblem, OrderViolation};
pub use tick::{TickConfig, TickLoop};
