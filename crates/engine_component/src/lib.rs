//! # engine_component
//!
//! The "C" in the engine: what a component is, how an entity holds its
//! components, and how components find the co-components they depend on.
//!
//! This crate provides:
//!
//! - [`Component`] trait: attach/detach hooks, per-frame update, declared
//!   dependencies.
//! - [`ComponentKind`]: deterministic, name-derived component identity.
//! - [`Entity`] / [`EntityId`] / [`NodeHandle`]: named component containers.
//! - [`ComponentRegistry`]: insertion-ordered per-entity component storage.
//! - [`CoComponents`]: the view a component gets of its siblings while updating.

pub mod component;
pub mod entity;
pub mod error;
pub mod registry;

pub use component::{Attachment, Component, ComponentKind, ComponentType};
pub use entity::{Entity, EntityId, NodeHandle};
pub use error::ComponentError;
pub use registry::{CoComponents, ComponentRegistry};
