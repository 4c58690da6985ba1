//! Entities and entity identifiers.
//!
//! An [`Entity`] is a named container that exclusively owns its components
//! through a [`ComponentRegistry`]. [`EntityId`] is the lightweight `u64`
//! identifier used in logs, errors and scene lookups.

use std::fmt;

use tracing::debug;

use crate::component::{Component, ComponentKind, ComponentType};
use crate::error::ComponentError;
use crate::registry::ComponentRegistry;

/// A unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Opaque handle to an entity's primary visual node, owned by the rendering
/// layer. Components receive it when they are attached or detached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    /// Identifier assigned by the rendering layer.
    pub id: u64,
    /// Node name, used for diagnostics.
    pub name: String,
}

impl NodeHandle {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A named bag of components.
#[derive(Debug)]
pub struct Entity {
    name: String,
    registry: ComponentRegistry,
}

impl Entity {
    /// Create an entity without a visual node.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: ComponentRegistry::new(id),
        }
    }

    /// Create an entity whose components are attached with `node` as their anchor.
    #[must_use]
    pub fn with_node(id: EntityId, name: impl Into<String>, node: NodeHandle) -> Self {
        Self {
            name: name.into(),
            registry: ComponentRegistry::with_node(id, node),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.registry.owner()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn node(&self) -> Option<&NodeHandle> {
        self.registry.node()
    }

    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Attach a component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateComponent`] if a single-instance
    /// component of the same kind is already attached.
    pub fn add_component<C: Component>(&mut self, component: C) -> Result<(), ComponentError> {
        self.registry.add(component)
    }

    /// Attach an already boxed component.
    ///
    /// # Errors
    ///
    /// See [`Entity::add_component`].
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> Result<(), ComponentError> {
        self.registry.add_boxed(component)
    }

    /// Attach components in order, stopping at the first rejected one.
    ///
    /// Components added before the failure stay attached.
    ///
    /// # Errors
    ///
    /// See [`Entity::add_component`].
    pub fn add_components(
        &mut self,
        components: impl IntoIterator<Item = Box<dyn Component>>,
    ) -> Result<(), ComponentError> {
        for component in components {
            self.registry.add_boxed(component)?;
        }
        Ok(())
    }

    /// Detach the first component of `kind`, returning it if one was attached.
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        self.registry.remove(kind)
    }

    /// Detach every component of each listed kind. Absent kinds are ignored.
    pub fn remove_components(&mut self, kinds: &[ComponentKind]) {
        for &kind in kinds {
            self.registry.remove_all(kind);
        }
    }

    /// Detach every component, in reverse insertion order.
    pub fn remove_all_components(&mut self) {
        debug!(entity = %self.id(), name = %self.name, "detaching all components");
        self.registry.clear();
    }

    #[must_use]
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.registry.contains(kind)
    }

    #[must_use]
    pub fn component<T: ComponentType>(&self) -> Option<&T> {
        self.registry.get::<T>()
    }

    #[must_use]
    pub fn component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.registry.get_mut::<T>()
    }

    /// Attached components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> + Clone + '_ {
        self.registry.components()
    }

    /// Returns `true` if a component of `kind` is attached and every kind it
    /// requires is attached as well.
    #[must_use]
    pub fn check_entity_for_required_components(&self, kind: ComponentKind) -> bool {
        self.registry
            .query(kind)
            .is_some_and(|component| self.registry.has_required_components(component))
    }

    /// Update every attached component in insertion order. Components with
    /// missing co-components are skipped.
    pub fn update(&mut self, seconds: f64) {
        self.registry.update_all(seconds);
    }

    /// Update only the components of `kind`. Returns how many were updated.
    pub fn update_components_of_kind(&mut self, kind: ComponentKind, seconds: f64) -> usize {
        self.registry.update_kind(kind, seconds)
    }
}
