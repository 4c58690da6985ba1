//! Per-entity component registry.
//!
//! The [`ComponentRegistry`] maps component kinds to component instances for
//! one entity. Components are kept in insertion order because per-entity
//! updates run in that order, and dependency-respecting scene systems rely
//! on the order components were attached in.

use tracing::{debug, trace, warn};

use crate::component::{Attachment, Component, ComponentKind, ComponentType};
use crate::entity::{EntityId, NodeHandle};
use crate::error::ComponentError;

/// Insertion-ordered storage for the components of a single entity.
#[derive(Debug)]
pub struct ComponentRegistry {
    /// The entity that owns every component in this registry.
    owner: EntityId,
    /// The owner's primary visual node, passed to attach/detach hooks.
    node: Option<NodeHandle>,
    /// Attached components, in insertion order.
    components: Vec<Box<dyn Component>>,
}

impl ComponentRegistry {
    /// Create an empty registry for an entity without a visual node.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            node: None,
            components: Vec::new(),
        }
    }

    /// Create an empty registry for an entity anchored to `node`.
    #[must_use]
    pub fn with_node(owner: EntityId, node: NodeHandle) -> Self {
        Self {
            owner,
            node: Some(node),
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    #[must_use]
    pub fn node(&self) -> Option<&NodeHandle> {
        self.node.as_ref()
    }

    /// Attach a component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateComponent`] if a component of the
    /// same kind is already attached and the new component does not allow
    /// multiple instances. The registry is left unchanged.
    pub fn add<C: Component>(&mut self, component: C) -> Result<(), ComponentError> {
        self.add_boxed(Box::new(component))
    }

    /// Attach an already boxed component.
    ///
    /// # Errors
    ///
    /// See [`ComponentRegistry::add`].
    pub fn add_boxed(&mut self, mut component: Box<dyn Component>) -> Result<(), ComponentError> {
        let kind = component.kind();

        if !component.allows_multiple_instances() && self.contains(kind) {
            warn!(entity = %self.owner, %kind, "rejected duplicate component");
            return Err(ComponentError::DuplicateComponent {
                entity: self.owner,
                kind,
            });
        }

        let missing = self.missing_components(component.required_components());
        if !missing.is_empty() {
            warn!(
                entity = %self.owner,
                %kind,
                missing = ?missing.iter().map(|k| k.name()).collect::<Vec<_>>(),
                "component attached without its required components"
            );
        }

        component.did_add_to_entity(Attachment {
            entity: self.owner,
            node: self.node.as_ref(),
        });
        self.components.push(component);

        debug!(entity = %self.owner, %kind, count = self.components.len(), "component attached");
        Ok(())
    }

    /// Detach the first component of `kind`.
    ///
    /// Returns `None` if no component of that kind is attached.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        let index = self.components.iter().position(|c| c.kind() == kind)?;
        Some(self.detach_at(index))
    }

    /// Detach every component of `kind`, returning them in insertion order.
    pub fn remove_all(&mut self, kind: ComponentKind) -> Vec<Box<dyn Component>> {
        let mut removed = Vec::new();
        while let Some(component) = self.remove(kind) {
            removed.push(component);
        }
        removed
    }

    /// Detach every component, last attached first.
    pub fn clear(&mut self) {
        while !self.components.is_empty() {
            let last = self.components.len() - 1;
            drop(self.detach_at(last));
        }
    }

    fn detach_at(&mut self, index: usize) -> Box<dyn Component> {
        self.components[index].will_remove_from_entity(Attachment {
            entity: self.owner,
            node: self.node.as_ref(),
        });
        let component = self.components.remove(index);
        debug!(entity = %self.owner, kind = %component.kind(), "component detached");
        component
    }

    /// Returns the first component of `kind`, if attached.
    #[must_use]
    pub fn query(&self, kind: ComponentKind) -> Option<&(dyn Component + 'static)> {
        self.components
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
    }

    /// Returns the first component of `kind` mutably, if attached.
    #[must_use]
    pub fn query_mut(&mut self, kind: ComponentKind) -> Option<&mut (dyn Component + 'static)> {
        self.components
            .iter_mut()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_mut())
    }

    #[must_use]
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.query(T::KIND)?.downcast_ref::<T>()
    }

    #[must_use]
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.query_mut(T::KIND)?.downcast_mut::<T>()
    }

    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    /// Attached components in insertion order.
    ///
    /// The iterator is lazy and can be cloned to restart from the beginning.
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> + Clone + '_ {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Kinds of the attached components in insertion order. A multi-instance
    /// kind appears once per instance.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + Clone + '_ {
        self.components.iter().map(|c| c.kind())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the kinds in `required` that are not attached.
    #[must_use]
    pub fn missing_components(&self, required: &[ComponentKind]) -> Vec<ComponentKind> {
        required
            .iter()
            .copied()
            .filter(|&kind| !self.contains(kind))
            .collect()
    }

    /// Returns `true` if every co-component `component` requires is attached.
    #[must_use]
    pub fn has_required_components(&self, component: &dyn Component) -> bool {
        component
            .required_components()
            .iter()
            .all(|&kind| self.contains(kind))
    }

    /// Update every component in insertion order.
    pub fn update_all(&mut self, seconds: f64) {
        for index in 0..self.components.len() {
            self.update_at(index, seconds);
        }
    }

    /// Update every component of `kind`. Returns how many were updated.
    pub fn update_kind(&mut self, kind: ComponentKind, seconds: f64) -> usize {
        let mut updated = 0;
        for index in 0..self.components.len() {
            if self.components[index].kind() == kind && self.update_at(index, seconds) {
                updated += 1;
            }
        }
        updated
    }

    /// Update the component at `index` unless a required co-component is
    /// missing. Returns whether the update ran.
    fn update_at(&mut self, index: usize, seconds: f64) -> bool {
        let (before, rest) = self.components.split_at_mut(index);
        let Some((current, after)) = rest.split_first_mut() else {
            return false;
        };

        let satisfied = current.required_components().iter().all(|&kind| {
            before
                .iter()
                .chain(after.iter())
                .any(|c| c.kind() == kind)
        });
        if !satisfied {
            trace!(
                entity = %self.owner,
                kind = %current.kind(),
                "skipping update, required components missing"
            );
            return false;
        }

        let mut co_components = CoComponents {
            entity: self.owner,
            node: self.node.as_ref(),
            before,
            after,
        };
        current.update(&mut co_components, seconds);
        true
    }
}

/// View of an entity's other components, handed to a component during its
/// per-frame update.
///
/// Co-components can be read and mutated but not attached or detached.
#[derive(Debug)]
pub struct CoComponents<'a> {
    entity: EntityId,
    node: Option<&'a NodeHandle>,
    before: &'a mut [Box<dyn Component>],
    after: &'a mut [Box<dyn Component>],
}

impl<'a> CoComponents<'a> {
    /// The entity being updated.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn node(&self) -> Option<&'a NodeHandle> {
        self.node
    }

    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.iter().any(|c| c.kind() == kind)
    }

    #[must_use]
    pub fn query(&self, kind: ComponentKind) -> Option<&(dyn Component + 'static)> {
        self.iter().find(|c| c.kind() == kind)
    }

    #[must_use]
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.query(T::KIND)?.downcast_ref::<T>()
    }

    #[must_use]
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|c| c.kind() == T::KIND)?
            .downcast_mut::<T>()
    }

    fn iter(&self) -> impl Iterator<Item = &(dyn Component + 'static)> + '_ {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|c| c.as_ref())
    }
}
