//! Per-state component lists.
//!
//! A [`StateDefinition`] declares which components a state adds when it is
//! entered and which kinds it removes when it exits. The state does not own
//! the attached components; it only describes them.

use std::fmt;

use engine_component::{Component, ComponentKind, ComponentType};

enum ComponentSource {
    Factory(Box<dyn Fn() -> Box<dyn Component>>),
    Instance(Option<Box<dyn Component>>),
}

/// Describes one component a state adds on entry.
pub struct ComponentDescriptor {
    kind: ComponentKind,
    source: ComponentSource,
}

impl ComponentDescriptor {
    /// Build a fresh `T::default()` on every entry.
    #[must_use]
    pub fn of<T: ComponentType + Default>() -> Self {
        Self::from_fn(T::default)
    }

    /// Build a fresh instance with `make` on every entry.
    #[must_use]
    pub fn from_fn<T, F>(make: F) -> Self
    where
        T: ComponentType,
        F: Fn() -> T + 'static,
    {
        Self {
            kind: T::KIND,
            source: ComponentSource::Factory(Box::new(move || {
                Box::new(make()) as Box<dyn Component>
            })),
        }
    }

    /// Reuse one provided instance. It moves onto the entity on entry and
    /// back into this descriptor when the state's exit removes it.
    ///
    /// The instance only returns through exit reconciliation. If it is
    /// detached some other way (for example with
    /// `Entity::remove_component`) and dropped, later entries skip it.
    #[must_use]
    pub fn instance<C: Component>(component: C) -> Self {
        Self {
            kind: component.kind(),
            source: ComponentSource::Instance(Some(Box::new(component))),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Returns `true` for an instance descriptor whose instance is currently
    /// attached to the entity.
    #[must_use]
    pub fn is_lent(&self) -> bool {
        matches!(self.source, ComponentSource::Instance(None))
    }

    /// Produce the component to attach, or `None` if the provided instance
    /// is already lent out.
    pub(crate) fn take(&mut self) -> Option<Box<dyn Component>> {
        match &mut self.source {
            ComponentSource::Factory(make) => Some(make()),
            ComponentSource::Instance(slot) => slot.take(),
        }
    }

    /// Park a detached instance back into an instance descriptor. Returns the
    /// component unchanged if this descriptor does not take it back.
    pub(crate) fn restore(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        match &mut self.source {
            ComponentSource::Instance(slot @ None) if component.kind() == self.kind => {
                *slot = Some(component);
                None
            }
            _ => Some(component),
        }
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ComponentSource::Factory(_) => "factory",
            ComponentSource::Instance(Some(_)) => "instance",
            ComponentSource::Instance(None) => "instance (lent)",
        };
        f.debug_struct("ComponentDescriptor")
            .field("kind", &self.kind)
            .field("source", &source)
            .finish()
    }
}

/// The component lists of one state.
#[derive(Debug)]
pub struct StateDefinition<S> {
    state: S,
    components_to_add_on_entry: Vec<ComponentDescriptor>,
    components_to_remove_on_exit: Vec<ComponentKind>,
}

impl<S: Copy> StateDefinition<S> {
    /// A definition with empty lists.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            state,
            components_to_add_on_entry: Vec::new(),
            components_to_remove_on_exit: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> S {
        self.state
    }

    /// Append components to add on entry, in order.
    #[must_use]
    pub fn adding_on_entry(
        mut self,
        descriptors: impl IntoIterator<Item = ComponentDescriptor>,
    ) -> Self {
        self.components_to_add_on_entry.extend(descriptors);
        self
    }

    /// Append kinds to remove on exit.
    #[must_use]
    pub fn removing_on_exit(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        for kind in kinds {
            if !self.components_to_remove_on_exit.contains(&kind) {
                self.components_to_remove_on_exit.push(kind);
            }
        }
        self
    }

    /// Replace the exit list with exactly the kinds added on entry, so every
    /// component this state introduces is gone once it exits.
    pub fn sync_component_arrays(&mut self) -> &mut Self {
        let mut kinds: Vec<ComponentKind> = Vec::new();
        for descriptor in &self.components_to_add_on_entry {
            if !kinds.contains(&descriptor.kind) {
                kinds.push(descriptor.kind);
            }
        }
        self.components_to_remove_on_exit = kinds;
        self
    }

    /// Builder form of [`StateDefinition::sync_component_arrays`].
    #[must_use]
    pub fn synced(mut self) -> Self {
        self.sync_component_arrays();
        self
    }

    /// Kinds added on entry, in declaration order.
    pub fn components_to_add_on_entry(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components_to_add_on_entry.iter().map(|d| d.kind)
    }

    #[must_use]
    pub fn components_to_remove_on_exit(&self) -> &[ComponentKind] {
        &self.components_to_remove_on_exit
    }

    /// Returns `true` if `kind` is in the entry list.
    #[must_use]
    pub fn adds_on_entry(&self, kind: ComponentKind) -> bool {
        self.components_to_add_on_entry.iter().any(|d| d.kind == kind)
    }

    pub(crate) fn descriptors_mut(&mut self) -> &mut [ComponentDescriptor] {
        &mut self.components_to_add_on_entry
    }

    /// Offer a detached component back to the entry list. Returns it again
    /// if no instance descriptor takes it.
    pub(crate) fn restore(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let mut component = component;
        for descriptor in &mut self.components_to_add_on_entry {
            match descriptor.restore(component) {
                None => return None,
                Some(rejected) => component = rejected,
            }
        }
        Some(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Gun {
        rounds: u32,
    }

    impl ComponentType for Gun {
        const KIND: ComponentKind = ComponentKind::from_name("Gun");
    }

    impl Component for Gun {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }
    }

    #[derive(Debug, Default)]
    struct Shield;

    impl ComponentType for Shield {
        const KIND: ComponentKind = ComponentKind::from_name("Shield");
    }

    impl Component for Shield {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }
    }

    #[test]
    fn test_exit_list_defaults_to_empty() {
        let def = StateDefinition::new(1u8).adding_on_entry([ComponentDescriptor::of::<Gun>()]);
        assert!(def.components_to_remove_on_exit().is_empty());
        assert!(def.adds_on_entry(Gun::KIND));
    }

    #[test]
    fn test_sync_component_arrays_mirrors_entry_list() {
        let def = StateDefinition::new(1u8)
            .adding_on_entry([
                ComponentDescriptor::of::<Gun>(),
                ComponentDescriptor::of::<Shield>(),
                ComponentDescriptor::of::<Gun>(),
            ])
            .removing_on_exit([ComponentKind::from_name("Other")])
            .synced();
        assert_eq!(def.components_to_remove_on_exit(), &[Gun::KIND, Shield::KIND]);
    }

    #[test]
    fn test_factory_builds_fresh_instances() {
        let mut descriptor = ComponentDescriptor::from_fn(|| Gun { rounds: 6 });
        let first = descriptor.take().unwrap();
        let second = descriptor.take().unwrap();
        assert_eq!(first.downcast_ref::<Gun>().unwrap().rounds, 6);
        assert_eq!(second.kind(), Gun::KIND);
        assert!(!descriptor.is_lent());
    }

    #[test]
    fn test_instance_is_lent_and_restored() {
        let mut def = StateDefinition::new(1u8)
            .adding_on_entry([ComponentDescriptor::instance(Gun { rounds: 3 })]);

        let gun = def.descriptors_mut()[0].take().unwrap();
        assert!(def.descriptors_mut()[0].is_lent());
        assert!(def.descriptors_mut()[0].take().is_none());

        assert!(def.restore(Box::new(Shield)).is_some());
        assert!(def.restore(gun).is_none());
        let again = def.descriptors_mut()[0].take().unwrap();
        assert_eq!(again.downcast_ref::<Gun>().unwrap().rounds, 3);
    }
}
