//! Lifecycle synchronizer: reconciles an entity's components with the
//! component lists of the state it is entering or leaving.
//!
//! Entry attaches every declared component whose kind was not present
//! before entry. Exit removes the kinds on the exit list, except kinds that are
//! also on the entry list but were already present at entry. Together these
//! rules make entering a synced state and leaving it again restore the
//! entity's original kind set.

use tracing::{debug, warn};

use engine_component::{ComponentKind, Entity};

use crate::definition::StateDefinition;

/// Tracks which kinds the current state actually attached on entry.
#[derive(Debug, Default)]
pub struct LifecycleSynchronizer {
    introduced: Vec<ComponentKind>,
}

impl LifecycleSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds attached by the most recent entry.
    #[must_use]
    pub fn introduced(&self) -> &[ComponentKind] {
        &self.introduced
    }

    /// Attach the entry components of `definition` to `entity`.
    pub fn enter_state<S: Copy>(&mut self, definition: &mut StateDefinition<S>, entity: &mut Entity) {
        self.introduced.clear();
        let present: Vec<ComponentKind> = entity.registry().kinds().collect();

        for descriptor in definition.descriptors_mut() {
            let kind = descriptor.kind();
            if present.contains(&kind) {
                debug!(entity = %entity.id(), %kind, "component already present, not re-adding");
                continue;
            }
            let Some(component) = descriptor.take() else {
                warn!(entity = %entity.id(), %kind, "provided instance was never returned, skipping");
                continue;
            };
            match entity.add_boxed(component) {
                Ok(()) if !self.introduced.contains(&kind) => self.introduced.push(kind),
                Ok(()) => {}
                Err(e) => debug!(entity = %entity.id(), %e, "entry component rejected"),
            }
        }
    }

    /// Remove the exit components of `definition` from `entity`, returning
    /// provided instances to their descriptors.
    pub fn exit_state<S: Copy>(&mut self, definition: &mut StateDefinition<S>, entity: &mut Entity) {
        let kinds = definition.components_to_remove_on_exit().to_vec();

        for kind in kinds {
            if definition.adds_on_entry(kind) && !self.introduced.contains(&kind) {
                debug!(entity = %entity.id(), %kind, "keeping component this state did not introduce");
                continue;
            }
            for component in entity.registry_mut().remove_all(kind) {
                // Components no descriptor takes back are dropped here.
                let _ = definition.restore(component);
            }
        }

        self.introduced.clear();
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Component, ComponentType, EntityId};

    use super::*;
    use crate::definition::ComponentDescriptor;

    #[derive(Debug, Default)]
    struct Engine {
        boost: u32,
    }

    impl ComponentType for Engine {
        const KIND: ComponentKind = ComponentKind::from_name("Engine");
    }

    impl Component for Engine {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }
    }

    #[derive(Debug, Default)]
    struct Radar;

    impl ComponentType for Radar {
        const KIND: ComponentKind = ComponentKind::from_name("Radar");
    }

    impl Component for Radar {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }
    }

    #[derive(Debug)]
    struct Trail(u32);

    impl ComponentType for Trail {
        const KIND: ComponentKind = ComponentKind::from_name("Trail");
    }

    impl Component for Trail {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }

        fn allows_multiple_instances(&self) -> bool {
            true
        }
    }

    fn kinds(entity: &Entity) -> Vec<ComponentKind> {
        entity.registry().kinds().collect()
    }

    #[test]
    fn test_enter_then_exit_restores_kind_set() {
        let mut entity = Entity::new(EntityId(1), "ship");
        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([ComponentDescriptor::of::<Engine>(), ComponentDescriptor::of::<Radar>()])
            .synced();
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        assert_eq!(kinds(&entity), vec![Engine::KIND, Radar::KIND]);
        assert_eq!(sync.introduced(), &[Engine::KIND, Radar::KIND]);

        sync.exit_state(&mut def, &mut entity);
        assert!(kinds(&entity).is_empty());
    }

    #[test]
    fn test_preexisting_kind_is_neither_readded_nor_removed() {
        let mut entity = Entity::new(EntityId(1), "ship");
        entity.add_component(Engine { boost: 7 }).unwrap();

        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([ComponentDescriptor::of::<Engine>(), ComponentDescriptor::of::<Radar>()])
            .synced();
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        assert_eq!(entity.component::<Engine>().unwrap().boost, 7);
        assert_eq!(sync.introduced(), &[Radar::KIND]);

        sync.exit_state(&mut def, &mut entity);
        assert_eq!(kinds(&entity), vec![Engine::KIND]);
    }

    #[test]
    fn test_unsynced_state_leaves_components_behind() {
        let mut entity = Entity::new(EntityId(1), "ship");
        let mut def = StateDefinition::new(0u8).adding_on_entry([ComponentDescriptor::of::<Radar>()]);
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        sync.exit_state(&mut def, &mut entity);
        assert_eq!(kinds(&entity), vec![Radar::KIND]);
    }

    #[test]
    fn test_explicit_exit_kind_is_removed_even_if_not_added() {
        let mut entity = Entity::new(EntityId(1), "ship");
        entity.add_component(Engine::default()).unwrap();
        let mut def = StateDefinition::new(0u8).removing_on_exit([Engine::KIND]);
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        sync.exit_state(&mut def, &mut entity);
        assert!(kinds(&entity).is_empty());
    }

    #[test]
    fn test_provided_instance_is_reused_across_entries() {
        let mut entity = Entity::new(EntityId(1), "ship");
        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([ComponentDescriptor::instance(Engine { boost: 1 })])
            .synced();
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        entity.component_mut::<Engine>().unwrap().boost = 42;
        sync.exit_state(&mut def, &mut entity);
        assert!(!entity.has_component(Engine::KIND));

        sync.enter_state(&mut def, &mut entity);
        assert_eq!(entity.component::<Engine>().unwrap().boost, 42);
    }

    #[test]
    fn test_entry_attaches_every_declared_multi_instance() {
        let mut entity = Entity::new(EntityId(1), "ship");
        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([
                ComponentDescriptor::from_fn(|| Trail(1)),
                ComponentDescriptor::from_fn(|| Trail(2)),
            ])
            .synced();
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        assert_eq!(entity.registry().len(), 2);
        assert_eq!(sync.introduced(), &[Trail::KIND]);

        sync.exit_state(&mut def, &mut entity);
        assert!(entity.registry().is_empty());
    }

    #[test]
    fn test_preexisting_multi_instance_kind_is_not_added_again() {
        let mut entity = Entity::new(EntityId(1), "ship");
        entity.add_component(Trail(0)).unwrap();
        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([
                ComponentDescriptor::from_fn(|| Trail(1)),
                ComponentDescriptor::from_fn(|| Trail(2)),
            ]);
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        assert_eq!(entity.registry().len(), 1);
        assert!(sync.introduced().is_empty());
    }

    #[test]
    fn test_dropped_instance_is_not_replaced() {
        let mut entity = Entity::new(EntityId(1), "ship");
        let mut def = StateDefinition::new(0u8)
            .adding_on_entry([ComponentDescriptor::instance(Engine { boost: 3 })]);
        let mut sync = LifecycleSynchronizer::new();

        sync.enter_state(&mut def, &mut entity);
        drop(entity.remove_component(Engine::KIND));
        assert!(def.descriptors_mut()[0].is_lent());

        sync.enter_state(&mut def, &mut entity);
        assert!(!entity.has_component(Engine::KIND));
    }
}
