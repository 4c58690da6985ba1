//! Entities as a scene stores them.

use std::any::Any;
use std::fmt;

use engine_component::{Entity, EntityId};
use engine_state::{EntityState, MultistateEntity};

/// Anything a [`Scene`](crate::Scene) can hold: a plain [`Entity`] or an
/// entity driven by its own state machine.
pub trait SceneEntity: Any + fmt::Debug {
    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    /// Per-frame state hook, run after the scene's component systems.
    fn update_state(&mut self, _seconds: f64) {}

    fn id(&self) -> EntityId {
        self.entity().id()
    }
}

impl SceneEntity for Entity {
    fn entity(&self) -> &Entity {
        self
    }

    fn entity_mut(&mut self) -> &mut Entity {
        self
    }
}

impl<S: EntityState> SceneEntity for MultistateEntity<S> {
    fn entity(&self) -> &Entity {
        MultistateEntity::entity(self)
    }

    fn entity_mut(&mut self) -> &mut Entity {
        MultistateEntity::entity_mut(self)
    }

    fn update_state(&mut self, seconds: f64) {
        MultistateEntity::update_state(self, seconds);
    }
}

impl dyn SceneEntity {
    #[must_use]
    pub fn downcast_ref<E: SceneEntity>(&self) -> Option<&E> {
        (self as &dyn Any).downcast_ref::<E>()
    }

    #[must_use]
    pub fn downcast_mut<E: SceneEntity>(&mut self) -> Option<&mut E> {
        (self as &mut dyn Any).downcast_mut::<E>()
    }
}

#[cfg(test)]
mod tests {
    use engine_state::{StateDefinition, StateMachine};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Lamp {
        Lit,
    }

    impl EntityState for Lamp {
        fn name(self) -> &'static str {
            "Lit"
        }
    }

    #[test]
    fn test_downcast_to_concrete_entity_type() {
        let plain: Box<dyn SceneEntity> = Box::new(Entity::new(EntityId(1), "rock"));
        assert!(plain.downcast_ref::<Entity>().is_some());
        assert!(plain.downcast_ref::<MultistateEntity<Lamp>>().is_none());

        let machine = StateMachine::new(vec![StateDefinition::new(Lamp::Lit)], Lamp::Lit).unwrap();
        let mut lamp: Box<dyn SceneEntity> =
            Box::new(MultistateEntity::new(Entity::new(EntityId(2), "lamp"), machine));
        assert_eq!(lamp.id(), EntityId(2));
        let lamp = lamp.downcast_mut::<MultistateEntity<Lamp>>().unwrap();
        assert_eq!(lamp.current_state(), Lamp::Lit);
    }
}
