//! An entity bundled with the state machine that drives its components.

use engine_component::Entity;

use crate::error::StateError;
use crate::machine::{StateMachine, Transition};
use crate::state::EntityState;

/// An [`Entity`] that owns its [`StateMachine`].
///
/// Construction starts the machine, so the initial state's `did_enter` hook
/// and entry components are applied before the entity is handed out.
#[derive(Debug)]
pub struct MultistateEntity<S: EntityState> {
    entity: Entity,
    machine: StateMachine<S>,
}

impl<S: EntityState> MultistateEntity<S> {
    /// Take ownership of `entity` and `machine` and start the machine.
    #[must_use]
    pub fn new(mut entity: Entity, mut machine: StateMachine<S>) -> Self {
        machine.start(&mut entity);
        Self { entity, machine }
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    #[must_use]
    pub fn machine(&self) -> &StateMachine<S> {
        &self.machine
    }

    #[must_use]
    pub fn current_state(&self) -> S {
        self.machine.current_state()
    }

    #[must_use]
    pub fn can_enter(&self, target: S) -> bool {
        self.machine.can_enter(target)
    }

    /// Transition the entity to `target`.
    ///
    /// # Errors
    ///
    /// See [`StateMachine::enter`].
    pub fn enter(&mut self, target: S) -> Result<Transition<S>, StateError> {
        self.machine.enter(target, &mut self.entity)
    }

    /// Update every component in insertion order, then the current state.
    pub fn update(&mut self, seconds: f64) {
        self.entity.update(seconds);
        self.update_state(seconds);
    }

    /// Run only the current state's per-frame hook.
    pub fn update_state(&mut self, seconds: f64) {
        self.machine.update(&mut self.entity, seconds);
    }

    #[must_use]
    pub fn into_parts(self) -> (Entity, StateMachine<S>) {
        (self.entity, self.machine)
    }
}
