//! Per-entity state machine.
//!
//! The [`StateMachine`] owns the definitions of every state one entity can
//! be in, tracks the current state, enforces the transition graph declared
//! by [`EntityState::valid_next_states`] and drives the
//! [`LifecycleSynchronizer`] so the entity's components follow the state.
//!
//! A transition runs in a fixed order:
//!
//! 1. `current.will_exit(target)`
//! 2. switch the current-state pointer
//! 3. `target.did_enter(Some(previous))`
//! 4. exit reconciliation of the previous state, then entry reconciliation
//!    of the target
//!
//! Validation happens before step 1 and nothing after it can fail, so a
//! rejected transition leaves both the pointer and the components untouched.

use tracing::{debug, info, warn};

use engine_component::{ComponentKind, Entity};

use crate::definition::StateDefinition;
use crate::error::{StateError, TransitionRejection};
use crate::state::{EntityState, SelfTransition};
use crate::sync::LifecycleSynchronizer;

/// Outcome of a successful [`StateMachine::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// The machine moved from one state to another (or re-entered `to`).
    Entered { from: S, to: S },
    /// The target was already current and self-transitions are ignored.
    Unchanged(S),
}

/// A state machine over the closed state set `S`.
#[derive(Debug)]
pub struct StateMachine<S: EntityState> {
    /// One definition per registered state, in registration order.
    definitions: Vec<StateDefinition<S>>,
    current: S,
    previous: Option<S>,
    synchronizer: LifecycleSynchronizer,
    self_transition: SelfTransition,
    started: bool,
    transitions: u64,
}

impl<S: EntityState> StateMachine<S> {
    /// Create a machine from the complete set of state definitions.
    ///
    /// The set is fixed for the machine's lifetime. No hooks run until
    /// [`StateMachine::start`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError::DuplicateState`] if a state is defined twice and
    /// [`StateError::UnregisteredState`] if `initial` has no definition.
    pub fn new(definitions: Vec<StateDefinition<S>>, initial: S) -> Result<Self, StateError> {
        for (i, def) in definitions.iter().enumerate() {
            if definitions[..i].iter().any(|d| d.state() == def.state()) {
                return Err(StateError::DuplicateState(def.state().name()));
            }
        }
        if !definitions.iter().any(|d| d.state() == initial) {
            return Err(StateError::UnregisteredState(initial.name()));
        }

        Ok(Self {
            definitions,
            current: initial,
            previous: None,
            synchronizer: LifecycleSynchronizer::new(),
            self_transition: SelfTransition::default(),
            started: false,
            transitions: 0,
        })
    }

    /// Set how re-entering the current state behaves.
    #[must_use]
    pub fn with_self_transition(mut self, policy: SelfTransition) -> Self {
        self.self_transition = policy;
        self
    }

    #[must_use]
    pub fn current_state(&self) -> S {
        self.current
    }

    #[must_use]
    pub fn previous_state(&self) -> Option<S> {
        self.previous
    }

    /// Number of completed transitions, excluding ignored self-transitions.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn self_transition(&self) -> SelfTransition {
        self.self_transition
    }

    /// Registered states in registration order.
    pub fn states(&self) -> impl Iterator<Item = S> + '_ {
        self.definitions.iter().map(StateDefinition::state)
    }

    #[must_use]
    pub fn contains(&self, state: S) -> bool {
        self.definitions.iter().any(|d| d.state() == state)
    }

    #[must_use]
    pub fn definition(&self, state: S) -> Option<&StateDefinition<S>> {
        self.definitions.iter().find(|d| d.state() == state)
    }

    /// Kinds the current state attached when it was entered.
    #[must_use]
    pub fn introduced_components(&self) -> &[ComponentKind] {
        self.synchronizer.introduced()
    }

    /// Check a transition without performing it.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidTransition`] describing why `target`
    /// cannot be entered from the current state.
    pub fn validate(&self, target: S) -> Result<(), StateError> {
        let reason = if !self.contains(target) {
            TransitionRejection::Unregistered
        } else if !self.current.valid_next_states().allows(&target) {
            TransitionRejection::Unreachable
        } else {
            return Ok(());
        };
        Err(StateError::InvalidTransition {
            from: self.current.name(),
            to: target.name(),
            reason,
        })
    }

    /// Returns `true` if [`StateMachine::enter`] would accept `target`.
    #[must_use]
    pub fn can_enter(&self, target: S) -> bool {
        self.validate(target).is_ok()
    }

    /// Fire the initial state's `did_enter(None)` and attach its entry
    /// components. Does nothing if the machine has already started.
    pub fn start(&mut self, entity: &mut Entity) {
        if self.started {
            warn!(entity = %entity.id(), state = self.current.name(), "state machine already started");
            return;
        }
        self.started = true;

        let initial = self.current;
        info!(entity = %entity.id(), state = initial.name(), "state machine started");
        initial.did_enter(None, entity);
        if let Some(def) = self.definitions.iter_mut().find(|d| d.state() == initial) {
            self.synchronizer.enter_state(def, entity);
        }
    }

    /// Transition to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidTransition`] if `target` is not
    /// registered or is not a valid next state of the current state. The
    /// machine and the entity are unchanged in that case.
    pub fn enter(&mut self, target: S, entity: &mut Entity) -> Result<Transition<S>, StateError> {
        if let Err(e) = self.validate(target) {
            warn!(entity = %entity.id(), %e, "transition rejected");
            return Err(e);
        }

        let from = self.current;
        if from == target && self.self_transition == SelfTransition::Ignore {
            debug!(entity = %entity.id(), state = from.name(), "already in state");
            return Ok(Transition::Unchanged(from));
        }

        from.will_exit(target, entity);
        self.previous = Some(from);
        self.current = target;
        target.did_enter(Some(from), entity);

        if let Some(def) = self.definitions.iter_mut().find(|d| d.state() == from) {
            self.synchronizer.exit_state(def, entity);
        }
        if let Some(def) = self.definitions.iter_mut().find(|d| d.state() == target) {
            self.synchronizer.enter_state(def, entity);
        }

        self.transitions += 1;
        info!(
            entity = %entity.id(),
            from = from.name(),
            to = target.name(),
            components = entity.registry().len(),
            "state transition"
        );
        Ok(Transition::Entered { from, to: target })
    }

    /// Forward the per-frame update to the current state.
    pub fn update(&mut self, entity: &mut Entity, seconds: f64) {
        self.current.update(entity, seconds);
    }
}
