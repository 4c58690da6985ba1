//! # engine_state
//!
//! State-driven component lifecycle.
//!
//! An entity's behaviour is split into mutually exclusive states. Entering a
//! state attaches the components it declares and leaving it removes them
//! again, so the entity's component set always matches its current state.
//!
//! - [`EntityState`]: lifecycle interface for a closed set of states.
//! - [`NextStates`]: explicit open / closed transition policy.
//! - [`StateDefinition`] / [`ComponentDescriptor`]: per-state component lists.
//! - [`LifecycleSynchronizer`]: applies those lists on entry and exit.
//! - [`StateMachine`]: validated transitions and hook ordering.
//! - [`MultistateEntity`]: an entity that owns its state machine.

pub mod definition;
pub mod error;
pub mod machine;
pub mod multistate;
pub mod state;
pub mod sync;

pub use definition::{ComponentDescriptor, StateDefinition};
pub use error::{StateError, TransitionRejection};
pub use machine::{StateMachine, Transition};
pub use multistate::MultistateEntity;
pub use state::{EntityState, NextStates, SelfTransition};
pub use sync::LifecycleSynchronizer;
