//! The [`EntityState`] lifecycle interface and transition policies.
//!
//! An entity's states form a closed set, normally a fieldless `enum`. Each
//! variant declares which states may follow it and can react to being
//! entered or exited by matching on the neighbouring state.

use std::fmt;
use std::hash::Hash;

use engine_component::Entity;

/// The set of states that may follow a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStates<S> {
    /// Any registered state may follow, including the state itself.
    Open,
    /// Only the listed states may follow. An empty list marks a terminal state.
    Closed(Vec<S>),
}

impl<S: PartialEq> NextStates<S> {
    /// A closed policy with no successors.
    #[must_use]
    pub fn terminal() -> Self {
        Self::Closed(Vec::new())
    }

    /// Returns `true` if `next` may follow under this policy.
    #[must_use]
    pub fn allows(&self, next: &S) -> bool {
        match self {
            Self::Open => true,
            Self::Closed(states) => states.contains(next),
        }
    }

    /// Returns `true` if no state may follow.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed(states) if states.is_empty())
    }
}

impl<S> FromIterator<S> for NextStates<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Closed(iter.into_iter().collect())
    }
}

/// What [`StateMachine::enter`](crate::StateMachine::enter) does when asked
/// to enter the state that is already current and the state lists itself as
/// a valid next state.
///
/// A self-transition the state does not allow is always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfTransition {
    /// Succeed without running hooks or touching components.
    #[default]
    Ignore,
    /// Run a full exit and entry cycle.
    Reenter,
}

/// Lifecycle interface shared by every state of one entity.
///
/// Hooks receive the owning entity so they can add or remove components
/// beyond the static lists declared in the state's
/// [`StateDefinition`](crate::StateDefinition). Hooks cannot fail: a
/// transition that passed validation always completes.
pub trait EntityState: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Name used in logs and errors.
    fn name(self) -> &'static str;

    /// States reachable from this one.
    fn valid_next_states(self) -> NextStates<Self> {
        NextStates::Open
    }

    /// Called after the current-state pointer has switched to this state and
    /// before component reconciliation. `from` is `None` when the machine
    /// starts in this state.
    ///
    /// The previous state's exit list is applied after this hook returns, so
    /// a component added here is removed again if its kind is on that list.
    /// Add such components in the state's entry list instead.
    fn did_enter(self, _from: Option<Self>, _entity: &mut Entity) {}

    /// Called before the current-state pointer switches away from this state.
    fn will_exit(self, _to: Self, _entity: &mut Entity) {}

    /// Per-frame hook while this state is current.
    fn update(self, _entity: &mut Entity, _seconds: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Door {
        Open,
        Shut,
        Broken,
    }

    #[test]
    fn test_open_policy_allows_everything() {
        let next: NextStates<Door> = NextStates::Open;
        assert!(next.allows(&Door::Open));
        assert!(next.allows(&Door::Broken));
        assert!(!next.is_terminal());
    }

    #[test]
    fn test_closed_policy_allows_only_listed() {
        let next: NextStates<Door> = [Door::Shut].into_iter().collect();
        assert!(next.allows(&Door::Shut));
        assert!(!next.allows(&Door::Open));
        assert!(!next.is_terminal());
    }

    #[test]
    fn test_terminal_is_distinct_from_open() {
        let terminal: NextStates<Door> = NextStates::terminal();
        assert!(terminal.is_terminal());
        assert!(!terminal.allows(&Door::Open));
        assert_ne!(terminal, NextStates::Open);
    }

    #[test]
    fn test_self_transition_default_is_ignore() {
        assert_eq!(SelfTransition::default(), SelfTransition::Ignore);
    }
}
