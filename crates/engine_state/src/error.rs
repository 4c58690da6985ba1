//! State machine error types.

/// Why a transition request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    /// The target is registered but not a valid next state of the current state.
    #[error("not a valid next state")]
    Unreachable,
    /// The target was never registered with the state machine.
    #[error("not registered")]
    Unregistered,
}

/// Errors returned by [`StateMachine`](crate::StateMachine).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A transition was requested that the machine does not allow. The
    /// current state and the entity's components are left unchanged.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
        reason: TransitionRejection,
    },

    /// The initial state passed at construction has no definition.
    #[error("initial state {0} is not registered")]
    UnregisteredState(&'static str),

    /// Two definitions were supplied for the same state.
    #[error("state {0} is registered more than once")]
    DuplicateState(&'static str),
}

impl StateError {
    /// Returns `true` for [`StateError::InvalidTransition`].
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_includes_reason() {
        let err = StateError::InvalidTransition {
            from: "Title",
            to: "GameOver",
            reason: TransitionRejection::Unreachable,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition from Title to GameOver: not a valid next state"
        );
        assert_eq!(TransitionRejection::Unregistered.to_string(), "not registered");
    }
}
