//! Component-layer error types.

use crate::component::ComponentKind;
use crate::entity::EntityId;

/// Errors that can occur while attaching components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// A second instance of a single-instance component kind was added.
    /// The registry is left unchanged.
    #[error("{entity} already has a {kind} component")]
    DuplicateComponent {
        /// The entity that rejected the component.
        entity: EntityId,
        /// The kind that is already attached.
        kind: ComponentKind,
    },
}
