//! Core [`Component`] trait and component kind identity.
//!
//! A component is a unit of behaviour or data attached to exactly one entity
//! at a time. Components are stored as trait objects, so every component
//! reports its [`ComponentKind`] at runtime, and concrete types additionally
//! expose it statically through [`ComponentType::KIND`].
//!
//! ## Kind Identity
//!
//! [`ComponentKind`] is derived from the kind's **string name** using the
//! FNV-1a 64-bit hash algorithm. The hash is computed in a `const fn`, so
//! kinds can be used in `const` dependency lists.

use std::any::Any;
use std::fmt;

use crate::entity::{EntityId, NodeHandle};
use crate::registry::CoComponents;

/// Identifies a kind of component. At most one instance of each kind may be
/// attached to an entity unless the component opts into multiple instances.
///
/// Two kinds are equal when they were created from the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind {
    id: u64,
    name: &'static str,
}

impl ComponentKind {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentKind`] for a component name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &'static str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self { id: hash, name }
    }

    /// Returns the hashed identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }

    /// Returns the human-readable kind name (e.g. `"PhysicsComponent"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns the kind of a concrete component type.
    #[must_use]
    pub fn of<T: ComponentType>() -> Self {
        T::KIND
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What a component learns about its owner when it is attached or detached.
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
    /// The entity the component is being attached to or detached from.
    pub entity: EntityId,
    /// The entity's primary visual anchor, if it has a visual representation.
    pub node: Option<&'a NodeHandle>,
}

/// The core component trait.
///
/// Every hook has a default no-op implementation; a component only
/// overrides what it needs.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, ComponentKind, ComponentType};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     current: f32,
/// }
///
/// impl ComponentType for Health {
///     const KIND: ComponentKind = ComponentKind::from_name("Health");
/// }
///
/// impl Component for Health {
///     fn kind(&self) -> ComponentKind {
///         Self::KIND
///     }
/// }
/// ```
pub trait Component: Any + fmt::Debug {
    /// The kind of this component instance.
    fn kind(&self) -> ComponentKind;

    /// Kinds of co-components that must be attached to the same entity for
    /// this component to function. Per-frame updates are skipped while any
    /// of them is absent.
    fn required_components(&self) -> &[ComponentKind] {
        &[]
    }

    /// Whether an entity may hold more than one instance of this kind.
    fn allows_multiple_instances(&self) -> bool {
        false
    }

    /// Called once, right after the component has been attached.
    fn did_add_to_entity(&mut self, _attachment: Attachment<'_>) {}

    /// Called once, right before the component is detached.
    fn will_remove_from_entity(&mut self, _attachment: Attachment<'_>) {}

    /// Per-frame update. `seconds` is the time elapsed since the last update.
    ///
    /// Only called when every kind in [`Component::required_components`] is
    /// present on the entity.
    fn update(&mut self, _co_components: &mut CoComponents<'_>, _seconds: f64) {}
}

/// Static kind information for concrete component types.
pub trait ComponentType: Component + Sized {
    /// The kind shared by every instance of this type.
    const KIND: ComponentKind;
}

impl dyn Component {
    /// Returns `true` if this component is of concrete type `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcast to a concrete component type.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Downcast to a concrete component type, mutably.
    #[must_use]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}
