//! Component systems: the per-frame update order of component kinds.
//!
//! A scene does not update entities one at a time. It walks its
//! [`ComponentSystems`] list and, for each kind, updates that kind on every
//! entity before moving to the next kind. A component whose kind is not
//! listed is never updated by the scene.
//!
//! Components read their dependencies during `update`, so a dependency
//! should be listed before the component that requires it.
//! [`ComponentSystems::check_order`] reports entities whose components break
//! that rule.

use std::fmt;

use engine_component::{ComponentKind, ComponentType, Entity};

/// The ordered kinds a scene updates each frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSystems {
    kinds: Vec<ComponentKind>,
}

/// Why a component's position in the update order is unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderProblem {
    /// The required kind has no system, so it is never updated.
    NotListed,
    /// The required kind updates after the component that depends on it.
    ListedAfter,
}

/// A component whose dependency is not updated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderViolation {
    pub component: ComponentKind,
    pub dependency: ComponentKind,
    pub problem: OrderProblem,
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            OrderProblem::NotListed => {
                write!(f, "{} requires {}, which has no system", self.component, self.dependency)
            }
            OrderProblem::ListedAfter => {
                write!(f, "{} requires {}, which updates after it", self.component, self.dependency)
            }
        }
    }
}

impl ComponentSystems {
    /// Build from kinds in update order. Repeated kinds keep their first
    /// position.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        let mut systems = Self::default();
        for kind in kinds {
            systems.push(kind);
        }
        systems
    }

    /// Append a kind to the end of the update order.
    ///
    /// Returns `false` if the kind already has a system.
    pub fn push(&mut self, kind: ComponentKind) -> bool {
        if self.kinds.contains(&kind) {
            return false;
        }
        self.kinds.push(kind);
        true
    }

    /// Builder form of [`ComponentSystems::push`] for a concrete type.
    #[must_use]
    pub fn with<T: ComponentType>(mut self) -> Self {
        self.push(T::KIND);
        self
    }

    /// Position of `kind` in the update order.
    #[must_use]
    pub fn position(&self, kind: ComponentKind) -> Option<usize> {
        self.kinds.iter().position(|&k| k == kind)
    }

    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.position(kind).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.kinds.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Check every listed component on `entity` against the update order.
    ///
    /// Components whose kind has no system are not updated at all and are
    /// not reported.
    #[must_use]
    pub fn check_order(&self, entity: &Entity) -> Vec<OrderViolation> {
        let mut violations = Vec::new();

        for component in entity.components() {
            let kind = component.kind();
            let Some(own) = self.position(kind) else {
                continue;
            };

            for &dependency in component.required_components() {
                let problem = match self.position(dependency) {
                    None => OrderProblem::NotListed,
                    Some(dep) if dep > own => OrderProblem::ListedAfter,
                    Some(_) => continue,
                };
                let violation = OrderViolation {
                    component: kind,
                    dependency,
                    problem,
                };
                if !violations.contains(&violation) {
                    violations.push(violation);
                }
            }
        }

        violations
    }
}

impl FromIterator<ComponentKind> for ComponentSystems {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        Self::new(iter)
    }
}
