//! Components used by the QuickStart game.
//!
//! These stand in for a renderer and physics engine: a node is a rectangle,
//! physics is explicit Euler integration, and pointer input is a queue of
//! synthetic events.

use glam::Vec2;
use tracing::debug;

use engine_component::{CoComponents, Component, ComponentKind, ComponentType};

/// The visual anchor of an entity: a rectangle centred on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeComponent {
    pub position: Vec2,
    pub half_extent: Vec2,
}

impl NodeComponent {
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            half_extent: size * 0.5,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = (point - self.position).abs();
        offset.x <= self.half_extent.x && offset.y <= self.half_extent.y
    }
}

impl ComponentType for NodeComponent {
    const KIND: ComponentKind = ComponentKind::from_name("NodeComponent");
}

impl Component for NodeComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }
}

/// A rigid body moving its entity's node.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    pub mass: f32,
    /// Fraction of velocity lost per second.
    pub damping: f32,
    pub velocity: Vec2,
    force: Vec2,
}

impl PhysicsComponent {
    #[must_use]
    pub fn new(mass: f32, damping: f32) -> Self {
        Self {
            mass,
            damping,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
        }
    }

    /// Accumulate a force for the next integration step.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    #[must_use]
    pub fn pending_force(&self) -> Vec2 {
        self.force
    }
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl ComponentType for PhysicsComponent {
    const KIND: ComponentKind = ComponentKind::from_name("PhysicsComponent");
}

impl Component for PhysicsComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn required_components(&self) -> &[ComponentKind] {
        const REQUIRED: &[ComponentKind] = &[NodeComponent::KIND];
        REQUIRED
    }

    fn update(&mut self, co_components: &mut CoComponents<'_>, seconds: f64) {
        let dt = seconds as f32;
        if self.mass > 0.0 {
            self.velocity += self.force / self.mass * dt;
        }
        self.velocity *= (1.0 - self.damping * dt).max(0.0);
        self.force = Vec2::ZERO;

        if let Some(node) = co_components.get_mut::<NodeComponent>() {
            node.position += self.velocity * dt;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Moved,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub location: Vec2,
}

impl PointerEvent {
    #[must_use]
    pub fn new(phase: PointerPhase, location: Vec2) -> Self {
        Self { phase, location }
    }
}

/// Device-agnostic pointer input. Events pushed between frames become
/// visible to other components on the next update.
#[derive(Debug, Default)]
pub struct PointerEventComponent {
    pending: Vec<PointerEvent>,
    pub pointer_began: Option<PointerEvent>,
    pub pointer_moved: Option<PointerEvent>,
    pub pointer_ended: Option<PointerEvent>,
    pub last_event: Option<PointerEvent>,
    pub second_last_event: Option<PointerEvent>,
}

impl PointerEventComponent {
    pub fn push(&mut self, event: PointerEvent) {
        self.pending.push(event);
    }
}

impl ComponentType for PointerEventComponent {
    const KIND: ComponentKind = ComponentKind::from_name("PointerEventComponent");
}

impl Component for PointerEventComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, _co_components: &mut CoComponents<'_>, _seconds: f64) {
        self.pointer_began = None;
        self.pointer_moved = None;
        self.pointer_ended = None;

        for event in self.pending.drain(..) {
            match event.phase {
                PointerPhase::Began => self.pointer_began = Some(event),
                PointerPhase::Moved => self.pointer_moved = Some(event),
                PointerPhase::Ended => self.pointer_ended = Some(event),
            }
            self.second_last_event = self.last_event;
            self.last_event = Some(event);
        }
    }
}

/// Pushes the entity's physics body along the pointer's drag, once a drag
/// starts on the entity's node.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerControlledForceComponent {
    pub boost: f32,
    pointing: bool,
}

impl PointerControlledForceComponent {
    #[must_use]
    pub fn new(boost: f32) -> Self {
        Self {
            boost,
            pointing: false,
        }
    }

    #[must_use]
    pub fn is_pointing(&self) -> bool {
        self.pointing
    }
}

impl Default for PointerControlledForceComponent {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ComponentType for PointerControlledForceComponent {
    const KIND: ComponentKind = ComponentKind::from_name("PointerControlledForceComponent");
}

impl Component for PointerControlledForceComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn required_components(&self) -> &[ComponentKind] {
        const REQUIRED: &[ComponentKind] = &[
            NodeComponent::KIND,
            PhysicsComponent::KIND,
            PointerEventComponent::KIND,
        ];
        REQUIRED
    }

    fn update(&mut self, co_components: &mut CoComponents<'_>, _seconds: f64) {
        let (Some(pointer), Some(node)) = (
            co_components.get::<PointerEventComponent>(),
            co_components.get::<NodeComponent>(),
        ) else {
            return;
        };
        let began = pointer.pointer_began;
        let moved = pointer.pointer_moved;
        let ended = pointer.pointer_ended;
        let previous = pointer.second_last_event;

        if began.is_some_and(|event| node.contains(event.location)) {
            self.pointing = true;
        }

        if self.pointing
            && let (Some(current), Some(previous)) = (moved, previous)
            && previous.phase != PointerPhase::Ended
        {
            let force = (current.location - previous.location) * self.boost;
            if let Some(physics) = co_components.get_mut::<PhysicsComponent>() {
                physics.apply_force(force);
            }
        }

        if self.pointing && ended.is_some() {
            self.pointing = false;
        }
    }
}

/// Game-wide counters kept on the coordinator's entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalDataComponent {
    pub frames: u64,
    pub seconds_elapsed: f64,
    pub play_seconds: f64,
    pub nodes_spawned: u32,
    pub games_over: u32,
}

impl ComponentType for GlobalDataComponent {
    const KIND: ComponentKind = ComponentKind::from_name("GlobalDataComponent");
}

impl Component for GlobalDataComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, _co_components: &mut CoComponents<'_>, seconds: f64) {
        self.frames += 1;
        self.seconds_elapsed += seconds;
    }
}

/// Spawns a decorative node every `interval` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpawnerComponent {
    pub interval: f64,
    since_last: f64,
    spawned: u32,
}

impl NodeSpawnerComponent {
    #[must_use]
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            since_last: 0.0,
            spawned: 0,
        }
    }

    /// Nodes spawned by this instance.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }
}

impl Default for NodeSpawnerComponent {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ComponentType for NodeSpawnerComponent {
    const KIND: ComponentKind = ComponentKind::from_name("NodeSpawnerComponent");
}

impl Component for NodeSpawnerComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn required_components(&self) -> &[ComponentKind] {
        const REQUIRED: &[ComponentKind] = &[GlobalDataComponent::KIND];
        REQUIRED
    }

    fn update(&mut self, co_components: &mut CoComponents<'_>, seconds: f64) {
        if self.interval <= 0.0 {
            return;
        }
        self.since_last += seconds;
        while self.since_last >= self.interval {
            self.since_last -= self.interval;
            self.spawned += 1;
            if let Some(global) = co_components.get_mut::<GlobalDataComponent>() {
                global.nodes_spawned += 1;
            }
            debug!(entity = %co_components.entity(), spawned = self.spawned, "spawned node");
        }
    }
}
