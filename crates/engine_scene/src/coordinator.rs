//! The game coordinator: the shared entity that owns the game's top-level
//! state machine, plus the scene currently presenting that state.
//!
//! Game states are ordinary [`EntityState`]s of the coordinator's entity, so
//! entering one reconciles the coordinator's components exactly like any
//! other multistate entity. In addition, every game state names the scene
//! that presents it. Entering a state whose scene name differs from the
//! current scene's unloads the old scene and builds a new one; states that
//! share a scene name keep the scene and its entities.

use tracing::{debug, info};

use engine_component::Entity;
use engine_state::{
    EntityState, MultistateEntity, SelfTransition, StateError, StateMachine, Transition,
};

use crate::scene::Scene;

/// A top-level game state presented by a scene.
pub trait GameState: EntityState {
    /// Name of the scene presenting this state. States returning the same
    /// name share one scene instance.
    fn scene_name(self) -> &'static str;

    /// Build this state's scene when no scene of that name is loaded.
    fn create_scene(self) -> Scene;

    /// Called once the scene presenting this state is in place. `from` is
    /// `None` for the initial state.
    fn scene_did_enter(self, _from: Option<Self>, _scene: &mut Scene) {}

    /// Called before leaving this state, while its scene is still loaded.
    fn scene_will_exit(self, _to: Self, _scene: &mut Scene) {}
}

/// Process-wide game context: the shared entity, its game state machine and
/// the current scene.
#[derive(Debug)]
pub struct GameCoordinator<G: GameState> {
    shared: MultistateEntity<G>,
    scene: Option<Scene>,
    scenes_loaded: u64,
}

impl<G: GameState> GameCoordinator<G> {
    /// Start the machine on `entity` and load the initial state's scene.
    #[must_use]
    pub fn new(entity: Entity, machine: StateMachine<G>) -> Self {
        let shared = MultistateEntity::new(entity, machine);
        let state = shared.current_state();
        let mut scene = state.create_scene();
        info!(state = state.name(), scene = scene.name(), "presenting initial scene");
        state.scene_did_enter(None, &mut scene);

        Self {
            shared,
            scene: Some(scene),
            scenes_loaded: 1,
        }
    }

    #[must_use]
    pub fn current_state(&self) -> G {
        self.shared.current_state()
    }

    #[must_use]
    pub fn can_enter(&self, target: G) -> bool {
        self.shared.can_enter(target)
    }

    #[must_use]
    pub fn machine(&self) -> &StateMachine<G> {
        self.shared.machine()
    }

    /// The shared entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        self.shared.entity()
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        self.shared.entity_mut()
    }

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Number of scenes built so far, including the initial one.
    #[must_use]
    pub fn scenes_loaded(&self) -> u64 {
        self.scenes_loaded
    }

    /// Enter a game state, switching scenes if the new state is presented
    /// by a different one.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidTransition`] if `target` cannot follow
    /// the current state. Nothing changes in that case.
    pub fn enter(&mut self, target: G) -> Result<Transition<G>, StateError> {
        let from = self.current_state();
        if self.will_transition(from, target)
            && let Some(scene) = self.scene.as_mut()
        {
            from.scene_will_exit(target, scene);
        }

        let outcome = self.shared.enter(target)?;
        if let Transition::Entered { from, to } = outcome {
            self.present(from, to);
        }
        Ok(outcome)
    }

    fn will_transition(&self, from: G, target: G) -> bool {
        let ignored = from == target && self.machine().self_transition() == SelfTransition::Ignore;
        !ignored && self.can_enter(target)
    }

    fn present(&mut self, from: G, to: G) {
        let replace = self
            .scene
            .as_ref()
            .is_none_or(|scene| scene.name() != to.scene_name());

        if replace {
            if let Some(mut old) = self.scene.take() {
                old.unload();
            }
            let scene = to.create_scene();
            info!(
                from = from.name(),
                to = to.name(),
                scene = scene.name(),
                "switching scene"
            );
            self.scene = Some(scene);
            self.scenes_loaded += 1;
        } else {
            debug!(from = from.name(), to = to.name(), "keeping scene");
        }

        if let Some(scene) = self.scene.as_mut() {
            to.scene_did_enter(Some(from), scene);
        }
    }

    /// Run one frame: the scene's systems (including the shared entity when
    /// the scene allows it), then the game state's own update.
    pub fn update(&mut self, seconds: f64) {
        match self.scene.as_mut() {
            Some(scene) => scene.update(self.shared.entity_mut(), seconds),
            None => self.shared.entity_mut().update(seconds),
        }
        self.shared.update_state(seconds);
    }

    /// Unload the scene and detach every component from the shared entity,
    /// returning the emptied entity.
    pub fn shutdown(mut self) -> Entity {
        if let Some(mut scene) = self.scene.take() {
            scene.unload();
        }
        let state = self.current_state();
        self.shared.entity_mut().remove_all_components();
        info!(
            state = state.name(),
            transitions = self.machine().transition_count(),
            scenes = self.scenes_loaded,
            "game coordinator shut down"
        );
        let (entity, _) = self.shared.into_parts();
        entity
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{CoComponents, Component, ComponentKind, ComponentType, EntityId};
    use engine_state::{NextStates, StateDefinition};

    use super::*;
    use crate::systems::ComponentSystems;

    #[derive(Debug, Default)]
    struct Score {
        frames: u32,
    }

    impl ComponentType for Score {
        const KIND: ComponentKind = ComponentKind::from_name("Score");
    }

    impl Component for Score {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }

        fn update(&mut self, _co_components: &mut CoComponents<'_>, _seconds: f64) {
            self.frames += 1;
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Flow {
        Menu,
        Playing,
        Paused,
    }

    impl EntityState for Flow {
        fn name(self) -> &'static str {
            match self {
                Flow::Menu => "Menu",
                Flow::Playing => "Playing",
                Flow::Paused => "Paused",
            }
        }

        fn valid_next_states(self) -> NextStates<Self> {
            match self {
                Flow::Menu => [Flow::Playing].into_iter().collect(),
                Flow::Playing => [Flow::Paused, Flow::Menu].into_iter().collect(),
                Flow::Paused => [Flow::Playing].into_iter().collect(),
            }
        }
    }

    impl GameState for Flow {
        fn scene_name(self) -> &'static str {
            match self {
                Flow::Menu => "MenuScene",
                Flow::Playing | Flow::Paused => "FieldScene",
            }
        }

        fn create_scene(self) -> Scene {
            let mut scene = Scene::new(self.scene_name(), ComponentSystems::default().with::<Score>());
            if self.scene_name() == "FieldScene" {
                scene.add_entity(Entity::new(EntityId(10), "player"));
            }
            scene
        }

        fn scene_did_enter(self, _from: Option<Self>, scene: &mut Scene) {
            if self == Flow::Paused {
                scene.set_paused_by_player(true);
                scene.set_updates_shared_entity(false);
            }
        }

        fn scene_will_exit(self, _to: Self, scene: &mut Scene) {
            if self == Flow::Paused {
                scene.set_paused_by_player(false);
                scene.set_updates_shared_entity(true);
            }
        }
    }

    fn coordinator() -> GameCoordinator<Flow> {
        let machine = StateMachine::new(
            vec![
                StateDefinition::new(Flow::Menu),
                StateDefinition::new(Flow::Playing),
                StateDefinition::new(Flow::Paused),
            ],
            Flow::Menu,
        )
        .unwrap();
        let mut entity = Entity::new(EntityId(0), "game");
        entity.add_component(Score::default()).unwrap();
        GameCoordinator::new(entity, machine)
    }

    #[test]
    fn test_initial_scene_is_loaded() {
        let game = coordinator();
        assert_eq!(game.current_state(), Flow::Menu);
        assert_eq!(game.scene().map(Scene::name), Some("MenuScene"));
        assert_eq!(game.scenes_loaded(), 1);
    }

    #[test]
    fn test_scene_switches_only_when_name_changes() {
        let mut game = coordinator();
        game.enter(Flow::Playing).unwrap();
        assert_eq!(game.scene().map(Scene::name), Some("FieldScene"));
        assert_eq!(game.scenes_loaded(), 2);

        game.enter(Flow::Paused).unwrap();
        game.enter(Flow::Playing).unwrap();
        assert_eq!(game.scenes_loaded(), 2);
        assert_eq!(game.scene().map(Scene::len), Some(1));

        game.enter(Flow::Menu).unwrap();
        assert_eq!(game.scene().map(Scene::name), Some("MenuScene"));
        assert_eq!(game.scenes_loaded(), 3);
    }

    #[test]
    fn test_pause_stops_shared_updates_until_resumed() {
        let mut game = coordinator();
        game.enter(Flow::Playing).unwrap();
        game.update(0.1);
        assert_eq!(game.entity().component::<Score>().unwrap().frames, 1);

        game.enter(Flow::Paused).unwrap();
        assert!(game.scene().unwrap().is_paused_by_player());
        game.update(0.1);
        assert_eq!(game.entity().component::<Score>().unwrap().frames, 1);

        game.enter(Flow::Playing).unwrap();
        assert!(!game.scene().unwrap().is_paused_by_player());
        game.update(0.1);
        assert_eq!(game.entity().component::<Score>().unwrap().frames, 2);
    }

    #[test]
    fn test_rejected_transition_keeps_scene() {
        let mut game = coordinator();
        let err = game.enter(Flow::Paused).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(game.current_state(), Flow::Menu);
        assert_eq!(game.scenes_loaded(), 1);
    }

    #[test]
    fn test_shutdown_detaches_shared_components() {
        let mut game = coordinator();
        game.enter(Flow::Playing).unwrap();
        assert!(game.entity().has_component(Score::KIND));
        let entity = game.shutdown();
        assert!(entity.registry().is_empty());
        assert_eq!(entity.id(), EntityId(0));
    }
}
