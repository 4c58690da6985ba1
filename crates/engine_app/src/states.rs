//! Game states, scenes and the ship's own states.

use glam::Vec2;
use tracing::{error, info, warn};

use engine_component::{Component, Entity, EntityId, NodeHandle};
use engine_scene::{ComponentSystems, GameCoordinator, GameState, Scene};
use engine_state::{
    ComponentDescriptor, EntityState, MultistateEntity, NextStates, StateDefinition, StateError,
    StateMachine,
};

use crate::components::{
    GlobalDataComponent, NodeComponent, NodeSpawnerComponent, PhysicsComponent,
    PointerControlledForceComponent, PointerEventComponent,
};

pub const COORDINATOR_ID: EntityId = EntityId(1);
pub const SHIP_ID: EntityId = EntityId(2);
pub const TITLE_ID: EntityId = EntityId(3);

pub const TITLE_SCENE: &str = "TitleScene";
pub const PLAY_SCENE: &str = "PlayScene";

/// Top-level flow of the QuickStart game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameFlow {
    Title,
    Play,
    Paused,
    GameOver,
}

impl EntityState for GameFlow {
    fn name(self) -> &'static str {
        match self {
            GameFlow::Title => "Title",
            GameFlow::Play => "Play",
            GameFlow::Paused => "Paused",
            GameFlow::GameOver => "GameOver",
        }
    }

    fn valid_next_states(self) -> NextStates<Self> {
        match self {
            GameFlow::Title => [GameFlow::Play].into_iter().collect(),
            GameFlow::Play => [GameFlow::Paused, GameFlow::GameOver].into_iter().collect(),
            GameFlow::Paused => [GameFlow::Play, GameFlow::Title].into_iter().collect(),
            GameFlow::GameOver => [GameFlow::Title].into_iter().collect(),
        }
    }

    fn did_enter(self, _from: Option<Self>, entity: &mut Entity) {
        if self == GameFlow::GameOver
            && let Some(global) = entity.component_mut::<GlobalDataComponent>()
        {
            global.games_over += 1;
        }
    }

    fn update(self, entity: &mut Entity, seconds: f64) {
        if self == GameFlow::Play
            && let Some(global) = entity.component_mut::<GlobalDataComponent>()
        {
            global.play_seconds += seconds;
        }
    }
}

impl GameState for GameFlow {
    fn scene_name(self) -> &'static str {
        match self {
            GameFlow::Title => TITLE_SCENE,
            GameFlow::Play | GameFlow::Paused | GameFlow::GameOver => PLAY_SCENE,
        }
    }

    fn create_scene(self) -> Scene {
        match self {
            GameFlow::Title => title_scene(),
            GameFlow::Play | GameFlow::Paused | GameFlow::GameOver => play_scene(),
        }
    }

    fn scene_did_enter(self, _from: Option<Self>, scene: &mut Scene) {
        match self {
            GameFlow::Paused => {
                scene.set_paused_by_player(true);
                scene.set_updates_shared_entity(false);
            }
            GameFlow::GameOver => {
                if let Some(ship) = scene.get_mut::<MultistateEntity<ShipState>>(SHIP_ID)
                    && let Err(e) = ship.enter(ShipState::Inactive)
                {
                    warn!(%e, "ship could not power down");
                }
            }
            GameFlow::Title | GameFlow::Play => {}
        }
    }

    fn scene_will_exit(self, _to: Self, scene: &mut Scene) {
        if self == GameFlow::Paused {
            scene.set_paused_by_player(false);
            scene.set_updates_shared_entity(true);
        }
    }
}

/// Build the coordinator in the Title state. `spawn_interval` configures the
/// node spawner the Play state adds.
///
/// # Errors
///
/// Returns an error if the game state graph is malformed.
pub fn build_coordinator(spawn_interval: f64) -> Result<GameCoordinator<GameFlow>, StateError> {
    let machine = StateMachine::new(
        vec![
            StateDefinition::new(GameFlow::Title),
            StateDefinition::new(GameFlow::Play)
                .adding_on_entry([ComponentDescriptor::from_fn(move || {
                    NodeSpawnerComponent::new(spawn_interval)
                })])
                .synced(),
            StateDefinition::new(GameFlow::Paused),
            StateDefinition::new(GameFlow::GameOver),
        ],
        GameFlow::Title,
    )?;

    let mut entity = Entity::new(COORDINATOR_ID, "GameCoordinator");
    if let Err(e) = entity.add_component(GlobalDataComponent::default()) {
        error!(%e, "global data not attached");
    }
    Ok(GameCoordinator::new(entity, machine))
}

fn title_scene() -> Scene {
    let mut scene = Scene::new(TITLE_SCENE, ComponentSystems::default().with::<GlobalDataComponent>());
    let mut title = Entity::with_node(TITLE_ID, "TitleEntity", NodeHandle::new(TITLE_ID.id(), "title-label"));
    if let Err(e) = title.add_component(NodeComponent::new(Vec2::new(0.0, 200.0), Vec2::new(400.0, 40.0))) {
        error!(%e, "title node not attached");
    }
    scene.add_entity(title);
    scene
}

fn play_scene() -> Scene {
    let systems = ComponentSystems::default()
        .with::<PointerEventComponent>()
        .with::<NodeComponent>()
        .with::<PhysicsComponent>()
        .with::<PointerControlledForceComponent>()
        .with::<GlobalDataComponent>()
        .with::<NodeSpawnerComponent>();
    let mut scene = Scene::new(PLAY_SCENE, systems);

    match spawn_ship() {
        Ok(ship) => {
            scene.add_entity(ship);
        }
        Err(e) => error!(%e, "ship not spawned"),
    }
    scene
}

/// The player's ship: idle until activated, then driven by pointer drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipState {
    Inactive,
    Active,
}

impl EntityState for ShipState {
    fn name(self) -> &'static str {
        match self {
            ShipState::Inactive => "Inactive",
            ShipState::Active => "Active",
        }
    }

    fn valid_next_states(self) -> NextStates<Self> {
        match self {
            ShipState::Inactive => [ShipState::Active].into_iter().collect(),
            ShipState::Active => [ShipState::Inactive].into_iter().collect(),
        }
    }

    fn did_enter(self, from: Option<Self>, entity: &mut Entity) {
        if from.is_some() {
            info!(entity = %entity.id(), state = self.name(), "ship state changed");
        }
    }
}

/// Build the ship entity with its Inactive/Active machine.
///
/// # Errors
///
/// Returns an error if the ship's state graph is malformed.
pub fn spawn_ship() -> Result<MultistateEntity<ShipState>, StateError> {
    let machine = StateMachine::new(
        vec![
            StateDefinition::new(ShipState::Inactive),
            StateDefinition::new(ShipState::Active)
                .adding_on_entry([
                    ComponentDescriptor::from_fn(|| PhysicsComponent::new(1.0, 0.8)),
                    ComponentDescriptor::of::<PointerControlledForceComponent>(),
                ])
                .synced(),
        ],
        ShipState::Inactive,
    )?;

    let mut ship = Entity::with_node(SHIP_ID, "Ship", NodeHandle::new(SHIP_ID.id(), "ship-sprite"));
    let components: [Box<dyn Component>; 2] = [
        Box::new(NodeComponent::new(Vec2::ZERO, Vec2::splat(32.0))),
        Box::new(PointerEventComponent::default()),
    ];
    if let Err(e) = ship.add_components(components) {
        error!(%e, "ship components not attached");
    }

    Ok(MultistateEntity::new(ship, machine))
}

#[cfg(test)]
mod tests {
    use engine_component::ComponentType;

    use super::*;

    fn ship_kinds(game: &GameCoordinator<GameFlow>) -> Vec<&'static str> {
        let ship = game
            .scene()
            .and_then(|scene| scene.get::<MultistateEntity<ShipState>>(SHIP_ID))
            .unwrap();
        ship.entity().registry().kinds().map(|k| k.name()).collect()
    }

    #[test]
    fn test_game_starts_on_title_scene() {
        let game = build_coordinator(0.5).unwrap();
        assert_eq!(game.current_state(), GameFlow::Title);
        let scene = game.scene().unwrap();
        assert_eq!(scene.name(), TITLE_SCENE);
        assert!(scene.entity(TITLE_ID).is_some());
        assert!(game.entity().has_component(GlobalDataComponent::KIND));
    }

    #[test]
    fn test_play_adds_spawner_and_loads_play_scene() {
        let mut game = build_coordinator(0.5).unwrap();
        game.enter(GameFlow::Play).unwrap();
        assert!(game.entity().has_component(NodeSpawnerComponent::KIND));
        assert_eq!(game.scene().map(Scene::name), Some(PLAY_SCENE));
        assert_eq!(ship_kinds(&game), vec!["NodeComponent", "PointerEventComponent"]);

        game.enter(GameFlow::GameOver).unwrap();
        assert!(!game.entity().has_component(NodeSpawnerComponent::KIND));
        assert_eq!(game.entity().component::<GlobalDataComponent>().unwrap().games_over, 1);
    }

    #[test]
    fn test_pause_freezes_play_scene() {
        let mut game = build_coordinator(0.1).unwrap();
        game.enter(GameFlow::Play).unwrap();
        game.update(0.25);
        let frames = game.entity().component::<GlobalDataComponent>().unwrap().frames;
        assert_eq!(frames, 1);

        game.enter(GameFlow::Paused).unwrap();
        game.update(0.25);
        let global = game.entity().component::<GlobalDataComponent>().unwrap();
        assert_eq!(global.frames, 1);
        assert_eq!(global.play_seconds, 0.25);

        game.enter(GameFlow::Play).unwrap();
        assert!(!game.scene().unwrap().is_paused_by_player());
        assert_eq!(game.scenes_loaded(), 2);
    }

    #[test]
    fn test_invalid_game_flow_is_rejected() {
        let mut game = build_coordinator(0.5).unwrap();
        assert!(game.enter(GameFlow::GameOver).is_err());
        assert_eq!(game.current_state(), GameFlow::Title);
    }

    #[test]
    fn test_ship_activation_round_trip() {
        let mut ship = spawn_ship().unwrap();
        ship.enter(ShipState::Active).unwrap();
        assert!(ship.entity().check_entity_for_required_components(PointerControlledForceComponent::KIND));

        ship.enter(ShipState::Inactive).unwrap();
        let kinds: Vec<_> = ship.entity().registry().kinds().collect();
        assert_eq!(kinds, vec![NodeComponent::KIND, PointerEventComponent::KIND]);
    }

    #[test]
    fn test_game_over_powers_down_ship() {
        let mut game = build_coordinator(0.5).unwrap();
        game.enter(GameFlow::Play).unwrap();
        game.scene_mut()
            .and_then(|scene| scene.get_mut::<MultistateEntity<ShipState>>(SHIP_ID))
            .unwrap()
            .enter(ShipState::Active)
            .unwrap();
        assert_eq!(ship_kinds(&game).len(), 4);

        game.enter(GameFlow::GameOver).unwrap();
        assert_eq!(ship_kinds(&game).len(), 2);
    }
}
