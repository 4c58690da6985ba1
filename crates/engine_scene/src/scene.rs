//! Scenes: the entities presented for one or more game states.

use tracing::{debug, info, trace, warn};

use engine_component::{Entity, EntityId};

use crate::scene_entity::SceneEntity;
use crate::systems::ComponentSystems;

/// A named collection of entities updated through ordered component systems.
#[derive(Debug)]
pub struct Scene {
    name: &'static str,
    systems: ComponentSystems,
    entities: Vec<Box<dyn SceneEntity>>,
    paused_by_player: bool,
    updates_shared_entity: bool,
    frames: u64,
}

impl Scene {
    #[must_use]
    pub fn new(name: &'static str, systems: ComponentSystems) -> Self {
        Self {
            name,
            systems,
            entities: Vec::new(),
            paused_by_player: false,
            updates_shared_entity: true,
            frames: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn systems(&self) -> &ComponentSystems {
        &self.systems
    }

    /// Frames this scene has been updated for.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Add an entity. Components whose dependencies do not update before
    /// them are logged as warnings.
    pub fn add_entity<E: SceneEntity>(&mut self, entity: E) -> EntityId {
        let id = entity.id();
        for violation in self.systems.check_order(entity.entity()) {
            warn!(scene = self.name, entity = %id, %violation, "component update order");
        }
        debug!(scene = self.name, entity = %id, name = entity.entity().name(), "entity added");
        self.entities.push(Box::new(entity));
        id
    }

    /// Remove an entity, detaching all of its components.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Box<dyn SceneEntity>> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        let mut entity = self.entities.remove(index);
        entity.entity_mut().remove_all_components();
        debug!(scene = self.name, entity = %id, "entity removed");
        Some(entity)
    }

    /// Detach every entity. Called when the scene is replaced.
    pub fn unload(&mut self) {
        for entity in self.entities.iter_mut().rev() {
            entity.entity_mut().remove_all_components();
        }
        let count = self.entities.len();
        self.entities.clear();
        info!(scene = self.name, entities = count, frames = self.frames, "scene unloaded");
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&(dyn SceneEntity + 'static)> {
        self.entities.iter().find(|e| e.id() == id).map(|e| &**e)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut (dyn SceneEntity + 'static)> {
        self.entities
            .iter_mut()
            .find(|e| e.id() == id)
            .map(|e| &mut **e)
    }

    /// Find an entity by id and concrete type.
    #[must_use]
    pub fn get<E: SceneEntity>(&self, id: EntityId) -> Option<&E> {
        self.entity(id)?.downcast_ref::<E>()
    }

    pub fn get_mut<E: SceneEntity>(&mut self, id: EntityId) -> Option<&mut E> {
        self.entity_mut(id)?.downcast_mut::<E>()
    }

    /// First entity with the given name.
    #[must_use]
    pub fn entity_named(&self, name: &str) -> Option<&(dyn SceneEntity + 'static)> {
        self.entities
            .iter()
            .find(|e| e.entity().name() == name)
            .map(|e| &**e)
    }

    pub fn entities(&self) -> impl Iterator<Item = &(dyn SceneEntity + 'static)> + '_ {
        self.entities.iter().map(|e| &**e)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn is_paused_by_player(&self) -> bool {
        self.paused_by_player
    }

    /// While paused, the scene's own entities are neither updated by the
    /// systems nor given their state update.
    pub fn set_paused_by_player(&mut self, paused: bool) {
        if self.paused_by_player != paused {
            info!(scene = self.name, paused, "scene pause changed");
        }
        self.paused_by_player = paused;
    }

    #[must_use]
    pub fn updates_shared_entity(&self) -> bool {
        self.updates_shared_entity
    }

    /// Whether the systems also run over the coordinator's shared entity.
    pub fn set_updates_shared_entity(&mut self, updates: bool) {
        self.updates_shared_entity = updates;
    }

    /// Run one frame: each system over the shared entity and then the scene
    /// entities, followed by each scene entity's state update.
    pub fn update(&mut self, shared: &mut Entity, seconds: f64) {
        self.frames += 1;

        for kind in self.systems.kinds() {
            if self.updates_shared_entity {
                shared.update_components_of_kind(kind, seconds);
            }
            if self.paused_by_player {
                continue;
            }
            let mut updated = 0;
            for entity in &mut self.entities {
                updated += entity.entity_mut().update_components_of_kind(kind, seconds);
            }
            trace!(scene = self.name, %kind, updated, "system updated");
        }

        if self.paused_by_player {
            return;
        }
        for entity in &mut self.entities {
            entity.update_state(seconds);
        }
    }
}
