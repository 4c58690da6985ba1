//! Scripted input for the QuickStart game.
//!
//! The driver plays the part of a player: it requests game state changes
//! and feeds pointer events at the ticks named in [`ScriptConfig`].

use std::ops::ControlFlow;

use glam::Vec2;
use tracing::{debug, warn};

use engine_scene::GameCoordinator;
use engine_state::{EntityState, MultistateEntity};

use crate::components::{
    GlobalDataComponent, NodeComponent, PointerEvent, PointerEventComponent, PointerPhase,
};
use crate::config::ScriptConfig;
use crate::states::{GameFlow, SHIP_ID, ShipState};

/// Outcome of a scripted run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub ticks: u64,
    pub final_state: GameFlow,
    pub transitions: u64,
    pub rejected: u32,
    pub scenes_loaded: u64,
    pub nodes_spawned: u32,
    pub play_seconds: f64,
    pub ship_travel: f32,
}

#[derive(Debug)]
pub struct ScriptedDriver {
    script: ScriptConfig,
    pointer: Vec2,
    rejected: u32,
    ship_start: Option<Vec2>,
    ship_last: Option<Vec2>,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new(script: ScriptConfig) -> Self {
        Self {
            script,
            pointer: Vec2::ZERO,
            rejected: 0,
            ship_start: None,
            ship_last: None,
        }
    }

    /// Act on `tick`. Breaks once the script's last tick is reached.
    pub fn on_tick(&mut self, tick: u64, game: &mut GameCoordinator<GameFlow>) -> ControlFlow<()> {
        self.track_ship(game);

        let script = &self.script;
        let request = if tick == script.play_at || tick == script.resume_at {
            Some(GameFlow::Play)
        } else if tick == script.pause_at {
            Some(GameFlow::Paused)
        } else if tick == script.game_over_at {
            Some(GameFlow::GameOver)
        } else if tick == script.title_at {
            Some(GameFlow::Title)
        } else {
            None
        };
        if let Some(target) = request {
            self.request(game, target);
        }

        if tick == self.script.activate_ship_at {
            self.set_ship_state(game, ShipState::Active);
        }
        self.feed_pointer(tick, game);

        if tick >= self.script.stop_at {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn request(&mut self, game: &mut GameCoordinator<GameFlow>, target: GameFlow) {
        if let Err(e) = game.enter(target) {
            self.rejected += 1;
            warn!(%e, "scripted transition rejected");
        }
    }

    fn set_ship_state(&mut self, game: &mut GameCoordinator<GameFlow>, target: ShipState) {
        let Some(ship) = ship_mut(game) else {
            warn!(state = target.name(), "no ship in the current scene");
            return;
        };
        if let Err(e) = ship.enter(target) {
            self.rejected += 1;
            warn!(%e, "scripted ship transition rejected");
        }
    }

    fn feed_pointer(&mut self, tick: u64, game: &mut GameCoordinator<GameFlow>) {
        let start = self.script.drag_start;
        let end = start + self.script.drag_ticks;
        if tick < start || tick > end {
            return;
        }
        let Some(ship) = ship_mut(game) else {
            return;
        };
        let entity = ship.entity_mut();

        let event = if tick == start {
            let Some(node) = entity.component::<NodeComponent>() else {
                return;
            };
            self.pointer = node.position;
            PointerEvent::new(PointerPhase::Began, self.pointer)
        } else if tick == end {
            PointerEvent::new(PointerPhase::Ended, self.pointer)
        } else {
            self.pointer += self.script.drag_step;
            PointerEvent::new(PointerPhase::Moved, self.pointer)
        };

        if let Some(pointer) = entity.component_mut::<PointerEventComponent>() {
            debug!(tick, phase = ?event.phase, location = ?event.location, "pointer event");
            pointer.push(event);
        }
    }

    fn track_ship(&mut self, game: &mut GameCoordinator<GameFlow>) {
        let position = ship_mut(game)
            .and_then(|ship| ship.entity().component::<NodeComponent>())
            .map(|node| node.position);
        if let Some(position) = position {
            self.ship_start.get_or_insert(position);
            self.ship_last = Some(position);
        }
    }

    /// Summarise the run once the loop has stopped.
    #[must_use]
    pub fn summary(&self, ticks: u64, game: &GameCoordinator<GameFlow>) -> Summary {
        let global = game.entity().component::<GlobalDataComponent>();
        let ship_travel = match (self.ship_start, self.ship_last) {
            (Some(start), Some(last)) => start.distance(last),
            _ => 0.0,
        };
        Summary {
            ticks,
            final_state: game.current_state(),
            transitions: game.machine().transition_count(),
            rejected: self.rejected,
            scenes_loaded: game.scenes_loaded(),
            nodes_spawned: global.map_or(0, |g| g.nodes_spawned),
            play_seconds: global.map_or(0.0, |g| g.play_seconds),
            ship_travel,
        }
    }
}

fn ship_mut(game: &mut GameCoordinator<GameFlow>) -> Option<&mut MultistateEntity<ShipState>> {
    game.scene_mut()?.get_mut::<MultistateEntity<ShipState>>(SHIP_ID)
}

#[cfg(test)]
mod tests {
    use engine_scene::{TickConfig, TickLoop};

    use super::*;
    use crate::states::build_coordinator;

    fn short_script() -> ScriptConfig {
        ScriptConfig {
            play_at: 2,
            activate_ship_at: 3,
            drag_start: 4,
            drag_ticks: 5,
            drag_step: Vec2::new(4.0, 0.0),
            pause_at: 12,
            resume_at: 14,
            game_over_at: 20,
            title_at: 22,
            stop_at: 24,
        }
    }

    fn run(script: ScriptConfig, max_ticks: u64) -> Summary {
        let game = build_coordinator(0.0005).unwrap();
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks,
        };
        let mut tick_loop = TickLoop::new(config, game);
        let mut driver = ScriptedDriver::new(script);
        let ticks = tick_loop.run_with(|tick, game| driver.on_tick(tick, game));
        driver.summary(ticks, tick_loop.coordinator())
    }

    #[test]
    fn test_full_script_returns_to_title() {
        let summary = run(short_script(), 0);
        assert_eq!(summary.ticks, 24);
        assert_eq!(summary.final_state, GameFlow::Title);
        assert_eq!(summary.transitions, 5);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.scenes_loaded, 3);
        assert!(summary.nodes_spawned > 0);
        assert!(summary.play_seconds > 0.0);
        assert!(summary.ship_travel > 0.0);
    }

    #[test]
    fn test_max_ticks_cuts_script_short() {
        let summary = run(short_script(), 3);
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.final_state, GameFlow::Play);
        assert_eq!(summary.transitions, 1);
    }

    #[test]
    fn test_out_of_order_script_counts_rejections() {
        let mut script = short_script();
        script.pause_at = 1;
        let summary = run(script, 0);
        // Title cannot pause, and without the pause Play cannot resume into Play.
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.final_state, GameFlow::Title);
    }
}
