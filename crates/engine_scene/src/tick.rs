//! Fixed-timestep game loop.
//!
//! Each tick advances the coordinator by one frame of `1 / tick_rate`
//! seconds:
//!
//! 1. Run the current scene's component systems.
//! 2. Run the scene entities' state updates.
//! 3. Run the current game state's update.
//! 4. Hand the coordinator to the caller's per-tick callback, which may
//!    request game state changes or stop the loop.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::coordinator::{GameCoordinator, GameState};

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

impl TickConfig {
    /// Duration of one tick. A rate that does not give a representable tick
    /// duration falls back to the default rate.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        self.checked_tick_duration()
            .unwrap_or_else(|| Duration::from_secs_f64(1.0 / Self::default().tick_rate))
    }

    /// Duration of one tick, or `None` if `tick_rate` is not positive or is
    /// too small for the tick to fit in a [`Duration`].
    #[must_use]
    pub fn checked_tick_duration(&self) -> Option<Duration> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate).ok()
    }
}

/// Drives a [`GameCoordinator`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop<G: GameState> {
    /// Ticks run so far.
    tick_id: u64,
    config: TickConfig,
    coordinator: GameCoordinator<G>,
}

impl<G: GameState> TickLoop<G> {
    #[must_use]
    pub fn new(config: TickConfig, coordinator: GameCoordinator<G>) -> Self {
        Self {
            tick_id: 0,
            config,
            coordinator,
        }
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    #[must_use]
    pub fn coordinator(&self) -> &GameCoordinator<G> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut GameCoordinator<G> {
        &mut self.coordinator
    }

    #[must_use]
    pub fn into_coordinator(self) -> GameCoordinator<G> {
        self.coordinator
    }

    /// Advance the game by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.tick_id += 1;
        debug!(
            tick_id = self.tick_id,
            dt,
            state = self.coordinator.current_state().name(),
            "tick start"
        );
        self.coordinator.update(dt);
    }

    /// Run until `max_ticks` is reached, or forever if it is zero.
    /// Returns the number of ticks run.
    pub fn run(&mut self) -> u64 {
        self.run_with(|_, _| ControlFlow::Continue(()))
    }

    /// Like [`TickLoop::run`], calling `on_tick` after every tick. Returning
    /// [`ControlFlow::Break`] stops the loop.
    pub fn run_with<F>(&mut self, mut on_tick: F) -> u64
    where
        F: FnMut(u64, &mut GameCoordinator<G>) -> ControlFlow<()>,
    {
        let tick_duration = self.config.tick_duration();
        let dt = tick_duration.as_secs_f64();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(dt);
            tick_count += 1;

            if on_tick(self.tick_id, &mut self.coordinator).is_break() {
                info!(ticks = tick_count, "tick loop stopped");
                break;
            }
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }

        tick_count
    }
}
