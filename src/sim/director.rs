//! Wave pacing: spawn cadence and difficulty scaling

use rand::Rng;

use super::entity::{IdGen, Target, create_power_up, create_target};
use crate::tuning::{Difficulty, Tuning};

/// Milliseconds between spawns on `wave`, never below the floor
pub fn spawn_interval(wave: u32, difficulty: &Difficulty) -> f32 {
    let steps = wave.saturating_sub(1) as f32;
    (difficulty.base_spawn_rate_ms - steps * difficulty.spawn_rate_decrease_ms)
        .max(difficulty.min_spawn_rate_ms)
}

/// Fall speed multiplier applied to targets spawned on `wave`
pub fn speed_multiplier(wave: u32, difficulty: &Difficulty) -> f32 {
    1.0 + wave.saturating_sub(1) as f32 * difficulty.speed_multiplier_increase
}

/// Accumulates frame time and decides when the next entity appears
#[derive(Debug, Clone, Default)]
pub struct SpawnDirector {
    pub timer_ms: f32,
}

impl SpawnDirector {
    /// Add `dt_ms`; returns true (and resets the timer) when a spawn is due
    pub fn advance(&mut self, dt_ms: f32, wave: u32, difficulty: &Difficulty) -> bool {
        self.timer_ms += dt_ms;
        if self.timer_ms >= spawn_interval(wave, difficulty) {
            self.timer_ms = 0.0;
            true
        } else {
            false
        }
    }
}

/// Build the entity for a due spawn: occasionally a power-up, otherwise a
/// weighted-random target for the current wave
pub fn spawn<R: Rng + ?Sized>(ids: &mut IdGen, rng: &mut R, wave: u32, tuning: &Tuning) -> Target {
    let chance = tuning.difficulty.power_up_chance.clamp(0.0, 1.0) as f64;
    if rng.random_bool(chance) {
        if let Some(power_up) = create_power_up(ids, rng, tuning) {
            return power_up;
        }
    }
    create_target(ids, rng, wave, tuning)
}
