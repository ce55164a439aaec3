//! Per-frame simulation step
//!
//! One call to [`tick`] runs a full frame: effect expiry, spawning, motion,
//! collisions, scoring, wave advancement, misses, particles and the
//! game-over check, in that order.

use glam::Vec2;

use super::collision::process_collisions;
use super::director;
use super::entity::{EntityId, create_projectile};
use super::kinematics::{
    advance_particle, advance_projectile, advance_target, projectile_off_screen, target_escaped,
};
use super::scoring::{apply_destroyed, apply_escaped, check_wave_advance};
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// Input sampled at the start of a frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest aim position (playfield x), if the pointer moved
    pub aim_x: Option<f32>,
}

/// Advance the game state by one variable-length frame
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32, tuning: &Tuning) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.game_over {
        return events;
    }
    let dt_ms = dt_ms.max(0.0);

    if let Some(x) = input.aim_x {
        state.aim_x = tuning.playfield.clamp_x(x, tuning.cannon_width / 2.0);
    }

    state.clock_ms += dt_ms as f64;
    let now = state.clock_ms;

    for effect in state.effects.expire(now) {
        log::debug!("Effect expired: {:?}", effect);
        events.push(GameEvent::EffectExpired { effect });
    }
    if state
        .celebration
        .is_some_and(|c| !c.is_visible(now, tuning.combo.celebration_ms))
    {
        state.celebration = None;
    }

    // Spawn
    if state.spawner.advance(dt_ms, state.wave, &tuning.difficulty) {
        let target = director::spawn(&mut state.ids, &mut state.rng, state.wave, tuning);
        state.targets.push(target);
    }

    // Move
    let projectiles: Vec<_> = std::mem::take(&mut state.projectiles)
        .into_iter()
        .map(|p| advance_projectile(p, dt_ms))
        .filter(|p| !projectile_off_screen(p))
        .collect();
    let targets: Vec<_> = std::mem::take(&mut state.targets)
        .into_iter()
        .map(|t| advance_target(t, dt_ms, &tuning.playfield))
        .collect();

    // Hit
    let outcome = process_collisions(projectiles, targets);
    state.projectiles = outcome.projectiles;
    apply_destroyed(state, &outcome.destroyed, tuning, &mut events);
    check_wave_advance(state, tuning, &mut events);

    // Miss
    let escape_y = tuning.playfield.escape_y();
    let (escaped, remaining): (Vec<_>, Vec<_>) = outcome
        .targets
        .into_iter()
        .partition(|t| target_escaped(t, escape_y));
    state.targets = remaining;
    apply_escaped(state, &escaped, &mut events);

    state.particles = std::mem::take(&mut state.particles)
        .into_iter()
        .map(|p| advance_particle(p, dt_ms))
        .filter(|p| p.life > 0.0)
        .collect();

    if state.lives == 0 {
        state.game_over = true;
        log::info!("Game over with score {}", state.score);
        events.push(GameEvent::GameOver {
            final_score: state.score,
        });
    }

    events
}

/// Fire from the current aim position.
///
/// The projectile joins the live set immediately rather than waiting for the
/// next frame. Returns `None` while the cannon is cooling down or after game
/// over.
pub fn fire(state: &mut GameState, tuning: &Tuning) -> Option<EntityId> {
    if state.game_over || state.fire_cooldown_remaining(tuning) > 0.0 {
        return None;
    }
    let origin = Vec2::new(
        state.aim_x,
        tuning.playfield.height - tuning.projectile.spawn_offset,
    );
    let projectile = create_projectile(&mut state.ids, origin, tuning);
    let id = projectile.id;
    state.projectiles.push(projectile);
    state.last_fire_ms = Some(state.clock_ms);
    Some(id)
}
