//! Game state and core simulation types
//!
//! Everything one play session mutates lives in [`GameState`]. It is only
//! ever changed inside [`super::tick`] and [`super::fire`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::director::SpawnDirector;
use super::entity::{EffectKind, EntityId, IdGen, Particle, Projectile, Target, TargetKind};
use super::scoring::{ActiveEffects, Combo, ComboCelebration};
use crate::tuning::Tuning;

/// Outbound notifications for audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    ScoreChanged { delta: i64, total: u64 },
    LifeLost { remaining: u32 },
    LifeGained { lives: u32 },
    WaveAdvanced { wave: u32 },
    TargetDestroyed { id: EntityId, kind: TargetKind },
    PowerUpCollected { effect: EffectKind },
    EffectExpired { effect: EffectKind },
    ComboCelebration { combo: u32 },
    GameOver { final_score: u64 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed this session's RNG was built from
    pub seed: u64,
    /// Simulation clock (sum of all frame deltas, ms)
    pub clock_ms: f64,
    pub score: u64,
    pub lives: u32,
    /// Current wave (1-based)
    pub wave: u32,
    pub combo: Combo,
    /// Timed power-up effects
    pub effects: ActiveEffects,
    pub celebration: Option<ComboCelebration>,
    /// Normal targets destroyed this session (drives wave advancement)
    pub normals_destroyed: u32,
    /// Cannon x position in playfield coordinates
    pub aim_x: f32,
    pub projectiles: Vec<Projectile>,
    pub targets: Vec<Target>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub spawner: SpawnDirector,
    /// Set once lives hit zero; the state no longer advances
    pub game_over: bool,
    pub(crate) last_fire_ms: Option<f64>,
    pub(crate) ids: IdGen,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            clock_ms: 0.0,
            score: 0,
            lives: tuning.initial_lives,
            wave: 1,
            combo: Combo::default(),
            effects: ActiveEffects::default(),
            celebration: None,
            normals_destroyed: 0,
            aim_x: tuning.playfield.width / 2.0,
            projectiles: Vec::new(),
            targets: Vec::new(),
            particles: Vec::new(),
            spawner: SpawnDirector::default(),
            game_over: false,
            last_fire_ms: None,
            ids: IdGen::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Milliseconds until the cannon may fire again
    pub fn fire_cooldown_remaining(&self, tuning: &Tuning) -> f64 {
        let cooldown = if self.effects.is_active(EffectKind::RapidFire) {
            tuning.rapid_fire_cooldown_ms
        } else {
            tuning.fire_cooldown_ms
        };
        match self.last_fire_ms {
            Some(last) => (last + cooldown - self.clock_ms).max(0.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let tuning = Tuning::default();
        let state = GameState::new(42, &tuning);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.wave, 1);
        assert_eq!(state.combo.count, 0);
        assert_eq!(state.aim_x, 400.0);
        assert!(state.projectiles.is_empty());
        assert!(state.targets.is_empty());
        assert!(!state.game_over);
    }

    #[test]
    fn test_sessions_have_independent_ids() {
        let tuning = Tuning::default();
        let mut a = GameState::new(1, &tuning);
        let mut b = GameState::new(1, &tuning);
        assert_eq!(a.next_entity_id(), 1);
        assert_eq!(a.next_entity_id(), 2);
        assert_eq!(b.next_entity_id(), 1);
    }

    #[test]
    fn test_events_serialize_tagged() {
        let json = serde_json::to_string(&GameEvent::WaveAdvanced { wave: 3 }).unwrap();
        assert_eq!(json, r#"{"event":"wave_advanced","wave":3}"#);
    }
}
