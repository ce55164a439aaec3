//! Scoring, combo multiplier, timed effects and wave advancement
//!
//! Timed effects are a queue of `(expiry, effect)` entries kept sorted by
//! expiry and drained against the simulation clock once per frame, so
//! nothing outside the frame step ever touches them.

use serde::Serialize;

use super::entity::{EffectKind, ParticleTag, Target, TargetKind, create_explosion};
use super::state::{GameEvent, GameState};
use crate::consts::MAX_PARTICLES;
use crate::tuning::{HazardPolicy, Tuning};

/// Time-windowed hit streak
#[derive(Debug, Clone, Default, Serialize)]
pub struct Combo {
    pub count: u32,
    #[serde(skip)]
    last_hit_ms: Option<f64>,
}

impl Combo {
    /// Record a normal-target hit at `now_ms` and return the new multiplier.
    ///
    /// Hits inside the window grow the streak up to `cap`; a slower hit
    /// starts over at 1.
    pub fn register_hit(&mut self, now_ms: f64, window_ms: f64, cap: u32) -> u32 {
        let cap = cap.max(1);
        self.count = match self.last_hit_ms {
            Some(last) if now_ms - last < window_ms => (self.count + 1).min(cap),
            _ => 1,
        };
        self.last_hit_ms = Some(now_ms);
        self.count
    }

    /// Break the streak (miss or hazard)
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// One pending effect expiry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectTimer {
    pub effect: EffectKind,
    pub expires_at_ms: f64,
}

/// Active timed effects, sorted by expiry
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    timers: Vec<EffectTimer>,
}

/// Boolean view of the active effects for presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectFlags {
    pub double_points: bool,
    pub rapid_fire: bool,
}

impl ActiveEffects {
    /// Start (or restart) `effect`, expiring `duration_ms` after `now_ms`
    pub fn activate(&mut self, effect: EffectKind, now_ms: f64, duration_ms: f64) {
        self.timers.retain(|t| t.effect != effect);
        let timer = EffectTimer {
            effect,
            expires_at_ms: now_ms + duration_ms.max(0.0),
        };
        let at = self
            .timers
            .partition_point(|t| t.expires_at_ms <= timer.expires_at_ms);
        self.timers.insert(at, timer);
    }

    pub fn is_active(&self, effect: EffectKind) -> bool {
        self.timers.iter().any(|t| t.effect == effect)
    }

    /// Remove every effect whose expiry is at or before `now_ms`
    pub fn expire(&mut self, now_ms: f64) -> Vec<EffectKind> {
        let due = self.timers.partition_point(|t| t.expires_at_ms <= now_ms);
        self.timers.drain(..due).map(|t| t.effect).collect()
    }

    pub fn timers(&self) -> &[EffectTimer] {
        &self.timers
    }

    pub fn flags(&self) -> EffectFlags {
        EffectFlags {
            double_points: self.is_active(EffectKind::DoublePoints),
            rapid_fire: self.is_active(EffectKind::RapidFire),
        }
    }
}

/// Transient "xN combo" banner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComboCelebration {
    pub combo: u32,
    pub at_ms: f64,
}

impl ComboCelebration {
    pub fn is_visible(&self, now_ms: f64, duration_ms: f64) -> bool {
        now_ms - self.at_ms < duration_ms
    }
}

/// Points for one normal target
#[inline]
pub fn award_points(base_points: i32, combo: u32, double_points: bool) -> u64 {
    let base = base_points.max(0) as u64;
    let doubled = if double_points { 2 } else { 1 };
    base * combo as u64 * doubled
}

fn lose_life(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.lives = state.lives.saturating_sub(1);
    log::debug!("Life lost, {} remaining", state.lives);
    events.push(GameEvent::LifeLost {
        remaining: state.lives,
    });
}

fn burst(state: &mut GameState, target: &Target) {
    let particles = create_explosion(
        &mut state.rng,
        target.pos,
        ParticleTag::from(target.kind),
        target.color,
    );
    state.particles.extend(particles);
    if state.particles.len() > MAX_PARTICLES {
        let excess = state.particles.len() - MAX_PARTICLES;
        state.particles.drain(..excess);
    }
}

/// Apply a collected power-up. Returns false when it had no effect
/// (extra life at the cap).
fn collect_power_up(
    state: &mut GameState,
    effect: EffectKind,
    duration_ms: f32,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    if effect.is_timed() {
        state
            .effects
            .activate(effect, state.clock_ms, duration_ms as f64);
    } else if state.lives < tuning.max_lives {
        // Extra life is the only instant effect
        state.lives += 1;
        events.push(GameEvent::LifeGained { lives: state.lives });
    } else {
        return false;
    }
    log::debug!("Power-up collected: {:?}", effect);
    events.push(GameEvent::PowerUpCollected { effect });
    true
}

/// Score every target destroyed this frame, in destruction order
pub fn apply_destroyed(
    state: &mut GameState,
    destroyed: &[Target],
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    for target in destroyed {
        let feedback = match target.kind {
            TargetKind::PowerUp {
                effect,
                duration_ms,
            } => collect_power_up(state, effect, duration_ms, tuning, events),
            TargetKind::Hazard => {
                match tuning.hazard_policy {
                    HazardPolicy::LoseLife => lose_life(state, events),
                    HazardPolicy::PointPenalty => {
                        let before = state.score;
                        state.score = state
                            .score
                            .saturating_sub(target.points.unsigned_abs() as u64);
                        events.push(GameEvent::ScoreChanged {
                            delta: state.score as i64 - before as i64,
                            total: state.score,
                        });
                    }
                }
                state.combo.reset();
                true
            }
            TargetKind::Normal => {
                let combo = state.combo.register_hit(
                    state.clock_ms,
                    tuning.combo.time_window_ms,
                    tuning.combo.multiplier_cap,
                );
                let doubled = state.effects.is_active(EffectKind::DoublePoints);
                let points = award_points(target.points, combo, doubled);
                state.score += points;
                state.normals_destroyed += 1;
                events.push(GameEvent::ScoreChanged {
                    delta: points as i64,
                    total: state.score,
                });
                if combo > 1 {
                    state.celebration = Some(ComboCelebration {
                        combo,
                        at_ms: state.clock_ms,
                    });
                    events.push(GameEvent::ComboCelebration { combo });
                }
                true
            }
        };

        if feedback {
            events.push(GameEvent::TargetDestroyed {
                id: target.id,
                kind: target.kind,
            });
            burst(state, target);
        }
    }
}

/// Penalize targets that fell past the escape line. Escaped power-ups are
/// simply lost.
pub fn apply_escaped(state: &mut GameState, escaped: &[Target], events: &mut Vec<GameEvent>) {
    for target in escaped {
        match target.kind {
            TargetKind::PowerUp { .. } => {}
            TargetKind::Normal | TargetKind::Hazard => {
                lose_life(state, events);
                state.combo.reset();
            }
        }
    }
}

/// Advance at most one wave once the destroyed-normal count reaches
/// `wave_threshold * wave`. The counter keeps running across waves.
pub fn check_wave_advance(
    state: &mut GameState,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    let threshold = tuning.difficulty.wave_threshold.max(1);
    if state.normals_destroyed >= threshold.saturating_mul(state.wave) {
        state.wave += 1;
        log::info!("Wave {} reached", state.wave);
        events.push(GameEvent::WaveAdvanced { wave: state.wave });
        true
    } else {
        false
    }
}
