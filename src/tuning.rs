//! Data-driven game balance
//!
//! Every number the simulation reads lives here. Defaults reproduce the
//! shipped game; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::EffectKind;

/// Errors raised while loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("cannot read tuning file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target table is empty")]
    EmptyTargetTable,
    #[error("target type `{name}` has a non-positive or non-finite weight ({weight})")]
    BadWeight { name: String, weight: f32 },
    #[error("target type `{name}` needs at least one hit")]
    ZeroHits { name: String },
    #[error("power-up chance is {0} but the power-up table is empty")]
    EmptyPowerUpTable(f32),
    #[error("initial lives ({initial}) exceed max lives ({max})")]
    LivesOutOfRange { initial: u32, max: u32 },
    #[error("playfield must have positive dimensions ({width}x{height})")]
    BadPlayfield { width: f32, height: f32 },
}

/// What destroying a hazard does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardPolicy {
    /// Flat loss of one life, score untouched
    #[default]
    LoseLife,
    /// Add the hazard's (negative) point value to the score, clamped at zero
    PointPenalty,
}

/// Visible playfield in logical pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Y past which a falling target counts as missed (None = bottom edge)
    pub escape_line: Option<f32>,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            escape_line: None,
        }
    }
}

impl Playfield {
    pub fn escape_y(&self) -> f32 {
        self.escape_line.unwrap_or(self.height)
    }

    /// Clamp an x coordinate so an object of `half_width` stays on screen
    pub fn clamp_x(&self, x: f32, half_width: f32) -> f32 {
        let lo = half_width.min(self.width / 2.0);
        let hi = (self.width - half_width).max(lo);
        x.clamp(lo, hi)
    }
}

/// Player projectile constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub width: f32,
    pub height: f32,
    /// Upward speed in px per reference frame
    pub speed: f32,
    /// Spawn height above the bottom edge
    pub spawn_offset: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 24.0,
            speed: 18.0,
            spawn_offset: 50.0,
        }
    }
}

/// One row of the falling-target table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetType {
    pub name: String,
    pub points: i32,
    /// Fall speed in px per reference frame (before the wave multiplier)
    pub speed: f32,
    pub size: f32,
    #[serde(default = "one_hit")]
    pub hits: u8,
    pub weight: f32,
    #[serde(default)]
    pub wobble: bool,
    #[serde(default)]
    pub hazard: bool,
    /// 0xRRGGBB, forwarded to explosion particles
    pub color: u32,
}

fn one_hit() -> u8 {
    1
}

impl TargetType {
    #[allow(clippy::too_many_arguments)]
    fn row(
        name: &str,
        points: i32,
        speed: f32,
        size: f32,
        hits: u8,
        weight: f32,
        wobble: bool,
        hazard: bool,
        color: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            points,
            speed,
            size,
            hits,
            weight,
            wobble,
            hazard,
            color,
        }
    }
}

/// One row of the power-up table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpType {
    pub name: String,
    pub effect: EffectKind,
    /// Effect lifetime in ms (ignored for instant effects)
    pub duration_ms: f32,
    pub size: f32,
    pub color: u32,
}

/// Spawn cadence and wave progression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    pub base_spawn_rate_ms: f32,
    pub min_spawn_rate_ms: f32,
    pub spawn_rate_decrease_ms: f32,
    pub speed_multiplier_increase: f32,
    pub wave_threshold: u32,
    pub power_up_chance: f32,
    /// Fall speed of power-ups in px per reference frame
    pub power_up_speed: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            base_spawn_rate_ms: 1400.0,
            min_spawn_rate_ms: 400.0,
            spawn_rate_decrease_ms: 35.0,
            speed_multiplier_increase: 0.07,
            wave_threshold: 8,
            power_up_chance: 0.08,
            power_up_speed: 2.0,
        }
    }
}

/// Combo multiplier rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    pub time_window_ms: f64,
    pub multiplier_cap: u32,
    /// How long the combo celebration stays visible
    pub celebration_ms: f64,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            time_window_ms: 1500.0,
            multiplier_cap: 5,
            celebration_ms: 1000.0,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: Playfield,
    pub initial_lives: u32,
    pub max_lives: u32,
    /// Width of the player's cannon, used as the aim clamp margin
    pub cannon_width: f32,
    pub projectile: ProjectileTuning,
    pub fire_cooldown_ms: f64,
    pub rapid_fire_cooldown_ms: f64,
    pub targets: Vec<TargetType>,
    pub power_ups: Vec<PowerUpType>,
    pub difficulty: Difficulty,
    pub combo: ComboTuning,
    pub hazard_policy: HazardPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            initial_lives: 3,
            max_lives: 3,
            cannon_width: 60.0,
            projectile: ProjectileTuning::default(),
            fire_cooldown_ms: 220.0,
            rapid_fire_cooldown_ms: 80.0,
            targets: vec![
                TargetType::row("apple", 10, 3.0, 50.0, 1, 30.0, false, false, 0xff4444),
                TargetType::row("orange", 15, 3.5, 48.0, 1, 25.0, false, false, 0xff9922),
                TargetType::row("lemon", 20, 4.0, 44.0, 1, 20.0, false, false, 0xffee44),
                TargetType::row("grape", 25, 4.5, 40.0, 1, 15.0, false, false, 0x9944ff),
                TargetType::row("banana", 30, 3.5, 52.0, 1, 15.0, true, false, 0xffdd22),
                TargetType::row("watermelon", 50, 2.5, 60.0, 2, 10.0, false, false, 0x44cc44),
                TargetType::row("strawberry", 35, 5.0, 42.0, 1, 10.0, false, false, 0xff5566),
                TargetType::row("kiwi", 40, 4.0, 44.0, 1, 8.0, false, false, 0x88cc44),
                TargetType::row("bomb", -50, 3.0, 55.0, 1, 12.0, false, true, 0xff4444),
            ],
            power_ups: vec![
                PowerUpType {
                    name: "star".to_string(),
                    effect: EffectKind::DoublePoints,
                    duration_ms: 5000.0,
                    size: 45.0,
                    color: 0xffd700,
                },
                PowerUpType {
                    name: "heart".to_string(),
                    effect: EffectKind::ExtraLife,
                    duration_ms: 0.0,
                    size: 45.0,
                    color: 0x3399ff,
                },
                PowerUpType {
                    name: "lightning".to_string(),
                    effect: EffectKind::RapidFire,
                    duration_ms: 4000.0,
                    size: 45.0,
                    color: 0x00d4ff,
                },
            ],
            difficulty: Difficulty::default(),
            combo: ComboTuning::default(),
            hazard_policy: HazardPolicy::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check cross-field invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let Playfield { width, height, .. } = self.playfield;
        if !(width > 0.0 && height > 0.0) {
            return Err(TuningError::BadPlayfield { width, height });
        }
        if self.targets.is_empty() {
            return Err(TuningError::EmptyTargetTable);
        }
        for t in &self.targets {
            if !(t.weight.is_finite() && t.weight > 0.0) {
                return Err(TuningError::BadWeight {
                    name: t.name.clone(),
                    weight: t.weight,
                });
            }
            if t.hits == 0 {
                return Err(TuningError::ZeroHits {
                    name: t.name.clone(),
                });
            }
        }
        if self.difficulty.power_up_chance > 0.0 && self.power_ups.is_empty() {
            return Err(TuningError::EmptyPowerUpTable(
                self.difficulty.power_up_chance,
            ));
        }
        if self.initial_lives > self.max_lives {
            return Err(TuningError::LivesOutOfRange {
                initial: self.initial_lives,
                max: self.max_lives,
            });
        }
        Ok(())
    }

    /// Sum of all target weights
    pub fn total_weight(&self) -> f32 {
        self.targets.iter().map(|t| t.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.targets.len(), 9);
        assert!(tuning.targets.iter().filter(|t| t.hazard).count() == 1);
        assert!((tuning.total_weight() - 145.0).abs() < 0.001);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(
            r#"{ "initial_lives": 2, "difficulty": { "wave_threshold": 4 }, "hazard_policy": "point_penalty" }"#,
        )
        .unwrap();
        assert_eq!(tuning.initial_lives, 2);
        assert_eq!(tuning.max_lives, 3);
        assert_eq!(tuning.difficulty.wave_threshold, 4);
        assert_eq!(tuning.difficulty.base_spawn_rate_ms, 1400.0);
        assert_eq!(tuning.hazard_policy, HazardPolicy::PointPenalty);
        assert_eq!(tuning.targets.len(), 9);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            Tuning::from_json(r#"{ "targets": [] }"#),
            Err(TuningError::EmptyTargetTable)
        ));
        let zero_weight = r#"{ "targets": [
            { "name": "rock", "points": 1, "speed": 1.0, "size": 10.0, "weight": 0.0, "color": 0 }
        ] }"#;
        assert!(matches!(
            Tuning::from_json(zero_weight),
            Err(TuningError::BadWeight { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "initial_lives": 9 }"#),
            Err(TuningError::LivesOutOfRange { initial: 9, max: 3 })
        ));
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_escape_line_and_clamp() {
        let mut field = Playfield::default();
        assert_eq!(field.escape_y(), 500.0);
        field.escape_line = Some(360.0);
        assert_eq!(field.escape_y(), 360.0);

        assert_eq!(field.clamp_x(-20.0, 6.0), 6.0);
        assert_eq!(field.clamp_x(900.0, 6.0), 794.0);
        assert_eq!(field.clamp_x(400.0, 6.0), 400.0);
    }
}
