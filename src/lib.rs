//! Fruit Expansion - A falling-fruit arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, scoring, waves)
//! - `session`: Start / playing / game-over state machine
//! - `platform`: Frame loop driver, input mapping, browser bindings
//! - `highscores`: Persisted best score
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

pub use highscores::{FileStore, HighScore, HighScoreStore, MemoryStore};
pub use session::{FrameView, Session, SessionPhase};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Duration of one nominal 60 Hz frame; all per-frame speeds are in
    /// units of this frame
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Longest delta a single frame may advance (tab switches, debugger stalls)
    pub const MAX_FRAME_DELTA_MS: f64 = 50.0;

    /// Horizontal wobble of normal fruit
    pub const WOBBLE_PERIOD_MS: f32 = 200.0;
    pub const WOBBLE_AMPLITUDE: f32 = 1.5;

    /// Power-ups bob sideways and pulse in size
    pub const FLOAT_PERIOD_MS: f32 = 300.0;
    pub const FLOAT_AMPLITUDE: f32 = 0.8;
    pub const PULSE_PERIOD_MS: f32 = 150.0;
    pub const PULSE_AMPLITUDE: f32 = 0.1;

    /// Max spin (radians per reference frame) given to a new fruit
    pub const MAX_SPIN_SPEED: f32 = 0.04;

    /// Particles per explosion
    pub const EXPLOSION_PARTICLES: usize = 12;
    /// Hard cap on live particles; oldest go first
    pub const MAX_PARTICLES: usize = 256;
    /// Downward pull on particles, px per reference frame squared
    pub const PARTICLE_GRAVITY: f32 = 0.15;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
