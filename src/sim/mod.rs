//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the frame deltas handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod director;
pub mod entity;
pub mod kinematics;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, check_collision, process_collisions};
pub use director::{SpawnDirector, spawn_interval, speed_multiplier};
pub use entity::{
    EffectKind, EntityId, IdGen, Particle, ParticleTag, Projectile, Spin, Target, TargetKind,
    create_explosion, create_power_up, create_projectile, create_target, pick_weighted,
};
pub use scoring::{ActiveEffects, Combo, ComboCelebration, EffectFlags, EffectTimer};
pub use state::{GameEvent, GameState};
pub use tick::{TickInput, fire, tick};
