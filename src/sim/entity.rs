//! Entity records and their factories
//!
//! Projectiles, falling targets (fruit, power-ups, hazards) and cosmetic
//! explosion particles. Factories are the only place entities are born;
//! each one draws a fresh id from the session's [`IdGen`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::polar_to_cartesian;
use crate::tuning::{TargetType, Tuning};

/// Stable entity identity, unique within one session
pub type EntityId = u32;

/// Monotonic id source owned by a single session
#[derive(Debug, Clone)]
pub struct IdGen {
    next: EntityId,
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGen {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Power-up effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Points from normal targets count twice while active
    DoublePoints,
    /// Instant: one life, up to the cap
    ExtraLife,
    /// Shorter fire cooldown while active
    RapidFire,
}

impl EffectKind {
    /// Instant effects never enter the timer queue
    pub fn is_timed(&self) -> bool {
        !matches!(self, EffectKind::ExtraLife)
    }
}

/// What a falling object is
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetKind {
    Normal,
    PowerUp { effect: EffectKind, duration_ms: f32 },
    Hazard,
}

/// A player projectile flying straight up
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: EntityId,
    /// Center of the projectile rectangle
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Upward speed in px per reference frame
    pub speed: f32,
    pub age_ms: f32,
}

impl Projectile {
    /// Axis-aligned extents as (min, max) corners
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        (self.pos - half, self.pos + half)
    }
}

/// Rotation state of a spinning target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spin {
    pub angle: f32,
    /// Radians per reference frame
    pub speed: f32,
}

/// A falling target
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: EntityId,
    pub kind: TargetKind,
    /// Row in the target table (or power-up table for power-ups)
    pub type_index: usize,
    /// Center of the target's bounding circle
    pub pos: Vec2,
    /// Fall speed in px per reference frame, wave multiplier applied
    pub speed: f32,
    /// Diameter of the bounding circle
    pub size: f32,
    pub points: i32,
    pub required_hits: u8,
    pub hits: u8,
    /// Phase offset for side-to-side wobble
    pub wobble_phase: Option<f32>,
    pub spin: Option<Spin>,
    /// Render scale (power-ups pulse)
    pub scale: f32,
    pub age_ms: f32,
    pub color: u32,
}

impl Target {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Register one hit; returns true once the target is destroyed
    pub fn register_hit(&mut self) -> bool {
        self.hits = (self.hits + 1).min(self.required_hits);
        self.is_destroyed()
    }

    pub fn is_destroyed(&self) -> bool {
        self.hits >= self.required_hits
    }

    pub fn is_power_up(&self) -> bool {
        matches!(self.kind, TargetKind::PowerUp { .. })
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, TargetKind::Hazard)
    }
}

/// Visual flavor of a particle burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleTag {
    Juice,
    Sparkle,
    Blast,
}

impl From<TargetKind> for ParticleTag {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Normal => ParticleTag::Juice,
            TargetKind::PowerUp { .. } => ParticleTag::Sparkle,
            TargetKind::Hazard => ParticleTag::Blast,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Px per reference frame
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    /// Life lost per reference frame
    pub decay: f32,
    pub size: f32,
    pub color: u32,
    pub tag: ParticleTag,
}

/// Create a projectile at the cannon muzzle
pub fn create_projectile(ids: &mut IdGen, origin: Vec2, tuning: &Tuning) -> Projectile {
    let shot = &tuning.projectile;
    Projectile {
        id: ids.next_id(),
        pos: Vec2::new(tuning.playfield.clamp_x(origin.x, shot.width / 2.0), origin.y),
        width: shot.width,
        height: shot.height,
        speed: shot.speed,
        age_ms: 0.0,
    }
}

/// Map a roll in `[0, total_weight)` onto the table.
///
/// Falls back to the first row when float rounding leaves the roll
/// unconsumed.
pub fn pick_weighted(types: &[TargetType], roll: f32) -> usize {
    let mut remainder = roll;
    for (i, t) in types.iter().enumerate() {
        remainder -= t.weight;
        if remainder <= 0.0 {
            return i;
        }
    }
    0
}

/// Random x so a target of `size` starts fully inside the playfield
fn spawn_x<R: Rng + ?Sized>(rng: &mut R, size: f32, width: f32) -> f32 {
    let (lo, hi) = (size, width - size);
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        width / 2.0
    }
}

/// Create a weighted-random target scaled for `wave`
pub fn create_target<R: Rng + ?Sized>(
    ids: &mut IdGen,
    rng: &mut R,
    wave: u32,
    tuning: &Tuning,
) -> Target {
    let total = tuning.total_weight();
    let roll = if total > 0.0 {
        rng.random::<f32>() * total
    } else {
        0.0
    };
    let type_index = pick_weighted(&tuning.targets, roll);
    let row = &tuning.targets[type_index];
    let multiplier = super::director::speed_multiplier(wave, &tuning.difficulty);

    let wobble_phase = row
        .wobble
        .then(|| rng.random::<f32>() * std::f32::consts::TAU);
    let spin = Spin {
        angle: 0.0,
        speed: rng.random_range(-MAX_SPIN_SPEED..MAX_SPIN_SPEED),
    };

    Target {
        id: ids.next_id(),
        kind: if row.hazard {
            TargetKind::Hazard
        } else {
            TargetKind::Normal
        },
        type_index,
        pos: Vec2::new(spawn_x(rng, row.size, tuning.playfield.width), -row.size),
        speed: row.speed * multiplier,
        size: row.size,
        points: row.points,
        required_hits: row.hits.max(1),
        hits: 0,
        wobble_phase,
        spin: Some(spin),
        scale: 1.0,
        age_ms: 0.0,
        color: row.color,
    }
}

/// Create a random power-up, or `None` if the table is empty
pub fn create_power_up<R: Rng + ?Sized>(
    ids: &mut IdGen,
    rng: &mut R,
    tuning: &Tuning,
) -> Option<Target> {
    if tuning.power_ups.is_empty() {
        return None;
    }
    let type_index = rng.random_range(0..tuning.power_ups.len());
    let row = &tuning.power_ups[type_index];

    Some(Target {
        id: ids.next_id(),
        kind: TargetKind::PowerUp {
            effect: row.effect,
            duration_ms: row.duration_ms,
        },
        type_index,
        pos: Vec2::new(spawn_x(rng, row.size, tuning.playfield.width), -row.size),
        speed: tuning.difficulty.power_up_speed,
        size: row.size,
        points: 0,
        required_hits: 1,
        hits: 0,
        wobble_phase: None,
        spin: None,
        scale: 1.0,
        age_ms: 0.0,
        color: row.color,
    })
}

/// Emit a radial burst of short-lived particles
pub fn create_explosion<R: Rng + ?Sized>(
    rng: &mut R,
    pos: Vec2,
    tag: ParticleTag,
    color: u32,
) -> Vec<Particle> {
    let step = std::f32::consts::TAU / EXPLOSION_PARTICLES as f32;
    (0..EXPLOSION_PARTICLES)
        .map(|i| {
            let angle = i as f32 * step + rng.random_range(-0.3..0.3);
            let speed = rng.random_range(2.0..6.0);
            Particle {
                pos,
                vel: polar_to_cartesian(speed, angle),
                life: 1.0,
                decay: rng.random_range(0.02..0.05),
                size: rng.random_range(3.0..7.0),
                color,
                tag,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdGen::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_projectile_clamped_into_playfield() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();

        let p = create_projectile(&mut ids, Vec2::new(-100.0, 450.0), &tuning);
        assert_eq!(p.pos.x, tuning.projectile.width / 2.0);
        assert_eq!(p.pos.y, 450.0);
        assert_eq!(p.age_ms, 0.0);

        let p = create_projectile(&mut ids, Vec2::new(5000.0, 450.0), &tuning);
        assert_eq!(p.pos.x, 800.0 - tuning.projectile.width / 2.0);
        assert_eq!(p.id, 2);
    }

    #[test]
    fn test_pick_weighted_walks_table() {
        let tuning = Tuning::default();
        // apple 30, orange 25, lemon 20 ...
        assert_eq!(pick_weighted(&tuning.targets, 0.0), 0);
        assert_eq!(pick_weighted(&tuning.targets, 29.9), 0);
        assert_eq!(pick_weighted(&tuning.targets, 30.0), 0);
        assert_eq!(pick_weighted(&tuning.targets, 30.5), 1);
        assert_eq!(pick_weighted(&tuning.targets, 144.9), 8);
        // Past the total (rounding edge case) falls back to the first row
        assert_eq!(pick_weighted(&tuning.targets, 1000.0), 0);
    }

    #[test]
    fn test_target_scaled_for_wave() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let mut rng = Pcg32::seed_from_u64(7);

        for wave in [1, 5, 20] {
            let t = create_target(&mut ids, &mut rng, wave, &tuning);
            let row = &tuning.targets[t.type_index];
            let expected = row.speed * (1.0 + (wave - 1) as f32 * 0.07);
            assert!((t.speed - expected).abs() < 1e-4);
            assert_eq!(t.pos.y, -row.size);
            assert!(t.pos.x >= row.size && t.pos.x <= 800.0 - row.size);
            assert_eq!(t.hits, 0);
            assert_eq!(t.required_hits, row.hits);
            assert_eq!(t.is_hazard(), row.hazard);
            assert_eq!(t.wobble_phase.is_some(), row.wobble);
        }
    }

    #[test]
    fn test_multi_hit_target_destroyed_on_last_hit() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut t = create_target(&mut ids, &mut rng, 1, &tuning);
        t.required_hits = 3;

        assert!(!t.register_hit());
        assert!(!t.register_hit());
        assert!(t.register_hit());
        // Never exceeds the requirement
        assert!(t.register_hit());
        assert_eq!(t.hits, 3);
    }

    #[test]
    fn test_power_up_uses_table() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let mut rng = Pcg32::seed_from_u64(3);

        for _ in 0..20 {
            let p = create_power_up(&mut ids, &mut rng, &tuning).unwrap();
            let row = &tuning.power_ups[p.type_index];
            assert!(p.is_power_up());
            assert_eq!(
                p.kind,
                TargetKind::PowerUp {
                    effect: row.effect,
                    duration_ms: row.duration_ms
                }
            );
            assert_eq!(p.speed, tuning.difficulty.power_up_speed);
        }

        let empty = Tuning {
            power_ups: Vec::new(),
            ..Tuning::default()
        };
        assert!(create_power_up(&mut ids, &mut rng, &empty).is_none());
    }

    #[test]
    fn test_explosion_burst() {
        let mut rng = Pcg32::seed_from_u64(11);
        let burst = create_explosion(&mut rng, Vec2::new(10.0, 20.0), ParticleTag::Juice, 0xff0000);
        assert_eq!(burst.len(), EXPLOSION_PARTICLES);
        for p in &burst {
            assert_eq!(p.pos, Vec2::new(10.0, 20.0));
            assert_eq!(p.life, 1.0);
            assert!(p.decay > 0.0);
            assert!(p.vel.length() >= 2.0 - 1e-3);
        }
    }
}
