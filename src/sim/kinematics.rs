//! Frame-rate independent motion
//!
//! Speeds are expressed in px per reference frame (60 fps). Every update
//! scales them by `dt / REFERENCE_FRAME_MS`, so a 33 ms frame moves an
//! entity twice as far as a 16.67 ms one.
//!
//! Updates take entities by value and hand back the advanced copy, so a
//! frame is a plain `map` + `filter` over the previous collections.

use crate::consts::*;
use crate::normalize_angle;
use crate::tuning::Playfield;

use super::entity::{Particle, Projectile, Target, TargetKind};

/// Motion scale for a frame of `dt_ms`
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / REFERENCE_FRAME_MS
}

pub fn advance_projectile(mut projectile: Projectile, dt_ms: f32) -> Projectile {
    projectile.pos.y -= projectile.speed * frame_scale(dt_ms);
    projectile.age_ms += dt_ms;
    projectile
}

/// Fall, wobble/float, spin, then clamp back inside the side walls
pub fn advance_target(mut target: Target, dt_ms: f32, field: &Playfield) -> Target {
    let scale = frame_scale(dt_ms);
    target.pos.y += target.speed * scale;
    target.age_ms += dt_ms;
    let t = target.age_ms;

    match target.kind {
        TargetKind::PowerUp { .. } => {
            target.pos.x += (t / FLOAT_PERIOD_MS).sin() * FLOAT_AMPLITUDE * scale;
            target.scale = 1.0 + (t / PULSE_PERIOD_MS).sin() * PULSE_AMPLITUDE;
        }
        TargetKind::Normal | TargetKind::Hazard => {
            if let Some(phase) = target.wobble_phase {
                target.pos.x += (t / WOBBLE_PERIOD_MS + phase).sin() * WOBBLE_AMPLITUDE * scale;
            }
        }
    }
    target.pos.x = field.clamp_x(target.pos.x, target.radius());

    if let Some(spin) = target.spin.as_mut() {
        spin.angle = normalize_angle(spin.angle + spin.speed * scale);
    }
    target
}

/// Ballistic drift with gravity; life decays toward zero
pub fn advance_particle(mut particle: Particle, dt_ms: f32) -> Particle {
    let scale = frame_scale(dt_ms);
    particle.pos += particle.vel * scale;
    particle.vel.y += PARTICLE_GRAVITY * scale;
    particle.life = (particle.life - particle.decay * scale).max(0.0);
    particle
}

/// Projectile has fully left through the top edge
#[inline]
pub fn projectile_off_screen(projectile: &Projectile) -> bool {
    projectile.pos.y < -projectile.height
}

/// Target has fallen past the escape line
#[inline]
pub fn target_escaped(target: &Target, escape_y: f32) -> bool {
    target.pos.y > escape_y + target.size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{IdGen, ParticleTag, create_power_up, create_projectile, create_target};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn plain_target(tuning: &Tuning) -> Target {
        let mut ids = IdGen::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut t = create_target(&mut ids, &mut rng, 1, tuning);
        t.kind = TargetKind::Normal;
        t.wobble_phase = None;
        t.pos = Vec2::new(400.0, 100.0);
        t.speed = 3.0;
        t
    }

    #[test]
    fn test_projectile_moves_up_scaled() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let p = create_projectile(&mut ids, Vec2::new(100.0, 450.0), &tuning);

        let p = advance_projectile(p, REFERENCE_FRAME_MS);
        assert!((p.pos.y - (450.0 - 18.0)).abs() < 1e-3);

        // Double-length frame moves twice as far
        let p = advance_projectile(p, REFERENCE_FRAME_MS * 2.0);
        assert!((p.pos.y - (450.0 - 54.0)).abs() < 1e-3);
        assert!((p.age_ms - REFERENCE_FRAME_MS * 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_falls_frame_rate_independent() {
        let tuning = Tuning::default();
        let t = plain_target(&tuning);

        let one = advance_target(t.clone(), 2.0 * REFERENCE_FRAME_MS, &tuning.playfield);
        let two = advance_target(
            advance_target(t, REFERENCE_FRAME_MS, &tuning.playfield),
            REFERENCE_FRAME_MS,
            &tuning.playfield,
        );
        assert!((one.pos.y - two.pos.y).abs() < 1e-3);
        assert!((one.pos.y - 106.0).abs() < 1e-3);
        assert_eq!(one.pos.x, 400.0);
    }

    #[test]
    fn test_wobble_stays_inside_walls() {
        let tuning = Tuning::default();
        let mut t = plain_target(&tuning);
        t.wobble_phase = Some(0.0);
        t.pos.x = t.radius();

        for _ in 0..500 {
            t = advance_target(t, REFERENCE_FRAME_MS, &tuning.playfield);
            assert!(t.pos.x >= t.radius() - 1e-3);
            assert!(t.pos.x <= tuning.playfield.width - t.radius() + 1e-3);
        }
    }

    #[test]
    fn test_power_up_pulses() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut p = create_power_up(&mut ids, &mut rng, &tuning).unwrap();

        let mut scales = Vec::new();
        for _ in 0..60 {
            p = advance_target(p, REFERENCE_FRAME_MS, &tuning.playfield);
            assert!((p.scale - 1.0).abs() <= PULSE_AMPLITUDE + 1e-4);
            scales.push(p.scale);
        }
        assert!(scales.iter().any(|s| *s > 1.0));
        assert!(scales.iter().any(|s| *s < 1.0));
    }

    #[test]
    fn test_spin_accumulates() {
        let tuning = Tuning::default();
        let mut t = plain_target(&tuning);
        t.spin = Some(crate::sim::entity::Spin {
            angle: 0.0,
            speed: 0.05,
        });
        let t = advance_target(t, REFERENCE_FRAME_MS * 2.0, &tuning.playfield);
        assert!((t.spin.unwrap().angle - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_particle_gravity_and_decay() {
        let p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -2.0),
            life: 1.0,
            decay: 0.25,
            size: 4.0,
            color: 0,
            tag: ParticleTag::Juice,
        };
        let p = advance_particle(p, REFERENCE_FRAME_MS);
        assert_eq!(p.pos, Vec2::new(1.0, -2.0));
        assert!((p.vel.y - (-2.0 + PARTICLE_GRAVITY)).abs() < 1e-5);
        assert!((p.life - 0.75).abs() < 1e-5);

        let p = advance_particle(p, REFERENCE_FRAME_MS * 10.0);
        assert_eq!(p.life, 0.0);
    }

    #[test]
    fn test_off_screen_predicates() {
        let tuning = Tuning::default();
        let mut ids = IdGen::new();
        let mut p = create_projectile(&mut ids, Vec2::new(100.0, 0.0), &tuning);
        p.pos.y = -p.height + 0.5;
        assert!(!projectile_off_screen(&p));
        p.pos.y = -p.height - 0.5;
        assert!(projectile_off_screen(&p));

        let mut t = plain_target(&tuning);
        t.pos.y = 500.0 + t.size;
        assert!(!target_escaped(&t, 500.0));
        t.pos.y += 0.1;
        assert!(target_escaped(&t, 500.0));
        // A raised escape line catches it earlier
        t.pos.y = 420.0;
        assert!(target_escaped(&t, 360.0));
    }
}
