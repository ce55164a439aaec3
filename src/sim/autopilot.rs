//! Idle/demo mode: a simple AI that plays the game
//!
//! Tracks the most urgent non-hazard target (the one closest to escaping)
//! and only takes the shot when no hazard sits in the firing column below it.

use super::entity::Target;
use super::state::GameState;
use crate::tuning::Tuning;

/// Aim for the next shot, or `None` if nothing is worth shooting
pub fn choose_aim(state: &GameState, tuning: &Tuning) -> Option<f32> {
    let target = state
        .targets
        .iter()
        .filter(|t| !t.is_hazard() && t.pos.y > -t.size / 2.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;

    let half_shot = tuning.projectile.width / 2.0;
    let blocked = state
        .targets
        .iter()
        .filter(|t| t.is_hazard())
        .any(|hazard| in_firing_column(hazard, target.pos.x, half_shot) && hazard.pos.y > target.pos.y);

    if blocked {
        None
    } else {
        Some(target.pos.x)
    }
}

fn in_firing_column(target: &Target, x: f32, half_shot: f32) -> bool {
    (target.pos.x - x).abs() < target.radius() + half_shot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::TargetKind;
    use glam::Vec2;

    fn at(state: &mut GameState, x: f32, y: f32, kind: TargetKind) {
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            kind,
            type_index: 0,
            pos: Vec2::new(x, y),
            speed: 3.0,
            size: 40.0,
            points: 10,
            required_hits: 1,
            hits: 0,
            wobble_phase: None,
            spin: None,
            scale: 1.0,
            age_ms: 0.0,
            color: 0,
        });
    }

    #[test]
    fn test_picks_lowest_target() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        assert_eq!(choose_aim(&state, &tuning), None);

        at(&mut state, 100.0, 50.0, TargetKind::Normal);
        at(&mut state, 600.0, 300.0, TargetKind::Normal);
        at(&mut state, 300.0, 400.0, TargetKind::Hazard);
        assert_eq!(choose_aim(&state, &tuning), Some(600.0));
    }

    #[test]
    fn test_holds_fire_when_hazard_below() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        at(&mut state, 400.0, 100.0, TargetKind::Normal);
        at(&mut state, 410.0, 300.0, TargetKind::Hazard);
        assert_eq!(choose_aim(&state, &tuning), None);

        // Hazard above the target is not in the way
        state.targets[1].pos.y = 50.0;
        assert_eq!(choose_aim(&state, &tuning), Some(400.0));
    }
}
