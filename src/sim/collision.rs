//! Projectile/target collision detection and hit resolution
//!
//! Targets are circles of radius `size / 2`; projectiles are axis-aligned
//! rectangles (their slight visual tilt is ignored). The test clamps the
//! circle center into the rectangle to find the closest point, then compares
//! squared distances.

use glam::Vec2;

use super::entity::{Projectile, Target};

/// Circle-vs-rectangle overlap between a projectile and a target
pub fn check_collision(projectile: &Projectile, target: &Target) -> bool {
    circle_rect_overlap(target.pos, target.radius(), projectile.bounds())
}

/// Strict overlap test: touching edges do not count
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, (min, max): (Vec2, Vec2)) -> bool {
    let closest = center.clamp(min, max);
    center.distance_squared(closest) < radius * radius
}

/// Survivors and casualties of one collision pass
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    pub projectiles: Vec<Projectile>,
    pub targets: Vec<Target>,
    /// Destroyed this frame, in destruction order
    pub destroyed: Vec<Target>,
}

/// Resolve all projectile/target hits for one frame.
///
/// Each projectile scans the live targets in order and stops at the first
/// overlap (first match wins, not the nearest). A hit consumes the
/// projectile and adds one hit to the target; a target that reaches its
/// required hit count leaves the live set immediately, so later projectiles
/// in the same frame cannot hit it again.
pub fn process_collisions(
    projectiles: Vec<Projectile>,
    mut targets: Vec<Target>,
) -> CollisionOutcome {
    let mut destroyed_flags = vec![false; targets.len()];
    let mut destroyed_order = Vec::new();
    let mut surviving = Vec::with_capacity(projectiles.len());

    for projectile in projectiles {
        let hit = (0..targets.len())
            .find(|&i| !destroyed_flags[i] && check_collision(&projectile, &targets[i]));

        match hit {
            Some(i) => {
                if targets[i].register_hit() {
                    destroyed_flags[i] = true;
                    destroyed_order.push(i);
                }
            }
            None => surviving.push(projectile),
        }
    }

    let mut slots: Vec<Option<Target>> = targets.into_iter().map(Some).collect();
    let destroyed = destroyed_order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    let remaining = slots.into_iter().flatten().collect();

    CollisionOutcome {
        projectiles: surviving,
        targets: remaining,
        destroyed,
    }
}
