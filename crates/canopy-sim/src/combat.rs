use serde::{Deserialize, Serialize};

use canopy_core::config::TimingConfig;
use canopy_core::geometry::{Rect, intersects};

use crate::entities::{Animal, AnimalKind};
use crate::physics::Avatar;
use crate::scoring::defeat_points;
use crate::screen::Point;

/// Horizontal reach of a swing in front of the avatar.
pub const ATTACK_REACH: f32 = 30.0;
/// Vertical inset of the swing box from the avatar's top and bottom.
const ATTACK_INSET: f32 = 8.0;

/// Swing timing. Swing ids start at 1; 0 means no swing has happened yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackState {
    pub swing_id: u32,
    pub active_until: f64,
    pub ready_at: f64,
}

impl AttackState {
    pub fn is_active(&self, now: f64) -> bool {
        self.swing_id > 0 && now < self.active_until
    }

    /// Start a swing if the cooldown has elapsed. Returns whether one started.
    pub fn try_start(&mut self, now: f64, timing: &TimingConfig) -> bool {
        if now < self.ready_at {
            return false;
        }
        self.swing_id = self.swing_id.wrapping_add(1).max(1);
        self.active_until = now + f64::from(timing.attack_secs);
        self.ready_at = now + f64::from(timing.attack_cooldown_secs.max(timing.attack_secs));
        true
    }
}

/// Box swept by a swing, on the side the avatar faces.
pub fn attack_hitbox(avatar: &Avatar) -> Rect {
    let x = if avatar.facing < 0.0 {
        avatar.x - ATTACK_REACH
    } else {
        avatar.x + avatar.w
    };
    Rect::new(
        x,
        avatar.y + ATTACK_INSET,
        ATTACK_REACH,
        (avatar.h - ATTACK_INSET * 2.0).max(1.0),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strike {
    Hit { kind: AnimalKind, remaining: u8 },
    Defeated { kind: AnimalKind, points: u64, at: Point },
}

/// Apply the active swing to `animals`. Each animal takes at most one point of
/// damage per swing; animals at zero hit points are removed.
pub fn resolve_strikes(
    state: &AttackState,
    avatar: &Avatar,
    animals: &mut Vec<Animal>,
    now: f64,
) -> Vec<Strike> {
    if !state.is_active(now) {
        return Vec::new();
    }
    let reach = attack_hitbox(avatar);
    let mut strikes = Vec::new();
    for animal in animals.iter_mut() {
        if !animal.is_damageable()
            || animal.last_hit_swing == Some(state.swing_id)
            || !intersects(&reach, &animal.hitbox())
        {
            continue;
        }
        let Some(hp) = animal.hp.as_mut() else { continue };
        if *hp == 0 {
            continue;
        }
        *hp -= 1;
        animal.last_hit_swing = Some(state.swing_id);
        if *hp == 0 {
            strikes.push(Strike::Defeated {
                kind: animal.kind,
                points: defeat_points(animal.kind),
                at: Point {
                    x: animal.rect.center_x(),
                    y: animal.rect.center_y(),
                },
            });
        } else {
            tracing::debug!(animal = animal.kind.label(), remaining = *hp, "Animal hit");
            strikes.push(Strike::Hit {
                kind: animal.kind,
                remaining: *hp,
            });
        }
    }
    animals.retain(|a| a.hp != Some(0));
    strikes
}
