use serde::{Deserialize, Serialize};

use canopy_core::config::SimConfig;
use canopy_core::geometry::intersects;

use crate::input::InputState;
use crate::physics::Avatar;
use crate::screen::Screen;

/// Depth below the ground line a descending avatar reaches before dropping
/// into the underground screen.
pub const DESCEND_DEPTH: f32 = 2.0;
/// Height above the ladder top an ascending avatar reaches before surfacing.
pub const ASCEND_HEIGHT: f32 = 10.0;
/// Vertical impulse for jumping off a ladder, as a fraction of jump power.
const JUMP_OFF_FACTOR: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LadderTransition {
    Stay,
    /// Reached the bottom of a surface ladder while descending.
    Descend,
    /// Reached the top of an underground ladder while ascending.
    Ascend,
}

/// Advance the climb state for one tick.
///
/// Runs after input has been mapped to velocity and before physics. While
/// climbing, gravity is suspended and the avatar is locked to the ladder's
/// center line. `has_underground` tells whether the surface ladder leads
/// anywhere.
pub fn update_ladder(
    avatar: &mut Avatar,
    screen: &Screen,
    underground: bool,
    has_underground: bool,
    input: &InputState,
    cfg: &SimConfig,
) -> LadderTransition {
    let Some(ladder) = screen.ladder else {
        avatar.climbing = false;
        return LadderTransition::Stay;
    };
    let grip = avatar.rect().inset_x(cfg.avatar.ladder_inset);
    if !intersects(&grip, &ladder) {
        avatar.climbing = false;
        return LadderTransition::Stay;
    }

    if input.horizontal() {
        if avatar.climbing {
            avatar.climbing = false;
            if input.jump {
                avatar.vy = -cfg.avatar.jump_power * JUMP_OFF_FACTOR;
                avatar.on_ground = false;
            }
        }
        return LadderTransition::Stay;
    }
    if !input.vertical() {
        avatar.climbing = false;
        return LadderTransition::Stay;
    }

    avatar.climbing = true;
    avatar.vx = 0.0;
    avatar.vy = 0.0;
    avatar.x = ladder.center_x() - avatar.w / 2.0;

    let before = avatar.y;
    let step = cfg.avatar.climb_step;
    if input.up {
        avatar.y -= step;
    }
    if input.down {
        avatar.y += step;
    }

    // Only a surface ladder with a cave below lets the avatar sink past the ground
    let leads_down = !underground && has_underground;
    let floor = if leads_down {
        ladder.bottom() + DESCEND_DEPTH
    } else {
        ladder.bottom()
    };
    avatar.y = avatar.y.clamp(ladder.y - avatar.h, floor - avatar.h);
    avatar.anim += (avatar.y - before).abs();

    if leads_down && input.down && avatar.y + avatar.h >= ladder.bottom() + DESCEND_DEPTH {
        return LadderTransition::Descend;
    }
    if underground && input.up && avatar.y <= ladder.y - ASCEND_HEIGHT {
        return LadderTransition::Ascend;
    }
    LadderTransition::Stay
}
