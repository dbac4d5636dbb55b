use serde::{Deserialize, Serialize};

use crate::effects::Burst;
use crate::physics::Avatar;
use crate::screen::Screen;

/// Avatar fields the presentation layer draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarPose {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub facing: f32,
    pub on_ground: bool,
    pub climbing: bool,
    pub just_died: bool,
    pub attacking: bool,
    pub anim: f32,
}

impl AvatarPose {
    pub fn from_avatar(avatar: &Avatar, attacking: bool) -> Self {
        Self {
            x: avatar.x,
            y: avatar.y,
            w: avatar.w,
            h: avatar.h,
            facing: avatar.facing,
            on_ground: avatar.on_ground,
            climbing: avatar.climbing,
            just_died: avatar.just_died,
            attacking,
            anim: avatar.anim,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub screen_name: String,
    pub screen_index: usize,
    pub underground: bool,
}

/// Read-only view of one frame. The screen is already resolved for the
/// current surface/underground mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub world_width: f32,
    pub world_height: f32,
    pub screen: Screen,
    pub avatar: AvatarPose,
    pub bursts: Vec<Burst>,
    pub hud: Hud,
    pub message: Option<String>,
    pub started: bool,
    pub respawn_pending: bool,
}

impl Snapshot {
    /// MessagePack encoding for out-of-process presentation.
    pub fn encode(&self) -> Vec<u8> {
        rmp_serde::to_vec(self).expect("snapshot serialization must succeed")
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        rmp_serde::from_slice(bytes).ok()
    }
}
