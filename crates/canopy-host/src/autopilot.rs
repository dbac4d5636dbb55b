use canopy_core::geometry::Rect;
use canopy_sim::input::InputState;
use canopy_sim::snapshot::Snapshot;

/// How far ahead of the avatar's leading edge the pilot looks for trouble.
const LOOKAHEAD: f32 = 24.0;
/// Animals closer than this get a swing instead of a jump.
const SWING_RANGE: f32 = 34.0;

/// Scripted player: runs right, hops over whatever lies ahead and swings at
/// animals in reach. Every `ladder_every`-th screen it also tries the ladder.
#[derive(Debug, Clone)]
pub struct Autopilot {
    ladder_every: usize,
}

impl Autopilot {
    pub fn new(ladder_every: usize) -> Self {
        Self {
            ladder_every: ladder_every.max(1),
        }
    }

    pub fn next_input(&self, snap: &Snapshot) -> InputState {
        let mut input = InputState::default();
        if !snap.started || snap.respawn_pending {
            return input;
        }
        let pose = &snap.avatar;
        let body = Rect::new(pose.x, pose.y, pose.w, pose.h);

        if let Some(ladder) = snap.screen.ladder
            && !snap.hud.underground
            && snap.hud.screen_index % self.ladder_every == 0
            && ladder.overlaps_x(body.x + 6.0, body.right() - 6.0)
        {
            input.down = true;
            return input;
        }
        if snap.hud.underground && pose.climbing {
            input.up = true;
            return input;
        }

        input.right = true;
        let front = body.right();
        let ahead = |r: &Rect| r.right() > front && r.x - front < LOOKAHEAD;

        let animal_near = snap
            .screen
            .animals
            .iter()
            .map(|a| a.rect)
            .filter(|r| r.right() > front)
            .any(|r| r.x - front < SWING_RANGE);
        if animal_near {
            input.action = true;
        }

        let hazard_ahead = snap.screen.obstacles.iter().any(|o| ahead(&o.rect))
            || snap.screen.animals.iter().any(|a| ahead(&a.rect));
        if hazard_ahead && pose.on_ground {
            input.jump = true;
        }
        input
    }
}
