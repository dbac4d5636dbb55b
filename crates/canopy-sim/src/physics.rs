use serde::{Deserialize, Serialize};

use canopy_core::config::{AvatarConfig, SimConfig};
use canopy_core::geometry::{Rect, intersects, subtract_span};

use crate::entities::{AnimalKind, MovingLog, ObstacleKind};
use crate::input::InputState;
use crate::screen::{Point, Screen};

/// How far past a world edge (in avatar widths) the avatar must travel before
/// the neighbouring screen takes over.
pub const EDGE_TRIGGER: f32 = 0.55;
/// Slack beyond the world edges the avatar's x is clamped to.
const EDGE_CLAMP_SLACK: f32 = 8.0;

/// The player's avatar. Exactly one exists; it is repositioned, never rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    /// +1.0 facing right, -1.0 facing left.
    pub facing: f32,
    pub on_ground: bool,
    pub climbing: bool,
    pub just_died: bool,
    /// Walk/climb cycle progress; advances with movement.
    pub anim: f32,
}

impl Avatar {
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            w: cfg.avatar.width,
            h: cfg.avatar.height,
            facing: 1.0,
            on_ground: false,
            climbing: false,
            just_died: false,
            anim: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Narrow full-height box centered on the avatar, used for hazard contact.
    pub fn probe(&self, width: f32) -> Rect {
        Rect::new(self.x + (self.w - width) / 2.0, self.y, width, self.h)
    }

    /// Move to `p` at rest.
    pub fn place_at(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = false;
        self.climbing = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Fell below the bottom of the world.
    Fall,
    Hazard(ObstacleKind),
    Animal(AnimalKind),
}

impl DeathCause {
    pub fn message(self) -> &'static str {
        match self {
            DeathCause::Fall => "Fell into the abyss!",
            DeathCause::Hazard(kind) => kind.death_message(),
            DeathCause::Animal(kind) => kind.death_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidKind {
    Ground,
    Wall,
    Platform,
    /// Index into the screen's log list.
    Log(usize),
}

/// A collision box for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solid {
    pub rect: Rect,
    pub kind: SolidKind,
}

impl Solid {
    /// One-way solids only stop the avatar from above.
    pub fn is_one_way(&self) -> bool {
        matches!(self.kind, SolidKind::Platform | SolidKind::Log(_))
    }
}

/// Ground segments left after cut-outs, walls, platforms and surfaced logs.
pub fn build_solids(screen: &Screen, cfg: &SimConfig) -> Vec<Solid> {
    let world = &cfg.world;
    let mut spans = vec![(0.0, world.width)];
    for o in &screen.obstacles {
        if let Some((x0, x1)) = o.ground_cut() {
            subtract_span(&mut spans, x0, x1);
        }
    }
    let depth = world.height - screen.ground_y;
    let mut solids: Vec<Solid> = spans
        .into_iter()
        .map(|(x0, x1)| Solid {
            rect: Rect::new(x0, screen.ground_y, x1 - x0, depth),
            kind: SolidKind::Ground,
        })
        .collect();
    solids.extend(
        screen
            .obstacles
            .iter()
            .filter(|o| o.kind.is_solid())
            .map(|o| Solid {
                rect: o.rect,
                kind: SolidKind::Wall,
            }),
    );
    solids.extend(screen.platforms.iter().map(|p| Solid {
        rect: p.collision_rect(),
        kind: SolidKind::Platform,
    }));
    solids.extend(
        screen
            .logs
            .iter()
            .enumerate()
            .filter(|(_, l)| l.surfaced)
            .map(|(i, l)| Solid {
                rect: l.collision_rect(),
                kind: SolidKind::Log(i),
            }),
    );
    solids
}

/// Map held keys onto the avatar's velocity. Returns whether a jump started.
pub fn apply_input(avatar: &mut Avatar, input: &InputState, cfg: &AvatarConfig) -> bool {
    let dir = input.move_dir();
    avatar.vx = dir * cfg.move_speed;
    if dir != 0.0 {
        avatar.facing = dir;
        if avatar.on_ground {
            avatar.anim += cfg.move_speed;
        }
    }
    if input.jump && avatar.on_ground && !avatar.climbing {
        avatar.vy = -cfg.jump_power;
        avatar.on_ground = false;
        return true;
    }
    false
}

/// Keep a resting avatar on the surfaced log beneath it. A sinking log can
/// drop faster than gravity pulls, so contact is re-established from the
/// log's current top before integration.
fn follow_log(avatar: &mut Avatar, screen: &Screen, tol: f32) {
    let bottom = avatar.y + avatar.h;
    let support = screen
        .logs
        .iter()
        .filter(|l| l.surfaced)
        .map(MovingLog::collision_rect)
        .filter(|r| r.overlaps_x(avatar.x, avatar.x + avatar.w))
        .filter(|r| (r.y - bottom).abs() <= tol)
        .min_by(|a, b| a.y.total_cmp(&b.y));
    if let Some(top) = support {
        avatar.y = top.y - avatar.h;
        avatar.vy = 0.0;
    }
}

/// Result of one physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Moved {
        /// Touched down this tick after being airborne.
        landed: bool,
    },
    ExitedScreen(EdgeSide),
    Died(DeathCause),
}

/// Integrate and resolve the avatar against `screen` for one tick.
///
/// `exit_armed` is false while the transition lock is held. `ascend` is the
/// up/jump input, which keeps a grounded avatar's residual velocity alive.
pub fn step(
    avatar: &mut Avatar,
    screen: &Screen,
    cfg: &SimConfig,
    exit_armed: bool,
    ascend: bool,
) -> StepOutcome {
    let world = &cfg.world;
    let tol = cfg.avatar.contact_tolerance;
    let was_on_ground = avatar.on_ground;

    if !avatar.climbing && avatar.vy >= 0.0 && (avatar.on_ground || avatar.vy == 0.0) {
        follow_log(avatar, screen, tol);
    }
    if !avatar.climbing {
        if avatar.on_ground && avatar.vy > 0.0 && !ascend {
            avatar.vy = 0.0;
        }
        avatar.vy = (avatar.vy + world.gravity).min(cfg.avatar.max_fall_speed);
    }
    avatar.x += avatar.vx;
    avatar.y += avatar.vy;

    if exit_armed {
        let trigger = avatar.w * EDGE_TRIGGER;
        if avatar.x + avatar.w > world.width + trigger {
            return StepOutcome::ExitedScreen(EdgeSide::Right);
        }
        if avatar.x < -trigger {
            return StepOutcome::ExitedScreen(EdgeSide::Left);
        }
    }

    avatar.on_ground = false;
    let mut carried = false;
    for solid in build_solids(screen, cfg) {
        let s = solid.rect;
        if !intersects(&avatar.rect(), &s) {
            continue;
        }
        let prev_bottom = avatar.y - avatar.vy + avatar.h;
        let prev_top = avatar.y - avatar.vy;
        let prev_right = avatar.x - avatar.vx + avatar.w;
        let prev_left = avatar.x - avatar.vx;

        // Landing is checked first so corner hits resolve as landings.
        if prev_bottom <= s.y + tol && avatar.vy >= 0.0 {
            avatar.y = s.y - avatar.h;
            avatar.vy = 0.0;
            avatar.on_ground = true;
            if let SolidKind::Log(i) = solid.kind
                && !carried
                && let Some(log) = screen.logs.get(i)
            {
                avatar.x += log.last_dx;
                carried = true;
            }
            continue;
        }
        if solid.is_one_way() {
            continue;
        }
        if prev_top >= s.bottom() - tol && avatar.vy < 0.0 {
            avatar.y = s.bottom();
            avatar.vy = 0.0;
        } else if prev_right <= s.x + tol && avatar.vx > 0.0 {
            avatar.x = s.x - avatar.w;
        } else if prev_left >= s.right() - tol && avatar.vx < 0.0 {
            avatar.x = s.right();
        }
    }

    if avatar.y > world.height + world.fall_margin {
        return StepOutcome::Died(DeathCause::Fall);
    }

    let probe = avatar.probe(cfg.avatar.hazard_probe_width);
    for o in &screen.obstacles {
        if o.fatal_region(screen.ground_y)
            .is_some_and(|region| intersects(&probe, &region))
        {
            return StepOutcome::Died(DeathCause::Hazard(o.kind));
        }
    }

    let body = avatar.rect();
    if let Some(animal) = screen
        .animals
        .iter()
        .find(|a| intersects(&body, &a.hitbox()))
    {
        return StepOutcome::Died(DeathCause::Animal(animal.kind));
    }

    avatar.x = avatar
        .x
        .clamp(-avatar.w - EDGE_CLAMP_SLACK, world.width + EDGE_CLAMP_SLACK);

    StepOutcome::Moved {
        landed: avatar.on_ground && !was_on_ground,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::test_helpers::{assert_close, test_config};

    use crate::entities::{Animal, Obstacle, Platform};
    use crate::motion;
    use crate::screen::obstacle_at;

    const GROUND: f32 = 470.0;

    fn cfg() -> SimConfig {
        test_config(1, 1)
    }

    fn flat_screen() -> Screen {
        Screen::new("Flat", GROUND, false)
    }

    fn avatar_standing(cfg: &SimConfig, x: f32) -> Avatar {
        let mut a = Avatar::new(cfg);
        a.x = x;
        a.y = GROUND - a.h;
        a.on_ground = true;
        a
    }

    /// Run until the avatar stops falling or `max_ticks` elapse.
    fn settle(avatar: &mut Avatar, screen: &Screen, cfg: &SimConfig, max_ticks: usize) -> StepOutcome {
        let mut last = StepOutcome::Moved { landed: false };
        for _ in 0..max_ticks {
            last = step(avatar, screen, cfg, true, false);
            if !matches!(last, StepOutcome::Moved { .. }) || avatar.on_ground {
                break;
            }
        }
        last
    }

    #[test]
    fn standing_avatar_stays_grounded() {
        let cfg = cfg();
        let screen = flat_screen();
        let mut a = avatar_standing(&cfg, 200.0);
        for _ in 0..10 {
            assert_eq!(step(&mut a, &screen, &cfg, true, false), StepOutcome::Moved { landed: false });
            assert!(a.on_ground);
            assert_eq!(a.vy, 0.0);
            assert_close(a.y, GROUND - a.h, 1e-4);
        }
    }

    #[test]
    fn jump_input_sets_impulse() {
        let cfg = cfg();
        let mut a = avatar_standing(&cfg, 200.0);
        let jump = InputState {
            jump: true,
            right: true,
            ..Default::default()
        };
        assert!(apply_input(&mut a, &jump, &cfg.avatar));
        assert_eq!(a.vy, -cfg.avatar.jump_power);
        assert!(!a.on_ground);
        assert_eq!(a.vx, cfg.avatar.move_speed);
        // Already airborne: no second jump
        assert!(!apply_input(&mut a, &jump, &cfg.avatar));
    }

    #[test]
    fn left_input_turns_avatar() {
        let cfg = cfg();
        let mut a = avatar_standing(&cfg, 200.0);
        let left = InputState {
            left: true,
            ..Default::default()
        };
        apply_input(&mut a, &left, &cfg.avatar);
        assert_eq!(a.facing, -1.0);
        assert_eq!(a.vx, -cfg.avatar.move_speed);
        assert!(a.anim > 0.0);
    }

    #[test]
    fn landing_zeroes_velocity_same_tick() {
        let cfg = cfg();
        let screen = flat_screen();
        let mut a = Avatar::new(&cfg);
        a.x = 200.0;
        a.y = GROUND - a.h - 30.0;
        let outcome = settle(&mut a, &screen, &cfg, 200);
        assert_eq!(outcome, StepOutcome::Moved { landed: true });
        assert_eq!(a.vy, 0.0);
        assert!(a.on_ground);
        assert_close(a.y + a.h, GROUND, 1e-4);
    }

    #[test]
    fn fall_speed_is_capped() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Pit, 0.0, 960.0, GROUND, 540.0));
        let mut a = Avatar::new(&cfg);
        a.y = -2000.0;
        for _ in 0..100 {
            step(&mut a, &screen, &cfg, false, false);
        }
        assert_eq!(a.vy, cfg.avatar.max_fall_speed);
    }

    #[test]
    fn pit_cuts_the_ground_and_kills() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Pit, 300.0, 90.0, GROUND, 540.0));
        let solids = build_solids(&screen, &cfg);
        let ground: Vec<Rect> = solids
            .iter()
            .filter(|s| s.kind == SolidKind::Ground)
            .map(|s| s.rect)
            .collect();
        assert_eq!(ground.len(), 2);
        assert_eq!(ground[0].right(), 300.0);
        assert_eq!(ground[1].x, 390.0);

        let mut a = avatar_standing(&cfg, 331.0);
        a.on_ground = false;
        let outcome = settle(&mut a, &screen, &cfg, 10);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard(ObstacleKind::Pit)));
    }

    #[test]
    fn walking_into_quicksand_is_fatal() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Quicksand, 300.0, 96.0, GROUND, 540.0));
        let mut a = avatar_standing(&cfg, 250.0);
        let mut died = None;
        for _ in 0..40 {
            a.vx = cfg.avatar.move_speed;
            if let StepOutcome::Died(cause) = step(&mut a, &screen, &cfg, true, false) {
                died = Some(cause);
                break;
            }
        }
        assert_eq!(died, Some(DeathCause::Hazard(ObstacleKind::Quicksand)));
    }

    #[test]
    fn fallen_tree_blocks_like_a_wall() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::FallenTree, 300.0, 150.0, GROUND, 540.0));
        let mut a = avatar_standing(&cfg, 250.0);
        for _ in 0..40 {
            a.vx = cfg.avatar.move_speed;
            assert!(matches!(step(&mut a, &screen, &cfg, true, false), StepOutcome::Moved { .. }));
        }
        assert_close(a.x + a.w, 300.0, 1e-4);
        assert!(a.on_ground);
    }

    #[test]
    fn ceiling_stops_upward_motion() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen.obstacles.push(Obstacle::new(
            ObstacleKind::FallenTree,
            Rect::new(150.0, 340.0, 200.0, 30.0),
        ));
        let mut a = avatar_standing(&cfg, 200.0);
        a.on_ground = false;
        a.vy = -cfg.avatar.jump_power;
        let mut bumped = false;
        for _ in 0..20 {
            step(&mut a, &screen, &cfg, true, true);
            if a.y >= 370.0 - 1e-3 && a.y < 375.0 && a.vy >= 0.0 {
                bumped = true;
                break;
            }
        }
        assert!(bumped, "avatar should stop under the ceiling, y={}", a.y);
        assert!(a.y >= 370.0 - 1e-3);
    }

    #[test]
    fn jumping_up_through_platform_is_allowed() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .platforms
            .push(Platform::new(Rect::new(150.0, 400.0, 200.0, 18.0)));
        let mut a = avatar_standing(&cfg, 200.0);
        a.on_ground = false;
        a.vy = -cfg.avatar.jump_power;
        let mut min_y = a.y;
        for _ in 0..60 {
            step(&mut a, &screen, &cfg, true, true);
            min_y = min_y.min(a.y);
            if a.on_ground {
                break;
            }
        }
        // Passed above the platform, then landed on it
        assert!(min_y + a.h < 400.0);
        assert!(a.on_ground);
        assert_close(a.y + a.h, 400.0, 1e-4);
    }

    #[test]
    fn one_way_platform_ignores_side_contact() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .platforms
            .push(Platform::new(Rect::new(300.0, 440.0, 100.0, 18.0)));
        let mut a = avatar_standing(&cfg, 260.0);
        for _ in 0..20 {
            a.vx = cfg.avatar.move_speed;
            step(&mut a, &screen, &cfg, true, false);
        }
        assert!(a.x > 300.0, "walked through the platform's side");
    }

    /// A river screen with one log patrolling it and an avatar standing on the log.
    fn riding_log(cfg: &SimConfig) -> (Screen, Avatar) {
        let mut screen = flat_screen();
        screen.obstacles.push(obstacle_at(ObstacleKind::River, 200.0, 500.0, GROUND, 540.0));
        screen
            .logs
            .push(MovingLog::new(Rect::new(300.0, 446.0, 130.0, 20.0), 1.5, 210.0, 560.0, 0.0));
        let mut a = Avatar::new(cfg);
        a.x = 340.0;
        a.y = 446.0 - a.h;
        a.on_ground = true;
        (screen, a)
    }

    #[test]
    fn log_carries_avatar_through_a_full_cycle() {
        let cfg = cfg();
        let (mut screen, mut a) = riding_log(&cfg);
        let ticks = (cfg.logs.cycle_secs * cfg.world.tick_rate_hz) as usize;
        let mut deepest = 0.0f32;
        for tick in 0..ticks {
            motion::update_logs(&mut screen.logs, &cfg.logs, cfg.tick_secs());
            let log = screen.logs[0].clone();
            deepest = deepest.max(log.sink);
            let before = a.x;
            let outcome = step(&mut a, &screen, &cfg, true, false);
            if !log.surfaced {
                continue;
            }
            assert_eq!(outcome, StepOutcome::Moved { landed: false }, "tick {tick}");
            assert!(a.on_ground, "lost the log on tick {tick}");
            assert_close(a.x - before, log.last_dx, 1e-3);
            assert_close(a.y + a.h, log.collision_rect().y, 1e-3);
        }
        // The cycle went through the sink window
        assert!(deepest > cfg.logs.max_sink * 0.4, "deepest sink {deepest}");
    }

    #[test]
    fn jump_works_from_a_sinking_log() {
        let cfg = cfg();
        let (mut screen, mut a) = riding_log(&cfg);
        // A tenth of the way into the sink window the log is dropping fastest
        let ticks = (cfg.logs.cycle_secs * cfg.logs.sink_fraction * 0.1 * cfg.world.tick_rate_hz) as usize;
        for _ in 0..ticks {
            motion::update_logs(&mut screen.logs, &cfg.logs, cfg.tick_secs());
            step(&mut a, &screen, &cfg, true, false);
        }
        assert!(screen.logs[0].sink > 0.0);
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        assert!(apply_input(&mut a, &jump, &cfg.avatar));
    }

    #[test]
    fn submerged_log_is_not_solid() {
        let cfg = cfg();
        let mut screen = flat_screen();
        let mut log = MovingLog::new(Rect::new(300.0, 446.0, 130.0, 20.0), 1.5, 210.0, 560.0, 0.0);
        log.surfaced = false;
        screen.logs.push(log);
        let solids = build_solids(&screen, &cfg);
        assert!(solids.iter().all(|s| !matches!(s.kind, SolidKind::Log(_))));
    }

    #[test]
    fn river_surface_is_safe_but_depths_are_not() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen.obstacles.push(obstacle_at(ObstacleKind::River, 200.0, 500.0, GROUND, 540.0));
        // Wading just below the ground line is not yet fatal
        let mut a = avatar_standing(&cfg, 400.0);
        a.y += 10.0;
        a.on_ground = false;
        a.vy = -cfg.world.gravity;
        assert!(matches!(step(&mut a, &screen, &cfg, true, false), StepOutcome::Moved { .. }));
        let outcome = settle(&mut a, &screen, &cfg, 20);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard(ObstacleKind::River)));
    }

    #[test]
    fn landing_on_spikes_is_fatal() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Spikes, 300.0, 80.0, GROUND, 540.0));
        let mut a = Avatar::new(&cfg);
        a.x = 320.0;
        a.y = 300.0;
        let outcome = settle(&mut a, &screen, &cfg, 100);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard(ObstacleKind::Spikes)));
    }

    #[test]
    fn landing_on_stalagmite_tip_is_fatal() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Stalagmite, 300.0, 40.0, GROUND, 540.0));
        let mut a = Avatar::new(&cfg);
        a.x = 320.0 - a.w / 2.0;
        a.y = 300.0;
        let outcome = settle(&mut a, &screen, &cfg, 100);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard(ObstacleKind::Stalagmite)));
    }

    #[test]
    fn stalagmite_flank_blocks_without_killing() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::Stalagmite, 300.0, 40.0, GROUND, 540.0));
        let mut a = avatar_standing(&cfg, 250.0);
        for _ in 0..40 {
            a.vx = cfg.avatar.move_speed;
            assert!(matches!(step(&mut a, &screen, &cfg, true, false), StepOutcome::Moved { .. }));
        }
        assert_close(a.x + a.w, 300.0, 1e-4);
        assert!(a.on_ground);
    }

    #[test]
    fn dropping_into_rock_pit_is_fatal() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .obstacles
            .push(obstacle_at(ObstacleKind::RockPit, 300.0, 90.0, GROUND, 540.0));
        let mut a = Avatar::new(&cfg);
        a.x = 331.0;
        a.y = 300.0;
        let outcome = settle(&mut a, &screen, &cfg, 100);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard(ObstacleKind::RockPit)));
    }

    #[test]
    fn animal_contact_is_fatal() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen
            .animals
            .push(Animal::new(AnimalKind::Snake, 215.0, GROUND, 100.0, 400.0));
        let mut a = avatar_standing(&cfg, 200.0);
        assert_eq!(
            step(&mut a, &screen, &cfg, true, false),
            StepOutcome::Died(DeathCause::Animal(AnimalKind::Snake))
        );
    }

    #[test]
    fn bottomless_fall_is_fatal() {
        let cfg = cfg();
        let screen = flat_screen();
        let mut a = Avatar::new(&cfg);
        a.y = cfg.world.height + cfg.world.fall_margin;
        a.vy = 5.0;
        assert_eq!(
            step(&mut a, &screen, &cfg, true, false),
            StepOutcome::Died(DeathCause::Fall)
        );
    }

    #[test]
    fn edge_exit_requires_armed_lock() {
        let cfg = cfg();
        let screen = flat_screen();
        let threshold = cfg.world.width + cfg.avatar.width * EDGE_TRIGGER;

        let mut a = avatar_standing(&cfg, threshold - cfg.avatar.width - 1.0);
        a.vx = cfg.avatar.move_speed;
        assert_eq!(
            step(&mut a, &screen, &cfg, true, false),
            StepOutcome::ExitedScreen(EdgeSide::Right)
        );

        let mut locked = avatar_standing(&cfg, threshold - cfg.avatar.width - 1.0);
        locked.vx = cfg.avatar.move_speed;
        assert!(matches!(
            step(&mut locked, &screen, &cfg, false, false),
            StepOutcome::Moved { .. }
        ));
        assert!(locked.x <= cfg.world.width + 8.0);

        let mut left = avatar_standing(&cfg, -cfg.avatar.width * EDGE_TRIGGER + 1.0);
        left.vx = -cfg.avatar.move_speed;
        assert_eq!(
            step(&mut left, &screen, &cfg, true, false),
            StepOutcome::ExitedScreen(EdgeSide::Left)
        );
    }

    #[test]
    fn corner_hit_resolves_as_landing() {
        let cfg = cfg();
        let mut screen = flat_screen();
        screen.obstacles.push(Obstacle::new(
            ObstacleKind::FallenTree,
            Rect::new(300.0, 435.0, 150.0, 35.0),
        ));
        let mut a = Avatar::new(&cfg);
        // Falling diagonally onto the tree's top-left corner
        a.x = 300.0 - a.w + 1.0;
        a.y = 435.0 - a.h - 2.0;
        a.vx = cfg.avatar.move_speed;
        a.vy = 3.0;
        step(&mut a, &screen, &cfg, true, false);
        assert!(a.on_ground);
        assert_eq!(a.vy, 0.0);
        assert_close(a.y + a.h, 435.0, 1e-4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn dropped_avatar_rests_on_platform(
                px in 150.0f32..600.0,
                offset in 0.0f32..80.0,
                height in 5.0f32..200.0,
            ) {
                let cfg = cfg();
                let mut screen = flat_screen();
                let top = 380.0;
                screen.platforms.push(Platform::new(Rect::new(px, top, 120.0, 18.0)));
                let mut a = Avatar::new(&cfg);
                a.x = px + offset;
                a.y = top - a.h - height;
                for _ in 0..200 {
                    step(&mut a, &screen, &cfg, true, false);
                    prop_assert!(a.y + a.h <= top + 1e-3, "fell through the platform");
                }
                prop_assert!(a.on_ground);
                prop_assert_eq!(a.vy, 0.0);
                prop_assert!((a.y + a.h - top).abs() < 1e-3);
            }

            #[test]
            fn avatar_position_stays_finite_and_bounded(
                moves in proptest::collection::vec(-1.0f32..=1.0, 20..60),
            ) {
                let cfg = cfg();
                let mut screen = flat_screen();
                screen.obstacles.push(obstacle_at(ObstacleKind::FallenTree, 500.0, 120.0, GROUND, 540.0));
                screen.platforms.push(Platform::new(Rect::new(200.0, 400.0, 120.0, 18.0)));
                let mut a = avatar_standing(&cfg, 400.0);
                for &m in &moves {
                    a.vx = m * cfg.avatar.move_speed;
                    if m > 0.6 && a.on_ground {
                        a.vy = -cfg.avatar.jump_power;
                        a.on_ground = false;
                    }
                    step(&mut a, &screen, &cfg, false, m > 0.6);
                    prop_assert!(a.x.is_finite() && a.y.is_finite());
                    prop_assert!(a.x >= -a.w - 8.0 && a.x <= cfg.world.width + 8.0);
                    prop_assert!(a.y + a.h <= GROUND + 1e-3);
                }
            }
        }
    }
}
