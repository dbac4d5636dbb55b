pub mod combat;
pub mod effects;
pub mod entities;
pub mod input;
pub mod ladder;
pub mod level_gen;
pub mod motion;
pub mod physics;
pub mod scoring;
pub mod screen;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use canopy_core::audio::{AudioCue, ThemeKey};
use canopy_core::config::{ConfigError, SimConfig};
use canopy_core::geometry::intersects;
use canopy_core::rng::SeededRng;
use canopy_core::schedule::Scheduler;

use combat::{AttackState, Strike, resolve_strikes};
use effects::{Burst, BurstKind, update_bursts};
use entities::{AnimalKind, TreasureTier};
use input::InputState;
use ladder::{LadderTransition, update_ladder};
use physics::{Avatar, DeathCause, EdgeSide, StepOutcome, apply_input};
use screen::{Point, Screen, ScreenSlot};
use snapshot::{AvatarPose, Hud, Snapshot};

/// Distance from the entry edge at which the avatar reappears on a new screen.
pub const REENTRY_X: f32 = 20.0;
/// Salt separating the cosmetic effect stream from level generation.
const FX_SALT: u32 = 0xF1A5;

/// Something that happened during a tick. Hosts forward these to audio and UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Jumped,
    Landed,
    Died { cause: DeathCause, lives_left: u32 },
    Respawned,
    TreasureCollected { tier: TreasureTier, points: u64 },
    ScreenChanged { index: usize, exited: EdgeSide },
    LadderDescended,
    LadderAscended,
    Swung,
    AnimalHit { kind: AnimalKind },
    AnimalDefeated { kind: AnimalKind, points: u64 },
    ThemeChanged(ThemeKey),
    ThemeDucked,
    ThemeResumed,
}

impl GameEvent {
    /// One-shot sound for this event, if any. Theme events are handled
    /// separately by the host.
    pub fn cue(&self) -> Option<AudioCue> {
        match self {
            GameEvent::Started => Some(AudioCue::Start),
            GameEvent::Jumped => Some(AudioCue::Jump),
            GameEvent::Landed => Some(AudioCue::Land),
            GameEvent::Died { .. } => Some(AudioCue::Death),
            GameEvent::TreasureCollected { tier, .. } => Some(AudioCue::Pickup(tier.audio_tier())),
            GameEvent::ScreenChanged { .. } => Some(AudioCue::ScreenChange),
            GameEvent::LadderDescended => Some(AudioCue::LadderDown),
            GameEvent::LadderAscended => Some(AudioCue::LadderUp),
            GameEvent::Swung => Some(AudioCue::Swing),
            GameEvent::AnimalHit { .. } => Some(AudioCue::AnimalHit),
            GameEvent::AnimalDefeated { .. } => Some(AudioCue::AnimalDefeated),
            GameEvent::Respawned
            | GameEvent::ThemeChanged(_)
            | GameEvent::ThemeDucked
            | GameEvent::ThemeResumed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum TimerKey {
    Respawn,
    ThemeResume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Scheduled {
    Respawn,
    ResumeTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub expires_at: f64,
}

/// Session-level state. Everything here is mutated only by [`Runtime::tick`]
/// and the start trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub lives: u32,
    pub screen_index: usize,
    pub underground: bool,
    pub started: bool,
    pub message: Option<Message>,
    pub bursts: Vec<Burst>,
    pub respawn_pending: bool,
    /// Edge transitions are ignored until the clock passes this.
    pub transition_lock_until: f64,
    /// Edge of the current screen the avatar came in through, if any.
    pub entry_side: Option<EdgeSide>,
    /// Fixed steps taken since start.
    pub ticks: u64,
    /// Simulated seconds since start, derived from `ticks`.
    pub clock: f64,
    pub attack: AttackState,
}

impl GameState {
    fn new(cfg: &SimConfig) -> Self {
        Self {
            score: 0,
            lives: cfg.rules.starting_lives,
            screen_index: 0,
            underground: false,
            started: false,
            message: None,
            bursts: Vec::new(),
            respawn_pending: false,
            transition_lock_until: 0.0,
            entry_side: None,
            ticks: 0,
            clock: 0.0,
            attack: AttackState::default(),
        }
    }
}

/// The simulation context: screens, avatar, session state and timers.
pub struct Runtime {
    cfg: SimConfig,
    screens: Vec<ScreenSlot>,
    avatar: Avatar,
    state: GameState,
    input: InputState,
    timers: Scheduler<TimerKey, Scheduled>,
    fx_rng: SeededRng,
}

impl Runtime {
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let screens = level_gen::build_screens(&cfg);
        if screens.is_empty() {
            return Err(ConfigError::Invalid("level source produced no screens".into()));
        }
        let mut avatar = Avatar::new(&cfg);
        avatar.place_at(screens[0].surface.spawn);
        tracing::info!(screens = screens.len(), seed = cfg.generation.seed, "Runtime ready");
        Ok(Self {
            fx_rng: SeededRng::new(cfg.generation.seed).derive(FX_SALT),
            state: GameState::new(&cfg),
            screens,
            avatar,
            input: InputState::default(),
            timers: Scheduler::new(),
            cfg,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn screens(&self) -> &[ScreenSlot] {
        &self.screens
    }

    pub fn current_screen(&self) -> &Screen {
        self.screens[self.state.screen_index].screen(self.state.underground)
    }

    pub fn theme(&self) -> ThemeKey {
        if self.state.underground {
            ThemeKey::Cave
        } else {
            ThemeKey::Surface(self.state.screen_index as u32)
        }
    }

    /// Replace the held-key state used by subsequent ticks.
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Begin play. Repeated calls are no-ops.
    pub fn start(&mut self) -> Vec<GameEvent> {
        if self.state.started {
            return Vec::new();
        }
        self.state.started = true;
        let spawn = self.spawn_point();
        self.avatar.place_at(spawn);
        tracing::info!(screen = %self.current_screen().name, "Game started");
        vec![GameEvent::Started, GameEvent::ThemeChanged(self.theme())]
    }

    /// Advance the simulation by one fixed step.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if !self.state.started {
            return Vec::new();
        }
        let dt = self.cfg.tick_secs();
        self.state.ticks += 1;
        self.state.clock = self.state.ticks as f64 * f64::from(dt);
        let now = self.state.clock;
        let mut events = Vec::new();

        for due in self.timers.drain_due(now) {
            match due {
                Scheduled::Respawn => self.respawn(&mut events),
                Scheduled::ResumeTheme => events.push(GameEvent::ThemeResumed),
            }
        }
        update_bursts(&mut self.state.bursts, dt);

        if self.state.respawn_pending {
            self.expire_message(now);
            return events;
        }

        let input = self.input;
        let underground = self.state.underground;
        let slot = &mut self.screens[self.state.screen_index];
        let has_underground = slot.underground.is_some();
        let screen = slot.screen_mut(underground);

        motion::update_screen(screen, &self.avatar.rect(), &self.cfg, dt);

        self.avatar.just_died = false;
        let jumped = apply_input(&mut self.avatar, &input, &self.cfg.avatar);

        match update_ladder(
            &mut self.avatar,
            screen,
            underground,
            has_underground,
            &input,
            &self.cfg,
        ) {
            LadderTransition::Stay => {
                // Grabbing the ladder cancels the jump impulse.
                if jumped && !self.avatar.climbing {
                    events.push(GameEvent::Jumped);
                }
            },
            LadderTransition::Descend => {
                self.switch_plane(true, &mut events);
                self.expire_message(now);
                return events;
            },
            LadderTransition::Ascend => {
                self.switch_plane(false, &mut events);
                self.expire_message(now);
                return events;
            },
        }

        if input.action
            && !self.avatar.climbing
            && self.state.attack.try_start(now, &self.cfg.timing)
        {
            events.push(GameEvent::Swung);
        }
        for strike in resolve_strikes(&self.state.attack, &self.avatar, &mut screen.animals, now) {
            match strike {
                Strike::Hit { kind, .. } => events.push(GameEvent::AnimalHit { kind }),
                Strike::Defeated { kind, points, at } => {
                    self.state.score += points;
                    self.state.bursts.push(Burst::new(
                        BurstKind::Defeat,
                        at.x,
                        at.y,
                        self.cfg.timing.burst_secs,
                        &mut self.fx_rng,
                    ));
                    tracing::debug!(animal = kind.label(), points, "Animal defeated");
                    events.push(GameEvent::AnimalDefeated { kind, points });
                },
            }
        }

        let exit_armed = now >= self.state.transition_lock_until;
        let ascend = input.up || input.jump;
        match physics::step(&mut self.avatar, screen, &self.cfg, exit_armed, ascend) {
            StepOutcome::Moved { landed } => {
                if landed {
                    events.push(GameEvent::Landed);
                }
            },
            StepOutcome::ExitedScreen(side) => {
                self.change_screen(side, &mut events);
                self.expire_message(now);
                return events;
            },
            StepOutcome::Died(cause) => {
                self.die(cause, &mut events);
                self.expire_message(now);
                return events;
            },
        }

        self.collect_treasure(&mut events);
        self.expire_message(now);
        events
    }

    /// Read-only view for presentation.
    pub fn snapshot(&self) -> Snapshot {
        let now = self.state.clock;
        Snapshot {
            world_width: self.cfg.world.width,
            world_height: self.cfg.world.height,
            screen: self.current_screen().clone(),
            avatar: AvatarPose::from_avatar(&self.avatar, self.state.attack.is_active(now)),
            bursts: self.state.bursts.clone(),
            hud: Hud {
                score: self.state.score,
                lives: self.state.lives,
                screen_name: self.screens[self.state.screen_index]
                    .display_name(self.state.underground),
                screen_index: self.state.screen_index,
                underground: self.state.underground,
            },
            message: self.state.message.as_ref().map(|m| m.text.clone()),
            started: self.state.started,
            respawn_pending: self.state.respawn_pending,
        }
    }

    pub fn serialize_snapshot(&self) -> Vec<u8> {
        self.snapshot().encode()
    }

    /// Scheduled respawn time while one is pending.
    pub fn respawn_due(&self) -> Option<f64> {
        self.timers.due_at(TimerKey::Respawn)
    }

    fn spawn_point(&self) -> Point {
        let spawn = self.current_screen().spawn;
        let x = match self.state.entry_side {
            Some(EdgeSide::Left) => REENTRY_X,
            Some(EdgeSide::Right) => self.cfg.world.width - self.avatar.w - REENTRY_X,
            None => spawn.x,
        };
        Point { x, y: spawn.y }
    }

    fn die(&mut self, cause: DeathCause, events: &mut Vec<GameEvent>) {
        if self.state.respawn_pending {
            return;
        }
        let now = self.state.clock;
        let timing = &self.cfg.timing;
        self.state.lives = self.state.lives.saturating_sub(1);
        self.state.respawn_pending = true;
        self.state.message = Some(Message {
            text: cause.message().to_string(),
            expires_at: now + f64::from(timing.death_message_secs),
        });
        self.timers.schedule(
            TimerKey::Respawn,
            now + f64::from(timing.respawn_delay_secs),
            Scheduled::Respawn,
        );
        self.timers.schedule(
            TimerKey::ThemeResume,
            now + f64::from(timing.theme_resume_secs),
            Scheduled::ResumeTheme,
        );

        let body = self.avatar.rect();
        self.state.bursts.push(Burst::new(
            BurstKind::Death,
            body.center_x(),
            body.center_y(),
            timing.burst_secs,
            &mut self.fx_rng,
        ));
        self.avatar.vx = 0.0;
        self.avatar.vy = 0.0;
        self.avatar.climbing = false;
        self.avatar.just_died = true;

        tracing::info!(lives = self.state.lives, "Avatar died: {}", cause.message());
        events.push(GameEvent::Died {
            cause,
            lives_left: self.state.lives,
        });
        events.push(GameEvent::ThemeDucked);
    }

    fn respawn(&mut self, events: &mut Vec<GameEvent>) {
        if !self.state.respawn_pending {
            return;
        }
        self.state.respawn_pending = false;
        let spawn = self.spawn_point();
        self.avatar.place_at(spawn);
        self.avatar.just_died = false;
        events.push(GameEvent::Respawned);
    }

    fn change_screen(&mut self, exited: EdgeSide, events: &mut Vec<GameEvent>) {
        let count = self.screens.len();
        let index = self.state.screen_index;
        self.state.screen_index = match exited {
            EdgeSide::Right => (index + 1) % count,
            EdgeSide::Left => (index + count - 1) % count,
        };
        if self.screens[self.state.screen_index].underground.is_none() {
            self.state.underground = false;
        }
        self.state.entry_side = Some(match exited {
            EdgeSide::Right => EdgeSide::Left,
            EdgeSide::Left => EdgeSide::Right,
        });
        self.state.score += self.cfg.rules.transition_bonus;
        self.state.transition_lock_until =
            self.state.clock + f64::from(self.cfg.timing.transition_lock_secs);

        let spawn = self.spawn_point();
        self.avatar.place_at(spawn);
        tracing::debug!(
            from = index,
            to = self.state.screen_index,
            screen = %self.current_screen().name,
            "Screen transition"
        );
        events.push(GameEvent::ScreenChanged {
            index: self.state.screen_index,
            exited,
        });
        events.push(GameEvent::ThemeChanged(self.theme()));
    }

    fn switch_plane(&mut self, underground: bool, events: &mut Vec<GameEvent>) {
        self.state.underground = underground;
        self.state.entry_side = None;
        let spawn = self.spawn_point();
        self.avatar.place_at(spawn);
        tracing::debug!(underground, screen = %self.current_screen().name, "Ladder transition");
        events.push(if underground {
            GameEvent::LadderDescended
        } else {
            GameEvent::LadderAscended
        });
        events.push(GameEvent::ThemeChanged(self.theme()));
    }

    fn collect_treasure(&mut self, events: &mut Vec<GameEvent>) {
        let body = self.avatar.rect();
        let underground = self.state.underground;
        let screen = self.screens[self.state.screen_index].screen_mut(underground);
        let Some(treasure) = screen.treasure.as_mut() else {
            return;
        };
        if treasure.collected || !intersects(&body, &treasure.rect) {
            return;
        }
        treasure.collected = true;
        let tier = treasure.tier;
        let points = scoring::treasure_value(tier);
        let (cx, cy) = (treasure.rect.center_x(), treasure.rect.center_y());
        self.state.score += points;
        self.state.bursts.push(Burst::new(
            BurstKind::Pickup,
            cx,
            cy,
            self.cfg.timing.burst_secs,
            &mut self.fx_rng,
        ));
        tracing::debug!(tier = tier.label(), points, "Treasure collected");
        events.push(GameEvent::TreasureCollected { tier, points });
    }

    fn expire_message(&mut self, now: f64) {
        if self
            .state
            .message
            .as_ref()
            .is_some_and(|m| now >= m.expires_at)
        {
            self.state.message = None;
        }
    }
}
