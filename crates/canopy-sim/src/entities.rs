use serde::{Deserialize, Serialize};

use canopy_core::audio::PickupTier;
use canopy_core::geometry::Rect;

/// Bank overhang kept on each side of a river's ground cut.
pub const RIVER_BANK: f32 = 10.0;
/// Fraction of the river width the bed narrows by on each side at full depth.
pub const RIVER_TAPER: f32 = 0.12;
/// Depth below the ground line at which river water becomes fatal.
pub const RIVER_SAFE_DEPTH: f32 = 18.0;
/// Height of the water surface above the ground line.
pub const RIVER_SURFACE_RISE: f32 = 28.0;
/// Horizontal reach added to each side of a flying animal's hitbox.
const WINGSPAN: f32 = 10.0;
/// Hover height of flying animals above the ground line.
const FLIGHT_ALTITUDE: f32 = 110.0;

/// Hazard kinds. Behavior is a fixed table rather than string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Quicksand,
    River,
    Pit,
    RockPit,
    FallenTree,
    Spikes,
    Stalagmite,
}

impl ObstacleKind {
    /// Removes its footprint from the ground collision segment.
    pub fn is_ground_breaking(self) -> bool {
        matches!(
            self,
            ObstacleKind::Quicksand | ObstacleKind::River | ObstacleKind::Pit | ObstacleKind::RockPit
        )
    }

    /// Acts as a two-sided collision box.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            ObstacleKind::FallenTree | ObstacleKind::Spikes | ObstacleKind::Stalagmite
        )
    }

    pub fn is_fatal(self) -> bool {
        !matches!(self, ObstacleKind::FallenTree)
    }

    pub fn label(self) -> &'static str {
        match self {
            ObstacleKind::Quicksand => "quicksand",
            ObstacleKind::River => "river",
            ObstacleKind::Pit => "pit",
            ObstacleKind::RockPit => "rock pit",
            ObstacleKind::FallenTree => "fallen tree",
            ObstacleKind::Spikes => "spikes",
            ObstacleKind::Stalagmite => "stalagmite",
        }
    }

    pub fn death_message(self) -> &'static str {
        match self {
            ObstacleKind::Quicksand => "Swallowed by quicksand!",
            ObstacleKind::River => "Swept away by the river!",
            ObstacleKind::Pit => "Fell into a pit!",
            ObstacleKind::RockPit => "Tumbled into a rock pit!",
            ObstacleKind::FallenTree => "Crushed by timber!",
            ObstacleKind::Spikes => "Impaled on spikes!",
            ObstacleKind::Stalagmite => "Skewered by a stalagmite!",
        }
    }
}

/// A typed hazard rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rect: Rect,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, rect: Rect) -> Self {
        Self { kind, rect }
    }

    /// Horizontal cross-section of a river at `depth_frac` (0 = surface, 1 = bed).
    /// Other kinds return their full extent.
    pub fn profile(&self, depth_frac: f32) -> (f32, f32) {
        if self.kind != ObstacleKind::River {
            return (self.rect.x, self.rect.right());
        }
        let d = depth_frac.clamp(0.0, 1.0);
        let inset = RIVER_BANK + RIVER_TAPER * self.rect.w * d;
        (self.rect.x + inset, self.rect.right() - inset)
    }

    /// Span removed from the ground segment, if this kind breaks the ground.
    pub fn ground_cut(&self) -> Option<(f32, f32)> {
        if !self.kind.is_ground_breaking() {
            return None;
        }
        Some(self.profile(0.0))
    }

    /// The sub-region whose contact with the avatar's probe is fatal.
    pub fn fatal_region(&self, ground_y: f32) -> Option<Rect> {
        let r = self.rect;
        match self.kind {
            ObstacleKind::FallenTree => None,
            ObstacleKind::Quicksand | ObstacleKind::Pit | ObstacleKind::RockPit => Some(r),
            ObstacleKind::Spikes => Some(Rect::new(r.x, r.y - 2.0, r.w, r.h + 2.0)),
            ObstacleKind::Stalagmite => Some(Rect::new(
                r.x + r.w * 0.3,
                r.y - 2.0,
                r.w * 0.4,
                r.h * 0.5 + 2.0,
            )),
            ObstacleKind::River => {
                let top = ground_y + RIVER_SAFE_DEPTH;
                if top >= r.bottom() || r.h <= 0.0 {
                    return None;
                }
                let (x0, x1) = self.profile((top - r.y) / r.h);
                Some(Rect::new(x0, top, x1 - x0, r.bottom() - top))
            },
        }
    }
}

/// Optional vertical wobble on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub amplitude: f32,
    pub period_secs: f32,
}

/// Static one-way platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub wobble: Option<Wobble>,
    /// Ticks since the wobble started; the phase is derived from it.
    pub wobble_ticks: u64,
    /// Current vertical wobble displacement.
    pub offset: f32,
}

impl Platform {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            wobble: None,
            wobble_ticks: 0,
            offset: 0.0,
        }
    }

    pub fn with_wobble(mut self, amplitude: f32, period_secs: f32) -> Self {
        self.wobble = Some(Wobble {
            amplitude,
            period_secs,
        });
        self
    }

    pub fn collision_rect(&self) -> Rect {
        self.rect.translated(0.0, self.offset)
    }
}

/// A log patrolling a river and periodically sinking below the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingLog {
    /// Current x and the surfaced baseline y.
    pub rect: Rect,
    /// Horizontal units per tick; the sign is the direction.
    pub speed: f32,
    pub min_x: f32,
    pub max_x: f32,
    /// Offset of this log's submersion cycle, in cycle fractions.
    pub phase_offset: f32,
    /// Ticks elapsed; the submersion phase is derived from it.
    pub cycle_ticks: u64,
    /// Current depth below the baseline.
    pub sink: f32,
    pub surfaced: bool,
    /// Horizontal displacement applied on the latest tick.
    pub last_dx: f32,
}

impl MovingLog {
    pub fn new(rect: Rect, speed: f32, min_x: f32, max_x: f32, phase_offset: f32) -> Self {
        Self {
            rect,
            speed,
            min_x,
            max_x,
            phase_offset,
            cycle_ticks: 0,
            sink: 0.0,
            surfaced: true,
            last_dx: 0.0,
        }
    }

    pub fn collision_rect(&self) -> Rect {
        self.rect.translated(0.0, self.sink)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimalKind {
    Snake,
    Frog,
    Panther,
    Scorpion,
    Bat,
}

impl AnimalKind {
    pub const SURFACE: [AnimalKind; 3] = [AnimalKind::Snake, AnimalKind::Frog, AnimalKind::Panther];
    pub const CAVE: [AnimalKind; 2] = [AnimalKind::Scorpion, AnimalKind::Bat];

    pub fn size(self) -> (f32, f32) {
        match self {
            AnimalKind::Snake => (52.0, 24.0),
            AnimalKind::Frog => (28.0, 22.0),
            AnimalKind::Panther => (70.0, 30.0),
            AnimalKind::Scorpion => (40.0, 22.0),
            AnimalKind::Bat => (34.0, 18.0),
        }
    }

    pub fn patrol_speed(self) -> f32 {
        match self {
            AnimalKind::Snake => 0.6,
            AnimalKind::Frog => 0.9,
            AnimalKind::Panther => 1.4,
            AnimalKind::Scorpion => 0.8,
            AnimalKind::Bat => 1.6,
        }
    }

    /// Starting hit points; `None` means the animal cannot be hurt.
    pub fn hit_points(self) -> Option<u8> {
        match self {
            AnimalKind::Snake => Some(1),
            AnimalKind::Frog => None,
            AnimalKind::Panther => Some(3),
            AnimalKind::Scorpion => Some(2),
            AnimalKind::Bat => Some(1),
        }
    }

    pub fn is_flying(self) -> bool {
        matches!(self, AnimalKind::Bat)
    }

    pub fn label(self) -> &'static str {
        match self {
            AnimalKind::Snake => "snake",
            AnimalKind::Frog => "frog",
            AnimalKind::Panther => "panther",
            AnimalKind::Scorpion => "scorpion",
            AnimalKind::Bat => "bat",
        }
    }

    pub fn death_message(self) -> &'static str {
        match self {
            AnimalKind::Snake => "Bitten by a snake!",
            AnimalKind::Frog => "Flattened by a frog!",
            AnimalKind::Panther => "Mauled by a panther!",
            AnimalKind::Scorpion => "Stung by a scorpion!",
            AnimalKind::Bat => "Swarmed by a bat!",
        }
    }
}

/// A patrolling hostile actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub kind: AnimalKind,
    pub rect: Rect,
    pub base_y: f32,
    pub min_x: f32,
    pub max_x: f32,
    /// +1.0 moving right, -1.0 moving left.
    pub dir: f32,
    pub speed: f32,
    /// Ticks since spawn; drives idle animation and bobbing.
    pub phase: u32,
    pub hp: Option<u8>,
    pub charging: bool,
    /// Id of the last attack swing that damaged this animal.
    pub last_hit_swing: Option<u32>,
}

impl Animal {
    /// Place an animal of `kind` with its left edge at `x`, standing on (or
    /// hovering above) `ground_y`, patrolling `[min_x, max_x]`.
    pub fn new(kind: AnimalKind, x: f32, ground_y: f32, min_x: f32, max_x: f32) -> Self {
        let (w, h) = kind.size();
        let y = if kind.is_flying() {
            ground_y - FLIGHT_ALTITUDE - h
        } else {
            ground_y - h
        };
        Self {
            kind,
            rect: Rect::new(x, y, w, h),
            base_y: y,
            min_x,
            max_x,
            dir: 1.0,
            speed: kind.patrol_speed(),
            phase: 0,
            hp: kind.hit_points(),
            charging: false,
            last_hit_swing: None,
        }
    }

    /// Contact box used for fatality; flying kinds get their wingspan.
    pub fn hitbox(&self) -> Rect {
        if self.kind.is_flying() {
            Rect::new(
                self.rect.x - WINGSPAN,
                self.rect.y - 4.0,
                self.rect.w + WINGSPAN * 2.0,
                self.rect.h + 8.0,
            )
        } else {
            self.rect
        }
    }

    /// Frogs carry no hit points and shrug off swings.
    pub fn is_damageable(&self) -> bool {
        self.hp.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasureTier {
    MoneyBag,
    SilverBar,
    GoldBar,
    DiamondRing,
}

impl TreasureTier {
    pub const ALL: [TreasureTier; 4] = [
        TreasureTier::MoneyBag,
        TreasureTier::SilverBar,
        TreasureTier::GoldBar,
        TreasureTier::DiamondRing,
    ];

    pub fn audio_tier(self) -> PickupTier {
        match self {
            TreasureTier::MoneyBag => PickupTier::Low,
            TreasureTier::SilverBar => PickupTier::Mid,
            TreasureTier::GoldBar => PickupTier::High,
            TreasureTier::DiamondRing => PickupTier::Top,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TreasureTier::MoneyBag => "money bag",
            TreasureTier::SilverBar => "silver bar",
            TreasureTier::GoldBar => "gold bar",
            TreasureTier::DiamondRing => "diamond ring",
        }
    }
}

pub const TREASURE_SIZE: (f32, f32) = (24.0, 20.0);

/// A collectible. Stays in the screen after collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasure {
    pub tier: TreasureTier,
    pub rect: Rect,
    pub collected: bool,
}

impl Treasure {
    /// Treasure resting with its bottom edge on `surface_y`.
    pub fn new(tier: TreasureTier, x: f32, surface_y: f32) -> Self {
        let (w, h) = TREASURE_SIZE;
        Self {
            tier,
            rect: Rect::new(x, surface_y - h, w, h),
            collected: false,
        }
    }
}
