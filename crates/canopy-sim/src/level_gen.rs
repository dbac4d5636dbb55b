use rand::Rng;

use canopy_core::config::{LevelSource, SimConfig};
use canopy_core::geometry::{Rect, intersects, subtract_span, within_clearance};
use canopy_core::rng::SeededRng;

use crate::entities::{
    Animal, AnimalKind, MovingLog, Obstacle, ObstacleKind, Platform, TREASURE_SIZE, Treasure,
    TreasureTier,
};
use crate::screen::{
    LADDER_WIDTH, PLATFORM_THICKNESS, Point, Screen, ScreenSlot, classic_screens, ladder_at,
    logs_for_river, obstacle_at, spawn_on_ladder,
};

/// Walls taller than this fraction of the jump apex are never generated.
const WALL_FACTOR: f32 = 0.8;
/// Platforms whose top is within this fraction of the apex count as reachable.
const REACH_FACTOR: f32 = 0.85;
/// Fraction of the full jump span a gap (plus the avatar's width) may use.
const GAP_FACTOR: f32 = 0.9;
/// Left edge of the surface spawn point.
const SURFACE_SPAWN_X: f32 = 60.0;
/// Keep-out margin around a ladder for animal patrol routes.
const LADDER_KEEP_OUT: f32 = 60.0;

const SURFACE_HAZARDS: [ObstacleKind; 4] = [
    ObstacleKind::Quicksand,
    ObstacleKind::Pit,
    ObstacleKind::FallenTree,
    ObstacleKind::Spikes,
];
const CAVE_HAZARDS: [ObstacleKind; 3] = [
    ObstacleKind::RockPit,
    ObstacleKind::Stalagmite,
    ObstacleKind::Spikes,
];

/// Width range for a generated hazard of `kind`.
fn hazard_width(kind: ObstacleKind) -> (f32, f32) {
    match kind {
        ObstacleKind::Quicksand => (60.0, 100.0),
        ObstacleKind::Pit | ObstacleKind::RockPit => (60.0, 95.0),
        ObstacleKind::FallenTree => (100.0, 170.0),
        ObstacleKind::Spikes => (50.0, 90.0),
        ObstacleKind::Stalagmite => (36.0, 60.0),
        ObstacleKind::River => (260.0, 460.0),
    }
}

/// Apex height and horizontal reach of a full running jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpEnvelope {
    pub rise: f32,
    pub span: f32,
}

impl JumpEnvelope {
    pub fn from_config(cfg: &SimConfig) -> Self {
        let v = cfg.avatar.jump_power;
        let g = cfg.world.gravity;
        Self {
            rise: v * v / (2.0 * g),
            span: cfg.avatar.move_speed * 2.0 * v / g,
        }
    }

    /// Widest stretch without footing the avatar can clear.
    pub fn max_gap(&self, avatar_width: f32) -> f32 {
        self.span * GAP_FACTOR - avatar_width
    }
}

/// Whether the avatar can cross the screen from edge to edge.
///
/// Footing is the ground minus cut-outs and lethal-topped walls, plus log
/// patrol lanes and platforms reachable from the ground. Every break in the
/// footing must fit inside one jump, and no wall may be taller than a jump.
pub fn is_traversable(screen: &Screen, cfg: &SimConfig) -> bool {
    let env = JumpEnvelope::from_config(cfg);
    let world_w = cfg.world.width;

    if screen
        .obstacles
        .iter()
        .any(|o| o.kind.is_solid() && o.rect.h > env.rise * WALL_FACTOR)
    {
        return false;
    }

    let mut footing = vec![(0.0, world_w)];
    for o in &screen.obstacles {
        if let Some((x0, x1)) = o.ground_cut() {
            subtract_span(&mut footing, x0, x1);
        } else if o.kind.is_solid() && o.kind.is_fatal() {
            subtract_span(&mut footing, o.rect.x, o.rect.right());
        }
    }
    footing.extend(
        screen
            .logs
            .iter()
            .map(|log| (log.min_x, log.max_x + log.rect.w)),
    );
    footing.extend(
        screen
            .platforms
            .iter()
            .filter(|p| screen.ground_y - p.rect.y <= env.rise * REACH_FACTOR)
            .map(|p| (p.rect.x, p.rect.right())),
    );
    footing.sort_by(|a, b| a.0.total_cmp(&b.0));

    let max_gap = env.max_gap(cfg.avatar.width);
    let mut reach = 0.0_f32;
    for (x0, x1) in footing {
        if x0 - reach > max_gap {
            return false;
        }
        reach = reach.max(x1);
    }
    world_w - reach <= max_gap
}

/// Build the screen sequence selected by `generation.source`.
pub fn build_screens(cfg: &SimConfig) -> Vec<ScreenSlot> {
    let g = &cfg.generation;
    match g.source {
        LevelSource::Generated => generate_screens(cfg, g.seed, g.screen_count),
        LevelSource::Classic => classic_screens(cfg),
        LevelSource::Mixed => {
            let mut slots = classic_screens(cfg);
            slots.extend(generate_screens(cfg, g.seed, g.screen_count));
            slots
        },
    }
}

/// Generate `count` screens deterministically from `seed`.
pub fn generate_screens(cfg: &SimConfig, seed: u32, count: usize) -> Vec<ScreenSlot> {
    let root = SeededRng::new(seed);
    let slots: Vec<ScreenSlot> = (0..count)
        .map(|i| {
            let mut rng = root.derive(i as u32);
            generate_slot(cfg, &mut rng)
        })
        .collect();
    tracing::info!(
        seed,
        count,
        undergrounds = slots.iter().filter(|s| s.underground.is_some()).count(),
        "Generated screens"
    );
    slots
}

fn generate_slot(cfg: &SimConfig, rng: &mut SeededRng) -> ScreenSlot {
    let mut surface = Layout::new(cfg, false);
    surface.screen.spawn = Point {
        x: SURFACE_SPAWN_X,
        y: cfg.world.ground_y - cfg.avatar.height,
    };

    if rng.random_bool(cfg.generation.river_chance) {
        surface.place_river(rng);
    }
    if rng.random_bool(cfg.generation.ladder_chance) {
        surface.place_ladder(rng);
    }
    let hazards = if surface.river_zone.is_some() {
        rng.random_range(0..=1)
    } else {
        rng.random_range(1..=3)
    };
    for _ in 0..hazards {
        surface.place_hazard(rng, &SURFACE_HAZARDS);
    }
    for _ in 0..rng.random_range(0..=2) {
        surface.place_platform(rng);
    }
    if rng.random_bool(cfg.generation.surface_treasure_chance) {
        surface.place_treasure(rng, &TreasureTier::ALL[..3]);
    }
    for _ in 0..rng.random_range(0..=2) {
        surface.place_animal(rng, &AnimalKind::SURFACE);
    }
    surface.screen.name = screen_name(rng, &surface.screen);

    let underground = surface
        .screen
        .ladder
        .map(|ladder| generate_underground(cfg, rng, ladder));

    ScreenSlot {
        surface: surface.screen,
        underground,
    }
}

fn generate_underground(cfg: &SimConfig, rng: &mut SeededRng, ladder: Rect) -> Screen {
    let mut cave = Layout::new(cfg, true);
    let ground_y = cave.screen.ground_y;
    cave.screen.ladder = Some(ladder);
    cave.screen.spawn = spawn_on_ladder(&ladder, ground_y, cfg);

    for _ in 0..rng.random_range(1..=2) {
        cave.place_hazard(rng, &CAVE_HAZARDS);
    }
    for _ in 0..rng.random_range(1..=3) {
        cave.place_platform(rng);
    }
    if rng.random_bool(cfg.generation.cave_treasure_chance) {
        cave.place_treasure(rng, &TreasureTier::ALL[1..]);
    }
    if rng.random_bool(0.5) {
        cave.place_animal(rng, &AnimalKind::CAVE);
    }
    cave.screen.name = screen_name(rng, &cave.screen);
    cave.screen
}

/// A blocking element proposed for placement.
enum Element {
    River(Obstacle, Vec<MovingLog>),
    Hazard(Obstacle),
    Platform(Platform),
    Ladder(Rect),
}

impl Element {
    fn rect(&self) -> Rect {
        match self {
            Element::River(o, _) | Element::Hazard(o) => o.rect,
            Element::Platform(p) => p.rect,
            Element::Ladder(r) => *r,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Element::River(..) => "river",
            Element::Hazard(o) => o.kind.label(),
            Element::Platform(_) => "platform",
            Element::Ladder(_) => "ladder",
        }
    }
}

/// Which collection the last committed element went into.
#[derive(Debug, Clone, Copy)]
enum Committed {
    River,
    Hazard,
    Platform,
    Ladder,
}

/// A screen under construction plus the river exclusion zone.
struct Layout<'a> {
    cfg: &'a SimConfig,
    screen: Screen,
    river_zone: Option<Rect>,
}

impl<'a> Layout<'a> {
    fn new(cfg: &'a SimConfig, cave: bool) -> Self {
        Self {
            cfg,
            screen: Screen::new(String::new(), cfg.world.ground_y, cave),
            river_zone: None,
        }
    }

    fn ground_y(&self) -> f32 {
        self.screen.ground_y
    }

    /// Horizontal range available to a blocking element of width `w`.
    fn x_range(&self, w: f32) -> (f32, f32) {
        let margin = self.cfg.generation.edge_margin;
        (margin, (self.cfg.world.width - margin - w).max(margin))
    }

    fn random_x(&self, rng: &mut SeededRng, w: f32) -> f32 {
        let (lo, hi) = self.x_range(w);
        if hi > lo { rng.random_range(lo..hi) } else { lo }
    }

    fn in_edge_bounds(&self, r: &Rect) -> bool {
        let margin = self.cfg.generation.edge_margin;
        r.x >= margin && r.right() <= self.cfg.world.width - margin
    }

    fn in_river_zone(&self, r: &Rect) -> bool {
        self.river_zone.is_some_and(|z| intersects(&z, r))
    }

    /// Edge margins, river exclusion and clearance from every blocking element.
    fn admits(&self, candidate: &Rect) -> bool {
        let buffer = self.cfg.generation.clearance_buffer;
        self.in_edge_bounds(candidate)
            && !self.in_river_zone(candidate)
            && !self
                .screen
                .blocking_rects()
                .iter()
                .any(|b| within_clearance(b, candidate, buffer))
    }

    fn commit(&mut self, element: Element) -> Committed {
        match element {
            Element::River(river, logs) => {
                self.screen.logs = logs;
                self.screen.obstacles.push(river);
                Committed::River
            },
            Element::Hazard(o) => {
                self.screen.obstacles.push(o);
                Committed::Hazard
            },
            Element::Platform(p) => {
                self.screen.platforms.push(p);
                Committed::Platform
            },
            Element::Ladder(r) => {
                self.screen.ladder = Some(r);
                Committed::Ladder
            },
        }
    }

    fn rollback(&mut self, committed: Committed) {
        match committed {
            Committed::River => {
                self.screen.logs.clear();
                self.screen.obstacles.pop();
            },
            Committed::Hazard => {
                self.screen.obstacles.pop();
            },
            Committed::Platform => {
                self.screen.platforms.pop();
            },
            Committed::Ladder => self.screen.ladder = None,
        }
    }

    /// Propose candidates until one is admitted and keeps the screen
    /// traversable. Gives up after the attempt budget and leaves the screen
    /// unchanged.
    fn place<F>(&mut self, rng: &mut SeededRng, mut propose: F) -> Option<Rect>
    where
        F: FnMut(&Self, &mut SeededRng) -> Element,
    {
        let attempts = self.cfg.generation.placement_attempts;
        let mut label = "element";
        for _ in 0..attempts {
            let candidate = propose(self, rng);
            label = candidate.label();
            let rect = candidate.rect();
            if !self.admits(&rect) {
                continue;
            }
            let committed = self.commit(candidate);
            if is_traversable(&self.screen, self.cfg) {
                return Some(rect);
            }
            self.rollback(committed);
        }
        tracing::debug!(
            element = label,
            attempts,
            "Dropped element after exhausting placement attempts"
        );
        None
    }

    fn place_river(&mut self, rng: &mut SeededRng) {
        let buffer = self.cfg.generation.clearance_buffer;
        let ground_y = self.ground_y();
        let world_h = self.cfg.world.height;
        let placed = self.place(rng, |layout, rng| {
            let (lo_w, hi_w) = hazard_width(ObstacleKind::River);
            let w = rng.random_range(lo_w..hi_w);
            // The exclusion zone itself must stay out of the edge margins.
            let x = layout.random_x(rng, w + buffer * 2.0) + buffer;
            let river = obstacle_at(ObstacleKind::River, x, w, ground_y, world_h);
            let count = ((w / 170.0).ceil() as usize).clamp(2, 3);
            let lanes: Vec<(f32, f32)> = (0..count)
                .map(|i| {
                    let speed = rng.random_range(1.0..1.8);
                    let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
                    (rng.random_range(110.0..140.0), speed * dir)
                })
                .collect();
            let logs = logs_for_river(&river, ground_y, &lanes);
            Element::River(river, logs)
        });
        if let Some(rect) = placed {
            self.river_zone = Some(Rect::new(
                rect.x - buffer,
                0.0,
                rect.w + buffer * 2.0,
                world_h,
            ));
        }
    }

    fn place_ladder(&mut self, rng: &mut SeededRng) {
        let ground_y = self.ground_y();
        self.place(rng, |layout, rng| {
            Element::Ladder(ladder_at(layout.random_x(rng, LADDER_WIDTH), ground_y))
        });
    }

    fn place_hazard(&mut self, rng: &mut SeededRng, kinds: &[ObstacleKind]) {
        let ground_y = self.ground_y();
        let world_h = self.cfg.world.height;
        self.place(rng, |layout, rng| {
            let kind = rng.pick(kinds).copied().unwrap_or(ObstacleKind::Spikes);
            let (lo, hi) = hazard_width(kind);
            let w = rng.random_range(lo..hi);
            let x = layout.random_x(rng, w);
            Element::Hazard(obstacle_at(kind, x, w, ground_y, world_h))
        });
    }

    fn place_platform(&mut self, rng: &mut SeededRng) {
        let ground_y = self.ground_y();
        self.place(rng, |layout, rng| {
            let w = rng.random_range(100.0..150.0);
            let x = layout.random_x(rng, w);
            let top = ground_y - rng.random_range(60.0..110.0);
            let mut platform = Platform::new(Rect::new(x, top, w, PLATFORM_THICKNESS));
            if rng.random_bool(0.3) {
                platform =
                    platform.with_wobble(rng.random_range(2.0..4.0), rng.random_range(1.5..3.0));
            }
            Element::Platform(platform)
        });
    }

    /// Treasure is not blocking; it only has to stay clear of hazards and
    /// the river.
    fn place_treasure(&mut self, rng: &mut SeededRng, tiers: &[TreasureTier]) {
        let Some(&tier) = rng.pick(tiers) else {
            return;
        };
        let ground_y = self.ground_y();
        for _ in 0..self.cfg.generation.placement_attempts {
            let treasure = match rng.pick(&self.screen.platforms) {
                Some(p) if rng.random_bool(0.5) => {
                    let span = (p.rect.w - TREASURE_SIZE.0).max(0.0);
                    let x = p.rect.x + rng.random_range(0.0..=span);
                    Treasure::new(tier, x, p.rect.y)
                },
                _ => Treasure::new(tier, self.random_x(rng, TREASURE_SIZE.0), ground_y),
            };
            let clear = self
                .screen
                .obstacles
                .iter()
                .all(|o| !intersects(&o.rect.inflate(16.0), &treasure.rect));
            if clear && self.in_edge_bounds(&treasure.rect) && !self.in_river_zone(&treasure.rect) {
                self.screen.treasure = Some(treasure);
                return;
            }
        }
        tracing::debug!(tier = tier.label(), "No room for treasure");
    }

    /// Animals keep away from hazards, the river, ladders, each other and the
    /// screen edges, so entering or respawning never lands on one.
    fn place_animal(&mut self, rng: &mut SeededRng, kinds: &[AnimalKind]) {
        let Some(&kind) = rng.pick(kinds) else {
            return;
        };
        let ground_y = self.ground_y();
        let buffer = self.cfg.generation.clearance_buffer;
        let margin = self.cfg.generation.edge_margin + 20.0;
        let (w, h) = kind.size();
        let right_limit = self.cfg.world.width - margin - w;
        if right_limit <= margin {
            return;
        }
        for _ in 0..self.cfg.generation.placement_attempts {
            let x = rng.random_range(margin..right_limit);
            let min_x = (x - rng.random_range(60.0..140.0)).max(margin);
            let max_x = (x + rng.random_range(60.0..140.0)).min(right_limit);
            let animal = Animal::new(kind, x, ground_y, min_x, max_x);
            let hitbox = animal.hitbox();
            let route = Rect::new(min_x, hitbox.y, max_x + w - min_x, h);

            let near_ladder = self
                .screen
                .ladder
                .is_some_and(|l| route.overlaps_x(l.x - LADDER_KEEP_OUT, l.right() + LADDER_KEEP_OUT));
            let near_animal = self
                .screen
                .animals
                .iter()
                .any(|a| route.overlaps_x(a.min_x, a.max_x + a.rect.w));
            let blocked = if kind.is_flying() {
                self.screen
                    .platforms
                    .iter()
                    .any(|p| within_clearance(&p.rect, &hitbox, buffer))
            } else {
                self.in_river_zone(&route)
                    || self
                        .screen
                        .obstacles
                        .iter()
                        .any(|o| intersects(&o.rect.inflate(20.0), &hitbox))
            };
            if !near_ladder && !near_animal && !blocked {
                self.screen.animals.push(animal);
                return;
            }
        }
        tracing::debug!(animal = kind.label(), "No room for animal");
    }
}

const SURFACE_ADJECTIVES: [&str; 7] = [
    "Whispering",
    "Tangled",
    "Misty",
    "Sunlit",
    "Howling",
    "Emerald",
    "Ancient",
];
const SURFACE_NOUNS: [&str; 6] = ["Trail", "Grove", "Thicket", "Canopy", "Clearing", "Hollow"];
const CAVE_ADJECTIVES: [&str; 5] = ["Echoing", "Dripping", "Crystal", "Shadow", "Root"];
const CAVE_NOUNS: [&str; 5] = ["Cavern", "Grotto", "Tunnels", "Maze", "Depths"];

/// Compose a name from lexical fragments, biased by the hazards present.
fn screen_name(rng: &mut SeededRng, screen: &Screen) -> String {
    let has = |kind: ObstacleKind| screen.obstacles.iter().any(|o| o.kind == kind);

    let mut adjectives: Vec<&str> = if screen.cave {
        CAVE_ADJECTIVES.to_vec()
    } else {
        SURFACE_ADJECTIVES.to_vec()
    };
    let mut nouns: Vec<&str> = if screen.cave {
        CAVE_NOUNS.to_vec()
    } else {
        SURFACE_NOUNS.to_vec()
    };
    if has(ObstacleKind::River) {
        adjectives = vec!["Rushing", "Log", "Misty"];
        nouns = vec!["Crossing", "Rapids", "Ford", "River"];
    }
    if has(ObstacleKind::Quicksand) {
        adjectives.extend(["Sinking", "Muddy"]);
    }
    if has(ObstacleKind::Pit) || has(ObstacleKind::RockPit) {
        adjectives.extend(["Broken", "Sunken"]);
    }
    if has(ObstacleKind::FallenTree) {
        adjectives.push("Fallen");
        nouns.push("Timber");
    }
    if has(ObstacleKind::Stalagmite) || has(ObstacleKind::Spikes) {
        adjectives.push("Jagged");
    }

    let adjective = rng.pick(&adjectives).copied().unwrap_or("Wild");
    let noun = rng.pick(&nouns).copied().unwrap_or("Jungle");
    format!("{adjective} {noun}")
}
