use serde::{Deserialize, Serialize};

use canopy_core::config::SimConfig;
use canopy_core::geometry::Rect;

use crate::entities::{
    Animal, AnimalKind, MovingLog, Obstacle, ObstacleKind, Platform, RIVER_BANK, RIVER_SURFACE_RISE,
    Treasure, TreasureTier,
};

/// Height of a ladder reaching from the ground line.
pub const LADDER_HEIGHT: f32 = 150.0;
pub const LADDER_WIDTH: f32 = 42.0;
pub const PLATFORM_THICKNESS: f32 = 18.0;
pub const LOG_HEIGHT: f32 = 20.0;
/// Surfaced log baseline above the ground line.
pub const LOG_RISE: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One level segment: static layout plus the dynamic entity state it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub spawn: Point,
    pub ground_y: f32,
    pub cave: bool,
    pub foliage: bool,
    pub obstacles: Vec<Obstacle>,
    pub platforms: Vec<Platform>,
    pub logs: Vec<MovingLog>,
    pub animals: Vec<Animal>,
    pub ladder: Option<Rect>,
    pub treasure: Option<Treasure>,
}

impl Screen {
    pub fn new(name: impl Into<String>, ground_y: f32, cave: bool) -> Self {
        Self {
            name: name.into(),
            spawn: Point { x: 0.0, y: 0.0 },
            ground_y,
            cave,
            foliage: !cave,
            obstacles: Vec::new(),
            platforms: Vec::new(),
            logs: Vec::new(),
            animals: Vec::new(),
            ladder: None,
            treasure: None,
        }
    }

    pub fn river(&self) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.kind == ObstacleKind::River)
    }

    /// Avatar-sized box at the spawn point.
    pub fn spawn_rect(&self, cfg: &SimConfig) -> Rect {
        Rect::new(self.spawn.x, self.spawn.y, cfg.avatar.width, cfg.avatar.height)
    }

    /// Rectangles the layout keeps apart by the clearance buffer.
    pub fn blocking_rects(&self) -> Vec<Rect> {
        let mut out: Vec<Rect> = self.obstacles.iter().map(|o| o.rect).collect();
        out.extend(self.platforms.iter().map(|p| p.rect));
        out.extend(self.ladder);
        out
    }
}

/// A surface screen and the optional underground screen its ladder leads to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSlot {
    pub surface: Screen,
    pub underground: Option<Screen>,
}

impl ScreenSlot {
    pub fn screen(&self, underground: bool) -> &Screen {
        match (&self.underground, underground) {
            (Some(cave), true) => cave,
            _ => &self.surface,
        }
    }

    pub fn screen_mut(&mut self, underground: bool) -> &mut Screen {
        match (&mut self.underground, underground) {
            (Some(cave), true) => cave,
            _ => &mut self.surface,
        }
    }

    /// HUD label; underground screens carry their surface name as a prefix.
    pub fn display_name(&self, underground: bool) -> String {
        match (&self.underground, underground) {
            (Some(cave), true) => format!("{} / {}", self.surface.name, cave.name),
            _ => self.surface.name.clone(),
        }
    }
}

/// Build an obstacle of `kind` spanning `[x, x + w]` with the kind's standard
/// vertical extent relative to the ground line.
pub fn obstacle_at(kind: ObstacleKind, x: f32, w: f32, ground_y: f32, world_h: f32) -> Obstacle {
    let rect = match kind {
        ObstacleKind::Quicksand => Rect::new(x, ground_y - 20.0, w, 20.0),
        ObstacleKind::Pit => Rect::new(x, ground_y, w, world_h - ground_y),
        ObstacleKind::RockPit => Rect::new(x, ground_y - 18.0, w, 18.0),
        ObstacleKind::FallenTree => Rect::new(x, ground_y - 35.0, w, 35.0),
        ObstacleKind::Spikes => Rect::new(x, ground_y - 25.0, w, 25.0),
        ObstacleKind::Stalagmite => Rect::new(x, ground_y - 40.0, w, 40.0),
        ObstacleKind::River => {
            let top = ground_y - RIVER_SURFACE_RISE;
            Rect::new(x, top, w, world_h - top)
        },
    };
    Obstacle::new(kind, rect)
}

/// Logs patrolling the full water span of `river`, phase-offset evenly.
/// `lanes` holds `(width, speed)` per log.
pub fn logs_for_river(river: &Obstacle, ground_y: f32, lanes: &[(f32, f32)]) -> Vec<MovingLog> {
    let n = lanes.len().max(1) as f32;
    let min_x = river.rect.x + RIVER_BANK;
    let span = river.rect.w - RIVER_BANK * 2.0;
    lanes
        .iter()
        .enumerate()
        .map(|(i, &(w, speed))| {
            let max_x = (min_x + span - w).max(min_x);
            let x = min_x + (max_x - min_x) * (i as f32 + 0.5) / n;
            MovingLog::new(
                Rect::new(x, ground_y - LOG_RISE, w, LOG_HEIGHT),
                speed,
                min_x,
                max_x,
                i as f32 / n,
            )
        })
        .collect()
}

pub fn ladder_at(x: f32, ground_y: f32) -> Rect {
    Rect::new(x, ground_y - LADDER_HEIGHT, LADDER_WIDTH, LADDER_HEIGHT)
}

/// Spawn point centered on a ladder, standing on the ground.
pub fn spawn_on_ladder(ladder: &Rect, ground_y: f32, cfg: &SimConfig) -> Point {
    Point {
        x: ladder.center_x() - cfg.avatar.width / 2.0,
        y: ground_y - cfg.avatar.height,
    }
}

fn platform(x: f32, top: f32, w: f32) -> Platform {
    Platform::new(Rect::new(x, top, w, PLATFORM_THICKNESS))
}

/// The three hand-authored screens.
pub fn classic_screens(cfg: &SimConfig) -> Vec<ScreenSlot> {
    let g = cfg.world.ground_y;
    let h = cfg.world.height;
    let stand = g - cfg.avatar.height;

    // Jungle Trail / Root Cavern
    let mut trail = Screen::new("Jungle Trail", g, false);
    trail.spawn = Point { x: 90.0, y: stand };
    trail
        .obstacles
        .push(obstacle_at(ObstacleKind::Quicksand, 330.0, 96.0, g, h));
    trail
        .animals
        .push(Animal::new(AnimalKind::Snake, 660.0, g, 560.0, 690.0));
    let trail_ladder = ladder_at(760.0, g);
    trail.ladder = Some(trail_ladder);

    let mut cavern = Screen::new("Root Cavern", g, true);
    cavern.spawn = spawn_on_ladder(&trail_ladder, g, cfg);
    cavern
        .obstacles
        .push(obstacle_at(ObstacleKind::RockPit, 220.0, 90.0, g, h));
    cavern
        .obstacles
        .push(obstacle_at(ObstacleKind::Stalagmite, 520.0, 60.0, g, h));
    cavern.platforms.push(platform(120.0, 372.0, 120.0));
    cavern.platforms.push(platform(360.0, 332.0, 140.0));
    cavern.ladder = Some(trail_ladder);
    cavern.treasure = Some(Treasure::new(TreasureTier::SilverBar, 420.0, 332.0));

    // Log River
    let mut river_screen = Screen::new("Log River", g, false);
    river_screen.spawn = Point { x: 72.0, y: stand };
    let river = obstacle_at(ObstacleKind::River, 180.0, 560.0, g, h);
    river_screen.logs = logs_for_river(&river, g, &[(140.0, 1.15), (130.0, -1.4), (120.0, 1.8)]);
    river_screen.obstacles.push(river);
    river_screen
        .animals
        .push(Animal::new(AnimalKind::Frog, 770.0, g, 760.0, 860.0));

    // Fallen Timber / Rock Maze
    let mut timber = Screen::new("Fallen Timber", g, false);
    timber.spawn = Point { x: 84.0, y: stand };
    timber
        .obstacles
        .push(obstacle_at(ObstacleKind::Pit, 280.0, 90.0, g, h));
    timber
        .obstacles
        .push(obstacle_at(ObstacleKind::FallenTree, 540.0, 170.0, g, h));
    timber.platforms.push(platform(560.0, 392.0, 130.0));
    timber
        .animals
        .push(Animal::new(AnimalKind::Panther, 740.0, g, 720.0, 800.0));
    timber.treasure = Some(Treasure::new(TreasureTier::MoneyBag, 610.0, 392.0));
    let timber_ladder = ladder_at(420.0, g);
    timber.ladder = Some(timber_ladder);

    let mut maze = Screen::new("Rock Maze", g, true);
    maze.spawn = spawn_on_ladder(&timber_ladder, g, cfg);
    maze.obstacles
        .push(obstacle_at(ObstacleKind::Spikes, 630.0, 82.0, g, h));
    maze.platforms.push(platform(130.0, 388.0, 120.0));
    maze.platforms.push(platform(300.0, 352.0, 120.0));
    maze.platforms.push(platform(460.0, 312.0, 120.0));
    maze.ladder = Some(timber_ladder);
    maze.treasure = Some(Treasure::new(TreasureTier::DiamondRing, 510.0, 312.0));

    vec![
        ScreenSlot {
            surface: trail,
            underground: Some(cavern),
        },
        ScreenSlot {
            surface: river_screen,
            underground: None,
        },
        ScreenSlot {
            surface: timber,
            underground: Some(maze),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::geometry::intersects;
    use canopy_core::test_helpers::classic_config;

    #[test]
    fn classic_table_has_three_screens() {
        let cfg = classic_config();
        let slots = classic_screens(&cfg);
        let names: Vec<&str> = slots.iter().map(|s| s.surface.name.as_str()).collect();
        assert_eq!(names, vec!["Jungle Trail", "Log River", "Fallen Timber"]);
        assert!(slots[1].underground.is_none());
        assert_eq!(slots[1].surface.logs.len(), 3);
    }

    #[test]
    fn underground_ladder_shares_surface_x() {
        let cfg = classic_config();
        for slot in classic_screens(&cfg) {
            if let Some(cave) = &slot.underground {
                let top = slot.surface.ladder.unwrap();
                let bottom = cave.ladder.unwrap();
                assert_eq!(top.x, bottom.x);
                assert!(intersects(&cave.spawn_rect(&cfg), &bottom));
            }
        }
    }

    #[test]
    fn display_name_prefixes_surface() {
        let cfg = classic_config();
        let slots = classic_screens(&cfg);
        assert_eq!(slots[0].display_name(false), "Jungle Trail");
        assert_eq!(slots[0].display_name(true), "Jungle Trail / Root Cavern");
        // No underground: falls back to the surface
        assert_eq!(slots[1].display_name(true), "Log River");
    }

    #[test]
    fn logs_stay_inside_river_banks() {
        let cfg = classic_config();
        let slots = classic_screens(&cfg);
        let screen = &slots[1].surface;
        let river = screen.river().unwrap();
        for log in &screen.logs {
            assert!(log.min_x >= river.rect.x);
            assert!(log.max_x + log.rect.w <= river.rect.right());
            assert!(log.rect.x >= log.min_x && log.rect.x <= log.max_x);
        }
    }

    #[test]
    fn spawns_stand_on_ground() {
        let cfg = classic_config();
        for slot in classic_screens(&cfg) {
            let s = &slot.surface;
            assert_eq!(s.spawn.y + cfg.avatar.height, s.ground_y);
        }
    }
}
