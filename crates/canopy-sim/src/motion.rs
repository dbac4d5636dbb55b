use std::f32::consts::PI;

use canopy_core::config::{LogConfig, RulesConfig, SimConfig};
use canopy_core::geometry::{Rect, intersects};

use crate::entities::{Animal, MovingLog, Obstacle, Platform};
use crate::screen::Screen;

/// Vertical amplitude of a flying animal's bob.
const FLIGHT_BOB: f32 = 6.0;
/// Bob phase advance per tick.
const FLIGHT_BOB_RATE: f32 = 0.08;

/// Advance every moving entity on `screen` by one tick.
pub fn update_screen(screen: &mut Screen, avatar: &Rect, cfg: &SimConfig, dt: f32) {
    update_logs(&mut screen.logs, &cfg.logs, dt);
    update_platforms(&mut screen.platforms, dt);
    update_animals(
        &mut screen.animals,
        &screen.obstacles,
        avatar,
        cfg.world.width,
        &cfg.rules,
    );
}

/// Depth below the baseline at cycle position `phase` in `[0, 1)`.
///
/// A log dips along a half sine during the first `sink_fraction` of its
/// cycle and rides at the baseline for the rest.
pub fn log_sink(phase: f32, cfg: &LogConfig) -> f32 {
    if cfg.sink_fraction <= 0.0 || phase >= cfg.sink_fraction {
        return 0.0;
    }
    (PI * phase / cfg.sink_fraction).sin() * cfg.max_sink
}

pub fn update_logs(logs: &mut [MovingLog], cfg: &LogConfig, dt: f32) {
    let threshold = cfg.surfaced_threshold * cfg.max_sink;
    for log in logs.iter_mut() {
        let prev_x = log.rect.x;
        log.rect.x += log.speed;
        if log.rect.x < log.min_x {
            log.rect.x = log.min_x;
            log.speed = log.speed.abs();
        } else if log.rect.x > log.max_x {
            log.rect.x = log.max_x;
            log.speed = -log.speed.abs();
        }
        log.last_dx = log.rect.x - prev_x;

        log.cycle_ticks += 1;
        let elapsed = log.cycle_ticks as f64 * f64::from(dt);
        let phase = (elapsed / f64::from(cfg.cycle_secs) + f64::from(log.phase_offset))
            .rem_euclid(1.0) as f32;
        log.sink = log_sink(phase, cfg);
        log.surfaced = log.sink < threshold;
    }

    // At least one foothold must exist at every instant.
    if !logs.is_empty() && !logs.iter().any(|l| l.surfaced) {
        let shallowest = logs
            .iter_mut()
            .min_by(|a, b| a.sink.total_cmp(&b.sink));
        if let Some(log) = shallowest {
            log.sink = threshold * 0.9;
            log.surfaced = true;
        }
    }
}

pub fn update_platforms(platforms: &mut [Platform], dt: f32) {
    for p in platforms.iter_mut() {
        let Some(wobble) = p.wobble else { continue };
        if wobble.period_secs <= 0.0 {
            continue;
        }
        p.wobble_ticks += 1;
        let elapsed = p.wobble_ticks as f64 * f64::from(dt);
        let turn = (elapsed / f64::from(wobble.period_secs)).rem_euclid(1.0) as f32;
        p.offset = (2.0 * PI * turn).sin() * wobble.amplitude;
    }
}

pub fn update_animals(
    animals: &mut [Animal],
    obstacles: &[Obstacle],
    avatar: &Rect,
    world_w: f32,
    rules: &RulesConfig,
) {
    for animal in animals.iter_mut() {
        animal.phase = animal.phase.wrapping_add(1);

        // Only wounded animals charge.
        let full_hp = animal.kind.hit_points().unwrap_or(0);
        if let Some(hp) = animal.hp
            && hp > 0
            && hp < full_hp
            && hp <= rules.charge_threshold
        {
            if !animal.charging {
                tracing::debug!(animal = animal.kind.label(), "Animal started charging");
            }
            animal.charging = true;
        }
        if animal.charging {
            let dx = avatar.center_x() - animal.rect.center_x();
            if dx != 0.0 {
                animal.dir = dx.signum();
            }
            animal.speed = animal.speed.max(rules.charge_min_speed);
        }

        if animal.kind.is_flying() {
            animal.rect.y =
                animal.base_y + (animal.phase as f32 * FLIGHT_BOB_RATE).sin() * FLIGHT_BOB;
        }

        if animal.speed == 0.0 || animal.max_x <= animal.min_x {
            continue;
        }
        let candidate = animal.rect.translated(animal.dir * animal.speed, 0.0);
        if patrol_blocked(animal, &candidate, obstacles, world_w) {
            animal.dir = -animal.dir;
            continue;
        }
        animal.rect.x = candidate.x;
        if animal.rect.x < animal.min_x {
            animal.rect.x = animal.min_x;
            animal.dir = 1.0;
        } else if animal.rect.x > animal.max_x {
            animal.rect.x = animal.max_x;
            animal.dir = -1.0;
        }
    }
}

/// Leaving the world always blocks. Ground walkers also turn back at the
/// edge of a ground cut-out and in front of a wall.
fn patrol_blocked(animal: &Animal, candidate: &Rect, obstacles: &[Obstacle], world_w: f32) -> bool {
    if candidate.x < 0.0 || candidate.right() > world_w {
        return true;
    }
    if animal.kind.is_flying() {
        return false;
    }
    let cx = candidate.center_x();
    obstacles.iter().any(|o| {
        let over_cut = o.ground_cut().is_some_and(|(x0, x1)| cx >= x0 && cx <= x1);
        over_cut || (o.kind.is_solid() && intersects(candidate, &o.rect))
    })
}
