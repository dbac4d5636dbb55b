use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use canopy_core::rng::SeededRng;

/// Downward pull on particles, per second squared.
const PARTICLE_GRAVITY: f32 = 420.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstKind {
    Death,
    Pickup,
    Defeat,
}

impl BurstKind {
    fn particle_count(self) -> usize {
        match self {
            BurstKind::Death => 18,
            BurstKind::Pickup => 10,
            BurstKind::Defeat => 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// A short-lived cosmetic spray of particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub kind: BurstKind,
    pub age: f32,
    pub lifetime: f32,
    pub particles: Vec<Particle>,
}

impl Burst {
    pub fn new(kind: BurstKind, x: f32, y: f32, lifetime: f32, rng: &mut SeededRng) -> Self {
        let particles = (0..kind.particle_count())
            .map(|_| {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(60.0f32..180.0);
                Particle {
                    x,
                    y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed - 90.0,
                }
            })
            .collect();
        Self {
            kind,
            age: 0.0,
            lifetime: lifetime.max(f32::EPSILON),
            particles,
        }
    }

    /// Remaining intensity in `[0, 1]`; presentation uses it for alpha and size.
    pub fn intensity(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Age and move every burst, dropping the expired ones.
pub fn update_bursts(bursts: &mut Vec<Burst>, dt: f32) {
    for burst in bursts.iter_mut() {
        burst.age += dt;
        for p in &mut burst.particles {
            p.vy += PARTICLE_GRAVITY * dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
        }
    }
    bursts.retain(|b| !b.is_expired());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_decay_and_expire() {
        let mut rng = SeededRng::new(3);
        let mut bursts = vec![Burst::new(BurstKind::Death, 100.0, 100.0, 0.5, &mut rng)];
        assert_eq!(bursts[0].particles.len(), 18);
        assert_eq!(bursts[0].intensity(), 1.0);

        update_bursts(&mut bursts, 0.25);
        assert_eq!(bursts.len(), 1);
        assert!((bursts[0].intensity() - 0.5).abs() < 1e-5);

        update_bursts(&mut bursts, 0.3);
        assert!(bursts.is_empty());
    }

    #[test]
    fn particles_spread_from_origin() {
        let mut rng = SeededRng::new(8);
        let mut bursts = vec![Burst::new(BurstKind::Pickup, 50.0, 50.0, 1.0, &mut rng)];
        update_bursts(&mut bursts, 0.1);
        assert!(
            bursts[0]
                .particles
                .iter()
                .all(|p| p.x != 50.0 || p.y != 50.0)
        );
    }

    #[test]
    fn same_seed_same_burst() {
        let a = Burst::new(BurstKind::Defeat, 0.0, 0.0, 1.0, &mut SeededRng::new(4));
        let b = Burst::new(BurstKind::Defeat, 0.0, 0.0, 1.0, &mut SeededRng::new(4));
        assert_eq!(a, b);
    }
}
