pub mod audio;
pub mod config;
pub mod geometry;
pub mod rng;
pub mod schedule;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::{LevelSource, SimConfig};

    /// Default configuration with a fixed seed and screen count.
    pub fn test_config(seed: u32, screen_count: usize) -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.generation.seed = seed;
        cfg.generation.screen_count = screen_count;
        cfg.generation.source = LevelSource::Generated;
        cfg.audio.enabled = false;
        cfg
    }

    /// Configuration that loads the hand-authored classic screens.
    pub fn classic_config() -> SimConfig {
        let mut cfg = test_config(1337, 3);
        cfg.generation.source = LevelSource::Classic;
        cfg
    }

    /// Assert two floats are within `eps` of each other.
    #[track_caller]
    pub fn assert_close(actual: f32, expected: f32, eps: f32) {
        assert!(
            (actual - expected).abs() <= eps,
            "expected {expected} ± {eps}, got {actual}"
        );
    }
}
