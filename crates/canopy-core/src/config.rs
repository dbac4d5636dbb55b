use serde::{Deserialize, Serialize};

/// Errors raised while reading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(m) => write!(f, "config i/o error: {m}"),
            Self::Parse(m) => write!(f, "config parse error: {m}"),
            Self::Invalid(m) => write!(f, "invalid config: {m}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fixed world geometry. Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Downward acceleration added to vertical velocity each tick.
    pub gravity: f32,
    pub ground_y: f32,
    /// Simulation steps per second; one physics step per `update` call.
    pub tick_rate_hz: f32,
    /// Distance below the world's bottom edge that counts as a bottomless fall.
    pub fall_margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            gravity: 0.62,
            ground_y: 470.0,
            tick_rate_hz: 60.0,
            fall_margin: 40.0,
        }
    }
}

/// Avatar dimensions and movement constants (per-tick units).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarConfig {
    pub width: f32,
    pub height: f32,
    pub move_speed: f32,
    pub jump_power: f32,
    pub max_fall_speed: f32,
    pub climb_step: f32,
    /// Slack used when deciding landing/ceiling/wall contact from previous edges.
    pub contact_tolerance: f32,
    /// Horizontal inset of the hitbox used to test ladder contact.
    pub ladder_inset: f32,
    /// Width of the centered probe used for hazard fatality.
    pub hazard_probe_width: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            width: 28.0,
            height: 44.0,
            move_speed: 3.8,
            jump_power: 12.5,
            max_fall_speed: 18.0,
            climb_step: 3.0,
            contact_tolerance: 6.0,
            ladder_inset: 6.0,
            hazard_probe_width: 8.0,
        }
    }
}

/// Durations in seconds of simulated time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub transition_lock_secs: f32,
    pub respawn_delay_secs: f32,
    pub death_message_secs: f32,
    pub theme_resume_secs: f32,
    pub attack_secs: f32,
    pub attack_cooldown_secs: f32,
    pub burst_secs: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_lock_secs: 0.35,
            respawn_delay_secs: 1.25,
            death_message_secs: 2.0,
            theme_resume_secs: 1.6,
            attack_secs: 0.2,
            attack_cooldown_secs: 0.45,
            burst_secs: 0.7,
        }
    }
}

/// Where the screen sequence comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSource {
    Generated,
    Classic,
    Mixed,
}

/// Procedural generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u32,
    pub screen_count: usize,
    pub source: LevelSource,
    /// Minimum gap between any two blocking elements on a screen.
    pub clearance_buffer: f32,
    /// Retries per optional element before it is dropped.
    pub placement_attempts: u32,
    pub ladder_chance: f64,
    pub river_chance: f64,
    pub surface_treasure_chance: f64,
    pub cave_treasure_chance: f64,
    /// Horizontal strip at each world edge kept free of blocking elements.
    pub edge_margin: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            screen_count: 8,
            source: LevelSource::Generated,
            clearance_buffer: 42.0,
            placement_attempts: 24,
            ladder_chance: 0.8,
            river_chance: 0.3,
            surface_treasure_chance: 0.5,
            cave_treasure_chance: 0.65,
            edge_margin: 110.0,
        }
    }
}

/// Moving-log submersion cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub cycle_secs: f32,
    /// Fraction of the cycle spent below the baseline.
    pub sink_fraction: f32,
    pub max_sink: f32,
    /// A log stops being a foothold once its sink exceeds this fraction of `max_sink`.
    pub surfaced_threshold: f32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            cycle_secs: 5.0,
            sink_fraction: 0.35,
            max_sink: 26.0,
            surfaced_threshold: 0.5,
        }
    }
}

/// Scoring and lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_lives: u32,
    pub transition_bonus: u64,
    /// Animals at or below this many hit points start charging.
    pub charge_threshold: u8,
    pub charge_min_speed: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_lives: 99,
            transition_bonus: 100,
            charge_threshold: 1,
            charge_min_speed: 2.6,
        }
    }
}

/// Audio collaborator preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub master_volume: f32,
    pub music_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            master_volume: 0.5,
            music_volume: 0.3,
        }
    }
}

/// Top-level runtime configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub avatar: AvatarConfig,
    pub timing: TimingConfig,
    pub generation: GenerationConfig,
    pub logs: LogConfig,
    pub rules: RulesConfig,
    pub audio: AudioConfig,
}

impl SimConfig {
    /// Load config from `$CANOPY_CONFIG` or `config/canopy.toml`. Falls back to
    /// defaults if the file is missing, unparseable or invalid.
    pub fn load() -> Self {
        let path =
            std::env::var("CANOPY_CONFIG").unwrap_or_else(|_| "config/canopy.toml".to_string());
        match Self::from_file(&path) {
            Ok(cfg) => {
                tracing::info!("Loaded configuration from {path}");
                cfg
            },
            Err(ConfigError::Io(_)) => {
                tracing::info!("No config at {path}, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}, using defaults");
                Self::default()
            },
        }
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Comparisons are written so that NaN fails them.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if !(w.width > 0.0 && w.height > 0.0) {
            return Err(ConfigError::Invalid("world size must be positive".into()));
        }
        if !(w.tick_rate_hz > 0.0) || !w.tick_rate_hz.is_finite() {
            return Err(ConfigError::Invalid("world.tick_rate_hz must be > 0".into()));
        }
        if !(w.ground_y > 0.0 && w.ground_y < w.height) {
            return Err(ConfigError::Invalid("world.ground_y must lie inside the world".into()));
        }
        if !w.gravity.is_finite() || !w.fall_margin.is_finite() {
            return Err(ConfigError::Invalid("world.gravity and fall_margin must be finite".into()));
        }
        if self.generation.screen_count == 0 {
            return Err(ConfigError::Invalid("generation.screen_count must be > 0".into()));
        }
        let a = &self.avatar;
        if !(a.width > 0.0 && a.height > 0.0 && a.width < w.width && a.height < w.ground_y) {
            return Err(ConfigError::Invalid("avatar must fit inside the world".into()));
        }
        let t = &self.timing;
        for (name, secs) in [
            ("transition_lock_secs", t.transition_lock_secs),
            ("respawn_delay_secs", t.respawn_delay_secs),
            ("death_message_secs", t.death_message_secs),
            ("theme_resume_secs", t.theme_resume_secs),
            ("attack_secs", t.attack_secs),
            ("attack_cooldown_secs", t.attack_cooldown_secs),
            ("burst_secs", t.burst_secs),
        ] {
            if !(secs >= 0.0) || !secs.is_finite() {
                return Err(ConfigError::Invalid(format!("timing.{name} must be a finite duration")));
            }
        }
        let g = &self.generation;
        for (name, p) in [
            ("ladder_chance", g.ladder_chance),
            ("river_chance", g.river_chance),
            ("surface_treasure_chance", g.surface_treasure_chance),
            ("cave_treasure_chance", g.cave_treasure_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("generation.{name} must be in [0, 1]")));
            }
        }
        if !(self.logs.cycle_secs > 0.0) || !(0.0..1.0).contains(&self.logs.sink_fraction) {
            return Err(ConfigError::Invalid("logs cycle must be positive with sink_fraction in [0, 1)".into()));
        }
        Ok(())
    }

    /// Seconds per simulation step.
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.world.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let cfg = SimConfig::from_toml_str(
            r#"
            [generation]
            seed = 42
            screen_count = 3
            source = "classic"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.generation.seed, 42);
        assert_eq!(cfg.generation.screen_count, 3);
        assert_eq!(cfg.generation.source, LevelSource::Classic);
        // Untouched sections keep their defaults
        assert_eq!(cfg.world, WorldConfig::default());
        assert_eq!(cfg.avatar.jump_power, 12.5);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = SimConfig::from_toml_str("world = 12").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err}");
    }

    #[test]
    fn zero_screens_rejected() {
        let err = SimConfig::from_toml_str("[generation]\nscreen_count = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn oversized_avatar_rejected() {
        let mut cfg = SimConfig::default();
        cfg.avatar.height = 600.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn probability_out_of_range_rejected() {
        let err = SimConfig::from_toml_str("[generation]\nriver_chance = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("river_chance")));
    }

    #[test]
    fn nan_values_are_rejected() {
        for toml in [
            "[world]\ntick_rate_hz = nan",
            "[world]\nwidth = nan",
            "[logs]\ncycle_secs = nan",
            "[timing]\nrespawn_delay_secs = nan",
            "[avatar]\nheight = nan",
        ] {
            let err = SimConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{toml:?} gave {err}");
        }
    }

    #[test]
    fn infinite_tick_rate_rejected() {
        let mut cfg = SimConfig::default();
        cfg.world.tick_rate_hz = f32::INFINITY;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let cfg = SimConfig::from_toml_str(include_str!("../../../config/canopy.toml")).unwrap();
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::from_file("/definitely/not/here/canopy.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn tick_secs_matches_rate() {
        let cfg = SimConfig::default();
        assert!((cfg.tick_secs() - 1.0 / 60.0).abs() < 1e-6);
    }
}
