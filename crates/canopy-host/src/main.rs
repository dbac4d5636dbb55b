mod audio_log;
mod autopilot;

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use canopy_core::audio::AudioDirector;
use canopy_core::config::SimConfig;
use canopy_sim::{GameEvent, Runtime};

use audio_log::LogBackend;
use autopilot::Autopilot;

/// Host knobs read from the environment.
struct HostOptions {
    seconds: f32,
    realtime: bool,
    audio_device: bool,
    ladder_every: usize,
}

impl HostOptions {
    fn from_env() -> Self {
        let seconds = std::env::var("CANOPY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(60.0);
        let flag = |name: &str| std::env::var(name).is_ok_and(|v| v == "1" || v == "true");
        Self {
            seconds,
            realtime: flag("CANOPY_REALTIME"),
            audio_device: flag("CANOPY_AUDIO_DEVICE"),
            ladder_every: std::env::var("CANOPY_LADDER_EVERY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    ticks: u64,
    score: u64,
    lives: u32,
    screen: String,
    deaths: u32,
    transitions: u32,
    treasures: u32,
    animals_defeated: u32,
    synthesized_tones: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = HostOptions::from_env();
    let cfg = SimConfig::load();
    let audio_settings = cfg.audio.clone();
    let dt = cfg.tick_secs();
    let tick = Duration::from_secs_f32(dt);
    let total_ticks = (options.seconds * cfg.world.tick_rate_hz).ceil() as u64;

    let mut runtime = match Runtime::new(cfg) {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Cannot start runtime: {e}");
            std::process::exit(1);
        },
    };
    let mut director = AudioDirector::new(LogBackend::new(options.audio_device), audio_settings);
    let pilot = Autopilot::new(options.ladder_every);
    let mut summary = RunSummary::default();

    let started = runtime.start();
    dispatch(&started, &mut director, &mut summary);

    tracing::info!(ticks = total_ticks, realtime = options.realtime, "Canopy host running");
    for _ in 0..total_ticks {
        let frame_start = Instant::now();
        let input = pilot.next_input(&runtime.snapshot());
        runtime.set_input(input);
        let events = runtime.tick();
        dispatch(&events, &mut director, &mut summary);
        director.advance(dt);
        summary.synthesized_tones += director.fallback_mut().drain().len();
        summary.ticks += 1;

        if options.realtime
            && let Some(rest) = tick.checked_sub(frame_start.elapsed())
        {
            std::thread::sleep(rest);
        }
    }

    let snap = runtime.snapshot();
    summary.score = snap.hud.score;
    summary.lives = snap.hud.lives;
    summary.screen = snap.hud.screen_name;
    tracing::info!(
        score = summary.score,
        deaths = summary.deaths,
        audio_failures = director.primary_failures(),
        "Run finished"
    );
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!("Failed to encode summary: {e}"),
    }
}

/// Forward events to the audio director and tally them.
fn dispatch(events: &[GameEvent], director: &mut AudioDirector<LogBackend>, summary: &mut RunSummary) {
    for event in events {
        if let Some(cue) = event.cue() {
            director.play(cue);
        }
        match event {
            GameEvent::ThemeChanged(theme) => director.select_theme(*theme),
            GameEvent::ThemeDucked => director.duck_theme(),
            GameEvent::ThemeResumed => director.resume_theme(),
            GameEvent::Died { .. } => summary.deaths += 1,
            GameEvent::ScreenChanged { .. } => summary.transitions += 1,
            GameEvent::TreasureCollected { .. } => summary.treasures += 1,
            GameEvent::AnimalDefeated { .. } => summary.animals_defeated += 1,
            _ => {},
        }
    }
}
