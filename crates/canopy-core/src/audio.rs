use serde::{Deserialize, Serialize};

use crate::config::AudioConfig;

/// Treasure tier as seen by the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupTier {
    Low,
    Mid,
    High,
    Top,
}

/// Named cues the simulation asks the audio collaborator to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Start,
    Jump,
    Land,
    Death,
    Pickup(PickupTier),
    ScreenChange,
    LadderDown,
    LadderUp,
    Swing,
    AnimalHit,
    AnimalDefeated,
}

/// Ambient theme selector: one per surface screen, or the shared cave theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeKey {
    Surface(u32),
    Cave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveType {
    Sine,
    Square,
    Triangle,
    Sawtooth,
    Noise,
}

/// A synthesized tone request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub freq: f32,
    pub duration: f32,
    pub wave: WaveType,
    pub volume: f32,
}

/// Host-side audio playback. Every call reports success so the director can
/// fall back when playback is rejected (locked context, missing file, ...).
pub trait AudioBackend {
    fn play_cue(&mut self, cue: AudioCue) -> bool;
    fn set_theme(&mut self, theme: ThemeKey) -> bool;
    fn stop_theme(&mut self);
}

/// A backend that is never available.
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play_cue(&mut self, _cue: AudioCue) -> bool {
        false
    }

    fn set_theme(&mut self, _theme: ThemeKey) -> bool {
        false
    }

    fn stop_theme(&mut self) {}
}

const fn t(freq: f32, duration: f32, wave: WaveType, volume: f32) -> Tone {
    Tone {
        freq,
        duration,
        wave,
        volume,
    }
}

const START: &[Tone] = &[t(520.0, 0.1, WaveType::Square, 0.1)];
const JUMP: &[Tone] = &[t(760.0, 0.06, WaveType::Square, 0.12)];
const LAND: &[Tone] = &[t(180.0, 0.04, WaveType::Triangle, 0.06)];
const DEATH: &[Tone] = &[
    t(0.0, 0.12, WaveType::Noise, 0.1),
    t(130.0, 0.18, WaveType::Sawtooth, 0.1),
];
const PICKUP_LOW: &[Tone] = &[t(880.0, 0.08, WaveType::Square, 0.1)];
const PICKUP_MID: &[Tone] = &[
    t(880.0, 0.07, WaveType::Square, 0.1),
    t(1175.0, 0.08, WaveType::Square, 0.1),
];
const PICKUP_HIGH: &[Tone] = &[
    t(988.0, 0.07, WaveType::Square, 0.1),
    t(1319.0, 0.1, WaveType::Triangle, 0.1),
];
const PICKUP_TOP: &[Tone] = &[
    t(1047.0, 0.07, WaveType::Square, 0.11),
    t(1319.0, 0.07, WaveType::Square, 0.11),
    t(1568.0, 0.14, WaveType::Triangle, 0.1),
];
const SCREEN_CHANGE: &[Tone] = &[
    t(640.0, 0.1, WaveType::Square, 0.11),
    t(820.0, 0.08, WaveType::Triangle, 0.08),
];
const LADDER_DOWN: &[Tone] = &[t(210.0, 0.14, WaveType::Square, 0.09)];
const LADDER_UP: &[Tone] = &[t(420.0, 0.12, WaveType::Square, 0.09)];
const SWING: &[Tone] = &[t(0.0, 0.05, WaveType::Noise, 0.06)];
const ANIMAL_HIT: &[Tone] = &[t(300.0, 0.08, WaveType::Sawtooth, 0.09)];
const ANIMAL_DEFEATED: &[Tone] = &[
    t(300.0, 0.08, WaveType::Sawtooth, 0.09),
    t(150.0, 0.16, WaveType::Triangle, 0.09),
];

/// Procedural fallback: turns cues into tone requests for a host oscillator.
#[derive(Debug, Default)]
pub struct ToneSynth {
    queued: Vec<Tone>,
    theme: Option<ThemeKey>,
    /// Melody position of the looping theme and time spent on that note.
    theme_pos: usize,
    theme_elapsed: f32,
}

impl ToneSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones_for(cue: AudioCue) -> &'static [Tone] {
        match cue {
            AudioCue::Start => START,
            AudioCue::Jump => JUMP,
            AudioCue::Land => LAND,
            AudioCue::Death => DEATH,
            AudioCue::Pickup(PickupTier::Low) => PICKUP_LOW,
            AudioCue::Pickup(PickupTier::Mid) => PICKUP_MID,
            AudioCue::Pickup(PickupTier::High) => PICKUP_HIGH,
            AudioCue::Pickup(PickupTier::Top) => PICKUP_TOP,
            AudioCue::ScreenChange => SCREEN_CHANGE,
            AudioCue::LadderDown => LADDER_DOWN,
            AudioCue::LadderUp => LADDER_UP,
            AudioCue::Swing => SWING,
            AudioCue::AnimalHit => ANIMAL_HIT,
            AudioCue::AnimalDefeated => ANIMAL_DEFEATED,
        }
    }

    /// Melody step for the looping theme; caves use a lower, sparser line.
    pub fn theme_step(theme: ThemeKey, step: usize) -> Tone {
        const SURFACE: [f32; 12] = [
            262.0, 330.0, 392.0, 523.0, 392.0, 330.0, 294.0, 349.0, 440.0, 349.0, 330.0, 262.0,
        ];
        const CAVE: [f32; 8] = [131.0, 0.0, 156.0, 0.0, 147.0, 131.0, 0.0, 117.0];
        match theme {
            ThemeKey::Surface(id) => {
                let shift = (id % 4) as usize;
                Tone {
                    freq: SURFACE[(step + shift) % SURFACE.len()],
                    duration: 0.11,
                    wave: WaveType::Square,
                    volume: 0.07,
                }
            },
            ThemeKey::Cave => Tone {
                freq: CAVE[step % CAVE.len()],
                duration: 0.2,
                wave: WaveType::Triangle,
                volume: 0.05,
            },
        }
    }

    pub fn theme(&self) -> Option<ThemeKey> {
        self.theme
    }

    /// Advance the looping theme by `dt` seconds, queueing each note as it
    /// starts. Rests advance the melody silently.
    pub fn advance_theme(&mut self, dt: f32) {
        let Some(theme) = self.theme else { return };
        self.theme_elapsed += dt;
        loop {
            let current = Self::theme_step(theme, self.theme_pos);
            if self.theme_elapsed < current.duration {
                break;
            }
            self.theme_elapsed -= current.duration;
            self.theme_pos = self.theme_pos.wrapping_add(1);
            self.queue_theme_note(theme);
        }
    }

    fn queue_theme_note(&mut self, theme: ThemeKey) {
        let note = Self::theme_step(theme, self.theme_pos);
        if note.freq > 0.0 {
            self.queued.push(note);
        }
    }

    /// Take the tones queued since the last call.
    pub fn drain(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.queued)
    }
}

impl AudioBackend for ToneSynth {
    fn play_cue(&mut self, cue: AudioCue) -> bool {
        self.queued.extend_from_slice(Self::tones_for(cue));
        true
    }

    fn set_theme(&mut self, theme: ThemeKey) -> bool {
        self.theme = Some(theme);
        self.theme_pos = 0;
        self.theme_elapsed = 0.0;
        self.queue_theme_note(theme);
        true
    }

    fn stop_theme(&mut self) {
        self.theme = None;
    }
}

/// Routes cues to a primary backend, falling back to the tone synth.
pub struct AudioDirector<B: AudioBackend> {
    primary: B,
    fallback: ToneSynth,
    settings: AudioConfig,
    active_theme: Option<ThemeKey>,
    primary_failures: u32,
}

impl<B: AudioBackend> AudioDirector<B> {
    pub fn new(primary: B, settings: AudioConfig) -> Self {
        Self {
            primary,
            fallback: ToneSynth::new(),
            settings,
            active_theme: None,
            primary_failures: 0,
        }
    }

    fn audible(&self) -> bool {
        self.settings.enabled && self.settings.master_volume > 0.001
    }

    pub fn play(&mut self, cue: AudioCue) {
        if !self.audible() {
            return;
        }
        if !self.primary.play_cue(cue) {
            self.note_failure("cue");
            self.fallback.play_cue(cue);
        }
    }

    /// Switch the ambient theme. Re-selecting the active theme is a no-op.
    pub fn select_theme(&mut self, theme: ThemeKey) {
        if self.active_theme == Some(theme) {
            return;
        }
        self.active_theme = Some(theme);
        if !self.audible() || self.settings.music_volume <= 0.001 {
            return;
        }
        self.primary.stop_theme();
        self.fallback.stop_theme();
        if !self.primary.set_theme(theme) {
            self.note_failure("theme");
            self.fallback.set_theme(theme);
        }
    }

    /// Silence the theme until the next `select_theme`/`resume_theme`.
    pub fn duck_theme(&mut self) {
        self.primary.stop_theme();
        self.fallback.stop_theme();
    }

    /// Restart the last selected theme after a duck.
    pub fn resume_theme(&mut self) {
        if let Some(theme) = self.active_theme.take() {
            self.select_theme(theme);
        }
    }

    /// Step the synthesized theme, if the fallback is carrying it.
    pub fn advance(&mut self, dt: f32) {
        if !self.audible() || self.settings.music_volume <= 0.001 {
            return;
        }
        self.fallback.advance_theme(dt);
    }

    fn note_failure(&mut self, what: &str) {
        self.primary_failures += 1;
        if self.primary_failures == 1 {
            tracing::warn!("Audio backend rejected {what}, using synthesized fallback");
        }
    }

    pub fn active_theme(&self) -> Option<ThemeKey> {
        self.active_theme
    }

    pub fn primary_failures(&self) -> u32 {
        self.primary_failures
    }

    pub fn fallback_mut(&mut self) -> &mut ToneSynth {
        &mut self.fallback
    }

    pub fn primary(&self) -> &B {
        &self.primary
    }
}
