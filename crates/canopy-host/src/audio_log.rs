use canopy_core::audio::{AudioBackend, AudioCue, ThemeKey};

/// Stands in for a real playback device. When unavailable every request is
/// rejected so the director exercises its synthesized fallback.
#[derive(Debug, Default)]
pub struct LogBackend {
    available: bool,
    pub cues_played: u32,
}

impl LogBackend {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            cues_played: 0,
        }
    }
}

impl AudioBackend for LogBackend {
    fn play_cue(&mut self, cue: AudioCue) -> bool {
        if !self.available {
            return false;
        }
        self.cues_played += 1;
        tracing::trace!(?cue, "cue");
        true
    }

    fn set_theme(&mut self, theme: ThemeKey) -> bool {
        if self.available {
            tracing::debug!(?theme, "Theme selected");
        }
        self.available
    }

    fn stop_theme(&mut self) {}
}
