use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ON_SCREEN_SECS: f64 = 1.0;
pub const DEFAULT_OFF_SCREEN_SECS: f64 = 0.5;
pub const MIN_PHASE_SECS: f64 = 0.5;
pub const MIN_TOTAL_SECS: u32 = 1;

pub const DEFAULT_BPM: u32 = 120;
pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 300;

/// Beat-driven presentation: one new stimulus per beat, no blank phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetronomeSettings {
    pub enabled: bool,
    pub bpm: u32,
}

impl Default for MetronomeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bpm: DEFAULT_BPM,
        }
    }
}

impl MetronomeSettings {
    pub fn enabled(bpm: u32) -> Self {
        Self { enabled: true, bpm }
    }

    pub fn clamped_bpm(&self) -> u32 {
        self.bpm.clamp(MIN_BPM, MAX_BPM)
    }

    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.clamped_bpm() as f64)
    }
}

/// Timing of one drill. Values are clamped on construction and never
/// change for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseTimingConfig {
    total_secs: u32,
    on_screen_secs: f64,
    off_screen_secs: f64,
    metronome: MetronomeSettings,
}

impl Default for ExerciseTimingConfig {
    fn default() -> Self {
        Self::new(60.0, DEFAULT_ON_SCREEN_SECS, DEFAULT_OFF_SCREEN_SECS)
    }
}

/// Unset or invalid phase lengths fall back to `default`; anything shorter
/// than `MIN_PHASE_SECS` is raised to it
fn clamp_phase(secs: f64, default: f64) -> f64 {
    if !secs.is_finite() || secs <= 0.0 {
        default
    } else {
        secs.max(MIN_PHASE_SECS)
    }
}

fn clamp_total(secs: f64) -> u32 {
    if !secs.is_finite() || secs < MIN_TOTAL_SECS as f64 {
        MIN_TOTAL_SECS
    } else {
        secs.ceil().min(u32::MAX as f64) as u32
    }
}

impl ExerciseTimingConfig {
    pub fn new(total_secs: f64, on_screen_secs: f64, off_screen_secs: f64) -> Self {
        Self {
            total_secs: clamp_total(total_secs),
            on_screen_secs: clamp_phase(on_screen_secs, DEFAULT_ON_SCREEN_SECS),
            off_screen_secs: clamp_phase(off_screen_secs, DEFAULT_OFF_SCREEN_SECS),
            metronome: MetronomeSettings::default(),
        }
    }

    pub fn with_metronome(mut self, metronome: MetronomeSettings) -> Self {
        self.metronome = metronome;
        self
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn on_screen_secs(&self) -> f64 {
        self.on_screen_secs
    }

    pub fn off_screen_secs(&self) -> f64 {
        self.off_screen_secs
    }

    pub fn metronome(&self) -> MetronomeSettings {
        self.metronome
    }

    pub fn is_metronome(&self) -> bool {
        self.metronome.enabled
    }

    /// How long a stimulus stays up
    pub fn on_screen(&self) -> Duration {
        if self.metronome.enabled {
            self.metronome.beat_interval()
        } else {
            Duration::from_secs_f64(self.on_screen_secs)
        }
    }

    /// How long the blank screen stays up; zero in metronome mode
    pub fn off_screen(&self) -> Duration {
        if self.metronome.enabled {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.off_screen_secs)
        }
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs as u64)
    }
}
