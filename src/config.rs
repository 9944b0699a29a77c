use crate::program::{ColorName, Difficulty, Letter, Shape, StimulusPool, MAX_NUMBER, MIN_NUMBER};
use crate::strategy::ExerciseType;
use crate::timing::{
    ExerciseTimingConfig, MetronomeSettings, DEFAULT_OFF_SCREEN_SECS, DEFAULT_ON_SCREEN_SECS,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_EXERCISE_SECS: u32 = 60;
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// Persisted drill settings. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub exercise_type: ExerciseType,
    pub difficulty: Difficulty,
    pub exercise_secs: u32,
    pub on_screen_secs: f64,
    pub off_screen_secs: f64,
    pub metronome: MetronomeSettings,
    pub countdown_secs: u32,
    pub shapes: Vec<Shape>,
    pub colors: Vec<ColorName>,
    pub letters: Vec<Letter>,
    pub numbers: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise_type: ExerciseType::default(),
            difficulty: Difficulty::default(),
            exercise_secs: DEFAULT_EXERCISE_SECS,
            on_screen_secs: DEFAULT_ON_SCREEN_SECS,
            off_screen_secs: DEFAULT_OFF_SCREEN_SECS,
            metronome: MetronomeSettings::default(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            shapes: Shape::ALL.to_vec(),
            colors: ColorName::ALL.to_vec(),
            letters: Vec::new(),
            numbers: Vec::new(),
        }
    }
}

impl Config {
    pub fn timing(&self) -> ExerciseTimingConfig {
        ExerciseTimingConfig::new(
            self.exercise_secs as f64,
            self.on_screen_secs,
            self.off_screen_secs,
        )
        .with_metronome(self.metronome)
    }

    /// Pool of values to draw from; numbers outside the catalog are dropped
    pub fn pool(&self) -> StimulusPool {
        StimulusPool {
            shapes: self.shapes.clone(),
            colors: self.colors.iter().map(ColorName::option).collect(),
            letters: self.letters.clone(),
            numbers: self
                .numbers
                .iter()
                .copied()
                .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
                .collect(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::error::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "flashdrill") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("flashdrill_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable config: {e}");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            exercise_type: ExerciseType::ShapeCount,
            difficulty: Difficulty::Advanced,
            exercise_secs: 90,
            on_screen_secs: 2.5,
            off_screen_secs: 1.0,
            metronome: MetronomeSettings::enabled(90),
            countdown_secs: 0,
            shapes: vec![Shape::Circle],
            colors: vec![ColorName::Red, ColorName::Blue],
            letters: Letter::parse_list("XYZ"),
            numbers: vec![3, 7],
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn garbage_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"exercise_type":"math-only","exercise_secs":30}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.exercise_type, ExerciseType::MathOnly);
        assert_eq!(cfg.exercise_secs, 30);
        assert_eq!(cfg.countdown_secs, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(cfg.shapes, Shape::ALL.to_vec());
    }

    #[test]
    fn timing_is_clamped() {
        let cfg = Config {
            exercise_secs: 0,
            on_screen_secs: 0.1,
            off_screen_secs: -3.0,
            ..Default::default()
        };
        let timing = cfg.timing();
        assert_eq!(timing.total_secs(), 1);
        assert_eq!(timing.on_screen(), Duration::from_millis(500));
        assert_eq!(timing.off_screen(), Duration::from_millis(500));
    }

    #[test]
    fn pool_maps_colors_and_drops_bad_numbers() {
        let cfg = Config {
            shapes: vec![],
            colors: vec![ColorName::Yellow],
            numbers: vec![0, 4, 11, 10],
            ..Default::default()
        };
        let pool = cfg.pool();
        assert!(pool.shapes.is_empty());
        assert_eq!(pool.colors[0].hexcode, "#FFFF00");
        assert_eq!(pool.numbers, vec![4, 10]);
    }
}
