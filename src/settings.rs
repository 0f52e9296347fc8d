//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/matchrs/settings.toml (or platform equivalent).
//! A missing file means defaults; a file that does not parse, or describes an
//! unusable rule set, is a configuration error and stops the engine from starting.

use crate::board::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{EngineError, Result};
use crate::mode::{GameMode, ModeSettings};
use crate::piece::DEFAULT_SYMBOLS;
use crate::score::{
    DEFAULT_COMBO_BONUS_MULTIPLIER, DEFAULT_LEVEL_UP_EXP_BASE, MAX_COMBO_BONUS_MULTIPLIER,
};
use crate::special::{standard_rules, RuleSet, SpecialRule};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board generation and resolution limits
    pub engine: EngineSettings,
    /// Point and level formula parameters
    pub scoring: ScoringSettings,
    /// Per-mode board size, timer and clear threshold
    pub modes: ModeTable,
    /// Special piece rules; order in the file does not matter
    pub rules: Vec<SpecialRule>,
}

/// Board generation and resolution limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of distinct piece symbols
    pub symbols: u8,
    /// Attempts at generating a starting board without matches
    pub init_retry_limit: u32,
    /// Cascade passes allowed in one resolution before it is cut short
    pub max_cascade_passes: u32,
}

/// Point and level formula parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Bonus fraction per combo step
    pub combo_bonus_multiplier: f64,
    /// Experience per level, multiplied by the level
    pub level_up_exp_base: u32,
}

/// Parameters for each mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeTable {
    pub easy: ModeSettings,
    pub normal: ModeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            scoring: ScoringSettings::default(),
            modes: ModeTable::default(),
            rules: standard_rules(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS,
            init_retry_limit: 500,
            max_cascade_passes: 100,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            combo_bonus_multiplier: DEFAULT_COMBO_BONUS_MULTIPLIER,
            level_up_exp_base: DEFAULT_LEVEL_UP_EXP_BASE,
        }
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self {
            easy: ModeSettings::easy(),
            normal: ModeSettings::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "matchrs", "matchrs").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the default location, or defaults if there is no file
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map_err(|e| match e {
                EngineError::Configuration(msg) => {
                    EngineError::Configuration(format!("{}: {}", path.display(), msg))
                }
                other => other,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(EngineError::Configuration(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).map_err(|e| EngineError::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let Some(path) = Self::settings_path() else {
            return Err(EngineError::Storage(
                "could not determine config directory".to_string(),
            ));
        };
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| EngineError::Storage(format!("failed to create config dir: {}", e)))?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| EngineError::Storage(format!("failed to serialize: {}", e)))?;

        fs::write(path, contents)
            .map_err(|e| EngineError::Storage(format!("failed to write settings: {}", e)))
    }

    /// Parameters of one mode
    pub fn mode(&self, mode: GameMode) -> &ModeSettings {
        match mode {
            GameMode::Easy => &self.modes.easy,
            GameMode::Normal => &self.modes.normal,
        }
    }

    /// Check every value and build the rule set
    pub fn validate(&self) -> Result<RuleSet> {
        let engine = &self.engine;
        if !(3..=26).contains(&engine.symbols) {
            return Err(EngineError::Configuration(format!(
                "symbols must be between 3 and 26, got {}",
                engine.symbols
            )));
        }
        if engine.max_cascade_passes == 0 {
            return Err(EngineError::Configuration(
                "max_cascade_passes must be at least 1".to_string(),
            ));
        }
        let multiplier = self.scoring.combo_bonus_multiplier;
        if !(0.0..=MAX_COMBO_BONUS_MULTIPLIER).contains(&multiplier) {
            return Err(EngineError::Configuration(format!(
                "combo_bonus_multiplier must be between 0 and {}, got {}",
                MAX_COMBO_BONUS_MULTIPLIER, multiplier
            )));
        }
        for &mode in GameMode::all() {
            let size = self.mode(mode).grid_size;
            if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
                return Err(EngineError::Configuration(format!(
                    "{} grid_size must be between {} and {}, got {}",
                    mode.name(),
                    MIN_BOARD_SIZE,
                    MAX_BOARD_SIZE,
                    size
                )));
            }
        }
        RuleSet::new(self.rules.clone())
    }
}
