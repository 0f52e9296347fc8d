//! Game modes: Easy and Normal, plus the session countdown

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Available game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Easy, // 6x6 board
    #[default]
    Normal, // 8x8 board
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Easy => "Easy",
            GameMode::Normal => "Normal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Easy => "Small 6x6 board",
            GameMode::Normal => "Full 8x8 board",
        }
    }

    pub fn all() -> &'static [GameMode] {
        &[GameMode::Easy, GameMode::Normal]
    }
}

/// Per-mode parameters, supplied by settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    /// Board side length
    pub grid_size: usize,
    /// Length of a session
    pub game_time_seconds: u64,
    /// Score needed for the session to count as cleared
    pub clear_score_threshold: u64,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            grid_size: 8,
            game_time_seconds: 60,
            clear_score_threshold: 4000,
        }
    }
}

impl ModeSettings {
    pub fn easy() -> Self {
        Self {
            grid_size: 6,
            ..Self::default()
        }
    }
}

/// Mode-specific session state: the countdown
#[derive(Debug, Clone)]
pub struct ModeState {
    pub mode: GameMode,
    pub elapsed: Duration,
    pub time_limit: Duration,
    pub clear_score_threshold: u64,
}

impl ModeState {
    pub fn new(mode: GameMode, settings: &ModeSettings) -> Self {
        Self {
            mode,
            elapsed: Duration::ZERO,
            time_limit: Duration::from_secs(settings.game_time_seconds),
            clear_score_threshold: settings.clear_score_threshold,
        }
    }

    /// Advance the clock
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.time_limit);
    }

    /// Check if the session's time is up
    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.time_limit
    }

    pub fn time_remaining(&self) -> Duration {
        self.time_limit.saturating_sub(self.elapsed)
    }

    /// Whether a final score counts as a clear for this mode
    pub fn is_cleared(&self, score: u64) -> bool {
        score >= self.clear_score_threshold
    }

    /// Format remaining time as MM:SS
    pub fn format_remaining(&self) -> String {
        let total_secs = self.time_remaining().as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}
