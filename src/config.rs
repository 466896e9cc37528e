use std::path::PathBuf;

use crate::clock::Millis;
use crate::error::{ArcadeError, Result};

pub const DEFAULT_TICK_MS: u64 = 10;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_LOG_FILE: &str = "led-arcade.log";

/// Gameplay timing. Defaults match the arcade-derived values the firmware
/// shipped with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    pub scatter_ms: Millis,
    pub scatter_short_ms: Millis,
    pub chase_ms: Millis,
    pub scared_ms: Millis,
    pub player_step_ms: Millis,
    pub player_energized_step_ms: Millis,
    pub agent_step_ms: Millis,
    pub agent_scared_step_ms: Millis,
    pub agent_returning_step_ms: Millis,
    pub release_idle_ms: Millis,
    pub death_pause_ms: Millis,
    pub level_clear_pause_ms: Millis,
    pub smoke_rest_ms: Millis,
    pub smoke_flush_every: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            scatter_ms: 7000,
            scatter_short_ms: 5000,
            chase_ms: 20000,
            scared_ms: 6000,
            player_step_ms: 150,
            player_energized_step_ms: 135,
            agent_step_ms: 160,
            agent_scared_step_ms: 240,
            agent_returning_step_ms: 135,
            release_idle_ms: 4000,
            death_pause_ms: 1000,
            level_clear_pause_ms: 1000,
            smoke_rest_ms: 2000,
            smoke_flush_every: 4,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("scatter_ms", self.scatter_ms),
            ("scatter_short_ms", self.scatter_short_ms),
            ("chase_ms", self.chase_ms),
            ("scared_ms", self.scared_ms),
            ("player_step_ms", self.player_step_ms),
            ("player_energized_step_ms", self.player_energized_step_ms),
            ("agent_step_ms", self.agent_step_ms),
            ("agent_scared_step_ms", self.agent_scared_step_ms),
            ("agent_returning_step_ms", self.agent_returning_step_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(invalid(name, "duration must be positive"));
            }
        }
        if self.smoke_flush_every == 0 {
            return Err(invalid("smoke_flush_every", "batch size must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub tick_ms: u64,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "must be greater than zero"));
        }
        if self.render_fps == 0 {
            return Err(invalid("fps", "must be greater than zero"));
        }
        if self.log_file.as_os_str().is_empty() {
            return Err(invalid("log_file", "path is empty"));
        }
        self.tuning.validate()
    }
}

fn invalid(name: &'static str, reason: &str) -> ArcadeError {
    ArcadeError::InvalidSetting {
        name,
        reason: reason.to_string(),
    }
}
