//! JSON settings file
//!
//! Accepts the same keys the desktop settings screen writes. Only the game
//! keys are read; anything else in the file (visual or UI options) is ignored.

use std::path::Path;

use game_core::Config;
use serde::{Deserialize, Serialize};

use crate::TrainerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ball_speed: f32,
    pub paddle_speed: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            ball_speed: config.ball_speed,
            paddle_speed: config.paddle_speed,
            width: None,
            height: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, TrainerError> {
        let json = std::fs::read_to_string(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| TrainerError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay these settings onto `config`
    pub fn apply(&self, config: Config) -> Config {
        Config {
            ball_speed: self.ball_speed,
            paddle_speed: self.paddle_speed,
            width: self.width.unwrap_or(config.width),
            height: self.height.unwrap_or(config.height),
            ..config
        }
    }
}
