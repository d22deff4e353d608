//! Headless training driver for the paddle simulation

pub mod env;
pub mod saves;
pub mod session;
pub mod settings;


use std::path::PathBuf;

use game_core::{Controller, LearningController, RandomController, ScriptedController, SessionError};
use thiserror::Error;

pub use env::{Environment, SystemEnv};
pub use saves::SaveStore;
pub use session::{Summary, TrainingOptions, TrainingSession};
pub use settings::Settings;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] game_core::ConfigError),

    #[error("save generation {0} is the last one that can be numbered")]
    GenerationOverflow(u32),
}

/// Controllers selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ControllerChoice {
    Learning,
    Scripted,
    Random,
}

impl ControllerChoice {
    pub fn build(self, seed: u64) -> Box<dyn Controller> {
        match self {
            ControllerChoice::Learning => Box::new(LearningController::new(seed)),
            ControllerChoice::Scripted => Box::new(ScriptedController::new()),
            ControllerChoice::Random => Box::new(RandomController::new(seed)),
        }
    }
}
