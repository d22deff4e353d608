use serde::{Deserialize, Serialize};

use crate::controller::{obs, Controller, Observation, Transition};
use crate::error::ControllerError;
use crate::params::Params;
use crate::Action;

/// Bot that keeps its paddle center level with the ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedController {
    /// Paddle height as a fraction of field height
    pub paddle_height_ratio: f32,
    /// Offset (fraction of field height) tolerated before moving
    pub dead_zone: f32,
}

impl ScriptedController {
    pub const KIND: &'static str = "scripted";

    pub fn new() -> Self {
        Self {
            paddle_height_ratio: Params::PADDLE_HEIGHT_RATIO,
            dead_zone: 0.02,
        }
    }

    pub fn restore(bytes: &[u8]) -> Result<Self, ControllerError> {
        postcard::from_bytes(bytes).map_err(ControllerError::Decode)
    }
}

impl Default for ScriptedController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ScriptedController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn select_action(&mut self, state: &Observation) -> Option<u8> {
        let own_center = state[obs::OWN_Y] + self.paddle_height_ratio / 2.0;
        let diff = state[obs::BALL_Y] - own_center;

        // y grows downward
        let action = if diff > self.dead_zone {
            Action::Down
        } else if diff < -self.dead_zone {
            Action::Up
        } else {
            Action::Hold
        };
        Some(action.as_u8())
    }

    fn observe_transition(&mut self, _transition: &Transition) {}

    fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
        postcard::to_allocvec(self).map_err(ControllerError::Encode)
    }
}
