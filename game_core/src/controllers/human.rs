use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::controller::{Controller, Observation, Transition};
use crate::error::ControllerError;
use crate::Action;

/// Shared key state; the input layer sets it, the controller reads it each tick
#[derive(Debug, Clone, Default)]
pub struct HumanInput {
    up: Arc<AtomicBool>,
    down: Arc<AtomicBool>,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_up(&self, pressed: bool) {
        self.up.store(pressed, Ordering::Relaxed);
    }

    pub fn set_down(&self, pressed: bool) {
        self.down.store(pressed, Ordering::Relaxed);
    }

    pub fn release_all(&self) {
        self.set_up(false);
        self.set_down(false);
    }

    /// Up wins when both keys are held
    pub fn action(&self) -> Action {
        if self.up.load(Ordering::Relaxed) {
            Action::Up
        } else if self.down.load(Ordering::Relaxed) {
            Action::Down
        } else {
            Action::Hold
        }
    }
}

/// Paddle driven by a person
#[derive(Debug, Clone)]
pub struct HumanController {
    input: HumanInput,
    last_reward: f32,
}

impl HumanController {
    pub const KIND: &'static str = "human";

    pub fn new(input: HumanInput) -> Self {
        Self {
            input,
            last_reward: 0.0,
        }
    }

    /// Rebuild from a save, bound to a live input handle
    pub fn restore(bytes: &[u8], input: HumanInput) -> Result<Self, ControllerError> {
        let last_reward = postcard::from_bytes(bytes).map_err(ControllerError::Decode)?;
        Ok(Self { input, last_reward })
    }

    pub fn input(&self) -> &HumanInput {
        &self.input
    }

    pub fn last_reward(&self) -> f32 {
        self.last_reward
    }
}

impl Controller for HumanController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn select_action(&mut self, _state: &Observation) -> Option<u8> {
        Some(self.input.action().as_u8())
    }

    fn observe_transition(&mut self, transition: &Transition) {
        self.last_reward = transition.reward;
    }

    fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
        postcard::to_allocvec(&self.last_reward).map_err(ControllerError::Encode)
    }
}
