use rand::Rng;

use crate::controller::{Controller, Observation, Transition};
use crate::error::ControllerError;
use crate::resources::GameRng;

/// Picks uniformly among hold/up/down
#[derive(Debug, Clone)]
pub struct RandomController {
    rng: GameRng,
}

impl RandomController {
    pub const KIND: &'static str = "random";

    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }

    pub fn restore(bytes: &[u8]) -> Result<Self, ControllerError> {
        let state: proto::RngState = postcard::from_bytes(bytes).map_err(ControllerError::Decode)?;
        Ok(Self {
            rng: GameRng::from_state(&state),
        })
    }
}

impl Controller for RandomController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn select_action(&mut self, _state: &Observation) -> Option<u8> {
        Some(self.rng.0.gen_range(0..3))
    }

    fn observe_transition(&mut self, _transition: &Transition) {}

    fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
        postcard::to_allocvec(&self.rng.to_state()).map_err(ControllerError::Encode)
    }
}
