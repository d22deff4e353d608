//! Controller capability interface
//!
//! Anything that drives a paddle (a learning agent, a scripted bot, a human at
//! the keyboard) implements [`Controller`]. The simulation only ever talks to
//! this trait: it asks for an action, reports the resulting transition, and
//! pokes the optional hooks, which default to no-ops.

use std::collections::HashMap;

use crate::error::ControllerError;
use crate::params::Params;

/// Normalized state vector handed to a controller each tick.
///
/// Layout: `[own_y, opponent_y, ball_x, ball_y, ball_dx, ball_dy, predicted_x,
/// predicted_y, ticks_since_hit, difficulty, own_last_hit]`.
pub type Observation = [f32; Params::OBSERVATION_LEN];

/// Index of each observation slot
pub mod obs {
    pub const OWN_Y: usize = 0;
    pub const OPPONENT_Y: usize = 1;
    pub const BALL_X: usize = 2;
    pub const BALL_Y: usize = 3;
    pub const BALL_DX: usize = 4;
    pub const BALL_DY: usize = 5;
    pub const PREDICTED_X: usize = 6;
    pub const PREDICTED_Y: usize = 7;
    pub const TICKS_SINCE_HIT: usize = 8;
    pub const DIFFICULTY: usize = 9;
    pub const OWN_LAST_HIT: usize = 10;
}

/// One step of experience, delivered after the tick resolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: Observation,
    /// Action that was actually applied (invalid requests become `0`)
    pub action: u8,
    pub reward: f32,
    pub next_state: Observation,
}

pub trait Controller {
    /// Registry tag used to restore this controller from a save
    fn kind(&self) -> &'static str;

    /// Pick an action: 0 = hold, 1 = up, 2 = down. Anything else, or `None`, holds.
    fn select_action(&mut self, state: &Observation) -> Option<u8>;

    fn observe_transition(&mut self, transition: &Transition);

    /// Opaque state blob for session saves
    fn save_state(&self) -> Result<Vec<u8>, ControllerError>;

    /// Called when this side's paddle hits the ball
    fn notify_rebound(&mut self) {}

    /// Called when this side concedes a point
    fn reset_rebound_streak(&mut self) {}

    /// Internal values for display (e.g. per-action values), if any
    fn introspect(&self, _state: &Observation) -> Option<Vec<f32>> {
        None
    }

    /// Fraction of training completed, in `[0, 1]`
    fn learning_progress(&self) -> f32 {
        1.0
    }

    fn confidence(&self) -> f32 {
        1.0
    }

    /// Learned parameters that can be copied into another controller of the same kind
    fn parameters(&self) -> Option<Vec<u8>> {
        None
    }

    fn load_parameters(&mut self, _params: &[u8]) -> Result<(), ControllerError> {
        Err(ControllerError::IncompatibleParameters {
            kind: self.kind(),
            reason: "controller has no learned parameters".to_string(),
        })
    }
}

type RestoreFn = Box<dyn Fn(&[u8]) -> Result<Box<dyn Controller>, ControllerError>>;

/// Maps controller kinds to functions that rebuild them from saved state
pub struct ControllerRegistry {
    factories: HashMap<String, RestoreFn>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry that can restore every built-in controller
    pub fn with_builtins() -> Self {
        use crate::controllers::*;

        let mut registry = Self::new();
        registry.register(LearningController::KIND, |bytes| {
            Ok(Box::new(LearningController::restore(bytes)?))
        });
        registry.register(ScriptedController::KIND, |bytes| {
            Ok(Box::new(ScriptedController::restore(bytes)?))
        });
        registry.register(RandomController::KIND, |bytes| {
            Ok(Box::new(RandomController::restore(bytes)?))
        });
        registry.register(HumanController::KIND, |bytes| {
            Ok(Box::new(HumanController::restore(bytes, HumanInput::new())?))
        });
        registry
    }

    /// Add or replace the factory for `kind`
    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&[u8]) -> Result<Box<dyn Controller>, ControllerError> + 'static,
    {
        self.factories.insert(kind.to_string(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// `None` when no factory is registered for `kind`
    pub fn restore(
        &self,
        kind: &str,
        bytes: &[u8],
    ) -> Option<Result<Box<dyn Controller>, ControllerError>> {
        self.factories.get(kind).map(|factory| factory(bytes))
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
