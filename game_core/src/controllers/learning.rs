//! Tabular Q-learning controller
//!
//! The observation is discretized into a small key (where the ball is headed
//! relative to the paddle, where it is now, how far across the field, which
//! way it travels) and action values are learned per key with one-step
//! Q-learning under an ε-greedy policy.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::controller::{obs, Controller, Observation, Transition};
use crate::error::ControllerError;
use crate::params::Params;
use crate::resources::GameRng;

/// Learning hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Step size α
    pub learning_rate: f32,
    /// Discount γ
    pub discount: f32,
    pub epsilon_start: f32,
    pub epsilon_min: f32,
    /// Multiplied into ε after every observed transition
    pub epsilon_decay: f32,
    /// Horizontal buckets for the ball position
    pub x_buckets: u8,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.9995,
            x_buckets: 8,
        }
    }
}

/// (predicted offset, current offset, ball x bucket, ball direction)
pub type StateKey = (i8, i8, u8, i8);

/// Action values per discretized state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable(BTreeMap<StateKey, [f32; 3]>);

impl QTable {
    pub fn values(&self, key: &StateKey) -> [f32; 3] {
        self.0.get(key).copied().unwrap_or_default()
    }

    fn values_mut(&mut self, key: StateKey) -> &mut [f32; 3] {
        self.0.entry(key).or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct SavedLearning {
    config: LearningConfig,
    table: QTable,
    epsilon: f32,
    steps: u64,
    rebounds: u32,
    best_rebounds: u32,
    rng: proto::RngState,
}

/// ε-greedy tabular Q-learning agent
#[derive(Debug, Clone)]
pub struct LearningController {
    config: LearningConfig,
    table: QTable,
    epsilon: f32,
    steps: u64,
    rebounds: u32,
    best_rebounds: u32,
    last_values: Option<[f32; 3]>,
    rng: GameRng,
}

impl LearningController {
    pub const KIND: &'static str = "learning";

    pub fn new(seed: u64) -> Self {
        Self::with_config(LearningConfig::default(), seed)
    }

    pub fn with_config(config: LearningConfig, seed: u64) -> Self {
        Self {
            config,
            table: QTable::default(),
            epsilon: config.epsilon_start,
            steps: 0,
            rebounds: 0,
            best_rebounds: 0,
            last_values: None,
            rng: GameRng::new(seed),
        }
    }

    pub fn restore(bytes: &[u8]) -> Result<Self, ControllerError> {
        let saved: SavedLearning = postcard::from_bytes(bytes).map_err(ControllerError::Decode)?;
        Ok(Self {
            config: saved.config,
            table: saved.table,
            epsilon: saved.epsilon,
            steps: saved.steps,
            rebounds: saved.rebounds,
            best_rebounds: saved.best_rebounds,
            last_values: None,
            rng: GameRng::from_state(&saved.rng),
        })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Current run of hits without conceding
    pub fn rebounds(&self) -> u32 {
        self.rebounds
    }

    pub fn best_rebounds(&self) -> u32 {
        self.best_rebounds
    }

    pub fn discretize(&self, state: &Observation) -> StateKey {
        let own_center = state[obs::OWN_Y] + Params::PADDLE_HEIGHT_RATIO / 2.0;
        let predicted = state[obs::PREDICTED_Y].clamp(-0.5, 1.5);
        let buckets = self.config.x_buckets.max(1);
        let x_bucket = (state[obs::BALL_X] * buckets as f32)
            .floor()
            .clamp(0.0, (buckets - 1) as f32) as u8;
        let direction = if state[obs::BALL_DX] > 0.0 {
            1
        } else if state[obs::BALL_DX] < 0.0 {
            -1
        } else {
            0
        };

        (
            offset_bucket(predicted - own_center),
            offset_bucket(state[obs::BALL_Y] - own_center),
            x_bucket,
            direction,
        )
    }
}

/// Signed bucket of a vertical offset (fraction of field height), in -3..=3
fn offset_bucket(offset: f32) -> i8 {
    const EDGES: [f32; 3] = [0.03, 0.1, 0.3];
    let magnitude = EDGES.iter().filter(|edge| offset.abs() > **edge).count() as i8;
    if offset < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Index of the largest value, lowest index on ties
fn argmax(values: &[f32; 3]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

impl Controller for LearningController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn select_action(&mut self, state: &Observation) -> Option<u8> {
        let key = self.discretize(state);
        let values = self.table.values(&key);
        self.last_values = Some(values);

        let action = if self.rng.0.gen::<f32>() < self.epsilon {
            self.rng.0.gen_range(0..3)
        } else {
            argmax(&values)
        };
        Some(action as u8)
    }

    fn observe_transition(&mut self, transition: &Transition) {
        let action = usize::from(transition.action.min(2));
        let key = self.discretize(&transition.state);
        let next_key = self.discretize(&transition.next_state);

        let next_best = self
            .table
            .values(&next_key)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let target = transition.reward + self.config.discount * next_best;

        let values = self.table.values_mut(key);
        values[action] += self.config.learning_rate * (target - values[action]);

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.steps += 1;
    }

    fn save_state(&self) -> Result<Vec<u8>, ControllerError> {
        let saved = SavedLearning {
            config: self.config,
            table: self.table.clone(),
            epsilon: self.epsilon,
            steps: self.steps,
            rebounds: self.rebounds,
            best_rebounds: self.best_rebounds,
            rng: self.rng.to_state(),
        };
        postcard::to_allocvec(&saved).map_err(ControllerError::Encode)
    }

    fn notify_rebound(&mut self) {
        self.rebounds += 1;
        self.best_rebounds = self.best_rebounds.max(self.rebounds);
    }

    fn reset_rebound_streak(&mut self) {
        self.rebounds = 0;
    }

    fn introspect(&self, state: &Observation) -> Option<Vec<f32>> {
        Some(self.table.values(&self.discretize(state)).to_vec())
    }

    fn learning_progress(&self) -> f32 {
        let span = self.config.epsilon_start - self.config.epsilon_min;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.config.epsilon_start - self.epsilon) / span).clamp(0.0, 1.0)
    }

    /// Softmax probability of the greedy action for the last state seen
    fn confidence(&self) -> f32 {
        let Some(values) = self.last_values else {
            return 1.0 / 3.0;
        };
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let sum: f32 = values.iter().map(|v| (v - max).exp()).sum();
        1.0 / sum
    }

    fn parameters(&self) -> Option<Vec<u8>> {
        postcard::to_allocvec(&self.table).ok()
    }

    fn load_parameters(&mut self, params: &[u8]) -> Result<(), ControllerError> {
        self.table = postcard::from_bytes(params).map_err(ControllerError::Decode)?;
        Ok(())
    }
}
