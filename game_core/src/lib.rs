//! Deterministic two-paddle ball game used as a reinforcement-learning
//! environment. Build a [`Simulation`] with two [`Controller`]s and call
//! [`Simulation::tick`].

pub mod components;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod error;
pub mod field;
pub mod params;
pub mod resources;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::*;
pub use controller::*;
pub use controllers::*;
pub use error::*;
pub use field::*;
pub use params::*;
pub use resources::*;
pub use simulation::*;
pub use systems::{RewardLedger, RewardTerms};
