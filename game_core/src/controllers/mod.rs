//! Built-in controllers

pub mod human;
pub mod learning;
pub mod random;
pub mod scripted;

pub use human::*;
pub use learning::*;
pub use random::*;
pub use scripted::*;
