pub mod collision;
pub mod difficulty;
pub mod input;
pub mod movement;
pub mod observation;
pub mod reward;
pub mod scoring;

pub use collision::*;
pub use difficulty::*;
pub use input::*;
pub use movement::*;
pub use observation::*;
pub use reward::*;
pub use scoring::*;
