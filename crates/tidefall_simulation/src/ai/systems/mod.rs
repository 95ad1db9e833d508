//! AI systems (decision + movement application)

pub mod decision;
pub mod movement;

// Re-export all systems
pub use decision::*;
pub use movement::*;
