//! Survival Core - stat modifiers, game clock and process scheduling

pub mod core;
pub mod events;
pub mod simulation;
pub mod stats;
pub mod systems;
pub mod time;
