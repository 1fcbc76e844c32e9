//! Systems that wire parameters and movement together through modifiers

pub mod movement;
pub mod stat_modifiers;

pub use movement::{MovementController, MovementEvent, MovementSystem};
pub use stat_modifiers::StatModifierSystem;
