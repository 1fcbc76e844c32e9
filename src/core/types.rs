//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Survivor attribute tracked by a [`crate::stats::Parameter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Health,
    Stamina,
    Energy,
    Food,
    Water,
    /// Carried load (current) against the load the survivor can bear (max)
    Capacity,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 6] = [
        ParameterKind::Health,
        ParameterKind::Stamina,
        ParameterKind::Energy,
        ParameterKind::Food,
        ParameterKind::Water,
        ParameterKind::Capacity,
    ];
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Health => "health",
            ParameterKind::Stamina => "stamina",
            ParameterKind::Energy => "energy",
            ParameterKind::Food => "food",
            ParameterKind::Water => "water",
            ParameterKind::Capacity => "capacity",
        };
        f.write_str(name)
    }
}

/// Condition tag for queries against a parameter's mediator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    /// Effective maximum value
    Max,
    /// Effective change per game hour
    ChangeRate,
}

/// Condition tag for queries against the movement speed mediator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GaitMode {
    #[default]
    Walk,
    Run,
}

/// What the survivor's body is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Running,
    Jumping,
}

impl MovementState {
    pub fn from_gait(gait: GaitMode) -> Self {
        match gait {
            GaitMode::Walk => MovementState::Walking,
            GaitMode::Run => MovementState::Running,
        }
    }
}

/// Named load boundaries, expressed as fractions of the effective max Capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeightClass {
    Normal,
    Critical,
    Ultimate,
    Overload,
}

/// Handle to a modifier inside a [`crate::stats::StatsMediator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModifierId(pub u64);

/// Handle to a pending process inside a [`crate::time::ProcessScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

/// Handle returned by [`crate::events::Signal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);
