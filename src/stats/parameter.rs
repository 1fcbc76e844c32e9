//! A single survivor attribute with a mediated max and change rate

use serde::{Deserialize, Serialize};

use crate::core::config::{MovementRates, ParameterConfig};
use crate::core::types::{MovementState, ParameterKind, QueryKind};
use crate::stats::lookup::StatLookup;
use crate::stats::mediator::StatsMediator;

/// Transition of a parameter's value into or out of zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroCrossing {
    Reached,
    Recovered,
}

#[derive(Debug)]
pub struct Parameter {
    kind: ParameterKind,
    current: f32,
    base_max: f32,
    base_change_rate: f32,
    movement_rates: Option<MovementRates>,
    movement_state: MovementState,
    decreased_health_rate: f32,
    /// Carried load may exceed max; everything else clamps to it
    unbounded: bool,
    pub mediator: StatsMediator<QueryKind>,
}

impl Parameter {
    pub fn new(kind: ParameterKind, current: f32, max: f32, change_rate: f32) -> Self {
        Self {
            kind,
            current: current.max(0.0),
            base_max: max,
            base_change_rate: change_rate,
            movement_rates: None,
            movement_state: MovementState::Idle,
            decreased_health_rate: 0.0,
            unbounded: kind == ParameterKind::Capacity,
            mediator: StatsMediator::new(),
        }
    }

    pub fn from_config(config: &ParameterConfig) -> Self {
        let mut parameter = Self::new(config.kind, config.current, config.max, config.change_rate);
        parameter.movement_rates = config.movement_rates;
        parameter.decreased_health_rate = config.decreased_health_rate;
        parameter
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn base_max(&self) -> f32 {
        self.base_max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// Health lost per game hour while this parameter is empty
    pub fn decreased_health_rate(&self) -> f32 {
        self.decreased_health_rate
    }

    pub fn tracks_movement(&self) -> bool {
        self.movement_rates.is_some()
    }

    pub fn movement_state(&self) -> MovementState {
        self.movement_state
    }

    /// Base change rate before modifiers, for the current movement state
    pub fn base_change_rate(&self) -> f32 {
        match self.movement_rates {
            Some(rates) => rates.rate(self.movement_state),
            None => self.base_change_rate,
        }
    }

    pub fn max(&self, lookup: &dyn StatLookup) -> f32 {
        self.mediator.query(QueryKind::Max, self.base_max, lookup)
    }

    pub fn change_rate(&self, lookup: &dyn StatLookup) -> f32 {
        self.mediator
            .query(QueryKind::ChangeRate, self.base_change_rate(), lookup)
    }

    /// Returns false if this parameter has no per-movement rates
    pub fn set_movement_state(&mut self, state: MovementState) -> bool {
        if self.movement_rates.is_none() {
            return false;
        }
        self.movement_state = state;
        true
    }

    /// Set the value, clamped to `[0, max]` (`>= 0` when unbounded)
    pub fn set_current(&mut self, value: f32, max: f32) -> Option<ZeroCrossing> {
        let was_empty = self.is_empty();
        self.current = if self.unbounded {
            value.max(0.0)
        } else {
            value.clamp(0.0, max.max(0.0))
        };

        match (was_empty, self.is_empty()) {
            (false, true) => Some(ZeroCrossing::Reached),
            (true, false) => Some(ZeroCrossing::Recovered),
            _ => None,
        }
    }

    pub fn add(&mut self, delta: f32, max: f32) -> Option<ZeroCrossing> {
        self.set_current(self.current + delta, max)
    }
}
