//! The survivor's full set of parameters

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ParameterTable;
use crate::core::error::{Result, SurvivalError};
use crate::core::types::ParameterKind;
use crate::stats::lookup::StatLookup;
use crate::stats::parameter::{Parameter, ZeroCrossing};

/// Change in a parameter that other systems react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterEvent {
    ReachedZero(ParameterKind),
    RecoveredFromZero(ParameterKind),
    /// Carried Capacity was changed from outside
    LoadChanged { carried: f32 },
}

impl ParameterEvent {
    fn from_crossing(kind: ParameterKind, crossing: ZeroCrossing) -> Self {
        match crossing {
            ZeroCrossing::Reached => ParameterEvent::ReachedZero(kind),
            ZeroCrossing::Recovered => ParameterEvent::RecoveredFromZero(kind),
        }
    }
}

#[derive(Debug, Default)]
pub struct Vitals {
    parameters: AHashMap<ParameterKind, Parameter>,
}

impl Vitals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(table: &ParameterTable) -> Self {
        let mut vitals = Self::new();
        for config in table.iter() {
            vitals.insert(Parameter::from_config(config));
        }
        vitals
    }

    pub fn insert(&mut self, parameter: Parameter) {
        self.parameters.insert(parameter.kind(), parameter);
    }

    pub fn contains(&self, kind: ParameterKind) -> bool {
        self.parameters.contains_key(&kind)
    }

    pub fn get(&self, kind: ParameterKind) -> Result<&Parameter> {
        self.parameters
            .get(&kind)
            .ok_or(SurvivalError::UnknownParameter(kind))
    }

    pub fn get_mut(&mut self, kind: ParameterKind) -> Result<&mut Parameter> {
        self.parameters
            .get_mut(&kind)
            .ok_or(SurvivalError::UnknownParameter(kind))
    }

    /// Parameters in a stable order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        ParameterKind::ALL
            .into_iter()
            .filter_map(move |kind| self.parameters.get(&kind))
    }

    pub fn change_rate(&self, kind: ParameterKind) -> Result<f32> {
        Ok(self.get(kind)?.change_rate(self))
    }

    /// Total modifiers installed across every parameter
    pub fn modifier_count(&self) -> usize {
        self.parameters.values().map(|p| p.mediator.len()).sum()
    }

    /// Advance every parameter by `delta_hours` of game time
    ///
    /// Rates and maxima are evaluated for all parameters before any value
    /// moves, so the order parameters are visited in does not matter.
    pub fn update(&mut self, delta_hours: f32) -> Vec<ParameterEvent> {
        let plan: Vec<(ParameterKind, f32, f32)> = self
            .iter()
            .map(|p| (p.kind(), p.change_rate(self), p.max(self)))
            .collect();

        let mut events = Vec::new();
        for (kind, rate, max) in plan {
            let Some(parameter) = self.parameters.get_mut(&kind) else {
                continue;
            };
            parameter.mediator.update_modifiers(delta_hours);
            let before = parameter.current();
            let crossing = parameter.add(rate * delta_hours, max);
            let after = parameter.current();
            events.extend(Self::events_for(parameter, crossing, before != after));
        }
        events
    }

    /// Carried load reports `LoadChanged` only; its zero crossings are not exhaustion
    fn events_for(
        parameter: &Parameter,
        crossing: Option<ZeroCrossing>,
        moved: bool,
    ) -> Vec<ParameterEvent> {
        let kind = parameter.kind();
        if parameter.is_unbounded() {
            return match (kind, moved) {
                (ParameterKind::Capacity, true) => vec![ParameterEvent::LoadChanged {
                    carried: parameter.current(),
                }],
                _ => Vec::new(),
            };
        }
        crossing
            .map(|crossing| ParameterEvent::from_crossing(kind, crossing))
            .into_iter()
            .collect()
    }

    /// Add `delta` to a parameter's current value
    pub fn adjust(&mut self, kind: ParameterKind, delta: f32) -> Result<Vec<ParameterEvent>> {
        let current = self.get(kind)?.current();
        self.set(kind, current + delta)
    }

    /// Overwrite a parameter's current value (clamped as the parameter requires)
    pub fn set(&mut self, kind: ParameterKind, value: f32) -> Result<Vec<ParameterEvent>> {
        let max = self.get(kind)?.max(self);
        let parameter = self.get_mut(kind)?;
        let crossing = parameter.set_current(value, max);
        Ok(Self::events_for(parameter, crossing, true))
    }
}

impl StatLookup for Vitals {
    fn current(&self, kind: ParameterKind) -> f32 {
        self.parameters
            .get(&kind)
            .map(Parameter::current)
            .unwrap_or(0.0)
    }

    fn max(&self, kind: ParameterKind) -> f32 {
        self.parameters
            .get(&kind)
            .map(|p| p.max(self))
            .unwrap_or(0.0)
    }
}
