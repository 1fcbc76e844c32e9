//! Cross-attribute coupling between survivor parameters
//!
//! - Low Energy shrinks max Capacity
//! - Carried load slows Stamina, Food and Water recovery and speeds their drain
//! - Any parameter with a decreased-health rate damages Health while empty

use ahash::AHashMap;
use tracing::{debug, info};

use crate::core::config::{
    EncumbranceConfig, EnergyConfig, LoadConfig, ScaleRange, SurvivalConfig,
};
use crate::core::error::{Result, SurvivalError};
use crate::core::types::{ModifierId, ParameterKind, QueryKind, WeightClass};
use crate::stats::capacity::{calculate_capacity_scale, remap_clamped};
use crate::stats::{ParameterEvent, StatLookup, StatModifier, Vitals};

/// Parameters whose change rate depends on carried load
const LOAD_SENSITIVE: [ParameterKind; 3] = [
    ParameterKind::Stamina,
    ParameterKind::Food,
    ParameterKind::Water,
];

/// Max Capacity lost at a given Energy ratio
///
/// Zero at or above `threshold_ratio`, ramping linearly to
/// `max_capacity_reduction` as the ratio approaches zero.
pub fn energy_capacity_reduction(energy: &EnergyConfig, ratio: f32) -> f32 {
    remap_clamped(
        energy.threshold_ratio,
        0.0,
        0.0,
        energy.max_capacity_reduction,
        ratio,
    )
}

/// Change rate adjusted for an encumbrance scale within `range`
///
/// Recovery (positive rates) shrinks toward zero as the scale approaches
/// `range.max`; drain (negative rates) is multiplied by the scale.
pub fn encumbered_rate(rate: f32, scale: f32, range: ScaleRange) -> f32 {
    if rate > 0.0 {
        let span = range.max - range.min;
        let normalized = if span > f32::EPSILON {
            ((scale - range.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        rate * (1.0 - normalized)
    } else {
        rate * scale
    }
}

#[derive(Debug)]
pub struct StatModifierSystem {
    load: LoadConfig,
    energy: EnergyConfig,
    encumbrance: EncumbranceConfig,
    /// Permanent modifiers installed by `initialize`
    installed: Vec<(ParameterKind, ModifierId)>,
    /// Parameter -> Health lost per game hour while it is empty
    watched: AHashMap<ParameterKind, f32>,
    /// Health damage modifiers currently active, by the empty parameter
    damage: AHashMap<ParameterKind, ModifierId>,
}

impl StatModifierSystem {
    pub fn new(config: &SurvivalConfig) -> Self {
        Self {
            load: config.load.clone(),
            energy: config.energy.clone(),
            encumbrance: config.encumbrance.clone(),
            installed: Vec::new(),
            watched: AHashMap::new(),
            damage: AHashMap::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.installed.is_empty() || !self.watched.is_empty()
    }

    /// Install every permanent modifier and start watching for empty parameters
    ///
    /// Re-initializing first tears down the previous registration.
    pub fn initialize(&mut self, vitals: &mut Vitals) -> Result<()> {
        if self.is_initialized() {
            self.cleanup(vitals);
        }
        for required in [ParameterKind::Health, ParameterKind::Capacity] {
            if !vitals.contains(required) {
                return Err(SurvivalError::UnknownParameter(required));
            }
        }

        self.install_capacity_by_energy(vitals)?;
        for kind in LOAD_SENSITIVE {
            if vitals.contains(kind) {
                self.install_rate_by_capacity(vitals, kind)?;
            }
        }

        let watched: Vec<(ParameterKind, f32, bool)> = vitals
            .iter()
            .filter(|p| p.kind() != ParameterKind::Health && p.decreased_health_rate() > 0.0)
            .map(|p| (p.kind(), p.decreased_health_rate(), p.is_empty()))
            .collect();
        for (kind, rate, empty) in watched {
            self.watched.insert(kind, rate);
            if empty {
                self.install_health_damage(vitals, kind)?;
            }
        }

        info!(
            "Stat modifier system initialized: {} modifiers, {} health dependencies",
            self.installed.len(),
            self.watched.len()
        );
        Ok(())
    }

    fn install_capacity_by_energy(&mut self, vitals: &mut Vitals) -> Result<()> {
        let energy = self.energy.clone();
        let modifier = StatModifier::new(QueryKind::Max, move |max, stats: &dyn StatLookup| {
            if stats.max(ParameterKind::Energy) <= 0.0 {
                return max;
            }
            let ratio = stats.ratio(ParameterKind::Energy);
            max - energy_capacity_reduction(&energy, ratio)
        });
        let id = vitals
            .get_mut(ParameterKind::Capacity)?
            .mediator
            .add_modifier(modifier)?;
        self.installed.push((ParameterKind::Capacity, id));
        debug!("Installed capacity-by-energy modifier {:?}", id);
        Ok(())
    }

    fn install_rate_by_capacity(&mut self, vitals: &mut Vitals, kind: ParameterKind) -> Result<()> {
        let Some(range) = self.encumbrance.for_parameter(kind) else {
            return Ok(());
        };
        let load = self.load.clone();
        let modifier = StatModifier::new(
            QueryKind::ChangeRate,
            move |rate, stats: &dyn StatLookup| {
                let scale = calculate_capacity_scale(
                    &load,
                    stats,
                    WeightClass::Critical,
                    WeightClass::Ultimate,
                    range.min,
                    range.max,
                );
                encumbered_rate(rate, scale, range)
            },
        );
        let id = vitals.get_mut(kind)?.mediator.add_modifier(modifier)?;
        self.installed.push((kind, id));
        debug!("Installed {}-by-capacity modifier {:?}", kind, id);
        Ok(())
    }

    fn install_health_damage(&mut self, vitals: &mut Vitals, kind: ParameterKind) -> Result<()> {
        if self.damage.contains_key(&kind) {
            return Ok(());
        }
        let Some(&rate) = self.watched.get(&kind) else {
            return Ok(());
        };
        let modifier = StatModifier::new(QueryKind::ChangeRate, move |v, _| v - rate);
        let id = vitals
            .get_mut(ParameterKind::Health)?
            .mediator
            .add_modifier(modifier)?;
        self.damage.insert(kind, id);
        info!("{} is empty: health drains by {} per hour", kind, rate);
        Ok(())
    }

    fn remove_health_damage(&mut self, vitals: &mut Vitals, kind: ParameterKind) -> Result<()> {
        if let Some(id) = self.damage.remove(&kind) {
            vitals
                .get_mut(ParameterKind::Health)?
                .mediator
                .remove_modifier(id);
            info!("{} recovered: health damage lifted", kind);
        }
        Ok(())
    }

    /// React to a parameter event
    pub fn handle_event(&mut self, vitals: &mut Vitals, event: &ParameterEvent) -> Result<()> {
        match *event {
            ParameterEvent::ReachedZero(kind) if self.watched.contains_key(&kind) => {
                self.install_health_damage(vitals, kind)
            }
            ParameterEvent::RecoveredFromZero(kind) if self.watched.contains_key(&kind) => {
                self.remove_health_damage(vitals, kind)
            }
            _ => Ok(()),
        }
    }

    /// Parameters currently damaging Health
    pub fn damaging(&self) -> impl Iterator<Item = ParameterKind> + '_ {
        self.damage.keys().copied()
    }

    /// Remove every modifier this system installed and stop watching
    pub fn cleanup(&mut self, vitals: &mut Vitals) {
        for (kind, id) in self.installed.drain(..) {
            if let Ok(parameter) = vitals.get_mut(kind) {
                parameter.mediator.remove_modifier(id);
            }
        }
        if let Ok(health) = vitals.get_mut(ParameterKind::Health) {
            for (_, id) in self.damage.drain() {
                health.mediator.remove_modifier(id);
            }
        }
        self.damage.clear();
        self.watched.clear();
        debug!("Stat modifier system cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_reduction_ramp() {
        let energy = EnergyConfig::default();
        assert_eq!(energy_capacity_reduction(&energy, 1.0), 0.0);
        assert_eq!(energy_capacity_reduction(&energy, 0.5), 0.0);
        assert_eq!(energy_capacity_reduction(&energy, 0.25), 7.5);
        assert_eq!(energy_capacity_reduction(&energy, 0.0), 15.0);
    }

    #[test]
    fn test_encumbered_recovery_slows() {
        let range = ScaleRange::new(1.0, 3.0);
        assert_eq!(encumbered_rate(10.0, 1.0, range), 10.0);
        assert_eq!(encumbered_rate(10.0, 2.0, range), 5.0);
        assert_eq!(encumbered_rate(10.0, 3.0, range), 0.0);
    }

    #[test]
    fn test_encumbered_drain_scales() {
        let range = ScaleRange::new(1.0, 2.0);
        assert_eq!(encumbered_rate(-4.0, 1.0, range), -4.0);
        assert_eq!(encumbered_rate(-4.0, 2.0, range), -8.0);
    }

    #[test]
    fn test_flat_range_keeps_recovery() {
        let range = ScaleRange::new(1.0, 1.0);
        assert_eq!(encumbered_rate(6.0, 1.0, range), 6.0);
    }
}
