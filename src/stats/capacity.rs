//! Encumbrance remap shared by the stat and movement systems

use crate::core::config::LoadConfig;
use crate::core::types::{ParameterKind, WeightClass};
use crate::stats::lookup::StatLookup;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to [0, 1]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return if value >= b { 1.0 } else { 0.0 };
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Map `value` from [from_low, from_high] onto [to_low, to_high] without extrapolating
pub fn remap_clamped(from_low: f32, from_high: f32, to_low: f32, to_high: f32, value: f32) -> f32 {
    lerp(to_low, to_high, inverse_lerp(from_low, from_high, value))
}

/// Encumbrance scale for the survivor's current load
///
/// Carried Capacity is interpolated between the boundaries of `min_range`
/// and `max_range` (taken against the effective max Capacity) and mapped
/// onto `[min_scale, max_scale]`. Loads outside the boundaries clamp to the
/// nearest end.
pub fn calculate_capacity_scale(
    load: &LoadConfig,
    lookup: &dyn StatLookup,
    min_range: WeightClass,
    max_range: WeightClass,
    min_scale: f32,
    max_scale: f32,
) -> f32 {
    let max_capacity = lookup.max(ParameterKind::Capacity);
    let low = load.boundary(min_range, max_capacity);
    let high = load.boundary(max_range, max_capacity);
    remap_clamped(
        low,
        high,
        min_scale,
        max_scale,
        lookup.current(ParameterKind::Capacity),
    )
}

/// Heaviest weight class the current load has reached, if any
pub fn weight_class(load: &LoadConfig, lookup: &dyn StatLookup) -> Option<WeightClass> {
    let max_capacity = lookup.max(ParameterKind::Capacity);
    let carried = lookup.current(ParameterKind::Capacity);
    [
        WeightClass::Overload,
        WeightClass::Ultimate,
        WeightClass::Critical,
        WeightClass::Normal,
    ]
    .into_iter()
    .find(|class| carried >= load.boundary(*class, max_capacity))
}
