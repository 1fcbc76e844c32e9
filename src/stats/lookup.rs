//! Read-only access to other attributes from inside a modifier operation

use crate::core::types::ParameterKind;

/// Source of current and effective max values for every parameter
///
/// Operations receive this so one attribute's modifiers can depend on
/// another attribute's state. Missing parameters read as `0.0`.
pub trait StatLookup {
    fn current(&self, kind: ParameterKind) -> f32;

    /// Effective max after the parameter's own modifiers are applied
    fn max(&self, kind: ParameterKind) -> f32;

    /// `current / max`, or 0 when max is not positive
    fn ratio(&self, kind: ParameterKind) -> f32 {
        let max = self.max(kind);
        if max > 0.0 {
            self.current(kind) / max
        } else {
            0.0
        }
    }
}

/// Lookup for mediators whose modifiers never read other attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStats;

impl StatLookup for NoStats {
    fn current(&self, _kind: ParameterKind) -> f32 {
        0.0
    }

    fn max(&self, _kind: ParameterKind) -> f32 {
        0.0
    }
}
