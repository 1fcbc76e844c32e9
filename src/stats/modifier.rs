//! Queries and the conditional transforms applied to them

use std::fmt;

use crate::core::error::{Result, SurvivalError};
use crate::stats::lookup::StatLookup;

/// Transform applied to a query value
pub type Operation = Box<dyn Fn(f32, &dyn StatLookup) -> f32>;

/// In-flight request for an attribute's effective value under a condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query<C> {
    pub condition: C,
    pub value: f32,
}

impl<C> Query<C> {
    pub fn new(condition: C, value: f32) -> Self {
        Self { condition, value }
    }
}

/// A conditional, optionally time-limited transform of a query value
///
/// Lifecycle: Active -> MarkedForRemoval (duration expired) -> Disposed.
/// A disposed modifier is inert and cannot be re-added to a mediator.
pub struct StatModifier<C> {
    condition: C,
    operation: Operation,
    /// `None` for permanent modifiers
    remaining: Option<f32>,
    marked_for_removal: bool,
    disposed: bool,
}

impl<C> StatModifier<C> {
    /// Permanent modifier
    pub fn new(condition: C, operation: impl Fn(f32, &dyn StatLookup) -> f32 + 'static) -> Self {
        Self {
            condition,
            operation: Box::new(operation),
            remaining: None,
            marked_for_removal: false,
            disposed: false,
        }
    }

    /// Modifier that expires after `duration` units of update time
    ///
    /// A duration of `0.0` yields a permanent modifier.
    pub fn timed(
        condition: C,
        duration: f32,
        operation: impl Fn(f32, &dyn StatLookup) -> f32 + 'static,
    ) -> Result<Self> {
        Self::builder(condition)
            .duration(duration)
            .operation(operation)
            .build()
    }

    pub fn builder(condition: C) -> StatModifierBuilder<C> {
        StatModifierBuilder {
            condition,
            duration: 0.0,
            operation: None,
        }
    }

    pub fn condition(&self) -> &C {
        &self.condition
    }

    /// Time left before expiry, `None` if permanent
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    pub fn is_permanent(&self) -> bool {
        self.remaining.is_none()
    }

    pub fn is_marked_for_removal(&self) -> bool {
        self.marked_for_removal
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Apply the operation if the query's condition matches
    pub fn handle(&self, query: &mut Query<C>, lookup: &dyn StatLookup)
    where
        C: PartialEq,
    {
        if self.disposed || query.condition != self.condition {
            return;
        }
        query.value = (self.operation)(query.value, lookup);
    }

    /// Age a timed modifier, marking it for removal once it expires
    pub fn update(&mut self, delta_time: f32) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= delta_time;
            if *remaining <= 0.0 {
                self.marked_for_removal = true;
            }
        }
    }

    /// Make the modifier permanently inert
    ///
    /// Returns `true` only for the call that performed the disposal.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.marked_for_removal = true;
        true
    }

    pub(crate) fn clear_removal_mark(&mut self) {
        self.marked_for_removal = false;
    }
}

impl<C: fmt::Debug> fmt::Debug for StatModifier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatModifier")
            .field("condition", &self.condition)
            .field("remaining", &self.remaining)
            .field("marked_for_removal", &self.marked_for_removal)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Builder that validates a modifier before it can be added to a mediator
pub struct StatModifierBuilder<C> {
    condition: C,
    duration: f32,
    operation: Option<Operation>,
}

impl<C> StatModifierBuilder<C> {
    /// Lifetime in update-time units; 0 means permanent
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn operation(mut self, operation: impl Fn(f32, &dyn StatLookup) -> f32 + 'static) -> Self {
        self.operation = Some(Box::new(operation));
        self
    }

    pub fn build(self) -> Result<StatModifier<C>> {
        let operation = self
            .operation
            .ok_or_else(|| SurvivalError::InvalidModifier("operation is unset".into()))?;

        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SurvivalError::InvalidModifier(format!(
                "duration must be finite and non-negative (got {})",
                self.duration
            )));
        }

        Ok(StatModifier {
            condition: self.condition,
            operation,
            remaining: (self.duration > 0.0).then_some(self.duration),
            marked_for_removal: false,
            disposed: false,
        })
    }
}
