//! Ordered chain of modifiers for one attribute

use std::fmt;

use tracing::debug;

use crate::core::error::{Result, SurvivalError};
use crate::core::types::ModifierId;
use crate::events::Signal;
use crate::stats::lookup::StatLookup;
use crate::stats::modifier::{Query, StatModifier};

/// Applies every registered modifier to a query, in insertion order
///
/// Each matching modifier receives the previous one's output, so the first
/// modifier added is the innermost function of the fold.
pub struct StatsMediator<C> {
    next_id: u64,
    modifiers: Vec<(ModifierId, StatModifier<C>)>,
    /// Fired once per modifier when it is disposed and detached
    pub disposed: Signal<ModifierId>,
}

impl<C: PartialEq> StatsMediator<C> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            modifiers: Vec::new(),
            disposed: Signal::new(),
        }
    }

    /// Left-fold the query value through all modifiers
    pub fn perform_query(&self, query: &mut Query<C>, lookup: &dyn StatLookup) {
        for (_, modifier) in &self.modifiers {
            modifier.handle(query, lookup);
        }
    }

    /// Effective value of `base` under `condition`
    pub fn query(&self, condition: C, base: f32, lookup: &dyn StatLookup) -> f32 {
        let mut query = Query::new(condition, base);
        self.perform_query(&mut query, lookup);
        query.value
    }

    /// Append a modifier; it is evaluated after every existing one
    pub fn add_modifier(&mut self, mut modifier: StatModifier<C>) -> Result<ModifierId> {
        if modifier.is_disposed() {
            return Err(SurvivalError::InvalidModifier(
                "cannot add a disposed modifier".into(),
            ));
        }
        modifier.clear_removal_mark();

        let id = ModifierId(self.next_id);
        self.next_id += 1;
        self.modifiers.push((id, modifier));
        debug!("Added modifier {:?} ({} active)", id, self.modifiers.len());
        Ok(id)
    }

    /// Dispose and detach a tracked modifier
    ///
    /// Returns false for unknown or already-removed modifiers.
    pub fn remove_modifier(&mut self, id: ModifierId) -> bool {
        let Some(pos) = self.modifiers.iter().position(|(m, _)| *m == id) else {
            return false;
        };

        let (id, mut modifier) = self.modifiers.remove(pos);
        if modifier.dispose() {
            self.disposed.emit(&id);
        }
        debug!("Removed modifier {:?} ({} active)", id, self.modifiers.len());
        true
    }

    /// Tick every modifier, then reap the expired ones
    pub fn update_modifiers(&mut self, delta_time: f32) {
        for (_, modifier) in self.modifiers.iter_mut() {
            modifier.update(delta_time);
        }

        let expired: Vec<ModifierId> = self
            .modifiers
            .iter()
            .filter(|(_, m)| m.is_marked_for_removal())
            .map(|(id, _)| *id)
            .collect();

        for id in expired {
            self.remove_modifier(id);
        }
    }

    /// Remove every modifier
    pub fn clear(&mut self) {
        let ids: Vec<ModifierId> = self.modifiers.iter().map(|(id, _)| *id).collect();
        for id in ids {
            self.remove_modifier(id);
        }
    }

    pub fn contains(&self, id: ModifierId) -> bool {
        self.modifiers.iter().any(|(m, _)| *m == id)
    }

    pub fn get(&self, id: ModifierId) -> Option<&StatModifier<C>> {
        self.modifiers
            .iter()
            .find(|(m, _)| *m == id)
            .map(|(_, modifier)| modifier)
    }

    /// Modifier ids in application order
    pub fn ids(&self) -> impl Iterator<Item = ModifierId> + '_ {
        self.modifiers.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl<C: PartialEq> Default for StatsMediator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: fmt::Debug> fmt::Debug for StatsMediator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsMediator")
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::QueryKind;
    use crate::stats::lookup::NoStats;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sub_five() -> StatModifier<QueryKind> {
        StatModifier::new(QueryKind::Max, |v, _| v - 5.0)
    }

    fn double() -> StatModifier<QueryKind> {
        StatModifier::new(QueryKind::Max, |v, _| v * 2.0)
    }

    #[test]
    fn test_empty_mediator_is_identity() {
        let mediator: StatsMediator<QueryKind> = StatsMediator::new();
        assert_eq!(mediator.query(QueryKind::Max, 42.5, &NoStats), 42.5);
        assert_eq!(mediator.query(QueryKind::ChangeRate, -3.0, &NoStats), -3.0);
    }

    #[test]
    fn test_insertion_order_is_application_order() {
        let mut ab = StatsMediator::new();
        ab.add_modifier(sub_five()).unwrap();
        ab.add_modifier(double()).unwrap();
        assert_eq!(ab.query(QueryKind::Max, 10.0, &NoStats), 10.0);

        let mut ba = StatsMediator::new();
        ba.add_modifier(double()).unwrap();
        ba.add_modifier(sub_five()).unwrap();
        assert_eq!(ba.query(QueryKind::Max, 10.0, &NoStats), 15.0);
    }

    #[test]
    fn test_non_matching_modifiers_skipped() {
        let mut mediator = StatsMediator::new();
        mediator.add_modifier(double()).unwrap();
        mediator
            .add_modifier(StatModifier::new(QueryKind::ChangeRate, |v, _| v + 100.0))
            .unwrap();
        assert_eq!(mediator.query(QueryKind::Max, 3.0, &NoStats), 6.0);
    }

    #[test]
    fn test_timed_modifier_expires_after_duration() {
        let mut mediator = StatsMediator::new();
        let timed = StatModifier::timed(QueryKind::Max, 2.0, |v, _| v + 1.0).unwrap();
        let id = mediator.add_modifier(timed).unwrap();

        mediator.update_modifiers(1.0);
        assert!(mediator.contains(id));
        assert_eq!(mediator.query(QueryKind::Max, 0.0, &NoStats), 1.0);

        mediator.update_modifiers(1.0);
        assert!(!mediator.contains(id));
        assert_eq!(mediator.query(QueryKind::Max, 0.0, &NoStats), 0.0);
    }

    #[test]
    fn test_all_modifiers_see_same_delta() {
        let mut mediator = StatsMediator::new();
        let a = mediator
            .add_modifier(StatModifier::timed(QueryKind::Max, 1.0, |v, _| v).unwrap())
            .unwrap();
        let b = mediator
            .add_modifier(StatModifier::timed(QueryKind::Max, 3.0, |v, _| v).unwrap())
            .unwrap();

        mediator.update_modifiers(1.5);
        assert!(!mediator.contains(a));
        assert_eq!(mediator.get(b).and_then(|m| m.remaining()), Some(1.5));
    }

    #[test]
    fn test_remove_notifies_once() {
        let count = Rc::new(Cell::new(0));
        let mut mediator = StatsMediator::new();
        let c = Rc::clone(&count);
        mediator.disposed.subscribe(move |_| c.set(c.get() + 1));

        let id = mediator.add_modifier(double()).unwrap();
        assert!(mediator.remove_modifier(id));
        assert!(!mediator.remove_modifier(id));
        assert_eq!(count.get(), 1);
        assert!(mediator.is_empty());
    }

    #[test]
    fn test_disposed_modifier_rejected() {
        let mut mediator = StatsMediator::new();
        let mut modifier = double();
        modifier.dispose();
        assert!(mediator.add_modifier(modifier).is_err());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut mediator = StatsMediator::new();
        mediator.add_modifier(double()).unwrap();
        mediator.add_modifier(sub_five()).unwrap();
        mediator.clear();
        assert!(mediator.is_empty());
        assert_eq!(mediator.ids().count(), 0);
    }
}
