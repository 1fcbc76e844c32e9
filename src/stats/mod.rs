//! Modifier-mediated survivor attributes
//!
//! A [`Parameter`] owns a [`StatsMediator`]; systems install
//! [`StatModifier`]s on it to bend one attribute according to another.

pub mod capacity;
pub mod lookup;
pub mod mediator;
pub mod modifier;
pub mod parameter;
pub mod vitals;

pub use capacity::{calculate_capacity_scale, weight_class};
pub use lookup::{NoStats, StatLookup};
pub use mediator::StatsMediator;
pub use modifier::{Operation, Query, StatModifier, StatModifierBuilder};
pub use parameter::{Parameter, ZeroCrossing};
pub use vitals::{ParameterEvent, Vitals};
