//! Simulation configuration with documented constants
//!
//! All tuning numbers live here. A config can be built from defaults or
//! loaded from a TOML file; every section falls back to its defaults when
//! omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SurvivalError};
use crate::core::types::{MovementState, ParameterKind, WeightClass};

/// Top-level configuration for a survivor and its clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    pub time: TimeConfig,
    pub load: LoadConfig,
    pub energy: EnergyConfig,
    pub encumbrance: EncumbranceConfig,
    pub movement: MovementConfig,
    pub parameters: ParameterTable,
}

// === TIME ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Game seconds that pass per real second
    ///
    /// At 60, one real second is one game minute and a game day lasts 24
    /// real minutes.
    pub time_scale: f64,

    /// Game seconds per real second while a speed-up window is active
    pub speed_up_scale: f64,

    /// Minute of day 0 the clock starts at (480 = 08:00)
    pub start_minute: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 60.0,
            speed_up_scale: 600.0,
            start_minute: 8 * 60,
        }
    }
}

// === LOAD ===

/// Weight class boundaries as fractions of the effective max Capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub normal: f32,
    pub critical: f32,
    pub ultimate: f32,
    /// Beyond this the survivor cannot move at all
    pub overload: f32,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            normal: 0.5,
            critical: 0.75,
            ultimate: 1.0,
            overload: 1.25,
        }
    }
}

impl LoadConfig {
    pub fn fraction(&self, class: WeightClass) -> f32 {
        match class {
            WeightClass::Normal => self.normal,
            WeightClass::Critical => self.critical,
            WeightClass::Ultimate => self.ultimate,
            WeightClass::Overload => self.overload,
        }
    }

    /// Absolute carried load at which `class` begins
    pub fn boundary(&self, class: WeightClass, max_capacity: f32) -> f32 {
        self.fraction(class) * max_capacity
    }
}

// === ENERGY ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Below this fraction of max Energy the survivor's max Capacity shrinks
    pub threshold_ratio: f32,

    /// Capacity lost when Energy reaches zero
    ///
    /// The loss ramps linearly from 0 at `threshold_ratio` up to this value.
    pub max_capacity_reduction: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.5,
            max_capacity_reduction: 15.0,
        }
    }
}

// === ENCUMBRANCE ===

/// Output range of an encumbrance remap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncumbranceConfig {
    pub stamina: ScaleRange,
    pub food: ScaleRange,
    pub water: ScaleRange,
}

impl Default for EncumbranceConfig {
    fn default() -> Self {
        Self {
            stamina: ScaleRange::new(1.0, 3.0),
            food: ScaleRange::new(1.0, 2.0),
            water: ScaleRange::new(1.0, 2.0),
        }
    }
}

impl EncumbranceConfig {
    /// Scale range for a parameter whose change rate depends on load
    pub fn for_parameter(&self, kind: ParameterKind) -> Option<ScaleRange> {
        match kind {
            ParameterKind::Stamina => Some(self.stamina),
            ParameterKind::Food => Some(self.food),
            ParameterKind::Water => Some(self.water),
            _ => None,
        }
    }
}

// === MOVEMENT ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Base walking speed (world units per second)
    pub walk_speed: f32,
    /// Base running speed (world units per second)
    pub run_speed: f32,
    /// Stamina deducted by a single jump
    pub jump_stamina_cost: f32,
    /// Walk speed multiplier once load reaches the Ultimate boundary
    pub overloaded_walk_scale: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            jump_stamina_cost: 10.0,
            overloaded_walk_scale: 0.5,
        }
    }
}

// === PARAMETERS ===

/// Base change rate per movement state (units per game hour)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementRates {
    pub idle: f32,
    pub walking: f32,
    pub running: f32,
    pub jumping: f32,
}

impl MovementRates {
    pub fn rate(&self, state: MovementState) -> f32 {
        match state {
            MovementState::Idle => self.idle,
            MovementState::Walking => self.walking,
            MovementState::Running => self.running,
            MovementState::Jumping => self.jumping,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub kind: ParameterKind,
    pub current: f32,
    pub max: f32,
    /// Units per game hour; negative values drain
    #[serde(default)]
    pub change_rate: f32,
    /// Overrides `change_rate` depending on what the survivor is doing
    #[serde(default)]
    pub movement_rates: Option<MovementRates>,
    /// Health lost per game hour while this parameter sits at zero
    ///
    /// Must be non-negative; zero means the parameter never damages Health.
    #[serde(default)]
    pub decreased_health_rate: f32,
}

impl ParameterConfig {
    pub fn new(kind: ParameterKind, current: f32, max: f32, change_rate: f32) -> Self {
        Self {
            kind,
            current,
            max,
            change_rate,
            movement_rates: None,
            decreased_health_rate: 0.0,
        }
    }

    pub fn with_movement_rates(mut self, rates: MovementRates) -> Self {
        self.movement_rates = Some(rates);
        self
    }

    pub fn with_decreased_health_rate(mut self, rate: f32) -> Self {
        self.decreased_health_rate = rate;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTable(pub Vec<ParameterConfig>);

impl Default for ParameterTable {
    fn default() -> Self {
        Self(vec![
            ParameterConfig::new(ParameterKind::Health, 100.0, 100.0, 1.0),
            ParameterConfig::new(ParameterKind::Stamina, 100.0, 100.0, 30.0).with_movement_rates(
                MovementRates {
                    idle: 30.0,
                    walking: 10.0,
                    running: -25.0,
                    jumping: -25.0,
                },
            ),
            ParameterConfig::new(ParameterKind::Energy, 100.0, 100.0, -4.0)
                .with_decreased_health_rate(2.0),
            ParameterConfig::new(ParameterKind::Food, 100.0, 100.0, -5.0)
                .with_decreased_health_rate(3.0),
            ParameterConfig::new(ParameterKind::Water, 100.0, 100.0, -8.0)
                .with_decreased_health_rate(5.0),
            ParameterConfig::new(ParameterKind::Capacity, 0.0, 40.0, 0.0),
        ])
    }
}

impl ParameterTable {
    pub fn get(&self, kind: ParameterKind) -> Option<&ParameterConfig> {
        self.0.iter().find(|p| p.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterConfig> {
        self.0.iter()
    }
}

impl SurvivalConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SurvivalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        for scale in [self.time.time_scale, self.time.speed_up_scale] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(SurvivalError::InvalidConfig(format!(
                    "time scales must be positive and finite (got {})",
                    scale
                )));
            }
        }

        let load = &self.load;
        if !(0.0 < load.normal
            && load.normal < load.critical
            && load.critical < load.ultimate
            && load.ultimate < load.overload)
        {
            return Err(SurvivalError::InvalidConfig(format!(
                "load boundaries must be positive and strictly increasing (got {}, {}, {}, {})",
                load.normal, load.critical, load.ultimate, load.overload
            )));
        }

        if !(0.0 < self.energy.threshold_ratio && self.energy.threshold_ratio <= 1.0) {
            return Err(SurvivalError::InvalidConfig(format!(
                "energy threshold_ratio ({}) must be in (0, 1]",
                self.energy.threshold_ratio
            )));
        }

        for (name, range) in [
            ("stamina", self.encumbrance.stamina),
            ("food", self.encumbrance.food),
            ("water", self.encumbrance.water),
        ] {
            if !(0.0 < range.min && range.min <= range.max) {
                return Err(SurvivalError::InvalidConfig(format!(
                    "{} encumbrance range [{}, {}] must be positive and ordered",
                    name, range.min, range.max
                )));
            }
        }

        if self.movement.walk_speed <= 0.0 || self.movement.run_speed < self.movement.walk_speed {
            return Err(SurvivalError::InvalidConfig(format!(
                "run_speed ({}) must be >= walk_speed ({}) > 0",
                self.movement.run_speed, self.movement.walk_speed
            )));
        }

        let mut seen = Vec::new();
        for param in self.parameters.iter() {
            if seen.contains(&param.kind) {
                return Err(SurvivalError::InvalidConfig(format!(
                    "parameter {} configured twice",
                    param.kind
                )));
            }
            seen.push(param.kind);

            if param.max <= 0.0 {
                return Err(SurvivalError::InvalidConfig(format!(
                    "parameter {} max must be positive",
                    param.kind
                )));
            }
            if param.current < 0.0 {
                return Err(SurvivalError::InvalidConfig(format!(
                    "parameter {} current must not be negative",
                    param.kind
                )));
            }
            if param.decreased_health_rate < 0.0 {
                return Err(SurvivalError::InvalidConfig(format!(
                    "parameter {} decreased_health_rate must not be negative",
                    param.kind
                )));
            }
        }

        Ok(())
    }
}
