//! A survivor: parameters, movement and the systems coupling them

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::SurvivalConfig;
use crate::core::error::Result;
use crate::core::types::{GaitMode, MovementState, ParameterKind};
use crate::stats::{ParameterEvent, StatLookup, Vitals};
use crate::systems::{MovementController, MovementSystem, StatModifierSystem};

/// Serializable view of a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub kind: ParameterKind,
    pub current: f32,
    pub max: f32,
    pub change_rate: f32,
}

/// Serializable view of the whole survivor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivorSnapshot {
    pub parameters: Vec<ParameterSnapshot>,
    pub gait: GaitMode,
    pub movement: MovementState,
    pub speed: f32,
    pub can_walk: bool,
    pub can_run: bool,
    pub can_jump: bool,
    pub health_drained_by: Vec<ParameterKind>,
}

#[derive(Debug)]
pub struct Survivor {
    pub vitals: Vitals,
    pub controller: MovementController,
    stat_system: StatModifierSystem,
    movement_system: MovementSystem,
}

impl Survivor {
    /// Build a survivor and initialize both systems
    pub fn from_config(config: &SurvivalConfig) -> Result<Self> {
        config.validate()?;

        let mut survivor = Self {
            vitals: Vitals::from_config(&config.parameters),
            controller: MovementController::new(&config.movement),
            stat_system: StatModifierSystem::new(config),
            movement_system: MovementSystem::new(config),
        };
        survivor.stat_system.initialize(&mut survivor.vitals)?;
        survivor
            .movement_system
            .initialize(&mut survivor.vitals, &mut survivor.controller)?;
        survivor.dispatch(Vec::new())?;
        Ok(survivor)
    }

    /// Route events to both systems until nothing new is produced
    ///
    /// Permissions are recomputed after every batch, since max Capacity
    /// follows Energy and the load class can shift without a load change.
    /// Returns every parameter event handled, in handling order.
    fn dispatch(&mut self, initial: Vec<ParameterEvent>) -> Result<Vec<ParameterEvent>> {
        let mut queue: VecDeque<ParameterEvent> = initial.into();
        let mut handled = Vec::new();

        loop {
            while let Some(event) = queue.pop_front() {
                self.stat_system.handle_event(&mut self.vitals, &event)?;
                self.movement_system
                    .handle_parameter_event(&self.vitals, &mut self.controller, &event);
                handled.push(event);
            }
            self.movement_system
                .refresh_permissions(&self.vitals, &mut self.controller);

            let movement_events = self.controller.drain_events();
            if movement_events.is_empty() {
                break;
            }
            for event in movement_events {
                let caused = self
                    .movement_system
                    .handle_movement_event(&mut self.vitals, &event)?;
                queue.extend(caused);
            }
        }

        Ok(handled)
    }

    /// Advance the survivor by `delta_hours` of game time
    pub fn update(&mut self, delta_hours: f32) -> Result<Vec<ParameterEvent>> {
        let events = self.vitals.update(delta_hours);
        self.controller.update(delta_hours);
        self.dispatch(events)
    }

    pub fn set_gait(&mut self, gait: GaitMode) -> Result<Vec<ParameterEvent>> {
        self.controller.set_gait(gait);
        self.dispatch(Vec::new())
    }

    pub fn start_moving(&mut self) -> Result<Vec<ParameterEvent>> {
        self.controller.start_moving();
        self.dispatch(Vec::new())
    }

    pub fn stop(&mut self) -> Result<Vec<ParameterEvent>> {
        self.controller.stop();
        self.dispatch(Vec::new())
    }

    /// Jump if allowed, paying the Stamina cost
    pub fn jump(&mut self) -> Result<bool> {
        if !self.controller.jump() {
            debug!("Jump refused");
            return Ok(false);
        }
        self.dispatch(Vec::new())?;
        Ok(true)
    }

    /// Add carried weight
    pub fn pick_up(&mut self, weight: f32) -> Result<Vec<ParameterEvent>> {
        let events = self.vitals.adjust(ParameterKind::Capacity, weight.max(0.0))?;
        self.dispatch(events)
    }

    /// Remove carried weight
    pub fn put_down(&mut self, weight: f32) -> Result<Vec<ParameterEvent>> {
        let events = self
            .vitals
            .adjust(ParameterKind::Capacity, -weight.max(0.0))?;
        self.dispatch(events)
    }

    /// Restore (or with a negative amount, drain) a parameter directly
    pub fn restore(&mut self, kind: ParameterKind, amount: f32) -> Result<Vec<ParameterEvent>> {
        let events = self.vitals.adjust(kind, amount)?;
        self.dispatch(events)
    }

    pub fn speed(&self) -> f32 {
        self.controller.speed(&self.vitals)
    }

    pub fn is_alive(&self) -> bool {
        self.vitals
            .get(ParameterKind::Health)
            .map(|h| !h.is_empty())
            .unwrap_or(false)
    }

    /// Parameters currently draining Health
    pub fn health_drained_by(&self) -> Vec<ParameterKind> {
        let mut kinds: Vec<ParameterKind> = self.stat_system.damaging().collect();
        kinds.sort_by_key(|k| ParameterKind::ALL.iter().position(|a| a == k));
        kinds
    }

    pub fn snapshot(&self) -> SurvivorSnapshot {
        SurvivorSnapshot {
            parameters: self
                .vitals
                .iter()
                .map(|p| ParameterSnapshot {
                    kind: p.kind(),
                    current: p.current(),
                    max: self.vitals.max(p.kind()),
                    change_rate: p.change_rate(&self.vitals),
                })
                .collect(),
            gait: self.controller.gait(),
            movement: self.controller.state(),
            speed: self.speed(),
            can_walk: self.controller.can_walk(),
            can_run: self.controller.can_run(),
            can_jump: self.controller.can_jump(),
            health_drained_by: self.health_drained_by(),
        }
    }

    /// Reverse every registration both systems made
    pub fn teardown(&mut self) {
        self.stat_system.cleanup(&mut self.vitals);
        self.movement_system
            .cleanup(&mut self.vitals, &mut self.controller);
    }
}
