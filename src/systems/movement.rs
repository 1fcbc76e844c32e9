//! Locomotion: gait gating, jump cost and load-dependent speed

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{LoadConfig, MovementConfig, SurvivalConfig};
use crate::core::error::Result;
use crate::core::types::{GaitMode, ModifierId, MovementState, ParameterKind, WeightClass};
use crate::stats::{
    calculate_capacity_scale, weight_class, ParameterEvent, StatLookup, StatModifier, StatsMediator,
    Vitals,
};

/// Something the movement controller did that systems react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementEvent {
    Jumped,
    GaitChanged(GaitMode),
    StateChanged(MovementState),
}

/// Host-facing movement state with a mediated speed per gait
///
/// Requested transitions that the current permissions forbid are demoted
/// (running falls back to walking, walking to standing still).
#[derive(Debug)]
pub struct MovementController {
    walk_speed: f32,
    run_speed: f32,
    gait: GaitMode,
    state: MovementState,
    can_walk: bool,
    can_run: bool,
    can_jump: bool,
    /// State to return to once the current jump lands
    landing: Option<MovementState>,
    pub speed_mediator: StatsMediator<GaitMode>,
    outbox: VecDeque<MovementEvent>,
}

impl MovementController {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            run_speed: config.run_speed,
            gait: GaitMode::Walk,
            state: MovementState::Idle,
            can_walk: true,
            can_run: true,
            can_jump: true,
            landing: None,
            speed_mediator: StatsMediator::new(),
            outbox: VecDeque::new(),
        }
    }

    pub fn gait(&self) -> GaitMode {
        self.gait
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn can_walk(&self) -> bool {
        self.can_walk
    }

    pub fn can_run(&self) -> bool {
        self.can_run
    }

    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    pub fn base_speed(&self, gait: GaitMode) -> f32 {
        match gait {
            GaitMode::Walk => self.walk_speed,
            GaitMode::Run => self.run_speed,
        }
    }

    /// Effective speed for `gait` under the current load
    pub fn speed_for(&self, gait: GaitMode, lookup: &dyn StatLookup) -> f32 {
        self.speed_mediator.query(gait, self.base_speed(gait), lookup)
    }

    /// Effective speed right now; zero while standing or unable to walk
    pub fn speed(&self, lookup: &dyn StatLookup) -> f32 {
        let moving = match self.state {
            MovementState::Idle => false,
            MovementState::Jumping => self.landing != Some(MovementState::Idle),
            MovementState::Walking | MovementState::Running => true,
        };
        if !self.can_walk || !moving {
            return 0.0;
        }
        self.speed_for(self.gait, lookup)
    }

    pub fn set_gait(&mut self, gait: GaitMode) {
        let gait = if gait == GaitMode::Run && !self.can_run {
            GaitMode::Walk
        } else {
            gait
        };
        if gait == self.gait {
            return;
        }
        self.gait = gait;
        self.outbox.push_back(MovementEvent::GaitChanged(gait));
        if matches!(self.state, MovementState::Walking | MovementState::Running) {
            self.set_state(MovementState::from_gait(gait));
        }
    }

    /// Start moving at the current gait
    pub fn start_moving(&mut self) {
        self.landing = None;
        self.set_state(MovementState::from_gait(self.gait));
    }

    pub fn stop(&mut self) {
        self.landing = None;
        self.set_state(MovementState::Idle);
    }

    /// Jump for one update, then land back in the previous state
    ///
    /// Returns false if jumping is not currently permitted.
    pub fn jump(&mut self) -> bool {
        if !self.can_jump {
            return false;
        }
        self.outbox.push_back(MovementEvent::Jumped);
        if self.state != MovementState::Jumping {
            self.landing = Some(self.state);
            self.set_state(MovementState::Jumping);
        }
        true
    }

    pub fn is_airborne(&self) -> bool {
        self.state == MovementState::Jumping
    }

    fn set_state(&mut self, requested: MovementState) {
        let state = match requested {
            MovementState::Walking | MovementState::Running | MovementState::Jumping
                if !self.can_walk =>
            {
                MovementState::Idle
            }
            MovementState::Running if !self.can_run => MovementState::Walking,
            other => other,
        };
        if state != self.state {
            self.state = state;
            self.outbox.push_back(MovementEvent::StateChanged(state));
        }
    }

    /// Apply new permissions, demoting the current gait and state if needed
    pub fn set_permissions(&mut self, can_walk: bool, can_run: bool, can_jump: bool) {
        self.can_walk = can_walk;
        self.can_run = can_run;
        self.can_jump = can_jump;

        if !can_run && self.gait == GaitMode::Run {
            self.set_gait(GaitMode::Walk);
        }
        let state = self.state;
        self.set_state(state);
    }

    /// Tick timed speed modifiers and land a pending jump
    pub fn update(&mut self, delta_time: f32) {
        self.speed_mediator.update_modifiers(delta_time);
        if let Some(previous) = self.landing.take() {
            let next = match previous {
                MovementState::Walking | MovementState::Running => {
                    MovementState::from_gait(self.gait)
                }
                other => other,
            };
            self.set_state(next);
        }
    }

    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        self.outbox.drain(..).collect()
    }
}

#[derive(Debug)]
pub struct MovementSystem {
    load: LoadConfig,
    movement: MovementConfig,
    speed_modifiers: Vec<ModifierId>,
    /// Parameters with per-movement base rates
    tracked: Vec<ParameterKind>,
    subscribed: bool,
}

impl MovementSystem {
    pub fn new(config: &SurvivalConfig) -> Self {
        Self {
            load: config.load.clone(),
            movement: config.movement.clone(),
            speed_modifiers: Vec::new(),
            tracked: Vec::new(),
            subscribed: false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Parameters that follow the controller's movement state
    pub fn tracked(&self) -> &[ParameterKind] {
        &self.tracked
    }

    pub fn initialize(
        &mut self,
        vitals: &mut Vitals,
        controller: &mut MovementController,
    ) -> Result<()> {
        if self.subscribed {
            self.cleanup(vitals, controller);
        }

        let walk_floor = self.movement.overloaded_walk_scale;
        // Overloaded running slows to overloaded walking, never to zero
        let movement = &self.movement;
        let run_floor = movement.walk_speed * movement.overloaded_walk_scale / movement.run_speed;

        for (gait, floor) in [(GaitMode::Walk, walk_floor), (GaitMode::Run, run_floor)] {
            let load = self.load.clone();
            let modifier = StatModifier::new(gait, move |speed, stats: &dyn StatLookup| {
                speed
                    * calculate_capacity_scale(
                        &load,
                        stats,
                        WeightClass::Critical,
                        WeightClass::Ultimate,
                        1.0,
                        floor,
                    )
            });
            let id = controller.speed_mediator.add_modifier(modifier)?;
            self.speed_modifiers.push(id);
        }

        let state = controller.state();
        self.tracked = vitals
            .iter()
            .filter(|p| p.tracks_movement())
            .map(|p| p.kind())
            .collect();
        for kind in &self.tracked {
            vitals.get_mut(*kind)?.set_movement_state(state);
        }

        self.subscribed = true;
        self.refresh_permissions(vitals, controller);
        debug!(
            "Movement system initialized, tracking {} parameters",
            self.tracked.len()
        );
        Ok(())
    }

    /// Recompute what the controller may do from Stamina and load
    pub fn refresh_permissions(&self, vitals: &Vitals, controller: &mut MovementController) {
        if !self.subscribed {
            return;
        }
        let exhausted = vitals
            .get(ParameterKind::Stamina)
            .map(|s| s.is_empty())
            .unwrap_or(false);
        let class = weight_class(&self.load, vitals);
        let overloaded = matches!(class, Some(WeightClass::Overload));
        let over_ultimate = matches!(class, Some(WeightClass::Ultimate | WeightClass::Overload));

        let can_walk = !overloaded;
        let can_run = can_walk && !exhausted && !over_ultimate;
        if (can_walk, can_run, can_run)
            != (controller.can_walk(), controller.can_run(), controller.can_jump())
        {
            debug!(
                "Movement permissions: walk={} run={} jump={}",
                can_walk, can_run, can_run
            );
        }
        controller.set_permissions(can_walk, can_run, can_run);
    }

    /// React to a controller event; returns parameter events it caused
    pub fn handle_movement_event(
        &mut self,
        vitals: &mut Vitals,
        event: &MovementEvent,
    ) -> Result<Vec<ParameterEvent>> {
        if !self.subscribed {
            return Ok(Vec::new());
        }
        match *event {
            MovementEvent::Jumped => {
                vitals.adjust(ParameterKind::Stamina, -self.movement.jump_stamina_cost)
            }
            MovementEvent::StateChanged(state) => {
                for kind in &self.tracked {
                    vitals.get_mut(*kind)?.set_movement_state(state);
                }
                Ok(Vec::new())
            }
            MovementEvent::GaitChanged(gait) => {
                debug!("Gait changed to {:?}", gait);
                Ok(Vec::new())
            }
        }
    }

    pub fn handle_parameter_event(
        &mut self,
        vitals: &Vitals,
        controller: &mut MovementController,
        event: &ParameterEvent,
    ) {
        match event {
            ParameterEvent::ReachedZero(ParameterKind::Stamina)
            | ParameterEvent::RecoveredFromZero(ParameterKind::Stamina)
            | ParameterEvent::LoadChanged { .. } => self.refresh_permissions(vitals, controller),
            _ => {}
        }
    }

    /// Remove the speed modifiers and every subscription made in `initialize`
    pub fn cleanup(&mut self, vitals: &mut Vitals, controller: &mut MovementController) {
        for id in self.speed_modifiers.drain(..) {
            controller.speed_mediator.remove_modifier(id);
        }
        for kind in self.tracked.drain(..) {
            if let Ok(parameter) = vitals.get_mut(kind) {
                parameter.set_movement_state(MovementState::Idle);
            }
        }
        self.subscribed = false;
        debug!("Movement system cleaned up");
    }
}
