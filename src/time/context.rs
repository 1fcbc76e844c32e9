//! Single owner of the game clock and the process scheduler
//!
//! At most one clock is installed at a time. The scheduler only advances
//! after the clock has finished its update for the frame.

use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::TimeConfig;
use crate::core::error::{Result, SurvivalError};
use crate::core::types::ProcessId;
use crate::time::clock::GameTime;
use crate::time::scheduler::{Process, ProcessScheduler, Scheduled};

/// Outcome of one frame of the time layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub game_delta: Duration,
    pub now: Duration,
    pub fired: Vec<ProcessId>,
}

#[derive(Debug, Default)]
pub struct TimeContext {
    clock: Option<GameTime>,
    scheduler: ProcessScheduler,
}

impl TimeContext {
    /// Context with no clock installed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(config: &TimeConfig) -> Self {
        Self {
            clock: Some(GameTime::new(config)),
            scheduler: ProcessScheduler::new(),
        }
    }

    /// Install the clock; a second install is rejected and leaves the first intact
    pub fn install_clock(&mut self, config: &TimeConfig) -> Result<&mut GameTime> {
        if self.clock.is_some() {
            warn!("Rejected second game clock");
            return Err(SurvivalError::ClockAlreadyInstalled);
        }
        info!("Game clock installed");
        Ok(self.clock.insert(GameTime::new(config)))
    }

    /// Destroy the clock, clearing its subscribers and every pending process
    ///
    /// Returns false if no clock was installed.
    pub fn teardown_clock(&mut self) -> bool {
        let Some(mut clock) = self.clock.take() else {
            return false;
        };
        clock.stop_all_speed_ups();
        clock.clear_subscribers();
        self.scheduler.clear();
        info!("Game clock torn down");
        true
    }

    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    pub fn clock(&self) -> Result<&GameTime> {
        self.clock.as_ref().ok_or(SurvivalError::ClockUnavailable)
    }

    pub fn clock_mut(&mut self) -> Result<&mut GameTime> {
        self.clock.as_mut().ok_or(SurvivalError::ClockUnavailable)
    }

    pub fn scheduler(&self) -> &ProcessScheduler {
        &self.scheduler
    }

    pub fn start_speed_up(&mut self, length: Duration) -> Result<()> {
        self.clock_mut()?.start_speed_up(length);
        Ok(())
    }

    pub fn start_speed_up_until(&mut self, at: Duration) -> Result<bool> {
        Ok(self.clock_mut()?.start_speed_up_until(at))
    }

    pub fn stop_all_speed_ups(&mut self) -> Result<()> {
        self.clock_mut()?.stop_all_speed_ups();
        Ok(())
    }

    /// Hand a process to the scheduler
    ///
    /// Immediate processes run even without a clock; deferred ones need one.
    pub fn add_process(&mut self, process: Process) -> Result<Scheduled> {
        let now = match (&self.clock, process.is_immediate()) {
            (Some(clock), _) => clock.time(),
            (None, true) => Duration::ZERO,
            (None, false) => return Err(SurvivalError::ClockUnavailable),
        };
        Ok(self.scheduler.add_process(process, now))
    }

    pub fn remove_process(&mut self, id: ProcessId) -> bool {
        self.scheduler.remove_process(id)
    }

    /// Advance the clock by one real frame, then wake the scheduler
    pub fn frame(&mut self, real_seconds: f64) -> Result<FrameReport> {
        let clock = self.clock.as_mut().ok_or(SurvivalError::ClockUnavailable)?;
        let game_delta = clock.update(real_seconds);
        let now = clock.time();
        let fired = self.scheduler.poll(now);
        Ok(FrameReport {
            game_delta,
            now,
            fired,
        })
    }
}
