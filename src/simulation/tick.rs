//! Frame driver - orchestrates one host frame
//!
//! Order within a frame:
//! 1. Advance the game clock (boundary events fire here)
//! 2. Wake the process scheduler against the new time
//! 3. Advance the survivor by the game time that passed
//!
//! Returns the events of the frame for logging or display.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::Result;
use crate::core::types::{ParameterKind, ProcessId};
use crate::simulation::survivor::Survivor;
use crate::stats::ParameterEvent;
use crate::time::{ClockReading, TimeContext};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Events generated during a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A scheduled process ran
    ProcessFired { id: ProcessId, at: ClockReading },
    /// A parameter crossed zero or the carried load changed
    Parameter { event: ParameterEvent, at: ClockReading },
    /// Health reached zero
    Died { at: ClockReading },
}

/// Run a single frame of `real_seconds`
pub fn run_frame(
    time: &mut TimeContext,
    survivor: &mut Survivor,
    real_seconds: f64,
) -> Result<Vec<SimulationEvent>> {
    let mut events = Vec::new();

    let report = time.frame(real_seconds)?;
    let at = ClockReading::from_time(report.now);
    for id in report.fired {
        events.push(SimulationEvent::ProcessFired { id, at });
    }

    if report.game_delta.is_zero() || !survivor.is_alive() {
        return Ok(events);
    }

    let delta_hours = (report.game_delta.as_secs_f64() / SECONDS_PER_HOUR) as f32;
    for event in survivor.update(delta_hours)? {
        debug!("{:?} at {:?}", event, at);
        events.push(SimulationEvent::Parameter { event, at });
        if event == ParameterEvent::ReachedZero(ParameterKind::Health) {
            warn!("Survivor died at day {} {:02}:{:02}", at.day, at.hour, at.minute);
            events.push(SimulationEvent::Died { at });
        }
    }

    Ok(events)
}
