//! Game clock with minute, hour and day boundary events
//!
//! The clock advances by scaled real time. Every minute boundary crossed
//! during an update is reported individually, so observers never miss a
//! boundary even when a speed-up window makes a single frame span hours.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::TimeConfig;
use crate::events::Signal;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const MINUTES_PER_HOUR: u64 = 60;
pub const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

pub fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * SECONDS_PER_MINUTE)
}

pub fn hours(n: u64) -> Duration {
    minutes(n * MINUTES_PER_HOUR)
}

/// Calendar position of a game time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockReading {
    pub day: u64,
    pub hour: u64,
    pub minute: u64,
}

impl ClockReading {
    pub fn from_time(time: Duration) -> Self {
        let total_minutes = time.as_secs() / SECONDS_PER_MINUTE;
        Self {
            day: total_minutes / MINUTES_PER_DAY,
            hour: (total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR,
            minute: total_minutes % MINUTES_PER_HOUR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpeedUp {
    ends_at: Duration,
}

/// Process-wide game clock
///
/// Owned by a [`crate::time::TimeContext`]; consumers hold a reference to the
/// context rather than reaching for a global.
#[derive(Debug)]
pub struct GameTime {
    current: Duration,
    time_scale: f64,
    speed_up_scale: f64,
    stopped: bool,
    speed_up: Option<SpeedUp>,
    last_delta: Duration,

    /// Time of each minute boundary crossed
    pub on_minute_changed: Signal<Duration>,
    pub on_hour_changed: Signal<Duration>,
    pub on_day_changed: Signal<Duration>,
    /// Once per update that moved the clock
    pub on_time_changed: Signal<Duration>,
    /// Once per update, after every `on_time_changed` handler
    pub on_late_time_changed: Signal<Duration>,
    pub on_speed_up_started: Signal<Duration>,
    pub on_speed_up_ended: Signal<Duration>,
}

impl GameTime {
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            current: minutes(config.start_minute),
            time_scale: config.time_scale,
            speed_up_scale: config.speed_up_scale,
            stopped: false,
            speed_up: None,
            last_delta: Duration::ZERO,
            on_minute_changed: Signal::new(),
            on_hour_changed: Signal::new(),
            on_day_changed: Signal::new(),
            on_time_changed: Signal::new(),
            on_late_time_changed: Signal::new(),
            on_speed_up_started: Signal::new(),
            on_speed_up_ended: Signal::new(),
        }
    }

    /// Time elapsed since day 0, 00:00
    pub fn time(&self) -> Duration {
        self.current
    }

    pub fn reading(&self) -> ClockReading {
        ClockReading::from_time(self.current)
    }

    /// Game time the most recent update advanced by
    pub fn delta_time(&self) -> Duration {
        self.last_delta
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn resume(&mut self) {
        self.stopped = false;
    }

    /// Ignored unless `scale` is finite; negative scales clamp to zero
    pub fn set_time_scale(&mut self, scale: f64) {
        if !scale.is_finite() {
            warn!("Rejected time scale {}", scale);
            return;
        }
        self.time_scale = scale.max(0.0);
    }

    pub fn is_speeding_up(&self) -> bool {
        self.speed_up.is_some()
    }

    /// Game seconds per real second right now
    pub fn scale(&self) -> f64 {
        if self.speed_up.is_some() {
            self.speed_up_scale
        } else {
            self.time_scale
        }
    }

    /// Game time a frame of `real_seconds` will advance the clock by
    pub fn frame_delta(&self, real_seconds: f64) -> Duration {
        if self.stopped || !(real_seconds > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.scale() * real_seconds).unwrap_or_else(|_| {
            warn!("Frame of {} real seconds is out of range", real_seconds);
            Duration::ZERO
        })
    }

    /// Per-frame update driven by real elapsed time
    pub fn update(&mut self, real_seconds: f64) -> Duration {
        let delta = self.frame_delta(real_seconds);
        self.advance(delta);
        delta
    }

    /// Move the clock forward by `delta` of game time
    ///
    /// Fires one minute event per boundary crossed, hour and day events
    /// on the boundaries that coincide, then the time and late-time events
    /// exactly once. Finally checks whether a speed-up window has ended.
    pub fn advance(&mut self, delta: Duration) {
        self.last_delta = delta;
        if delta.is_zero() {
            return;
        }

        let target = self.current + delta;
        while self.current < target {
            let minute_index = self.current.as_secs() / SECONDS_PER_MINUTE + 1;
            let boundary = minutes(minute_index);
            if boundary > target {
                self.current = target;
                break;
            }

            self.current = boundary;
            self.on_minute_changed.emit(&boundary);
            if minute_index % MINUTES_PER_HOUR == 0 {
                self.on_hour_changed.emit(&boundary);
            }
            if minute_index % MINUTES_PER_DAY == 0 {
                self.on_day_changed.emit(&boundary);
            }
        }

        let now = self.current;
        self.on_time_changed.emit(&now);
        self.on_late_time_changed.emit(&now);

        self.poll_speed_up();
    }

    /// Speed up for `length` of game time, replacing any active window
    pub fn start_speed_up(&mut self, length: Duration) {
        self.stop_all_speed_ups();
        let ends_at = self.current + length;
        self.begin_speed_up(ends_at);
    }

    /// Speed up until the absolute game time `at`, replacing any active window
    ///
    /// Returns false (and starts nothing) if `at` is not in the future.
    pub fn start_speed_up_until(&mut self, at: Duration) -> bool {
        self.stop_all_speed_ups();
        if at <= self.current {
            debug!("Speed-up target {:?} already reached", at);
            return false;
        }
        self.begin_speed_up(at);
        true
    }

    fn begin_speed_up(&mut self, ends_at: Duration) {
        self.speed_up = Some(SpeedUp { ends_at });
        info!(
            "Speed-up started at {:?}, ends at {:?}",
            self.reading(),
            ClockReading::from_time(ends_at)
        );
        let now = self.current;
        self.on_speed_up_started.emit(&now);
    }

    /// End the speed-up window once its deadline is reached
    ///
    /// Returns true if the window ended during this poll.
    pub fn poll_speed_up(&mut self) -> bool {
        match self.speed_up {
            Some(speed_up) if self.current >= speed_up.ends_at => {
                self.stop_all_speed_ups();
                true
            }
            _ => false,
        }
    }

    /// Cancel the active speed-up window, if any
    pub fn stop_all_speed_ups(&mut self) {
        if self.speed_up.take().is_some() {
            info!("Speed-up ended at {:?}", self.reading());
            let now = self.current;
            self.on_speed_up_ended.emit(&now);
        }
    }

    /// Drop every subscriber on every event
    pub fn clear_subscribers(&mut self) {
        self.on_minute_changed.clear();
        self.on_hour_changed.clear();
        self.on_day_changed.clear();
        self.on_time_changed.clear();
        self.on_late_time_changed.clear();
        self.on_speed_up_started.clear();
        self.on_speed_up_ended.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn clock_at_midnight() -> GameTime {
        GameTime::new(&TimeConfig {
            start_minute: 0,
            ..TimeConfig::default()
        })
    }

    fn counter(signal: &mut Signal<Duration>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        signal.subscribe(move |_| c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_reading() {
        let reading = ClockReading::from_time(minutes(MINUTES_PER_DAY + 125));
        assert_eq!(reading, ClockReading { day: 1, hour: 2, minute: 5 });
    }

    #[test]
    fn test_update_scales_real_time() {
        let mut clock = clock_at_midnight();
        let delta = clock.update(2.0);
        assert_eq!(delta, minutes(2));
        assert_eq!(clock.time(), minutes(2));
    }

    #[test]
    fn test_unrepresentable_frames_do_not_move() {
        let mut clock = clock_at_midnight();
        assert_eq!(clock.update(f64::INFINITY), Duration::ZERO);
        assert_eq!(clock.update(f64::NAN), Duration::ZERO);

        clock.set_time_scale(f64::INFINITY);
        assert_eq!(clock.scale(), 60.0);
        assert_eq!(clock.update(1.0), minutes(1));
    }

    #[test]
    fn test_stopped_clock_does_not_move() {
        let mut clock = clock_at_midnight();
        let changed = counter(&mut clock.on_time_changed);
        clock.stop();
        assert_eq!(clock.update(10.0), Duration::ZERO);
        assert_eq!(clock.time(), Duration::ZERO);
        assert_eq!(changed.get(), 0);
    }

    #[test]
    fn test_partial_minute_fires_no_boundary() {
        let mut clock = clock_at_midnight();
        let minute = counter(&mut clock.on_minute_changed);
        let changed = counter(&mut clock.on_time_changed);

        clock.advance(Duration::from_secs(30));
        assert_eq!(minute.get(), 0);
        assert_eq!(changed.get(), 1);

        clock.advance(Duration::from_secs(30));
        assert_eq!(minute.get(), 1);
    }

    #[test]
    fn test_day_boundary() {
        let mut clock = GameTime::new(&TimeConfig {
            start_minute: MINUTES_PER_DAY - 1,
            ..TimeConfig::default()
        });
        let day = counter(&mut clock.on_day_changed);
        let hour = counter(&mut clock.on_hour_changed);
        clock.advance(minutes(1));
        assert_eq!(day.get(), 1);
        assert_eq!(hour.get(), 1);
        assert_eq!(clock.reading().day, 1);
    }

    #[test]
    fn test_speed_up_changes_scale_until_deadline() {
        let mut clock = clock_at_midnight();
        let started = counter(&mut clock.on_speed_up_started);
        let ended = counter(&mut clock.on_speed_up_ended);

        clock.start_speed_up(minutes(15));
        assert!(clock.is_speeding_up());
        assert_eq!(clock.update(1.0), minutes(10));
        assert!(clock.is_speeding_up());
        clock.update(1.0);
        assert!(!clock.is_speeding_up());
        assert_eq!(clock.update(1.0), minutes(1));

        assert_eq!(started.get(), 1);
        assert_eq!(ended.get(), 1);
    }

    #[test]
    fn test_restarting_speed_up_ends_previous() {
        let mut clock = clock_at_midnight();
        let started = counter(&mut clock.on_speed_up_started);
        let ended = counter(&mut clock.on_speed_up_ended);

        clock.start_speed_up(hours(1));
        clock.start_speed_up(hours(2));
        clock.stop_all_speed_ups();
        clock.stop_all_speed_ups();

        assert_eq!(started.get(), 2);
        assert_eq!(ended.get(), 2);
    }

    #[test]
    fn test_speed_up_until_past_time_is_rejected() {
        let mut clock = GameTime::new(&TimeConfig::default());
        assert!(!clock.start_speed_up_until(minutes(10)));
        assert!(!clock.is_speeding_up());
        assert!(clock.start_speed_up_until(clock.time() + hours(1)));
    }

    #[test]
    fn test_clear_subscribers() {
        let mut clock = clock_at_midnight();
        let minute = counter(&mut clock.on_minute_changed);
        clock.clear_subscribers();
        clock.advance(hours(1));
        assert_eq!(minute.get(), 0);
    }
}
