//! Game clock and deadline scheduling

pub mod clock;
pub mod context;
pub mod scheduler;

pub use clock::{hours, minutes, ClockReading, GameTime};
pub use context::{FrameReport, TimeContext};
pub use scheduler::{Process, ProcessScheduler, Scheduled};
