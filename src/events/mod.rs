//! Event plumbing shared by the clock and the survivor systems

pub mod signal;

pub use signal::Signal;
