pub mod config;
pub mod error;
pub mod types;

pub use config::SurvivalConfig;
pub use error::{Result, SurvivalError};
