//! Utility modules for configuration

pub mod config;

pub use config::{AcquisitionConfig, ConfigError, SessionConfig, SimulationConfig};
