//! Session configuration with JSON file persistence

use crate::acquisition::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "Configuration I/O error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Configuration serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Acquisition sequencing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Accuracy hint passed to the positioning service (meters)
    pub desired_accuracy_m: f64,
    /// Minimum movement between position updates (meters)
    pub update_distance_m: f64,
    /// Ticks to wait for the positioning service to leave Initializing
    pub positioning_wait_ticks: u32,
    /// Ticks to wait for requested permissions to be granted
    pub permission_wait_ticks: u32,
    /// Whether this platform gates the capabilities behind runtime grants
    pub require_permissions: bool,
    /// Diagnostic verbosity
    pub log_level: LogLevel,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            desired_accuracy_m: 1.0,
            update_distance_m: 1.0,
            positioning_wait_ticks: 30,
            permission_wait_ticks: 30,
            require_permissions: true,
            log_level: LogLevel::Info,
        }
    }
}

/// Simulated-source parameters for runs without live positioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated latitude in decimal degrees
    pub latitude: f64,
    /// Simulated longitude in decimal degrees
    pub longitude: f64,
    /// Artificial settle delay before the machine reports Ready (ticks)
    pub settle_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        // San Francisco, the conventional development location
        Self {
            latitude: 37.7749,
            longitude: -122.4194,
            settle_ticks: 1,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Acquisition sequencing parameters
    pub acquisition: AcquisitionConfig,
    /// Present when the session should run against a simulated source
    pub simulation: Option<SimulationConfig>,
}

impl SessionConfig {
    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|error| ConfigError::IoError {
            message: error.to_string(),
        })?;

        let config: SessionConfig =
            serde_json::from_str(&contents).map_err(|error| ConfigError::SerializationError {
                message: error.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|error| ConfigError::SerializationError {
                message: error.to_string(),
            })?;

        fs::write(path, contents).map_err(|error| ConfigError::IoError {
            message: error.to_string(),
        })
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.acquisition.desired_accuracy_m.is_finite()
            || self.acquisition.desired_accuracy_m <= 0.0
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "desired_accuracy_m".to_string(),
                value: self.acquisition.desired_accuracy_m.to_string(),
                reason: "must be a positive number of meters".to_string(),
            });
        }

        if !self.acquisition.update_distance_m.is_finite()
            || self.acquisition.update_distance_m < 0.0
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "update_distance_m".to_string(),
                value: self.acquisition.update_distance_m.to_string(),
                reason: "must be zero or a positive number of meters".to_string(),
            });
        }

        if self.acquisition.positioning_wait_ticks == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "positioning_wait_ticks".to_string(),
                value: "0".to_string(),
                reason: "the wait budget needs at least one tick".to_string(),
            });
        }

        if let Some(simulation) = &self.simulation {
            if simulation.latitude < -90.0 || simulation.latitude > 90.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "simulation.latitude".to_string(),
                    value: simulation.latitude.to_string(),
                    reason: "must be between -90 and 90 degrees".to_string(),
                });
            }

            if simulation.longitude < -180.0 || simulation.longitude > 180.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "simulation.longitude".to_string(),
                    value: simulation.longitude.to_string(),
                    reason: "must be between -180 and 180 degrees".to_string(),
                });
            }
        }

        Ok(())
    }
}
