//! Core data types for the geodetic acquisition core

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for fix validation
pub type FixResult<T> = Result<T, FixError>;

/// Validation errors for geodetic samples
#[derive(Debug, Clone, PartialEq)]
pub enum FixError {
    /// Latitude outside [-90, 90] degrees
    InvalidLatitude { value: f64 },
    /// Longitude outside [-180, 180] degrees
    InvalidLongitude { value: f64 },
    /// Accuracy radius negative or not finite
    InvalidAccuracy { value: f64 },
}

impl fmt::Display for FixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixError::InvalidLatitude { value } => {
                write!(f, "Invalid latitude {}: must be between -90 and 90 degrees", value)
            }
            FixError::InvalidLongitude { value } => {
                write!(f, "Invalid longitude {}: must be between -180 and 180 degrees", value)
            }
            FixError::InvalidAccuracy { value } => {
                write!(f, "Invalid accuracy {}: must be finite and non-negative", value)
            }
        }
    }
}

impl std::error::Error for FixError {}

/// A single geodetic position sample
///
/// Immutable once created. Latitude and longitude are decimal degrees;
/// altitude is meters above the reference ellipsoid and may be unknown
/// depending on the positioning provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in meters, if the provider supplied one
    pub altitude: Option<f64>,
    /// Horizontal accuracy radius (meters)
    pub accuracy_m: f64,
    /// Capture time (milliseconds since epoch)
    pub timestamp_ms: u64,
}

impl GeoFix {
    /// Create a fix from a latitude/longitude pair
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy_m: 0.0,
            timestamp_ms: 0,
        }
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude = Some(altitude_m);
        self
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Check that the sample lies in the valid geodetic range
    ///
    /// A fix failing validation is rejected by every consumer in this crate;
    /// it is never coerced to a default coordinate.
    pub fn validate(&self) -> FixResult<()> {
        if !self.latitude.is_finite() || self.latitude < -90.0 || self.latitude > 90.0 {
            return Err(FixError::InvalidLatitude { value: self.latitude });
        }

        if !self.longitude.is_finite() || self.longitude < -180.0 || self.longitude > 180.0 {
            return Err(FixError::InvalidLongitude { value: self.longitude });
        }

        if !self.accuracy_m.is_finite() || self.accuracy_m < 0.0 {
            return Err(FixError::InvalidAccuracy { value: self.accuracy_m });
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Display for GeoFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.altitude {
            Some(alt) => write!(f, "({:.6}, {:.6}, {:.1}m)", self.latitude, self.longitude, alt),
            None => write!(f, "({:.6}, {:.6})", self.latitude, self.longitude),
        }
    }
}

/// Cartesian offset relative to the session origin
///
/// East/north span the local tangent plane, up is the altitude difference.
/// Derived from a [`GeoFix`] pair and never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOffset {
    /// East coordinate (meters)
    pub east_m: f64,
    /// Up coordinate (meters)
    pub up_m: f64,
    /// North coordinate (meters)
    pub north_m: f64,
}

impl LocalOffset {
    pub const ZERO: LocalOffset = LocalOffset {
        east_m: 0.0,
        up_m: 0.0,
        north_m: 0.0,
    };

    pub fn new(east_m: f64, up_m: f64, north_m: f64) -> Self {
        Self { east_m, up_m, north_m }
    }

    /// Offset as an (east, up, north) vector
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.east_m, self.up_m, self.north_m)
    }

    /// Ground-plane distance from the origin (meters)
    pub fn horizontal_m(&self) -> f64 {
        (self.east_m * self.east_m + self.north_m * self.north_m).sqrt()
    }

    /// Straight-line distance from the origin (meters)
    pub fn magnitude_m(&self) -> f64 {
        self.to_vector3().norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_builder() {
        let fix = GeoFix::new(37.7749, -122.4194)
            .with_altitude(16.0)
            .with_accuracy(5.0)
            .with_timestamp(1000);

        assert_eq!(fix.latitude, 37.7749);
        assert_eq!(fix.longitude, -122.4194);
        assert_eq!(fix.altitude, Some(16.0));
        assert_eq!(fix.accuracy_m, 5.0);
        assert_eq!(fix.timestamp_ms, 1000);
        assert!(fix.is_valid());
    }

    #[test]
    fn test_fix_validation_rejects_out_of_range() {
        assert!(matches!(
            GeoFix::new(91.0, 0.0).validate(),
            Err(FixError::InvalidLatitude { .. })
        ));
        assert!(matches!(
            GeoFix::new(-90.5, 0.0).validate(),
            Err(FixError::InvalidLatitude { .. })
        ));
        assert!(matches!(
            GeoFix::new(0.0, 180.5).validate(),
            Err(FixError::InvalidLongitude { .. })
        ));
        assert!(matches!(
            GeoFix::new(0.0, f64::NAN).validate(),
            Err(FixError::InvalidLongitude { .. })
        ));
        assert!(matches!(
            GeoFix::new(0.0, 0.0).with_accuracy(-1.0).validate(),
            Err(FixError::InvalidAccuracy { .. })
        ));
    }

    #[test]
    fn test_fix_validation_accepts_boundaries() {
        assert!(GeoFix::new(90.0, 180.0).is_valid());
        assert!(GeoFix::new(-90.0, -180.0).is_valid());
    }

    #[test]
    fn test_offset_magnitudes() {
        let offset = LocalOffset::new(3.0, 12.0, 4.0);
        assert!((offset.horizontal_m() - 5.0).abs() < 1e-9);
        assert!((offset.magnitude_m() - 13.0).abs() < 1e-9);

        let v = offset.to_vector3();
        assert_eq!(v.x, 3.0);
        assert_eq!(v.y, 12.0);
        assert_eq!(v.z, 4.0);
    }
}
