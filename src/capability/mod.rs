//! Host capability abstractions
//!
//! The acquisition core consumes three capabilities the host environment
//! supplies: a spatial tracking subsystem, a geolocation service, and the
//! platform permission gate. The core only polls these interfaces; it never
//! owns their lifecycle or performs sensor I/O itself.

pub mod simulated;

pub use simulated::{SimulatedPermissions, SimulatedPositioning, SimulatedTracking};

use crate::core::GeoFix;

/// Readiness of the spatial tracking subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// Subsystem has not been started
    NotStarted,
    /// Subsystem is starting up
    Initializing,
    /// Subsystem is tracking
    Ready,
    /// Hardware cannot provide tracking
    Unsupported,
    /// Subsystem ended in an error state
    Error,
}

/// Status of the geolocation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositioningStatus {
    /// Service is not running
    Stopped,
    /// Service is acquiring its first fix
    Initializing,
    /// Service is running and fixes are available
    Running,
    /// Service reported a hard failure
    Failed,
}

/// Runtime permissions the acquisition sequence depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Camera access for the tracking subsystem
    Camera,
    /// Fine-grained location access for the positioning service
    FineLocation,
}

impl Permission {
    /// Every permission the live acquisition sequence requires
    pub const ALL: [Permission; 2] = [Permission::Camera, Permission::FineLocation];
}

/// Spatial tracking readiness, polled once per acquisition tick
pub trait TrackingCapability {
    /// Current subsystem state
    fn state(&mut self) -> TrackingState;
}

/// Geolocation service control and fix access
pub trait PositioningCapability {
    /// Whether the user has enabled location services on the device
    fn is_enabled_by_user(&self) -> bool;

    /// Start the service with the given accuracy and update-distance hints (meters)
    fn start(&mut self, desired_accuracy_m: f64, update_distance_m: f64);

    /// Current service status
    fn status(&mut self) -> PositioningStatus;

    /// Latest fix the service produced, if any
    fn last_fix(&self) -> Option<GeoFix>;

    /// Stop the service
    fn stop(&mut self);
}

/// Platform permission gate
///
/// `request` is fire-and-forget: the grant result is only observable through
/// subsequent [`PermissionCapability::has`] polls.
pub trait PermissionCapability {
    /// Whether the permission is currently granted
    fn has(&self, permission: Permission) -> bool;

    /// Ask the platform to prompt for the permission
    fn request(&mut self, permission: Permission);
}
