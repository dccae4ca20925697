//! Geodetic Acquisition and Local-Frame Projection Core
//!
//! Brings up a spatial tracking subsystem and a device positioning service
//! through a poll-driven state machine with permission gating, wait budgets,
//! and a simulated fallback source, then converts accepted geodetic fixes
//! into a local Cartesian frame for object placement and records labeled
//! waypoints derived from them.
//!
//! The host 3D/AR runtime, permission dialogs, and actual sensors stay
//! outside: the core only polls the capability traits in [`capability`].

pub mod core;
pub mod projection;
pub mod capability;
pub mod acquisition;
pub mod waypoint;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    FixError, FixResult, GeoFix, LocalOffset, EARTH_RADIUS_M, METERS_PER_DEGREE_LAT,
};
pub use projection::{distance_m, from_local, to_local};
pub use capability::{
    Permission, PermissionCapability, PositioningCapability, PositioningStatus,
    SimulatedPermissions, SimulatedPositioning, SimulatedTracking, TrackingCapability,
    TrackingState,
};
pub use acquisition::{
    AcquisitionState, AcquisitionStateMachine, AcquisitionStats, CallbackHandle, FailureReason,
    FixCallback, LogLevel, StateCallback,
};
pub use waypoint::{
    Waypoint, WaypointError, WaypointResult, WaypointStore, LABEL_CURRENT, LABEL_DESTINATION,
    LABEL_STORED,
};
pub use utils::config::{AcquisitionConfig, ConfigError, SessionConfig, SimulationConfig};
