//! Labeled waypoints derived from accepted fixes

pub mod store;

pub use store::{Waypoint, WaypointError, WaypointResult, WaypointStore};

/// Marker for the device's latest position
pub const LABEL_CURRENT: &str = "current";
/// Marker for the navigation target
pub const LABEL_DESTINATION: &str = "destination";
/// Marker for a saved reference point
pub const LABEL_STORED: &str = "stored";
