//! Waypoint storage with origin-relative offsets

use crate::core::{FixError, GeoFix, LocalOffset};
use crate::projection;
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Result type for waypoint operations
pub type WaypointResult<T> = Result<T, WaypointError>;

/// Waypoint operation errors
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointError {
    /// An offset was requested before an origin was established
    NoOrigin,
    /// The label is not present in the store
    MissingWaypoint { label: String },
    /// The fix failed geodetic validation
    InvalidFix(FixError),
}

impl fmt::Display for WaypointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointError::NoOrigin => {
                write!(f, "No origin established for local offsets")
            }
            WaypointError::MissingWaypoint { label } => {
                write!(f, "No waypoint stored under label '{}'", label)
            }
            WaypointError::InvalidFix(error) => write!(f, "Invalid fix: {}", error),
        }
    }
}

impl std::error::Error for WaypointError {}

impl From<FixError> for WaypointError {
    fn from(error: FixError) -> Self {
        WaypointError::InvalidFix(error)
    }
}

/// A named position derived from an accepted fix
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    label: String,
    fix: GeoFix,
    offset: LocalOffset,
    origin_epoch: u64,
    set_at_ms: u64,
}

impl Waypoint {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fix(&self) -> &GeoFix {
        &self.fix
    }

    /// When this label was last assigned (milliseconds since epoch)
    pub fn set_at_ms(&self) -> u64 {
        self.set_at_ms
    }
}

/// Label → waypoint mapping over a single session origin
///
/// The store consumes fixes and the origin; it never drives acquisition.
/// Offsets are cached per waypoint and recomputed when the origin changes,
/// so a read can never observe an offset projected against a stale origin.
#[derive(Default)]
pub struct WaypointStore {
    origin: Option<GeoFix>,
    /// Bumped whenever the origin is cleared or re-established
    origin_epoch: u64,
    waypoints: HashMap<String, Waypoint>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the local-frame origin
    ///
    /// First wins: when an origin is already set the call is a no-op and
    /// returns `false`. Clearing explicitly is the only way to replace it.
    pub fn set_origin(&mut self, fix: GeoFix) -> WaypointResult<bool> {
        fix.validate()?;

        if self.origin.is_some() {
            return Ok(false);
        }

        self.origin = Some(fix);
        self.origin_epoch += 1;
        Ok(true)
    }

    /// Drop the origin, invalidating every cached offset
    pub fn clear_origin(&mut self) -> bool {
        if self.origin.take().is_some() {
            self.origin_epoch += 1;
            true
        } else {
            false
        }
    }

    pub fn origin(&self) -> Option<&GeoFix> {
        self.origin.as_ref()
    }

    /// Store or overwrite the waypoint for `label`
    ///
    /// The fix is validated and projected against the current origin before
    /// anything is written, so a failed call leaves the prior waypoint
    /// untouched. Re-setting a label with the identical fix keeps its
    /// original `set_at` time.
    pub fn set(&mut self, label: &str, fix: GeoFix) -> WaypointResult<&Waypoint> {
        fix.validate()?;

        let origin = self.origin.as_ref().ok_or(WaypointError::NoOrigin)?;
        let offset = projection::to_local(origin, &fix);

        let set_at_ms = match self.waypoints.get(label) {
            Some(existing) if existing.fix == fix => existing.set_at_ms,
            _ => now_ms(),
        };

        let waypoint = Waypoint {
            label: label.to_string(),
            fix,
            offset,
            origin_epoch: self.origin_epoch,
            set_at_ms,
        };

        self.waypoints.insert(label.to_string(), waypoint);
        Ok(&self.waypoints[label])
    }

    pub fn get(&self, label: &str) -> Option<&Waypoint> {
        self.waypoints.get(label)
    }

    /// Local offset of a waypoint relative to the current origin
    ///
    /// Recomputes lazily when the origin changed since the waypoint was
    /// projected; a stale cached offset is never returned.
    pub fn offset(&mut self, label: &str) -> WaypointResult<LocalOffset> {
        let origin_epoch = self.origin_epoch;
        let origin = self.origin.clone().ok_or(WaypointError::NoOrigin)?;

        let waypoint = self
            .waypoints
            .get_mut(label)
            .ok_or_else(|| WaypointError::MissingWaypoint {
                label: label.to_string(),
            })?;

        if waypoint.origin_epoch != origin_epoch {
            waypoint.offset = projection::to_local(&origin, &waypoint.fix);
            waypoint.origin_epoch = origin_epoch;
        }

        Ok(waypoint.offset)
    }

    /// Great-circle distance between two stored waypoints (meters)
    pub fn distance_between(&self, label_a: &str, label_b: &str) -> WaypointResult<f64> {
        let a = self
            .get(label_a)
            .ok_or_else(|| WaypointError::MissingWaypoint {
                label: label_a.to_string(),
            })?;
        let b = self
            .get(label_b)
            .ok_or_else(|| WaypointError::MissingWaypoint {
                label: label_b.to_string(),
            })?;

        Ok(projection::distance_m(&a.fix, &b.fix))
    }

    pub fn remove(&mut self, label: &str) -> bool {
        self.waypoints.remove(label).is_some()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.waypoints.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Remove every waypoint; the origin is untouched
    pub fn clear(&mut self) {
        self.waypoints.clear();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
