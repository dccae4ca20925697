//! Equirectangular conversion between geodetic samples and local offsets

use crate::core::{GeoFix, LocalOffset, METERS_PER_DEGREE_LAT};

/// Cosine values below this are treated as a degenerate pole frame
const POLE_COS_EPSILON: f64 = 1e-9;

/// Project a target fix into the local tangent plane of `origin`
///
/// East scales one degree of longitude by the cosine of the origin latitude,
/// north scales one degree of latitude by [`METERS_PER_DEGREE_LAT`], up is
/// the altitude difference (0 when either side has no altitude). With the
/// origin at a pole the cosine term collapses; east is clamped to 0 instead
/// of propagating a non-finite value.
pub fn to_local(origin: &GeoFix, target: &GeoFix) -> LocalOffset {
    let cos_lat = origin.latitude.to_radians().cos();

    let east_m = if cos_lat.abs() < POLE_COS_EPSILON {
        0.0
    } else {
        (target.longitude - origin.longitude) * cos_lat * METERS_PER_DEGREE_LAT
    };

    let north_m = (target.latitude - origin.latitude) * METERS_PER_DEGREE_LAT;

    let up_m = match (target.altitude, origin.altitude) {
        (Some(target_alt), Some(origin_alt)) => target_alt - origin_alt,
        _ => 0.0,
    };

    LocalOffset { east_m, up_m, north_m }
}

/// Invert [`to_local`]: recover the geodetic sample at `offset` from `origin`
///
/// At a pole the east component carries no longitude information, so the
/// origin longitude is kept unchanged. The result inherits the origin
/// accuracy and timestamp; altitude is present only when the origin has one.
pub fn from_local(origin: &GeoFix, offset: &LocalOffset) -> GeoFix {
    let cos_lat = origin.latitude.to_radians().cos();

    let longitude = if cos_lat.abs() < POLE_COS_EPSILON {
        origin.longitude
    } else {
        origin.longitude + offset.east_m / (cos_lat * METERS_PER_DEGREE_LAT)
    };

    let latitude = origin.latitude + offset.north_m / METERS_PER_DEGREE_LAT;

    GeoFix {
        latitude,
        longitude,
        altitude: origin.altitude.map(|alt| alt + offset.up_m),
        accuracy_m: origin.accuracy_m,
        timestamp_ms: origin.timestamp_ms,
    }
}
