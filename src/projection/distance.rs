//! Great-circle distance between geodetic samples

use crate::core::{GeoFix, EARTH_RADIUS_M};

/// Haversine distance between two fixes (meters)
///
/// Spherical model with the mean Earth radius; altitude is ignored. Degree
/// inputs are converted to radians here, at the function boundary.
pub fn distance_m(a: &GeoFix, b: &GeoFix) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let hav = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    let central_angle = 2.0 * hav.sqrt().atan2((1.0 - hav).sqrt());
    EARTH_RADIUS_M * central_angle
}
