//! Physical constants and projection parameters

/// Mean Earth radius used by the haversine distance (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Ground distance covered by one degree of latitude (meters)
///
/// One degree of longitude covers the same distance at the equator and
/// shrinks with the cosine of the latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
