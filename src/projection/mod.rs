//! Geodetic to local-frame coordinate projection
//!
//! Converts raw latitude/longitude samples into a Cartesian frame anchored
//! at a session origin, and measures great-circle distances between samples.
//! The local conversion uses an equirectangular small-area approximation,
//! which holds for object placement within a few hundred meters of the
//! origin; it is not a survey-grade projection.

pub mod local_frame;
pub mod distance;

pub use local_frame::{from_local, to_local};
pub use distance::distance_m;
