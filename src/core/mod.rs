//! Core types and constants for the geodetic acquisition core

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
