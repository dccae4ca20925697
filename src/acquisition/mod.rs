//! Acquisition sequencing for tracking and positioning bring-up
//!
//! A poll-driven state machine enforces the ordered bring-up of the host
//! capabilities: permissions, then tracking readiness, then positioning
//! readiness, with wait budgets and cancellation at every suspension point.

pub mod types;
pub mod machine;

pub use types::{AcquisitionState, AcquisitionStats, CallbackHandle, FailureReason, LogLevel};
pub use machine::{AcquisitionStateMachine, FixCallback, StateCallback};
