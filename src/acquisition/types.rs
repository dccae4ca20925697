//! Acquisition state vocabulary and session bookkeeping

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a recoverable or terminal failure was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// A required runtime permission was not granted
    PermissionDenied,
    /// The positioning service reported a hard failure during bring-up
    ServiceFailed,
    /// A running positioning service stopped reporting
    ServiceLost,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::PermissionDenied => write!(f, "permission-denied"),
            FailureReason::ServiceFailed => write!(f, "service-failed"),
            FailureReason::ServiceLost => write!(f, "service-lost"),
        }
    }
}

/// Current position of the acquisition sequence
///
/// Transitions are monotonic forward, with one exception: `Ready` and
/// `Failed(ServiceLost)` may alternate while the positioning service drops
/// and recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Sequence has not been started
    Idle,
    /// Waiting for required runtime permissions to be granted
    AwaitingPermissions,
    /// Waiting for the tracking subsystem to become ready
    AwaitingTracking,
    /// Waiting for the positioning service to produce its first fix
    AwaitingPositioning,
    /// Fixes are being captured
    Ready,
    /// Hardware cannot provide tracking
    Unsupported,
    /// Sequence failed; terminal unless the reason is recoverable
    Failed(FailureReason),
    /// Positioning wait budget ran out while the service was initializing
    TimedOut,
    /// The caller cancelled the sequence
    Cancelled,
}

impl AcquisitionState {
    /// Whether this attempt is over and only a caller-driven restart can
    /// leave the state
    pub fn is_terminal(&self) -> bool {
        match self {
            AcquisitionState::Unsupported
            | AcquisitionState::TimedOut
            | AcquisitionState::Cancelled
            | AcquisitionState::Failed(FailureReason::PermissionDenied)
            | AcquisitionState::Failed(FailureReason::ServiceFailed) => true,
            _ => false,
        }
    }

    /// Whether the machine can return to `Ready` in place from this state
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AcquisitionState::Failed(FailureReason::ServiceLost))
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionState::Idle => write!(f, "Idle"),
            AcquisitionState::AwaitingPermissions => write!(f, "AwaitingPermissions"),
            AcquisitionState::AwaitingTracking => write!(f, "AwaitingTracking"),
            AcquisitionState::AwaitingPositioning => write!(f, "AwaitingPositioning"),
            AcquisitionState::Ready => write!(f, "Ready"),
            AcquisitionState::Unsupported => write!(f, "Unsupported"),
            AcquisitionState::Failed(reason) => write!(f, "Failed({})", reason),
            AcquisitionState::TimedOut => write!(f, "TimedOut"),
            AcquisitionState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Session counters, updated as the machine is ticked
#[derive(Debug, Clone, Default)]
pub struct AcquisitionStats {
    /// Ticks driven by the caller
    pub ticks: u64,
    /// Fixes that passed validation and were published
    pub fixes_accepted: u32,
    /// Fixes rejected by validation
    pub fixes_rejected: u32,
    /// In-place recoveries from a lost positioning service
    pub recoveries: u32,
    /// Capture time of the last accepted fix
    pub last_fix_timestamp_ms: Option<u64>,
}

/// Logging levels for acquisition diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and info messages
    Info,
    /// All messages including debug
    Debug,
}

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub(crate) fn new(id: u32) -> Self {
        CallbackHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}
