//! Simulated capability implementations for development and testing
//!
//! These stand in for the host tracking/positioning/permission services when
//! no live hardware is available (editor runs, unit tests). They satisfy the
//! same traits as the live capabilities and support scripted status
//! sequences so callers can exercise every acquisition path.

use crate::capability::{
    Permission, PermissionCapability, PositioningCapability, PositioningStatus,
    TrackingCapability, TrackingState,
};
use crate::core::{GeoFix, METERS_PER_DEGREE_LAT};
use std::collections::{HashSet, VecDeque};

/// Simulated geolocation service serving a fixed configured sample
pub struct SimulatedPositioning {
    fix: GeoFix,
    enabled: bool,
    started: bool,
    hard_fail: bool,
    current: PositioningStatus,
    settle_polls: u32,
    remaining_settle: u32,
    status_script: VecDeque<PositioningStatus>,
    jitter_m: f64,
    start_calls: u32,
    poll_ticks: u64,
}

impl SimulatedPositioning {
    /// Create a simulated service that settles into `Running` after
    /// `settle_polls` status polls spent in `Initializing`
    pub fn new(fix: GeoFix, settle_polls: u32) -> Self {
        Self {
            fix,
            enabled: true,
            started: false,
            hard_fail: false,
            current: PositioningStatus::Stopped,
            settle_polls,
            remaining_settle: 0,
            status_script: VecDeque::new(),
            jitter_m: 0.0,
            start_calls: 0,
            poll_ticks: 0,
        }
    }

    /// Service the user has switched off in device settings
    pub fn disabled(fix: GeoFix) -> Self {
        let mut positioning = Self::new(fix, 0);
        positioning.enabled = false;
        positioning
    }

    /// Service that reports a hard failure once started
    pub fn failing(fix: GeoFix) -> Self {
        let mut positioning = Self::new(fix, 0);
        positioning.hard_fail = true;
        positioning
    }

    /// Add random horizontal noise (up to `jitter_m` meters) to served fixes
    pub fn with_jitter(mut self, jitter_m: f64) -> Self {
        self.jitter_m = jitter_m.max(0.0);
        self
    }

    /// Queue an explicit status to be returned by the next poll
    ///
    /// Scripted statuses take precedence over the settle countdown; once the
    /// script drains the last scripted status sticks.
    pub fn queue_status(&mut self, status: PositioningStatus) {
        self.status_script.push_back(status);
    }

    /// Queue a run of statuses
    pub fn queue_statuses<I: IntoIterator<Item = PositioningStatus>>(&mut self, statuses: I) {
        self.status_script.extend(statuses);
    }

    /// Number of times `start` was called
    pub fn start_calls(&self) -> u32 {
        self.start_calls
    }

    /// Move the simulated device to a new position
    pub fn set_fix(&mut self, fix: GeoFix) {
        self.fix = fix;
    }

    fn jittered_fix(&self) -> GeoFix {
        let mut fix = self.fix.clone().with_timestamp(self.fix.timestamp_ms + self.poll_ticks * 1000);

        if self.jitter_m > 0.0 {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            let jitter_deg = self.jitter_m / METERS_PER_DEGREE_LAT;
            fix.latitude += rng.gen_range(-jitter_deg..=jitter_deg);
            fix.longitude += rng.gen_range(-jitter_deg..=jitter_deg);
        }

        fix
    }
}

impl PositioningCapability for SimulatedPositioning {
    fn is_enabled_by_user(&self) -> bool {
        self.enabled
    }

    fn start(&mut self, _desired_accuracy_m: f64, _update_distance_m: f64) {
        self.start_calls += 1;
        self.started = true;
        self.remaining_settle = self.settle_polls;
        self.current = if self.hard_fail {
            PositioningStatus::Failed
        } else {
            PositioningStatus::Initializing
        };
    }

    fn status(&mut self) -> PositioningStatus {
        self.poll_ticks += 1;

        if let Some(scripted) = self.status_script.pop_front() {
            self.current = scripted;
            return self.current;
        }

        if !self.started {
            return PositioningStatus::Stopped;
        }

        if self.current == PositioningStatus::Initializing {
            if self.remaining_settle > 0 {
                self.remaining_settle -= 1;
            } else {
                self.current = PositioningStatus::Running;
            }
        }

        self.current
    }

    fn last_fix(&self) -> Option<GeoFix> {
        if self.started {
            Some(self.jittered_fix())
        } else {
            None
        }
    }

    fn stop(&mut self) {
        self.started = false;
        self.current = PositioningStatus::Stopped;
    }
}

/// Simulated spatial tracking subsystem
pub struct SimulatedTracking {
    current: TrackingState,
    remaining_init: u32,
    state_script: VecDeque<TrackingState>,
    polls: u32,
}

impl SimulatedTracking {
    /// Tracking that is ready immediately
    pub fn new() -> Self {
        Self {
            current: TrackingState::Ready,
            remaining_init: 0,
            state_script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Tracking that reports `Initializing` for `polls` polls before `Ready`
    pub fn initializing_for(polls: u32) -> Self {
        Self {
            current: TrackingState::Initializing,
            remaining_init: polls,
            state_script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Hardware without tracking support
    pub fn unsupported() -> Self {
        Self {
            current: TrackingState::Unsupported,
            remaining_init: 0,
            state_script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Queue an explicit state for the next poll
    pub fn queue_state(&mut self, state: TrackingState) {
        self.state_script.push_back(state);
    }

    /// Number of times `state` was polled
    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl Default for SimulatedTracking {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingCapability for SimulatedTracking {
    fn state(&mut self) -> TrackingState {
        self.polls += 1;

        if let Some(scripted) = self.state_script.pop_front() {
            self.current = scripted;
            return self.current;
        }

        if self.current == TrackingState::Initializing {
            if self.remaining_init > 0 {
                self.remaining_init -= 1;
            } else {
                self.current = TrackingState::Ready;
            }
        }

        self.current
    }
}

/// Simulated platform permission gate
pub struct SimulatedPermissions {
    granted: HashSet<Permission>,
    grant_on_request: bool,
    requests: Vec<Permission>,
}

impl SimulatedPermissions {
    /// Every required permission already granted
    pub fn granted() -> Self {
        Self {
            granted: Permission::ALL.into_iter().collect(),
            grant_on_request: false,
            requests: Vec::new(),
        }
    }

    /// Permissions permanently denied; requests have no effect
    pub fn denied() -> Self {
        Self {
            granted: HashSet::new(),
            grant_on_request: false,
            requests: Vec::new(),
        }
    }

    /// Nothing granted up front; the user accepts each prompt, so a request
    /// becomes visible as granted on the next `has` poll
    pub fn prompting() -> Self {
        Self {
            granted: HashSet::new(),
            grant_on_request: true,
            requests: Vec::new(),
        }
    }

    /// Permissions that were requested, in order
    pub fn requests(&self) -> &[Permission] {
        &self.requests
    }
}

impl PermissionCapability for SimulatedPermissions {
    fn has(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    fn request(&mut self, permission: Permission) {
        self.requests.push(permission);
        if self.grant_on_request {
            self.granted.insert(permission);
        }
    }
}
