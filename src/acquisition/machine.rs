//! Poll-driven acquisition state machine
//!
//! Brings up the tracking subsystem and the positioning service in order,
//! gating on runtime permissions and wait budgets, and publishes every
//! accepted fix to registered consumers. The machine performs no blocking
//! I/O and never sleeps: the caller drives it with one `tick()` per
//! scheduling interval (nominally one second) and observes progress through
//! `state()`.

use crate::acquisition::types::{
    AcquisitionState, AcquisitionStats, CallbackHandle, FailureReason, LogLevel,
};
use crate::capability::{
    Permission, PermissionCapability, PositioningCapability, PositioningStatus,
    SimulatedPermissions, SimulatedPositioning, SimulatedTracking, TrackingCapability,
    TrackingState,
};
use crate::core::{FixResult, GeoFix};
use crate::utils::config::{AcquisitionConfig, SimulationConfig};
use std::collections::HashMap;

/// Callback invoked with every accepted fix
pub type FixCallback = Box<dyn FnMut(&GeoFix)>;

/// Callback invoked with (previous, next) on every state transition
pub type StateCallback = Box<dyn FnMut(AcquisitionState, AcquisitionState)>;

/// Simulation bring-up bookkeeping
struct SimulationRun {
    settle_ticks_left: u32,
    settle_ticks_total: u32,
}

/// Ordered bring-up of tracking and positioning readiness
///
/// Owns the session origin and the current acquisition state exclusively.
/// Terminal states are never left on their own; restarting after
/// `TimedOut`, `Failed`, `Unsupported`, or `Cancelled` is the caller's
/// decision, made explicit through [`AcquisitionStateMachine::reset`].
pub struct AcquisitionStateMachine {
    /// Tracking subsystem capability
    tracking: Box<dyn TrackingCapability>,
    /// Positioning service capability
    positioning: Box<dyn PositioningCapability>,
    /// Platform permission gate
    permissions: Box<dyn PermissionCapability>,
    /// Acquisition parameters
    config: AcquisitionConfig,
    /// Present when running against a simulated source
    simulation: Option<SimulationRun>,
    /// Current acquisition state
    state: AcquisitionState,
    /// First accepted fix of the session; local frame zero point
    origin: Option<GeoFix>,
    /// Latest accepted fix
    current_fix: Option<GeoFix>,
    /// Whether `start` has been called for this attempt
    started: bool,
    /// Whether the positioning service was started and needs stopping
    positioning_started: bool,
    /// Remaining permission wait budget (ticks)
    permission_ticks_left: u32,
    /// Remaining positioning wait budget (ticks)
    positioning_ticks_left: u32,
    /// Callback handle counter
    callback_counter: u32,
    /// Fix consumers
    fix_callbacks: HashMap<CallbackHandle, FixCallback>,
    /// State-transition consumers
    state_callbacks: HashMap<CallbackHandle, StateCallback>,
    /// Session counters
    stats: AcquisitionStats,
}

impl AcquisitionStateMachine {
    /// Create a machine over live host capabilities
    pub fn new(
        config: AcquisitionConfig,
        tracking: Box<dyn TrackingCapability>,
        positioning: Box<dyn PositioningCapability>,
        permissions: Box<dyn PermissionCapability>,
    ) -> Self {
        Self {
            tracking,
            positioning,
            permissions,
            config,
            simulation: None,
            state: AcquisitionState::Idle,
            origin: None,
            current_fix: None,
            started: false,
            positioning_started: false,
            permission_ticks_left: 0,
            positioning_ticks_left: 0,
            callback_counter: 0,
            fix_callbacks: HashMap::new(),
            state_callbacks: HashMap::new(),
            stats: AcquisitionStats::default(),
        }
    }

    /// Create a machine over a simulated source
    ///
    /// Permission, tracking, and positioning gating are bypassed: after the
    /// configured settle delay the machine goes straight to `Ready`, with
    /// the simulated fix as both origin and perpetual current sample.
    /// Fails when the configured coordinates are not a valid fix.
    pub fn with_simulation(
        config: AcquisitionConfig,
        simulation: &SimulationConfig,
    ) -> FixResult<Self> {
        let fix = GeoFix::new(simulation.latitude, simulation.longitude)
            .with_accuracy(config.desired_accuracy_m);
        fix.validate()?;

        let mut machine = Self::new(
            config,
            Box::new(SimulatedTracking::new()),
            Box::new(SimulatedPositioning::new(fix, 0)),
            Box::new(SimulatedPermissions::granted()),
        );
        machine.simulation = Some(SimulationRun {
            settle_ticks_left: simulation.settle_ticks,
            settle_ticks_total: simulation.settle_ticks,
        });

        Ok(machine)
    }

    /// Begin the acquisition sequence
    ///
    /// No-op unless the machine is `Idle`. In live mode this requests any
    /// missing permissions and moves to the first wait state; the simulated
    /// path stays `Idle` until its settle delay has elapsed.
    pub fn start(&mut self) -> AcquisitionState {
        if self.started || self.state != AcquisitionState::Idle {
            self.log(LogLevel::Warn, "start ignored: sequence already started");
            return self.state;
        }

        self.started = true;

        if self.simulation.is_some() {
            self.log(LogLevel::Info, "starting with simulated source");
            return self.state;
        }

        if self.config.require_permissions {
            let missing: Vec<Permission> = Permission::ALL
                .into_iter()
                .filter(|p| !self.permissions.has(*p))
                .collect();

            if !missing.is_empty() {
                for permission in missing {
                    self.log(LogLevel::Info, &format!("requesting permission {:?}", permission));
                    self.permissions.request(permission);
                }
                self.permission_ticks_left = self.config.permission_wait_ticks;
                self.transition(AcquisitionState::AwaitingPermissions);
                return self.state;
            }
        }

        self.enter_awaiting_tracking();
        self.state
    }

    /// Advance the sequence by one scheduling tick
    ///
    /// All waiting happens between calls; the machine only inspects the
    /// capabilities and moves at most one step per tick.
    pub fn tick(&mut self) -> AcquisitionState {
        self.stats.ticks += 1;

        match self.state {
            AcquisitionState::Idle => self.tick_idle(),
            AcquisitionState::AwaitingPermissions => self.tick_awaiting_permissions(),
            AcquisitionState::AwaitingTracking => self.tick_awaiting_tracking(),
            AcquisitionState::AwaitingPositioning => self.tick_awaiting_positioning(),
            AcquisitionState::Ready => self.tick_ready(),
            AcquisitionState::Failed(FailureReason::ServiceLost) => self.tick_service_lost(),
            // Terminal states hold until the caller resets
            _ => {}
        }

        self.state
    }

    /// Cancel the sequence at the current suspension point
    ///
    /// Leaves the machine in the terminal `Cancelled` state; an origin is
    /// either fully set from a previously accepted fix or not set at all.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        if self.positioning_started {
            self.positioning.stop();
            self.positioning_started = false;
        }

        self.log(LogLevel::Info, "sequence cancelled");
        self.transition(AcquisitionState::Cancelled);
    }

    /// Explicitly restart: clear the origin and return to `Idle`
    ///
    /// The machine never does this on its own; after a terminal state the
    /// caller decides whether to run the sequence again.
    pub fn reset(&mut self) {
        if self.positioning_started {
            self.positioning.stop();
            self.positioning_started = false;
        }

        self.started = false;
        self.origin = None;
        self.current_fix = None;
        self.permission_ticks_left = 0;
        self.positioning_ticks_left = 0;
        if let Some(sim) = &mut self.simulation {
            sim.settle_ticks_left = sim.settle_ticks_total;
        }
        self.stats = AcquisitionStats::default();

        self.log(LogLevel::Info, "sequence reset");
        self.transition(AcquisitionState::Idle);
    }

    /// Current acquisition state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Latest accepted fix, if any
    pub fn current_fix(&self) -> Option<&GeoFix> {
        self.current_fix.as_ref()
    }

    /// The session origin, set by the first accepted fix
    pub fn origin(&self) -> Option<&GeoFix> {
        self.origin.as_ref()
    }

    /// Session counters
    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    /// Acquisition parameters
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Register a consumer for accepted fixes
    pub fn on_fix(&mut self, callback: FixCallback) -> CallbackHandle {
        let handle = self.next_handle();
        self.fix_callbacks.insert(handle, callback);
        handle
    }

    /// Register a consumer for state transitions
    pub fn on_state_change(&mut self, callback: StateCallback) -> CallbackHandle {
        let handle = self.next_handle();
        self.state_callbacks.insert(handle, callback);
        handle
    }

    /// Remove a previously registered callback
    pub fn remove_callback(&mut self, handle: CallbackHandle) -> bool {
        self.fix_callbacks.remove(&handle).is_some()
            || self.state_callbacks.remove(&handle).is_some()
    }

    fn tick_idle(&mut self) {
        if !self.started {
            return;
        }

        // Only the simulated path idles after start: it is settling
        let settled = match &mut self.simulation {
            Some(sim) => {
                if sim.settle_ticks_left > 0 {
                    sim.settle_ticks_left -= 1;
                }
                sim.settle_ticks_left == 0
            }
            None => false,
        };

        if settled {
            self.positioning.start(
                self.config.desired_accuracy_m,
                self.config.update_distance_m,
            );
            self.positioning_started = true;
            self.accept_latest_fix();
            self.transition(AcquisitionState::Ready);
        }
    }

    fn tick_awaiting_permissions(&mut self) {
        let granted = Permission::ALL.into_iter().all(|p| self.permissions.has(p));

        if granted {
            self.log(LogLevel::Info, "permissions granted");
            self.enter_awaiting_tracking();
            return;
        }

        if self.permission_ticks_left > 0 {
            self.permission_ticks_left -= 1;
            self.log(
                LogLevel::Debug,
                &format!("waiting for permissions, {} ticks left", self.permission_ticks_left),
            );
        }

        if self.permission_ticks_left == 0 {
            self.log(LogLevel::Error, "required permissions were not granted");
            self.transition(AcquisitionState::Failed(FailureReason::PermissionDenied));
        }
    }

    fn tick_awaiting_tracking(&mut self) {
        match self.tracking.state() {
            TrackingState::Ready => self.enter_awaiting_positioning(),
            TrackingState::Unsupported => {
                self.log(LogLevel::Error, "tracking is not supported on this hardware");
                self.transition(AcquisitionState::Unsupported);
            }
            TrackingState::Error => {
                self.log(LogLevel::Error, "tracking subsystem failed to initialize");
                self.transition(AcquisitionState::Failed(FailureReason::ServiceFailed));
            }
            // No fixed timeout here: tracking startup time is hardware-dependent
            TrackingState::NotStarted | TrackingState::Initializing => {
                self.log(LogLevel::Debug, "waiting for tracking subsystem");
            }
        }
    }

    fn tick_awaiting_positioning(&mut self) {
        match self.positioning.status() {
            PositioningStatus::Running => {
                self.log(LogLevel::Info, "positioning service running");
                self.accept_latest_fix();
                self.transition(AcquisitionState::Ready);
            }
            PositioningStatus::Failed => {
                self.log(LogLevel::Error, "positioning service failed to initialize");
                self.transition(AcquisitionState::Failed(FailureReason::ServiceFailed));
            }
            PositioningStatus::Stopped => {
                self.log(LogLevel::Error, "positioning service stopped during bring-up");
                self.transition(AcquisitionState::Failed(FailureReason::ServiceFailed));
            }
            PositioningStatus::Initializing => {
                if self.positioning_ticks_left > 0 {
                    self.positioning_ticks_left -= 1;
                    self.log(
                        LogLevel::Debug,
                        &format!(
                            "initializing positioning, {} ticks left",
                            self.positioning_ticks_left
                        ),
                    );
                }

                if self.positioning_ticks_left == 0 {
                    self.log(LogLevel::Error, "positioning initialization timed out");
                    self.positioning.stop();
                    self.positioning_started = false;
                    self.transition(AcquisitionState::TimedOut);
                }
            }
        }
    }

    fn tick_ready(&mut self) {
        match self.positioning.status() {
            PositioningStatus::Running => self.accept_latest_fix(),
            status => {
                self.log(
                    LogLevel::Warn,
                    &format!("positioning service lost (status {:?})", status),
                );
                self.transition(AcquisitionState::Failed(FailureReason::ServiceLost));
            }
        }
    }

    fn tick_service_lost(&mut self) {
        // Recover in place: a successful poll returns to Ready without
        // restarting the bring-up sequence
        if self.positioning.status() == PositioningStatus::Running {
            self.stats.recoveries += 1;
            self.log(LogLevel::Info, "positioning service recovered");
            self.accept_latest_fix();
            self.transition(AcquisitionState::Ready);
        }
    }

    fn enter_awaiting_tracking(&mut self) {
        self.transition(AcquisitionState::AwaitingTracking);
    }

    fn enter_awaiting_positioning(&mut self) {
        if !self.positioning.is_enabled_by_user() {
            self.log(LogLevel::Error, "location services are disabled in device settings");
            self.transition(AcquisitionState::Failed(FailureReason::ServiceFailed));
            return;
        }

        self.positioning.start(
            self.config.desired_accuracy_m,
            self.config.update_distance_m,
        );
        self.positioning_started = true;
        self.positioning_ticks_left = self.config.positioning_wait_ticks;
        self.transition(AcquisitionState::AwaitingPositioning);
    }

    /// Capture, validate, and publish the service's latest fix
    ///
    /// An invalid fix is rejected outright: the previous accepted fix and
    /// the origin are left untouched, never replaced by a default.
    fn accept_latest_fix(&mut self) {
        let fix = match self.positioning.last_fix() {
            Some(fix) => fix,
            None => {
                self.log(LogLevel::Warn, "positioning service has no fix yet");
                return;
            }
        };

        if let Err(error) = fix.validate() {
            self.stats.fixes_rejected += 1;
            self.log(LogLevel::Error, &format!("rejected fix: {}", error));
            return;
        }

        if self.origin.is_none() {
            self.log(LogLevel::Info, &format!("origin set to {}", fix));
            self.origin = Some(fix.clone());
        }

        self.stats.fixes_accepted += 1;
        self.stats.last_fix_timestamp_ms = Some(fix.timestamp_ms);
        self.current_fix = Some(fix.clone());

        for callback in self.fix_callbacks.values_mut() {
            callback(&fix);
        }
    }

    fn transition(&mut self, next: AcquisitionState) {
        if self.state == next {
            return;
        }

        let previous = self.state;
        self.state = next;
        self.log(LogLevel::Info, &format!("{} -> {}", previous, next));

        for callback in self.state_callbacks.values_mut() {
            callback(previous, next);
        }
    }

    fn next_handle(&mut self) -> CallbackHandle {
        self.callback_counter += 1;
        CallbackHandle::new(self.callback_counter)
    }

    fn log(&self, level: LogLevel, message: &str) {
        if self.config.log_level as u8 >= level as u8 {
            eprintln!("[acquisition] {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared handle so tests can steer a capability the machine owns
    struct Shared<T>(Rc<RefCell<T>>);

    impl<T> Shared<T> {
        fn new(inner: T) -> (Self, Rc<RefCell<T>>) {
            let shared = Rc::new(RefCell::new(inner));
            (Shared(shared.clone()), shared)
        }
    }

    impl PositioningCapability for Shared<SimulatedPositioning> {
        fn is_enabled_by_user(&self) -> bool {
            self.0.borrow().is_enabled_by_user()
        }
        fn start(&mut self, desired_accuracy_m: f64, update_distance_m: f64) {
            self.0.borrow_mut().start(desired_accuracy_m, update_distance_m)
        }
        fn status(&mut self) -> PositioningStatus {
            self.0.borrow_mut().status()
        }
        fn last_fix(&self) -> Option<GeoFix> {
            self.0.borrow().last_fix()
        }
        fn stop(&mut self) {
            self.0.borrow_mut().stop()
        }
    }

    impl TrackingCapability for Shared<SimulatedTracking> {
        fn state(&mut self) -> TrackingState {
            self.0.borrow_mut().state()
        }
    }

    fn quiet_config() -> AcquisitionConfig {
        AcquisitionConfig {
            log_level: LogLevel::None,
            ..AcquisitionConfig::default()
        }
    }

    fn sample_fix() -> GeoFix {
        GeoFix::new(37.7749, -122.4194).with_accuracy(1.0).with_timestamp(1_000)
    }

    fn live_machine(positioning: SimulatedPositioning) -> AcquisitionStateMachine {
        AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(SimulatedTracking::new()),
            Box::new(positioning),
            Box::new(SimulatedPermissions::granted()),
        )
    }

    #[test]
    fn test_sequence_reaches_ready_and_captures_fix() {
        let mut machine = live_machine(SimulatedPositioning::new(sample_fix(), 5));

        assert_eq!(machine.start(), AcquisitionState::AwaitingTracking);
        assert_eq!(machine.tick(), AcquisitionState::AwaitingPositioning);

        // Five polls spent initializing, then the service comes up
        for _ in 0..5 {
            assert_eq!(machine.tick(), AcquisitionState::AwaitingPositioning);
        }
        assert_eq!(machine.tick(), AcquisitionState::Ready);

        let fix = machine.current_fix().unwrap();
        assert_eq!(fix.latitude, 37.7749);
        assert_eq!(fix.longitude, -122.4194);
        assert_eq!(machine.origin().unwrap().latitude, 37.7749);
    }

    #[test]
    fn test_positioning_budget_exhaustion_times_out() {
        let mut machine = live_machine(SimulatedPositioning::new(sample_fix(), u32::MAX));

        machine.start();
        machine.tick(); // enter AwaitingPositioning

        for _ in 0..29 {
            assert_eq!(machine.tick(), AcquisitionState::AwaitingPositioning);
        }
        assert_eq!(machine.tick(), AcquisitionState::TimedOut);

        // Terminal for this attempt: the machine never restarts itself
        assert_eq!(machine.tick(), AcquisitionState::TimedOut);
        assert!(machine.current_fix().is_none());
        assert!(machine.origin().is_none());
    }

    #[test]
    fn test_permanent_permission_denial_fails() {
        let mut config = quiet_config();
        config.permission_wait_ticks = 3;

        let mut machine = AcquisitionStateMachine::new(
            config,
            Box::new(SimulatedTracking::new()),
            Box::new(SimulatedPositioning::new(sample_fix(), 0)),
            Box::new(SimulatedPermissions::denied()),
        );

        assert_eq!(machine.start(), AcquisitionState::AwaitingPermissions);
        assert_eq!(machine.tick(), AcquisitionState::AwaitingPermissions);
        assert_eq!(machine.tick(), AcquisitionState::AwaitingPermissions);
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::PermissionDenied)
        );

        // Never reaches Ready afterwards
        for _ in 0..10 {
            assert_eq!(
                machine.tick(),
                AcquisitionState::Failed(FailureReason::PermissionDenied)
            );
        }
    }

    #[test]
    fn test_prompted_permissions_proceed() {
        let mut machine = AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(SimulatedTracking::new()),
            Box::new(SimulatedPositioning::new(sample_fix(), 0)),
            Box::new(SimulatedPermissions::prompting()),
        );

        // start() requests the missing permissions; the prompting gate grants
        // them, observable on the next poll
        assert_eq!(machine.start(), AcquisitionState::AwaitingPermissions);
        assert_eq!(machine.tick(), AcquisitionState::AwaitingTracking);
        assert_eq!(machine.tick(), AcquisitionState::AwaitingPositioning);
        assert_eq!(machine.tick(), AcquisitionState::Ready);
    }

    #[test]
    fn test_unsupported_tracking_never_touches_positioning() {
        let (positioning, positioning_handle) =
            Shared::new(SimulatedPositioning::new(sample_fix(), 0));

        let mut machine = AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(SimulatedTracking::unsupported()),
            Box::new(positioning),
            Box::new(SimulatedPermissions::granted()),
        );

        machine.start();
        assert_eq!(machine.tick(), AcquisitionState::Unsupported);
        assert_eq!(machine.tick(), AcquisitionState::Unsupported);

        assert_eq!(positioning_handle.borrow().start_calls(), 0);
        assert!(machine.origin().is_none());
    }

    #[test]
    fn test_tracking_error_fails_attempt() {
        let mut tracking = SimulatedTracking::new();
        tracking.queue_state(TrackingState::Error);

        let mut machine = AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(tracking),
            Box::new(SimulatedPositioning::new(sample_fix(), 0)),
            Box::new(SimulatedPermissions::granted()),
        );

        machine.start();
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceFailed)
        );
    }

    #[test]
    fn test_disabled_location_services_fail_attempt() {
        let mut machine = live_machine(SimulatedPositioning::disabled(sample_fix()));

        machine.start();
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceFailed)
        );
    }

    #[test]
    fn test_hard_service_failure_is_terminal() {
        let mut machine = live_machine(SimulatedPositioning::failing(sample_fix()));

        machine.start();
        machine.tick(); // enter AwaitingPositioning
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceFailed)
        );
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceFailed)
        );
    }

    #[test]
    fn test_service_lost_recovers_in_place() {
        let (positioning, positioning_handle) =
            Shared::new(SimulatedPositioning::new(sample_fix(), 0));

        let mut machine = AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(SimulatedTracking::new()),
            Box::new(positioning),
            Box::new(SimulatedPermissions::granted()),
        );

        machine.start();
        machine.tick();
        assert_eq!(machine.tick(), AcquisitionState::Ready);
        let origin = machine.origin().unwrap().clone();

        // Service drops
        positioning_handle
            .borrow_mut()
            .queue_status(PositioningStatus::Stopped);
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceLost)
        );
        assert!(!machine.state().is_terminal());

        // Still lost on the next poll
        positioning_handle
            .borrow_mut()
            .queue_status(PositioningStatus::Stopped);
        assert_eq!(
            machine.tick(),
            AcquisitionState::Failed(FailureReason::ServiceLost)
        );

        // Service comes back: recover without restarting the sequence
        positioning_handle
            .borrow_mut()
            .queue_status(PositioningStatus::Running);
        assert_eq!(machine.tick(), AcquisitionState::Ready);
        assert_eq!(machine.stats().recoveries, 1);
        assert_eq!(machine.origin().unwrap(), &origin);
    }

    #[test]
    fn test_origin_is_first_wins() {
        let (positioning, positioning_handle) =
            Shared::new(SimulatedPositioning::new(sample_fix(), 0));

        let mut machine = AcquisitionStateMachine::new(
            quiet_config(),
            Box::new(SimulatedTracking::new()),
            Box::new(positioning),
            Box::new(SimulatedPermissions::granted()),
        );

        machine.start();
        machine.tick();
        machine.tick();
        assert_eq!(machine.origin().unwrap().latitude, 37.7749);

        // The device moves; the current fix follows, the origin does not
        positioning_handle
            .borrow_mut()
            .set_fix(GeoFix::new(37.8000, -122.4000).with_accuracy(1.0));
        machine.tick();

        assert_eq!(machine.current_fix().unwrap().latitude, 37.8000);
        assert_eq!(machine.origin().unwrap().latitude, 37.7749);
    }

    #[test]
    fn test_invalid_fix_is_rejected_not_defaulted() {
        let mut machine = live_machine(SimulatedPositioning::new(
            GeoFix::new(91.0, 0.0).with_accuracy(1.0),
            0,
        ));

        machine.start();
        machine.tick();
        assert_eq!(machine.tick(), AcquisitionState::Ready);
        machine.tick();

        assert!(machine.current_fix().is_none());
        assert!(machine.origin().is_none());
        assert_eq!(machine.stats().fixes_accepted, 0);
        assert!(machine.stats().fixes_rejected >= 2);
    }

    #[test]
    fn test_cancel_mid_sequence() {
        let mut machine = live_machine(SimulatedPositioning::new(sample_fix(), u32::MAX));

        machine.start();
        machine.tick(); // AwaitingPositioning
        machine.cancel();

        assert_eq!(machine.state(), AcquisitionState::Cancelled);
        assert!(machine.origin().is_none());
        assert_eq!(machine.tick(), AcquisitionState::Cancelled);

        // Cancelling a terminal state is a no-op
        machine.cancel();
        assert_eq!(machine.state(), AcquisitionState::Cancelled);
    }

    #[test]
    fn test_reset_allows_fresh_attempt() {
        let mut machine = live_machine(SimulatedPositioning::new(sample_fix(), 0));

        machine.start();
        machine.tick();
        machine.tick();
        assert_eq!(machine.state(), AcquisitionState::Ready);
        assert!(machine.origin().is_some());

        machine.reset();
        assert_eq!(machine.state(), AcquisitionState::Idle);
        assert!(machine.origin().is_none());
        assert!(machine.current_fix().is_none());

        machine.start();
        machine.tick();
        assert_eq!(machine.tick(), AcquisitionState::Ready);
    }

    #[test]
    fn test_simulation_settles_then_goes_ready() {
        let simulation = SimulationConfig {
            latitude: 37.7749,
            longitude: -122.4194,
            settle_ticks: 2,
        };
        let mut machine =
            AcquisitionStateMachine::with_simulation(quiet_config(), &simulation).unwrap();

        assert_eq!(machine.start(), AcquisitionState::Idle);
        assert_eq!(machine.tick(), AcquisitionState::Idle);
        assert_eq!(machine.tick(), AcquisitionState::Ready);

        let origin = machine.origin().unwrap();
        assert_eq!(origin.latitude, 37.7749);
        assert_eq!(origin.longitude, -122.4194);
        assert_eq!(machine.current_fix().unwrap().latitude, 37.7749);

        // The simulated sample keeps being served
        assert_eq!(machine.tick(), AcquisitionState::Ready);
        assert!(machine.stats().fixes_accepted >= 2);
    }

    #[test]
    fn test_simulation_rejects_invalid_coordinates() {
        let simulation = SimulationConfig {
            latitude: 120.0,
            longitude: 0.0,
            settle_ticks: 1,
        };

        assert!(AcquisitionStateMachine::with_simulation(quiet_config(), &simulation).is_err());
    }

    #[test]
    fn test_fix_and_state_callbacks() {
        let fixes: Rc<RefCell<Vec<GeoFix>>> = Rc::new(RefCell::new(Vec::new()));
        let transitions: Rc<RefCell<Vec<(AcquisitionState, AcquisitionState)>>> =
            Rc::new(RefCell::new(Vec::new()));

        let mut machine = live_machine(SimulatedPositioning::new(sample_fix(), 0));

        let fixes_sink = fixes.clone();
        machine.on_fix(Box::new(move |fix| fixes_sink.borrow_mut().push(fix.clone())));
        let transition_sink = transitions.clone();
        let handle = machine.on_state_change(Box::new(move |previous, next| {
            transition_sink.borrow_mut().push((previous, next));
        }));

        machine.start();
        machine.tick();
        machine.tick();

        assert_eq!(fixes.borrow().len(), 1);
        assert_eq!(
            *transitions.borrow(),
            vec![
                (AcquisitionState::Idle, AcquisitionState::AwaitingTracking),
                (
                    AcquisitionState::AwaitingTracking,
                    AcquisitionState::AwaitingPositioning
                ),
                (
                    AcquisitionState::AwaitingPositioning,
                    AcquisitionState::Ready
                ),
            ]
        );

        assert!(machine.remove_callback(handle));
        assert!(!machine.remove_callback(handle));
    }
}
