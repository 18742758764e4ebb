//! Mutex-guarded dispatcher shared between transports.
//!
//! [`SharedDispatcher`] wraps the single [`CommandDispatcher`] in a `Mutex`
//! so every transport serializes its commands through one lock. The drive
//! sequence (clear lines, set duty, assert pattern) is not atomic at the
//! hardware level, so interleaved callers could otherwise produce output
//! patterns no single command ever asked for.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_rover::services::SharedDispatcher;
//! use rs_rover::{BatteryMonitor, CommandDispatcher, DriveController, MotorGroup, VoltageCalibration};
//! use rs_rover::hal::{MockBattery, MockPin, MockPwm};
//!
//! let drive = DriveController::new(
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//! );
//! let monitor = BatteryMonitor::new(
//!     MockBattery::new(4000),
//!     VoltageCalibration::default().with_divider_ratio(3.0),
//! );
//! let shared = Arc::new(SharedDispatcher::new(CommandDispatcher::new(drive, monitor)));
//!
//! let outcome = shared.dispatch("forward", None).unwrap();
//! assert!(outcome.is_executed());
//! ```

use std::sync::Mutex;

use crate::dispatch::{CommandDispatcher, DispatchOutcome};
use crate::drive::Duty;
use crate::traits::{DigitalOutput, Direction, PwmOutput, VoltageSensor};

/// Point-in-time view of the vehicle for status reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoverSnapshot {
    /// Last applied direction.
    pub direction: Direction,
    /// Last applied duty.
    pub duty: u16,
    /// Battery voltage at snapshot time.
    pub battery_volts: f32,
}

/// Thread-safe wrapper serializing all access to the dispatcher.
pub struct SharedDispatcher<O, P, S>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
{
    dispatcher: Mutex<CommandDispatcher<O, P, S>>,
}

impl<O, P, S> SharedDispatcher<O, P, S>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
{
    /// Wrap a dispatcher for shared use.
    pub fn new(dispatcher: CommandDispatcher<O, P, S>) -> Self {
        Self {
            dispatcher: Mutex::new(dispatcher),
        }
    }

    /// Access the dispatcher under the lock.
    ///
    /// The closure pattern keeps the lock scope tight and prevents holding
    /// it across await points.
    pub fn with_dispatcher<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut CommandDispatcher<O, P, S>) -> R,
    {
        let mut guard = self.dispatcher.lock().unwrap();
        f(&mut guard)
    }

    /// Dispatch one token, optionally overriding the duty.
    pub fn dispatch(
        &self,
        token: &str,
        duty: Option<Duty>,
    ) -> Result<DispatchOutcome, O::Error> {
        self.with_dispatcher(|d| d.dispatch_with_duty(token, duty))
    }

    /// Stop the vehicle unconditionally.
    pub fn stop(&self) -> Result<(), O::Error> {
        self.with_dispatcher(|d| d.stop())
    }

    /// Snapshot drive state plus a fresh battery reading.
    pub fn snapshot(&self) -> Result<RoverSnapshot, O::Error> {
        self.with_dispatcher(|d| {
            let state = d.drive_state();
            let volts = d.battery_volts()?;
            Ok(RoverSnapshot {
                direction: state.direction,
                duty: state.duty.get(),
                battery_volts: volts,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveController, MotorGroup};
    use crate::hal::{MockBattery, MockPin, MockPwm};
    use crate::interlock::{BatteryMonitor, VoltageCalibration};
    use std::sync::Arc;

    fn shared() -> Arc<SharedDispatcher<MockPin, MockPwm, MockBattery>> {
        let drive = DriveController::new(
            MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
            MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
        );
        let monitor = BatteryMonitor::new(
            MockBattery::new(4000),
            VoltageCalibration::default().with_divider_ratio(3.0),
        );
        Arc::new(SharedDispatcher::new(CommandDispatcher::new(drive, monitor)))
    }

    #[test]
    fn dispatch_through_shared_state() {
        let state = shared();
        let outcome = state.dispatch("forward", None).unwrap();
        assert!(outcome.is_executed());

        let snap = state.snapshot().unwrap();
        assert_eq!(snap.direction, Direction::Forward);
        assert_eq!(snap.duty, 512);
        assert!((snap.battery_volts - 9.670).abs() < 1e-2);
    }

    #[test]
    fn stop_through_shared_state() {
        let state = shared();
        state.dispatch("left", Some(Duty::new(800))).unwrap();
        state.stop().unwrap();

        let snap = state.snapshot().unwrap();
        assert_eq!(snap.direction, Direction::Stop);
        assert_eq!(snap.duty, 0);
    }

    #[test]
    fn concurrent_access_does_not_deadlock() {
        use std::thread;

        let state = shared();
        let a = state.clone();
        let b = state.clone();

        let h1 = thread::spawn(move || {
            for _ in 0..20 {
                let _ = a.dispatch("forward", None);
                let _ = a.dispatch("stop", None);
            }
        });
        let h2 = thread::spawn(move || {
            for _ in 0..20 {
                let _ = b.snapshot();
                let _ = b.dispatch("right", None);
            }
        });

        h1.join().unwrap();
        h2.join().unwrap();

        // every command went through whole; a side is never double-asserted
        let snap = state.snapshot().unwrap();
        assert!(matches!(
            snap.direction,
            Direction::Forward | Direction::Right | Direction::Stop
        ));
    }
}
