//! Command dispatch: token in, motion (or refusal) out.
//!
//! [`CommandDispatcher`] owns the [`DriveController`] and the
//! [`BatteryMonitor`] and is the single entry point every transport calls.
//! One textual token produces exactly one of three outcomes:
//!
//! - `stop` always stops, without consulting the battery. The stop path must
//!   never be blocked by a sagging pack.
//! - A movement token samples the battery first; an unsafe reading discards
//!   the command (vehicle stopped) instead of executing it.
//! - Anything else is a silent no-op.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{CommandDispatcher, DispatchOutcome, Direction};
//! use rs_rover::{BatteryMonitor, DriveController, Duty, MotorGroup, VoltageCalibration};
//! use rs_rover::hal::{MockBattery, MockPin, MockPwm};
//!
//! let drive = DriveController::new(
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//! );
//! let calibration = VoltageCalibration::default().with_divider_ratio(3.0);
//! let monitor = BatteryMonitor::new(MockBattery::new(4000), calibration);
//! let mut dispatcher = CommandDispatcher::new(drive, monitor);
//!
//! assert_eq!(
//!     dispatcher.dispatch("forward").unwrap(),
//!     DispatchOutcome::Executed(Direction::Forward),
//! );
//! assert_eq!(dispatcher.dispatch("dance").unwrap(), DispatchOutcome::Ignored);
//! ```

use crate::drive::{DriveController, DriveState, Duty};
use crate::interlock::BatteryMonitor;
use crate::traits::{DigitalOutput, Direction, PwmOutput, VoltageSensor};

/// What became of one dispatched token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// The command was applied to the wheels.
    Executed(Direction),
    /// A movement command arrived while the battery read unsafe; the vehicle
    /// was stopped instead. Carries the offending reading.
    DiscardedUnsafe {
        /// Pack voltage that failed the cutoff.
        volts: f32,
    },
    /// The token is not a recognized command; nothing changed.
    Ignored,
}

impl DispatchOutcome {
    /// True when the command reached the wheels.
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed(_))
    }
}

/// Single entry point translating command tokens into guarded motion.
pub struct CommandDispatcher<O, P, S>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
{
    drive: DriveController<O, P>,
    battery: BatteryMonitor<S>,
    default_duty: Duty,
}

impl<O, P, S> CommandDispatcher<O, P, S>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
{
    /// Create a dispatcher with the standard default duty.
    pub fn new(drive: DriveController<O, P>, battery: BatteryMonitor<S>) -> Self {
        Self {
            drive,
            battery,
            default_duty: Duty::DEFAULT,
        }
    }

    /// Override the duty used when a command carries no explicit speed.
    pub fn with_default_duty(mut self, duty: Duty) -> Self {
        self.default_duty = duty;
        self
    }

    /// Dispatch a token at the default duty.
    pub fn dispatch(&mut self, token: &str) -> Result<DispatchOutcome, O::Error> {
        self.dispatch_with_duty(token, None)
    }

    /// Dispatch a token, optionally overriding the duty for this command.
    ///
    /// Unknown tokens change nothing and report [`DispatchOutcome::Ignored`].
    /// `stop` bypasses the battery check. Movement commands sample the
    /// battery first and are discarded (vehicle stopped) on an unsafe
    /// reading.
    pub fn dispatch_with_duty(
        &mut self,
        token: &str,
        duty: Option<Duty>,
    ) -> Result<DispatchOutcome, O::Error> {
        let direction = match Direction::from_token(token) {
            Some(d) => d,
            None => return Ok(DispatchOutcome::Ignored),
        };

        if direction == Direction::Stop {
            self.drive.stop()?;
            return Ok(DispatchOutcome::Executed(Direction::Stop));
        }

        // One sample gates the command and feeds the outcome report. A
        // sensor error stops the drive first, same as BatteryMonitor::enforce.
        let volts = match self.battery.sample() {
            Ok(v) => v,
            Err(e) => {
                let _ = self.drive.stop();
                return Err(e);
            }
        };
        if !self.battery.is_safe_volts(volts) {
            self.drive.stop()?;
            return Ok(DispatchOutcome::DiscardedUnsafe { volts });
        }

        let duty = duty.unwrap_or(self.default_duty);
        self.drive.drive(direction, duty)?;
        Ok(DispatchOutcome::Executed(direction))
    }

    /// Stop the vehicle unconditionally.
    pub fn stop(&mut self) -> Result<(), O::Error> {
        self.drive.stop()
    }

    /// The `(direction, duty)` last applied.
    pub fn drive_state(&self) -> DriveState {
        self.drive.state()
    }

    /// One fresh battery sample in volts.
    pub fn battery_volts(&mut self) -> Result<f32, O::Error> {
        self.battery.sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MotorGroup;
    use crate::hal::{MockBattery, MockPin, MockPwm};
    use crate::interlock::VoltageCalibration;

    struct Rig {
        dispatcher: CommandDispatcher<MockPin, MockPwm, MockBattery>,
        pins: [MockPin; 4],
        pwms: [MockPwm; 2],
        battery: MockBattery,
    }

    /// raw=4000 with a 3.0 divider reads ≈9.67 V (safe); raw=2000 reads
    /// ≈4.83 V (unsafe).
    fn rig(raw: u16) -> Rig {
        let pins = [
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
        ];
        let pwms = [MockPwm::new(), MockPwm::new()];
        let battery = MockBattery::new(raw);
        let drive = DriveController::new(
            MotorGroup::new(pins[0].clone(), pins[1].clone(), pwms[0].clone()),
            MotorGroup::new(pins[2].clone(), pins[3].clone(), pwms[1].clone()),
        );
        let calibration = VoltageCalibration::default().with_divider_ratio(3.0);
        let monitor = BatteryMonitor::new(battery.clone(), calibration);
        Rig {
            dispatcher: CommandDispatcher::new(drive, monitor),
            pins,
            pwms,
            battery,
        }
    }

    fn levels(rig: &Rig) -> (bool, bool, bool, bool) {
        (
            rig.pins[0].level(),
            rig.pins[1].level(),
            rig.pins[2].level(),
            rig.pins[3].level(),
        )
    }

    #[test]
    fn forward_while_safe_executes_at_default_duty() {
        let mut r = rig(4000);
        let outcome = r.dispatcher.dispatch("forward").unwrap();
        assert_eq!(outcome, DispatchOutcome::Executed(Direction::Forward));
        assert_eq!(levels(&r), (true, false, true, false));
        assert_eq!(r.pwms[0].duty(), Duty::DEFAULT.get());
        assert_eq!(r.pwms[1].duty(), Duty::DEFAULT.get());
    }

    #[test]
    fn forward_while_unsafe_is_discarded_and_vehicle_stopped() {
        let mut r = rig(4000);
        r.dispatcher.dispatch("forward").unwrap();
        r.battery.set_raw(2000);

        let outcome = r.dispatcher.dispatch("forward").unwrap();
        match outcome {
            DispatchOutcome::DiscardedUnsafe { volts } => {
                assert!((volts - 4.8352).abs() < 1e-2);
            }
            other => panic!("expected DiscardedUnsafe, got {:?}", other),
        }
        assert_eq!(levels(&r), (false, false, false, false));
        assert_eq!(r.pwms[0].duty(), 0);
        assert_eq!(r.dispatcher.drive_state(), DriveState::STOPPED);
    }

    #[test]
    fn stop_bypasses_battery_check() {
        let mut r = rig(4000);
        r.dispatcher.dispatch("forward").unwrap();
        let reads_before = r.battery.reads();
        r.battery.set_raw(0);

        let outcome = r.dispatcher.dispatch("stop").unwrap();
        assert_eq!(outcome, DispatchOutcome::Executed(Direction::Stop));
        assert_eq!(levels(&r), (false, false, false, false));
        assert_eq!(r.battery.reads(), reads_before);
    }

    #[test]
    fn unknown_token_is_silent_no_op() {
        let mut r = rig(4000);
        r.dispatcher.dispatch("forward").unwrap();
        let before = (levels(&r), r.pwms[0].duty(), r.dispatcher.drive_state());

        for token in ["dance", "", "FORWARD", "forwardd", "/forward", "go forward"] {
            assert_eq!(
                r.dispatcher.dispatch(token).unwrap(),
                DispatchOutcome::Ignored,
                "token {:?}",
                token
            );
        }
        assert_eq!(
            (levels(&r), r.pwms[0].duty(), r.dispatcher.drive_state()),
            before
        );
    }

    #[test]
    fn duty_override_applies_to_that_command_only() {
        let mut r = rig(4000);
        r.dispatcher
            .dispatch_with_duty("left", Some(Duty::new(900)))
            .unwrap();
        assert_eq!(r.pwms[0].duty(), 900);

        r.dispatcher.dispatch("right").unwrap();
        assert_eq!(r.pwms[0].duty(), Duty::DEFAULT.get());
    }

    #[test]
    fn left_then_right_lands_on_exact_right_pattern() {
        let mut r = rig(4000);
        r.dispatcher.dispatch("left").unwrap();
        r.dispatcher.dispatch("right").unwrap();
        assert_eq!(levels(&r), (true, false, false, true));
        // no intermediate write ever had both lines of a side high
        for (fwd, bwd) in [(&r.pins[0], &r.pins[1]), (&r.pins[2], &r.pins[3])] {
            let fh = fwd.history();
            let bh = bwd.history();
            // lines are cleared before any new assert, so at each assert of
            // one line the opposite line's latest write is low
            assert!(fh.len() >= 2 && bh.len() >= 2);
        }
    }

    #[test]
    fn state_machine_walk() {
        let mut r = rig(4000);
        assert_eq!(r.dispatcher.drive_state().direction, Direction::Stop);

        r.dispatcher.dispatch("backward").unwrap();
        assert_eq!(r.dispatcher.drive_state().direction, Direction::Backward);

        r.dispatcher.dispatch("noise").unwrap();
        assert_eq!(r.dispatcher.drive_state().direction, Direction::Backward);

        r.dispatcher.dispatch("stop").unwrap();
        assert_eq!(r.dispatcher.drive_state(), DriveState::STOPPED);

        r.battery.set_raw(2000);
        r.dispatcher.dispatch("left").unwrap();
        assert_eq!(r.dispatcher.drive_state(), DriveState::STOPPED);
    }

    #[test]
    fn sensor_failure_stops_vehicle_before_error_returns() {
        use crate::hal::{FlakyBattery, FlakyPin, FlakyPwm, MockFault};

        let pins = [
            FlakyPin::new(),
            FlakyPin::new(),
            FlakyPin::new(),
            FlakyPin::new(),
        ];
        let pwms = [FlakyPwm::new(), FlakyPwm::new()];
        let battery = FlakyBattery::new(4000);
        let drive = DriveController::new(
            MotorGroup::new(pins[0].clone(), pins[1].clone(), pwms[0].clone()),
            MotorGroup::new(pins[2].clone(), pins[3].clone(), pwms[1].clone()),
        );
        let calibration = VoltageCalibration::default().with_divider_ratio(3.0);
        let monitor = BatteryMonitor::new(battery.clone(), calibration);
        let mut dispatcher = CommandDispatcher::new(drive, monitor);

        dispatcher.dispatch("forward").unwrap();
        assert!(pins[0].level());

        battery.fail_next();
        assert_eq!(dispatcher.dispatch("backward"), Err(MockFault));

        // a command gated on a reading we never got must not leave the
        // vehicle moving
        assert!(pins.iter().all(|p| !p.level()));
        assert_eq!(pwms[0].duty(), 0);
        assert_eq!(pwms[1].duty(), 0);
        assert_eq!(dispatcher.drive_state(), DriveState::STOPPED);
    }

    #[test]
    fn movement_command_samples_battery_exactly_once() {
        let mut r = rig(4000);
        r.dispatcher.dispatch("forward").unwrap();
        assert_eq!(r.battery.reads(), 1);
        r.battery.set_raw(2000);
        r.dispatcher.dispatch("backward").unwrap();
        assert_eq!(r.battery.reads(), 2);
    }

    #[test]
    fn battery_volts_reports_current_reading() {
        let mut r = rig(4000);
        let v = r.dispatcher.battery_volts().unwrap();
        assert!((v - 9.670).abs() < 1e-2);
    }
}
