//! Differential drive controller.
//!
//! This module provides [`DriveController`], which owns the left and right
//! [`MotorGroup`]s and converts a semantic [`Direction`] into per-side
//! forward/backward output patterns plus a PWM duty value.
//!
//! # Overview
//!
//! The controller:
//! - Expands vehicle-level directions into the fixed per-side truth table
//! - Clears every output line before asserting a new pattern, so forward and
//!   backward are never simultaneously asserted on a side, not even
//!   transiently during a direction change
//! - Clamps all duty inputs to `[0, MAX_DUTY]`
//! - Forces the stopped pattern before surfacing any port write error, so a
//!   partial pattern is never externally observable
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{Direction, DriveController, Duty, MotorGroup};
//! use rs_rover::hal::{MockPin, MockPwm};
//!
//! let left = MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new());
//! let right = MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new());
//! let mut drive = DriveController::new(left, right);
//!
//! drive.drive(Direction::Forward, Duty::new(700)).unwrap();
//! assert_eq!(drive.state().direction, Direction::Forward);
//!
//! drive.stop().unwrap();
//! assert_eq!(drive.state().duty, Duty::ZERO);
//! ```

use crate::traits::{DigitalOutput, Direction, PwmOutput};

/// Maximum PWM duty value (10-bit resolution, 1024 steps).
pub const MAX_DUTY: u16 = 1023;

/// Default duty applied when a command carries no explicit speed (~50%).
pub const DEFAULT_DUTY: u16 = 512;

/// A PWM duty value, guaranteed to be within `[0, MAX_DUTY]`.
///
/// Construction clamps rather than rejects: out-of-range input is corrected.
/// Clamping is idempotent, so a `Duty` built from another `Duty`'s raw value
/// is unchanged.
///
/// # Example
///
/// ```rust
/// use rs_rover::{Duty, MAX_DUTY};
///
/// assert_eq!(Duty::new(512).get(), 512);
/// assert_eq!(Duty::new(5000).get(), MAX_DUTY);
/// assert_eq!(Duty::from_fraction(0.5).get(), 511);
/// assert_eq!(Duty::from_fraction(2.0).get(), MAX_DUTY);
/// assert_eq!(Duty::from_fraction(-1.0).get(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Duty(u16);

impl Duty {
    /// Zero duty (stopped).
    pub const ZERO: Duty = Duty(0);

    /// Full duty.
    pub const MAX: Duty = Duty(MAX_DUTY);

    /// Default duty for commands without an explicit speed.
    pub const DEFAULT: Duty = Duty(DEFAULT_DUTY);

    /// Create a duty value, clamping to `[0, MAX_DUTY]`.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        if raw > MAX_DUTY {
            Duty(MAX_DUTY)
        } else {
            Duty(raw)
        }
    }

    /// Create a duty value from a normalized fraction in `[0.0, 1.0]`.
    ///
    /// The fraction is clamped before rescaling, so NaN and out-of-range
    /// inputs map to the nearest valid duty (NaN clamps to 0).
    pub fn from_fraction(fraction: f32) -> Self {
        let clamped = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Duty((clamped * MAX_DUTY as f32) as u16)
    }

    /// Raw duty value.
    #[inline]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// True when this duty is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Duty {
    fn default() -> Self {
        Duty::ZERO
    }
}

impl From<u16> for Duty {
    fn from(raw: u16) -> Self {
        Duty::new(raw)
    }
}

/// One wheel side: forward line, backward line, optional ganged rear pair,
/// and one PWM channel.
///
/// In the two-wheel topology a side is one motor with one H-bridge half; in
/// the four-wheel topology the front and rear motor of a side switch
/// together and share the side's PWM channel, so the rear pair is just two
/// more lines driven with the same pattern.
///
/// Invariant: the forward and backward lines of a side (front and rear
/// alike) are never both asserted. [`DriveController`] enforces this by
/// clearing every line before asserting a new pattern; `MotorGroup` itself
/// only exposes whole-pattern writes.
pub struct MotorGroup<O: DigitalOutput, P: PwmOutput<Error = O::Error>> {
    forward: O,
    backward: O,
    rear: Option<(O, O)>,
    pwm: P,
}

impl<O: DigitalOutput, P: PwmOutput<Error = O::Error>> MotorGroup<O, P> {
    /// Create a two-wheel-topology side from its forward line, backward
    /// line, and PWM channel.
    pub fn new(forward: O, backward: O, pwm: P) -> Self {
        Self {
            forward,
            backward,
            rear: None,
            pwm,
        }
    }

    /// Add a ganged rear forward/backward pair (four-wheel topology).
    pub fn with_rear(mut self, rear_forward: O, rear_backward: O) -> Self {
        self.rear = Some((rear_forward, rear_backward));
        self
    }

    /// Drive every direction line of this side low.
    fn clear_lines(&mut self) -> Result<(), O::Error> {
        self.forward.set_level(false)?;
        self.backward.set_level(false)?;
        if let Some((rf, rb)) = self.rear.as_mut() {
            rf.set_level(false)?;
            rb.set_level(false)?;
        }
        Ok(())
    }

    /// Assert the side's direction pattern. Callers must have cleared the
    /// lines first and must not pass `forward && backward`.
    fn assert_lines(&mut self, forward: bool, backward: bool) -> Result<(), O::Error> {
        debug_assert!(!(forward && backward));
        if forward {
            self.forward.set_level(true)?;
            if let Some((rf, _)) = self.rear.as_mut() {
                rf.set_level(true)?;
            }
        }
        if backward {
            self.backward.set_level(true)?;
            if let Some((_, rb)) = self.rear.as_mut() {
                rb.set_level(true)?;
            }
        }
        Ok(())
    }

    /// Set the side's PWM duty.
    fn set_duty(&mut self, duty: u16) -> Result<(), O::Error> {
        self.pwm.set_duty(duty)
    }

    /// Best-effort stop: attempt every write even if an earlier one fails,
    /// reporting the first error afterwards.
    fn force_stop(&mut self) -> Result<(), O::Error> {
        let mut first_err = None;
        let mut note = |r: Result<(), O::Error>| {
            if let Err(e) = r {
                first_err.get_or_insert(e);
            }
        };
        note(self.forward.set_level(false));
        note(self.backward.set_level(false));
        if let Some((rf, rb)) = self.rear.as_mut() {
            note(rf.set_level(false));
            note(rb.set_level(false));
        }
        note(self.pwm.set_duty(0));
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// The `(Direction, Duty)` pair last applied to the wheels.
///
/// Derived bookkeeping for status reporting; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveState {
    /// Last applied direction.
    pub direction: Direction,
    /// Last applied duty.
    pub duty: Duty,
}

impl DriveState {
    /// The stopped state: direction `Stop`, duty zero.
    pub const STOPPED: DriveState = DriveState {
        direction: Direction::Stop,
        duty: Duty::ZERO,
    };
}

/// Per-side line pattern for a direction: `((left_fwd, left_bwd),
/// (right_fwd, right_bwd))`.
const fn wheel_pattern(direction: Direction) -> ((bool, bool), (bool, bool)) {
    match direction {
        Direction::Forward => ((true, false), (true, false)),
        Direction::Backward => ((false, true), (false, true)),
        Direction::Left => ((false, true), (true, false)),
        Direction::Right => ((true, false), (false, true)),
        Direction::Stop => ((false, false), (false, false)),
    }
}

/// Differential drive controller owning both wheel sides.
///
/// This is the only component that writes to motor outputs. It is not
/// thread-safe by itself; concurrent command sources must serialize calls
/// behind a single mutex (see `services::shared` when the `web` feature is
/// enabled) because the clear-then-assert sequence is not atomic.
pub struct DriveController<O: DigitalOutput, P: PwmOutput<Error = O::Error>> {
    left: MotorGroup<O, P>,
    right: MotorGroup<O, P>,
    state: DriveState,
}

impl<O: DigitalOutput, P: PwmOutput<Error = O::Error>> DriveController<O, P> {
    /// Create a controller from its left and right sides.
    ///
    /// The wheels are not touched during construction; call [`stop`]
    /// (crate convention: first thing in every bring-up path) to put the
    /// outputs into a known state.
    ///
    /// [`stop`]: Self::stop
    pub fn new(left: MotorGroup<O, P>, right: MotorGroup<O, P>) -> Self {
        Self {
            left,
            right,
            state: DriveState::STOPPED,
        }
    }

    /// Apply a direction at the given duty.
    ///
    /// The sequence is: clear every line on both sides, set both duties,
    /// assert the new pattern. `drive(Stop, _)` is exactly [`stop`].
    ///
    /// On any port write error the controller forces the stopped pattern
    /// (best-effort) before returning the error, so outputs are never left
    /// in a partial pattern.
    ///
    /// [`stop`]: Self::stop
    pub fn drive(&mut self, direction: Direction, duty: Duty) -> Result<(), O::Error> {
        if direction == Direction::Stop {
            return self.stop();
        }
        match self.apply(direction, duty) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = self.force_stop();
                Err(e)
            }
        }
    }

    fn apply(&mut self, direction: Direction, duty: Duty) -> Result<(), O::Error> {
        self.left.clear_lines()?;
        self.right.clear_lines()?;
        self.left.set_duty(duty.get())?;
        self.right.set_duty(duty.get())?;
        let ((lf, lb), (rf, rb)) = wheel_pattern(direction);
        self.left.assert_lines(lf, lb)?;
        self.right.assert_lines(rf, rb)?;
        self.state = DriveState { direction, duty };
        Ok(())
    }

    /// Clear every direction line and zero both duties.
    ///
    /// Always safe to call and idempotent. Even on error every output write
    /// is attempted, so the wheels end up stopped whenever the hardware
    /// allows it at all.
    pub fn stop(&mut self) -> Result<(), O::Error> {
        self.force_stop()
    }

    fn force_stop(&mut self) -> Result<(), O::Error> {
        self.state = DriveState::STOPPED;
        let left = self.left.force_stop();
        let right = self.right.force_stop();
        left.and(right)
    }

    /// The `(direction, duty)` last applied.
    #[inline]
    pub fn state(&self) -> DriveState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockPin, MockPwm};

    fn two_wheel() -> (
        DriveController<MockPin, MockPwm>,
        [MockPin; 4],
        [MockPwm; 2],
    ) {
        let (lf, lb, rf, rb) = (
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
        );
        let (lp, rp) = (MockPwm::new(), MockPwm::new());
        let drive = DriveController::new(
            MotorGroup::new(lf.clone(), lb.clone(), lp.clone()),
            MotorGroup::new(rf.clone(), rb.clone(), rp.clone()),
        );
        (drive, [lf, lb, rf, rb], [lp, rp])
    }

    fn levels(pins: &[MockPin; 4]) -> (bool, bool, bool, bool) {
        (
            pins[0].level(),
            pins[1].level(),
            pins[2].level(),
            pins[3].level(),
        )
    }

    #[test]
    fn duty_clamps_and_is_idempotent() {
        assert_eq!(Duty::new(0).get(), 0);
        assert_eq!(Duty::new(1023).get(), 1023);
        assert_eq!(Duty::new(1024).get(), 1023);
        assert_eq!(Duty::new(u16::MAX).get(), 1023);
        for raw in [0u16, 1, 512, 1023, 2000] {
            let once = Duty::new(raw);
            assert_eq!(Duty::new(once.get()), once);
        }
    }

    #[test]
    fn duty_from_fraction() {
        assert_eq!(Duty::from_fraction(0.0).get(), 0);
        assert_eq!(Duty::from_fraction(1.0).get(), MAX_DUTY);
        assert_eq!(Duty::from_fraction(1.5).get(), MAX_DUTY);
        assert_eq!(Duty::from_fraction(-0.3).get(), 0);
        assert_eq!(Duty::from_fraction(f32::NAN).get(), 0);
        let half = Duty::from_fraction(0.5).get();
        assert!((510..=512).contains(&half));
    }

    #[test]
    fn truth_table_exact() {
        let (mut drive, pins, _pwms) = two_wheel();
        let table = [
            (Direction::Forward, (true, false, true, false)),
            (Direction::Backward, (false, true, false, true)),
            (Direction::Left, (false, true, true, false)),
            (Direction::Right, (true, false, false, true)),
            (Direction::Stop, (false, false, false, false)),
        ];
        for (dir, expected) in table {
            drive.drive(dir, Duty::DEFAULT).unwrap();
            assert_eq!(levels(&pins), expected, "pattern for {:?}", dir);
        }
    }

    #[test]
    fn no_side_ever_double_asserted() {
        let (mut drive, pins, _pwms) = two_wheel();
        let sequence = [
            Direction::Forward,
            Direction::Left,
            Direction::Right,
            Direction::Backward,
            Direction::Stop,
            Direction::Right,
        ];
        for dir in sequence {
            drive.drive(dir, Duty::new(800)).unwrap();
            assert!(!(pins[0].level() && pins[1].level()), "left side after {:?}", dir);
            assert!(!(pins[2].level() && pins[3].level()), "right side after {:?}", dir);
        }
    }

    #[test]
    fn stop_is_idempotent_and_zeroes_duty() {
        let (mut drive, pins, pwms) = two_wheel();
        drive.drive(Direction::Forward, Duty::new(900)).unwrap();
        drive.stop().unwrap();
        let after_one = (levels(&pins), pwms[0].duty(), pwms[1].duty());
        drive.stop().unwrap();
        let after_two = (levels(&pins), pwms[0].duty(), pwms[1].duty());
        assert_eq!(after_one, after_two);
        assert_eq!(after_one.0, (false, false, false, false));
        assert_eq!(after_one.1, 0);
        assert_eq!(after_one.2, 0);
        assert_eq!(drive.state(), DriveState::STOPPED);
    }

    #[test]
    fn drive_stop_equals_stop() {
        let (mut drive, pins, pwms) = two_wheel();
        drive.drive(Direction::Backward, Duty::new(600)).unwrap();
        drive.drive(Direction::Stop, Duty::new(600)).unwrap();
        assert_eq!(levels(&pins), (false, false, false, false));
        assert_eq!(pwms[0].duty(), 0);
        assert_eq!(pwms[1].duty(), 0);
    }

    #[test]
    fn both_sides_receive_same_duty() {
        let (mut drive, _pins, pwms) = two_wheel();
        drive.drive(Direction::Left, Duty::new(321)).unwrap();
        assert_eq!(pwms[0].duty(), 321);
        assert_eq!(pwms[1].duty(), 321);
    }

    #[test]
    fn four_wheel_rear_pair_follows_front() {
        let (front_f, front_b) = (MockPin::new(), MockPin::new());
        let (rear_f, rear_b) = (MockPin::new(), MockPin::new());
        let pwm = MockPwm::new();
        let left = MotorGroup::new(front_f.clone(), front_b.clone(), pwm.clone())
            .with_rear(rear_f.clone(), rear_b.clone());
        let right = MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new());
        let mut drive = DriveController::new(left, right);

        drive.drive(Direction::Backward, Duty::DEFAULT).unwrap();
        assert!(!front_f.level() && front_b.level());
        assert!(!rear_f.level() && rear_b.level());

        drive.stop().unwrap();
        assert!(!rear_f.level() && !rear_b.level());
    }

    #[test]
    fn line_write_failure_mid_command_forces_stop() {
        use crate::hal::{FlakyPin, FlakyPwm, MockFault};

        let pins = [
            FlakyPin::new(),
            FlakyPin::new(),
            FlakyPin::new(),
            FlakyPin::new(),
        ];
        let pwms = [FlakyPwm::new(), FlakyPwm::new()];
        let mut drive = DriveController::new(
            MotorGroup::new(pins[0].clone(), pins[1].clone(), pwms[0].clone()),
            MotorGroup::new(pins[2].clone(), pins[3].clone(), pwms[1].clone()),
        );
        drive.drive(Direction::Forward, Duty::new(700)).unwrap();

        // right-backward write counts so far: one clear during Forward. The
        // next command clears it again (1) then asserts it (2); failing the
        // assert leaves left-backward already high mid-sequence.
        pins[3].fail_on_write(2);
        assert_eq!(
            drive.drive(Direction::Backward, Duty::new(700)),
            Err(MockFault)
        );

        // the partial Backward pattern was replaced by the stopped pattern
        for (i, pin) in pins.iter().enumerate() {
            assert!(!pin.level(), "pin {} still high", i);
        }
        assert_eq!(pwms[0].duty(), 0);
        assert_eq!(pwms[1].duty(), 0);
        assert_eq!(drive.state(), DriveState::STOPPED);
    }

    #[test]
    fn duty_write_failure_forces_stop() {
        use crate::hal::{FlakyPin, FlakyPwm, MockFault};

        let pwm = FlakyPwm::new();
        pwm.fail_on_write(0);
        let left_fwd = FlakyPin::new();
        let mut drive = DriveController::new(
            MotorGroup::new(left_fwd.clone(), FlakyPin::new(), pwm.clone()),
            MotorGroup::new(FlakyPin::new(), FlakyPin::new(), FlakyPwm::new()),
        );

        assert_eq!(
            drive.drive(Direction::Forward, Duty::new(900)),
            Err(MockFault)
        );
        assert!(!left_fwd.level());
        assert_eq!(pwm.duty(), 0);
        assert_eq!(drive.state(), DriveState::STOPPED);
    }

    #[test]
    fn state_tracks_last_applied() {
        let (mut drive, _pins, _pwms) = two_wheel();
        assert_eq!(drive.state(), DriveState::STOPPED);
        drive.drive(Direction::Right, Duty::new(700)).unwrap();
        assert_eq!(
            drive.state(),
            DriveState {
                direction: Direction::Right,
                duty: Duty::new(700)
            }
        );
        drive.stop().unwrap();
        assert_eq!(drive.state(), DriveState::STOPPED);
    }
}
