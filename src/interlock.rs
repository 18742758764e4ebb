//! Battery voltage interlock.
//!
//! The battery feeds the ADC through a resistor divider; [`BatteryMonitor`]
//! converts the raw count back to pack volts and refuses movement below a
//! cutoff. Sampling ([`BatteryMonitor::sample`]) is a pure read plus
//! conversion; enforcement ([`BatteryMonitor::enforce`]) is the only part
//! that touches the drive outputs, and only ever to stop them.
//!
//! The unsafe/safe decision is re-evaluated fresh on every call. There is no
//! hysteresis and no latch, so a pack hovering at the cutoff can alternate
//! between discarding and executing commands across consecutive reads.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{BatteryMonitor, VoltageCalibration};
//! use rs_rover::hal::MockBattery;
//!
//! let battery = MockBattery::new(2000);
//! let mut monitor = BatteryMonitor::new(battery, VoltageCalibration::default());
//!
//! let volts = monitor.sample().unwrap();
//! assert!((volts - 3.222).abs() < 0.01);
//! assert!(!monitor.is_safe_volts(volts));
//! ```

use crate::drive::DriveController;
use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};

/// ADC-to-volts conversion parameters plus the safety cutoff.
///
/// `volts = raw / full_scale * reference_volts * divider_ratio`
///
/// Defaults match a 12-bit ADC at 3.3 V full range behind a 2:1 divider,
/// guarding a 2S LiPo pack at 7.0 V.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoltageCalibration {
    /// Raw count at full scale (4095 for a 12-bit ADC).
    pub full_scale: u16,
    /// ADC reference voltage in volts.
    pub reference_volts: f32,
    /// Divider ratio: battery volts per volt at the ADC pin.
    pub divider_ratio: f32,
    /// Minimum safe pack voltage; readings strictly below discard movement.
    pub cutoff_volts: f32,
}

impl Default for VoltageCalibration {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            reference_volts: 3.3,
            divider_ratio: 2.0,
            cutoff_volts: 7.0,
        }
    }
}

impl VoltageCalibration {
    /// Set the divider ratio.
    pub fn with_divider_ratio(mut self, ratio: f32) -> Self {
        self.divider_ratio = ratio;
        self
    }

    /// Set the cutoff voltage.
    pub fn with_cutoff_volts(mut self, volts: f32) -> Self {
        self.cutoff_volts = volts;
        self
    }

    /// Convert a raw ADC count to pack volts.
    pub fn to_volts(&self, raw: u16) -> f32 {
        raw as f32 / self.full_scale as f32 * self.reference_volts * self.divider_ratio
    }
}

/// Voltage interlock guarding the drive against an undervolted pack.
pub struct BatteryMonitor<S: VoltageSensor> {
    sensor: S,
    calibration: VoltageCalibration,
}

impl<S: VoltageSensor> BatteryMonitor<S> {
    /// Create a monitor from a sensor and its calibration.
    pub fn new(sensor: S, calibration: VoltageCalibration) -> Self {
        Self {
            sensor,
            calibration,
        }
    }

    /// Take one fresh ADC sample and convert it to pack volts.
    ///
    /// Exactly one raw read per call; no caching, no averaging.
    pub fn sample(&mut self) -> Result<f32, S::Error> {
        let raw = self.sensor.read_raw()?;
        Ok(self.calibration.to_volts(raw))
    }

    /// Whether a voltage reading clears the cutoff.
    #[inline]
    pub fn is_safe_volts(&self, volts: f32) -> bool {
        volts >= self.calibration.cutoff_volts
    }

    /// The active calibration.
    #[inline]
    pub fn calibration(&self) -> &VoltageCalibration {
        &self.calibration
    }

    /// Sample once and, when the pack reads unsafe, force the drive to stop.
    ///
    /// Returns `Ok(true)` when movement is allowed and `Ok(false)` when the
    /// reading was below the cutoff (drive already stopped). A sensor error
    /// also stops the drive best-effort before propagating, since a command
    /// was about to be gated on a reading we no longer trust.
    pub fn enforce<O, P>(
        &mut self,
        drive: &mut DriveController<O, P>,
    ) -> Result<bool, S::Error>
    where
        O: DigitalOutput<Error = S::Error>,
        P: PwmOutput<Error = S::Error>,
    {
        let volts = match self.sample() {
            Ok(v) => v,
            Err(e) => {
                let _ = drive.stop();
                return Err(e);
            }
        };
        if self.is_safe_volts(volts) {
            Ok(true)
        } else {
            drive.stop()?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveController, Duty, MotorGroup};
    use crate::hal::{MockBattery, MockPin, MockPwm};
    use crate::traits::Direction;

    fn mock_drive() -> (DriveController<MockPin, MockPwm>, [MockPin; 4]) {
        let pins = [
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
        ];
        let drive = DriveController::new(
            MotorGroup::new(pins[0].clone(), pins[1].clone(), MockPwm::new()),
            MotorGroup::new(pins[2].clone(), pins[3].clone(), MockPwm::new()),
        );
        (drive, pins)
    }

    #[test]
    fn conversion_formula_exact() {
        let cal = VoltageCalibration::default();
        assert_eq!(cal.to_volts(0), 0.0);
        // raw=2000: 2000/4095 * 3.3 * 2.0 ≈ 3.2234
        assert!((cal.to_volts(2000) - 3.2234).abs() < 1e-3);
        // full scale reads 6.6 V with the default divider, still below 7.0
        assert!((cal.to_volts(4095) - 6.6).abs() < 1e-6);
    }

    #[test]
    fn default_calibration_saturates_below_cutoff() {
        let cal = VoltageCalibration::default();
        let mut monitor = BatteryMonitor::new(MockBattery::new(4095), cal);
        let volts = monitor.sample().unwrap();
        assert!(!monitor.is_safe_volts(volts));
    }

    #[test]
    fn cutoff_boundary() {
        let cal = VoltageCalibration::default().with_divider_ratio(3.0);
        let monitor = BatteryMonitor::new(MockBattery::new(0), cal);
        assert!(monitor.is_safe_volts(7.0));
        assert!(monitor.is_safe_volts(8.4));
        assert!(!monitor.is_safe_volts(6.999));
        assert!(!monitor.is_safe_volts(0.0));
    }

    #[test]
    fn sample_reads_fresh_every_call() {
        let battery = MockBattery::new(1000);
        let mut monitor = BatteryMonitor::new(battery.clone(), VoltageCalibration::default());
        let first = monitor.sample().unwrap();
        battery.set_raw(3000);
        let second = monitor.sample().unwrap();
        assert!(second > first * 2.5);
        assert_eq!(battery.reads(), 2);
    }

    #[test]
    fn enforce_allows_movement_when_safe() {
        // 3.0 divider: raw=4000 -> 4000/4095*3.3*3.0 ≈ 9.67 V
        let cal = VoltageCalibration::default().with_divider_ratio(3.0);
        let mut monitor = BatteryMonitor::new(MockBattery::new(4000), cal);
        let (mut drive, pins) = mock_drive();
        drive.drive(Direction::Forward, Duty::DEFAULT).unwrap();

        assert!(monitor.enforce(&mut drive).unwrap());
        // drive untouched
        assert!(pins[0].level() && pins[2].level());
    }

    #[test]
    fn enforce_stops_drive_when_unsafe() {
        let mut monitor =
            BatteryMonitor::new(MockBattery::new(2000), VoltageCalibration::default());
        let (mut drive, pins) = mock_drive();
        drive.drive(Direction::Forward, Duty::DEFAULT).unwrap();

        assert!(!monitor.enforce(&mut drive).unwrap());
        assert!(pins.iter().all(|p| !p.level()));
        assert_eq!(drive.state().duty, Duty::ZERO);
    }

    #[test]
    fn no_latch_recovers_on_next_safe_reading() {
        let battery = MockBattery::new(2000);
        let cal = VoltageCalibration::default().with_divider_ratio(3.0);
        let mut monitor = BatteryMonitor::new(battery.clone(), cal);
        let (mut drive, _pins) = mock_drive();

        assert!(!monitor.enforce(&mut drive).unwrap());
        battery.set_raw(4000);
        assert!(monitor.enforce(&mut drive).unwrap());
    }
}
