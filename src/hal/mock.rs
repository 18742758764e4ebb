//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPin`] | [`DigitalOutput`] | Tracks level plus full write history |
//! | [`MockPwm`] | [`PwmOutput`] | Tracks duty plus full write history |
//! | [`MockBattery`] | [`VoltageSensor`] | Settable raw reading, counts reads |
//! | [`FlakyPin`] | [`DigitalOutput`] | Like `MockPin`, with fault injection |
//! | [`FlakyPwm`] | [`PwmOutput`] | Like `MockPwm`, with fault injection |
//! | [`FlakyBattery`] | [`VoltageSensor`] | Settable reading, injectable read failure |
//!
//! The `Mock*` types never fail (`Error = Infallible`). The `Flaky*` types
//! share one error type, [`MockFault`], so they can back a full vehicle and
//! exercise the hardware-fault paths: which write fails is injectable per
//! handle.
//!
//! All three are cheap shared handles: `clone()` returns another view of the
//! same underlying state, so tests can hand one handle to a controller and
//! keep another for inspection. The handles are `Send`, which also lets the
//! desktop server drive a full mock vehicle behind the web API.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::hal::MockPin;
//! use rs_rover::traits::DigitalOutput;
//!
//! let pin = MockPin::new();
//! let mut handle = pin.clone();
//! handle.set_level(true).unwrap();
//! handle.set_level(false).unwrap();
//!
//! assert!(!pin.level());
//! assert_eq!(pin.history(), vec![true, false]);
//! ```
//!
//! [`DigitalOutput`]: crate::traits::DigitalOutput
//! [`PwmOutput`]: crate::traits::PwmOutput
//! [`VoltageSensor`]: crate::traits::VoltageSensor

use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};

use core::convert::Infallible;
use std::sync::{Arc, Mutex};

/// Mock digital output pin.
///
/// Records every write so tests can assert not just the final level but the
/// exact write sequence (needed to verify there is no transient state where
/// a side's forward and backward lines are both high).
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    inner: Arc<Mutex<PinState>>,
}

#[derive(Debug, Default)]
struct PinState {
    level: bool,
    history: Vec<bool>,
}

impl MockPin {
    /// Creates a new mock pin, initially low with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output level.
    pub fn level(&self) -> bool {
        self.inner.lock().unwrap().level
    }

    /// Every level ever written, in order.
    pub fn history(&self) -> Vec<bool> {
        self.inner.lock().unwrap().history.clone()
    }

    /// Number of writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().history.len()
    }
}

impl DigitalOutput for MockPin {
    type Error = Infallible;

    fn set_level(&mut self, high: bool) -> Result<(), Infallible> {
        let mut state = self.inner.lock().unwrap();
        state.level = high;
        state.history.push(high);
        Ok(())
    }
}

/// Mock PWM channel.
///
/// Records every duty write, same shared-handle shape as [`MockPin`].
#[derive(Clone, Debug, Default)]
pub struct MockPwm {
    inner: Arc<Mutex<PwmState>>,
}

#[derive(Debug, Default)]
struct PwmState {
    duty: u16,
    history: Vec<u16>,
}

impl MockPwm {
    /// Creates a new mock PWM channel at duty zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current duty value.
    pub fn duty(&self) -> u16 {
        self.inner.lock().unwrap().duty
    }

    /// Every duty ever written, in order.
    pub fn history(&self) -> Vec<u16> {
        self.inner.lock().unwrap().history.clone()
    }
}

impl PwmOutput for MockPwm {
    type Error = Infallible;

    fn set_duty(&mut self, duty: u16) -> Result<(), Infallible> {
        let mut state = self.inner.lock().unwrap();
        state.duty = duty;
        state.history.push(duty);
        Ok(())
    }
}

/// Mock battery sensor.
///
/// Returns a settable raw ADC count and counts how many reads were taken, so
/// tests can assert which code paths sample the battery (and how often).
///
/// # Example
///
/// ```rust
/// use rs_rover::hal::MockBattery;
/// use rs_rover::traits::VoltageSensor;
///
/// let battery = MockBattery::new(2000);
/// let mut handle = battery.clone();
/// assert_eq!(handle.read_raw().unwrap(), 2000);
///
/// battery.set_raw(4000);
/// assert_eq!(handle.read_raw().unwrap(), 4000);
/// assert_eq!(battery.reads(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockBattery {
    inner: Arc<Mutex<BatteryState>>,
}

#[derive(Debug, Default)]
struct BatteryState {
    raw: u16,
    reads: usize,
}

impl MockBattery {
    /// Creates a mock battery returning the given raw count.
    pub fn new(raw: u16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BatteryState { raw, reads: 0 })),
        }
    }

    /// Change the raw count returned by subsequent reads.
    pub fn set_raw(&self, raw: u16) {
        self.inner.lock().unwrap().raw = raw;
    }

    /// Number of reads taken so far.
    pub fn reads(&self) -> usize {
        self.inner.lock().unwrap().reads
    }
}

impl VoltageSensor for MockBattery {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Infallible> {
        let mut state = self.inner.lock().unwrap();
        state.reads += 1;
        Ok(state.raw)
    }
}

/// Error injected by the flaky mocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockFault;

/// Mock direction line with fault injection.
///
/// Behaves like [`MockPin`] until `fail_on_write(n)` arms a failure: the nth
/// write (zero-based, counting attempts) returns [`MockFault`] and leaves the
/// level and history untouched. Writes before and after the armed one
/// succeed normally.
#[derive(Clone, Debug, Default)]
pub struct FlakyPin {
    inner: Arc<Mutex<FlakyPinState>>,
}

#[derive(Debug, Default)]
struct FlakyPinState {
    level: bool,
    history: Vec<bool>,
    attempts: usize,
    fail_on: Option<usize>,
}

impl FlakyPin {
    /// Creates a pin that behaves like [`MockPin`] until a failure is armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure for the nth write attempt (zero-based).
    pub fn fail_on_write(&self, attempt: usize) {
        self.inner.lock().unwrap().fail_on = Some(attempt);
    }

    /// Current output level.
    pub fn level(&self) -> bool {
        self.inner.lock().unwrap().level
    }

    /// Every successful write, in order.
    pub fn history(&self) -> Vec<bool> {
        self.inner.lock().unwrap().history.clone()
    }
}

impl DigitalOutput for FlakyPin {
    type Error = MockFault;

    fn set_level(&mut self, high: bool) -> Result<(), MockFault> {
        let mut state = self.inner.lock().unwrap();
        let attempt = state.attempts;
        state.attempts += 1;
        if state.fail_on == Some(attempt) {
            return Err(MockFault);
        }
        state.level = high;
        state.history.push(high);
        Ok(())
    }
}

/// Mock PWM channel with fault injection, counterpart of [`FlakyPin`].
#[derive(Clone, Debug, Default)]
pub struct FlakyPwm {
    inner: Arc<Mutex<FlakyPwmState>>,
}

#[derive(Debug, Default)]
struct FlakyPwmState {
    duty: u16,
    attempts: usize,
    fail_on: Option<usize>,
}

impl FlakyPwm {
    /// Creates a channel at duty zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure for the nth duty write (zero-based).
    pub fn fail_on_write(&self, attempt: usize) {
        self.inner.lock().unwrap().fail_on = Some(attempt);
    }

    /// Current duty value.
    pub fn duty(&self) -> u16 {
        self.inner.lock().unwrap().duty
    }
}

impl PwmOutput for FlakyPwm {
    type Error = MockFault;

    fn set_duty(&mut self, duty: u16) -> Result<(), MockFault> {
        let mut state = self.inner.lock().unwrap();
        let attempt = state.attempts;
        state.attempts += 1;
        if state.fail_on == Some(attempt) {
            return Err(MockFault);
        }
        state.duty = duty;
        Ok(())
    }
}

/// Mock battery sensor whose next read can be made to fail.
#[derive(Clone, Debug, Default)]
pub struct FlakyBattery {
    inner: Arc<Mutex<FlakyBatteryState>>,
}

#[derive(Debug, Default)]
struct FlakyBatteryState {
    raw: u16,
    fail_next: bool,
}

impl FlakyBattery {
    /// Creates a battery returning the given raw count.
    pub fn new(raw: u16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FlakyBatteryState {
                raw,
                fail_next: false,
            })),
        }
    }

    /// Change the raw count returned by subsequent reads.
    pub fn set_raw(&self, raw: u16) {
        self.inner.lock().unwrap().raw = raw;
    }

    /// Make the next read fail; the one after succeeds again.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }
}

impl VoltageSensor for FlakyBattery {
    type Error = MockFault;

    fn read_raw(&mut self) -> Result<u16, MockFault> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_next {
            state.fail_next = false;
            return Err(MockFault);
        }
        Ok(state.raw)
    }
}
