//! Hardware abstraction traits for motor outputs and battery sensing.
//!
//! This module defines the narrow hardware interfaces that allow rs-rover to
//! run across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`DigitalOutput`] | One H-bridge direction line (forward or backward) |
//! | [`PwmOutput`] | One PWM channel controlling a wheel side's duty |
//! | [`VoltageSensor`] | One analog input sampling the battery divider |
//!
//! The core never touches peripheral registers itself; everything it does to
//! the outside world goes through these three traits.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::traits::{Direction, DigitalOutput};
//! use rs_rover::hal::MockPin;
//!
//! let mut pin = MockPin::new();
//! pin.set_level(true).unwrap();
//! assert!(pin.level());
//!
//! assert_eq!(Direction::from_token("forward"), Some(Direction::Forward));
//! ```

/// Semantic motion command for the vehicle.
///
/// Unlike a per-wheel forward/backward signal, this names the motion of the
/// whole vehicle; the drive controller expands it into the per-side output
/// pattern. Turns are pivot turns (sides spin in opposite directions).
///
/// # Default
///
/// Defaults to [`Stop`](Self::Stop) for safety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Both sides forward.
    Forward,
    /// Both sides backward.
    Backward,
    /// Pivot left: left side backward, right side forward.
    Left,
    /// Pivot right: left side forward, right side backward.
    Right,
    /// All outputs cleared, duty zero.
    #[default]
    Stop,
}

impl Direction {
    /// Returns the direction as its lowercase command token.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_rover::Direction;
    ///
    /// assert_eq!(Direction::Forward.as_str(), "forward");
    /// assert_eq!(Direction::Stop.as_str(), "stop");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Stop => "stop",
        }
    }

    /// Parse a direction from an exact command token.
    ///
    /// Only the five lowercase tokens are recognized, matched exactly and
    /// case-sensitively. Routing a request path to a bare token is the
    /// transport's job; this layer never does substring matching.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_rover::Direction;
    ///
    /// assert_eq!(Direction::from_token("forward"), Some(Direction::Forward));
    /// assert_eq!(Direction::from_token("backward"), Some(Direction::Backward));
    /// assert_eq!(Direction::from_token("left"), Some(Direction::Left));
    /// assert_eq!(Direction::from_token("right"), Some(Direction::Right));
    /// assert_eq!(Direction::from_token("stop"), Some(Direction::Stop));
    ///
    /// assert_eq!(Direction::from_token("FORWARD"), None);
    /// assert_eq!(Direction::from_token(" forward"), None);
    /// assert_eq!(Direction::from_token("forwards"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Direction::Forward),
            "backward" => Some(Direction::Backward),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "stop" => Some(Direction::Stop),
            _ => None,
        }
    }

    /// Returns true for commands that move the vehicle (everything but stop).
    #[inline]
    pub const fn is_movement(&self) -> bool {
        !matches!(self, Direction::Stop)
    }
}

/// One digital output line of an H-bridge (a forward or backward signal).
///
/// Implementations are expected to be infallible on most targets; the
/// associated `Error` exists so targets with fallible GPIO writes can
/// surface a hardware fault instead of silently dropping it.
pub trait DigitalOutput {
    /// Error type for output writes.
    type Error;

    /// Drive the line high (`true`) or low (`false`).
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// One PWM channel controlling the duty cycle of a wheel side.
///
/// Duty is on the fixed integer scale `[0, MAX_DUTY]` (see
/// [`Duty`](crate::drive::Duty)); implementations must not rescale.
pub trait PwmOutput {
    /// Error type for duty updates.
    type Error;

    /// Set the raw duty value.
    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error>;
}

/// One analog input sampling the battery through a resistor divider.
///
/// Returns the raw ADC count; conversion to volts is owned by
/// [`BatteryMonitor`](crate::interlock::BatteryMonitor) so calibration lives
/// in one place.
pub trait VoltageSensor {
    /// Error type for ADC reads.
    type Error;

    /// Take one raw sample. No averaging, no caching.
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}
