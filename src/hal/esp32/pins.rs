//! ESP32 GPIO, LEDC PWM, and ADC implementations of the hardware traits.
//!
//! The drive electronics are an L298N-style dual H-bridge: each wheel side
//! takes two direction lines plus one enable pin driven with PWM. The
//! battery is sensed through a 2:1 resistor divider into an ADC1 pin.

use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::{AnyOutputPin, Gpio35, Level, Output, PinDriver};
use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;

/// One H-bridge direction line on an ESP32 GPIO.
///
/// The line is driven low at construction so the motor side starts released.
///
/// # Example
///
/// ```ignore
/// use rs_rover::hal::esp32::Esp32Pin;
///
/// let peripherals = Peripherals::take()?;
/// let pin = Esp32Pin::new(peripherals.pins.gpio27.downgrade_output())?;
/// ```
pub struct Esp32Pin<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> Esp32Pin<'d> {
    /// Creates a direction line from any output-capable GPIO, driven low.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: AnyOutputPin) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }
}

impl DigitalOutput for Esp32Pin<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.pin
            .set_level(if high { Level::High } else { Level::Low })
    }
}

/// One wheel side's enable pin driven by the LEDC peripheral.
///
/// 10-bit resolution (1024 duty steps) so the LEDC duty range matches the
/// drive layer's `[0, 1023]` scale directly.
pub struct Esp32Pwm<'d> {
    pwm: LedcDriver<'d>,
}

impl<'d> Esp32Pwm<'d> {
    /// PWM resolution (10-bit = 1024 steps)
    const PWM_RESOLUTION: Resolution = Resolution::Bits10;

    /// Creates a PWM channel at the given frequency, starting at duty zero.
    ///
    /// # Arguments
    ///
    /// * `timer` - LEDC timer peripheral (one per wheel side)
    /// * `channel` - LEDC channel peripheral
    /// * `pin` - GPIO for the H-bridge enable input
    /// * `freq_hz` - PWM frequency in Hz (1 kHz matches the drive electronics)
    ///
    /// # Errors
    ///
    /// Returns an error if PWM initialization fails.
    pub fn new<T, TI, C, CI, P, PI>(
        timer: T,
        channel: C,
        pin: P,
        freq_hz: u32,
    ) -> Result<Self, esp_idf_hal::sys::EspError>
    where
        TI: esp_idf_hal::ledc::LedcTimer + 'd,
        T: Peripheral<P = TI> + 'd,
        CI: esp_idf_hal::ledc::LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        C: Peripheral<P = CI> + 'd,
        PI: esp_idf_hal::gpio::OutputPin + 'd,
        P: Peripheral<P = PI> + 'd,
    {
        let timer_config = TimerConfig::default()
            .frequency(freq_hz.Hz())
            .resolution(Self::PWM_RESOLUTION);
        let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;

        let mut pwm = LedcDriver::new(channel, &timer_driver, pin)?;
        pwm.set_duty(0)?;

        Ok(Self { pwm })
    }
}

impl PwmOutput for Esp32Pwm<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.pwm.set_duty(duty as u32)
    }
}

/// Battery voltage sensor on GPIO35 via ADC1.
///
/// DB_11 attenuation gives the full ~3.3 V input range the divider is sized
/// for. Readings are raw counts; conversion to volts happens in
/// [`BatteryMonitor`](crate::interlock::BatteryMonitor).
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::adc::oneshot::AdcDriver;
/// use rs_rover::hal::esp32::Esp32Battery;
///
/// let peripherals = Peripherals::take()?;
/// let adc = AdcDriver::new(peripherals.adc1)?;
/// let battery = Esp32Battery::new(&adc, peripherals.pins.gpio35)?;
/// ```
pub struct Esp32Battery<'d> {
    adc: AdcChannelDriver<'d, Gpio35, &'d AdcDriver<'d, ADC1>>,
}

impl<'d> Esp32Battery<'d> {
    /// Creates the battery sensor channel.
    ///
    /// # Arguments
    ///
    /// * `adc` - Reference to the ADC1 driver (must outlive this struct)
    /// * `pin` - GPIO35, the divider tap
    ///
    /// # Errors
    ///
    /// Returns an error if ADC channel initialization fails.
    pub fn new(
        adc: &'d AdcDriver<'d, ADC1>,
        pin: impl Peripheral<P = Gpio35> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let adc = AdcChannelDriver::new(adc, pin, &config)?;
        Ok(Self { adc })
    }
}

impl VoltageSensor for Esp32Battery<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        self.adc.read_raw()
    }
}
