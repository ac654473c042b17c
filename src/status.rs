//! Error signaling over the status LED.
//!
//! Each failure class has a small numeric code; the LED blinks that many
//! pulses before the device goes back to sleep, which is the only feedback
//! channel left once the network is unreachable.

use std::fmt;

#[cfg(feature = "esp32")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(feature = "esp32")]
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
#[cfg(feature = "esp32")]
use esp_idf_sys::EspError;
#[cfg(feature = "esp32")]
use log::warn;

/// How long the LED stays on (and off) per pulse, in milliseconds.
pub const BLINK_PERIOD_MS: u32 = 200;

/// Failure classes a wake cycle can signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Compile-time configuration failed validation.
    ConfigInvalid,
    /// No sensor answered the I2C probe.
    SensorNotFound,
    /// Wi-Fi association or DHCP failed.
    WifiFailed,
    /// The HTTP POST could not be completed.
    PostFailed,
}

impl ErrorCode {
    /// Numeric code, also the number of LED pulses.
    pub fn code(&self) -> u8 {
        match self {
            Self::ConfigInvalid => 1,
            Self::SensorNotFound => 2,
            Self::WifiFailed => 3,
            Self::PostFailed => 4,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigInvalid => write!(f, "invalid configuration (code 1)"),
            Self::SensorNotFound => write!(f, "sensor not found (code 2)"),
            Self::WifiFailed => write!(f, "Wi-Fi failed (code 3)"),
            Self::PostFailed => write!(f, "POST failed (code 4)"),
        }
    }
}

/// Status LED driver.
#[cfg(feature = "esp32")]
pub struct LedSignaler<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

#[cfg(feature = "esp32")]
impl<'d> LedSignaler<'d> {
    /// Take over the status LED pin.
    pub fn new(pin: AnyOutputPin) -> Result<Self, EspError> {
        let pin = PinDriver::output(pin)?;
        Ok(Self { pin })
    }

    /// Blink the numeric error code.
    pub fn signal(&mut self, code: ErrorCode) {
        warn!("Signaling error: {}", code);
        for _ in 0..code.code() {
            // LED failures are not worth aborting the cycle over
            if self.pin.set_high().is_err() {
                return;
            }
            FreeRtos::delay_ms(BLINK_PERIOD_MS);
            if self.pin.set_low().is_err() {
                return;
            }
            FreeRtos::delay_ms(BLINK_PERIOD_MS);
        }
    }
}
