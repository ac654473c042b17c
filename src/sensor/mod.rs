//! BME280 / BMP280 sensor acquisition.
//!
//! # Components
//!
//! - [`driver`] - register-level driver, generic over `embedded-hal` I2C
//! - [`probe`] - bounded retry schedule for sensor detection
//!
//! The driver only touches the bus through the `embedded-hal` traits, so it
//! runs against esp-idf-hal's `I2cDriver` on the device and against a fake
//! bus in host tests.

mod driver;
mod probe;

pub use driver::{Bme280, Calibration};
pub use probe::ProbePolicy;

use std::fmt;

/// Which chip answered the probe.
///
/// The BMP280 shares the register map and compensation scheme of the BME280
/// but has no humidity channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipModel {
    Bme280,
    Bmp280,
}

impl ChipModel {
    /// Whether this chip measures relative humidity.
    pub fn has_humidity(&self) -> bool {
        matches!(self, Self::Bme280)
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bme280 => write!(f, "BME280"),
            Self::Bmp280 => write!(f, "BMP280"),
        }
    }
}

/// One compensated sensor sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Barometric pressure in hPa.
    pub pressure_hpa: f32,
    /// Relative humidity in percent; `None` on BMP280.
    pub humidity: Option<f32>,
}

/// Errors that can occur during sensor acquisition.
#[derive(Debug)]
pub enum SensorError<E> {
    /// No sensor answered within the probe schedule.
    NotDetected,
    /// An address answered, but with a chip id this driver does not support.
    UnsupportedChip(u8),
    /// The I2C bus failed mid-transaction.
    Bus(E),
}

impl<E: fmt::Debug> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetected => write!(f, "no BME280 / BMP280 sensor detected"),
            Self::UnsupportedChip(id) => write!(f, "unsupported chip id: 0x{:02X}", id),
            Self::Bus(e) => write!(f, "I2C bus error: {:?}", e),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for SensorError<E> {}
