//! Environmental sensor reporting firmware library.
//!
//! This library contains platform-independent components that can be tested
//! on the host machine without ESP32 hardware. Hardware-facing code
//! (I2C bus, Wi-Fi, HTTP transport, deep sleep, status LED) is gated
//! behind the `esp32` feature.

pub mod config;
pub mod measurement;
pub mod report;
pub mod sensor;
pub mod sleep;
pub mod status;
pub mod wifi;

// Re-export commonly used items
pub use config::{Config, ConfigError, WifiConfig};
pub use measurement::{dew_point, Reading};
pub use report::Payload;
pub use sensor::{ChipModel, ProbePolicy, Sample, SensorError};
pub use status::ErrorCode;
