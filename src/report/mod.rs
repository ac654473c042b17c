//! Reading payload and upload.
//!
//! # Components
//!
//! - [`Payload`] - the JSON object POSTed to the ingest endpoint
//! - [`http`] - blocking HTTP transport (ESP32 only)
//!
//! Every payload carries the device name. A successful cycle adds the
//! measured values; a cycle whose sensor probe failed adds an `error` string
//! instead, so the ingest side still sees the device check in.

#[cfg(feature = "esp32")]
pub mod http;

#[cfg(feature = "esp32")]
pub use http::{post_json, PostOutcome, ReportError};

use serde::Serialize;

use crate::measurement::Reading;

/// Error string reported when no sensor answered the probe.
pub const SENSOR_NOT_FOUND: &str = "BME280 / BMP280 not found";

/// JSON payload for one wake cycle.
///
/// Channels the sensor does not provide (humidity and dew point on a
/// BMP280) are omitted from the object rather than sent as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pressure: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dew_point: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> Payload<'a> {
    /// Payload for a successful reading.
    pub fn reading(name: &'a str, reading: &Reading) -> Self {
        Self {
            name,
            pressure: Some(reading.pressure),
            temperature: Some(reading.temperature),
            humidity: reading.humidity,
            dew_point: reading.dew_point,
            error: None,
        }
    }

    /// Payload for a cycle that produced no reading.
    pub fn failure(name: &'a str, error: &'a str) -> Self {
        Self {
            name,
            pressure: None,
            temperature: None,
            humidity: None,
            dew_point: None,
            error: Some(error),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
