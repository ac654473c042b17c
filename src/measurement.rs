//! Measurement model and derived quantities.
//!
//! A [`Reading`] is one compensated sensor sample plus the derived dew
//! point. Humidity and dew point are absent when the detected chip is a
//! BMP280, which has no humidity channel.

use crate::sensor::Sample;

/// Magnus formula coefficient alpha (dimensionless).
const MAGNUS_ALPHA: f32 = 17.62;

/// Magnus formula coefficient beta in degrees Celsius.
const MAGNUS_BETA: f32 = 243.12;

/// One environmental reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Barometric pressure in hPa.
    pub pressure: f32,
    /// Relative humidity in percent, if the sensor has a humidity channel.
    pub humidity: Option<f32>,
    /// Dew point in degrees Celsius, derived from temperature and humidity.
    pub dew_point: Option<f32>,
}

impl Reading {
    /// Build a reading from a compensated sample, deriving the dew point
    /// when humidity is available.
    pub fn from_sample(sample: &Sample) -> Self {
        let dew = sample
            .humidity
            .map(|rh| dew_point(sample.temperature_c, rh));

        Self {
            temperature: sample.temperature_c,
            pressure: sample.pressure_hpa,
            humidity: sample.humidity,
            dew_point: dew,
        }
    }
}

/// Dew point in degrees Celsius via the Magnus formula.
///
/// `relative_humidity` is in percent (0-100). Accuracy is about +/-0.35 C
/// over the -45 C to +60 C range, which is well inside the BME280's own
/// measurement error.
pub fn dew_point(temperature_c: f32, relative_humidity: f32) -> f32 {
    // gamma = ln(RH/100) + alpha*T / (beta + T)
    let gamma = (relative_humidity / 100.0).ln()
        + MAGNUS_ALPHA * temperature_c / (MAGNUS_BETA + temperature_c);
    MAGNUS_BETA * gamma / (MAGNUS_ALPHA - gamma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dew_point_room_conditions() {
        // 20 C at 50% RH is a well-known reference point, ~9.3 C
        let dew = dew_point(20.0, 50.0);
        assert!((dew - 9.3).abs() < 0.1, "dew point was {}", dew);
    }

    #[test]
    fn test_dew_point_warm_humid() {
        // 25 C at 60% RH, ~16.7 C
        let dew = dew_point(25.0, 60.0);
        assert!((dew - 16.7).abs() < 0.1, "dew point was {}", dew);
    }

    #[test]
    fn test_dew_point_at_saturation_equals_temperature() {
        // At 100% RH, ln(1) = 0 and the formula collapses to T
        for t in [-10.0f32, 0.0, 15.0, 30.0] {
            let dew = dew_point(t, 100.0);
            assert!((dew - t).abs() < 0.01, "dew point at {} C was {}", t, dew);
        }
    }

    #[test]
    fn test_dew_point_below_temperature_when_unsaturated() {
        let dew = dew_point(18.0, 40.0);
        assert!(dew < 18.0);
    }

    #[test]
    fn test_reading_with_humidity() {
        let sample = Sample {
            temperature_c: 21.5,
            pressure_hpa: 1013.2,
            humidity: Some(55.0),
        };
        let reading = Reading::from_sample(&sample);
        assert_eq!(reading.temperature, 21.5);
        assert_eq!(reading.pressure, 1013.2);
        assert_eq!(reading.humidity, Some(55.0));
        let dew = reading.dew_point.unwrap();
        assert!(dew > 0.0 && dew < 21.5);
    }

    #[test]
    fn test_reading_without_humidity_has_no_dew_point() {
        let sample = Sample {
            temperature_c: 21.5,
            pressure_hpa: 1013.2,
            humidity: None,
        };
        let reading = Reading::from_sample(&sample);
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.dew_point, None);
    }
}
