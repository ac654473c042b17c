//! Environmental sensor reporting firmware binary.
//!
//! One wake cycle: connect Wi-Fi, probe the sensor, read it, POST the
//! reading as JSON, deep-sleep for the rest of the runtime interval. Every
//! path ends in deep sleep; a failed cycle just means the endpoint gets an
//! error payload (or nothing) until the next wake.

#[cfg(feature = "esp32")]
fn main() -> ! {
    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();

    // Initialize ESP-IDF logger for log crate integration
    esp_idf_svc::log::EspLogger::initialize_default();

    let started = std::time::Instant::now();
    log::info!("=== envsense starting ===");

    if let Err(e) = run() {
        log::error!("Wake cycle failed: {}", e);
    }

    let sleep_for = envsense_esp32::sleep::remaining_sleep(
        envsense_esp32::config::RUNTIME_INTERVAL,
        started.elapsed(),
        envsense_esp32::config::MIN_SLEEP,
    );
    envsense_esp32::sleep::enter(sleep_for)
}

#[cfg(feature = "esp32")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use envsense_esp32::config::{self, Config};
    use envsense_esp32::measurement::Reading;
    use envsense_esp32::report::{self, Payload};
    use envsense_esp32::sensor::{Bme280, ProbePolicy, SensorError};
    use envsense_esp32::status::{ErrorCode, LedSignaler};
    use envsense_esp32::wifi::WifiManager;
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::OutputPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use log::{error, info, warn};

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let mut led = LedSignaler::new(peripherals.pins.gpio2.downgrade_output())?;

    let config = match Config::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            led.signal(ErrorCode::ConfigInvalid);
            return Err(e.into());
        }
    };
    info!(
        "Reporting as '{}' to {}",
        config.device_name, config.endpoint
    );

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(config::I2C_BAUDRATE_HZ)),
    )?;

    let mut wifi = WifiManager::new(peripherals.modem, sysloop)?;
    if let Err(e) = wifi.connect(&config.wifi) {
        led.signal(ErrorCode::WifiFailed);
        return Err(e.into());
    }

    let mut delay = FreeRtos;
    let payload_json = match Bme280::probe(i2c, &mut delay, &ProbePolicy::default()) {
        Ok(mut sensor) => {
            let sample = sensor.measure(&mut delay)?;
            let reading = Reading::from_sample(&sample);
            info!(
                "pressure {:.2} hPa, temperature {:.2} C, humidity {:?}, dew point {:?}",
                reading.pressure, reading.temperature, reading.humidity, reading.dew_point
            );
            Payload::reading(&config.device_name, &reading).to_json()?
        }
        Err(e @ SensorError::NotDetected) | Err(e @ SensorError::UnsupportedChip(_)) => {
            warn!("{}", e);
            led.signal(ErrorCode::SensorNotFound);
            Payload::failure(&config.device_name, report::SENSOR_NOT_FOUND).to_json()?
        }
        Err(e) => {
            led.signal(ErrorCode::SensorNotFound);
            return Err(e.into());
        }
    };

    info!("Payload: {}", payload_json);
    match report::post_json(&config.endpoint, &payload_json) {
        Ok(outcome) => {
            info!("Response status: {}", outcome.status);
            info!("Response body: {}", outcome.body);
            if !outcome.is_success() {
                warn!("Endpoint rejected the payload");
            }
        }
        Err(e) => {
            led.signal(ErrorCode::PostFailed);
            error!("{}", e);
        }
    }

    if let Err(e) = wifi.disconnect() {
        warn!("Wi-Fi disconnect failed: {:?}", e);
    }

    Ok(())
}

#[cfg(not(feature = "esp32"))]
fn main() {
    use envsense_esp32::measurement::Reading;
    use envsense_esp32::report::Payload;
    use envsense_esp32::sensor::Sample;

    env_logger::init();

    // Simulate one cycle's payload so the reporting path can be exercised
    // without hardware.
    let sample = Sample {
        temperature_c: 21.5,
        pressure_hpa: 1013.25,
        humidity: Some(48.0),
    };
    let reading = Reading::from_sample(&sample);
    match Payload::reading("envsense-host", &reading).to_json() {
        Ok(json) => log::info!("Simulated payload: {}", json),
        Err(e) => log::error!("Serialization failed: {}", e),
    }

    println!("This binary requires the 'esp32' feature for hardware support.");
    println!("Use 'cargo test' for host testing.");
}
