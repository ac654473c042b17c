//! Register-level BME280 / BMP280 driver.
//!
//! Supports both chips at either I2C address (0x76 primary, 0x77 secondary).
//! Compensation uses the Bosch integer reference formulas; raw trim values
//! live in [`Calibration`], whose parsing and math are pure and covered by
//! host tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use super::probe::ProbePolicy;
use super::{ChipModel, Sample, SensorError};

const ADDR_PRIMARY: u8 = 0x76;
const ADDR_SECONDARY: u8 = 0x77;

const REG_ID: u8 = 0xD0;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_DATA: u8 = 0xF7;
const REG_CALIB_TP: u8 = 0x88;
const REG_CALIB_H: u8 = 0xE1;

const CHIP_ID_BME280: u8 = 0x60;
const CHIP_ID_BMP280: u8 = 0x58;

/// Humidity oversampling x1.
const CTRL_HUM_X1: u8 = 0x01;
/// Standby 1000 ms, IIR filter off.
const CONFIG_STANDBY_1000MS: u8 = 0xA0;
/// Temperature x1, pressure x1, normal mode.
const CTRL_MEAS_NORMAL_X1: u8 = 0x27;

const SETTLE_MS: u32 = crate::config::SENSOR_SETTLE.as_millis() as u32;

/// Factory trim values read from the calibration registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    dig_t1: u16,
    dig_t2: i16,
    dig_t3: i16,
    dig_p1: u16,
    dig_p2: i16,
    dig_p3: i16,
    dig_p4: i16,
    dig_p5: i16,
    dig_p6: i16,
    dig_p7: i16,
    dig_p8: i16,
    dig_p9: i16,
    dig_h1: u8,
    dig_h2: i16,
    dig_h3: u8,
    dig_h4: i16,
    dig_h5: i16,
    dig_h6: i8,
}

impl Calibration {
    /// Parse the temperature/pressure trim block (26 bytes at 0x88..0xA1).
    ///
    /// The last byte of the block is `dig_H1` (register 0xA1); it is only
    /// meaningful on the BME280.
    fn from_tp_registers(block: &[u8; 26], model: ChipModel) -> Self {
        let mut cal = Self {
            dig_t1: u16::from_le_bytes([block[0], block[1]]),
            dig_t2: i16::from_le_bytes([block[2], block[3]]),
            dig_t3: i16::from_le_bytes([block[4], block[5]]),
            dig_p1: u16::from_le_bytes([block[6], block[7]]),
            dig_p2: i16::from_le_bytes([block[8], block[9]]),
            dig_p3: i16::from_le_bytes([block[10], block[11]]),
            dig_p4: i16::from_le_bytes([block[12], block[13]]),
            dig_p5: i16::from_le_bytes([block[14], block[15]]),
            dig_p6: i16::from_le_bytes([block[16], block[17]]),
            dig_p7: i16::from_le_bytes([block[18], block[19]]),
            dig_p8: i16::from_le_bytes([block[20], block[21]]),
            dig_p9: i16::from_le_bytes([block[22], block[23]]),
            ..Self::default()
        };
        if model.has_humidity() {
            cal.dig_h1 = block[25];
        }
        cal
    }

    /// Parse the humidity trim block (7 bytes at 0xE1..0xE8, BME280 only).
    ///
    /// `dig_H4` and `dig_H5` are 12-bit values sharing the nibbles of
    /// register 0xE5.
    fn parse_h_registers(&mut self, block: &[u8; 7]) {
        self.dig_h2 = i16::from_le_bytes([block[0], block[1]]);
        self.dig_h3 = block[2];
        self.dig_h4 = ((block[3] as i16) << 4) | ((block[4] as i16) & 0x0F);
        self.dig_h5 = ((block[5] as i16) << 4) | ((block[4] as i16) >> 4);
        self.dig_h6 = block[6] as i8;
    }

    /// Compensate a raw temperature reading.
    ///
    /// Returns degrees Celsius and the `t_fine` carry value the pressure and
    /// humidity compensations depend on.
    pub fn compensate_temperature(&self, adc_t: i32) -> (f32, i64) {
        let adc_t = adc_t as i64;
        let t1 = self.dig_t1 as i64;
        let t2 = self.dig_t2 as i64;
        let t3 = self.dig_t3 as i64;

        let var1 = (((adc_t >> 3) - (t1 << 1)) * t2) >> 11;
        let var2 = (((((adc_t >> 4) - t1) * ((adc_t >> 4) - t1)) >> 12) * t3) >> 14;
        let t_fine = var1 + var2;

        let temp_c = ((t_fine * 5 + 128) >> 8) as f32 / 100.0;
        (temp_c, t_fine)
    }

    /// Compensate a raw pressure reading, returning hPa.
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: i64) -> f32 {
        let mut var1 = t_fine - 128000;
        let mut var2 = var1 * var1 * (self.dig_p6 as i64);
        var2 += (var1 * (self.dig_p5 as i64)) << 17;
        var2 += (self.dig_p4 as i64) << 35;
        var1 = ((var1 * var1 * (self.dig_p3 as i64)) >> 8) + ((var1 * (self.dig_p2 as i64)) << 12);
        var1 = (((1i64 << 47) + var1) * (self.dig_p1 as i64)) >> 33;
        if var1 == 0 {
            // avoid division by zero with blank calibration
            return 0.0;
        }
        let mut p: i64 = 1048576 - adc_p as i64;
        p = (((p << 31) - var2) * 3125) / var1;
        var1 = ((self.dig_p9 as i64) * (p >> 13) * (p >> 13)) >> 25;
        var2 = ((self.dig_p8 as i64) * p) >> 19;
        p = ((p + var1 + var2) >> 8) + ((self.dig_p7 as i64) << 4);
        // result is Pa in Q24.8; 25600 = 256 * 100 converts to hPa
        (p as f32) / 25600.0
    }

    /// Compensate a raw humidity reading, returning percent clamped to
    /// 0.0-100.0.
    pub fn compensate_humidity(&self, adc_h: i32, t_fine: i64) -> f32 {
        let h1 = self.dig_h1 as i64;
        let h2 = self.dig_h2 as i64;
        let h3 = self.dig_h3 as i64;
        let h4 = self.dig_h4 as i64;
        let h5 = self.dig_h5 as i64;
        let h6 = self.dig_h6 as i64;

        let v = t_fine - 76800;
        let mut x = ((((adc_h as i64) << 14) - (h4 << 20) - h5 * v + 16384) >> 15)
            * (((((((v * h6) >> 10) * (((v * h3) >> 11) + 32768)) >> 10) + 2097152) * h2 + 8192)
                >> 14);
        x -= ((((x >> 15) * (x >> 15)) >> 7) * h1) >> 4;
        x = x.clamp(0, 419430400);
        // Q22.10 percent
        (x >> 12) as f32 / 1024.0
    }
}

/// BME280 / BMP280 driver over an `embedded-hal` I2C bus.
pub struct Bme280<I2C> {
    i2c: I2C,
    addr: u8,
    model: ChipModel,
    cal: Calibration,
}

impl<I2C: I2c> Bme280<I2C> {
    /// Probe the bus for a sensor, retrying per `policy`.
    ///
    /// Scans both addresses each attempt. A silent bus keeps retrying until
    /// the schedule is exhausted; an address that answers with an unknown
    /// chip id fails the probe immediately.
    pub fn probe<D: DelayNs>(
        mut i2c: I2C,
        delay: &mut D,
        policy: &ProbePolicy,
    ) -> Result<Self, SensorError<I2C::Error>> {
        let attempts = policy.attempts();
        info!("Searching for BME280 / BMP280 sensor ({} attempts)", attempts);

        for attempt in 1..=attempts {
            if let Some((addr, model)) = Self::detect(&mut i2c)? {
                info!("Found {} at 0x{:02X} (attempt {})", model, addr, attempt);
                if !model.has_humidity() {
                    info!("No humidity channel available");
                }
                return Self::initialize(i2c, addr, model);
            }
            if attempt < attempts {
                delay.delay_ms(policy.poll_interval().as_millis() as u32);
            }
        }

        warn!("Sensor not found after {} attempts", attempts);
        Err(SensorError::NotDetected)
    }

    /// Read the chip id register at both candidate addresses.
    fn detect(i2c: &mut I2C) -> Result<Option<(u8, ChipModel)>, SensorError<I2C::Error>> {
        for &addr in &[ADDR_PRIMARY, ADDR_SECONDARY] {
            let mut id = [0u8];
            if i2c.write_read(addr, &[REG_ID], &mut id).is_err() {
                // nothing ACKed this address, keep scanning
                continue;
            }
            match id[0] {
                CHIP_ID_BME280 => return Ok(Some((addr, ChipModel::Bme280))),
                CHIP_ID_BMP280 => return Ok(Some((addr, ChipModel::Bmp280))),
                other => return Err(SensorError::UnsupportedChip(other)),
            }
        }
        Ok(None)
    }

    /// Read calibration and switch the chip into normal mode.
    fn initialize(
        mut i2c: I2C,
        addr: u8,
        model: ChipModel,
    ) -> Result<Self, SensorError<I2C::Error>> {
        let mut tp = [0u8; 26];
        i2c.write_read(addr, &[REG_CALIB_TP], &mut tp)
            .map_err(SensorError::Bus)?;
        let mut cal = Calibration::from_tp_registers(&tp, model);

        if model.has_humidity() {
            let mut h = [0u8; 7];
            i2c.write_read(addr, &[REG_CALIB_H], &mut h)
                .map_err(SensorError::Bus)?;
            cal.parse_h_registers(&h);

            // ctrl_hum only latches once ctrl_meas is written afterwards
            i2c.write(addr, &[REG_CTRL_HUM, CTRL_HUM_X1])
                .map_err(SensorError::Bus)?;
        }

        i2c.write(addr, &[REG_CONFIG, CONFIG_STANDBY_1000MS])
            .map_err(SensorError::Bus)?;
        i2c.write(addr, &[REG_CTRL_MEAS, CTRL_MEAS_NORMAL_X1])
            .map_err(SensorError::Bus)?;

        Ok(Self {
            i2c,
            addr,
            model,
            cal,
        })
    }

    /// Wait for a measurement and read it back compensated.
    pub fn measure<D: DelayNs>(&mut self, delay: &mut D) -> Result<Sample, SensorError<I2C::Error>> {
        delay.delay_ms(SETTLE_MS);

        let mut raw = [0u8; 8];
        let len = if self.model.has_humidity() { 8 } else { 6 };
        self.i2c
            .write_read(self.addr, &[REG_DATA], &mut raw[..len])
            .map_err(SensorError::Bus)?;

        let adc_p = ((raw[0] as i32) << 12) | ((raw[1] as i32) << 4) | ((raw[2] as i32) >> 4);
        let adc_t = ((raw[3] as i32) << 12) | ((raw[4] as i32) << 4) | ((raw[5] as i32) >> 4);

        let (temperature_c, t_fine) = self.cal.compensate_temperature(adc_t);
        let pressure_hpa = self.cal.compensate_pressure(adc_p, t_fine);
        let humidity = if self.model.has_humidity() {
            let adc_h = ((raw[6] as i32) << 8) | (raw[7] as i32);
            Some(self.cal.compensate_humidity(adc_h, t_fine))
        } else {
            None
        };

        debug!(
            "sample: {:.2} C, {:.2} hPa, humidity {:?}",
            temperature_c, pressure_hpa, humidity
        );

        Ok(Sample {
            temperature_c,
            pressure_hpa,
            humidity,
        })
    }

    /// The detected chip model.
    pub fn model(&self) -> ChipModel {
        self.model
    }

    /// The I2C address the sensor answered at.
    pub fn address(&self) -> u8 {
        self.addr
    }
}
