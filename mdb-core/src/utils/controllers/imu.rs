//! Motion sensor drivers for the Motion-Drive Bot.
//!
//! Two devices are supported behind the common [`MotionSense`] trait: the
//! L3GD20 gyroscope on SPI and the LSM303DLHC accelerometer on I2C. Both
//! perform the same read → scale → magnitude pipeline; only the transport
//! and the per-LSB scale differ.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Operation, SpiDevice};

/// One engineering-unit sample from a motion sensor.
///
/// `magnitude` is the Euclidean norm of the three axes, precomputed so that
/// downstream consumers never touch the raw vector math.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub magnitude: f32,
}

impl MotionSample {
    /// Build a sample from scaled axis values, computing the magnitude.
    pub fn from_axes(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            magnitude: libm::sqrtf(x * x + y * y + z * z),
        }
    }
}

/// Errors a motion sensor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A bus transaction failed or timed out. Recoverable: the caller keeps
    /// the previous sample and tries again next cycle.
    Transport,
    /// Device identification failed at startup. Autonomous control is
    /// unavailable, manual commands still work.
    NotReady,
}

/// A device that produces one [`MotionSample`] per control cycle.
pub trait MotionSense {
    fn sample(&mut self) -> Result<MotionSample, SensorError>;
}

/// Decode a little-endian i16 register pair.
#[inline]
fn raw16(lo: u8, hi: u8) -> i16 {
    ((hi as i16) << 8) | lo as i16
}

// L3GD20 register map
const L3GD20_WHO_AM_I: u8 = 0x0F;
const L3GD20_CTRL_REG1: u8 = 0x20;
const L3GD20_CTRL_REG4: u8 = 0x23;
const L3GD20_OUT_X_L: u8 = 0x28;
const L3GD20_ID: u8 = 0xD4;
/// Address byte flags: read, register auto-increment.
const SPI_READ: u8 = 0x80;
const SPI_AUTO_INC: u8 = 0x40;
/// Sensitivity at ±250 dps, in dps/LSB.
const L3GD20_DPS_PER_LSB: f32 = 0.00875;

/// L3GD20 3-axis gyroscope on a dedicated SPI device.
#[derive(Debug)]
pub struct L3gd20<SPI> {
    spi: SPI,
}

impl<SPI> L3gd20<SPI>
where
    SPI: SpiDevice,
{
    /// Probe and configure the gyroscope.
    ///
    /// Verifies WHO_AM_I, then enables all axes at the default output rate
    /// with the ±250 dps range. A wrong ID yields `SensorError::NotReady`.
    pub fn new(spi: SPI) -> Result<Self, SensorError> {
        let mut gyro = Self { spi };

        let id = gyro.read_reg(L3GD20_WHO_AM_I)?;
        if id != L3GD20_ID {
            tracing::warn!("L3GD20 WHO_AM_I mismatch: 0x{:02X}", id);
            return Err(SensorError::NotReady);
        }

        gyro.write_reg(L3GD20_CTRL_REG1, 0xFF)?;
        gyro.write_reg(L3GD20_CTRL_REG4, 0x00)?;
        Ok(gyro)
    }

    /// Release the SPI device.
    pub fn free(self) -> SPI {
        self.spi
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[reg | SPI_READ]),
                Operation::Read(&mut buf),
            ])
            .map_err(|e| {
                tracing::warn!("gyro register read failed: {:?}", e);
                SensorError::Transport
            })?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.spi.write(&[reg, value]).map_err(|e| {
            tracing::warn!("gyro register write failed: {:?}", e);
            SensorError::Transport
        })
    }
}

impl<SPI> MotionSense for L3gd20<SPI>
where
    SPI: SpiDevice,
{
    /// Read OUT_X_L..OUT_Z_H in one auto-incremented burst and scale to
    /// degrees per second.
    fn sample(&mut self) -> Result<MotionSample, SensorError> {
        let mut buf = [0u8; 6];
        self.spi
            .transaction(&mut [
                Operation::Write(&[L3GD20_OUT_X_L | SPI_READ | SPI_AUTO_INC]),
                Operation::Read(&mut buf),
            ])
            .map_err(|e| {
                tracing::warn!("gyro burst read failed: {:?}", e);
                SensorError::Transport
            })?;

        let x = raw16(buf[0], buf[1]) as f32 * L3GD20_DPS_PER_LSB;
        let y = raw16(buf[2], buf[3]) as f32 * L3GD20_DPS_PER_LSB;
        let z = raw16(buf[4], buf[5]) as f32 * L3GD20_DPS_PER_LSB;
        Ok(MotionSample::from_axes(x, y, z))
    }
}

// LSM303DLHC accelerometer register map
const LSM303_ADDR: u8 = 0x19;
const LSM303_CTRL_REG1_A: u8 = 0x20;
const LSM303_CTRL_REG4_A: u8 = 0x23;
const LSM303_OUT_X_L_A: u8 = 0x28;
/// Register auto-increment flag for multi-byte reads.
const I2C_AUTO_INC: u8 = 0x80;
/// 10 Hz, normal mode, XYZ enabled.
const LSM303_REG1_CFG: u8 = 0x27;
/// Sensitivity at ±2 g, in g/LSB.
const LSM303_G_PER_LSB: f32 = 0.001;

/// LSM303DLHC 3-axis accelerometer on I2C.
#[derive(Debug)]
pub struct Lsm303dlhc<I2C> {
    i2c: I2C,
}

impl<I2C> Lsm303dlhc<I2C>
where
    I2C: I2c,
{
    /// Configure the accelerometer at 10 Hz / ±2 g and verify the
    /// configuration by reading CTRL_REG1_A back.
    ///
    /// The part has no accelerometer WHO_AM_I register, so the readback is
    /// the identification step; a mismatch yields `SensorError::NotReady`.
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut accel = Self { i2c };

        accel.write_reg(LSM303_CTRL_REG1_A, LSM303_REG1_CFG)?;
        accel.write_reg(LSM303_CTRL_REG4_A, 0x00)?;

        let readback = accel.read_reg(LSM303_CTRL_REG1_A)?;
        if readback != LSM303_REG1_CFG {
            tracing::warn!("LSM303DLHC CTRL_REG1_A readback: 0x{:02X}", readback);
            return Err(SensorError::NotReady);
        }
        Ok(accel)
    }

    /// Release the I2C bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(LSM303_ADDR, &[reg], &mut buf)
            .map_err(|e| {
                tracing::warn!("accel register read failed: {:?}", e);
                SensorError::Transport
            })?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(LSM303_ADDR, &[reg, value]).map_err(|e| {
            tracing::warn!("accel register write failed: {:?}", e);
            SensorError::Transport
        })
    }
}

impl<I2C> MotionSense for Lsm303dlhc<I2C>
where
    I2C: I2c,
{
    /// Read the six output registers in one auto-incremented burst and scale
    /// to g.
    fn sample(&mut self) -> Result<MotionSample, SensorError> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(LSM303_ADDR, &[LSM303_OUT_X_L_A | I2C_AUTO_INC], &mut buf)
            .map_err(|e| {
                tracing::warn!("accel burst read failed: {:?}", e);
                SensorError::Transport
            })?;

        let x = raw16(buf[0], buf[1]) as f32 * LSM303_G_PER_LSB;
        let y = raw16(buf[2], buf[3]) as f32 * LSM303_G_PER_LSB;
        let z = raw16(buf[4], buf[5]) as f32 * LSM303_G_PER_LSB;
        Ok(MotionSample::from_axes(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_is_euclidean_norm() {
        let s = MotionSample::from_axes(3.0, 4.0, 0.0);
        assert!((s.magnitude - 5.0).abs() < 1e-6);
    }

    #[test]
    fn raw16_is_little_endian_signed() {
        assert_eq!(raw16(0xFF, 0xFF), -1);
        assert_eq!(raw16(0x34, 0x12), 0x1234);
    }
}
