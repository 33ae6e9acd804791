//! MPU6886 accelerometer (I2C)
//!
//! Only the accelerometer is used. Range is set to ±8 g, which gives
//! 4096 LSB/g.

use embedded_hal::i2c::I2c;
use tenbin_hal::Accel;

/// 7-bit bus address
pub const MPU6886_ADDR: u8 = 0x68;

/// Expected `WHO_AM_I` value
pub const WHO_AM_I_VALUE: u8 = 0x19;

/// Register map (subset)
pub mod reg {
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// ±8 g full scale
const ACCEL_FS_8G: u8 = 0x10;
/// ±2000 dps full scale
const GYRO_FS_2000DPS: u8 = 0x18;
const LSB_PER_G: f32 = 4096.0;

/// MPU6886 driver
///
/// Stateless apart from the address; the bus is lent per call so the
/// PMIC can share it.
#[derive(Debug, Clone, Copy)]
pub struct Mpu6886 {
    address: u8,
}

impl Default for Mpu6886 {
    fn default() -> Self {
        Self::new(MPU6886_ADDR)
    }
}

impl Mpu6886 {
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Wake the device and configure ranges
    ///
    /// Returns the `WHO_AM_I` value read back; the caller decides what a
    /// mismatch means.
    pub fn init<I: I2c>(&self, i2c: &mut I) -> Result<u8, I::Error> {
        i2c.write(self.address, &[reg::PWR_MGMT_1, 0x00])?;
        i2c.write(self.address, &[reg::ACCEL_CONFIG, ACCEL_FS_8G])?;
        i2c.write(self.address, &[reg::GYRO_CONFIG, GYRO_FS_2000DPS])?;

        let mut who = [0u8; 1];
        i2c.write_read(self.address, &[reg::WHO_AM_I], &mut who)?;
        Ok(who[0])
    }

    /// Read acceleration in g
    pub fn read_accel<I: I2c>(&self, i2c: &mut I) -> Result<Accel, I::Error> {
        let mut raw = [0u8; 6];
        i2c.write_read(self.address, &[reg::ACCEL_XOUT_H], &mut raw)?;

        let axis = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as f32 / LSB_PER_G;
        Ok(Accel::new(
            axis(raw[0], raw[1]),
            axis(raw[2], raw[3]),
            axis(raw[4], raw[5]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bus::MockBus;

    #[test]
    fn test_init_sequence() {
        let mut bus = MockBus::new();
        bus.set(MPU6886_ADDR, reg::WHO_AM_I, &[WHO_AM_I_VALUE]);

        let who = Mpu6886::default().init(&mut bus).unwrap();

        assert_eq!(who, WHO_AM_I_VALUE);
        assert_eq!(bus.get(MPU6886_ADDR, reg::PWR_MGMT_1), 0x00);
        assert_eq!(bus.get(MPU6886_ADDR, reg::ACCEL_CONFIG), 0x10);
        assert_eq!(bus.get(MPU6886_ADDR, reg::GYRO_CONFIG), 0x18);
    }

    #[test]
    fn test_read_accel_scaling() {
        let mut bus = MockBus::new();
        // x = +1 g, y = -0.5 g, z = 0
        bus.set(
            MPU6886_ADDR,
            reg::ACCEL_XOUT_H,
            &[0x10, 0x00, 0xF8, 0x00, 0x00, 0x00],
        );

        let accel = Mpu6886::default().read_accel(&mut bus).unwrap();
        assert_eq!(accel, Accel::new(1.0, -0.5, 0.0));
    }
}
