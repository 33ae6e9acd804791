//! AXP192 power management IC (I2C)
//!
//! Used for battery voltage only.

use embedded_hal::i2c::I2c;

/// 7-bit bus address
pub const AXP192_ADDR: u8 = 0x34;

/// Battery voltage, 12 bits split over two registers
const REG_BAT_VOLTAGE_H: u8 = 0x78;
/// mV per LSB
const VOLTAGE_LSB_MV: f32 = 1.1;

/// AXP192 driver
#[derive(Debug, Clone, Copy)]
pub struct Axp192 {
    address: u8,
}

impl Default for Axp192 {
    fn default() -> Self {
        Self::new(AXP192_ADDR)
    }
}

impl Axp192 {
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Battery voltage in volts
    pub fn battery_voltage<I: I2c>(&self, i2c: &mut I) -> Result<f32, I::Error> {
        let mut raw = [0u8; 2];
        i2c.write_read(self.address, &[REG_BAT_VOLTAGE_H], &mut raw)?;
        let counts = (u16::from(raw[0]) << 4) | u16::from(raw[1] & 0x0F);
        Ok(f32::from(counts) * VOLTAGE_LSB_MV / 1000.0)
    }
}

/// Charge estimate from a LiPo cell voltage
///
/// Piecewise linear over 3.30 / 3.73 / 3.95 / 4.10 V.
pub fn battery_percent(volts: f32) -> u8 {
    let pct = if volts >= 4.1 {
        100.0
    } else if volts >= 3.95 {
        75.0 + (volts - 3.95) / 0.15 * 25.0
    } else if volts >= 3.73 {
        25.0 + (volts - 3.73) / 0.22 * 50.0
    } else if volts >= 3.3 {
        (volts - 3.3) / 0.43 * 25.0
    } else {
        0.0
    };
    pct.clamp(0.0, 100.0) as u8
}
