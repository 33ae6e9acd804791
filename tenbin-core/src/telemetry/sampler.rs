//! Telemetry sampler
//!
//! Sensor and gauge reads cost bus time, so they run at fixed tick ratios
//! while gesture handling runs every tick. The sampler never blocks and
//! keeps only a tick counter and the last snapshot.

use tenbin_hal::{Accel, HardwarePort};

use crate::config::TelemetryConfig;

/// Battery gauge reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReading {
    /// Charge estimate (0..=100)
    pub level: u8,
    /// Terminal voltage in volts
    pub voltage: f32,
}

/// Immutable telemetry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySample {
    pub accel: Accel,
    pub battery: BatteryReading,
}

/// Which parts of the snapshot changed on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRefresh {
    pub accel: bool,
    pub battery: bool,
}

impl SampleRefresh {
    pub fn any(&self) -> bool {
        self.accel || self.battery
    }
}

/// Telemetry sampler
#[derive(Debug, Clone)]
pub struct TelemetrySampler {
    accel_every: u32,
    battery_every: u32,
    /// Counter period; a common multiple of both ratios so wrapping never
    /// skews the refresh cadence
    period: u32,
    counter: u32,
    sample: TelemetrySample,
}

impl TelemetrySampler {
    pub fn new(config: &TelemetryConfig) -> Self {
        let accel_every = config.accel_every_ticks.max(1);
        let battery_every = config.battery_every_ticks.max(1);
        Self {
            accel_every,
            battery_every,
            period: lcm(accel_every, battery_every),
            counter: 0,
            sample: TelemetrySample::default(),
        }
    }

    /// Advance one tick, refreshing whatever is due
    ///
    /// A failed read keeps the previous value and does not count as a
    /// refresh.
    pub fn tick<P: HardwarePort>(&mut self, port: &mut P) -> SampleRefresh {
        let mut refresh = SampleRefresh::default();

        if self.counter % self.accel_every == 0 {
            match port.read_accel() {
                Ok(accel) => {
                    self.sample.accel = accel;
                    refresh.accel = true;
                }
                Err(e) => debug!("Accel read failed: {:?}", e),
            }
        }

        if self.counter % self.battery_every == 0 {
            match (port.battery_level(), port.battery_voltage()) {
                (Ok(level), Ok(voltage)) => {
                    self.sample.battery = BatteryReading {
                        level: level.min(100),
                        voltage,
                    };
                    refresh.battery = true;
                }
                (Err(e), _) | (_, Err(e)) => debug!("Battery read failed: {:?}", e),
            }
        }

        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
        }

        refresh
    }

    /// Last snapshot
    pub fn sample(&self) -> TelemetrySample {
        self.sample
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple of two non-zero ratios, saturating at `u32::MAX`
fn lcm(a: u32, b: u32) -> u32 {
    let l = u64::from(a / gcd(a, b)) * u64::from(b);
    u32::try_from(l).unwrap_or(u32::MAX)
}
