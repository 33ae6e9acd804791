//! Throttled telemetry sampling

mod sampler;

pub use sampler::{BatteryReading, SampleRefresh, TelemetrySample, TelemetrySampler};
