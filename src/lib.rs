//! P1 smart meter reader
//!
//! This library reads DSMR P1 telegrams from a line transport, verifies their
//! CRC16 and turns the OBIS registers into net power and energy readings.

pub mod config;
pub mod models;
pub mod obis_utils;
pub mod metering_p1;
pub mod acquisition;
pub mod transport;
pub mod sink;
#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types for easier access
pub use acquisition::{AcquisitionController, AcquisitionError, RetryPolicy};
pub use config::ConfigHolder;
pub use metering_p1::structs::{AggregateResult, MeterIdentity, Reading};
pub use metering_p1::P1Error;
pub use sink::{LogSink, ReadingSink};
pub use transport::{Transport, TransportError};
#[cfg(feature = "mqtt")]
pub use mqtt::MqttManager;

pub fn get_unix_ts() -> i64 {
    return chrono::Utc::now().timestamp();
}

pub fn get_id(protocol: &str, meter_name: &str) -> String {
    return format!("{}-{}-{:?}", protocol, meter_name, get_unix_ts());
}
