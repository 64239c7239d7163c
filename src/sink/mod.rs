use async_trait::async_trait;
use log::{debug, info};
use thiserror::Error;

use crate::metering_p1::structs::Reading;
use crate::obis_utils::get_obis_description;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Unable to serialize reading: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Error publishing: {0}")]
    Publish(String),
}

/// Receiver of verified readings
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError>;
}

/// Writes readings to the log, used when no MQTT broker is configured
pub struct LogSink;

#[async_trait]
impl ReadingSink for LogSink {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError> {
        let meter = reading.identity.as_ref().map(|i| i.id.as_str()).unwrap_or("unknown");
        info!("Meter {}: power {:.0} W, energy {:.0} Wh", meter, reading.aggregate.power, reading.aggregate.energy);

        for field in &reading.raw {
            debug!("{} ({}): {} {}",
                   field.code,
                   get_obis_description(&field.code).unwrap_or("unknown"),
                   field.value,
                   field.unit.as_deref().unwrap_or(""));
        }

        debug!("{}", serde_json::to_string(reading)?);
        Ok(())
    }
}
