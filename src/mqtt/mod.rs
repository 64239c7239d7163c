use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error, info};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

use crate::config::MqttConfig;
use crate::metering_p1::structs::Reading;
use crate::models::{MeteringData, PROTOCOL};
use crate::sink::{ReadingSink, SinkError};

pub struct MqttManager {
    client: AsyncClient,
    base_topic: String,
}

impl MqttManager {
    /// Connects to the broker. The event loop runs on its own task and
    /// reconnects by itself.
    pub fn new(config: &MqttConfig) -> Self {
        info!("MQTT connection starting up");
        let mut mqttoptions = MqttOptions::new(config.client_name.clone(), config.host.clone(), config.port);
        mqttoptions.set_keep_alive(Duration::from_secs(5));
        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            mqttoptions.set_credentials(user.clone(), pass.clone());
        }

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, 10);

        tokio::spawn(async move {
            info!("MQTT Eventloop started");
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("Connected to MQTT broker");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Error in MQTT {:?}, reconnecting ", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        MqttManager {
            client,
            base_topic: config.base_topic.clone(),
        }
    }
}

pub fn raw_topic(base_topic: &str) -> String {
    format!("{}/raw", base_topic)
}

/// Topic of one meter, characters MQTT reserves are replaced
pub fn device_topic(base_topic: &str, meter_name: &str) -> String {
    let name: String = meter_name.chars()
        .map(|c| match c {
            '/' | '+' | '#' => '_',
            c => c,
        })
        .collect();
    format!("{}/devs/{}/{}", base_topic, PROTOCOL, name)
}

#[async_trait]
impl ReadingSink for MqttManager {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError> {
        let data = MeteringData::from_reading(reading);
        info!("Metering data received: {}", data.id);

        self.client.publish(raw_topic(&self.base_topic), QoS::AtLeastOnce, false, serde_json::to_string(&data)?)
            .await
            .map_err(|e| SinkError::Publish(e.to_string()))?;

        self.client.publish(device_topic(&self.base_topic, &data.meter_name),
                            QoS::AtLeastOnce,
                            false,
                            serde_json::to_string(&data.metered_values)?)
            .await
            .map_err(|e| SinkError::Publish(e.to_string()))?;

        debug!("Send successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(raw_topic("p12mqtt"), "p12mqtt/raw");
        assert_eq!(device_topic("p12mqtt", "ISK5\\2MT382-1000"), "p12mqtt/devs/P1/ISK5\\2MT382-1000");
        assert_eq!(device_topic("home/p1", "A/B+C#"), "home/p1/devs/P1/A_B_C_");
    }
}
