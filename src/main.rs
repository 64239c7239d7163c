use p12mqtt::{transport::serial::SerialTransport, AcquisitionController, ConfigHolder, LogSink, ReadingSink, RetryPolicy};
use std::time::Duration;
use log::{error, info};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let default_filter = std::env::var("P2M_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let config = match ConfigHolder::load() {
        Ok(holder) => holder.config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let sink: Box<dyn ReadingSink> = match &config.mqtt {
        #[cfg(feature = "mqtt")]
        Some(mqtt) => Box::new(p12mqtt::MqttManager::new(mqtt)),
        _ => {
            info!("No MQTT broker configured, readings go to the log");
            Box::new(LogSink)
        }
    };

    let transport = SerialTransport::new(config.serial.clone());
    let mut controller = AcquisitionController::new(transport, RetryPolicy::from(&config.acquisition));

    controller.start_thread(sink.as_ref(), Duration::from_secs(config.acquisition.read_interval)).await;
    Ok(())
}
