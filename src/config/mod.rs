use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_yml;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read the config on {0}")]
    NotFound(String),
    #[error("Unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse config file: {0}")]
    Parse(#[from] serde_yml::Error),
}

fn serial_port_default() -> String { return "/dev/ttyUSB0".to_string() }
fn serial_baud_rate_default() -> u32 { return 115200 }
fn serial_read_timeout_default() -> u64 { return 10 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SerialConfig {
    #[serde(default="serial_port_default")]
    pub port: String,
    #[serde(default="serial_baud_rate_default")]
    pub baud_rate: u32,
    /// Seconds a single line may take before the read is given up
    #[serde(default="serial_read_timeout_default")]
    pub read_timeout: u64,
}

fn acquisition_retries_default() -> u32 { return 3 }
fn acquisition_retry_delay_default() -> u64 { return 10 }
fn acquisition_read_interval_default() -> u64 { return 10 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct AcquisitionConfig {
    #[serde(default="acquisition_retries_default")]
    pub retries: u32,
    #[serde(default="acquisition_retry_delay_default")]
    pub retry_delay: u64,
    #[serde(default="acquisition_read_interval_default")]
    pub read_interval: u64,
}

fn mqtt_port_default() -> u16 { return 1883 }
fn mqtt_client_name_default() -> String { return "p12mqtt".to_string() }
fn mqtt_base_topic_default() -> String { return "p12mqtt".to_string() }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default="mqtt_port_default")]
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    #[serde(default="mqtt_client_name_default")]
    pub client_name: String,
    #[serde(default="mqtt_base_topic_default")]
    pub base_topic: String,
}

fn serial_default() -> SerialConfig {
    return SerialConfig {
        port: serial_port_default(),
        baud_rate: serial_baud_rate_default(),
        read_timeout: serial_read_timeout_default(),
    }
}
fn acquisition_default() -> AcquisitionConfig {
    return AcquisitionConfig {
        retries: acquisition_retries_default(),
        retry_delay: acquisition_retry_delay_default(),
        read_interval: acquisition_read_interval_default(),
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default="serial_default")]
    pub serial: SerialConfig,
    #[serde(default="acquisition_default")]
    pub acquisition: AcquisitionConfig,
    pub mqtt: Option<MqttConfig>,
}

pub struct ConfigHolder {
    pub config: Config,
}

impl ConfigHolder {
    /// Looks for `config/p12mqtt.yaml` first, then `p12mqtt.yaml`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_first(&["config/p12mqtt.yaml", "p12mqtt.yaml"])
    }

    /// Loads the first of the candidate files that exists
    pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Result<Self, ConfigError> {
        for file in candidates {
            let file = file.as_ref();
            if file.exists() {
                info!("Loading config from {}", file.display());
                return Ok(ConfigHolder { config: Self::load_from(file)? });
            }
            debug!("No config at {}", file.display());
        }

        let tried: Vec<String> = candidates.iter().map(|c| c.as_ref().display().to_string()).collect();
        Err(ConfigError::NotFound(tried.join(" or ")))
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Config, ConfigError> {
        let c: Config = serde_yml::from_str(contents)?;
        Ok(c)
    }
}
