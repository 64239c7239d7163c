//! Serial port transport for the P1 interface
//!
//! The meter pushes a telegram every few seconds, the port is only opened for
//! the time it takes to read one.

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::config::SerialConfig;
use super::{Transport, TransportError};

pub struct SerialTransport {
    config: SerialConfig,
    reader: Option<BufReader<SerialStream>>,
}

impl SerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        info!("Serial port configured on '{}' with baudrate '{}'", config.port, config.baud_rate);
        Self { config, reader: None }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        let port = tokio_serial::new(&self.config.port, self.config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .open_native_async()
            .map_err(|e| TransportError::Open(format!("'{}': {}", self.config.port, e)))?;

        debug!("Successfully opened serial port {}", self.config.port);
        self.reader = Some(BufReader::new(port));
        Ok(())
    }

    async fn close(&mut self) {
        // Dropping the stream closes the port
        if self.reader.take().is_some() {
            debug!("Serial port {} closed", self.config.port);
        }
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        let reader = self.reader.as_mut().ok_or(TransportError::NotOpen)?;

        let mut buf = Vec::new();
        let n = timeout(Duration::from_secs(self.config.read_timeout), reader.read_until(b'\n', &mut buf))
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| TransportError::Read(e.to_string()))?;

        if n == 0 {
            return Err(TransportError::Eof);
        }

        if !buf.is_ascii() {
            return Err(TransportError::Read("non ASCII data received".to_string()));
        }
        String::from_utf8(buf).map_err(|e| TransportError::Read(e.to_string()))
    }
}
