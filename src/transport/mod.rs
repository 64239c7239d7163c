//! # Line transport
//!
//! The acquisition only needs three things from whatever delivers the
//! telegram: open it, read one line at a time and close it again. Timeouts
//! are the business of the implementation.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(test)]
pub mod mock;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Failed to open port: {0}")]
    Open(String),
    #[error("Read failed: {0}")]
    Read(String),
    #[error("Read timed out")]
    Timeout,
    #[error("End of stream")]
    Eof,
    #[error("Transport not open")]
    NotOpen,
}

/// Source of decoded telegram lines
#[async_trait]
pub trait Transport: Send {
    async fn open(&mut self) -> Result<(), TransportError>;

    async fn close(&mut self);

    /// Returns one line including its terminator as received
    async fn read_line(&mut self) -> Result<String, TransportError>;
}
