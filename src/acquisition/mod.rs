//! # Telegram acquisition
//!
//! Drives one transport through open, framing, close, checksum verification
//! and extraction. Every failure of a single attempt is turned into a retry
//! after a fixed delay until the attempt budget is used up.

use std::time::Duration;
use chrono::Utc;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::AcquisitionConfig;
use crate::metering_p1::{
    self,
    framer::TelegramFramer,
    structs::{MeterIdentity, Reading, Telegram},
    utils::parse_identification_line,
    P1Error,
};
use crate::sink::{ReadingSink, SinkError};
use crate::transport::{Transport, TransportError};

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Failed to open transport: {0}")]
    TransportOpen(TransportError),
    #[error("Failed to read telegram: {0}")]
    TransportRead(TransportError),
    #[error(transparent)]
    Telegram(#[from] P1Error),
    #[error("Failed to receive telegram with correct CRC after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<AcquisitionError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquisitionState {
    Idle,
    PortOpening,
    Framing,
    Verifying,
    Extracting,
    Closed,
    Backoff,
    Done,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, at least one is always made
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(10),
        }
    }
}

impl From<&AcquisitionConfig> for RetryPolicy {
    fn from(config: &AcquisitionConfig) -> Self {
        Self {
            max_attempts: config.retries,
            retry_delay: Duration::from_secs(config.retry_delay),
        }
    }
}

/// State kept across acquisitions of one meter
#[derive(Debug, Clone, Default)]
pub struct AcquisitionSession {
    /// Set from the first framed telegram and never replaced
    pub identity: Option<MeterIdentity>,
    pub last_telegram: Option<Telegram>,
    pub last_reading: Option<Reading>,
}

pub struct AcquisitionController<T: Transport> {
    transport: T,
    policy: RetryPolicy,
    framer: TelegramFramer,
    session: AcquisitionSession,
    state: AcquisitionState,
}

impl<T: Transport> AcquisitionController<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            framer: TelegramFramer::new(),
            session: AcquisitionSession::default(),
            state: AcquisitionState::Idle,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn session(&self) -> &AcquisitionSession {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn set_state(&mut self, state: AcquisitionState) {
        debug!("Acquisition state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub async fn acquire(&mut self) -> Result<Reading, AcquisitionError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match self.attempt().await {
                Ok(reading) => {
                    self.set_state(AcquisitionState::Done);
                    return Ok(reading);
                }
                Err(e) => e,
            };

            if attempt >= attempts {
                self.set_state(AcquisitionState::Exhausted);
                error!("Failed to receive telegram with correct CRC after {} attempts", attempts);
                return Err(AcquisitionError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }

            warn!("{}; retrying... ({} of {})", err, attempt, attempts);
            self.set_state(AcquisitionState::Backoff);
            tokio::time::sleep(self.policy.retry_delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&mut self) -> Result<Reading, AcquisitionError> {
        self.set_state(AcquisitionState::PortOpening);
        self.transport.open().await.map_err(AcquisitionError::TransportOpen)?;

        self.set_state(AcquisitionState::Framing);
        let framed = self.framer.read_telegram(&mut self.transport).await;

        // Closed on every path once framing has ended
        self.transport.close().await;

        let telegram = match framed {
            Ok(telegram) => telegram,
            Err(e) => {
                self.set_state(AcquisitionState::Closed);
                return Err(AcquisitionError::TransportRead(e));
            }
        };

        self.capture_identity(&telegram);

        let decoded = self.decode(&telegram);
        let extraction = match decoded {
            Ok(extraction) => extraction,
            Err(e) => {
                self.set_state(AcquisitionState::Closed);
                return Err(e.into());
            }
        };

        let reading = Reading {
            identity: self.session.identity.clone(),
            aggregate: extraction.aggregate,
            registers: extraction.registers,
            raw: extraction.raw,
            received_at: Utc::now(),
        };

        self.session.last_telegram = Some(telegram);
        self.session.last_reading = Some(reading.clone());
        Ok(reading)
    }

    fn decode(&mut self, telegram: &Telegram) -> Result<metering_p1::structs::Extraction, P1Error> {
        self.set_state(AcquisitionState::Verifying);
        metering_p1::utils::verify_checksum(telegram)?;
        debug!("Telegram CRC verified correct");

        self.set_state(AcquisitionState::Extracting);
        metering_p1::obis_parser::extract(telegram)
    }

    fn capture_identity(&mut self, telegram: &Telegram) {
        if self.session.identity.is_some() {
            return;
        }

        match telegram.identification_line().map(parse_identification_line) {
            Some(Ok(identity)) => {
                info!("Meter identified as {}", identity.id);
                self.session.identity = Some(identity);
            }
            Some(Err(e)) => warn!("Unable to parse identification line: {}", e),
            None => warn!("Telegram without identification line"),
        }
    }

    /// Acquires one reading and hands it to the sink
    pub async fn acquire_and_publish<S: ReadingSink + ?Sized>(&mut self, sink: &S) -> Result<Reading, PublishError> {
        let reading = self.acquire().await?;
        sink.publish(&reading).await?;
        Ok(reading)
    }

    pub async fn start_thread<S: ReadingSink + ?Sized>(&mut self, sink: &S, read_interval: Duration) {
        info!("Starting P1 acquisition, reading every {:?}", read_interval);

        loop {
            match self.acquire_and_publish(sink).await {
                Ok(reading) => {
                    debug!("Reading published: {} W, {} Wh", reading.aggregate.power, reading.aggregate.energy);
                }
                Err(e) => error!("P1 acquisition cycle failed: {}", e),
            }
            tokio::time::sleep(read_interval).await;
        }
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
