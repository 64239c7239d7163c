use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::obis_utils::ObisData;

/// Start of transmission character
pub const SOT_CHAR: char = '/';
/// End of transmission character
pub const EOT_CHAR: char = '!';

/// One framed telegram, start line to checksum line inclusive.
///
/// `lines` holds the trimmed lines, `crc_input` the bytes as they were received
/// (terminators included) from the start line up to the line before the
/// checksum line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telegram {
    pub lines: Vec<String>,
    pub crc_input: String,
}

impl Telegram {
    pub fn identification_line(&self) -> Option<&str> {
        self.lines.first().map(|l| l.as_str())
    }

    pub fn checksum_line(&self) -> Option<&str> {
        self.lines.last().map(|l| l.as_str())
    }

    /// All lines after the identification line
    pub fn data_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().skip(1).map(|l| l.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterIdentity {
    pub manufacturer: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Import,
    Export,
}

impl Direction {
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Import => 1.0,
            Direction::Export => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AggregateTarget {
    Power,
    Energy,
}

/// Net totals of one telegram. Import counts positive, export negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Watts
    pub power: f64,
    /// Watt hours
    pub energy: f64,
}

impl AggregateResult {
    pub fn accumulate(&mut self, target: AggregateTarget, value: f64) {
        match target {
            AggregateTarget::Power => self.power += value,
            AggregateTarget::Energy => self.energy += value,
        }
    }
}

/// A known register as transmitted, converted to base units but not signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterValue {
    pub label: String,
    pub code: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub raw: Vec<ObisData>,
    pub registers: Vec<RegisterValue>,
    pub aggregate: AggregateResult,
}

/// Result of a successful acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub identity: Option<MeterIdentity>,
    pub aggregate: AggregateResult,
    pub registers: Vec<RegisterValue>,
    pub raw: Vec<ObisData>,
    pub received_at: DateTime<Utc>,
}
