use crc16::{State, ARC};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::{structs::{MeterIdentity, Telegram, EOT_CHAR, SOT_CHAR}, P1Error};

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^\d+(\.\d+)?$").expect("decimal pattern");
}

/* CRC16/ARC over the body including the trailing '!' */
pub fn calculate_checksum(crc_input: &str) -> String {
    let mut state = State::<ARC>::new();
    state.update(crc_input.as_bytes());
    state.update(&[EOT_CHAR as u8]);

    format!("{:04X}", state.get())
}

/// Compares the checksum transmitted on the last line with the one calculated
/// over the received bytes.
pub fn verify_checksum(telegram: &Telegram) -> Result<(), P1Error> {
    let last = telegram.checksum_line().ok_or(P1Error::Empty)?;
    let expected = last.strip_prefix(EOT_CHAR)
        .ok_or(P1Error::MissingChecksum)?
        .to_uppercase();

    let calculated = calculate_checksum(&telegram.crc_input);
    debug!("P1 checksum validation: expected={}, calculated={}", expected, calculated);

    if expected != calculated {
        return Err(P1Error::ChecksumMismatch { expected, calculated });
    }
    Ok(())
}

pub fn is_checksum_valid(telegram: &Telegram) -> bool {
    verify_checksum(telegram).is_ok()
}

pub fn parse_identification_line(line: &str) -> Result<MeterIdentity, P1Error> {
    // Example formats:
    // /ISk5\2MT382-1000
    // /KFM5KAIFA-METER
    // /XMX5LGBBFG1009021373

    let content = line.trim()
        .strip_prefix(SOT_CHAR)
        .ok_or(P1Error::MissingIdentification)?;

    let id = content.to_uppercase();
    if id.is_empty() {
        return Err(P1Error::MissingIdentification);
    }

    // Flag id are the first three letters
    let manufacturer = id.get(..3)
        .filter(|m| m.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|m| m.to_string());

    Ok(MeterIdentity { manufacturer, id })
}

/// Parses a plain decimal register value like `000123.456`.
pub fn parse_decimal(value: &str) -> Option<f64> {
    if !DECIMAL.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok()
}
