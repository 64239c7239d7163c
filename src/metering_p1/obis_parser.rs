use log::{debug, warn};

use crate::obis_utils;
use super::{
    meter_definitions::find_register,
    structs::{Extraction, RegisterValue, Telegram},
    utils::parse_decimal,
    P1Error,
};

/// Collects every OBIS field of the telegram and sums up the known registers.
///
/// The identification line is skipped. Any known register whose value does
/// not parse fails the whole telegram.
pub fn extract(telegram: &Telegram) -> Result<Extraction, P1Error> {
    let mut extraction = Extraction::default();

    for line in telegram.data_lines() {
        if let Some(obis_data) = obis_utils::parse_obis_line(line) {
            debug!("Parsed OBIS line - Code: {}, Value: {}, Unit: {:?}",
                   obis_data.code, obis_data.value, obis_data.unit);
            extraction.raw.push(obis_data);
        }

        let Some(register) = find_register(line) else {
            continue;
        };

        let value = register.value_text(line)
            .and_then(parse_decimal)
            .ok_or_else(|| {
                warn!("Malformed value for {} on line '{}'", register.label, line);
                P1Error::MalformedValue {
                    code: register.code.to_string(),
                    value: line[register.code.len()..].to_string(),
                }
            })?;

        let value = value * register.scale;
        extraction.aggregate.accumulate(register.target, register.direction.sign() * value);
        extraction.registers.push(RegisterValue {
            label: register.label.to_string(),
            code: register.code.to_string(),
            value,
        });
    }

    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telegram(lines: &[&str]) -> Telegram {
        Telegram {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            crc_input: String::new(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
    }

    #[test]
    fn test_sign_and_unit_aggregation() {
        let t = telegram(&[
            "/ISk5\\2MT382-1000",
            "1-0:1.8.1(000123.456*kWh)",
            "1-0:2.8.1(000010.000*kWh)",
            "1-0:1.7.0(02.500*kW)",
            "!0000",
        ]);

        let extraction = extract(&t).unwrap();
        assert_close(extraction.aggregate.energy, 113456.0);
        assert_close(extraction.aggregate.power, 2500.0);
        assert_eq!(extraction.registers.len(), 3);
        assert_eq!(extraction.registers[1].label, "Energy export [low]");
        assert_close(extraction.registers[1].value, 10000.0);
    }

    #[test]
    fn test_tariff_bands_add_up() {
        let t = telegram(&[
            "/XMX5",
            "1-0:1.8.1(000001.000*kWh)",
            "1-0:1.8.2(000002.000*kWh)",
            "1-0:2.8.1(000000.500*kWh)",
            "1-0:2.8.2(000000.250*kWh)",
            "1-0:1.7.0(00.000*kW)",
            "1-0:2.7.0(01.200*kW)",
            "!0000",
        ]);

        let extraction = extract(&t).unwrap();
        assert_close(extraction.aggregate.energy, 2250.0);
        assert_close(extraction.aggregate.power, -1200.0);
    }

    #[test]
    fn test_raw_fields_include_unknown_codes() {
        let t = telegram(&[
            "/XMX5",
            "0-0:96.1.1(4B384547303034303436333935353037)",
            "0-0:96.14.0(0002)",
            "1-0:1.8.1(000001.000*kWh)",
            "!0000",
        ]);

        let extraction = extract(&t).unwrap();
        let codes: Vec<&str> = extraction.raw.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["0-0:96.1.1", "0-0:96.14.0", "1-0:1.8.1"]);
        assert_eq!(extraction.raw[2].unit.as_deref(), Some("kWh"));
        assert_eq!(extraction.registers.len(), 1);
    }

    #[test]
    fn test_identification_line_is_ignored() {
        let t = telegram(&["/1-0:1.8.1(000001.000*kWh)", "!0000"]);
        let extraction = extract(&t).unwrap();
        assert!(extraction.raw.is_empty());
        assert_eq!(extraction.aggregate.energy, 0.0);
    }

    #[test]
    fn test_malformed_value_fails_telegram() {
        let t = telegram(&["/XMX5", "1-0:1.8.1(000abc.000*kWh)", "!0000"]);
        match extract(&t) {
            Err(P1Error::MalformedValue { code, value }) => {
                assert_eq!(code, "1-0:1.8.1");
                assert_eq!(value, "(000abc.000*kWh)");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_wrong_unit_fails_telegram() {
        let t = telegram(&["/XMX5", "1-0:1.7.0(02.500*kWh)", "!0000"]);
        assert!(matches!(extract(&t), Err(P1Error::MalformedValue { .. })));
    }

    #[test]
    fn test_aggregate_starts_from_zero_each_pass() {
        let t = telegram(&["/XMX5", "1-0:1.7.0(01.000*kW)", "!0000"]);
        let first = extract(&t).unwrap();
        let second = extract(&t).unwrap();
        assert_eq!(first, second);
        assert_close(second.aggregate.power, 1000.0);
    }
}
