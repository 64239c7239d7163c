use std::collections::HashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One `code(value*unit)` pair as found on a telegram line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObisData {
    pub code: String,
    pub value: String,
    pub unit: Option<String>,
}

lazy_static! {
    /* A-B:C.D.E followed by the first value group, unit after '*' is optional */
    static ref OBIS_LINE: Regex = Regex::new(
        r"(\d{1,3}-\d{1,3}):(\d{1,3}\.\d{1,3}\.\d{1,3})\(([^()*]*)(?:\*([^()]*))?\)"
    ).expect("OBIS line pattern");

    static ref DESCRIPTIONS: HashMap<&'static str, &'static str> = get_p1_obis_descriptions();
}

/// Matches the generic OBIS line pattern and returns the first value group.
pub fn parse_obis_line(line: &str) -> Option<ObisData> {
    let caps = OBIS_LINE.captures(line)?;

    let code = format!("{}:{}", &caps[1], &caps[2]);
    let value = caps[3].to_string();
    let unit = caps.get(4)
        .map(|u| u.as_str().to_string())
        .filter(|u| !u.is_empty());

    Some(ObisData { code, value, unit })
}

pub fn get_obis_description(obis_code: &str) -> Option<&'static str> {
    DESCRIPTIONS.get(obis_code).copied()
}

pub fn get_p1_obis_descriptions() -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();

    // Header
    map.insert("1-3:0.2.8", "Version information");
    map.insert("0-0:1.0.0", "Date and time");
    map.insert("0-0:96.1.1", "Equipment identifier");
    map.insert("0-0:96.14.0", "Tariff indicator");

    // Energy values
    map.insert("1-0:1.8.1", "Active energy + (tariff 1)");
    map.insert("1-0:1.8.2", "Active energy + (tariff 2)");
    map.insert("1-0:2.8.1", "Active energy - (tariff 1)");
    map.insert("1-0:2.8.2", "Active energy - (tariff 2)");

    // Power values
    map.insert("1-0:1.7.0", "Active power + (total)");
    map.insert("1-0:2.7.0", "Active power - (total)");
    map.insert("1-0:21.7.0", "Active power + (L1)");
    map.insert("1-0:41.7.0", "Active power + (L2)");
    map.insert("1-0:61.7.0", "Active power + (L3)");
    map.insert("1-0:22.7.0", "Active power - (L1)");
    map.insert("1-0:42.7.0", "Active power - (L2)");
    map.insert("1-0:62.7.0", "Active power - (L3)");

    // Power quality
    map.insert("0-0:96.7.21", "Number of power failures");
    map.insert("0-0:96.7.9", "Number of long power failures");
    map.insert("1-0:32.32.0", "Number of voltage sags (L1)");
    map.insert("1-0:52.32.0", "Number of voltage sags (L2)");
    map.insert("1-0:72.32.0", "Number of voltage sags (L3)");
    map.insert("1-0:32.36.0", "Number of voltage swells (L1)");
    map.insert("1-0:52.36.0", "Number of voltage swells (L2)");
    map.insert("1-0:72.36.0", "Number of voltage swells (L3)");

    // Voltage and current
    map.insert("1-0:32.7.0", "Voltage (L1)");
    map.insert("1-0:52.7.0", "Voltage (L2)");
    map.insert("1-0:72.7.0", "Voltage (L3)");
    map.insert("1-0:31.7.0", "Current (L1)");
    map.insert("1-0:51.7.0", "Current (L2)");
    map.insert("1-0:71.7.0", "Current (L3)");

    // Slave devices (gas, water)
    map.insert("0-1:24.1.0", "Device type (M-Bus 1)");
    map.insert("0-1:96.1.0", "Equipment identifier (M-Bus 1)");
    map.insert("0-1:24.2.1", "Last 5-minute reading (M-Bus 1)");

    map
}
