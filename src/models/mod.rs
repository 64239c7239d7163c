use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::get_id;
use crate::metering_p1::structs::Reading;

pub const PROTOCOL: &str = "P1";

/// Document published for every verified telegram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeteringData {
    pub id: String,
    pub meter_name: String,
    pub protocol: String,
    pub transmission_time: i64,
    pub metered_time: i64,
    pub metered_values: serde_json::Map<String, serde_json::Value>,
}

impl MeteringData {
    pub fn from_reading(reading: &Reading) -> Self {
        let meter_name = reading.identity.as_ref()
            .map(|i| i.id.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let mut metered_values = serde_json::Map::new();
        metered_values.insert("power".to_string(), reading.aggregate.power.into());
        metered_values.insert("energy".to_string(), reading.aggregate.energy.into());

        let mut registers = serde_json::Map::new();
        for register in &reading.registers {
            registers.insert(register.label.clone(), register.value.into());
        }
        metered_values.insert("registers".to_string(), registers.into());

        for field in &reading.raw {
            metered_values.insert(field.code.clone(), field.value.clone().into());
            if let Some(unit) = &field.unit {
                metered_values.insert(format!("{}_unit", field.code), unit.clone().into());
            }
        }

        let mut protocol_map = serde_json::Map::new();
        protocol_map.insert("type".to_string(), "p1".into());
        if let Some(manufacturer) = reading.identity.as_ref().and_then(|i| i.manufacturer.clone()) {
            protocol_map.insert("manufacturer".to_string(), manufacturer.into());
        }
        metered_values.insert("proto".to_string(), protocol_map.into());

        MeteringData {
            id: get_id(PROTOCOL, &meter_name),
            meter_name,
            protocol: PROTOCOL.to_string(),
            transmission_time: Utc::now().timestamp(),
            metered_time: reading.received_at.timestamp(),
            metered_values,
        }
    }
}
