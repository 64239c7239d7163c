use lazy_static::lazy_static;
use regex::Regex;

use super::structs::{AggregateTarget, Direction};

/// One known register of the P1 telegram and how it feeds the aggregate.
#[derive(Debug, Clone)]
pub struct ObisRecord {
    pub label: &'static str,
    pub code: &'static str,
    pub unit: &'static str,
    pub direction: Direction,
    pub target: AggregateTarget,
    /// Multiplier from the transmitted unit to the base unit
    pub scale: f64,
    pub pattern: Regex,
}

impl ObisRecord {
    fn new(label: &'static str, code: &'static str, unit: &'static str,
           direction: Direction, target: AggregateTarget) -> Self {
        let pattern = Regex::new(&format!(r"^{}\(([^()*]*)\*{}\)", regex::escape(code), unit))
            .expect("register pattern");

        ObisRecord {
            label,
            code,
            unit,
            direction,
            target,
            scale: 1000.0,
            pattern,
        }
    }

    /// True when the line carries this register. The code must be followed by
    /// the value group so that e.g. `1-0:1.8.1` never matches `1-0:1.8.10`.
    pub fn matches(&self, line: &str) -> bool {
        line.strip_prefix(self.code)
            .map(|rest| rest.starts_with('('))
            .unwrap_or(false)
    }

    /// Returns the value text when the unit matches the register
    pub fn value_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern.captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

lazy_static! {
    /* Import before export, low tariff before high tariff */
    pub static ref P1_REGISTERS: Vec<ObisRecord> = vec![
        ObisRecord::new("Energy import [low]", "1-0:1.8.1", "kWh", Direction::Import, AggregateTarget::Energy),
        ObisRecord::new("Energy import [high]", "1-0:1.8.2", "kWh", Direction::Import, AggregateTarget::Energy),
        ObisRecord::new("Energy export [low]", "1-0:2.8.1", "kWh", Direction::Export, AggregateTarget::Energy),
        ObisRecord::new("Energy export [high]", "1-0:2.8.2", "kWh", Direction::Export, AggregateTarget::Energy),
        ObisRecord::new("Power import", "1-0:1.7.0", "kW", Direction::Import, AggregateTarget::Power),
        ObisRecord::new("Power export", "1-0:2.7.0", "kW", Direction::Export, AggregateTarget::Power),
    ];
}

pub fn find_register(line: &str) -> Option<&'static ObisRecord> {
    P1_REGISTERS.iter().find(|r| r.matches(line))
}
