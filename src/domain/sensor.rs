// Sensor domain model
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a sensor's serial may live, tried in this order. The first
/// non-empty string wins.
pub const SERIAL_FIELD_PATHS: [&[&str]; 4] = [
    &["serial_number"],
    &["meta", "serial_number"],
    &["meta", "serial"],
    &["meta", "sn"],
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "metadata")]
    pub meta: Option<Map<String, Value>>,
    /// Remaining top-level fields, e.g. `serial_number` on newer payloads.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sensor {
    fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let (root, rest) = if *first == "meta" {
            let (key, rest) = rest.split_first()?;
            (self.meta.as_ref()?.get(*key)?, rest)
        } else {
            (self.extra.get(*first)?, rest)
        };
        rest.iter().try_fold(root, |value, key| value.get(*key))
    }

    /// Serial number resolved through `SERIAL_FIELD_PATHS`, or "" if none.
    pub fn serial(&self) -> &str {
        SERIAL_FIELD_PATHS
            .iter()
            .filter_map(|path| self.lookup(path).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Distinct non-empty serials in first-seen order.
pub fn unique_serials(sensors: &[Sensor]) -> Vec<String> {
    let mut serials: Vec<String> = Vec::new();
    for sensor in sensors {
        let serial = sensor.serial();
        if !serial.is_empty() && !serials.iter().any(|s| s == serial) {
            serials.push(serial.to_string());
        }
    }
    serials
}
