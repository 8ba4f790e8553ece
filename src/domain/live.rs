// Live reading messages from the upstream feed
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const READING_TOPIC: &str = "reading.new";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    pub id: i64,
    pub sensor_id: String,
    pub ts: String,
    pub value: f64,
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl LiveReading {
    pub fn matches(&self, sensor_filter: Option<&str>) -> bool {
        match sensor_filter {
            Some(id) if !id.is_empty() => self.sensor_id == id,
            _ => true,
        }
    }
}

/// Envelope of one feed frame. `data` stays untyped until the topic is known.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveFrame {
    pub topic: String,
    #[serde(default)]
    pub data: Value,
}
