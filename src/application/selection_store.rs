// Persisted selection state (last house, disease and sensor serial)
use crate::error::Result;
use std::collections::HashMap;
use std::sync::RwLock;

pub const HOUSE_ID_KEY: &str = "house_id";
pub const DISEASE_KEY: &str = "disease_key";

pub fn sensor_serial_key(house_id: &str) -> String {
    format!("sensor_serial:{}", house_id)
}

pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// The remembered option when it is still offered, otherwise the first one.
pub fn remembered_or_first(options: &[String], remembered: Option<String>) -> Option<String> {
    match remembered {
        Some(r) if options.contains(&r) => Some(r),
        _ => options.first().cloned(),
    }
}

#[derive(Debug, Default)]
pub struct InMemorySelectionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for InMemorySelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemorySelectionStore::new();
        assert_eq!(store.get(DISEASE_KEY), None);

        store.set(DISEASE_KEY, "asthma").unwrap();
        assert_eq!(store.get(DISEASE_KEY).as_deref(), Some("asthma"));

        store.clear(DISEASE_KEY).unwrap();
        assert_eq!(store.get(DISEASE_KEY), None);
    }

    #[test]
    fn test_remembered_or_first() {
        let options = vec!["A".to_string(), "B".to_string()];
        assert_eq!(remembered_or_first(&options, Some("B".into())).as_deref(), Some("B"));
        assert_eq!(remembered_or_first(&options, Some("Z".into())).as_deref(), Some("A"));
        assert_eq!(remembered_or_first(&options, None).as_deref(), Some("A"));
        assert_eq!(remembered_or_first(&[], Some("A".into())), None);
    }

    #[test]
    fn test_sensor_serial_key() {
        assert_eq!(sensor_serial_key("h-1"), "sensor_serial:h-1");
    }
}
