use std::collections::BTreeMap;

use tracing::warn;

use crate::models::Week;
use crate::storage::KeyValueStore;

pub const COMPLETION_KEY: &str = "bitacora_week_completed_v1";

/// Per-week "completed" flags, written through to the key-value store on
/// every change. A failed write is logged and dropped; the in-memory flags
/// stay authoritative for the rest of the session.
pub struct CompletionStore {
    store: Box<dyn KeyValueStore>,
    flags: BTreeMap<String, bool>,
}

impl CompletionStore {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let flags = match store.get(COMPLETION_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "discarding unreadable completion flags");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                warn!(error = %err, "completion flags unavailable, starting empty");
                BTreeMap::new()
            }
        };

        Self { store, flags }
    }

    pub fn is_complete(&self, week: Week) -> bool {
        self.flags
            .get(&week.number().to_string())
            .copied()
            .unwrap_or(false)
    }

    pub fn set_complete(&mut self, week: Week, done: bool) {
        self.flags.insert(week.number().to_string(), done);
        self.persist();
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self, week: Week) -> bool {
        let done = !self.is_complete(week);
        self.set_complete(week, done);
        done
    }

    pub fn completed_weeks(&self) -> Vec<Week> {
        Week::all().filter(|week| self.is_complete(*week)).collect()
    }

    #[cfg(test)]
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.flags) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "could not encode completion flags");
                return;
            }
        };

        if let Err(err) = self.store.set(COMPLETION_KEY, encoded) {
            warn!(error = %err, "completion flag kept in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    fn week(n: i64) -> Week {
        Week::new(n).unwrap()
    }

    #[test]
    fn flags_survive_a_reload() {
        let mut flags = CompletionStore::load(Box::new(MemoryStore::new()));
        flags.set_complete(week(5), true);

        let reloaded = CompletionStore::load(flags.into_store());
        assert!(reloaded.is_complete(week(5)));
        assert!(!reloaded.is_complete(week(6)));
    }

    #[test]
    fn stored_format_is_keyed_by_week_number() {
        let mut flags = CompletionStore::load(Box::new(MemoryStore::new()));
        flags.set_complete(week(12), true);
        flags.set_complete(week(3), false);

        let store = flags.into_store();
        let raw = store.get(COMPLETION_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"12":true,"3":false}"#);
    }

    #[test]
    fn storage_failure_keeps_memory_authoritative() {
        let mut flags = CompletionStore::load(Box::new(BrokenStore));
        assert!(!flags.is_complete(week(1)));

        assert!(flags.toggle(week(1)));
        assert!(flags.is_complete(week(1)));
        assert_eq!(flags.completed_weeks(), vec![week(1)]);
    }

    #[test]
    fn unreadable_payload_starts_empty() {
        let mut store = MemoryStore::new();
        store.set(COMPLETION_KEY, "[1,2".to_string()).unwrap();

        let flags = CompletionStore::load(Box::new(store));
        assert!(flags.completed_weeks().is_empty());
    }
}
