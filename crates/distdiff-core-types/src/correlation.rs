//! Run correlation.
//!
//! A comparison gets one [`RunId`] when it starts. The engine puts it on the
//! run's tracing span, on the pipeline context and on the serialized result,
//! which is how a JSON log line is matched to the report it belongs to.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one comparison run.
///
/// Fresh ids are UUIDv7, so sorting ids as strings sorts runs by start time.
/// Ids read back from a stored report are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        RunId(Uuid::now_v7().to_string())
    }

    pub fn from_string(id: String) -> Self {
        RunId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        RunId::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_v7_uuids() {
        let id = RunId::new();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
        assert_ne!(id, RunId::new());
    }

    #[test]
    fn test_later_runs_sort_after_earlier_ones() {
        let first = RunId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RunId::new();
        assert!(first < second);
    }

    #[test]
    fn test_stored_id_serializes_as_plain_string() {
        let id = RunId::from_string("nightly-2026-10-18".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"nightly-2026-10-18\"");
        assert_eq!(serde_json::from_str::<RunId>(&json).unwrap(), id);
        assert_eq!(id.to_string(), id.as_str());
    }
}
