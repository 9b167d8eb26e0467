use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ProvenanceError;

/// Append-only action log used to replay a participant's interactions.
///
/// Writes are at-least-once and fire-and-forget from the tracker's point of
/// view: an `Err` is logged by the caller and otherwise ignored.
pub trait ProvenancePort {
    fn append(&mut self, at_ms: i64, kind: &str, data: Value) -> Result<(), ProvenanceError>;

    /// Opaque graph embedded in each answer payload.
    fn export(&self) -> Value;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceRecord {
    pub t: i64,
    pub kind: String,
    pub data: Value,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvenanceLog {
    records: Vec<ProvenanceRecord>,
}

impl InMemoryProvenanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ProvenanceRecord] {
        &self.records
    }
}

impl ProvenancePort for InMemoryProvenanceLog {
    fn append(&mut self, at_ms: i64, kind: &str, data: Value) -> Result<(), ProvenanceError> {
        self.records.push(ProvenanceRecord {
            t: at_ms,
            kind: kind.to_string(),
            data,
        });
        Ok(())
    }

    fn export(&self) -> Value {
        json!({ "events": self.records })
    }
}
