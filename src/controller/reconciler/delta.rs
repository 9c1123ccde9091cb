//! # Delta Comparator
//!
//! Field-level difference between a desired and a last-observed snapshot.

use super::snapshot::Snapshot;
use std::fmt;

/// Path of a compared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Whole object, one side absent
    Root,
    Data,
    WorkspaceId,
    Configuration,
}

impl FieldPath {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::Root => "",
            FieldPath::Data => "Spec.Data",
            FieldPath::WorkspaceId => "Spec.WorkspaceID",
            FieldPath::Configuration => "Spec.Configuration",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value recorded on one side of a difference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Absent,
    /// Whole snapshot present (root entries only)
    Object,
    Bytes(Vec<u8>),
    Text(String),
}

impl FieldValue {
    fn text(value: Option<&str>) -> Self {
        value.map_or(FieldValue::Absent, |v| FieldValue::Text(v.to_string()))
    }

    fn object(snapshot: Option<&Snapshot>) -> Self {
        snapshot.map_or(FieldValue::Absent, |_| FieldValue::Object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    pub path: FieldPath,
    /// Value on the desired side
    pub a: FieldValue,
    /// Value on the observed side
    pub b: FieldValue,
}

/// Ordered set of differences, empty when nothing compared differs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    entries: Vec<DeltaEntry>,
}

impl Delta {
    /// Compare `a` (desired) against `b` (observed)
    pub fn between(a: Option<&Snapshot>, b: Option<&Snapshot>) -> Self {
        let mut delta = Delta::default();

        let (a, b) = match (a, b) {
            (None, None) => return delta,
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                delta.push(FieldPath::Root, FieldValue::object(a), FieldValue::object(b));
                return delta;
            }
        };

        if a.data() != b.data() {
            delta.push(
                FieldPath::Data,
                FieldValue::Bytes(a.data().to_vec()),
                FieldValue::Bytes(b.data().to_vec()),
            );
        }
        if a.workspace_id() != b.workspace_id() {
            delta.push(
                FieldPath::WorkspaceId,
                FieldValue::text(a.workspace_id()),
                FieldValue::text(b.workspace_id()),
            );
        }
        if a.configuration() != b.configuration() {
            delta.push(
                FieldPath::Configuration,
                FieldValue::text(a.configuration()),
                FieldValue::text(b.configuration()),
            );
        }

        delta
    }

    fn push(&mut self, path: FieldPath, a: FieldValue, b: FieldValue) {
        self.entries.push(DeltaEntry { path, a, b });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn differs_at(&self, path: FieldPath) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    /// True when the payload changed in either representation
    pub fn differs_in_payload(&self) -> bool {
        self.differs_at(FieldPath::Data) || self.differs_at(FieldPath::Configuration)
    }

    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    /// Paths that differ, for logging
    pub fn paths(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }
}
