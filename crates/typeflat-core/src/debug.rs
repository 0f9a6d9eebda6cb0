/// Structured diagnostic record of what the pipeline did for each file
use serde::Serialize;
use std::path::Path;

use crate::fingerprint::Fingerprint;

/// One step of the graph walk worth surfacing when debugging a flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A declaration was recorded for emission
    Recorded {
        name: String,
        module: String,
        fingerprint: Fingerprint,
    },
    /// A declaration with identical text was already recorded
    Duplicate { name: String, module: String },
    /// The declaration's module matched an exclusion pattern
    Excluded { name: String, module: String },
    /// A property's type has no backing symbol (primitive or literal)
    PrimitiveProperty { owner: String, property: String },
    /// An unsupported construct was skipped under the skip policy
    UnsupportedSkipped {
        name: String,
        module: String,
        construct: String,
    },
}

/// A collision rename performed by the name resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRecord {
    pub module: String,
    pub original_name: String,
    pub emitted_name: String,
}

/// Diagnostics for one input file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileTrace {
    /// Input file being processed
    pub file: String,
    /// Walk events in the order they happened
    pub events: Vec<TraceEvent>,
    /// Renames made to resolve name collisions
    pub renames: Vec<RenameRecord>,
    /// Error that ended processing, if any
    pub error: Option<String>,
}

impl FileTrace {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn recorded_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Recorded { .. }))
            .count()
    }
}

/// Aggregated diagnostics for a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalTrace {
    pub files: Vec<FileTrace>,
}

impl TraversalTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, trace: FileTrace) {
        self.files.push(trace);
    }

    /// Export debug information to JSON file
    pub fn export_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
