use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entry::NodeKind;
use crate::hierarchy::NodeId;

/// Identifies one batch. Increments every time a batch is started, so a
/// superseded batch can always be told apart from its replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub u64);

/// Stable identifier of a revealed entry: its reveal index within the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub usize);

/// Where an entry is in the scan lifecycle.
///
/// Files go `Pending → Scanning → Suspect | Error`. Folders are
/// `Structural` for their whole life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanStatus {
    /// A folder. Never scanned.
    Structural,

    /// Revealed, waiting for its scan to begin.
    Pending,

    /// Scan in progress.
    Scanning,

    /// Resolved without an error.
    Suspect,

    /// Resolved with an error; `message` says what was found.
    Error { message: String },
}

impl ScanStatus {
    /// `Suspect` and `Error` never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Suspect | Self::Error { .. })
    }

    /// Short lowercase label, e.g. for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structural => "folder",
            Self::Pending => "pending",
            Self::Scanning => "scanning",
            Self::Suspect => "suspect",
            Self::Error { .. } => "error",
        }
    }
}

/// A revealed node and its current scan status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub id: EntryId,
    pub node: NodeId,
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub kind: NodeKind,
    pub content: Arc<str>,
    #[serde(flatten)]
    pub status: ScanStatus,
}

impl ScanEntry {
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// The error message, present only when the status is `Error`.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ScanStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of files in the batch. Fixed when the batch starts.
    pub total: usize,

    /// Files that have left `Scanning`.
    pub scanned: usize,

    /// Files whose verdict was `Error`.
    pub errors: usize,
}

impl ScanStats {
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.scanned)
    }

    /// Every file has a verdict.
    pub fn is_complete(&self) -> bool {
        self.scanned == self.total
    }
}

/// What observers of a live scan see: one immutable copy of a batch's
/// revealed entries and counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub batch: BatchId,
    pub entries: Vec<ScanEntry>,
    pub stats: ScanStats,

    /// Nodes are still being revealed.
    pub revealing: bool,
}

impl ScanSnapshot {
    /// Revealing is over and every file has a verdict.
    pub fn is_finished(&self) -> bool {
        !self.revealing && self.stats.is_complete()
    }
}

/// The outcome of a batch run to completion on a virtual timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub batch: BatchId,
    pub entries: Vec<ScanEntry>,
    pub stats: ScanStats,

    /// Paths the hierarchy builder left out (see [`Hierarchy::skipped`](crate::Hierarchy::skipped)).
    pub skipped: Vec<String>,

    /// Virtual time from batch start to the last transition.
    pub elapsed: Duration,
}

impl ScanReport {
    /// Entries whose verdict was `Error`.
    pub fn errors(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter().filter(|e| e.error().is_some())
    }
}
