//! # treescan
//!
//! File-tree builder and timer-driven scan simulator for uploaded folders.
//!
//! treescan turns a flat batch of uploaded files (`{path, content}`
//! records) into a folder/file tree, flattens it depth-first, and then
//! plays a simulated scan over it: nodes are revealed one per tick and each
//! file walks `pending → scanning → suspect | error` on its own timers. The
//! verdicts are simulated; no code is analysed.
//!
//! # Quick Start
//!
//! ```rust
//! use treescan::{UploadedRecord, ScanStatus};
//!
//! let report = treescan::scan()
//!     .records(vec![
//!         UploadedRecord::new("src/a.ts", "let a = 1;"),
//!         UploadedRecord::new("src/b.ts", "let b = 2;"),
//!     ])
//!     .seed(42)
//!     .simulate()
//!     .unwrap();
//!
//! assert_eq!(report.stats.total, 2);
//! assert_eq!(report.stats.scanned, 2);
//! assert!(report.entries.iter().all(|e| e.is_folder() || e.status.is_terminal()));
//! assert_eq!(report.entries[0].status, ScanStatus::Structural);
//! ```
//!
//! # Building the tree on its own
//!
//! ```rust
//! use treescan::UploadedRecord;
//!
//! let tree = treescan::build(&[
//!     UploadedRecord::new("src/a.ts", ""),
//!     UploadedRecord::new("src/sub/b.ts", ""),
//! ]).unwrap();
//!
//! let order: Vec<(&str, usize)> = tree.flatten().map(|n| (n.path.as_str(), n.depth)).collect();
//! assert_eq!(order, [("src", 0), ("src/a.ts", 1), ("src/sub", 1), ("src/sub/b.ts", 2)]);
//! ```
//!
//! # Live scans
//!
//! [`Scanner`] runs sessions in real time on Tokio and publishes
//! [`ScanSnapshot`]s through a watch channel. Starting a new batch
//! supersedes the running one and discards all of its pending timers.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), treescan::TreeScanError> {
//! let mut scanner = treescan::Scanner::new();
//! let session = treescan::scan()
//!     .source(treescan::DirectorySource::new("./my-project"))
//!     .prepare()?;
//! scanner.start(session);
//! let done = scanner.finished().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;

mod builder;
mod entry;
mod error;
mod hierarchy;
mod results;
mod scanner;
mod sources;
mod traits;
mod verdict;
mod view;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::ScanBuilder;
pub use engine::{ScanEvent, ScanSession, ScanTimings, Scheduled, Timeline};
pub use entry::{NodeKind, UploadedRecord};
pub use error::{PathProblem, TreeScanError};
pub use hierarchy::{Flatten, Hierarchy, Node, NodeId};
pub use results::{BatchId, EntryId, ScanEntry, ScanReport, ScanSnapshot, ScanStats, ScanStatus};
pub use scanner::Scanner;
pub use sources::{DirectorySource, SampleSource};
pub use traits::{RecordSource, Verdict, VerdictSource};
pub use verdict::{FixedVerdict, RandomVerdict, DEFAULT_ERROR_PROBABILITY};
pub use view::ExpansionState;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a new [`ScanBuilder`] to configure and run a simulated scan.
pub fn scan() -> ScanBuilder {
    ScanBuilder::default()
}

/// Build the file tree for a batch of records.
///
/// # Errors
///
/// [`TreeScanError::InvalidPath`] when any path is empty or contains an
/// empty segment; no tree is produced for such a batch.
///
/// # Example
///
/// ```rust
/// use treescan::{TreeScanError, UploadedRecord};
///
/// let err = treescan::build(&[UploadedRecord::new("a//b", "")]).unwrap_err();
/// assert!(matches!(err, TreeScanError::InvalidPath { .. }));
/// ```
pub fn build(records: &[UploadedRecord]) -> Result<Hierarchy, TreeScanError> {
    Hierarchy::build(records)
}
