use crate::entry::UploadedRecord;
use crate::error::TreeScanError;
use crate::results::ScanEntry;

/// Supplies the records of one batch.
///
/// Implement this to feed treescan from anywhere: a local directory, an
/// archive, a remote repository, or an in-memory list. The records must be
/// fully materialized before they are returned: the hierarchy builder
/// never performs I/O of its own.
///
/// # Example
///
/// ```rust
/// use treescan::{RecordSource, TreeScanError, UploadedRecord};
///
/// struct Single(&'static str);
///
/// impl RecordSource for Single {
///     fn records(&self) -> Result<Vec<UploadedRecord>, TreeScanError> {
///         Ok(vec![UploadedRecord::new(self.0, "")])
///     }
/// }
///
/// assert_eq!(Single("a.txt").records().unwrap().len(), 1);
/// ```
pub trait RecordSource: Send + Sync {
    /// Produce every record of the batch.
    ///
    /// Acquisition failures (unreadable files, a bad root) are returned as
    /// `Err` so the caller can reject the batch before any scan starts.
    fn records(&self) -> Result<Vec<UploadedRecord>, TreeScanError>;
}

impl RecordSource for Vec<UploadedRecord> {
    fn records(&self) -> Result<Vec<UploadedRecord>, TreeScanError> {
        Ok(self.clone())
    }
}

/// The simulated outcome of scanning one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Suspect,
    Error,
}

/// Decides the verdict of each file when it leaves `Scanning`.
///
/// The default is [`RandomVerdict`](crate::RandomVerdict); tests inject a
/// deterministic implementation instead.
///
/// # Thread Safety
///
/// `Send + Sync` are required because the source moves into the task that owns
/// the batch.
///
/// # Example
///
/// ```rust
/// use treescan::{ScanEntry, Verdict, VerdictSource};
///
/// struct FlagTests;
///
/// impl VerdictSource for FlagTests {
///     fn judge(&self, entry: &ScanEntry) -> Verdict {
///         if entry.name.ends_with("_test.rs") { Verdict::Error } else { Verdict::Suspect }
///     }
/// }
/// ```
pub trait VerdictSource: Send + Sync {
    fn judge(&self, entry: &ScanEntry) -> Verdict;
}
