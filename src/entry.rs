use serde::{Deserialize, Serialize};

/// A single uploaded file handed over by a [`RecordSource`](crate::traits::RecordSource).
///
/// `path` is slash-delimited and relative to the batch root, e.g.
/// `project/src/main.rs`. Folders are never uploaded as records of their
/// own; they are implied by the intermediate segments of file paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedRecord {
    /// Slash-delimited path, unique within a batch.
    pub path: String,

    /// The file's text body.
    #[serde(default)]
    pub content: String,
}

impl UploadedRecord {
    /// A record at `path` with the given body.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// A record with an empty body.
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(path, String::new())
    }
}

/// What kind of tree node an entry is.
///
/// Decided by the first record that mentions the segment: an intermediate
/// segment makes a folder, a final segment makes a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A container of other nodes. Never scanned.
    Folder,

    /// A leaf carrying content. Walks the scan lifecycle.
    File,
}

impl NodeKind {
    /// Returns `true` for [`NodeKind::Folder`].
    ///
    /// ```
    /// use treescan::NodeKind;
    ///
    /// assert!(NodeKind::Folder.is_folder());
    /// assert!(!NodeKind::File.is_folder());
    /// ```
    pub fn is_folder(self) -> bool {
        self == NodeKind::Folder
    }
}
