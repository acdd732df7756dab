use std::collections::HashSet;

use crate::results::{EntryId, ScanEntry};

/// Expand/collapse selection for a list of revealed entries.
///
/// Folders are expanded independently; at most one file is expanded at a
/// time. A row is visible when it sits at the root or every folder above it
/// is expanded.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    folders: HashSet<String>,
    file: Option<EntryId>,
}

impl ExpansionState {
    /// Everything collapsed, no file expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a folder. Returns whether it is now expanded.
    pub fn toggle_folder(&mut self, path: &str) -> bool {
        if self.folders.remove(path) {
            false
        } else {
            self.folders.insert(path.to_string());
            true
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.folders.contains(path)
    }

    /// Expand a file, collapsing any other; toggling the expanded file
    /// collapses it. Returns whether `id` is now expanded.
    pub fn toggle_file(&mut self, id: EntryId) -> bool {
        if self.file == Some(id) {
            self.file = None;
            false
        } else {
            self.file = Some(id);
            true
        }
    }

    pub fn expanded_file(&self) -> Option<EntryId> {
        self.file
    }

    /// Expand every folder among `entries`.
    pub fn expand_all(&mut self, entries: &[ScanEntry]) {
        self.folders
            .extend(entries.iter().filter(|e| e.is_folder()).map(|e| e.path.clone()));
    }

    pub fn collapse_all(&mut self) {
        self.folders.clear();
        self.file = None;
    }

    /// Root rows are always visible; others need every ancestor folder
    /// expanded.
    pub fn is_visible(&self, entry: &ScanEntry) -> bool {
        entry.depth == 0
            || entry
                .path
                .match_indices('/')
                .all(|(i, _)| self.folders.contains(&entry.path[..i]))
    }

    /// The rows a view should draw, in reveal order.
    pub fn visible<'a>(&'a self, entries: &'a [ScanEntry]) -> impl Iterator<Item = &'a ScanEntry> + 'a {
        entries.iter().filter(move |e| self.is_visible(e))
    }
}
