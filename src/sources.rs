use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

use crate::entry::UploadedRecord;
use crate::error::TreeScanError;
use crate::traits::RecordSource;

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

/// Reads every file under a local directory, the way a browser directory
/// upload does.
///
/// Record paths start with the directory's own name, so uploading
/// `/home/me/project` yields `project/src/main.rs` and so on. Hidden files
/// are included. Records are sorted by path.
pub struct DirectorySource {
    root: PathBuf,
    respect_ignore_files: bool,
}

impl DirectorySource {
    /// Read from `root`. Its own name becomes the first path segment.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_ignore_files: false,
        }
    }

    /// Honour `.gitignore`, `.ignore` and friends. Off by default.
    pub fn respect_ignore_files(mut self, yes: bool) -> Self {
        self.respect_ignore_files = yes;
        self
    }
}

impl RecordSource for DirectorySource {
    fn records(&self) -> Result<Vec<UploadedRecord>, TreeScanError> {
        if !self.root.is_dir() {
            return Err(TreeScanError::InvalidSource(self.root.clone()));
        }
        let root = fs::canonicalize(&self.root).map_err(|source| TreeScanError::Io {
            path: self.root.clone(),
            source,
        })?;
        // The name the caller picked, even when it is a symlink; `.` and
        // `..` have none, so use the resolved directory's.
        let root_name = self
            .root
            .file_name()
            .or_else(|| root.file_name())
            .map(|n| n.to_string_lossy().into_owned());

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(self.respect_ignore_files)
            .hidden(false)
            .follow_links(false);

        let mut records = Vec::new();
        for result in builder.build() {
            let entry = result.map_err(map_ignore_error)?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(path) = record_path(&root, root_name.as_deref(), entry.path()) else {
                continue;
            };

            let bytes = fs::read(entry.path()).map_err(|source| TreeScanError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            records.push(UploadedRecord::new(path, String::from_utf8_lossy(&bytes)));
        }

        records.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(root = %root.display(), files = records.len(), "directory read");
        Ok(records)
    }
}

/// `<root name>/<relative path>` with `/` separators.
fn record_path(root: &Path, root_name: Option<&str>, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = root_name
        .map(str::to_string)
        .into_iter()
        .chain(relative.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }))
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn map_ignore_error(e: ignore::Error) -> TreeScanError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => TreeScanError::Io { path, source },
            other => TreeScanError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::Io(source) => TreeScanError::Io {
            path: PathBuf::new(),
            source,
        },
        other => TreeScanError::Walk(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// SampleSource
// ---------------------------------------------------------------------------

/// Placeholder for importing a repository by URL.
///
/// Nothing is fetched: any non-blank URL yields the same three-file sample
/// project, with the URL recorded in the first file's content.
pub struct SampleSource {
    url: String,
}

impl SampleSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RecordSource for SampleSource {
    fn records(&self) -> Result<Vec<UploadedRecord>, TreeScanError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(TreeScanError::InvalidUrl(self.url.clone()));
        }

        tracing::info!(url, "url import is a placeholder, using the sample project");
        Ok(vec![
            UploadedRecord::new("src/index.tsx", format!("// Fetched from: {url}")),
            UploadedRecord::new("src/App.tsx", "// Sample file from repository"),
            UploadedRecord::new("src/utils/utils.ts", "// Utility functions"),
        ])
    }
}
