use std::fs;
use std::path::PathBuf;

use treescan::{
    scan, DirectorySource, FixedVerdict, NodeKind, RecordSource, SampleSource, ScanStatus,
    TreeScanError, Verdict,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary project to upload.
///
/// Structure:
/// ```
/// tmp/
///   project/
///     invoice_jan.txt
///     invoice_feb.txt
///     report.txt
///     notes.md
///     .env
///     subdir/
///       invoice_mar.txt
///       other.rs
/// ```
fn setup_test_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("project");
    fs::create_dir(&root).unwrap();

    fs::write(root.join("invoice_jan.txt"), "january invoice").unwrap();
    fs::write(root.join("invoice_feb.txt"), "february invoice").unwrap();
    fs::write(root.join("report.txt"), "quarterly report").unwrap();
    fs::write(root.join("notes.md"), "some notes").unwrap();
    fs::write(root.join(".env"), "SECRET=1").unwrap();

    let sub = root.join("subdir");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("invoice_mar.txt"), "march invoice").unwrap();
    fs::write(sub.join("other.rs"), "fn main() {}").unwrap();

    (dir, root)
}

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

#[test]
fn directory_source_reads_every_file() {
    let (_dir, root) = setup_test_dir();
    let records = DirectorySource::new(&root).records().unwrap();

    let expected_files = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count();
    assert_eq!(records.len(), expected_files);
    assert_eq!(records.len(), 7);

    assert!(records.iter().all(|r| r.path.starts_with("project/")));
    let mut sorted: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    sorted.sort();
    assert_eq!(sorted, records.iter().map(|r| r.path.as_str()).collect::<Vec<_>>());

    let other = records.iter().find(|r| r.path == "project/subdir/other.rs").unwrap();
    assert_eq!(other.content, "fn main() {}");
    assert!(records.iter().any(|r| r.path == "project/.env"));
}

#[test]
fn directory_source_honours_ignore_files_when_asked() {
    let (_dir, root) = setup_test_dir();
    fs::write(root.join(".ignore"), "*.md\n").unwrap();

    let all = DirectorySource::new(&root).records().unwrap();
    assert!(all.iter().any(|r| r.path == "project/notes.md"));

    let filtered = DirectorySource::new(&root)
        .respect_ignore_files(true)
        .records()
        .unwrap();
    assert!(filtered.iter().all(|r| r.path != "project/notes.md"));
    assert!(filtered.iter().any(|r| r.path == "project/report.txt"));
}

#[test]
fn directory_source_reads_binary_lossily() {
    let (_dir, root) = setup_test_dir();
    fs::write(root.join("blob.bin"), [0x66, 0x6f, 0xff, 0x6f]).unwrap();

    let records = DirectorySource::new(&root).records().unwrap();
    let blob = records.iter().find(|r| r.path == "project/blob.bin").unwrap();
    assert_eq!(blob.content, "fo\u{fffd}o");
}

#[cfg(unix)]
#[test]
fn symlinked_root_keeps_the_chosen_name() {
    let (dir, root) = setup_test_dir();
    let link = dir.path().join("upload");
    std::os::unix::fs::symlink(&root, &link).unwrap();

    let records = DirectorySource::new(&link).records().unwrap();

    assert_eq!(records.len(), 7);
    assert!(records.iter().all(|r| r.path.starts_with("upload/")));
    assert!(records.iter().any(|r| r.path == "upload/subdir/other.rs"));
}

#[test]
fn dot_root_uses_the_resolved_name() {
    let (_dir, root) = setup_test_dir();

    let records = DirectorySource::new(root.join("subdir").join(".."))
        .records()
        .unwrap();

    assert_eq!(records.len(), 7);
    assert!(records.iter().all(|r| r.path.starts_with("project/")));
}

#[test]
fn missing_directory_is_invalid_source() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = DirectorySource::new(&missing).records().unwrap_err();
    assert!(matches!(err, TreeScanError::InvalidSource(ref p) if *p == missing));
    assert_eq!(err.path(), Some(&missing));
}

#[test]
fn uploaded_directory_scans_to_completion() {
    let (_dir, root) = setup_test_dir();

    let report = scan()
        .source(DirectorySource::new(&root))
        .with_verdicts(FixedVerdict(Verdict::Suspect))
        .simulate()
        .unwrap();

    assert_eq!(report.stats.total, 7);
    assert_eq!(report.stats.scanned, 7);
    assert_eq!(report.stats.errors, 0);
    assert!(report.skipped.is_empty());

    let folders: Vec<&str> = report
        .entries
        .iter()
        .filter(|e| e.kind == NodeKind::Folder)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(folders, ["project", "project/subdir"]);
    assert!(report
        .entries
        .iter()
        .filter(|e| !e.is_folder())
        .all(|e| e.status == ScanStatus::Suspect));
}

// ---------------------------------------------------------------------------
// SampleSource
// ---------------------------------------------------------------------------

#[test]
fn sample_source_yields_fixed_project() {
    let records = SampleSource::new(" https://example.com/me/repo ").records().unwrap();

    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["src/index.tsx", "src/App.tsx", "src/utils/utils.ts"]);
    assert_eq!(records[0].content, "// Fetched from: https://example.com/me/repo");
}

#[test]
fn blank_url_is_rejected() {
    let err = SampleSource::new("   ").records().unwrap_err();
    assert!(matches!(err, TreeScanError::InvalidUrl(_)));
    assert!(err.is_input_error());
}

#[test]
fn sample_project_reveals_in_tree_order() {
    let report = scan()
        .source(SampleSource::new("https://example.com/repo"))
        .seed(5)
        .simulate()
        .unwrap();

    let order: Vec<(&str, usize)> = report
        .entries
        .iter()
        .map(|e| (e.path.as_str(), e.depth))
        .collect();
    assert_eq!(
        order,
        [
            ("src", 0),
            ("src/index.tsx", 1),
            ("src/App.tsx", 1),
            ("src/utils", 1),
            ("src/utils/utils.ts", 2),
        ]
    );
    assert_eq!(report.stats.total, 3);
    assert!(report.stats.is_complete());
}
