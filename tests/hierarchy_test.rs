use std::collections::HashSet;

use treescan::{build, Hierarchy, NodeKind, PathProblem, TreeScanError, UploadedRecord};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn records(paths: &[&str]) -> Vec<UploadedRecord> {
    paths.iter().map(|p| UploadedRecord::new(*p, format!("// {p}"))).collect()
}

fn flat(tree: &Hierarchy) -> Vec<(String, usize, NodeKind)> {
    tree.flatten()
        .map(|n| (n.path.clone(), n.depth, n.kind))
        .collect()
}

fn invalid_problem(path: &str) -> PathProblem {
    match build(&records(&[path])) {
        Err(TreeScanError::InvalidPath { problem, .. }) => problem,
        other => panic!("expected InvalidPath for {path:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_file_at_root() {
    let tree = build(&[UploadedRecord::new("a.txt", "x")]).unwrap();

    assert_eq!(flat(&tree), [("a.txt".to_string(), 0, NodeKind::File)]);
    assert_eq!(tree.file_count(), 1);
    let node = tree.find("a.txt").unwrap();
    assert_eq!(&*node.content, "x");
    assert!(node.parent.is_none());
}

#[test]
fn sibling_files_share_one_folder() {
    let tree = build(&records(&["src/a.ts", "src/b.ts"])).unwrap();

    assert_eq!(
        flat(&tree),
        [
            ("src".to_string(), 0, NodeKind::Folder),
            ("src/a.ts".to_string(), 1, NodeKind::File),
            ("src/b.ts".to_string(), 1, NodeKind::File),
        ]
    );
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.file_count(), 2);
}

#[test]
fn nested_folder_under_folder() {
    let tree = build(&records(&["src/a.ts", "src/sub/b.ts"])).unwrap();

    assert_eq!(
        flat(&tree),
        [
            ("src".to_string(), 0, NodeKind::Folder),
            ("src/a.ts".to_string(), 1, NodeKind::File),
            ("src/sub".to_string(), 1, NodeKind::Folder),
            ("src/sub/b.ts".to_string(), 2, NodeKind::File),
        ]
    );

    let src = tree.find("src").unwrap();
    let names: Vec<&str> = tree.children(src.id).map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["a.ts", "sub"]);
    assert!(src.content.is_empty());
}

#[test]
fn empty_path_is_rejected() {
    assert_eq!(invalid_problem(""), PathProblem::Empty);
}

#[test]
fn empty_segments_are_rejected() {
    assert_eq!(invalid_problem("/a"), PathProblem::EmptySegment { index: 0 });
    assert_eq!(invalid_problem("a//b"), PathProblem::EmptySegment { index: 1 });
    assert_eq!(invalid_problem("a/b/"), PathProblem::EmptySegment { index: 2 });
}

#[test]
fn one_bad_path_rejects_the_whole_batch() {
    let err = build(&records(&["ok/a.txt", "ok/b.txt", "bad//c.txt"])).unwrap_err();

    assert!(err.is_input_error());
    match err {
        TreeScanError::InvalidPath { path, .. } => assert_eq!(path, "bad//c.txt"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_batch_builds_empty_tree() {
    let tree = build(&[]).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.flatten().count(), 0);
}

// ---------------------------------------------------------------------------
// First occurrence decides the kind
// ---------------------------------------------------------------------------

#[test]
fn file_record_does_not_turn_folder_into_file() {
    let tree = build(&[
        UploadedRecord::new("a/b.txt", "inner"),
        UploadedRecord::new("a", "would-be file"),
    ])
    .unwrap();

    let a = tree.find("a").unwrap();
    assert_eq!(a.kind, NodeKind::Folder);
    assert!(a.content.is_empty());
    assert_eq!(a.children.len(), 1);
    assert_eq!(tree.skipped(), ["a"]);
}

#[test]
fn file_is_not_descended_into() {
    let tree = build(&[
        UploadedRecord::new("a", "file first"),
        UploadedRecord::new("a/b.txt", "never placed"),
    ])
    .unwrap();

    let a = tree.find("a").unwrap();
    assert_eq!(a.kind, NodeKind::File);
    assert!(a.children.is_empty());
    assert!(tree.find("a/b.txt").is_none());
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.skipped(), ["a/b.txt"]);
}

#[test]
fn duplicate_file_keeps_first_content() {
    let tree = build(&[
        UploadedRecord::new("dup.txt", "first"),
        UploadedRecord::new("dup.txt", "second"),
    ])
    .unwrap();

    assert_eq!(&*tree.find("dup.txt").unwrap().content, "first");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.skipped(), ["dup.txt"]);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn flattening_follows_first_seen_order() {
    let tree = build(&records(&["z/1", "a/1", "z/2", "a/deep/x", "root.txt"])).unwrap();

    let paths: Vec<String> = tree.flatten().map(|n| n.path.clone()).collect();
    assert_eq!(
        paths,
        ["z", "z/1", "z/2", "a", "a/1", "a/deep", "a/deep/x", "root.txt"]
    );
}

#[test]
fn structural_invariants_hold() {
    let tree = build(&records(&[
        "app/src/main.rs",
        "app/src/lib.rs",
        "app/src/util/mod.rs",
        "app/Cargo.toml",
        "docs/guide/intro.md",
        "docs/guide/setup/linux.md",
        "README.md",
        "app/src/util/io.rs",
    ]))
    .unwrap();

    let mut seen = HashSet::new();
    for node in tree.flatten() {
        // Unique paths, parents before children
        assert!(seen.insert(node.path.clone()), "duplicate {}", node.path);
        if let Some(parent) = node.parent {
            assert!(seen.contains(&tree.get(parent).path), "{} before its parent", node.path);
        }

        // Path is the join of ancestor names, depth their count
        let mut names = vec![node.name.clone()];
        let mut cursor = node.parent;
        while let Some(id) = cursor {
            let ancestor = tree.get(id);
            assert_eq!(ancestor.kind, NodeKind::Folder);
            names.push(ancestor.name.clone());
            cursor = ancestor.parent;
        }
        names.reverse();
        assert_eq!(node.path, names.join("/"));
        assert_eq!(node.depth, names.len() - 1);

        // Folder iff it has children
        assert_eq!(node.is_folder(), !node.children.is_empty(), "{}", node.path);
    }
    assert_eq!(seen.len(), tree.len());
    assert_eq!(tree.file_count(), 8);
}
