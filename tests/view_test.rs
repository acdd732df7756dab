use treescan::{scan, EntryId, ExpansionState, FixedVerdict, ScanEntry, UploadedRecord, Verdict};

fn entries() -> Vec<ScanEntry> {
    scan()
        .records(vec![
            UploadedRecord::new("src/a.ts", ""),
            UploadedRecord::new("src/sub/b.ts", ""),
            UploadedRecord::new("README.md", ""),
        ])
        .with_verdicts(FixedVerdict(Verdict::Suspect))
        .simulate()
        .unwrap()
        .entries
}

fn visible(view: &ExpansionState, entries: &[ScanEntry]) -> Vec<String> {
    view.visible(entries).map(|e| e.path.clone()).collect()
}

#[test]
fn only_root_rows_visible_when_collapsed() {
    let entries = entries();
    let view = ExpansionState::new();

    assert_eq!(visible(&view, &entries), ["src", "README.md"]);
}

#[test]
fn expanding_a_folder_shows_its_direct_children() {
    let entries = entries();
    let mut view = ExpansionState::new();

    assert!(view.toggle_folder("src"));
    assert_eq!(visible(&view, &entries), ["src", "src/a.ts", "src/sub", "README.md"]);

    assert!(view.toggle_folder("src/sub"));
    assert_eq!(
        visible(&view, &entries),
        ["src", "src/a.ts", "src/sub", "src/sub/b.ts", "README.md"]
    );
}

#[test]
fn collapsed_ancestor_hides_expanded_descendants() {
    let entries = entries();
    let mut view = ExpansionState::new();
    view.expand_all(&entries);
    assert_eq!(visible(&view, &entries).len(), entries.len());

    assert!(!view.toggle_folder("src"));
    assert!(view.is_expanded("src/sub"));
    assert_eq!(visible(&view, &entries), ["src", "README.md"]);
}

#[test]
fn one_expanded_file_at_a_time() {
    let mut view = ExpansionState::new();

    assert!(view.toggle_file(EntryId(1)));
    assert!(view.toggle_file(EntryId(3)));
    assert_eq!(view.expanded_file(), Some(EntryId(3)));

    assert!(!view.toggle_file(EntryId(3)));
    assert_eq!(view.expanded_file(), None);
}

#[test]
fn collapse_all_resets_everything() {
    let entries = entries();
    let mut view = ExpansionState::new();
    view.expand_all(&entries);
    view.toggle_file(EntryId(1));

    view.collapse_all();
    assert!(!view.is_expanded("src"));
    assert_eq!(view.expanded_file(), None);
}
