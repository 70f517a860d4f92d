use dupemark::actions::{apply_marks, plan_marks, MarkConfig};
use dupemark::duplicates::{DuplicateFinder, FinderConfig};
use dupemark::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path) {
    fs::create_dir(root.join("album")).unwrap();
    for (name, content) in [
        ("a.mp3", "one"),
        ("a (1).mp3", "one"),
        ("a (2).mp3", "one"),
        ("b.mp3", "two"),
        ("c.mp3", "six"),
    ] {
        fs::write(root.join(name), content).unwrap();
        fs::write(root.join("album").join(name), content).unwrap();
    }
}

fn scan_and_mark(root: &Path, suffix: &str) -> usize {
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_walker_config(WalkerConfig::default().with_marker_suffix(suffix)),
    );
    let (sets, _) = finder.find_duplicates(root).unwrap();
    let config = MarkConfig::default().with_marker_suffix(suffix);
    apply_marks(&plan_marks(&sets, &config), None).success_count()
}

#[test]
fn test_second_run_finds_nothing() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    assert_eq!(scan_and_mark(dir.path(), ".dupe"), 4);
    assert_eq!(scan_and_mark(dir.path(), ".dupe"), 0);
}

#[test]
fn test_second_run_with_custom_suffix() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    assert_eq!(scan_and_mark(dir.path(), ".seen"), 4);
    assert_eq!(scan_and_mark(dir.path(), ".seen"), 0);
}

#[test]
fn test_new_copy_after_marking_is_found() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    scan_and_mark(dir.path(), ".dupe");

    fs::write(dir.path().join("b copy.mp3"), "two").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert!(sets[0].canonical.ends_with("b.mp3"));
    assert!(sets[0].dupes[0].ends_with("b copy.mp3"));
}
