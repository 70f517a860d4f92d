use dupemark::duplicates::{DuplicateFinder, FinderConfig};
use dupemark::scanner::WalkerConfig;
use std::fs;
use tempfile::tempdir;

const X: [u8; 100] = [b'x'; 100];

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.dirs_scanned, 1);
}

#[test]
fn test_scenario_identical_pair() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), X).unwrap();
    fs::write(dir.path().join("bb.mp3"), X).unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0].canonical.ends_with("a.mp3"));
    assert_eq!(sets[0].dupes.len(), 1);
    assert!(sets[0].dupes[0].ends_with("bb.mp3"));
}

#[test]
fn test_scenario_same_size_different_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), X).unwrap();
    fs::write(dir.path().join("b.mp3"), [b'y'; 100]).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.files_digested, 2);
}

#[test]
fn test_scenario_prefix_excluded() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), X).unwrap();
    fs::write(dir.path().join("b.mp3"), X).unwrap();
    fs::write(dir.path().join("c.mp3"), &X[..50]).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0].members().all(|p| !p.ends_with("c.mp3")));
    // c.mp3 has a unique size and is never read.
    assert_eq!(summary.files_digested, 2);
}

#[test]
fn test_scenario_marked_file_excluded() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("old.dupe"), X).unwrap();
    fs::write(dir.path().join("new.mp3"), X).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.files_digested, 0);
}

#[test]
fn test_custom_suffix_excludes_only_that_suffix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), X).unwrap();
    fs::write(dir.path().join("b.seen"), X).unwrap();
    fs::write(dir.path().join("c.dupe"), X).unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_marker_suffix(".seen"));
    let (sets, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert!(sets[0].canonical.ends_with("a"));
    assert!(sets[0].dupes[0].ends_with("c.dupe"));
}

#[test]
fn test_directories_are_independent() {
    let dir = tempdir().unwrap();
    for sub in ["one", "two", "one/deeper"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("track.flac"), X).unwrap();
    }
    fs::write(dir.path().join("one/track copy.flac"), X).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.dirs_scanned, 4);
    assert_eq!(sets.len(), 1);
    assert!(sets[0].canonical.ends_with("one/track.flac"));
    assert!(sets[0].dupes[0].ends_with("one/track copy.flac"));
}

#[test]
fn test_sets_follow_traversal_order() {
    let dir = tempdir().unwrap();
    for sub in ["b", "a", "c"] {
        let path = dir.path().join(sub);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("x"), sub).unwrap();
        fs::write(path.join("y"), sub).unwrap();
    }

    let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_jobs(3))
        .find_duplicates(dir.path())
        .unwrap();

    let dirs: Vec<_> = sets
        .iter()
        .map(|s| s.canonical.parent().unwrap().file_name().unwrap().to_owned())
        .collect();
    assert_eq!(dirs, vec!["a", "b", "c"]);
}

#[test]
fn test_relative_root_is_resolved() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"1").unwrap();
    fs::write(dir.path().join("b"), b"1").unwrap();
    let relative = dir.path().join("..").join(dir.path().file_name().unwrap());

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&relative)
        .unwrap();

    assert!(sets[0].canonical.is_absolute());
    assert!(!sets[0]
        .canonical
        .components()
        .any(|c| c == std::path::Component::ParentDir));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("a"), b"1").unwrap();
    fs::write(locked.join("b"), b"1").unwrap();
    fs::write(dir.path().join("a"), b"2").unwrap();
    fs::write(dir.path().join("b"), b"2").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let readable = fs::read_dir(&locked).is_ok();
    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (sets, summary) = result.unwrap();
    if readable {
        // Running as root: permissions are not enforced.
        assert_eq!(sets.len(), 2);
        return;
    }
    assert_eq!(sets.len(), 1);
    assert_eq!(summary.dirs_skipped, 1);
    assert!(summary.skipped[0].dir.ends_with("locked"));
}
