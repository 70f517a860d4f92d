use dupemark::actions::{apply_marks, plan_marks, MarkConfig};
use dupemark::duplicates::DuplicateFinder;
use dupemark::scanner::Hasher;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_mark_renames_dupes_with_digest_fragment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), b"abc").unwrap();
    fs::write(dir.path().join("bb.mp3"), b"abc").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let plans = plan_marks(&sets, &MarkConfig::default());
    let result = apply_marks(&plans, None);

    assert!(result.all_succeeded());
    assert!(dir.path().join("a.mp3").exists());
    assert!(!dir.path().join("bb.mp3").exists());
    assert!(dir
        .path()
        .join("bb.mp3.ba7816bf8f01cfea.dupe")
        .exists());
}

#[test]
fn test_fragment_is_first_eight_digest_bytes() {
    let digest = Hasher::new().digest_bytes(b"some content");
    let fragment = digest.fragment();

    assert_eq!(fragment.len(), 16);
    assert!(digest.to_hex().starts_with(&fragment));
    assert!(fragment.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_mark_without_fragment_and_custom_suffix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"same").unwrap();
    fs::write(dir.path().join("xy"), b"same").unwrap();
    fs::write(dir.path().join("xyz"), b"same").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let config = MarkConfig::default()
        .with_tag_digest(false)
        .with_marker_suffix(".copy");
    let result = apply_marks(&plan_marks(&sets, &config), None);

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_marked, 8);
    assert!(dir.path().join("x").exists());
    assert!(dir.path().join("xy.copy").exists());
    assert!(dir.path().join("xyz.copy").exists());
}

#[test]
fn test_canonical_content_is_untouched() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep"), b"payload").unwrap();
    fs::write(dir.path().join("extra"), b"payload").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    apply_marks(&plan_marks(&sets, &MarkConfig::default()), None);

    assert_eq!(fs::read(dir.path().join("keep")).unwrap(), b"payload");
    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|n| n.starts_with("extra.") && n.ends_with(".dupe")));
}

#[test]
fn test_file_removed_after_scan_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"data").unwrap();
    fs::write(dir.path().join("b"), b"data").unwrap();

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::remove_file(dir.path().join("b")).unwrap();

    let result = apply_marks(&plan_marks(&sets, &MarkConfig::default()), None);

    assert_eq!(result.failure_count(), 1);
    assert!(result.failures[0].0.ends_with("b"));
    assert!(dir.path().join("a").exists());
}
