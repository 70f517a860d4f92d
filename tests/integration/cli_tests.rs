use clap::Parser;
use dupemark::cli::Cli;
use dupemark::error::ExitCode;
use dupemark::run_app;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Root with one duplicate pair and an empty config file next to it.
fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("music");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.mp3"), b"abc").unwrap();
    fs::write(root.join("bb.mp3"), b"abc").unwrap();
    fs::write(root.join("c.mp3"), b"xyz").unwrap();

    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();
    (dir, root, config)
}

fn run(root: &Path, config: &Path, extra: &[&str]) -> anyhow::Result<ExitCode> {
    let mut args = vec![
        "dupemark".to_string(),
        "-q".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "scan".to_string(),
        root.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    run_app(Cli::try_parse_from(args).unwrap())
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn test_run_app_marks_duplicates() {
    let (_dir, root, config) = fixture();

    let code = run(&root, &config, &[]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        names(&root),
        vec!["a.mp3", "bb.mp3.ba7816bf8f01cfea.dupe", "c.mp3"]
    );
}

#[test]
fn test_run_app_dry_run_touches_nothing() {
    let (_dir, root, config) = fixture();

    let code = run(&root, &config, &["--dry-run", "--output", "json"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3", "c.mp3"]);
}

#[test]
fn test_run_app_config_file_applies() {
    let (_dir, root, config) = fixture();
    fs::write(&config, "marker_suffix = \".old\"\ntag_digest = false\n").unwrap();

    run(&root, &config, &[]).unwrap();

    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3.old", "c.mp3"]);
}

#[test]
fn test_run_app_flags_override_config_file() {
    let (_dir, root, config) = fixture();
    fs::write(&config, "marker_suffix = \".old\"\n").unwrap();

    run(&root, &config, &["--suffix", ".again", "--no-digest-tag"]).unwrap();

    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3.again", "c.mp3"]);
}

#[test]
fn test_run_app_flag_repairs_invalid_config_value() {
    let (_dir, root, config) = fixture();
    fs::write(&config, "jobs = 0\n").unwrap();

    let code = run(&root, &config, &["--jobs", "2", "--dry-run"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3", "c.mp3"]);
}

#[test]
fn test_run_app_invalid_config_value_without_flag_fails() {
    let (_dir, root, config) = fixture();
    fs::write(&config, "jobs = 0\n").unwrap();

    let err = run(&root, &config, &[]).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("at least 1"));
    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3", "c.mp3"]);
}

#[test]
fn test_run_app_missing_root_is_an_error() {
    let (dir, _root, config) = fixture();

    let err = run(&dir.path().join("absent"), &config, &[]).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_run_app_rejects_bad_suffix() {
    let (_dir, root, config) = fixture();

    let err = run(&root, &config, &["--suffix", "a/b"]).unwrap_err();

    assert!(format!("{err:#}").contains("path separator"));
    assert_eq!(names(&root), vec!["a.mp3", "bb.mp3", "c.mp3"]);
}

#[cfg(unix)]
#[test]
fn test_run_app_strict_reports_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, root, config) = fixture();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let enforced = fs::read_dir(&locked).is_err();

    let lenient = run(&root, &config, &["--dry-run"]).unwrap();
    let strict = run(&root, &config, &["--dry-run", "--strict"]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(lenient, ExitCode::Success);
    if enforced {
        assert_eq!(strict, ExitCode::PartialSuccess);
    }
}
