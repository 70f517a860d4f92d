use dupemark::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
marker_suffix = ".seen"
tag_digest = false
jobs = 3
follow_symlinks = true
"#,
    )
    .unwrap();

    let config = Config::load_from_path(Some(&path)).unwrap();

    assert_eq!(config.marker_suffix, ".seen");
    assert!(!config.tag_digest);
    assert_eq!(config.jobs, 3);
    assert!(config.follow_symlinks);
    assert!(!config.skip_hidden);
}

#[test]
fn test_config_env_layer_wins_over_file() {
    // Figment::Jail isolates the environment from other tests.
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "jobs = 2\nskip_hidden = false\n")?;
        jail.set_env("DUPEMARK_JOBS", "6");
        jail.set_env("DUPEMARK_SKIP_HIDDEN", "true");

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("DUPEMARK_").split("__"))
            .extract()?;

        assert_eq!(config.jobs, 6);
        assert!(config.skip_hidden);
        assert_eq!(config.marker_suffix, ".dupe");
        Ok(())
    });
}

#[test]
fn test_config_invalid_values_rejected_on_validate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "jobs = 0\n").unwrap();

    // Loading leaves room for command-line flags to fix the value.
    let mut config = Config::load_from_path(Some(&path)).unwrap();
    assert_eq!(config.jobs, 0);
    assert!(matches!(config.validate(), Err(ConfigError::ZeroJobs)));

    config.jobs = 2;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_malformed_toml_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "marker_suffix = [unclosed").unwrap();

    let result = Config::load_from_path(Some(&path));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config {
        jobs: 4,
        ..Config::default()
    };
    let text = toml::to_string_pretty(&config).unwrap();

    assert!(text.contains("marker_suffix = \".dupe\""));
    assert!(text.contains("jobs = 4"));
}
