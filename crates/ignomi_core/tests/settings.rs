use ignomi_core::config::{load_settings, read_settings, ConfigError, Settings};
use std::fs;
use std::time::Duration;

#[test]
fn missing_settings_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let settings = load_settings(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.launcher.close_delay(), Duration::from_millis(300));
}

#[test]
fn unparsable_settings_file_yields_defaults_but_strict_read_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[launcher\nclose_delay_ms = ").unwrap();

    assert_eq!(load_settings(&path).unwrap(), Settings::default());
    assert!(matches!(read_settings(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_panel_list_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[launcher]\npanels = [\"left\", \" left \"]\n").unwrap();

    let err = load_settings(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn file_values_override_defaults_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
[launcher]
panels = ["left", "right"]

[frecency]
max_items = 5

[logging]
level = "warn"
dir = "/var/log/ignomi"
"#,
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();

    assert_eq!(settings.launcher.panels, vec!["left", "right"]);
    assert_eq!(settings.launcher.close_delay_ms, 300);
    assert_eq!(settings.frecency.max_items, 5);
    assert_eq!(settings.frecency.min_launches, 2);
    assert_eq!(settings.log_level(), "warn");
    assert_eq!(settings.log_dir(), std::path::PathBuf::from("/var/log/ignomi"));
}
