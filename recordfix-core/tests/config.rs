use camino::Utf8PathBuf;
use recordfix_core::config::{CONFIG_FILE_NAME, discover_config, load_config, load_or_default};
use recordfix_core::{ConvertSettings, ExecutionMode};
use tempfile::TempDir;

fn root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path")
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let root = root(&dir);

    assert!(discover_config(&root).is_none());
    let config = load_or_default(&root).unwrap();
    assert_eq!(config.to_settings(), ConvertSettings::default());
}

#[test]
fn config_file_in_root_is_applied() {
    let dir = TempDir::new().unwrap();
    let root = root(&dir);
    std::fs::write(
        root.join(CONFIG_FILE_NAME),
        "[conversion]\nmode = \"unattended\"\ncheck_preconditions = false\n",
    )
    .unwrap();

    assert_eq!(discover_config(&root), Some(root.join(CONFIG_FILE_NAME)));
    let settings = load_or_default(&root).unwrap().to_settings();
    assert_eq!(settings.mode, ExecutionMode::Unattended);
    assert!(!settings.check_preconditions);
    assert!(settings.search_weakened_visibility);
    assert!(!settings.ignore_conflicts);
}

#[test]
fn file_values_override_existing_settings_only_where_set() {
    let dir = TempDir::new().unwrap();
    let root = root(&dir);
    std::fs::write(root.join(CONFIG_FILE_NAME), "[conversion]\nignore_conflicts = true\n").unwrap();

    let mut settings = ConvertSettings {
        search_weakened_visibility: false,
        ..ConvertSettings::unattended()
    };
    load_or_default(&root).unwrap().apply_to(&mut settings);

    assert!(settings.ignore_conflicts);
    assert!(!settings.search_weakened_visibility);
    assert_eq!(settings.mode, ExecutionMode::Unattended);
}

#[test]
fn malformed_config_reports_the_file() {
    let dir = TempDir::new().unwrap();
    let root = root(&dir);
    let path = root.join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[conversion\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains(CONFIG_FILE_NAME));
}
