//! Configuration file loading for recordfix.
//!
//! Discovers and loads `recordfix.toml` from a project root. Values present in the file override
//! the settings they are applied to; absent keys leave them alone.

use crate::settings::ConvertSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use recordfix_domain::ExecutionMode;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "recordfix.toml";

/// Top-level configuration from recordfix.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecordfixConfig {
    pub conversion: ConversionConfig,
}

/// `[conversion]` section of the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub search_weakened_visibility: Option<bool>,

    /// `interactive` or `unattended`.
    pub mode: Option<ExecutionMode>,

    pub ignore_conflicts: Option<bool>,
    pub check_preconditions: Option<bool>,
}

impl RecordfixConfig {
    pub fn apply_to(&self, settings: &mut ConvertSettings) {
        let c = &self.conversion;
        if let Some(v) = c.search_weakened_visibility {
            settings.search_weakened_visibility = v;
        }
        if let Some(v) = c.mode {
            settings.mode = v;
        }
        if let Some(v) = c.ignore_conflicts {
            settings.ignore_conflicts = v;
        }
        if let Some(v) = c.check_preconditions {
            settings.check_preconditions = v;
        }
    }

    /// Default settings with this config applied.
    pub fn to_settings(&self) -> ConvertSettings {
        let mut settings = ConvertSettings::default();
        self.apply_to(&mut settings);
        settings
    }
}

/// Returns the path of `recordfix.toml` in `root`, if there is one.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<RecordfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<RecordfixConfig> {
    let config: RecordfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<RecordfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(RecordfixConfig::default()),
    }
}
