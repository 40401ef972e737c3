//! `burin.toml` preferences.
//!
//! Holds the handful of user-visible toggles the UI persists: theme name,
//! line-number visibility, soft wrap, and the reflow column. A missing
//! file yields defaults; unknown fields are ignored so older binaries
//! tolerate newer configs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE: &str = "burin.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub theme: Option<String>,
    pub show_line_numbers: bool,
    pub soft_wrap: bool,
    pub wrap_column: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            show_line_numbers: true,
            soft_wrap: false,
            wrap_column: 80,
        }
    }
}

/// Resolve the config path: explicit override or `burin.toml` in the
/// working directory.
pub fn config_path(overridden: Option<PathBuf>) -> PathBuf {
    overridden.unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load preferences, falling back to defaults when the file is absent.
/// A malformed file is an error; the caller decides how loud to be.
pub fn load_from(path: &Path) -> Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let config: Config = toml::from_str(&text)
                .with_context(|| format!("parse {}", path.display()))?;
            info!(target: "config", file = %path.display(), "config_loaded");
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(target: "config", file = %path.display(), "config_absent_using_defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

/// Persist preferences. Failures are reported, not fatal; preferences are
/// a convenience.
pub fn save_to(path: &Path, config: &Config) -> Result<()> {
    let text = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    debug!(target: "config", file = %path.display(), "config_saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let config = load_from(Path::new("/nonexistent/burin.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.show_line_numbers);
        assert_eq!(config.wrap_column, 80);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join("burin-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);

        let config = Config {
            theme: Some("parchment light".into()),
            show_line_numbers: false,
            soft_wrap: true,
            wrap_column: 72,
        };
        save_to(&path, &config).unwrap();
        assert_eq!(load_from(&path).unwrap(), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let parsed: Config =
            toml::from_str("wrap_column = 100\nfuture_option = \"x\"\n").unwrap();
        assert_eq!(parsed.wrap_column, 100);
        assert!(parsed.show_line_numbers);
    }
}
