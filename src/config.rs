//! YAML configuration.
//!
//! Lives at `~/.config/history-nav/config.yaml`. A file with the defaults is
//! written on first start. Missing keys fall back to their defaults, so a
//! config only needs the settings a user wants to change.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::history::{AgeWindow, HistoryReader, ParseOptions};

const APP_DIR: &str = "history-nav";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// History files, `~` is expanded.
    pub sources: Vec<String>,
    /// Regexes; matching commands are never shown.
    pub exclude_patterns: Vec<String>,
    pub ui: UiConfig,
    pub templates_path: String,
    pub performance: Performance,
    pub timestamps: TimestampConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub max_items: usize,
    pub theme: String,
    pub show_timestamps: bool,
    pub show_frequency: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Performance {
    /// Lines read from the end of each source, `0` for whole files.
    pub max_history_lines: usize,
}

/// Plausibility rules for recorded timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Timestamps outside these calendar years are treated as unparseable.
    pub min_year: i32,
    pub max_year: i32,
    /// Entries older than this are dropped; `0` keeps everything.
    pub max_age_days: u32,
    /// Tolerated clock skew for entries dated in the future.
    pub future_grace_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec!["~/.zsh_history".to_string(), "~/.bash_history".to_string()],
            exclude_patterns: [
                "^sudo su",
                "password",
                "token",
                "secret",
                "key.*=",
                "^history",
                "^exit$",
                "^clear$",
                "^pwd$",
                r"^\.$",
                r"^\.\.*$",
                r"^\d+$",
                "^[[:space:]]*$",
                "^h$",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ui: UiConfig::default(),
            templates_path: format!("~/.config/{}/templates.yaml", APP_DIR),
            performance: Performance::default(),
            timestamps: TimestampConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_items: 1000,
            theme: "dark".to_string(),
            show_timestamps: true,
            show_frequency: true,
        }
    }
}

impl Default for Performance {
    fn default() -> Self {
        Self {
            max_history_lines: 10_000,
        }
    }
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_year: 2100,
            max_age_days: 5 * 365,
            future_grace_secs: 3600,
        }
    }
}

impl TimestampConfig {
    pub fn parse_options(&self) -> Result<ParseOptions, ConfigError> {
        if self.min_year > self.max_year {
            return Err(ConfigError::InvalidYearRange {
                min_year: self.min_year,
                max_year: self.max_year,
            });
        }
        Ok(ParseOptions::from_years(self.min_year, self.max_year))
    }

    pub fn age_window(&self) -> AgeWindow {
        AgeWindow {
            future_grace: Some(Duration::seconds(i64::from(self.future_grace_secs))),
            max_age: (self.max_age_days > 0).then(|| Duration::days(i64::from(self.max_age_days))),
        }
    }
}

/// `~/.config/history-nav/config.yaml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".config").join(APP_DIR).join(CONFIG_FILE))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

impl Config {
    /// Load from the default location, creating it on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path()?)
    }

    /// Load from `path`. A missing file is created with the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, writing defaults", path.display());
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_yaml::to_string(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, data).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|s| expand_tilde(s)).collect()
    }

    pub fn templates_file(&self) -> PathBuf {
        expand_tilde(&self.templates_path)
    }

    /// Build a reader for the configured sources.
    ///
    /// Configuration problems are returned next to the reader rather than
    /// instead of it: a bad exclude pattern or year window must not stop
    /// history from loading.
    pub fn history_reader(&self) -> (HistoryReader, Vec<ConfigError>) {
        let mut problems = Vec::new();
        let mut reader = HistoryReader::new(self.source_paths());
        reader.set_max_lines(self.performance.max_history_lines);
        reader.set_age_window(self.timestamps.age_window());

        match self.timestamps.parse_options() {
            Ok(options) => reader.set_parse_options(options),
            Err(e) => problems.push(e),
        }
        if let Err(e) = reader.set_exclude_patterns(&self.exclude_patterns) {
            problems.push(e);
        }

        (reader, problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        let (_, problems) = Config::default().history_reader();
        assert!(problems.is_empty(), "{:?}", problems);
    }

    #[test]
    fn test_load_creates_default_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // second load reads the file back
        assert_eq!(Config::load_from(&path)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "sources:\n  - /tmp/my_history\nui:\n  max_items: 50\ntimestamps:\n  min_year: 2015\n",
        )?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.sources, vec!["/tmp/my_history"]);
        assert_eq!(config.ui.max_items, 50);
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.timestamps.min_year, 2015);
        assert_eq!(config.timestamps.max_year, 2100);
        assert_eq!(config.performance.max_history_lines, 10_000);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_ignored() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "performance:\n  cache_enabled: true\n  max_history_lines: 7\n")?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.performance.max_history_lines, 7);
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_is_reported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "sources: [unclosed\n")?;

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.zsh_history"), home.join(".zsh_history"));
            assert_eq!(expand_tilde("~"), home);
        }
        assert_eq!(expand_tilde("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_problems_do_not_prevent_reader() {
        let config = Config {
            exclude_patterns: vec!["ok".to_string(), "[".to_string()],
            timestamps: TimestampConfig {
                min_year: 2030,
                max_year: 2020,
                ..TimestampConfig::default()
            },
            ..Config::default()
        };
        let (reader, problems) = config.history_reader();
        assert_eq!(problems.len(), 2);
        assert!(matches!(problems[0], ConfigError::InvalidYearRange { .. }));
        assert_eq!(problems[1].invalid_patterns().len(), 1);
        assert_eq!(reader.sources().len(), 2);
    }

    #[test]
    fn test_age_window_zero_days_disables_horizon() {
        let timestamps = TimestampConfig {
            max_age_days: 0,
            ..TimestampConfig::default()
        };
        assert_eq!(timestamps.age_window().max_age, None);
        assert_eq!(
            TimestampConfig::default().age_window().future_grace,
            Some(Duration::hours(1))
        );
    }
}
