use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::issues::DEFAULT_ISSUE_LIMIT;
use crate::types::{Settings, SortOrder, Timeouts};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/repodash/config.toml";

/// On-disk configuration. Every key is optional; CLI flags win over it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub sort: Option<SortOrder>,
    pub hosts: Option<Vec<String>>,
    #[serde(rename = "log-level", alias = "log_level")]
    pub log_level: Option<String>,
    pub timeouts: TimeoutConfig,
    pub issues: IssuesConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    pub read_secs: Option<u64>,
    pub issues_secs: Option<u64>,
    pub fetch_secs: Option<u64>,
    pub pull_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssuesConfig {
    pub enabled: bool,
    pub binary: PathBuf,
    pub limit: u32,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: PathBuf::from("gh"),
            limit: DEFAULT_ISSUE_LIMIT,
        }
    }
}

/// Read and parse the config file at `path`.
///
/// # Errors
/// Returns an error when the file cannot be read or is not valid config TOML.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_config`], but a missing file yields the defaults.
///
/// # Errors
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_optional(path: &Path) -> Result<FileConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        log::debug!("no config at {}, using defaults", path.display());
        Ok(FileConfig::default())
    }
}

impl FileConfig {
    /// Validated runtime settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero concurrency, a zero timeout
    /// or an empty host list.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let defaults = Settings::default();
        let concurrency = self.concurrency.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        let hosts = self.hosts.clone().unwrap_or(defaults.hosts);
        if hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(invalid("hosts must name at least one host"));
        }
        Ok(Settings {
            root: self.root.clone().unwrap_or(defaults.root),
            concurrency,
            sort: self.sort.unwrap_or(defaults.sort),
            timeouts: self.timeouts.resolve(defaults.timeouts)?,
            hosts,
            show_progress: defaults.show_progress,
        })
    }
}

impl TimeoutConfig {
    fn resolve(&self, defaults: Timeouts) -> Result<Timeouts, ConfigError> {
        Ok(Timeouts {
            read: secs("read_secs", self.read_secs, defaults.read)?,
            issues: secs("issues_secs", self.issues_secs, defaults.issues)?,
            fetch: secs("fetch_secs", self.fetch_secs, defaults.fetch)?,
            pull: secs("pull_secs", self.pull_secs, defaults.pull)?,
        })
    }
}

fn secs(key: &str, value: Option<u64>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(invalid(&format!("timeouts.{key} must be greater than 0"))),
        Some(v) => Ok(Duration::from_secs(v)),
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid {
        message: message.to_string(),
    }
}
