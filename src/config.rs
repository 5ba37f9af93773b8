use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::window::PAGE_SIZE;

static PERF_LOG_ENABLED: OnceLock<bool> = OnceLock::new();

pub const PAGE_SIZE_ENV: &str = "SHOTLIST_PAGE_SIZE";
pub const PERF_LOG_ENV: &str = "SHOTLIST_PERF_LOG";

/// On-disk TOML configuration. Every field is optional so partial files
/// merge over the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub list: Option<ListSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSection {
    pub page_size: Option<usize>,
    pub parent_page_factor: Option<usize>,
    pub pending_status: Option<String>,
}

/// Resolved list settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub page_size: usize,
    /// Episode and sequence lists page `page_size * parent_page_factor`.
    pub parent_page_factor: usize,
    /// Status short name that marks a task as waiting for approval.
    pub pending_status: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            parent_page_factor: 2,
            pending_status: "wfa".to_string(),
        }
    }
}

impl ListConfig {
    pub fn from_file(file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let section = file.list.clone().unwrap_or_default();
        Self {
            page_size: section
                .page_size
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
            parent_page_factor: section
                .parent_page_factor
                .filter(|n| *n > 0)
                .unwrap_or(defaults.parent_page_factor),
            pending_status: section
                .pending_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.pending_status),
        }
    }

    /// Apply `SHOTLIST_PAGE_SIZE` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(page_size) = std::env::var(PAGE_SIZE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            self.page_size = page_size;
        }
        self
    }

    pub fn parent_page_size(&self) -> usize {
        self.page_size.saturating_mul(self.parent_page_factor)
    }
}

/// `<config_dir>/shotlist/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shotlist").join("config.toml"))
}

/// Cascade `./.shotlist.toml` over the platform config, then apply the
/// environment.
pub fn load_config() -> ListConfig {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".shotlist.toml"));

    let file = match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    };
    ListConfig::from_file(&file).with_env_overrides()
}

/// `None` when the file is missing or unparseable.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match read_config(path) {
        Ok(file) => Some(file),
        Err(ConfigError::Io(_)) => None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring config file");
            None
        }
    }
}

pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base = base.list.unwrap_or_default();
    let overlay = overlay.list.unwrap_or_default();
    ConfigFile {
        list: Some(ListSection {
            page_size: overlay.page_size.or(base.page_size),
            parent_page_factor: overlay.parent_page_factor.or(base.parent_page_factor),
            pending_status: overlay.pending_status.or(base.pending_status),
        }),
    }
}

fn env_truthy(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

pub fn perf_log_enabled() -> bool {
    *PERF_LOG_ENABLED.get_or_init(|| env_truthy(PERF_LOG_ENV))
}
