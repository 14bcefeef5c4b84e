//! Configuration for iptv-sync.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags and environment variables (IPTV_SYNC_PLAYLIST,
//!    IPTV_SYNC_UPSTREAM, IPTV_SYNC_VALIDATE), handled by the CLI
//! 2. Config file (--config, else .iptv-sync/config.yaml in the current
//!    directory or a parent, else <user config dir>/iptv-sync/config.yaml)
//! 3. Defaults
//!
//! A relative `playlist` path in a config file is resolved against the
//! project root (the directory holding `.iptv-sync/`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::HttpSettings;

/// Name of the per-project config directory
pub const CONFIG_DIR: &str = ".iptv-sync";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

/// Playlist path used when nothing else is configured
pub const DEFAULT_PLAYLIST: &str = "my";

/// Built-in upstream sources
pub const DEFAULT_UPSTREAM: [&str; 2] = [
    "https://raw.githubusercontent.com/sydul104/main04/refs/heads/main/my",
    "https://raw.githubusercontent.com/musfiqeee/iptv-m3u-bot/main/output/all.m3u",
];

/// Environment variable with a comma-separated list of upstream URLs
pub const ENV_UPSTREAM: &str = "IPTV_SYNC_UPSTREAM";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    /// Curated playlist path
    pub playlist: Option<String>,
    /// Upstream sources; empty means the built-in defaults
    #[serde(default)]
    pub upstream: Vec<String>,
    pub validate: Option<bool>,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub playlist: PathBuf,
    pub upstream: Vec<String>,
    pub validate: bool,
    pub http: HttpSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            playlist: PathBuf::from(DEFAULT_PLAYLIST),
            upstream: default_upstream(),
            validate: false,
            http: HttpSettings::default(),
            config_file: None,
        }
    }
}

pub fn default_upstream() -> Vec<String> {
    DEFAULT_UPSTREAM.iter().map(|s| s.to_string()).collect()
}

/// Find config file by searching `start` and its parents, then the user
/// config directory
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("iptv-sync").join(CONFIG_FILE);
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Directory that relative paths in `config_path` are resolved against
fn base_dir(config_path: &Path) -> &Path {
    let parent = config_path.parent().unwrap_or(Path::new("."));
    if parent.file_name().map_or(false, |name| name == CONFIG_DIR) {
        parent.parent().unwrap_or(Path::new("."))
    } else {
        parent
    }
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn resolve(config: ConfigFile, config_path: &Path) -> ResolvedConfig {
    let playlist = config
        .playlist
        .as_deref()
        .map(|p| resolve_path(base_dir(config_path), p))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYLIST));

    let upstream = if config.upstream.is_empty() {
        default_upstream()
    } else {
        config.upstream
    };

    ResolvedConfig {
        playlist,
        upstream,
        validate: config.validate.unwrap_or(false),
        http: config.http,
        config_file: Some(config_path.to_path_buf()),
    }
}

/// Split a comma-separated upstream list, dropping empty items
pub fn split_upstream_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

/// Replace the upstream list with the one from `env_value`, if it names any
fn apply_upstream_env(config: &mut ResolvedConfig, env_value: Option<&str>) {
    if let Some(value) = env_value {
        let upstream = split_upstream_list(value);
        if !upstream.is_empty() {
            config.upstream = upstream;
        }
    }
}

/// Load configuration from an explicit file, or discover one from the
/// current directory. Without a file the defaults apply.
/// `IPTV_SYNC_UPSTREAM` overrides the file's upstream list.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let mut config = load_config_sources(explicit)?;
    let env_upstream = std::env::var(ENV_UPSTREAM).ok();
    apply_upstream_env(&mut config, env_upstream.as_deref());
    Ok(config)
}

fn load_config_sources(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to determine current directory")?;
            find_config_file(&cwd)
        }
    };

    match config_path {
        Some(path) => {
            let config = load_config_file(&path)?;
            Ok(resolve(config, &path))
        }
        None => Ok(ResolvedConfig::default()),
    }
}
