//! Configuration system for the `Taskdeck` command-line front end.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskdeck/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use url::Url;

use crate::cli::Command;

/// Default avatar service; the seed is appended as the `u` query parameter.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://i.pravatar.cc/100";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The avatar base URL is not a valid absolute URL.
    #[error("invalid avatar_base_url {url:?}: {source}")]
    AvatarUrl {
        /// The configured value.
        url: String,
        /// Parse failure.
        source: url::ParseError,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    profile: ProfileFileConfig,
    dashboard: DashboardFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
}

/// `[profile]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ProfileFileConfig {
    email_domain: Option<String>,
    avatar_base_url: Option<String>,
}

/// `[dashboard]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DashboardFileConfig {
    latest_count: Option<usize>,
    name_preview_len: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Storage --
    /// Directory holding one JSON document per storage key.
    pub data_dir: PathBuf,

    // -- Profile --
    /// Domain appended to the login id to form the email address.
    pub email_domain: String,
    /// Avatar service base URL. `None` disables avatar URLs.
    pub avatar_base_url: Option<Url>,

    // -- Dashboard --
    /// How many tasks the "latest created" summary shows.
    pub latest_count: usize,
    /// Maximum characters of a task name in summaries.
    pub name_preview_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            email_domain: "tdcx.local".to_string(),
            avatar_base_url: Url::parse(DEFAULT_AVATAR_BASE_URL).ok(),
            latest_count: 3,
            name_preview_len: 25,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/taskdeck/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if the configured avatar URL is invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let avatar_base_url = match file.profile.avatar_base_url.as_deref() {
            None => defaults.avatar_base_url,
            Some("") => None,
            Some(raw) => Some(Url::parse(raw).map_err(|source| ConfigError::AvatarUrl {
                url: raw.to_string(),
                source,
            })?),
        };

        Ok(Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            email_domain: file
                .profile
                .email_domain
                .clone()
                .unwrap_or(defaults.email_domain),
            avatar_base_url,
            latest_count: file
                .dashboard
                .latest_count
                .unwrap_or(defaults.latest_count),
            name_preview_len: file
                .dashboard
                .name_preview_len
                .unwrap_or(defaults.name_preview_len),
        })
    }

    /// Email address for a login id, e.g. `TD1008@tdcx.local`.
    #[must_use]
    pub fn email_for(&self, login_id: &str) -> String {
        format!("{}@{}", login_id.trim(), self.email_domain)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Personal task list")]
pub struct CliArgs {
    /// Directory where sessions and tasks are stored.
    #[arg(long, env = "TASKDECK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskdeck/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKDECK_LOG", global = true)]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskdeck.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// What to do. Without a command, shows the session status.
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `<data dir>/taskdeck`, falling back to the temp dir when the platform
/// has no data directory.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("taskdeck")
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available, use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskdeck").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
