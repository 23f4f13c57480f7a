// Configuration loading and parsing (config/pronostici.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "pronostici.toml";
pub const DEFAULT_BASE_URL: &str = "https://pronostici-backend.onrender.com";
pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";
pub const DEFAULT_COMPETITION: &str = "Campionato";
const DB_FILE_NAME: &str = "pronostici.db";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` means requests may wait indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub timezone: Tz,
    pub default_competition: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: None,
            },
            display: DisplayConfig {
                timezone: chrono_tz::Europe::Rome,
                default_competition: DEFAULT_COMPETITION.to_string(),
            },
            db_path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// pronostici.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    display: DisplaySection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiSection {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DisplaySection {
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default = "default_competition")]
    default_competition: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        DisplaySection {
            timezone: default_timezone(),
            default_competition: default_competition(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorageSection {
    #[serde(default)]
    db_path: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_competition() -> String {
    DEFAULT_COMPETITION.to_string()
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pronostici.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    assemble(file)
}

fn assemble(file: ConfigFile) -> Result<Config, ConfigError> {
    let base_url = file.api.base_url.trim().trim_end_matches('/').to_string();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: "must not be empty".into(),
        });
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("must start with http:// or https://, got {base_url}"),
        });
    }

    let timeout = match file.api.timeout_secs {
        Some(0) => {
            return Err(ConfigError::ValidationError {
                field: "api.timeout_secs".into(),
                message: "must be > 0 (omit it to disable the timeout)".into(),
            });
        }
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    let timezone: Tz =
        file.display
            .timezone
            .parse()
            .map_err(|_| ConfigError::ValidationError {
                field: "display.timezone".into(),
                message: format!("unknown IANA timezone `{}`", file.display.timezone),
            })?;

    let default_competition = file.display.default_competition.trim().to_string();
    if default_competition.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "display.default_competition".into(),
            message: "must not be empty".into(),
        });
    }

    let db_path = match file.storage.db_path {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => default_db_path(),
    };

    Ok(Config {
        api: ApiConfig { base_url, timeout },
        display: DisplayConfig {
            timezone,
            default_competition,
        },
        db_path,
    })
}

/// Ensure every file in `defaults/` exists in `config/`, copying missing
/// ones. Returns the copied paths. `.example` files are skipped.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if install_default(&path, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. Creation is
/// exclusive, so a file written concurrently is never clobbered. Returns
/// whether a copy was made.
fn install_default(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let copy_error = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(e)),
    };
    let mut src = std::fs::File::open(source).map_err(copy_error)?;
    std::io::copy(&mut src, &mut dest).map_err(copy_error)?;
    Ok(true)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Platform data directory (e.g. `~/.local/share/pronostici/pronostici.db`),
/// falling back to the working directory.
pub fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "pronostici")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
