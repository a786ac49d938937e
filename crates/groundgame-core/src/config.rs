// Configuration loading and parsing (client.toml).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::draft::{DraftOrder, ScoringFormat, StartConfig};
use crate::error::ServiceError;

/// The shipped default configuration, also used when no file is found.
pub const DEFAULT_CLIENT_TOML: &str = include_str!("../../../defaults/client.toml");

/// Environment variable overriding `service.base_url`.
pub const BASE_URL_ENV: &str = "GROUNDGAME_BASE_URL";

const CONFIG_FILE: &str = "client.toml";

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
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub simulation: SimulationDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub live_poll_interval_secs: u64,
}

/// Values pre-filled in the simulation start form.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationDefaults {
    pub pick_slot: u32,
    pub teams: u32,
    pub rounds: u32,
    pub format: ScoringFormat,
    pub order: DraftOrder,
}

impl SimulationDefaults {
    pub fn to_start_config(&self) -> StartConfig {
        StartConfig::Simulation {
            pick_slot: self.pick_slot,
            teams: self.teams,
            rounds: self.rounds,
            format: self.format,
            order: self.order,
        }
    }
}

impl Config {
    /// The built-in configuration from `defaults/client.toml`.
    pub fn builtin() -> Result<Self, ConfigError> {
        let config = parse(DEFAULT_CLIENT_TOML, Path::new("<builtin>"))?;
        validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/client.toml` relative to `base_dir`.
///
/// Lower-level primitive: does not copy defaults or apply env overrides.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse(&text, &path)?;
    validate(&config)?;
    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
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
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load the configuration the binary runs with.
///
/// Resolution order: `./config/client.toml` (seeded from `./defaults/`),
/// then the platform config directory, then the built-in defaults.
/// `GROUNDGAME_BASE_URL` overrides the service URL in every case.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;

    let mut config = if cwd.join("defaults").exists() || cwd.join("config").exists() {
        let copied = ensure_config_files(&cwd)?;
        for path in &copied {
            info!("Initialized {} from defaults", path.display());
        }
        load_config_from(&cwd)?
    } else if let Some(path) = platform_config_path().filter(|p| p.exists()) {
        debug!("Loading config from {}", path.display());
        let text = read_file(&path)?;
        let config = parse(&text, &path)?;
        validate(&config)?;
        config
    } else {
        debug!("No config file found, using built-in defaults");
        Config::builtin()?
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// `<platform config dir>/client.toml`, e.g. `~/.config/groundgame/client.toml`.
pub fn platform_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "groundgame").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
        info!("Service URL overridden by {BASE_URL_ENV}");
        config.service.base_url = url.trim().to_string();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    match reqwest::Url::parse(&config.service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(ConfigError::ValidationError {
                field: "service.base_url".into(),
                message: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Err(e) => {
            return Err(ConfigError::ValidationError {
                field: "service.base_url".into(),
                message: e.to_string(),
            });
        }
    }

    if config.service.request_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "service.request_timeout_secs".into(),
            message: "must be > 0 when set".into(),
        });
    }

    if config.session.live_poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "session.live_poll_interval_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if let Err(ServiceError::Validation { field, message }) =
        config.simulation.to_start_config().validate()
    {
        return Err(ConfigError::ValidationError {
            field: format!("simulation.{field}"),
            message,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
