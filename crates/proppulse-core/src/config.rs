// Configuration loading and parsing (proppulse.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `balldontlie_api_key` from credentials.toml.
pub const API_KEY_ENV: &str = "BALLDONTLIE_API_KEY";

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
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub batch: BatchConfig,
    pub ranking: RankingConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    /// The API key to send upstream, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.credentials
            .balldontlie_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// proppulse.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire proppulse.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    api: ApiConfig,
    batch: BatchConfig,
    ranking: RankingConfig,
}

/// Upstream stats API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Minimum spacing between any two upstream requests.
    pub call_delay_ms: u64,
    /// Retries applied to HTTP 429 responses only.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub search_page_size: u32,
    pub stats_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.balldontlie.io/v1".into(),
            timeout_secs: 10,
            call_delay_ms: 30,
            max_retries: 3,
            retry_backoff_ms: 500,
            search_page_size: 25,
            stats_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub lookback_days: u32,
    pub max_concurrency: usize,
    /// Pause a worker takes after finishing a row.
    pub row_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            max_concurrency: 4,
            row_delay_ms: 100,
        }
    }
}

/// How the `confidence` sort key orders props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceSort {
    /// Descending string order of the bucket label ("VERY LOW" > "MEDIUM" > "LOW" > "HIGH").
    Label,
    /// Descending integer confidence score.
    Score,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub confidence_sort: ConfidenceSort,
    pub page_size: usize,
    pub markdown_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            confidence_sort: ConfidenceSort::Score,
            page_size: 25,
            markdown_top_n: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub balldontlie_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/proppulse.toml` and
/// (optionally) `config/credentials.toml`, both relative to `base_dir`.
///
/// Does not consult the environment and does not copy defaults; see
/// `load_config()` for the full startup path.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- proppulse.toml (required) ---
    let settings_path = config_dir.join("proppulse.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        api: settings.api,
        batch: settings.batch,
        ranking: settings.ranking,
        credentials,
    };

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

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first and applying the `BALLDONTLIE_API_KEY` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_env_api_key(&mut config, std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

/// Replace the configured API key with `env_value` when it is set and non-empty.
pub fn apply_env_api_key(config: &mut Config, env_value: Option<String>) {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        config.credentials.balldontlie_api_key = Some(key.trim().to_string());
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

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let api = &config.api;
    if api.base_url.trim().is_empty() {
        return Err(invalid("api.base_url", "must not be empty"));
    }
    if api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0"));
    }

    let page_fields: &[(&str, u32)] = &[
        ("api.search_page_size", api.search_page_size),
        ("api.stats_page_size", api.stats_page_size),
    ];
    for (name, val) in page_fields {
        if !(1..=100).contains(val) {
            return Err(invalid(name, format!("must be between 1 and 100, got {val}")));
        }
    }

    if config.batch.lookback_days == 0 {
        return Err(invalid("batch.lookback_days", "must be at least 1"));
    }

    let size_fields: &[(&str, usize)] = &[
        ("batch.max_concurrency", config.batch.max_concurrency),
        ("ranking.page_size", config.ranking.page_size),
        ("ranking.markdown_top_n", config.ranking.markdown_top_n),
    ];
    for (name, val) in size_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
