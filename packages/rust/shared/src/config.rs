//! Application configuration for tenderlens.
//!
//! User config lives at `~/.tenderlens/tenderlens.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TenderLensError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tenderlens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tenderlens";

/// System instruction sent with every question.
const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert tender document analyzer. \
Your role is to carefully analyze tender documents and provide accurate, detailed \
answers to questions about them.\n\nRemember: Accuracy is crucial and answers should \
be short and summarised as these documents contain important business information.";

// ---------------------------------------------------------------------------
// Config structs (matching tenderlens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document selection limits.
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// LLM generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Local database settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[processing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// File-count threshold above which only the largest files are kept.
    #[serde(default = "default_max_files")]
    pub max_files_to_process: usize,

    /// Number of largest files (and the relevant-chunk sufficiency bar).
    #[serde(default = "default_top_files")]
    pub top_files_to_use: usize,

    /// Characters of context kept on each side of a matched keyword.
    #[serde(default = "default_context_size")]
    pub context_size: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_files_to_process: default_max_files(),
            top_files_to_use: default_top_files(),
            context_size: default_context_size(),
        }
    }
}

fn default_max_files() -> usize {
    5
}
fn default_top_files() -> usize {
    5
}
fn default_context_size() -> usize {
    500
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model to answer questions with.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (override for proxies or mock servers in tests).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature in `[0, 1]`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated tokens. There is no input-side cap; the model's
    /// own context ceiling is the only guard against oversized prompts.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// System instruction prepended to every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    50_000
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the local database file. A leading `~/` expands to $HOME.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.tenderlens/tenderlens.db".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tenderlens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TenderLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tenderlens/tenderlens.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TenderLensError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        TenderLensError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TenderLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TenderLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TenderLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the Gemini API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(TenderLensError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Expand a leading `~/` in a configured path against the user's home.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| TenderLensError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}
