//! Exit checker configuration

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(eyre!("Invalid LOG_FORMAT: {other}")),
        }
    }
}

/// Exit checker configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// JSON file of checkpoint headers, used when `--checkpoints` is absent
    pub checkpoints_file: Option<PathBuf>,
    pub log_format: LogFormat,
    /// `.env` file the variables were read from; logged by the caller once
    /// the subscriber is installed
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let env_file = dotenvy::dotenv().ok();
        Self::from_env(env_file)
    }

    /// Load configuration after reading an explicit `.env` file
    pub fn load_from(path: &Path) -> Result<Self> {
        dotenvy::from_path(path)
            .wrap_err_with(|| format!("Failed to read env file {}", path.display()))?;
        Self::from_env(Some(path.to_path_buf()))
    }

    fn from_env(env_file: Option<PathBuf>) -> Result<Self> {
        let config = Self::from_vars(
            env::var("CHECKPOINTS_FILE").ok(),
            env::var("LOG_FORMAT").ok(),
        )?;
        Ok(Self { env_file, ..config })
    }

    fn from_vars(checkpoints_file: Option<String>, log_format: Option<String>) -> Result<Self> {
        Ok(Self {
            checkpoints_file: checkpoints_file
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_format: log_format
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
            env_file: None,
        })
    }
}
