// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "POWERPREDICT";
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:5000/api/chat";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub chat: ChatConfig,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data dir database.
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    crate::db::project_dirs()
        .ok()
        .map(|p| p.config_dir().join("powerpredict.toml"))
}

/// Layers, lowest first: built-in defaults, the TOML file (optional),
/// `POWERPREDICT__SECTION__KEY` variables. `GEMINI_API_KEY` fills the Gemini
/// key when nothing else set it.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();
    let file = path.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(file) = file {
        builder = builder.add_source(config::File::from(file).required(path.is_some()));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context("Failed to read configuration")?;
    let mut cfg: Config = settings
        .try_deserialize()
        .context("Invalid configuration")?;

    if !cfg.gemini.is_configured() {
        cfg.gemini.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.chat.timeout_seconds == 0 {
        anyhow::bail!("chat.timeout_seconds must be greater than zero");
    }
    if cfg.gemini.timeout_seconds == 0 {
        anyhow::bail!("gemini.timeout_seconds must be greater than zero");
    }
    if cfg.chat.endpoint.trim().is_empty() {
        anyhow::bail!("chat.endpoint cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\n\n[chat]\nendpoint = \"http://example.test/api/chat\"\n\n[storage]\ndatabase = \"/tmp/pp.sqlite\""
        )
        .unwrap();
        file.flush().unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.chat.endpoint, "http://example.test/api/chat");
        assert_eq!(cfg.chat.timeout_seconds, 10);
        assert_eq!(cfg.storage.database, Some(PathBuf::from("/tmp/pp.sqlite")));
        assert_eq!(cfg.gemini.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/powerpredict.toml"))).is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut cfg = Config::default();
        cfg.chat.timeout_seconds = 0;
        assert!(validate_config(&cfg).is_err());
        assert!(validate_config(&Config::default()).is_ok());
    }
}
