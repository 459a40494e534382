//! Configuration management with XDG paths
//!
//! ~/.config/termfolio/config.json   - API key, preferences (0600)
//! ~/.config/termfolio/profile.json  - Optional profile override
//! ~/.local/state/termfolio/         - Command history, log file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "termfolio";

/// Environment variable that overrides the configured key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Get config directory (~/.config/termfolio/)
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get state directory (~/.local/state/termfolio/)
pub fn state_dir() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .context("Could not determine state directory")?;
    Ok(base.join(APP_NAME))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("profile.json"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("termfolio.log"))
}

/// Ensure all directories exist
pub fn ensure_dirs() -> Result<()> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(state_dir()?)?;
    Ok(())
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenRouter API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for `ask`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Per-character delay of the typing effect (ms)
    #[serde(default = "default_typing_delay")]
    pub typing_delay_ms: u64,

    /// Upper bound on one assistant call (s)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Show the boot splash before the interactive session
    #[serde(default = "default_true")]
    pub boot_splash: bool,

    /// Port for `termfolio serve`
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_typing_delay() -> u64 { 20 }
fn default_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_port() -> u16 { 3000 }

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            typing_delay_ms: default_typing_delay(),
            request_timeout_secs: default_timeout(),
            boot_splash: default_true(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults
    pub fn load() -> Result<Self> {
        ensure_dirs()?;
        let path = config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save config to disk with secure permissions
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        let path = config_path()?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, &content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        // Owner read/write only, the file may hold an API key
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;

        Ok(())
    }

    /// Key from environment (non-empty) or config file. `None` means the
    /// assistant runs in demo mode.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(std::env::var(API_KEY_ENV).ok(), self.api_key.clone())
    }

    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply `config set <key> <value>`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "key" | "api_key" | "openrouter.key" => {
                self.api_key = Some(value.to_string());
            }
            "model" => {
                self.model = Some(value.to_string());
            }
            "typing" | "typing_delay_ms" => {
                self.typing_delay_ms = value
                    .parse()
                    .with_context(|| format!("Invalid typing delay: {}", value))?;
            }
            "timeout" | "request_timeout_secs" => {
                self.request_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
            }
            _ => {
                anyhow::bail!("Unknown config key: {}. Valid keys: key, model, typing, timeout", key);
            }
        }
        Ok(())
    }
}

fn resolve_key(env: Option<String>, configured: Option<String>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| configured.filter(|k| !k.trim().is_empty()))
}
