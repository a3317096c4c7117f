//! Negotiator configuration stored as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Negotiator configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to values that
/// work against OpenRouter with the API key taken from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NegotiatorConfig {
    pub model: ModelConfig,
    pub coach: CoachConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Chat-completions base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sent as `HTTP-Referer`.
    pub referer: String,
    /// Sent as `X-Title`.
    pub app_title: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-3-flash-preview".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 120,
            referer: "http://localhost:3001".to_string(),
            app_title: "Salary Negotiation Trainer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoachConfig {
    /// Transcript messages summarised for end-of-session feedback.
    pub recent_messages: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self { recent_messages: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Sessions kept in memory; the least recently used one is evicted
    /// when a new session id arrives at capacity.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3001,
            max_sessions: 1024,
        }
    }
}

impl NegotiatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.base_url.trim().is_empty() {
            return Err(anyhow!("model.base_url must be non-empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must be non-empty"));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(anyhow!("model.api_key_env must be non-empty"));
        }
        if self.model.timeout_secs == 0 {
            return Err(anyhow!("model.timeout_secs must be > 0"));
        }
        if self.coach.recent_messages == 0 {
            return Err(anyhow!("coach.recent_messages must be > 0"));
        }
        if self.server.bind.trim().is_empty() {
            return Err(anyhow!("server.bind must be non-empty"));
        }
        if self.server.max_sessions == 0 {
            return Err(anyhow!("server.max_sessions must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `NegotiatorConfig::default()`.
pub fn load_config(path: &Path) -> Result<NegotiatorConfig> {
    if !path.exists() {
        let cfg = NegotiatorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: NegotiatorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &NegotiatorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, NegotiatorConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("negotiator.toml");
        let mut cfg = NegotiatorConfig::default();
        cfg.model.model = "openai/gpt-4o-mini".to_string();
        cfg.server.port = 8080;
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("negotiator.toml");
        fs::write(&path, "[coach]\nrecent_messages = 4\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.coach.recent_messages, 4);
        assert_eq!(cfg.model, ModelConfig::default());
    }

    #[test]
    fn zero_session_capacity_is_rejected() {
        let mut cfg = NegotiatorConfig::default();
        cfg.server.max_sessions = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_sessions"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("negotiator.toml");
        fs::write(&path, "[model]\ntimeout_secs = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
