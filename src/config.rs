//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `autoinvest.toml` and deserializes into strongly-typed structs.
//! The API token is referenced by env-var name in the config and resolved
//! at startup via `std::env::var`. Nothing is re-read during a run.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::strategy::conservative::PolicyConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub investor: InvestorConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Present only when the agent should run on a recurring interval.
    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InvestorConfig {
    pub account_id: String,
    /// Name of the env var holding the API authorization token.
    #[serde(default = "default_token_env")]
    pub auth_token_env: String,
}

fn default_token_env() -> String {
    "LENDING_CLUB_TOKEN".to_string()
}

/// Remote API settings. Requests are never retried; the timeouts are the
/// only bound on a stuck call.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lendingclub.com/api/investor".to_string(),
            version: "v1".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Cash committed per note.
    pub unit_size: Decimal,
    /// Append-only audit log location.
    pub audit_log: PathBuf,
    /// Log orders instead of submitting them.
    pub dry_run: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            unit_size: dec!(25),
            audit_log: PathBuf::from("autoinvest.log"),
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every session meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.investor.account_id.trim().is_empty() {
            anyhow::bail!("investor.account_id must not be empty");
        }
        if self.session.unit_size <= Decimal::ZERO {
            anyhow::bail!("session.unit_size must be positive, got {}", self.session.unit_size);
        }
        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            anyhow::bail!("api timeouts must be at least one second");
        }
        if let Some(schedule) = &self.schedule {
            if schedule.interval_secs == 0 {
                anyhow::bail!("schedule.interval_secs must be positive");
            }
        }
        Ok(())
    }

    /// Resolve the API token from the environment.
    pub fn auth_token(&self) -> Result<SecretString> {
        Self::resolve_env(&self.investor.auth_token_env).map(SecretString::new)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
