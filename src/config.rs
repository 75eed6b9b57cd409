use anyhow::Error;
use clap::Parser;
use serde::Deserialize;

use crate::storage::StorageConfig;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file; falls back to environment variables when omitted
    #[clap(long)]
    pub conf: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listen address, `0.0.0.0:3000` by default.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Externally visible base URL, used to build the recording callback.
    #[serde(default)]
    pub host: String,
    /// Audio reference the provider plays before recording.
    #[serde(default)]
    pub greeting_audio: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upper bound for each outbound call (download, store, notify).
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_secs: u64,
    /// Append a random suffix to object keys so voicemails landing in the
    /// same second cannot overwrite each other. Off by default to keep the
    /// bucket layout of existing deployments.
    #[serde(default)]
    pub unique_keys: bool,
}

/// Basic-auth credentials for fetching recordings from the telephony provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Chat webhook destination and the identity shown on posted messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub channel: String,
}

fn default_http_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_outbound_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            log_level: None,
            log_file: None,
            host: String::new(),
            greeting_audio: String::new(),
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
            outbound_timeout_secs: default_outbound_timeout(),
            unique_keys: false,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }

    /// Build a configuration from the process environment, keeping the
    /// variable names existing deployments already use. Unset variables
    /// become empty strings, matching the original deployment contract.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Self {
            http_addr: format!("0.0.0.0:{}", port),
            log_level: std::env::var("LOG_LEVEL").ok(),
            log_file: std::env::var("LOG_FILE").ok(),
            host: env_str("HOST"),
            greeting_audio: env_str("VOICEMAIL_AUDIO"),
            provider: ProviderConfig {
                username: env_str("ELKS_USERNAME"),
                password: env_str("ELKS_PASSWORD"),
            },
            chat: ChatConfig {
                webhook_url: env_str("SLACK_WEBHOOK_URL"),
                username: env_str("SLACK_NAME"),
                icon_url: env_str("SLACK_ICON_URL"),
                channel: env_str("SLACK_CHANNEL"),
            },
            storage: StorageConfig::S3 {
                bucket: env_str("S3_BUCKET_NAME"),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
                access_key: env_str("AWS_ACCESS_KEY"),
                secret_key: env_str("AWS_SECRET_KEY"),
                endpoint: None,
                public_base_url: None,
            },
            outbound_timeout_secs: default_outbound_timeout(),
            unique_keys: false,
        }
    }
}

fn env_str(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}
