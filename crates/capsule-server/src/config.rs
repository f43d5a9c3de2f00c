use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Capsule server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind address
    pub bind: SocketAddr,

    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,

    /// Externally reachable base URL; archive download links start with it
    pub public_base_url: String,

    /// JSON file of `{ "<project id>": <project> }` loaded at startup
    pub projects_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            public_base_url: "http://localhost:8080".to_string(),
            projects_file: None,
        }
    }
}

/// CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "capsule-server")]
#[command(about = "Capsule export service: native project generation and packaging")]
pub struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, env = "CAPSULE_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long, env = "CAPSULE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Log level
    #[arg(long, env = "CAPSULE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, env = "CAPSULE_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Public base URL for download links
    #[arg(long, env = "CAPSULE_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Projects file loaded into the in-memory store
    #[arg(long, env = "CAPSULE_PROJECTS_FILE")]
    pub projects_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from CLI args, environment and an optional config file
    pub fn from_env() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Defaults, then the config file, then explicit flags.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&raw).context("Failed to parse config file")?
            }
            None => Self::default(),
        };

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(log_level) = cli.log_level {
            config.log_level = log_level;
        }
        if let Some(log_format) = cli.log_format {
            config.log_format = log_format;
        }
        if let Some(url) = cli.public_base_url {
            config.public_base_url = url;
        }
        if let Some(path) = cli.projects_file {
            config.projects_file = Some(path);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.public_base_url.starts_with("http://") || self.public_base_url.starts_with("https://")) {
            anyhow::bail!(
                "public_base_url must be an http(s) URL, got '{}'",
                self.public_base_url
            );
        }
        Ok(())
    }

    /// Base URL of the blob download route.
    pub fn blob_base_url(&self) -> String {
        format!("{}/v1/blobs", self.public_base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_cli(Cli::default()).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.blob_base_url(), "http://localhost:8080/v1/blobs");
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "capsule-server",
            "--bind",
            "127.0.0.1:9000",
            "--log-format",
            "pretty",
            "--public-base-url",
            "https://export.example.com/",
        ]);
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.blob_base_url(), "https://export.example.com/v1/blobs");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let cli = Cli {
            public_base_url: Some("ftp://files".to_string()),
            ..Cli::default()
        };
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "log_level": "debug" }"#).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.bind.port(), 8080);
    }
}
