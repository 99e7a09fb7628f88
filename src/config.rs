//! Configuration for the debug server.
//!
//! Supports command-line arguments and an optional TOML file.
//! CLI arguments take precedence over config file values.

use crate::smtp::server::{DEFAULT_HOSTNAME, DEFAULT_SERVER_NAME};

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Command-line arguments for the debug server
#[derive(Parser, Debug)]
#[command(name = "rawsmtp")]
#[command(version)]
#[command(about = "Raw SMTP debug server that logs all traffic", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The port to listen on for SMTP connections [default: 25]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to [default: 0.0.0.0]
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Hostname announced in the greeting and HELO/EHLO replies
    #[arg(long)]
    pub hostname: Option<String>,

    /// Server name announced after ESMTP in the greeting
    #[arg(long)]
    pub server_name: Option<String>,

    /// Close sessions idle for this many seconds (0 = never)
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Seconds, 0 disables the timeout
    #[serde(default)]
    pub idle_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            hostname: default_hostname(),
            server_name: default_server_name(),
            idle_timeout: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    25
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub hostname: String,
    pub server_name: String,
    pub idle_timeout: Option<Duration>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process arguments and optional TOML file
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolve parsed arguments, reading the TOML file they point at
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Self::merge(cli, toml_config))
    }

    /// Merge CLI args over TOML values
    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        let server = toml_config.server;
        let idle_secs = cli.idle_timeout.unwrap_or(server.idle_timeout);

        Config {
            port: cli.port.unwrap_or(server.port),
            bind: cli.bind.unwrap_or(server.bind),
            hostname: cli.hostname.unwrap_or(server.hostname),
            server_name: cli.server_name.unwrap_or(server.server_name),
            idle_timeout: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        }
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        if self.bind.contains(':') {
            // IPv6 literal
            format!("[{}]:{}", self.bind, self.port)
        } else {
            format!("{}:{}", self.bind, self.port)
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {1}", path = .0.display())]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{path}': {1}", path = .0.display())]
    TomlParse(PathBuf, #[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let cli = CliArgs::try_parse_from(std::iter::once("rawsmtp").chain(args.iter().copied()))
            .unwrap();
        Config::from_args(cli).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.port, 25);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.hostname, "raw-debug.local");
        assert_eq!(config.server_name, "Raw Debug Server");
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.listen_addr(), "0.0.0.0:25");
    }

    #[test]
    fn test_cli_overrides() {
        let config = parse(&[
            "--port",
            "2525",
            "--bind",
            "127.0.0.1",
            "--hostname",
            "sink.test",
            "--idle-timeout",
            "30",
            "--log-level",
            "debug",
        ]);
        assert_eq!(config.port, 2525);
        assert_eq!(config.listen_addr(), "127.0.0.1:2525");
        assert_eq!(config.hostname, "sink.test");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(CliArgs::try_parse_from(["rawsmtp", "--port", "70000"]).is_err());
        assert!(CliArgs::try_parse_from(["rawsmtp", "--port", "smtp"]).is_err());
    }

    #[test]
    fn test_ipv6_listen_addr() {
        let config = parse(&["--bind", "::1", "-p", "2525"]);
        assert_eq!(config.listen_addr(), "[::1]:2525");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            port = 2526
            hostname = "toml.test"
            idle_timeout = 5

            [logging]
            level = "warn"
        "#;

        let toml_config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(toml_config.server.port, 2526);
        assert_eq!(toml_config.server.bind, "0.0.0.0");
        assert_eq!(toml_config.server.server_name, "Raw Debug Server");

        let cli = CliArgs::try_parse_from(["rawsmtp", "--hostname", "cli.test"]).unwrap();
        let config = Config::merge(cli, toml_config);
        assert_eq!(config.port, 2526);
        assert_eq!(config.hostname, "cli.test");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_missing_config_file() {
        let cli =
            CliArgs::try_parse_from(["rawsmtp", "--config", "/nonexistent/rawsmtp.toml"]).unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::FileRead(..))
        ));
    }
}
