//! Runtime configuration from environment variables.
//!
//! The configuration surface matches the container deployment contract:
//! `MCP_TRANSPORT`, `HOST`, `PORT`, `MCP_SSE_PATH` and `MCP_MESSAGE_PATH`.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const TRANSPORT_ENV: &str = "MCP_TRANSPORT";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SSE_PATH_ENV: &str = "MCP_SSE_PATH";
pub const MESSAGE_PATH_ENV: &str = "MCP_MESSAGE_PATH";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SSE_PATH: &str = "/sse";
pub const DEFAULT_MESSAGE_PATH: &str = "/messages";

/// Configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported MCP_TRANSPORT: {0} (expected \"stdio\" or \"sse\")")]
    UnsupportedTransport(String),

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Transport the server speaks on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Line-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// HTTP Server-Sent Events stream plus a POST message endpoint.
    #[default]
    Sse,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("stdio") {
            Ok(TransportKind::Stdio)
        } else if trimmed.eq_ignore_ascii_case("sse") {
            Ok(TransportKind::Sse)
        } else {
            Err(ConfigError::UnsupportedTransport(s.to_string()))
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Stdio => f.write_str("stdio"),
            TransportKind::Sse => f.write_str("sse"),
        }
    }
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
    pub sse_path: String,
    pub message_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sse_path: DEFAULT_SSE_PATH.to_string(),
            message_path: DEFAULT_MESSAGE_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, applying defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let transport = match env::var(TRANSPORT_ENV) {
            Ok(raw) => raw.parse()?,
            Err(_) => TransportKind::default(),
        };

        let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match env::var(PORT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let sse_path =
            normalize_path(&env::var(SSE_PATH_ENV).unwrap_or_else(|_| DEFAULT_SSE_PATH.to_string()));
        let message_path = normalize_path(
            &env::var(MESSAGE_PATH_ENV).unwrap_or_else(|_| DEFAULT_MESSAGE_PATH.to_string()),
        );

        Ok(Self {
            transport,
            host,
            port,
            sse_path,
            message_path,
        })
    }

    /// Socket address string the SSE transport binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The message path with a trailing slash. Both variants are mounted so
    /// clients that append a slash are not redirected.
    pub fn message_path_with_slash(&self) -> String {
        if self.message_path.ends_with('/') {
            self.message_path.clone()
        } else {
            format!("{}/", self.message_path)
        }
    }
}

/// Ensure a configured route path carries a leading slash.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_str_case_insensitive() {
        assert_eq!("stdio".parse::<TransportKind>().unwrap(), TransportKind::Stdio);
        assert_eq!("SSE".parse::<TransportKind>().unwrap(), TransportKind::Sse);
        assert_eq!(" Stdio ".parse::<TransportKind>().unwrap(), TransportKind::Stdio);
    }

    #[test]
    fn test_transport_from_str_rejects_unknown() {
        let err = "tcp".parse::<TransportKind>().unwrap_err();
        assert!(err.to_string().contains("tcp"));
        assert!(err.to_string().contains("MCP_TRANSPORT"));
    }

    #[test]
    fn test_default_config_matches_container_contract() {
        let config = ServerConfig::default();
        assert_eq!(config.transport, TransportKind::Sse);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.sse_path, "/sse");
        assert_eq!(config.message_path, "/messages");
    }

    #[test]
    fn test_normalize_path_adds_leading_slash() {
        assert_eq!(normalize_path("messages"), "/messages");
        assert_eq!(normalize_path("/messages"), "/messages");
        assert_eq!(normalize_path("  /mcp "), "/mcp");
    }

    #[test]
    fn test_message_path_with_slash() {
        let mut config = ServerConfig::default();
        assert_eq!(config.message_path_with_slash(), "/messages/");

        config.message_path = "/messages/".to_string();
        assert_eq!(config.message_path_with_slash(), "/messages/");
    }
}
