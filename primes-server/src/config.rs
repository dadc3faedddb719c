//! Server configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults ([`ServerConfig::default`])
//! 2. An optional TOML file passed with `--config`
//! 3. Command-line flags ([`ConfigOverrides`])
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 50051
//! workers = 8
//! backend = "incremental"
//! max_bound = 10000000
//! prefill = 100000
//! ```

use crate::error::{ServerError, ServerResult};
use prime_cache::config::DEFAULT_MAX_BOUND;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default TCP port
pub const DEFAULT_PORT: u16 = 50051;

/// Default number of request workers
pub const DEFAULT_WORKERS: usize = 4;

/// How `Sieve` requests are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Route through the shared incremental cache
    #[default]
    Incremental,
    /// Run a fresh full sieve for every request
    OneShot,
}

impl Backend {
    /// Name used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Incremental => "incremental",
            Backend::OneShot => "one-shot",
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind; 0 asks the OS for a free one
    pub port: u16,

    /// Requests computed concurrently
    pub workers: usize,

    /// Computation backend
    pub backend: Backend,

    /// Largest bound a client may request
    pub max_bound: u64,

    /// Warm the cache up to this bound before accepting connections
    pub prefill: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            backend: Backend::default(),
            max_bound: DEFAULT_MAX_BOUND,
            prefill: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ServerError::ConfigNotFound(path.to_path_buf()),
            _ => ServerError::io("reading config file", e),
        })?;

        let config = Self::from_toml_str(&content).map_err(|reason| ServerError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text; unspecified keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Apply command-line overrides on top of this configuration
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(max_bound) = overrides.max_bound {
            self.max_bound = max_bound;
        }
        if overrides.prefill.is_some() {
            self.prefill = overrides.prefill;
        }
        self
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> ServerResult<()> {
        if self.workers == 0 {
            return Err(ServerError::InvalidSetting(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.workers > u32::MAX as usize {
            return Err(ServerError::InvalidSetting(format!(
                "workers must be at most {}",
                u32::MAX
            )));
        }
        if let Some(prefill) = self.prefill {
            if prefill > self.max_bound {
                return Err(ServerError::InvalidSetting(format!(
                    "prefill {prefill} exceeds max_bound {}",
                    self.max_bound
                )));
            }
        }
        Ok(())
    }

    /// Address string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values given on the command line; `None` leaves the underlying setting alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--host`
    pub host: Option<String>,
    /// `--port`
    pub port: Option<u16>,
    /// `--workers`
    pub workers: Option<usize>,
    /// `--backend`
    pub backend: Option<Backend>,
    /// `--max-bound`
    pub max_bound: Option<u64>,
    /// `--prefill`
    pub prefill: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 50051);
        assert_eq!(config.workers, 4);
        assert_eq!(config.backend, Backend::Incremental);
        assert_eq!(config.max_bound, DEFAULT_MAX_BOUND);
        assert_eq!(config.prefill, None);
        assert_eq!(config.bind_addr(), "localhost:50051");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            port = 6000
            backend = "one-shot"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.backend, Backend::OneShot);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(ServerConfig::from_toml_str("port = \"not a number\"").is_err());
        assert!(ServerConfig::from_toml_str("backend = \"quantum\"").is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = ServerConfig::from_toml_str("port = 6000\nworkers = 2\nprefill = 50").unwrap();
        let config = file.apply(ConfigOverrides {
            port: Some(7000),
            backend: Some(Backend::OneShot),
            ..Default::default()
        });
        assert_eq!(config.port, 7000);
        assert_eq!(config.workers, 2);
        assert_eq!(config.backend, Backend::OneShot);
        assert_eq!(config.prefill, Some(50));
    }

    #[test]
    fn test_validate() {
        assert!(ServerConfig::default().validate().is_ok());

        let no_workers = ServerConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            no_workers.validate(),
            Err(ServerError::InvalidSetting(_))
        ));

        let oversized_prefill = ServerConfig {
            max_bound: 100,
            prefill: Some(101),
            ..Default::default()
        };
        assert!(oversized_prefill.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ServerConfig::load(Path::new("/nonexistent/primes-server.toml")).unwrap_err();
        assert!(matches!(err, ServerError::ConfigNotFound(_)));
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::Incremental.as_str(), "incremental");
        assert_eq!(Backend::OneShot.as_str(), "one-shot");
    }
}
