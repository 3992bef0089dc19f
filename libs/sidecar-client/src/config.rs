//! Typed configuration for the sidecar client transport.
//!
//! The struct only describes *what* to connect to. Provider precedence
//! (files, environment, defaults) belongs to whoever builds the
//! [`figment::Figment`] passed to [`SidecarClientConfig::from_figment`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default gRPC port of the sidecar runtime.
pub const DEFAULT_PORT: u16 = 34904;

/// Connection settings for the sidecar gRPC API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidecarClientConfig {
    /// Sidecar host name or IP address.
    pub host: String,

    /// Sidecar gRPC port.
    pub port: u16,

    /// Number of channels opened to the sidecar and used round-robin.
    pub pool_size: usize,

    /// Timeout for establishing each channel.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Per-RPC timeout applied at the transport level.
    #[serde(with = "humantime_serde")]
    pub rpc_timeout: Duration,

    /// Name used in tracing fields.
    pub service_name: String,
}

impl Default for SidecarClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            pool_size: 1,
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(2),
            service_name: "sidecar".to_owned(),
        }
    }
}

impl SidecarClientConfig {
    /// Config for `host:port` with all other settings at their defaults.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Extracts and validates the config from a prepared figment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Extract`] if the figment cannot be deserialized,
    /// or any validation error from [`validate`](Self::validate).
    pub fn from_figment(figment: &figment::Figment) -> Result<Self, ConfigError> {
        let cfg: Self = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Checks every field for a usable value.
    ///
    /// # Errors
    /// Returns the first invalid field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                field: "connect_timeout",
            });
        }
        if self.rpc_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                field: "rpc_timeout",
            });
        }
        Ok(())
    }

    /// Plaintext gRPC URI of the sidecar.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
