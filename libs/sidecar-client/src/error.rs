//! Error types for the sidecar client transport.

/// Invalid pool construction. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("pool size must be greater than zero")]
    ZeroSize,

    #[error("connection pool requires at least one connection")]
    Empty,
}

/// Invalid or unreadable client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid sidecar host: must not be empty")]
    InvalidHost,

    #[error("invalid sidecar port: must be greater than zero")]
    InvalidPort,

    #[error("invalid pool size: must be greater than zero")]
    InvalidPoolSize,

    #[error("invalid {field}: must be greater than zero")]
    InvalidTimeout { field: &'static str },

    #[error("failed to extract sidecar client config: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Failure while building the gRPC channel pool.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("invalid sidecar endpoint '{uri}': {source}")]
    Endpoint {
        uri: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to connect channel {slot} of {pool_size} to '{uri}': {source}")]
    Connect {
        uri: String,
        slot: usize,
        pool_size: usize,
        #[source]
        source: tonic::transport::Error,
    },
}
