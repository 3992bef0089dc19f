//! Error types of the callback crate.

use std::net::SocketAddr;
use std::time::Duration;

use tonic::Status;

/// Registry operation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("registration name '{name}' does not match handler component '{component}'")]
    NameMismatch { name: String, component: String },

    #[error("handler already registered for component '{name}'")]
    Duplicate { name: String },

    #[error("no handler registered for component '{name}'")]
    NotFound { name: String },
}

/// Topic subscription failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("topic '{topic}' is already subscribed on component '{component}'")]
    Duplicate { component: String, topic: String },
}

/// Callback server lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("callback server was already started")]
    AlreadyStarted,

    #[error("failed to bind callback server to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("callback server did not shut down within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    #[error("callback server transport failed")]
    Serve(#[from] tonic::transport::Error),

    #[error("callback server task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl From<RegistryError> for Status {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidArgument(_) | RegistryError::NameMismatch { .. } => {
                Status::invalid_argument(err.to_string())
            }
            RegistryError::Duplicate { .. } => Status::already_exists(err.to_string()),
            RegistryError::NotFound { .. } => Status::not_found(err.to_string()),
        }
    }
}
