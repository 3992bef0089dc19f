//! Hosts [`AppCallbackService`] on a TCP listener so the sidecar can reach it.
//!
//! Lifecycle:
//! - `start` succeeds at most once per server. A failed bind is rolled back,
//!   so `start` may be retried after it.
//! - `stop` signals a graceful shutdown and waits up to the configured
//!   timeout for in-flight calls to finish.
//! - Dropping a running server signals shutdown without waiting.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::callback::{AppCallbackService, PubSubRegistry};
use crate::error::{RegistryError, ServerError};
use crate::pubsub::PubSubHandler;

pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 9999));

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback server settings.
///
/// Use `127.0.0.1:0` as `listen_addr` for an ephemeral port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallbackServerConfig {
    pub listen_addr: SocketAddr,
    /// Upper bound on graceful shutdown.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for CallbackServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl CallbackServerConfig {
    #[must_use]
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

struct Running {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), tonic::transport::Error>>,
}

/// gRPC server exposing the `AppCallback` service for one registry.
pub struct CallbackServer {
    config: CallbackServerConfig,
    registry: Arc<PubSubRegistry>,
    started: AtomicBool,
    running: Mutex<Option<Running>>,
}

impl CallbackServer {
    /// Creates a stopped server with an empty registry.
    #[must_use]
    pub fn new(config: CallbackServerConfig) -> Self {
        Self::with_registry(config, Arc::new(PubSubRegistry::new()))
    }

    /// Creates a stopped server routing through an existing registry.
    #[must_use]
    pub fn with_registry(config: CallbackServerConfig, registry: Arc<PubSubRegistry>) -> Self {
        Self {
            config,
            registry,
            started: AtomicBool::new(false),
            running: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CallbackServerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<PubSubRegistry> {
        &self.registry
    }

    /// Registers a pub/sub component handler under its component name.
    /// Handlers may be registered before or after `start`.
    ///
    /// # Errors
    /// See [`crate::HandlerRegistry::register_handler`].
    pub fn register_pubsub_handler(
        &self,
        handler: Arc<dyn PubSubHandler>,
    ) -> Result<(), RegistryError> {
        self.registry.register_handler(handler)
    }

    /// Address the server is bound to, while it is running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|running| running.local_addr)
    }

    /// Binds the listener and starts serving in a background task.
    ///
    /// Returns the bound address.
    ///
    /// # Errors
    /// - [`ServerError::AlreadyStarted`] if `start` already succeeded or is in
    ///   progress
    /// - [`ServerError::Bind`] if the listener cannot be bound; the server
    ///   stays startable
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ServerError::AlreadyStarted);
        }

        let (listener, local_addr) = match bind(self.config.listen_addr).await {
            Ok(bound) => bound,
            Err(err) => {
                self.started.store(false, Ordering::Release);
                return Err(err);
            }
        };

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let service = AppCallbackService::new(Arc::clone(&self.registry)).into_server();
        let task = tokio::spawn(async move {
            Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    shutdown.cancelled().await;
                })
                .await
        });

        *self.running.lock() = Some(Running {
            local_addr,
            cancel,
            task,
        });
        tracing::info!(%local_addr, "callback server listening");
        Ok(local_addr)
    }

    /// Shuts the server down gracefully. A server that is not running is left
    /// as is.
    ///
    /// # Errors
    /// - [`ServerError::ShutdownTimeout`] if in-flight calls outlive the
    ///   configured timeout; the serving task is aborted
    /// - [`ServerError::Serve`] / [`ServerError::Join`] if the serving task
    ///   failed
    pub async fn stop(&self) -> Result<(), ServerError> {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return Ok(());
        };

        running.cancel.cancel();
        let timeout = self.config.shutdown_timeout;
        let mut task = running.task;
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => {
                joined??;
                tracing::info!(local_addr = %running.local_addr, "callback server stopped");
                Ok(())
            }
            Err(_elapsed) => {
                task.abort();
                tracing::warn!(
                    local_addr = %running.local_addr,
                    ?timeout,
                    "callback server shutdown timed out, aborting"
                );
                Err(ServerError::ShutdownTimeout { timeout })
            }
        }
    }
}

async fn bind(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok((listener, local_addr))
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for CallbackServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackServer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("started", &self.started.load(Ordering::Relaxed))
            .field("local_addr", &self.local_addr())
            .finish_non_exhaustive()
    }
}
