//! gRPC channel pool construction for the sidecar API.
//!
//! Every channel gets:
//! - the configured connect and per-RPC timeouts
//! - TCP keepalive (30 seconds)
//! - HTTP/2 keepalive interval (30 seconds) with a 10 second timeout, also while idle
//!
//! **Note:** no retries or health checks happen here. A failed call on an
//! acquired channel is the caller's to handle.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

use crate::config::SidecarClientConfig;
use crate::error::TransportError;
use crate::pool::ConnectionPool;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn build_endpoint(cfg: &SidecarClientConfig) -> Result<Endpoint, TransportError> {
    let uri = cfg.endpoint_uri();
    let endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|source| TransportError::Endpoint { uri, source })?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Builds a pool of `pool_size` lazily connected channels.
///
/// No I/O happens here; each channel connects on its first request. Must be
/// called from within a Tokio runtime.
///
/// # Errors
/// Returns [`TransportError::Config`] for an invalid config and
/// [`TransportError::Endpoint`] if the sidecar URI cannot be parsed.
pub fn connect_lazy_pool(
    cfg: &SidecarClientConfig,
) -> Result<ConnectionPool<Channel>, TransportError> {
    cfg.validate()?;
    let endpoint = build_endpoint(cfg)?;

    let channels = (0..cfg.pool_size)
        .map(|_| endpoint.connect_lazy())
        .collect();
    let pool = ConnectionPool::new(channels)?;

    tracing::info!(
        service_name = %cfg.service_name,
        uri = %cfg.endpoint_uri(),
        pool_size = pool.len(),
        "sidecar channel pool created (lazy)"
    );
    Ok(pool)
}

/// Builds a pool of `pool_size` eagerly connected channels.
///
/// Channels are connected one after another; the first failure aborts the
/// whole pool.
///
/// # Errors
/// Returns [`TransportError::Config`] for an invalid config,
/// [`TransportError::Endpoint`] if the sidecar URI cannot be parsed, and
/// [`TransportError::Connect`] if any channel fails to connect.
pub async fn connect_pool(
    cfg: &SidecarClientConfig,
) -> Result<ConnectionPool<Channel>, TransportError> {
    cfg.validate()?;
    let endpoint = build_endpoint(cfg)?;
    let uri = cfg.endpoint_uri();

    let span = tracing::debug_span!(
        "grpc_connect",
        service = %cfg.service_name,
        uri = %uri,
        pool_size = cfg.pool_size
    );

    async move {
        let mut channels = Vec::with_capacity(cfg.pool_size);
        for slot in 0..cfg.pool_size {
            let channel = endpoint
                .connect()
                .await
                .map_err(|source| TransportError::Connect {
                    uri: uri.clone(),
                    slot,
                    pool_size: cfg.pool_size,
                    source,
                })?;
            channels.push(channel);
        }
        let pool = ConnectionPool::new(channels)?;

        tracing::info!(
            service_name = %cfg.service_name,
            pool_size = pool.len(),
            connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
            rpc_timeout_ms = duration_to_u64_ms(cfg.rpc_timeout),
            "sidecar channel pool connected"
        );
        Ok(pool)
    }
    .instrument(span)
    .await
}
