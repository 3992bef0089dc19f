#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
//! Outbound side of the sidecar client.
//!
//! Outgoing calls are spread across a fixed pool of connections:
//!
//! ```ignore
//! use sidecar_client::{SidecarClientConfig, connect_lazy_pool};
//!
//! let cfg = SidecarClientConfig::new("127.0.0.1", 34904).with_pool_size(4);
//! let pool = connect_lazy_pool(&cfg)?;
//! let stubs = pool.map(|ch| RuntimeClient::new(ch.clone()));
//!
//! let mut client = stubs.acquire().clone();
//! client.say_hello(request).await?;
//! ```

pub mod balance;
pub mod config;
pub mod error;
pub mod pool;
pub mod transport;

pub use balance::RotatingIndex;
pub use config::SidecarClientConfig;
pub use error::{ConfigError, PoolError, TransportError};
pub use pool::ConnectionPool;
pub use transport::{connect_lazy_pool, connect_pool};
