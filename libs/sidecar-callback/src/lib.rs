#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
//! Inbound side of the sidecar client.
//!
//! Applications register one [`PubSubHandler`] per pub/sub component and
//! subscribe listeners to topics; the sidecar delivers events through the
//! `AppCallback` gRPC service hosted by [`CallbackServer`]:
//!
//! ```ignore
//! use std::sync::Arc;
//! use sidecar_callback::{CallbackServer, CallbackServerConfig, TopicDispatcher, listener_fn};
//!
//! let orders = TopicDispatcher::new("redis")?;
//! orders.subscribe("orders", listener_fn(|event| async move {
//!     println!("got {} bytes", event.data.len());
//!     Ok(())
//! }))?;
//!
//! let server = CallbackServer::new(CallbackServerConfig::default());
//! server.register_pubsub_handler(Arc::new(orders))?;
//! server.start().await?;
//! ```

pub mod callback;
pub mod error;
pub mod proto;
pub mod pubsub;
pub mod registry;
pub mod server;

pub use callback::{AppCallbackService, PubSubRegistry};
pub use error::{RegistryError, ServerError, SubscriptionError};
pub use proto::app_callback_server::AppCallback;
pub use pubsub::{
    DeliveryOutcome, FnListener, PubSubHandler, TopicDispatcher, TopicEvent, TopicListener,
    TopicSubscription, listener_fn,
};
pub use registry::{ComponentHandler, HandlerRegistry};
pub use server::{CallbackServer, CallbackServerConfig};
