//! Application listeners invoked for subscribed topics.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::event::TopicEvent;

/// Receives events for one subscribed topic.
///
/// Returning `Err` asks the sidecar to redeliver the event.
#[async_trait]
pub trait TopicListener: Send + Sync {
    async fn on_event(&self, event: &TopicEvent) -> anyhow::Result<()>;
}

/// [`TopicListener`] backed by an async closure. See [`listener_fn`].
pub struct FnListener<F>(F);

#[async_trait]
impl<F, Fut> TopicListener for FnListener<F>
where
    F: Fn(TopicEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_event(&self, event: &TopicEvent) -> anyhow::Result<()> {
        (self.0)(event.clone()).await
    }
}

/// Wraps an async closure as a shareable listener.
///
/// ```ignore
/// dispatcher.subscribe("orders", listener_fn(|event| async move {
///     store.save(&event.data).await
/// }))?;
/// ```
#[must_use]
pub fn listener_fn<F, Fut>(f: F) -> Arc<dyn TopicListener>
where
    F: Fn(TopicEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnListener(f))
}
