//! Per-component topic dispatch.
//!
//! Each topic of a component is either subscribed or not; there is no
//! intermediate state. `subscribe` is the only transition, and dispatch never
//! changes subscription state.
//!
//! Delivery outcome of [`TopicDispatcher::on_event`]:
//! - no listener for the topic: `Drop` (nothing could ever consume it)
//! - listener returns `Ok`: `Success`
//! - listener returns `Err` or panics: `Retry` (redelivery is up to the sidecar)

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;

use super::event::{DeliveryOutcome, TopicEvent, TopicSubscription};
use super::handler::PubSubHandler;
use super::listener::TopicListener;
use crate::error::SubscriptionError;
use crate::registry::ComponentHandler;

struct Subscription {
    listener: Arc<dyn TopicListener>,
    metadata: BTreeMap<String, String>,
}

/// Topic-keyed listener table for one pub/sub component.
pub struct TopicDispatcher {
    component_name: String,
    topics: DashMap<String, Subscription>,
}

impl TopicDispatcher {
    /// Creates an empty dispatcher for `component_name`.
    ///
    /// # Errors
    /// Returns [`SubscriptionError::InvalidArgument`] if the name is empty or blank.
    pub fn new(component_name: impl Into<String>) -> Result<Self, SubscriptionError> {
        let component_name = component_name.into();
        if component_name.trim().is_empty() {
            return Err(SubscriptionError::InvalidArgument(
                "component name must not be empty",
            ));
        }
        Ok(Self {
            component_name,
            topics: DashMap::new(),
        })
    }

    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Subscribes `listener` to `topic`.
    ///
    /// # Errors
    /// - [`SubscriptionError::InvalidArgument`] if `topic` is empty or blank
    /// - [`SubscriptionError::Duplicate`] if `topic` is already subscribed; the
    ///   existing subscription is left untouched
    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        listener: Arc<dyn TopicListener>,
    ) -> Result<(), SubscriptionError> {
        self.subscribe_with_metadata(topic, BTreeMap::new(), listener)
    }

    /// Like [`subscribe`](Self::subscribe), attaching `metadata` to the
    /// advertised subscription.
    ///
    /// # Errors
    /// Same as [`subscribe`](Self::subscribe).
    pub fn subscribe_with_metadata(
        &self,
        topic: impl Into<String>,
        metadata: BTreeMap<String, String>,
        listener: Arc<dyn TopicListener>,
    ) -> Result<(), SubscriptionError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(SubscriptionError::InvalidArgument("topic must not be empty"));
        }

        match self.topics.entry(topic) {
            Entry::Occupied(existing) => Err(SubscriptionError::Duplicate {
                component: self.component_name.clone(),
                topic: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::info!(
                    pubsub_name = %self.component_name,
                    topic = %slot.key(),
                    "topic subscribed"
                );
                slot.insert(Subscription { listener, metadata });
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Current subscriptions of this component.
    #[must_use]
    pub fn list_topic_subscriptions(&self) -> BTreeSet<TopicSubscription> {
        self.topics
            .iter()
            .map(|entry| TopicSubscription {
                pubsub_name: self.component_name.clone(),
                topic: entry.key().clone(),
                metadata: entry.value().metadata.clone(),
            })
            .collect()
    }

    /// Delivers `event` to the listener subscribed to `event.topic`.
    ///
    /// Always returns exactly one outcome; listener errors and panics are
    /// absorbed into [`DeliveryOutcome::Retry`].
    pub async fn on_event(&self, event: &TopicEvent) -> DeliveryOutcome {
        // Clone the listener out so no map shard stays locked while it runs.
        let listener = self
            .topics
            .get(&event.topic)
            .map(|entry| Arc::clone(&entry.value().listener));

        let Some(listener) = listener else {
            tracing::error!(
                pubsub_name = %self.component_name,
                topic = %event.topic,
                event_id = %event.id,
                "no listener subscribed for topic, dropping event"
            );
            return DeliveryOutcome::Drop;
        };

        match AssertUnwindSafe(listener.on_event(event)).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::debug!(
                    pubsub_name = %self.component_name,
                    topic = %event.topic,
                    event_id = %event.id,
                    "event handled"
                );
                DeliveryOutcome::Success
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    pubsub_name = %self.component_name,
                    topic = %event.topic,
                    event_id = %event.id,
                    error = %format!("{err:#}"),
                    "listener failed, requesting redelivery"
                );
                DeliveryOutcome::Retry
            }
            Err(panic) => {
                tracing::warn!(
                    pubsub_name = %self.component_name,
                    topic = %event.topic,
                    event_id = %event.id,
                    panic = panic_message(panic.as_ref()),
                    "listener panicked, requesting redelivery"
                );
                DeliveryOutcome::Retry
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl fmt::Debug for TopicDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: BTreeSet<String> = self.topics.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("TopicDispatcher")
            .field("component_name", &self.component_name)
            .field("topics", &topics)
            .finish()
    }
}

impl ComponentHandler for TopicDispatcher {
    fn component_name(&self) -> &str {
        &self.component_name
    }
}

#[async_trait]
impl PubSubHandler for TopicDispatcher {
    fn list_topic_subscriptions(&self) -> BTreeSet<TopicSubscription> {
        TopicDispatcher::list_topic_subscriptions(self)
    }

    async fn on_topic_event(&self, event: &TopicEvent) -> DeliveryOutcome {
        self.on_event(event).await
    }
}
