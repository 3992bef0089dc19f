use std::collections::BTreeSet;

use async_trait::async_trait;

use super::event::{DeliveryOutcome, TopicEvent, TopicSubscription};
use crate::registry::ComponentHandler;

/// Capability of a registered pub/sub component handler.
///
/// [`super::TopicDispatcher`] is the stock implementation; any type that can
/// advertise its subscriptions and answer deliveries can be registered.
/// Every advertised subscription carries the handler's
/// [`component_name`](ComponentHandler::component_name) as its pub/sub name.
#[async_trait]
pub trait PubSubHandler: ComponentHandler + Send + Sync {
    /// Subscriptions to advertise to the sidecar.
    fn list_topic_subscriptions(&self) -> BTreeSet<TopicSubscription>;

    /// Handles one delivery. Must always produce an outcome.
    async fn on_topic_event(&self, event: &TopicEvent) -> DeliveryOutcome;
}
