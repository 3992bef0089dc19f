//! Inbound `AppCallback` service: the sidecar calls into the application
//! through it to learn subscriptions and deliver events.

use std::collections::BTreeSet;
use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::proto::app_callback_server::{AppCallback, AppCallbackServer};
use crate::proto::{
    ListTopicSubscriptionsResponse, TopicEventRequest, TopicEventResponse, TopicSubscription,
};
use crate::pubsub::{PubSubHandler, TopicEvent};
use crate::registry::HandlerRegistry;

/// Registry of pub/sub component handlers, keyed by component name.
pub type PubSubRegistry = HandlerRegistry<dyn PubSubHandler>;

/// [`AppCallback`] routing over a shared [`PubSubRegistry`].
#[derive(Clone, Debug)]
pub struct AppCallbackService {
    registry: Arc<PubSubRegistry>,
}

impl AppCallbackService {
    #[must_use]
    pub fn new(registry: Arc<PubSubRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<PubSubRegistry> {
        &self.registry
    }

    /// Wraps the service for mounting on a `tonic` server.
    #[must_use]
    pub fn into_server(self) -> AppCallbackServer<Self> {
        AppCallbackServer::new(self)
    }
}

#[tonic::async_trait]
impl AppCallback for AppCallbackService {
    async fn list_topic_subscriptions(
        &self,
        _request: Request<()>,
    ) -> Result<Response<ListTopicSubscriptionsResponse>, Status> {
        let mut subscriptions = BTreeSet::new();
        for (component, handler) in self.registry.list_all() {
            for sub in handler.list_topic_subscriptions() {
                // Only pairs that on_topic_event can route back are advertised.
                if sub.pubsub_name == component {
                    subscriptions.insert(sub);
                } else {
                    tracing::warn!(
                        pubsub_name = %component,
                        advertised = %sub.pubsub_name,
                        topic = %sub.topic,
                        "handler advertised a foreign pub/sub name, skipping subscription"
                    );
                }
            }
        }

        tracing::debug!(count = subscriptions.len(), "listing topic subscriptions");

        Ok(Response::new(ListTopicSubscriptionsResponse {
            subscriptions: subscriptions.into_iter().map(TopicSubscription::from).collect(),
        }))
    }

    async fn on_topic_event(
        &self,
        request: Request<TopicEventRequest>,
    ) -> Result<Response<TopicEventResponse>, Status> {
        let event = TopicEvent::from(request.into_inner());

        if event.pubsub_name.is_empty() {
            return Err(Status::invalid_argument("pubsub_name must not be empty"));
        }

        let handler = self.registry.lookup(&event.pubsub_name).map_err(|err| {
            tracing::error!(
                pubsub_name = %event.pubsub_name,
                topic = %event.topic,
                event_id = %event.id,
                "event for unregistered pub/sub component"
            );
            Status::from(err)
        })?;

        let outcome = handler.on_topic_event(&event).await;
        Ok(Response::new(TopicEventResponse::from(outcome)))
    }
}
