//! Pub/sub domain values: inbound events, subscriptions and delivery outcomes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// An event delivered by the sidecar, in CloudEvents envelope form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicEvent {
    /// Identifies the event; `source + id` is unique per distinct event,
    /// a redelivery may carry the same id.
    pub id: String,
    /// Context in which the event happened.
    pub source: String,
    /// Type of the originating occurrence.
    pub event_type: String,
    /// CloudEvents spec version.
    pub spec_version: String,
    /// Content type of `data`.
    pub data_content_type: String,
    /// Event payload.
    pub data: Vec<u8>,
    /// Topic the publisher sent to.
    pub topic: String,
    /// Pub/sub component the publisher sent to.
    pub pubsub_name: String,
    /// Extra properties.
    pub metadata: HashMap<String, String>,
}

impl TopicEvent {
    #[must_use]
    pub fn new(
        pubsub_name: impl Into<String>,
        topic: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            pubsub_name: pubsub_name.into(),
            topic: topic.into(),
            data: data.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A `(component, topic)` pair this client wants the sidecar to route to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicSubscription {
    pub pubsub_name: String,
    pub topic: String,
    /// Optional per-subscription properties passed to the sidecar.
    pub metadata: BTreeMap<String, String>,
}

impl TopicSubscription {
    #[must_use]
    pub fn new(pubsub_name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            pubsub_name: pubsub_name.into(),
            topic: topic.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Result of one delivery, reported back to the sidecar.
///
/// This is the only feedback channel to the sidecar's redelivery engine:
/// `Success` acknowledges, `Retry` asks for redelivery, `Drop` discards
/// the message for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryOutcome {
    Success,
    Retry,
    Drop,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryOutcome::Success => "SUCCESS",
            DeliveryOutcome::Retry => "RETRY",
            DeliveryOutcome::Drop => "DROP",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
