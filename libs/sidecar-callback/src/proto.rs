//! Generated `spec.proto.runtime.v1` stubs for the `AppCallback` service and
//! their conversions to the domain types.

use crate::pubsub::{DeliveryOutcome, TopicEvent, TopicSubscription as Subscription};

tonic::include_proto!("spec.proto.runtime.v1");

pub use topic_event_response::TopicEventResponseStatus;

impl From<TopicEventRequest> for TopicEvent {
    fn from(req: TopicEventRequest) -> Self {
        Self {
            id: req.id,
            source: req.source,
            event_type: req.r#type,
            spec_version: req.spec_version,
            data_content_type: req.data_content_type,
            data: req.data,
            topic: req.topic,
            pubsub_name: req.pubsub_name,
            metadata: req.metadata,
        }
    }
}

impl From<TopicEvent> for TopicEventRequest {
    fn from(event: TopicEvent) -> Self {
        Self {
            id: event.id,
            source: event.source,
            r#type: event.event_type,
            spec_version: event.spec_version,
            data_content_type: event.data_content_type,
            topic: event.topic,
            data: event.data,
            pubsub_name: event.pubsub_name,
            metadata: event.metadata,
        }
    }
}

impl From<Subscription> for TopicSubscription {
    fn from(sub: Subscription) -> Self {
        Self {
            pubsub_name: sub.pubsub_name,
            topic: sub.topic,
            metadata: sub.metadata.into_iter().collect(),
        }
    }
}

impl From<DeliveryOutcome> for TopicEventResponseStatus {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Success => Self::Success,
            DeliveryOutcome::Retry => Self::Retry,
            DeliveryOutcome::Drop => Self::Drop,
        }
    }
}

impl From<TopicEventResponseStatus> for DeliveryOutcome {
    fn from(status: TopicEventResponseStatus) -> Self {
        match status {
            TopicEventResponseStatus::Success => Self::Success,
            TopicEventResponseStatus::Retry => Self::Retry,
            TopicEventResponseStatus::Drop => Self::Drop,
        }
    }
}

impl From<DeliveryOutcome> for TopicEventResponse {
    fn from(outcome: DeliveryOutcome) -> Self {
        Self {
            status: TopicEventResponseStatus::from(outcome) as i32,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use prost::Message;
    use std::collections::HashMap;

    #[test]
    fn status_values_are_stable() {
        assert_eq!(TopicEventResponse::from(DeliveryOutcome::Success).status, 0);
        assert_eq!(TopicEventResponse::from(DeliveryOutcome::Retry).status, 1);
        assert_eq!(TopicEventResponse::from(DeliveryOutcome::Drop).status, 2);
    }

    #[test]
    fn unknown_status_value_is_rejected() {
        assert_eq!(
            TopicEventResponseStatus::try_from(2).ok().map(DeliveryOutcome::from),
            Some(DeliveryOutcome::Drop)
        );
        assert!(TopicEventResponseStatus::try_from(7).is_err());
    }

    #[test]
    fn request_decodes_into_domain_event() {
        let req = TopicEventRequest {
            id: "evt-1".to_owned(),
            r#type: "com.example.order".to_owned(),
            topic: "orders".to_owned(),
            pubsub_name: "redis".to_owned(),
            data: b"{\"id\":1}".to_vec(),
            metadata: HashMap::from([("priority".to_owned(), "high".to_owned())]),
            ..Default::default()
        };

        let decoded = TopicEventRequest::decode(req.encode_to_vec().as_slice()).unwrap();
        let event = TopicEvent::from(decoded);

        assert_eq!(event.id, "evt-1");
        assert_eq!(event.event_type, "com.example.order");
        assert_eq!(event.topic, "orders");
        assert_eq!(event.pubsub_name, "redis");
        assert_eq!(event.data, b"{\"id\":1}");
        assert_eq!(event.metadata.get("priority").map(String::as_str), Some("high"));
    }

    #[test]
    fn subscription_metadata_is_carried() {
        let mut sub = Subscription::new("redis", "orders");
        sub.metadata.insert("rawPayload".to_owned(), "true".to_owned());

        let wire = TopicSubscription::from(sub);

        assert_eq!(wire.pubsub_name, "redis");
        assert_eq!(wire.topic, "orders");
        assert_eq!(wire.metadata.get("rawPayload").map(String::as_str), Some("true"));
    }
}
