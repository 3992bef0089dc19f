//! Integration tests for topic dispatch

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sidecar_callback::{
    DeliveryOutcome, PubSubHandler, SubscriptionError, TopicDispatcher, TopicEvent,
    TopicSubscription, listener_fn,
};
use tokio::sync::Barrier;

fn event(topic: &str) -> TopicEvent {
    TopicEvent::new("comp", topic, "payload").with_id("evt-1")
}

#[tokio::test]
async fn unknown_topic_is_dropped() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();

    assert_eq!(dispatcher.on_event(&event("nobody")).await, DeliveryOutcome::Drop);
    assert!(dispatcher.list_topic_subscriptions().is_empty());
}

#[tokio::test]
async fn outcome_follows_listener_result() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();
    dispatcher
        .subscribe("ok", listener_fn(|_event| async { anyhow::Ok(()) }))
        .unwrap();
    dispatcher
        .subscribe(
            "fails",
            listener_fn(|_event| async { Err::<(), _>(anyhow::anyhow!("downstream timeout")) }),
        )
        .unwrap();

    assert_eq!(dispatcher.on_event(&event("ok")).await, DeliveryOutcome::Success);
    assert_eq!(dispatcher.on_event(&event("fails")).await, DeliveryOutcome::Retry);
}

#[tokio::test]
async fn failed_delivery_leaves_subscription_in_place() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    dispatcher
        .subscribe(
            "flaky",
            listener_fn(move |_event| {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        anyhow::bail!("first attempt fails");
                    }
                    Ok(())
                }
            }),
        )
        .unwrap();

    assert_eq!(dispatcher.on_event(&event("flaky")).await, DeliveryOutcome::Retry);
    assert!(dispatcher.is_subscribed("flaky"));
    assert_eq!(dispatcher.on_event(&event("flaky")).await, DeliveryOutcome::Success);
    assert_eq!(attempts.load(Ordering::SeqCst), 2, "no local retry between deliveries");
}

#[test]
fn subscriptions_have_no_duplicates() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();
    dispatcher
        .subscribe("a", listener_fn(|_event| async { anyhow::Ok(()) }))
        .unwrap();
    dispatcher
        .subscribe("b", listener_fn(|_event| async { anyhow::Ok(()) }))
        .unwrap();

    let again = dispatcher.subscribe("a", listener_fn(|_event| async { anyhow::Ok(()) }));

    assert!(matches!(again, Err(SubscriptionError::Duplicate { .. })));
    let expected: BTreeSet<_> = [
        TopicSubscription::new("comp", "a"),
        TopicSubscription::new("comp", "b"),
    ]
    .into_iter()
    .collect();
    assert_eq!(dispatcher.list_topic_subscriptions(), expected);
}

#[tokio::test]
async fn deliveries_on_one_topic_run_concurrently() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();
    let barrier = Arc::new(Barrier::new(2));
    dispatcher
        .subscribe(
            "t",
            listener_fn(move |_event| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    anyhow::Ok(())
                }
            }),
        )
        .unwrap();

    let first = event("t");
    let second = event("t").with_id("evt-2");
    let both = async { tokio::join!(dispatcher.on_event(&first), dispatcher.on_event(&second)) };

    let (a, b) = tokio::time::timeout(Duration::from_secs(5), both)
        .await
        .expect("both deliveries must be in flight at the same time");

    assert_eq!(a, DeliveryOutcome::Success);
    assert_eq!(b, DeliveryOutcome::Success);
}

#[tokio::test]
async fn dispatcher_serves_as_component_handler() {
    let dispatcher = TopicDispatcher::new("comp").unwrap();
    dispatcher
        .subscribe("t", listener_fn(|_event| async { anyhow::Ok(()) }))
        .unwrap();
    let handler: Arc<dyn PubSubHandler> = Arc::new(dispatcher);

    assert_eq!(handler.list_topic_subscriptions().len(), 1);
    assert_eq!(handler.on_topic_event(&event("t")).await, DeliveryOutcome::Success);
    assert_eq!(handler.on_topic_event(&event("x")).await, DeliveryOutcome::Drop);
}
