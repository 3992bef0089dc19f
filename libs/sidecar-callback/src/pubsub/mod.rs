//! Topic-based pub/sub delivery.

mod dispatcher;
mod event;
mod handler;
mod listener;

pub use dispatcher::TopicDispatcher;
pub use event::{DeliveryOutcome, TopicEvent, TopicSubscription};
pub use handler::PubSubHandler;
pub use listener::{FnListener, TopicListener, listener_fn};
