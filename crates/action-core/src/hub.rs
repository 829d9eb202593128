use crate::error::Result;
use crate::subscription::Subscription;
use crate::types::Event;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Callback invoked for every event matching a subscription. Returning
/// `Some` publishes a reply back to the event's sender.
pub type Callback = Box<dyn Fn(&Event) -> Option<Value> + Send + Sync>;

struct Subscriber {
    id: Uuid,
    subscription: Subscription,
    callback: Callback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionInfo {
    pub id: Uuid,
    pub expression: String,
}

// ---------------------------------------------------------------------------
// EventHub
// ---------------------------------------------------------------------------

/// In-process publish/subscribe hub.
///
/// Subscriptions are added at registration time and live until the hub is
/// dropped. Callbacks run synchronously on the publishing thread, while the
/// subscriber table is read-locked, so a callback must not subscribe.
#[derive(Clone, Default)]
pub struct EventHub {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, expression: &str, callback: F) -> Result<Uuid>
    where
        F: Fn(&Event) -> Option<Value> + Send + Sync + 'static,
    {
        let subscription = Subscription::parse(expression)?;
        let id = Uuid::new_v4();
        tracing::debug!(%id, expression = subscription.expression(), "subscribed");
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                subscription,
                callback: Box::new(callback),
            });
        Ok(id)
    }

    /// Deliver `event` to every matching subscriber in registration order
    /// and return the first reply.
    pub fn publish(&self, event: &Event) -> Option<Value> {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut reply = None;
        let mut delivered = 0usize;
        for sub in subscribers.iter().filter(|s| s.subscription.matches(event)) {
            delivered += 1;
            match (reply.is_some(), (sub.callback)(event)) {
                (false, Some(value)) => reply = Some(value),
                (true, Some(_)) => {
                    tracing::debug!(subscriber = %sub.id, topic = %event.topic, "dropping extra reply")
                }
                (_, None) => {}
            }
        }

        tracing::debug!(
            event = %event.id,
            topic = %event.topic,
            delivered,
            replied = reply.is_some(),
            "event published"
        );
        reply
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| SubscriptionInfo {
                id: s.id,
                expression: s.subscription.expression().to_string(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Handle a plugin loader passes to `register`. Only the process-wide
/// `Registry::event_handlers()` instance activates handlers; any other
/// registry belongs to a different loader and is ignored.
#[derive(Debug)]
pub struct Registry {
    name: &'static str,
}

static EVENT_HANDLERS: Registry = Registry {
    name: "event_handlers",
};

impl Registry {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn event_handlers() -> &'static Registry {
        &EVENT_HANDLERS
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Identity comparison; a registry with the same name is still foreign.
    pub fn is_event_handlers(&self) -> bool {
        std::ptr::eq(self, &EVENT_HANDLERS)
    }
}
