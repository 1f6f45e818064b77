use stagehand_ecs::{ComponentRef, Hook};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A subscriber record and the handler to call on it.
#[derive(Clone)]
pub struct Subscription {
    pub subscriber: ComponentRef,
    pub handler: Hook,
}

impl Subscription {
    pub fn new(subscriber: ComponentRef, handler: Hook) -> Self {
        Self {
            subscriber,
            handler,
        }
    }

    /// Identity match on both the record and the handler.
    pub fn same_as(&self, other: &Subscription) -> bool {
        self.subscriber.ptr_eq(&other.subscriber) && Rc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber", &self.subscriber)
            .finish_non_exhaustive()
    }
}

/// Named-event publish/subscribe with deferred subscription changes.
///
/// Publishing is synchronous against the subscription list as of the last
/// [`EventBus::flush`]. Subscribes and unsubscribes only take effect at the
/// next flush, subscribes first.
#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: HashMap<String, Vec<Subscription>>,
    staged_subscribe: Vec<(String, Subscription)>,
    staged_unsubscribe: Vec<(String, Subscription)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event_type: &str, subscription: Subscription) {
        self.staged_subscribe
            .push((event_type.to_owned(), subscription));
    }

    pub fn unsubscribe(&mut self, event_type: &str, subscription: Subscription) {
        self.staged_unsubscribe
            .push((event_type.to_owned(), subscription));
    }

    /// Active subscribers of an event type, in subscription order.
    pub fn subscribers(&self, event_type: &str) -> Vec<Subscription> {
        self.subscriptions
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscriptions.get(event_type).map_or(0, Vec::len)
    }

    /// Number of staged changes waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.staged_subscribe.len() + self.staged_unsubscribe.len()
    }

    /// Apply staged subscribes, then staged unsubscribes. An unsubscribe drops
    /// every matching pair.
    pub fn flush(&mut self) {
        let added = std::mem::take(&mut self.staged_subscribe);
        let removed = std::mem::take(&mut self.staged_unsubscribe);
        if added.is_empty() && removed.is_empty() {
            return;
        }
        tracing::debug!(
            subscribed = added.len(),
            unsubscribed = removed.len(),
            "flushing event subscriptions"
        );

        for (event_type, subscription) in added {
            self.subscriptions
                .entry(event_type)
                .or_default()
                .push(subscription);
        }
        for (event_type, subscription) in removed {
            if let Some(list) = self.subscriptions.get_mut(&event_type) {
                list.retain(|s| !s.same_as(&subscription));
                if list.is_empty() {
                    self.subscriptions.remove(&event_type);
                }
            }
        }
    }
}
