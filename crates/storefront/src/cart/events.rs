//! Change notifications for the cart.
//!
//! Every successful write publishes one [`CartUpdated`] event to every
//! current subscriber, in subscription order. Callbacks run synchronously on
//! the writing thread, after the subscriber list lock has been released, so
//! a callback may itself read the cart or (un)subscribe.

use std::sync::{Arc, Mutex, PoisonError};

use gmexpress_core::CartItem;
use serde::{Deserialize, Serialize};

/// Event name observers listen for.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Payload of a `cart-updated` notification: the list just persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUpdated {
    pub items: Vec<CartItem>,
}

/// Handle returned by [`CartEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&CartUpdated) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

/// Subscriber list for cart change notifications.
#[derive(Default)]
pub struct CartEvents {
    subscribers: Mutex<Subscribers>,
}

impl std::fmt::Debug for CartEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEvents")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl CartEvents {
    /// Create an empty subscriber list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every successful cart write.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CartUpdated) + Send + Sync + 'static,
    {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subs.entries.len();
        subs.entries.retain(|(sub_id, _)| *sub_id != id);
        subs.entries.len() != before
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Whether nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver an event to every subscriber.
    pub fn publish(&self, event: &CartUpdated) {
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        tracing::trace!(
            event = CART_UPDATED_EVENT,
            subscribers = callbacks.len(),
            items = event.items.len(),
            "Publishing cart change"
        );

        for callback in callbacks {
            callback(event);
        }
    }
}
