//! Named-event pub/sub for external observers.
//!
//! The coordinator's own reactions to native events are wired by the runtime.
//! This router carries the same events to anyone else who wants to watch them
//! (UI logs, telemetry).
//!
//! Every subscription returns a [`Subscription`] token, and
//! [`EventRouter::unsubscribe`] removes exactly that handler.
//! [`EventRouter::remove_all_listeners`] keeps the coarse behavior of dropping
//! every handler registered under a name.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::event::{OverlayEvent, OverlayEventKind};

/// Event handler.
pub type Handler = Arc<dyn Fn(&OverlayEvent) + Send + Sync>;

/// Token identifying one registered handler.
#[must_use = "dropping the token makes the handler impossible to remove individually"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: OverlayEventKind,
    id: u64,
}

impl Subscription {
    /// Event the handler listens to.
    pub fn kind(&self) -> OverlayEventKind {
        self.kind
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<OverlayEventKind, Vec<(u64, Handler)>>,
}

/// Routes native overlay events to subscribed handlers.
#[derive(Default)]
pub struct EventRouter {
    registry: Mutex<Registry>,
}

impl EventRouter {
    /// Create a router with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe<F>(&self, kind: OverlayEventKind, handler: F) -> Subscription
    where
        F: Fn(&OverlayEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.entry(kind).or_default().push((id, Arc::new(handler)));

        debug!(event = %kind, id, "handler subscribed");
        Subscription { kind, id }
    }

    /// Remove the handler behind `subscription`.
    ///
    /// Returns `false` if it was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut registry = self.registry();
        let Some(handlers) = registry.handlers.get_mut(&subscription.kind) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        let removed = handlers.len() != before;

        debug!(event = %subscription.kind, id = subscription.id, removed, "handler unsubscribed");
        removed
    }

    /// Remove every handler registered for `kind`. Returns how many were removed.
    pub fn remove_all_listeners(&self, kind: OverlayEventKind) -> usize {
        let removed = self.registry().handlers.remove(&kind).map_or(0, |handlers| handlers.len());

        debug!(event = %kind, removed, "all handlers removed");
        removed
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: OverlayEventKind) -> usize {
        self.registry().handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Call every handler subscribed to the event's kind, in subscription order.
    ///
    /// Handlers run outside the registry lock and may subscribe or unsubscribe.
    /// Returns the number of handlers called.
    pub fn emit(&self, event: &OverlayEvent) -> usize {
        let handlers: Vec<Handler> = self
            .registry()
            .handlers
            .get(&event.kind())
            .map(|handlers| handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}
