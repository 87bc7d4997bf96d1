use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

type Handler<M> = Arc<dyn Fn(&M) + Send + Sync>;

struct BusInner<M> {
    // topic -> registrations in subscription order; a drained topic keeps
    // its (empty) entry
    handlers: Mutex<HashMap<String, Vec<(u64, Handler<M>)>>>,
    next_token: AtomicU64,
}

/// A topic-keyed publish/subscribe dispatcher.
///
/// Handles are cheap to clone and share the same handler registry. Dispatch
/// is synchronous: [`Bus::emit`] invokes every handler registered for the
/// topic, in subscription order, on the calling thread.
///
/// Handler failures are fail-fast: a panicking handler propagates to the
/// emitter and prevents later handlers in the same emit from running. The
/// bus does not isolate subscribers from one another.
///
/// # Examples
///
/// ```
/// use partyline::Bus;
///
/// let bus: Bus<String> = Bus::new();
/// let sub = bus.on("greeting", |msg| println!("got: {msg}"));
///
/// bus.emit("greeting", "hello".to_string());
/// sub.unsubscribe();
/// ```
pub struct Bus<M> {
    inner: Arc<BusInner<M>>,
}

impl<M: 'static> Bus<M> {
    /// Create a new bus with no subscriptions.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    /// Register `handler` under `topic`.
    ///
    /// The returned [`Subscription`] removes exactly this registration when
    /// unsubscribed or dropped. Registering the same closure twice yields two
    /// independent registrations, each with its own capability.
    pub fn on<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);

        let mut handlers = self.inner.handlers.lock().unwrap();
        handlers
            .entry(topic.clone())
            .or_default()
            .push((token, Arc::new(handler)));
        drop(handlers);

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut handlers = inner.handlers.lock().unwrap();
                if let Some(list) = handlers.get_mut(&topic) {
                    list.retain(|(t, _)| *t != token);
                }
            }
        })
    }

    /// Synchronously invoke every handler currently registered for `topic`.
    ///
    /// Handlers run in subscription order and each receives a reference to
    /// `message`. A topic with no subscribers is a no-op. Handlers registered
    /// or removed during the emit take effect from the next emit onward.
    pub fn emit(&self, topic: &str, message: M) {
        let snapshot: Vec<Handler<M>> = {
            let handlers = self.inner.handlers.lock().unwrap();
            handlers
                .get(topic)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        trace!(topic, handlers = snapshot.len(), "emit");

        for handler in snapshot {
            handler(&message);
        }
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let handlers = self.inner.handlers.lock().unwrap();
        handlers.get(topic).map(Vec::len).unwrap_or(0)
    }
}

impl<M: Default + 'static> Bus<M> {
    /// Emit the default message on `topic`.
    ///
    /// Subscribers always receive a message value, never an absent one.
    pub fn notify(&self, topic: &str) {
        self.emit(topic, M::default());
    }
}

impl<M: 'static> Default for Bus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Bus<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Teardown capability returned from a subscribe-like operation.
///
/// Invoking [`Subscription::unsubscribe`] removes exactly the registration
/// this capability was created for. The guard is RAII: dropping it without
/// calling `unsubscribe` removes the registration too, so a subscription
/// that should outlive the current scope must be held onto.
///
/// The capability holds no strong reference to its registry; unsubscribing
/// after the bus or store is gone is a no-op.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the registration this capability corresponds to.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
