use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::bus::{Bus, Subscription};
use crate::store::builder::{ComputeFn, StoreBuilder};
use crate::store::Message;

pub(crate) const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1);

struct StoreInner {
    name: String,
    topic: String,
    bus: Bus<Message>,
    // lazy fields only; static fields are materialized into state up front
    computes: HashMap<String, ComputeFn>,
    state: Mutex<Map<String, Value>>,
    subscriptions: Mutex<Vec<Subscription>>,
    // at most one outstanding notification timer
    pending: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

/// A named container of state fields with batched change notification.
///
/// Fields are declared up front through [`Store::builder`], either as static
/// values or as lazy computations that run once on first read. State is read
/// through the single generic accessor [`Store::get`] and merged through
/// [`Store::set_state`]; every merge is synchronous, while the resulting
/// `"<name>-store-change"` bus notification is debounced so a burst of
/// updates announces itself exactly once.
///
/// Handles are cheap to clone and share the same state. A store stays
/// subscribed to its event-map topics until [`Store::destroy`] is called.
///
/// Scheduling the debounced notification requires an ambient Tokio runtime;
/// [`Store::set_state`] panics outside of one.
///
/// # Examples
///
/// ```
/// use partyline::{Bus, Store};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> partyline::Result<()> {
/// let bus = Bus::new();
/// let store = Store::builder("session")
///     .field("name", "Brian")
///     .computed("greeting", |store| {
///         let name = store.get("name").unwrap();
///         json!(format!("hello, {}", name.as_str().unwrap()))
///     })
///     .build(&bus)?;
///
/// assert_eq!(store.get("greeting"), Some(json!("hello, Brian")));
/// store.destroy();
/// # Ok(())
/// # }
/// ```
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Start declaring a store named `name`.
    pub fn builder(name: impl Into<String>) -> StoreBuilder {
        StoreBuilder::new(name)
    }

    pub(crate) fn assemble(
        name: String,
        bus: Bus<Message>,
        computes: HashMap<String, ComputeFn>,
        state: Map<String, Value>,
        debounce: Duration,
    ) -> Self {
        let topic = format!("{name}-store-change");
        debug!(
            store = %name,
            fields = state.len() + computes.len(),
            "store created"
        );
        Self {
            inner: Arc::new(StoreInner {
                name,
                topic,
                bus,
                computes,
                state: Mutex::new(state),
                subscriptions: Mutex::new(Vec::new()),
                pending: Mutex::new(None),
                debounce,
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore(Arc::downgrade(&self.inner))
    }

    pub(crate) fn record_subscription(&self, sub: Subscription) {
        self.inner.subscriptions.lock().unwrap().push(sub);
    }

    /// The store's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The bus topic this store announces changes on:
    /// `"<name>-store-change"`.
    pub fn change_topic(&self) -> &str {
        &self.inner.topic
    }

    /// Read a field.
    ///
    /// A lazy field is computed on its first read and cached; later reads
    /// return the cache without re-running the computation. `None` for a
    /// field that was never declared.
    pub fn get(&self, field: &str) -> Option<Value> {
        if let Some(value) = self.inner.state.lock().unwrap().get(field) {
            return Some(value.clone());
        }

        let compute = self.inner.computes.get(field)?;
        // run outside the state lock: the computation may re-enter the store
        let value = compute(self);
        self.inner
            .state
            .lock()
            .unwrap()
            .insert(field.to_string(), value.clone());
        Some(value)
    }

    /// Snapshot of the full materialized state.
    ///
    /// Lazy fields that have never been read are not part of the snapshot.
    pub fn state(&self) -> Map<String, Value> {
        self.inner.state.lock().unwrap().clone()
    }

    /// Merge `patch` into the state, key by key, last write wins.
    ///
    /// The merge itself is synchronous; the change notification is deferred.
    /// Each call cancels any notification still pending and schedules a new
    /// one, so a burst of calls inside the debounce window emits exactly one
    /// `"<name>-store-change"` message, carrying this store, once the window
    /// elapses.
    pub fn set_state(&self, patch: Map<String, Value>) {
        {
            let mut state = self.inner.state.lock().unwrap();
            for (key, value) in patch {
                state.insert(key, value);
            }
        }
        self.schedule_notify();
    }

    /// Merge a single field, shorthand for a one-entry [`Store::set_state`].
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
        let mut patch = Map::new();
        patch.insert(field.into(), value.into());
        self.set_state(patch);
    }

    fn schedule_notify(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        trace!(store = %self.inner.name, "change notification scheduled");

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let store = Store { inner };
                store
                    .inner
                    .bus
                    .emit(&store.inner.topic, Message::from_store(store.clone()));
            }
        }));
    }

    /// Tear the store down.
    ///
    /// Cancels any pending change notification, then removes every bus
    /// subscription registered from the event map. State is left in place
    /// and stays readable. Destroy a store once; a second call is not
    /// supported.
    pub fn destroy(&self) {
        if let Some(timer) = self.inner.pending.lock().unwrap().take() {
            timer.abort();
        }

        let subs: Vec<Subscription> = {
            let mut subscriptions = self.inner.subscriptions.lock().unwrap();
            subscriptions.drain(..).collect()
        };
        for sub in subs {
            sub.unsubscribe();
        }

        debug!(store = %self.inner.name, "store destroyed");
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handle identity: two handles are equal when they share the same store.
impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("state_keys", &self.inner.state.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

pub(crate) struct WeakStore(Weak<StoreInner>);

impl WeakStore {
    pub(crate) fn upgrade(&self) -> Option<Store> {
        self.0.upgrade().map(|inner| Store { inner })
    }
}
