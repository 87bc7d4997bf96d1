use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::bus::Bus;
use crate::error::{Error, Result};
use crate::store::store::DEFAULT_DEBOUNCE;
use crate::store::{Message, Store};

pub(crate) type ComputeFn = Arc<dyn Fn(&Store) -> Value + Send + Sync>;
pub(crate) type EventFn = Arc<dyn Fn(&Store, &Message) + Send + Sync>;

/// A field is either a value known up front or a computation deferred until
/// the first read.
enum FieldDef {
    Static(Value),
    Lazy(ComputeFn),
}

/// Declarative configuration for a [`Store`].
///
/// Collects the field definitions and the event map, validates them, and
/// wires the store onto a bus. Obtained from [`Store::builder`].
pub struct StoreBuilder {
    name: String,
    fields: Vec<(String, FieldDef)>,
    events: Vec<(String, EventFn)>,
    debounce: Duration,
}

impl StoreBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            events: Vec::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Define a field with a static initial value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .push((name.into(), FieldDef::Static(value.into())));
        self
    }

    /// Define a lazily computed field.
    ///
    /// `compute` runs at most once, on the field's first read, with the store
    /// passed in so it can read sibling fields or schedule its own updates.
    /// Once [`Store::set_state`] writes the field's key, the computation is
    /// bypassed for good.
    pub fn computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Store) -> Value + Send + Sync + 'static,
    {
        self.fields
            .push((name.into(), FieldDef::Lazy(Arc::new(compute))));
        self
    }

    /// Subscribe the store to a bus topic.
    ///
    /// The handler receives the store and the incoming message; a typical
    /// handler reads the message and calls [`Store::set_state`]. Handlers are
    /// detached by [`Store::destroy`], and a handler firing while the store
    /// is being torn down is a no-op.
    pub fn on<F>(mut self, topic: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Store, &Message) + Send + Sync + 'static,
    {
        self.events.push((topic.into(), Arc::new(handler)));
        self
    }

    /// Override the change-notification debounce window.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Validate the configuration and build the store on `bus`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyName`] if the store name is empty, or
    /// [`Error::DuplicateField`] if a field name is defined twice (whether as
    /// a value, a computation, or one of each).
    pub fn build(self, bus: &Bus<Message>) -> Result<Store> {
        if self.name.is_empty() {
            return Err(Error::EmptyName);
        }

        let mut seen = HashSet::new();
        for (name, _) in &self.fields {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateField(name.clone()));
            }
        }

        let mut state = Map::new();
        let mut computes = HashMap::new();
        for (name, def) in self.fields {
            match def {
                FieldDef::Static(value) => {
                    state.insert(name, value);
                }
                FieldDef::Lazy(compute) => {
                    computes.insert(name, compute);
                }
            }
        }

        let store = Store::assemble(self.name, bus.clone(), computes, state, self.debounce);

        for (topic, handler) in self.events {
            let weak = store.downgrade();
            let sub = bus.on(topic, move |msg: &Message| {
                if let Some(store) = weak.upgrade() {
                    handler(&store, msg);
                }
            });
            store.record_subscription(sub);
        }

        Ok(store)
    }
}
