use serde_json::{Map, Value};

use crate::store::Store;

/// The payload stores exchange over the bus.
///
/// A message is object-shaped: a map of named values, empty by default so
/// handlers never see an absent payload. Change notifications additionally
/// carry the originating [`Store`] handle, letting subscribers read the
/// latest merged state directly.
#[derive(Clone, Debug, Default)]
pub struct Message {
    body: Map<String, Value>,
    store: Option<Store>,
}

impl Message {
    /// An empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the message body.
    ///
    /// ```
    /// use partyline::Message;
    ///
    /// let msg = Message::new().with("name", "foo").with("attempts", 3);
    /// assert_eq!(msg.get("name").and_then(|v| v.as_str()), Some("foo"));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Look up a body entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The full message body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// The store that published this message, when it is a change
    /// notification.
    pub fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }

    pub(crate) fn from_store(store: Store) -> Self {
        Self {
            body: Map::new(),
            store: Some(store),
        }
    }
}

impl From<Map<String, Value>> for Message {
    fn from(body: Map<String, Value>) -> Self {
        Self { body, store: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_message_is_an_empty_object() {
        let msg = Message::new();
        assert!(msg.body().is_empty());
        assert!(msg.store().is_none());
    }

    #[test]
    fn with_chains_body_entries() {
        let msg = Message::new().with("name", "foo").with("count", 2);
        assert_eq!(msg.get("name"), Some(&json!("foo")));
        assert_eq!(msg.get("count"), Some(&json!(2)));
        assert_eq!(msg.get("missing"), None);
    }
}
