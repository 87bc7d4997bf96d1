//! Named state stores with batched change notification.
//!
//! A [`Store`] holds string-keyed fields, each a static value or a lazily
//! computed one, and announces changes over a [`Bus`] under the topic
//! `"<name>-store-change"`. Rapid [`Store::set_state`] calls coalesce into a
//! single debounced notification carrying the store handle, so subscribers
//! always read the latest merged state.

mod builder;
mod message;
mod store;

use std::sync::OnceLock;

use crate::bus::Bus;

pub use builder::StoreBuilder;
pub use message::Message;
pub use store::Store;

/// The process-wide default bus that stores publish on.
///
/// Independent stores discover each other's change notifications here without
/// holding direct references. This is a convenience for an application's
/// composition root; anything that wants isolation (tests in particular)
/// should construct and pass its own [`Bus`] instead.
pub fn default_bus() -> Bus<Message> {
    static BUS: OnceLock<Bus<Message>> = OnceLock::new();
    BUS.get_or_init(Bus::new).clone()
}
