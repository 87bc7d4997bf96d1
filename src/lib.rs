//! # Partyline
//!
//! A minimal state-management layer for Rust: a topic-based pub/sub bus,
//! stores that batch their change notifications over it, and a
//! directly-observed value type for wiring state into a UI.
//!
//! ## Bus (dispatch)
//!
//! [`Bus`] decouples publishers from subscribers by topic name. Dispatch is
//! synchronous and fail-fast, and every registration hands back a
//! [`Subscription`] that removes exactly that handler.
//!
//! ## Store (named, debounced state)
//!
//! [`Store`] holds string-keyed fields declared through a builder: static
//! values, or lazy computations cached after the first read. State patches
//! merge synchronously; the `"<name>-store-change"` notification is
//! debounced so a burst of updates announces itself exactly once, carrying
//! the store handle for subscribers to read the merged result.
//!
//! ## Watched (direct subscription)
//!
//! [`Watched`] is the strict subset a rendering adapter binds to: a typed
//! value with `subscribe`, notifying synchronously on every mutation.

pub mod bus;
pub mod error;
pub mod store;
pub mod watched;

// Re-export main types for convenience
pub use bus::{Bus, Subscription};
pub use error::{Error, Result};
pub use store::{default_bus, Message, Store, StoreBuilder};
pub use watched::Watched;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn it_works() {
        // Basic smoke test
        let bus: Bus<Message> = Bus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let sub = bus.on("boom", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.notify("boom");
        sub.unsubscribe();
        bus.notify("boom");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
