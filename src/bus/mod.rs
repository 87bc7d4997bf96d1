//! Topic-based publish/subscribe dispatch.
//!
//! The bus decouples publishers from subscribers by topic name. Dispatch is
//! synchronous and in-process: `emit` invokes every registered handler before
//! returning.

mod bus;

pub use bus::{Bus, Subscription};
