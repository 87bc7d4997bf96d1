//! Directly observed state values.
//!
//! [`Watched`] is the store variant UI bindings consume: a typed value with
//! subscribe/unsubscribe and synchronous notification on every mutation. No
//! bus, no debounce; subscribers hear about each change immediately.

mod watched;

pub use watched::Watched;
