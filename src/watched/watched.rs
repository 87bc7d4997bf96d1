use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::bus::Subscription;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct WatchedInner<T> {
    value: RwLock<T>,
    subscribers: Mutex<Vec<(u64, Callback<T>)>>,
    next_token: AtomicU64,
}

/// A shared value whose subscribers are notified synchronously on every
/// mutation.
///
/// This is the direct-notification counterpart of [`Store`](crate::Store):
/// no bus topic, no debounce window. [`Watched::set`] and [`Watched::update`]
/// invoke every subscriber before returning, each with a snapshot of the
/// fully updated value. A rendering adapter mounts by reading the current
/// value and subscribing, and tears down by dropping (or unsubscribing) the
/// returned [`Subscription`].
///
/// # Examples
///
/// ```
/// use partyline::Watched;
///
/// let count = Watched::new(0);
/// let sub = count.subscribe(|n| println!("count is now {n}"));
///
/// count.set(1);
/// count.update(|n| *n += 1);
/// assert_eq!(count.get(), 2);
///
/// sub.unsubscribe();
/// ```
pub struct Watched<T> {
    inner: Arc<WatchedInner<T>>,
}

impl<T: Clone> Watched<T> {
    /// Create a new watched value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(WatchedInner {
                value: RwLock::new(initial),
                subscribers: Mutex::new(Vec::new()),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().unwrap().clone()
    }

    /// Read the value with a function, without cloning and without
    /// notifying anyone.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let value = self.inner.value.read().unwrap();
        f(&value)
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, new_value: T) {
        *self.inner.value.write().unwrap() = new_value;
        self.notify();
    }

    /// Mutate the value in place and notify every subscriber.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        {
            let mut value = self.inner.value.write().unwrap();
            f(&mut value);
        }
        self.notify();
    }

    /// Subscribe to changes.
    ///
    /// The callback runs synchronously on every [`Watched::set`] or
    /// [`Watched::update`], receiving the full updated value. The returned
    /// [`Subscription`] removes exactly this subscription, leaving every
    /// other one intact.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .push((token, Arc::new(callback)));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut subscribers = inner.subscribers.lock().unwrap();
                subscribers.retain(|(t, _)| *t != token);
            }
        })
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }

    fn notify(&self) {
        let snapshot: Vec<Callback<T>> = {
            let subscribers = self.inner.subscribers.lock().unwrap();
            subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        let value = self.inner.value.read().unwrap().clone();
        for callback in snapshot {
            callback(&value);
        }
    }
}

impl<T> Clone for Watched<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Debug, PartialEq)]
    struct AppState {
        count: usize,
        name: String,
    }

    #[test]
    fn get_set_update() {
        let state = Watched::new(AppState {
            count: 0,
            name: "test".to_string(),
        });

        assert_eq!(state.get().count, 0);

        state.set(AppState {
            count: 42,
            name: "updated".to_string(),
        });
        assert_eq!(state.get().count, 42);

        state.update(|s| s.count += 10);
        assert_eq!(state.get().count, 52);
        assert_eq!(state.read(|s| s.name.clone()), "updated");
    }

    #[test]
    fn notifies_synchronously_with_the_updated_value() {
        let state = Watched::new(AppState {
            count: 0,
            name: "test".to_string(),
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = state.subscribe(move |s: &AppState| {
            seen_clone.lock().unwrap().push(s.count);
        });

        state.update(|s| s.count = 1);
        state.update(|s| s.count = 2);

        // both notifications already delivered, in order, fully merged
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_leaves_other_subscriptions_intact() {
        let state = Watched::new(0);
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_a = calls.clone();
        let first = state.subscribe(move |_: &i32| {
            calls_a.fetch_add(1, Ordering::SeqCst);
        });
        let calls_b = calls.clone();
        let _second = state.subscribe(move |_: &i32| {
            calls_b.fetch_add(1, Ordering::SeqCst);
        });

        first.unsubscribe();
        assert_eq!(state.subscriber_count(), 1);

        state.set(1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_the_value_and_subscribers() {
        let state = Watched::new(0);
        let other = state.clone();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let _sub = other.subscribe(move |_: &i32| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        state.set(7);
        assert_eq!(other.get(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
