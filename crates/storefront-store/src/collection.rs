//! # Observable Collections
//!
//! A [`Collection`] is an ordered sequence that is only ever replaced as a
//! whole. Readers either take a snapshot or subscribe and get woken on every
//! replacement.
//!
//! ## Subscription Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   replace(vec)  ──►  watch::Sender<Arc<Vec<T>>>                         │
//! │                          │                                              │
//! │            ┌─────────────┼──────────────┐                               │
//! │            ▼             ▼              ▼                               │
//! │      subscribe()    subscribe()     listen(f)                           │
//! │      Receiver       Receiver        f(&[T]) now, then on every change   │
//! │                                                                         │
//! │  Receivers always see the latest contents. A slow reader that misses   │
//! │  intermediate replacements only observes the newest one.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cloning a `Collection` yields another handle to the same contents, so a
//! collection can be created by the UI layer and injected into the store.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shared, whole-replacement observable sequence.
#[derive(Debug)]
pub struct Collection<T> {
    tx: Arc<watch::Sender<Arc<Vec<T>>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::with_contents(Vec::new())
    }
}

impl<T> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding `contents`.
    pub fn with_contents(contents: Vec<T>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(contents));
        Collection { tx: Arc::new(tx) }
    }

    /// Replaces the whole contents and notifies every subscriber.
    pub fn replace(&self, contents: Vec<T>) {
        self.tx.send_replace(Arc::new(contents));
    }

    /// Subscribes to replacements. The receiver starts at the current contents.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.tx.subscribe()
    }

    /// Current contents.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Number of live receivers (including those held by listeners).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Send + Sync + 'static> Collection<T> {
    /// Calls `f` with the current contents right away, then again after
    /// every replacement, until the returned [`Listener`] is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn listen<F>(&self, mut f: F) -> Listener
    where
        F: FnMut(&[T]) + Send + 'static,
    {
        let mut rx = self.subscribe();

        let current = Arc::clone(&rx.borrow_and_update());
        f(&current);

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let current = Arc::clone(&rx.borrow_and_update());
                f(&current);
            }
        });

        Listener { handle }
    }
}

/// Keeps a [`Collection::listen`] callback alive. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Listener {
    handle: JoinHandle<()>,
}

impl Listener {
    /// Unsubscribes explicitly.
    pub fn stop(self) {}
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
