//! Synchronous observer registry
//!
//! Views subscribe to a [`Graph`](crate::core::Graph) or
//! [`Node`](crate::core::Node) to be told when it changes. Dispatch is a
//! plain loop over the registered handlers on the caller's thread, in
//! subscription order. Identity is pointer identity of the shared handle,
//! so the same `Arc` must be passed back to unsubscribe.
//!
//! Observers are `Send + Sync`, so a graph can be loaded or saved on a
//! worker thread and handed back with its subscribers intact.

use std::fmt;
use std::sync::Arc;

use super::{CogitoError, Result};

/// A one-method capability interface for anything that wants updates
///
/// Closures taking `&T` implement it directly.
pub trait Observer<T: ?Sized>: Send + Sync {
    /// Called with the subject after it changed
    fn update(&self, subject: &T);
}

impl<T: ?Sized, F> Observer<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    fn update(&self, subject: &T) {
        self(subject)
    }
}

/// Shared handle to an observer, as stored by a registry
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

/// Ordered collection of observers of a subject of type `T`
pub struct Observers<T: ?Sized> {
    handlers: Vec<ObserverRef<T>>,
}

impl<T: ?Sized> Observers<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    fn position(&self, observer: &ObserverRef<T>) -> Option<usize> {
        self.handlers
            .iter()
            .position(|h| std::ptr::addr_eq(Arc::as_ptr(h), Arc::as_ptr(observer)))
    }

    /// Whether `observer` is currently subscribed
    pub fn contains(&self, observer: &ObserverRef<T>) -> bool {
        self.position(observer).is_some()
    }

    /// Add `observer` to the end of the dispatch order
    pub fn subscribe(&mut self, observer: ObserverRef<T>) -> Result<()> {
        if self.contains(&observer) {
            return Err(CogitoError::invalid_state("Observer already subscribed"));
        }
        self.handlers.push(observer);
        Ok(())
    }

    /// Remove `observer`; does nothing if it is not subscribed
    pub fn unsubscribe(&mut self, observer: &ObserverRef<T>) {
        if let Some(index) = self.position(observer) {
            self.handlers.remove(index);
        }
    }

    /// Deliver `subject` to one subscribed observer only
    pub fn notify_one(&self, observer: &ObserverRef<T>, subject: &T) -> Result<()> {
        match self.position(observer) {
            Some(index) => {
                self.handlers[index].update(subject);
                Ok(())
            }
            None => Err(CogitoError::invalid_state("Observer not subscribed")),
        }
    }

    /// Deliver `subject` to every subscribed observer, in subscription order
    pub fn notify_all(&self, subject: &T) {
        for handler in &self.handlers {
            handler.update(subject);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.handlers.len())
            .finish()
    }
}
