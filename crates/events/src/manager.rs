//! Synchronous event dispatch.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::subscription::{Subscribers, Subscription};
use crate::listener::{DEFAULT_PRIORITY, ListenerHandle, Registration, dispatch_order};
use crate::{Event, ListenerError, SharedEventManager};

/// Dispatches events to attached listeners, then to channel subscribers.
///
/// ## Ordering
///
/// `trigger` runs every matching listener inline, before it returns:
/// higher priority first, equal priorities in registration order. Listeners
/// attached to a [`SharedEventManager`] under one of this manager's
/// identifiers take part in the same ordering.
///
/// The first listener error stops the trigger; remaining listeners are
/// skipped, subscribers are not notified, and the error is returned as-is.
///
/// ## Identifiers
///
/// Identifiers name *who* fires the events (typically the owning service's
/// type). They only matter for shared listeners.
pub struct EventManager<E> {
    identifiers: RwLock<Vec<String>>,
    listeners: Mutex<Vec<Registration<E>>>,
    shared: RwLock<Option<Arc<SharedEventManager<E>>>>,
    subscribers: Subscribers<E>,
}

impl<E: Event> EventManager<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let manager = Self::new();
        manager.set_identifiers(identifiers);
        manager
    }

    /// Replace the identifiers (duplicates are dropped, order is kept).
    pub fn set_identifiers<I, S>(&self, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = self.identifiers.write().unwrap_or_else(PoisonError::into_inner);
        ids.clear();
        push_unique(&mut ids, identifiers);
    }

    pub fn add_identifiers<I, S>(&self, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = self.identifiers.write().unwrap_or_else(PoisonError::into_inner);
        push_unique(&mut ids, identifiers);
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.identifiers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_shared_manager(&self, shared: Arc<SharedEventManager<E>>) {
        *self.shared.write().unwrap_or_else(PoisonError::into_inner) = Some(shared);
    }

    pub fn shared_manager(&self) -> Option<Arc<SharedEventManager<E>>> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Attach `listener` to `event` (or `*` for every event).
    pub fn attach<F>(&self, event: impl Into<String>, listener: F) -> ListenerHandle
    where
        F: Fn(&E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.attach_with_priority(event, DEFAULT_PRIORITY, listener)
    }

    pub fn attach_with_priority<F>(
        &self,
        event: impl Into<String>,
        priority: i32,
        listener: F,
    ) -> ListenerHandle
    where
        F: Fn(&E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let registration = Registration::new(event.into(), priority, Arc::new(listener));
        let handle = registration.handle;
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
        handle
    }

    /// Returns `false` if the handle was not attached here.
    pub fn detach(&self, handle: ListenerHandle) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|r| r.handle != handle);
        listeners.len() != before
    }

    /// Number of directly attached listeners that `name` would reach.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.matches(name))
            .count()
    }

    /// Run every listener for `event`; returns how many ran.
    pub fn trigger(&self, event: &E) -> Result<usize, ListenerError> {
        let name = event.name();
        let mut matched = self.matching(name);
        dispatch_order(&mut matched);

        tracing::trace!(event = name, listeners = matched.len(), "triggering event");

        for registration in &matched {
            if let Err(err) = (registration.listener)(event) {
                tracing::debug!(event = name, error = %err, "listener aborted event");
                return Err(err);
            }
        }

        self.subscribers.publish(event)?;

        Ok(matched.len())
    }

    /// Receive a copy of every event that triggers successfully from now on.
    pub fn subscribe(&self) -> Subscription<E> {
        self.subscribers.subscribe()
    }

    // Listeners are cloned out so they run without any lock held and may
    // attach/detach themselves.
    fn matching(&self, name: &str) -> Vec<Registration<E>> {
        let mut matched: Vec<Registration<E>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.matches(name))
            .cloned()
            .collect();

        if let Some(shared) = self.shared_manager() {
            matched.extend(shared.matching(&self.identifiers(), name));
        }

        matched
    }
}

fn push_unique<I, S>(ids: &mut Vec<String>, identifiers: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for id in identifiers {
        let id = id.into();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

impl<E> Default for EventManager<E> {
    fn default() -> Self {
        Self {
            identifiers: RwLock::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            shared: RwLock::new(None),
            subscribers: Subscribers::default(),
        }
    }
}

impl<E> core::fmt::Debug for EventManager<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let identifiers = self.identifiers.read().map(|ids| ids.clone()).unwrap_or_default();
        let listeners = self.listeners.lock().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("EventManager")
            .field("identifiers", &identifiers)
            .field("listeners", &listeners)
            .finish_non_exhaustive()
    }
}
