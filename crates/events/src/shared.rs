//! Identifier-scoped listeners.
//!
//! A listener attached here under an identifier (e.g. "LoginService") reaches
//! every [`EventManager`](crate::EventManager) that carries that identifier and
//! has this shared manager set, without needing a handle on the manager itself.

use std::sync::{Arc, Mutex, PoisonError};

use crate::listener::{DEFAULT_PRIORITY, ListenerHandle, Registration, WILDCARD};
use crate::{Event, ListenerError};

pub struct SharedEventManager<E> {
    registrations: Mutex<Vec<(String, Registration<E>)>>,
}

impl<E: Event> SharedEventManager<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<F>(
        &self,
        identifier: impl Into<String>,
        event: impl Into<String>,
        listener: F,
    ) -> ListenerHandle
    where
        F: Fn(&E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.attach_with_priority(identifier, event, DEFAULT_PRIORITY, listener)
    }

    pub fn attach_with_priority<F>(
        &self,
        identifier: impl Into<String>,
        event: impl Into<String>,
        priority: i32,
        listener: F,
    ) -> ListenerHandle
    where
        F: Fn(&E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let registration = Registration::new(event.into(), priority, Arc::new(listener));
        let handle = registration.handle;
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((identifier.into(), registration));
        handle
    }

    pub fn detach(&self, handle: ListenerHandle) -> bool {
        let mut registrations = self.registrations.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registrations.len();
        registrations.retain(|(_, r)| r.handle != handle);
        registrations.len() != before
    }

    /// Listeners registered for any of `identifiers` (or `*`) and `event`.
    pub(crate) fn matching(&self, identifiers: &[String], event: &str) -> Vec<Registration<E>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, r)| (id == WILDCARD || identifiers.contains(id)) && r.matches(event))
            .map(|(_, r)| r.clone())
            .collect()
    }
}

impl<E> Default for SharedEventManager<E> {
    fn default() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
        }
    }
}

impl<E> core::fmt::Debug for SharedEventManager<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let count = self.registrations.lock().map(|r| r.len()).unwrap_or(0);
        f.debug_struct("SharedEventManager").field("listeners", &count).finish()
    }
}
