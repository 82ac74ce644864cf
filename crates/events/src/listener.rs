//! Listener registrations shared by [`EventManager`](crate::EventManager) and
//! [`SharedEventManager`](crate::SharedEventManager).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ListenerError;

/// Event name that matches every event.
pub const WILDCARD: &str = "*";

/// Priority used by `attach`. Higher priorities run first.
pub const DEFAULT_PRIORITY: i32 = 1;

/// A synchronous event callback.
pub type Listener<E> = Arc<dyn Fn(&E) -> Result<(), ListenerError> + Send + Sync>;

/// Token returned on attach; pass it back to detach the listener.
///
/// Handles are issued from a process-wide counter, so they also record
/// registration order across managers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct Registration<E> {
    pub(crate) handle: ListenerHandle,
    pub(crate) event: String,
    pub(crate) priority: i32,
    pub(crate) listener: Listener<E>,
}

impl<E> Registration<E> {
    pub(crate) fn new(event: String, priority: i32, listener: Listener<E>) -> Self {
        Self {
            handle: ListenerHandle::next(),
            event,
            priority,
            listener,
        }
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        self.event == WILDCARD || self.event == name
    }
}

impl<E> Clone for Registration<E> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            event: self.event.clone(),
            priority: self.priority,
            listener: Arc::clone(&self.listener),
        }
    }
}

/// Higher priority first; equal priorities keep registration order.
pub(crate) fn dispatch_order<E>(registrations: &mut [Registration<E>]) {
    registrations.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.handle.cmp(&b.handle)));
}
