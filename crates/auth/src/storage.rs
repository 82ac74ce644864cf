//! Where the authenticated identity lives between requests.

use std::sync::{Mutex, PoisonError};

use loginkit_core::Identity;

/// Identity persistence used by [`AuthenticationService`](crate::AuthenticationService).
pub trait Storage: Send + Sync {
    fn is_empty(&self) -> bool;

    fn read(&self) -> Option<Identity>;

    fn write(&self, identity: Identity);

    /// Clearing an empty storage is a no-op.
    fn clear(&self);
}

/// Storage that only lives as long as the value itself (one request).
#[derive(Debug, Default)]
pub struct NonPersistentStorage {
    identity: Mutex<Option<Identity>>,
}

impl NonPersistentStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for NonPersistentStorage {
    fn is_empty(&self) -> bool {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    fn read(&self) -> Option<Identity> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn write(&self, identity: Identity) {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity);
    }

    fn clear(&self) {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
