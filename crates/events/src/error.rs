use thiserror::Error;

/// Failure raised by a listener (or by the dispatch machinery itself).
///
/// A listener error stops the trigger and is handed back to whoever fired
/// the event, unmodified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    #[error("listener failed: {0}")]
    Failed(String),

    /// Notification fan-out failed due to internal lock poisoning.
    #[error("event subscriptions unavailable (lock poisoned)")]
    Poisoned,
}

impl ListenerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
