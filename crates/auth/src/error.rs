use thiserror::Error;

/// Failure inside an authentication adapter.
///
/// Rejected credentials are *not* errors; they come back as a non-success
/// [`AuthenticationResult`](crate::AuthenticationResult). An `AdapterError`
/// means the attempt could not be evaluated at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The user store failed or returned unusable data.
    #[error("user store error: {0}")]
    Store(String),

    /// The identity matched more than one user record.
    #[error("identity matches more than one user: {0}")]
    AmbiguousIdentity(String),

    /// A stored credential hash could not be processed.
    #[error("credential hash error: {0}")]
    Hash(String),

    /// The chain was wired inconsistently (e.g. unknown adapter name).
    #[error("adapter misconfigured: {0}")]
    Misconfigured(String),
}

impl AdapterError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn ambiguous_identity(identity: impl Into<String>) -> Self {
        Self::AmbiguousIdentity(identity.into())
    }

    pub fn hash(msg: impl Into<String>) -> Self {
        Self::Hash(msg.into())
    }

    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured(msg.into())
    }
}
