use thiserror::Error;

use loginkit_auth::AdapterError;
use loginkit_events::ListenerError;

/// Anything that stopped a login/logout from completing.
///
/// Both variants carry the underlying error untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
