use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::UserId;

/// Raw login data as submitted by the caller (`identity`, `credential`, ...).
///
/// Adapters pick out the keys they understand and ignore the rest.
pub type LoginData = Map<String, Value>;

/// The authenticated principal tracked by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,

    /// The identity value the user logged in with (e-mail or username).
    login: String,
}

impl Identity {
    pub fn new(user_id: UserId, login: impl Into<String>) -> Self {
        Self {
            user_id,
            login: login.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.login, self.user_id)
    }
}
