use chrono::{DateTime, Utc};

use loginkit_auth::AuthenticationResult;
use loginkit_core::LoginData;
use loginkit_events::Event;

pub const PRE_LOGIN: &str = "pre.login";
pub const POST_LOGIN: &str = "post.login";
pub const PRE_LOGOUT: &str = "pre.logout";
pub const POST_LOGOUT: &str = "post.logout";

/// Lifecycle events fired by [`LoginService`](crate::LoginService).
#[derive(Debug, Clone, PartialEq)]
pub enum LoginEvent {
    /// Before authentication; carries the raw login data.
    PreLogin {
        data: LoginData,
        occurred_at: DateTime<Utc>,
    },
    /// After authentication; carries the result (successful or not).
    PostLogin {
        result: AuthenticationResult,
        occurred_at: DateTime<Utc>,
    },
    PreLogout {
        occurred_at: DateTime<Utc>,
    },
    PostLogout {
        occurred_at: DateTime<Utc>,
    },
}

impl LoginEvent {
    pub fn pre_login(data: LoginData) -> Self {
        Self::PreLogin {
            data,
            occurred_at: Utc::now(),
        }
    }

    pub fn post_login(result: AuthenticationResult) -> Self {
        Self::PostLogin {
            result,
            occurred_at: Utc::now(),
        }
    }

    pub fn pre_logout() -> Self {
        Self::PreLogout {
            occurred_at: Utc::now(),
        }
    }

    pub fn post_logout() -> Self {
        Self::PostLogout {
            occurred_at: Utc::now(),
        }
    }

    /// Login data, for `pre.login`.
    pub fn data(&self) -> Option<&LoginData> {
        match self {
            Self::PreLogin { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Authentication result, for `post.login`.
    pub fn result(&self) -> Option<&AuthenticationResult> {
        match self {
            Self::PostLogin { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::PreLogin { occurred_at, .. }
            | Self::PostLogin { occurred_at, .. }
            | Self::PreLogout { occurred_at }
            | Self::PostLogout { occurred_at } => *occurred_at,
        }
    }
}

impl Event for LoginEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::PreLogin { .. } => PRE_LOGIN,
            Self::PostLogin { .. } => POST_LOGIN,
            Self::PreLogout { .. } => PRE_LOGOUT,
            Self::PostLogout { .. } => POST_LOGOUT,
        }
    }
}
