use serde::{Deserialize, Serialize};

use loginkit_core::Identity;

/// Outcome category of an authentication attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Success,
    /// Generic rejection, for adapters with no finer category to report.
    Failure,
    FailureIdentityNotFound,
    FailureIdentityAmbiguous,
    FailureCredentialInvalid,
    FailureUncategorized,
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Failure => "failure",
            ResultCode::FailureIdentityNotFound => "failure_identity_not_found",
            ResultCode::FailureIdentityAmbiguous => "failure_identity_ambiguous",
            ResultCode::FailureCredentialInvalid => "failure_credential_invalid",
            ResultCode::FailureUncategorized => "failure_uncategorized",
        }
    }
}

impl core::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an authentication attempt: code, identity (on success) and
/// human-readable messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResult {
    code: ResultCode,
    identity: Option<Identity>,
    messages: Vec<String>,
}

impl AuthenticationResult {
    pub fn new(code: ResultCode, identity: Option<Identity>, messages: Vec<String>) -> Self {
        Self {
            code,
            identity,
            messages,
        }
    }

    pub fn success(identity: Identity, message: impl Into<String>) -> Self {
        Self::new(ResultCode::Success, Some(identity), vec![message.into()])
    }

    pub fn failure(code: ResultCode, message: impl Into<String>) -> Self {
        Self::new(code, None, vec![message.into()])
    }

    pub fn is_valid(&self) -> bool {
        self.code.is_success()
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
