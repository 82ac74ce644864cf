//! Adapter contracts.
//!
//! [`Adapter`] is what the authentication service runs. [`ChainableAdapter`]
//! is one step inside an [`AdapterChain`](crate::AdapterChain): it inspects the
//! shared [`AdapterChainEvent`], may record an outcome on it, and decides
//! whether the chain keeps going.

use loginkit_core::{Identity, LoginData};
use serde_json::Value;

use crate::{AdapterError, AuthenticationResult, ResultCode};

/// An authentication strategy.
pub trait Adapter: Send + Sync {
    fn authenticate(&self) -> Result<AuthenticationResult, AdapterError>;
}

/// Whether the chain should run the next adapter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdapterOutcome {
    Continue,
    Stop,
}

/// One credential-verification method within an adapter chain.
pub trait ChainableAdapter: Send + Sync {
    /// Name used in configuration (`authAdapters`) and logs.
    fn name(&self) -> &str;

    /// Inspect `event.params()` and record an outcome if this attempt is
    /// meant for this adapter. Adapters that do not recognise the params
    /// should return `Continue` without touching the event.
    fn authenticate(&self, event: &mut AdapterChainEvent) -> Result<AdapterOutcome, AdapterError>;

    /// Drop per-attempt state. Called after every chain run.
    fn reset(&self) {}

    /// The current identity is being cleared.
    fn logout(&self) {}
}

/// Mutable state passed along the chain during one attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterChainEvent {
    params: LoginData,
    code: Option<ResultCode>,
    identity: Option<Identity>,
    messages: Vec<String>,
}

impl AdapterChainEvent {
    pub fn new(params: LoginData) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &LoginData {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// A param as a non-empty string.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.param(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn code(&self) -> Option<ResultCode> {
        self.code
    }

    pub fn set_code(&mut self, code: ResultCode) -> &mut Self {
        self.code = Some(code);
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) -> &mut Self {
        self.identity = Some(identity);
        self
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn set_messages(&mut self, messages: Vec<String>) -> &mut Self {
        self.messages = messages;
        self
    }

    /// Record a successful attempt.
    pub fn succeed(&mut self, identity: Identity, message: impl Into<String>) {
        self.code = Some(ResultCode::Success);
        self.identity = Some(identity);
        self.messages = vec![message.into()];
    }

    /// Record a rejected attempt. Clears any identity set earlier.
    pub fn fail(&mut self, code: ResultCode, message: impl Into<String>) {
        self.code = Some(code);
        self.identity = None;
        self.messages = vec![message.into()];
    }

    /// Collapse the event into the result handed back to the caller.
    pub fn into_result(self) -> AuthenticationResult {
        let Self {
            code,
            identity,
            mut messages,
            ..
        } = self;

        match (code, identity) {
            (Some(ResultCode::Success) | None, Some(identity)) => {
                AuthenticationResult::new(ResultCode::Success, Some(identity), messages)
            }
            (Some(ResultCode::Success), None) => AuthenticationResult::failure(
                ResultCode::FailureUncategorized,
                "Authentication reported success without an identity.",
            ),
            (Some(code), _) => AuthenticationResult::new(code, None, messages),
            (None, None) => {
                if messages.is_empty() {
                    messages.push(NO_ADAPTER_ACCEPTED.to_string());
                }
                AuthenticationResult::new(ResultCode::FailureUncategorized, None, messages)
            }
        }
    }
}

pub(crate) const NO_ADAPTER_ACCEPTED: &str = "No authentication adapter accepted the credentials.";

#[cfg(test)]
mod tests {
    use super::*;
    use loginkit_core::UserId;
    use serde_json::json;

    fn params(value: Value) -> LoginData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn param_str_ignores_empty_and_non_string_values() {
        let event = AdapterChainEvent::new(params(json!({
            "identity": "ada@example.com",
            "credential": "",
            "remember": true
        })));

        assert_eq!(event.param_str("identity"), Some("ada@example.com"));
        assert_eq!(event.param_str("credential"), None);
        assert_eq!(event.param_str("remember"), None);
        assert_eq!(event.param("remember"), Some(&json!(true)));
    }

    #[test]
    fn identity_without_code_counts_as_success() {
        let identity = Identity::new(UserId::new(), "ada");
        let mut event = AdapterChainEvent::default();
        event.set_identity(identity.clone());

        let result = event.into_result();

        assert!(result.is_valid());
        assert_eq!(result.identity(), Some(&identity));
    }

    #[test]
    fn untouched_event_is_an_uncategorized_failure() {
        let result = AdapterChainEvent::default().into_result();

        assert_eq!(result.code(), ResultCode::FailureUncategorized);
        assert_eq!(result.messages(), [NO_ADAPTER_ACCEPTED.to_string()]);
    }

    #[test]
    fn success_code_without_identity_is_downgraded() {
        let mut event = AdapterChainEvent::default();
        event.set_code(ResultCode::Success);

        assert!(!event.into_result().is_valid());
    }

    #[test]
    fn failure_drops_identity() {
        let mut event = AdapterChainEvent::default();
        event.succeed(Identity::new(UserId::new(), "ada"), "ok");
        event.fail(ResultCode::FailureCredentialInvalid, "bad");

        let result = event.into_result();

        assert_eq!(result.code(), ResultCode::FailureCredentialInvalid);
        assert!(result.identity().is_none());
        assert_eq!(result.messages(), ["bad".to_string()]);
    }
}
