//! Runs an adapter and keeps the resulting identity.

use loginkit_core::Identity;

use crate::{Adapter, AdapterError, AuthenticationResult, NonPersistentStorage, Storage};

/// Authentication service over a pluggable identity [`Storage`].
#[derive(Debug, Default)]
pub struct AuthenticationService<S = NonPersistentStorage> {
    storage: S,
}

impl<S: Storage> AuthenticationService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Authenticate through `adapter`.
    ///
    /// Any previous identity is cleared once the adapter has answered; a
    /// valid result's identity replaces it. Adapter errors leave the stored
    /// identity untouched.
    pub fn authenticate(&self, adapter: &dyn Adapter) -> Result<AuthenticationResult, AdapterError> {
        let result = adapter.authenticate()?;

        if self.has_identity() {
            self.clear_identity();
        }

        if let (true, Some(identity)) = (result.is_valid(), result.identity()) {
            self.storage.write(identity.clone());
        }

        Ok(result)
    }

    pub fn has_identity(&self) -> bool {
        !self.storage.is_empty()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.storage.read()
    }

    pub fn clear_identity(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResultCode;
    use loginkit_core::UserId;

    struct Fixed(Result<AuthenticationResult, AdapterError>);

    impl Adapter for Fixed {
        fn authenticate(&self) -> Result<AuthenticationResult, AdapterError> {
            self.0.clone()
        }
    }

    fn ada() -> Identity {
        Identity::new(UserId::new(), "ada@example.com")
    }

    #[test]
    fn success_stores_identity() {
        let auth: AuthenticationService = AuthenticationService::default();
        let identity = ada();

        let result = auth
            .authenticate(&Fixed(Ok(AuthenticationResult::success(identity.clone(), "ok"))))
            .unwrap();

        assert!(result.is_valid());
        assert_eq!(auth.identity(), Some(identity));
    }

    #[test]
    fn failure_clears_previous_identity() {
        let auth: AuthenticationService = AuthenticationService::default();
        auth.storage().write(ada());

        let result = auth
            .authenticate(&Fixed(Ok(AuthenticationResult::failure(
                ResultCode::FailureCredentialInvalid,
                "bad",
            ))))
            .unwrap();

        assert!(!result.is_valid());
        assert!(!auth.has_identity());
    }

    #[test]
    fn adapter_error_propagates_and_keeps_identity() {
        let auth: AuthenticationService = AuthenticationService::default();
        let identity = ada();
        auth.storage().write(identity.clone());

        let err = auth
            .authenticate(&Fixed(Err(AdapterError::store("down"))))
            .unwrap_err();

        assert_eq!(err, AdapterError::store("down"));
        assert_eq!(auth.identity(), Some(identity));
    }

    #[test]
    fn clear_identity_is_idempotent() {
        let auth = AuthenticationService::new(NonPersistentStorage::new());
        auth.clear_identity();
        auth.storage().write(ada());
        auth.clear_identity();
        auth.clear_identity();
        assert!(!auth.has_identity());
    }
}
