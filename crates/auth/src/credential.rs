//! Identity + credential verification against a [`UserStore`].

use std::sync::Arc;

use loginkit_core::{Identity, IdentityField, ModuleOptions};

use crate::{AdapterChainEvent, AdapterError, AdapterOutcome, ChainableAdapter, ResultCode, UserRecord, UserStore};

pub const IDENTITY_PARAM: &str = "identity";
pub const CREDENTIAL_PARAM: &str = "credential";

const IDENTITY_NOT_FOUND: &str = "A record with the supplied identity could not be found.";
const IDENTITY_AMBIGUOUS: &str = "More than one record matches the supplied identity.";
const IDENTITY_NOT_ACTIVE: &str = "A record with the supplied identity is not active.";
const CREDENTIAL_INVALID: &str = "Supplied credential is invalid.";
const AUTHENTICATED: &str = "Authentication successful.";

/// Verifies the `identity`/`credential` params against bcrypt hashes.
///
/// The identity is resolved through `authIdentityFields` in order (e-mail,
/// username). Attempts without both params are left to other adapters.
pub struct CredentialAdapter<U> {
    store: Arc<U>,
    options: Arc<ModuleOptions>,
}

impl<U: UserStore> CredentialAdapter<U> {
    /// Name of this adapter in `authAdapters`.
    pub const NAME: &'static str = "credential";

    pub fn new(store: Arc<U>, options: Arc<ModuleOptions>) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<U> {
        &self.store
    }

    fn lookup(&self, identity: &str) -> Result<Option<UserRecord>, AdapterError> {
        for field in &self.options.auth_identity_fields {
            let found = match field {
                IdentityField::Email => self.store.find_by_email(identity)?,
                IdentityField::Username => self.store.find_by_username(identity)?,
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    fn rehash_if_needed(&self, user: &UserRecord, credential: &str) -> Result<(), AdapterError> {
        let current = hash_cost(&user.password_hash)?;
        if current == self.options.password_cost {
            return Ok(());
        }

        let rehashed = bcrypt::hash(credential, self.options.password_cost)
            .map_err(|e| AdapterError::hash(e.to_string()))?;
        self.store.update_password_hash(user.id, &rehashed)?;

        tracing::info!(
            user_id = %user.id,
            from = current,
            to = self.options.password_cost,
            "credential rehashed"
        );
        Ok(())
    }
}

impl<U: UserStore> ChainableAdapter for CredentialAdapter<U> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn authenticate(&self, event: &mut AdapterChainEvent) -> Result<AdapterOutcome, AdapterError> {
        let (Some(identity), Some(credential)) = (
            event.param_str(IDENTITY_PARAM).map(str::to_owned),
            event.param_str(CREDENTIAL_PARAM).map(str::to_owned),
        ) else {
            return Ok(AdapterOutcome::Continue);
        };

        let found = match self.lookup(&identity) {
            Err(AdapterError::AmbiguousIdentity(_)) => {
                tracing::warn!("identity matches more than one user");
                event.fail(ResultCode::FailureIdentityAmbiguous, IDENTITY_AMBIGUOUS);
                return Ok(AdapterOutcome::Stop);
            }
            other => other?,
        };
        let Some(user) = found else {
            tracing::debug!("identity not found");
            event.fail(ResultCode::FailureIdentityNotFound, IDENTITY_NOT_FOUND);
            return Ok(AdapterOutcome::Stop);
        };

        if !self.options.is_login_state_allowed(user.state) {
            tracing::debug!(user_id = %user.id, state = ?user.state, "login state not allowed");
            event.fail(ResultCode::FailureUncategorized, IDENTITY_NOT_ACTIVE);
            return Ok(AdapterOutcome::Stop);
        }

        let verified = bcrypt::verify(&credential, &user.password_hash)
            .map_err(|e| AdapterError::hash(e.to_string()))?;
        if !verified {
            tracing::debug!(user_id = %user.id, "credential rejected");
            event.fail(ResultCode::FailureCredentialInvalid, CREDENTIAL_INVALID);
            return Ok(AdapterOutcome::Stop);
        }

        self.rehash_if_needed(&user, &credential)?;

        event.succeed(Identity::new(user.id, identity), AUTHENTICATED);
        Ok(AdapterOutcome::Stop)
    }
}

/// Cost factor of a `$2x$NN$...` bcrypt hash.
fn hash_cost(hash: &str) -> Result<u32, AdapterError> {
    hash.split('$')
        .nth(2)
        .and_then(|cost| cost.parse().ok())
        .ok_or_else(|| AdapterError::hash("stored credential is not a bcrypt hash"))
}
