//! User lookup for credential verification.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use loginkit_core::UserId;

use crate::AdapterError;

/// A stored user account, as far as authentication is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// bcrypt hash of the credential.
    pub password_hash: String,
    #[serde(default)]
    pub state: Option<i32>,
}

/// Read access to user accounts (plus the one write authentication needs).
pub trait UserStore: Send + Sync {
    /// More than one match is [`AdapterError::AmbiguousIdentity`].
    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AdapterError>;

    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AdapterError>;

    /// Replace a user's credential hash (used when the configured cost changes).
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AdapterError>;
}

/// In-memory user store for tests/dev and small fixed user lists.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of [`UserRecord`]s.
    pub fn from_json_str(raw: &str) -> Result<Self, AdapterError> {
        let users: Vec<UserRecord> = serde_json::from_str(raw)
            .map_err(|e| AdapterError::store(format!("invalid user list: {e}")))?;
        Ok(Self {
            users: RwLock::new(users),
        })
    }

    /// Add a user, replacing any existing record with the same id.
    pub fn insert(&self, user: UserRecord) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.retain(|u| u.id != user.id);
        users.push(user);
    }

    pub fn get(&self, id: UserId) -> Option<UserRecord> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, identity: &str, pred: impl Fn(&UserRecord) -> bool) -> Result<Option<UserRecord>, AdapterError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let mut matches = users.iter().filter(|u| pred(u));
        let found = matches.next().cloned();
        if matches.next().is_some() {
            return Err(AdapterError::ambiguous_identity(identity));
        }
        Ok(found)
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AdapterError> {
        self.find(email, |u| u.email.eq_ignore_ascii_case(email))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AdapterError> {
        self.find(username, |u| u.username.as_deref() == Some(username))
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AdapterError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AdapterError::store(format!("unknown user {id}")))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, username: Option<&str>) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            email: email.to_string(),
            username: username.map(str::to_string),
            display_name: None,
            password_hash: "$2b$04$unused".to_string(),
            state: None,
        }
    }

    #[test]
    fn finds_by_email_case_insensitively_and_by_exact_username() {
        let store = InMemoryUserStore::new();
        let ada = record("ada@example.com", Some("ada"));
        store.insert(ada.clone());

        assert_eq!(store.find_by_email("ADA@example.com").unwrap(), Some(ada.clone()));
        assert_eq!(store.find_by_username("ada").unwrap(), Some(ada));
        assert_eq!(store.find_by_username("ADA").unwrap(), None);
    }

    #[test]
    fn insert_replaces_same_id() {
        let store = InMemoryUserStore::new();
        let mut ada = record("ada@example.com", None);
        store.insert(ada.clone());
        ada.email = "lovelace@example.com".to_string();
        store.insert(ada.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ada.id).unwrap().email, "lovelace@example.com");
    }

    #[test]
    fn duplicate_matches_are_ambiguous() {
        let store = InMemoryUserStore::new();
        store.insert(record("ada@example.com", None));
        store.insert(record("Ada@example.com", None));

        assert_eq!(
            store.find_by_email("ada@example.com"),
            Err(AdapterError::ambiguous_identity("ada@example.com"))
        );
    }

    #[test]
    fn loads_from_json() {
        let id = UserId::new();
        let raw = format!(
            r#"[{{"id": "{id}", "email": "ada@example.com", "password_hash": "$2b$04$x", "state": 1}}]"#
        );

        let store = InMemoryUserStore::from_json_str(&raw).unwrap();

        let user = store.get(id).unwrap();
        assert_eq!(user.state, Some(1));
        assert_eq!(user.username, None);
        assert!(InMemoryUserStore::from_json_str("{}").is_err());
    }

    #[test]
    fn update_password_hash_requires_known_user() {
        let store = InMemoryUserStore::new();
        let ada = record("ada@example.com", None);
        store.insert(ada.clone());

        store.update_password_hash(ada.id, "$2b$05$new").unwrap();
        assert_eq!(store.get(ada.id).unwrap().password_hash, "$2b$05$new");
        assert!(store.update_password_hash(UserId::new(), "x").is_err());
    }
}
