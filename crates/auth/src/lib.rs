//! `loginkit-auth` — authentication service, adapter chain and credential
//! verification.
//!
//! This crate is intentionally decoupled from HTTP and from any particular
//! user persistence; stores plug in through [`UserStore`].

pub mod adapter;
pub mod chain;
pub mod credential;
pub mod error;
pub mod result;
pub mod service;
pub mod storage;
pub mod user_store;

pub use adapter::{Adapter, AdapterChainEvent, AdapterOutcome, ChainableAdapter};
pub use chain::{AdapterChain, ChainAttempt};
pub use credential::{CREDENTIAL_PARAM, CredentialAdapter, IDENTITY_PARAM};
pub use error::AdapterError;
pub use result::{AuthenticationResult, ResultCode};
pub use service::AuthenticationService;
pub use storage::{NonPersistentStorage, Storage};
pub use user_store::{InMemoryUserStore, UserRecord, UserStore};
