//! `loginkit-login` — login/logout orchestration.
//!
//! [`LoginService`] forwards login data into an adapter chain, runs it through
//! the authentication service, and fires `pre.*`/`post.*` lifecycle events
//! around both operations.

pub mod error;
pub mod event;
pub mod form;
pub mod service;

pub use error::LoginError;
pub use event::LoginEvent;
pub use form::{Form, LoginForm};
pub use service::{LoginService, LoginServiceBuilder};
