//! `loginkit-core` — shared building blocks for the login workspace.
//!
//! This crate contains **pure** primitives (no IO, no framework wiring):
//! identifiers, the authenticated identity, and module options.

pub mod error;
pub mod id;
pub mod identity;
pub mod options;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use identity::{Identity, LoginData};
pub use options::{IdentityField, ModuleOptions, ModuleOptionsFactory};
