//! `loginkit-events` — lifecycle event dispatch.
//!
//! Two delivery paths, both synchronous and in-process:
//! - **listeners** run inline on `trigger` and can abort the caller's operation;
//! - **subscriptions** receive a copy of each event over a channel afterwards.

pub mod error;
pub mod event;
pub mod listener;
pub mod manager;
pub mod shared;
pub mod subscription;

pub use error::ListenerError;
pub use event::Event;
pub use listener::{DEFAULT_PRIORITY, Listener, ListenerHandle, WILDCARD};
pub use manager::EventManager;
pub use shared::SharedEventManager;
pub use subscription::Subscription;
