//! Operations behind the HTTP surface: subscriptions, topics and broadcast.
//!
//! Everything here works against `&dyn Store` and returns the library
//! [`Error`](crate::error::Error); mapping to HTTP statuses happens in
//! `server::response`.

pub mod broadcast;
pub mod subscriptions;
pub mod topics;
pub mod validation;

pub use broadcast::{BroadcastReport, Broadcaster, Notification};
pub use subscriptions::{SubscribeCommand, SubscribeOutcome};
pub use topics::CreateTopicCommand;
