//! # Pushcast
//!
//! A web push server: browsers register push subscriptions filed under
//! topics, and notifications are broadcast to every subscriber of a topic
//! (or to everyone). Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pushcast::config::{ServerConfig, VapidConfig};
//! use pushcast::push::WebPushClient;
//! use pushcast::server::{AppState, create_router};
//! use pushcast::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./subscriptions.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(WebPushClient::default()),
//!     VapidConfig::new(public_key, private_key),
//!     ServerConfig::default(),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): builds the `pushcast` binary. Disable with `default-features = false`.

pub mod config;
pub mod error;
pub mod push;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
