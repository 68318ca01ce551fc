//! Web push delivery.
//!
//! Payload encryption (RFC 8291, `aes128gcm`) and VAPID signing (RFC 8292) are
//! done by the `web-push` crate; the HTTP request to the push service goes
//! through a shared `reqwest::Client`. The [`PushClient`] trait is the seam the
//! broadcast fan-out talks to, so tests can script delivery outcomes.

mod client;
mod vapid;

pub use client::{DeliveryError, PushClient, PushRequest, WebPushClient, audience_for};
pub use vapid::VapidKeys;
