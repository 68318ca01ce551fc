use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

use crate::config::{DEFAULT_PUSH_TTL, VapidConfig};

/// Why a single delivery did not go through.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// 404 or 410 from the push service: the subscription is dead for good.
    #[error("subscription gone (HTTP {status})")]
    Gone { status: u16 },

    /// 403 from the push service, usually a VAPID credential mismatch.
    #[error("forbidden by push service (HTTP 403)")]
    Forbidden,

    #[error("push service rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("push request failed: {0}")]
    Transport(String),

    #[error("failed to encrypt or sign message: {0}")]
    Encoding(String),

    #[error("invalid push endpoint: {0}")]
    InvalidEndpoint(String),
}

impl DeliveryError {
    /// Whether the subscription should be removed from the store.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone { .. })
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 | 410 => Self::Gone { status },
            403 => Self::Forbidden,
            _ => Self::Rejected { status, body },
        }
    }
}

/// One message to one subscription.
#[derive(Debug, Clone, Copy)]
pub struct PushRequest<'a> {
    pub endpoint: &'a str,
    pub auth_key: &'a str,
    pub p256dh_key: &'a str,
    pub payload: &'a [u8],
    /// `aud` claim of the VAPID token, the origin of `endpoint`.
    pub audience: &'a str,
}

#[async_trait]
pub trait PushClient: Send + Sync {
    async fn send(&self, request: &PushRequest<'_>, vapid: &VapidConfig)
    -> Result<(), DeliveryError>;
}

/// Origin (`scheme://host[:port]`) of a push endpoint, used as the VAPID audience.
pub fn audience_for(endpoint: &str) -> Result<String, DeliveryError> {
    let url = Url::parse(endpoint).map_err(|e| DeliveryError::InvalidEndpoint(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DeliveryError::InvalidEndpoint(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(DeliveryError::InvalidEndpoint(
            "endpoint has no origin".to_string(),
        ));
    }
    Ok(origin.ascii_serialization())
}

/// Delivers messages with `web-push` encryption and a shared `reqwest::Client`.
///
/// The client should be built once and reused so connections to the push
/// services are pooled.
#[derive(Debug, Clone)]
pub struct WebPushClient {
    http: reqwest::Client,
    ttl: u32,
}

impl WebPushClient {
    pub fn new(ttl: u32) -> Self {
        Self::with_client(reqwest::Client::new(), ttl)
    }

    pub fn with_client(http: reqwest::Client, ttl: u32) -> Self {
        Self { http, ttl }
    }
}

impl Default for WebPushClient {
    fn default() -> Self {
        Self::new(DEFAULT_PUSH_TTL)
    }
}

#[async_trait]
impl PushClient for WebPushClient {
    async fn send(
        &self,
        request: &PushRequest<'_>,
        vapid: &VapidConfig,
    ) -> Result<(), DeliveryError> {
        let sub_info =
            SubscriptionInfo::new(request.endpoint, request.p256dh_key, request.auth_key);

        let mut sig_builder = VapidSignatureBuilder::from_base64(&vapid.private_key, &sub_info)
            .map_err(|e| DeliveryError::Encoding(format!("invalid VAPID key: {e}")))?;
        sig_builder.add_claim("sub", vapid.subject.as_str());
        sig_builder.add_claim("aud", request.audience);
        let signature = sig_builder
            .build()
            .map_err(|e| DeliveryError::Encoding(format!("failed to sign VAPID token: {e}")))?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, request.payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl);

        let message = builder
            .build()
            .map_err(|e| DeliveryError::Encoding(e.to_string()))?;

        let mut http_request = self
            .http
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            http_request = http_request.header("Urgency", urgency.to_string());
        }

        if let Some(topic) = message.topic {
            http_request = http_request.header("Topic", topic);
        }

        if let Some(push_payload) = message.payload {
            http_request = http_request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            // Carries the `Authorization: vapid t=..., k=...` header
            for (key, value) in &push_payload.crypto_headers {
                http_request = http_request.header(*key, value.as_str());
            }

            http_request = http_request.body(push_payload.content);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::from_status(status, body))
    }
}
