use futures_util::{StreamExt, stream};
use serde::Serialize;

use crate::config::VapidConfig;
use crate::error::{Error, Result};
use crate::push::{DeliveryError, PushClient, PushRequest, audience_for};
use crate::store::Store;
use crate::types::{ALL_TOPICS, Subscription};

pub const DEFAULT_TITLE: &str = "Notification";
pub const DEFAULT_BODY: &str = "You have a new notification";
pub const DEFAULT_URL: &str = "/";
pub const ICON: &str = "/icons/icon-192.png";
pub const BADGE: &str = "/icons/badge.png";

/// What to send and to whom.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub url: String,
    /// Topic key, or `"all"` for every subscriber.
    pub target: String,
}

impl Default for Notification {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            url: DEFAULT_URL.to_string(),
            target: ALL_TOPICS.to_string(),
        }
    }
}

/// JSON body the service worker receives.
#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    title: &'a str,
    body: &'a str,
    icon: &'a str,
    badge: &'a str,
    data: PayloadData<'a>,
}

#[derive(Debug, Serialize)]
struct PayloadData<'a> {
    url: &'a str,
}

impl Notification {
    pub fn payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&PushPayload {
            title: &self.title,
            body: &self.body,
            icon: ICON,
            badge: BADGE,
            data: PayloadData { url: &self.url },
        })
        .map_err(|e| Error::Push(format!("failed to encode payload: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
    /// Subscriptions removed because the push service reported them gone.
    pub deleted: usize,
    pub total_attempted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sent,
    Failed,
    Deleted,
}

/// Fans one notification out to the matching subscriptions.
pub struct Broadcaster<'a> {
    store: &'a dyn Store,
    client: &'a dyn PushClient,
    vapid: &'a VapidConfig,
    concurrency: usize,
}

impl<'a> Broadcaster<'a> {
    pub fn new(store: &'a dyn Store, client: &'a dyn PushClient, vapid: &'a VapidConfig) -> Self {
        Self {
            store,
            client,
            vapid,
            concurrency: 1,
        }
    }

    /// Deliveries in flight at once. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn broadcast(&self, notification: &Notification) -> Result<BroadcastReport> {
        let filter = (notification.target != ALL_TOPICS).then_some(notification.target.as_str());
        let candidates = self.store.list_subscriptions(filter)?;
        let payload = notification.payload()?;

        tracing::info!(
            "Broadcasting to {} subscription(s) (target: {})",
            candidates.len(),
            notification.target
        );

        let payload = payload.as_slice();
        let outcomes: Vec<Outcome> = stream::iter(candidates.iter().cloned())
            .map(|sub| async move { self.deliver(&sub, payload).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = BroadcastReport {
            total_attempted: candidates.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Sent => report.sent += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Deleted => report.deleted += 1,
            }
        }

        tracing::info!(
            "Broadcast finished: {} sent, {} failed, {} deleted of {}",
            report.sent,
            report.failed,
            report.deleted,
            report.total_attempted
        );

        Ok(report)
    }

    // Never fails: every error is folded into the outcome so one subscriber
    // cannot stop the others.
    async fn deliver(&self, sub: &Subscription, payload: &[u8]) -> Outcome {
        let audience = match audience_for(&sub.endpoint) {
            Ok(audience) => audience,
            Err(e) => {
                tracing::warn!("Skipping subscription {}: {}", sub.id, e);
                return Outcome::Failed;
            }
        };

        let request = PushRequest {
            endpoint: &sub.endpoint,
            auth_key: &sub.auth_key,
            p256dh_key: &sub.p256dh_key,
            payload,
            audience: &audience,
        };

        match self.client.send(&request, self.vapid).await {
            Ok(()) => {
                tracing::debug!("Delivered to subscription {}", sub.id);
                Outcome::Sent
            }
            Err(e) if e.is_gone() => self.prune(sub, &e),
            Err(DeliveryError::Forbidden) => {
                tracing::warn!(
                    "Push service refused subscription {} (403), check the VAPID keys",
                    sub.id
                );
                Outcome::Failed
            }
            Err(e) => {
                tracing::warn!("Delivery to subscription {} failed: {}", sub.id, e);
                Outcome::Failed
            }
        }
    }

    fn prune(&self, sub: &Subscription, reason: &DeliveryError) -> Outcome {
        match self.store.delete_subscription_by_endpoint(&sub.endpoint) {
            Ok(_) => {
                tracing::info!("Removed expired subscription {} ({})", sub.id, reason);
                Outcome::Deleted
            }
            Err(e) => {
                tracing::error!("Failed to remove expired subscription {}: {}", sub.id, e);
                Outcome::Failed
            }
        }
    }
}
