use serde::{Deserialize, Serialize};

use crate::service::{BroadcastReport, CreateTopicCommand, Notification, broadcast};
use crate::types::{ALL_TOPICS, SubscriptionWithTopic, Topic, TopicUpdate};

#[derive(Debug, Serialize)]
pub struct VapidPublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionKeys {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub p256dh: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub keys: Option<SubscriptionKeys>,
    #[serde(default, rename = "type")]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    #[serde(rename = "type")]
    pub topic: String,
    pub fallback: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "targetType")]
    pub target_type: Option<String>,
}

impl SendNotificationRequest {
    pub fn into_notification(self) -> Notification {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Notification {
            title: or_default(self.title, broadcast::DEFAULT_TITLE),
            body: or_default(self.body, broadcast::DEFAULT_BODY),
            url: or_default(self.url, broadcast::DEFAULT_URL),
            target: or_default(self.target_type, ALL_TOPICS),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub sent: usize,
    pub failed: usize,
    pub deleted: usize,
    pub total_original: usize,
}

impl From<BroadcastReport> for SendNotificationResponse {
    fn from(report: BroadcastReport) -> Self {
        Self {
            sent: report.sent,
            failed: report.failed,
            deleted: report.deleted,
            total_original: report.total_attempted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub types: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    #[serde(default)]
    pub type_key: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub type_description: Option<String>,
    #[serde(default)]
    pub type_color: Option<String>,
}

impl From<CreateTopicRequest> for CreateTopicCommand {
    fn from(req: CreateTopicRequest) -> Self {
        Self {
            key: req.type_key,
            name: req.type_name,
            description: req.type_description,
            color: req.type_color,
        }
    }
}

/// Partial update. `type_key` may be echoed back by clients but the key itself never changes.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub type_description: Option<String>,
    #[serde(default)]
    pub type_color: Option<String>,
}

impl From<UpdateTopicRequest> for TopicUpdate {
    fn from(req: UpdateTopicRequest) -> Self {
        Self {
            name: req.type_name,
            description: req.type_description,
            color: req.type_color,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopicKeyResponse {
    pub type_key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSubscriptionsParams {
    #[serde(default, rename = "type")]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionListResponse {
    pub total: usize,
    pub subscriptions: Vec<SubscriptionWithTopic>,
}

#[derive(Debug, Serialize)]
pub struct ClearAllResponse {
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_notification_defaults() {
        let req: SendNotificationRequest = serde_json::from_str("{}").unwrap();
        let notification = req.into_notification();
        assert_eq!(notification.title, broadcast::DEFAULT_TITLE);
        assert_eq!(notification.body, broadcast::DEFAULT_BODY);
        assert_eq!(notification.url, "/");
        assert_eq!(notification.target, ALL_TOPICS);
    }

    #[test]
    fn test_send_notification_reads_target_type() {
        let req: SendNotificationRequest =
            serde_json::from_str(r#"{"title": "Hi", "targetType": "promo", "url": "/sale"}"#)
                .unwrap();
        let notification = req.into_notification();
        assert_eq!(notification.title, "Hi");
        assert_eq!(notification.target, "promo");
        assert_eq!(notification.url, "/sale");
    }

    #[test]
    fn test_subscribe_request_shape() {
        let req: SubscribeRequest = serde_json::from_str(
            r#"{"endpoint": "https://push.example.com/1", "keys": {"auth": "a", "p256dh": "p"}, "type": "news"}"#,
        )
        .unwrap();
        assert_eq!(req.topic.as_deref(), Some("news"));
        assert_eq!(req.keys.unwrap().p256dh.as_deref(), Some("p"));
    }

    #[test]
    fn test_report_maps_total_original() {
        let response = SendNotificationResponse::from(BroadcastReport {
            sent: 2,
            failed: 1,
            deleted: 1,
            total_attempted: 4,
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["total_original"], 4);
    }
}
