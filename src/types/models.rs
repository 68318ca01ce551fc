use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic every subscription falls back to when it names no known topic.
pub const DEFAULT_TOPIC: &str = "general";

/// Broadcast target that selects every subscription regardless of topic.
pub const ALL_TOPICS: &str = "all";

pub const DEFAULT_TOPIC_COLOR: &str = "#e2e3e5";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub endpoint: String,
    #[serde(skip)]
    pub auth_key: String,
    #[serde(skip)]
    pub p256dh_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub subscription_type: String,
    pub created_at: DateTime<Utc>,
}

/// Write model for the subscribe upsert. The topic key must already be resolved.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub endpoint: String,
    pub auth_key: String,
    pub p256dh_key: String,
    pub user_agent: Option<String>,
    pub subscription_type: String,
}

/// Subscription joined with the display fields of its topic.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionWithTopic {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub type_name: Option<String>,
    pub type_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "type_key")]
    pub key: String,
    #[serde(rename = "type_name")]
    pub name: String,
    #[serde(rename = "type_description")]
    pub description: Option<String>,
    #[serde(rename = "type_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Partial topic update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl TopicUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicStats {
    #[serde(rename = "type_key")]
    pub key: String,
    #[serde(rename = "type_name")]
    pub name: String,
    #[serde(rename = "type_color")]
    pub color: String,
    pub subscriber_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStats {
    pub total: i64,
    pub types: Vec<TopicStats>,
}
