mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    /// Creates missing tables and columns and seeds the default topics. Idempotent.
    fn initialize(&self) -> Result<()>;
    /// Drops every table and initializes from scratch.
    fn reset(&self) -> Result<()>;

    // Subscription operations
    fn upsert_subscription(&self, sub: &NewSubscription) -> Result<()>;
    fn get_subscription_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>>;
    fn list_subscriptions(&self, topic: Option<&str>) -> Result<Vec<Subscription>>;
    fn list_subscriptions_with_topics(
        &self,
        topic: Option<&str>,
    ) -> Result<Vec<SubscriptionWithTopic>>;
    fn delete_subscription_by_endpoint(&self, endpoint: &str) -> Result<bool>;
    fn delete_all_subscriptions(&self) -> Result<usize>;
    fn count_subscriptions(&self) -> Result<i64>;
    fn count_topic_subscriptions(&self, key: &str) -> Result<i64>;

    // Topic operations
    fn create_topic(&self, topic: &Topic) -> Result<()>;
    fn get_topic(&self, key: &str) -> Result<Option<Topic>>;
    fn list_topics(&self) -> Result<Vec<Topic>>;
    fn update_topic(&self, key: &str, update: &TopicUpdate) -> Result<()>;
    /// Deletes the topic unless a subscription still references it.
    fn delete_topic(&self, key: &str) -> Result<bool>;
    fn topic_stats(&self) -> Result<Vec<TopicStats>>;
}
