use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{DEFAULT_TOPIC, NewSubscription, SubscriptionWithTopic};

use super::validation::{non_blank, normalize_topic_key};

/// Raw subscribe input, as received from the browser.
#[derive(Debug, Clone, Default)]
pub struct SubscribeCommand {
    pub endpoint: Option<String>,
    pub auth_key: Option<String>,
    pub p256dh_key: Option<String>,
    pub topic: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOutcome {
    /// Topic the subscription was stored under.
    pub topic: String,
    /// True when the requested topic did not exist and the default was used instead.
    pub fallback: bool,
}

/// Stores or refreshes a push subscription, keyed by its endpoint.
pub fn subscribe(store: &dyn Store, cmd: SubscribeCommand) -> Result<SubscribeOutcome> {
    let (Some(endpoint), Some(auth_key), Some(p256dh_key)) = (
        non_blank(cmd.endpoint),
        non_blank(cmd.auth_key),
        non_blank(cmd.p256dh_key),
    ) else {
        return Err(Error::Validation(
            "Missing endpoint or subscription keys".to_string(),
        ));
    };

    let (topic, fallback) = match non_blank(cmd.topic) {
        None => (DEFAULT_TOPIC.to_string(), false),
        Some(requested) => {
            let key = normalize_topic_key(&requested);
            if store.get_topic(&key)?.is_some() {
                (key, false)
            } else {
                tracing::warn!(
                    "Unknown type '{}' on subscribe, using '{}'",
                    requested,
                    DEFAULT_TOPIC
                );
                (DEFAULT_TOPIC.to_string(), true)
            }
        }
    };

    store.upsert_subscription(&NewSubscription {
        endpoint,
        auth_key,
        p256dh_key,
        user_agent: non_blank(cmd.user_agent),
        subscription_type: topic.clone(),
    })?;

    tracing::debug!("Stored subscription under type '{}'", topic);

    Ok(SubscribeOutcome { topic, fallback })
}

/// Lists subscriptions with their topic display fields, optionally for one topic.
pub fn list_subscriptions(
    store: &dyn Store,
    topic: Option<&str>,
) -> Result<Vec<SubscriptionWithTopic>> {
    store.list_subscriptions_with_topics(topic)
}

/// Deletes every subscription. Returns how many were removed.
pub fn clear_all(store: &dyn Store) -> Result<usize> {
    let deleted = store.delete_all_subscriptions()?;
    tracing::warn!("Cleared all subscriptions ({} removed)", deleted);
    Ok(deleted)
}

/// Drops and recreates the whole database, including the seeded topics.
pub fn reset_database(store: &dyn Store) -> Result<()> {
    store.reset()?;
    tracing::warn!("Database reset");
    Ok(())
}
