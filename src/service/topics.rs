use chrono::Utc;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{DEFAULT_TOPIC, DEFAULT_TOPIC_COLOR, SubscriptionStats, Topic, TopicUpdate};

use super::validation::{non_blank, normalize_topic_key, validate_topic_key, validate_topic_name};

#[derive(Debug, Clone, Default)]
pub struct CreateTopicCommand {
    pub key: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// All topics in creation order.
pub fn list_topics(store: &dyn Store) -> Result<Vec<Topic>> {
    store.list_topics()
}

pub fn create_topic(store: &dyn Store, cmd: CreateTopicCommand) -> Result<Topic> {
    let key = normalize_topic_key(cmd.key.as_deref().unwrap_or_default());
    let name = non_blank(cmd.name).unwrap_or_default();
    if key.is_empty() || name.is_empty() {
        return Err(Error::Validation(
            "type_key and type_name are required".to_string(),
        ));
    }
    validate_topic_key(&key)?;
    validate_topic_name(&name)?;

    if store.get_topic(&key)?.is_some() {
        return Err(Error::Conflict(format!("Type '{key}' already exists")));
    }

    let topic = Topic {
        key,
        name,
        description: non_blank(cmd.description),
        color: non_blank(cmd.color).unwrap_or_else(|| DEFAULT_TOPIC_COLOR.to_string()),
        created_at: Utc::now(),
    };
    store.create_topic(&topic)?;

    tracing::info!("Created type '{}'", topic.key);
    Ok(topic)
}

/// Applies a partial update and returns the normalized key. Unknown keys are
/// reported as `NotFound`.
pub fn update_topic(store: &dyn Store, key: &str, mut update: TopicUpdate) -> Result<String> {
    let key = normalize_topic_key(key);
    if let Some(name) = update.name.take() {
        let name = name.trim().to_string();
        validate_topic_name(&name)?;
        update.name = Some(name);
    }
    update.color = non_blank(update.color);

    if update.is_empty() {
        // Nothing to write, but an unknown key is still an error
        return match store.get_topic(&key)? {
            Some(_) => Ok(key),
            None => Err(Error::NotFound(format!("Type '{key}' not found"))),
        };
    }

    store.update_topic(&key, &update)?;
    tracing::info!("Updated type '{}'", key);
    Ok(key)
}

/// Deletes a topic nobody is subscribed to and returns its normalized key.
pub fn delete_topic(store: &dyn Store, key: &str) -> Result<String> {
    let key = normalize_topic_key(key);
    if key == DEFAULT_TOPIC {
        return Err(Error::Conflict(format!(
            "Type '{DEFAULT_TOPIC}' is the default type and cannot be deleted"
        )));
    }
    if store.get_topic(&key)?.is_none() {
        return Err(Error::NotFound(format!("Type '{key}' not found")));
    }

    let subscribers = store.count_topic_subscriptions(&key)?;
    if subscribers > 0 {
        return Err(Error::Conflict(format!(
            "Type '{key}' still has {subscribers} subscriber(s)"
        )));
    }

    // The store re-checks references in the same statement
    if !store.delete_topic(&key)? {
        return Err(Error::Conflict(format!("Type '{key}' still has subscribers")));
    }

    tracing::info!("Deleted type '{}'", key);
    Ok(key)
}

/// Total subscriptions plus a per-topic breakdown that includes empty topics.
pub fn stats(store: &dyn Store) -> Result<SubscriptionStats> {
    Ok(SubscriptionStats {
        total: store.count_subscriptions()?,
        types: store.topic_stats()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::subscriptions::{SubscribeCommand, subscribe};
    use crate::store::SqliteStore;

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn create(key: &str, name: &str) -> CreateTopicCommand {
        CreateTopicCommand {
            key: Some(key.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn subscribe_to(store: &SqliteStore, endpoint: &str, topic: &str) {
        subscribe(
            store,
            SubscribeCommand {
                endpoint: Some(endpoint.to_string()),
                auth_key: Some("auth".to_string()),
                p256dh_key: Some("p256dh".to_string()),
                topic: Some(topic.to_string()),
                user_agent: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_create_topic_normalizes_key_and_defaults_color() {
        let store = store();
        let topic = create_topic(&store, create("Big Sale", "Big Sale")).unwrap();
        assert_eq!(topic.key, "big_sale");
        assert_eq!(topic.color, DEFAULT_TOPIC_COLOR);
        assert!(topic.description.is_none());

        let keys: Vec<String> = list_topics(&store).unwrap().into_iter().map(|t| t.key).collect();
        assert_eq!(keys.last().map(String::as_str), Some("big_sale"));
    }

    #[test]
    fn test_create_topic_requires_key_and_name() {
        let store = store();
        assert!(matches!(
            create_topic(&store, create("promo", "  ")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            create_topic(&store, CreateTopicCommand::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_create_duplicate_topic_conflicts() {
        let store = store();
        create_topic(&store, create("promo", "Promotions")).unwrap();
        assert!(matches!(
            create_topic(&store, create("PROMO", "Again")),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_update_topic_is_partial() {
        let store = store();
        create_topic(
            &store,
            CreateTopicCommand {
                key: Some("promo".to_string()),
                name: Some("Promotions".to_string()),
                description: Some("Deals".to_string()),
                color: Some("#ff0000".to_string()),
            },
        )
        .unwrap();

        update_topic(
            &store,
            "promo",
            TopicUpdate {
                color: Some("#00ff00".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let topic = store.get_topic("promo").unwrap().unwrap();
        assert_eq!(topic.name, "Promotions");
        assert_eq!(topic.description.as_deref(), Some("Deals"));
        assert_eq!(topic.color, "#00ff00");
    }

    #[test]
    fn test_update_missing_topic_is_not_found() {
        let store = store();
        let update = TopicUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_topic(&store, "ghost", update),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            update_topic(&store, "ghost", TopicUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_topic_with_subscribers_fails() {
        let store = store();
        create_topic(&store, create("promo", "Promotions")).unwrap();
        subscribe_to(&store, "https://push.example.com/1", "promo");

        assert!(matches!(
            delete_topic(&store, "promo"),
            Err(Error::Conflict(_))
        ));

        store.delete_all_subscriptions().unwrap();
        delete_topic(&store, "promo").unwrap();
        assert!(store.get_topic("promo").unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete_normalize_the_key() {
        let store = store();
        let created = create_topic(&store, create("Big Sale", "Big Sale")).unwrap();
        assert_eq!(created.key, "big_sale");

        let key = update_topic(
            &store,
            " Big Sale ",
            TopicUpdate {
                color: Some("#123456".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(key, "big_sale");
        assert_eq!(store.get_topic("big_sale").unwrap().unwrap().color, "#123456");

        assert_eq!(delete_topic(&store, "BIG SALE").unwrap(), "big_sale");
        assert!(store.get_topic("big_sale").unwrap().is_none());
    }

    #[test]
    fn test_delete_default_or_missing_topic() {
        let store = store();
        assert!(matches!(
            delete_topic(&store, DEFAULT_TOPIC),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            delete_topic(&store, "missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_stats_total_matches_breakdown() {
        let store = store();
        create_topic(&store, create("promo", "Promotions")).unwrap();
        subscribe_to(&store, "https://push.example.com/1", "promo");
        subscribe_to(&store, "https://push.example.com/2", "news");
        subscribe_to(&store, "https://push.example.com/3", "unknown");

        let stats = stats(&store).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.types.iter().map(|t| t.subscriber_count).sum::<i64>(),
            stats.total
        );
        let promo = stats.types.iter().find(|t| t.key == "promo").unwrap();
        assert_eq!(promo.subscriber_count, 1);
        let updates = stats.types.iter().find(|t| t.key == "updates").unwrap();
        assert_eq!(updates.subscriber_count, 0);
    }
}
