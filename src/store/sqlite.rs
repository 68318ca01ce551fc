use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::{COLUMN_MIGRATIONS, INDEXES, SCHEMA, SEED_TOPICS};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    for migration in COLUMN_MIGRATIONS {
        if !has_column(conn, migration.table, migration.column)? {
            tracing::info!(
                "Adding column {}.{} to existing database",
                migration.table,
                migration.column
            );
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                migration.table, migration.column, migration.definition
            ))?;
        }
    }

    conn.execute_batch(INDEXES)?;

    let now = format_datetime(&Utc::now());
    for seed in SEED_TOPICS {
        conn.execute(
            "INSERT OR IGNORE INTO subscription_types (type_key, type_name, type_description, type_color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![seed.key, seed.name, seed.description, seed.color, now],
        )?;
    }
    Ok(())
}

const SUBSCRIPTION_COLUMNS: &str =
    "s.id, s.endpoint, s.auth_key, s.p256dh_key, s.user_agent, s.subscription_type, s.created_at";

// Tables adopted from older versions allow NULL endpoints and keys; such rows
// can never be delivered to and are left out of every read.
const COMPLETE_SUBSCRIPTION: &str =
    "s.endpoint IS NOT NULL AND s.auth_key IS NOT NULL AND s.p256dh_key IS NOT NULL";

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        endpoint: row.get(1)?,
        auth_key: row.get(2)?,
        p256dh_key: row.get(3)?,
        user_agent: row.get(4)?,
        subscription_type: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        key: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        initialize_schema(&self.conn())
    }

    fn reset(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "DROP TABLE IF EXISTS subscriptions;
             DROP TABLE IF EXISTS subscription_types;",
        )?;
        initialize_schema(&conn)
    }

    // Subscription operations

    fn upsert_subscription(&self, sub: &NewSubscription) -> Result<()> {
        self.conn().execute(
            "INSERT INTO subscriptions (endpoint, auth_key, p256dh_key, user_agent, subscription_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(endpoint) DO UPDATE SET
                 auth_key = excluded.auth_key,
                 p256dh_key = excluded.p256dh_key,
                 user_agent = excluded.user_agent,
                 subscription_type = excluded.subscription_type",
            params![
                sub.endpoint,
                sub.auth_key,
                sub.p256dh_key,
                sub.user_agent,
                sub.subscription_type,
                format_datetime(&Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn get_subscription_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions s
                 WHERE s.endpoint = ?1 AND {COMPLETE_SUBSCRIPTION}"
            ),
            params![endpoint],
            subscription_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_subscriptions(&self, topic: Option<&str>) -> Result<Vec<Subscription>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions s
             WHERE (?1 IS NULL OR s.subscription_type = ?1) AND {COMPLETE_SUBSCRIPTION}
             ORDER BY s.id"
        ))?;

        let rows = stmt.query_map(params![topic], subscription_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_subscriptions_with_topics(
        &self,
        topic: Option<&str>,
    ) -> Result<Vec<SubscriptionWithTopic>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS}, t.type_name, t.type_color
             FROM subscriptions s
             LEFT JOIN subscription_types t ON t.type_key = s.subscription_type
             WHERE (?1 IS NULL OR s.subscription_type = ?1) AND {COMPLETE_SUBSCRIPTION}
             ORDER BY s.id"
        ))?;

        let rows = stmt.query_map(params![topic], |row| {
            Ok(SubscriptionWithTopic {
                subscription: subscription_from_row(row)?,
                type_name: row.get(7)?,
                type_color: row.get(8)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_subscription_by_endpoint(&self, endpoint: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM subscriptions WHERE endpoint = ?1",
            params![endpoint],
        )?;
        Ok(rows > 0)
    }

    fn delete_all_subscriptions(&self) -> Result<usize> {
        let rows = self.conn().execute("DELETE FROM subscriptions", [])?;
        Ok(rows)
    }

    fn count_subscriptions(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM subscriptions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_topic_subscriptions(&self, key: &str) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE subscription_type = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Topic operations

    fn create_topic(&self, topic: &Topic) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO subscription_types (type_key, type_name, type_description, type_color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                topic.key,
                topic.name,
                topic.description,
                topic.color,
                format_datetime(&topic.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict(format!("Type '{}' already exists", topic.key)))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_topic(&self, key: &str) -> Result<Option<Topic>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT type_key, type_name, type_description, type_color, created_at
             FROM subscription_types WHERE type_key = ?1",
            params![key],
            topic_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_topics(&self) -> Result<Vec<Topic>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT type_key, type_name, type_description, type_color, created_at
             FROM subscription_types ORDER BY id",
        )?;

        let rows = stmt.query_map([], topic_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_topic(&self, key: &str, update: &TopicUpdate) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE subscription_types SET
                 type_name = COALESCE(?1, type_name),
                 type_description = COALESCE(?2, type_description),
                 type_color = COALESCE(?3, type_color)
             WHERE type_key = ?4",
            params![update.name, update.description, update.color, key],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("Type '{key}' not found")));
        }
        Ok(())
    }

    fn delete_topic(&self, key: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM subscription_types
             WHERE type_key = ?1
               AND NOT EXISTS (SELECT 1 FROM subscriptions WHERE subscription_type = ?1)",
            params![key],
        )?;
        Ok(rows > 0)
    }

    fn topic_stats(&self) -> Result<Vec<TopicStats>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT t.type_key, t.type_name, t.type_color, COUNT(s.id)
             FROM subscription_types t
             LEFT JOIN subscriptions s ON s.subscription_type = t.type_key
             GROUP BY t.id
             ORDER BY t.id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(TopicStats {
                key: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                subscriber_count: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
