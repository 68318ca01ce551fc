pub const SCHEMA: &str = r#"
-- Browser push subscriptions, one row per push endpoint
CREATE TABLE IF NOT EXISTS subscriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    endpoint TEXT NOT NULL UNIQUE,
    auth_key TEXT NOT NULL,
    p256dh_key TEXT NOT NULL,
    user_agent TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Topics subscriptions are filed under; referenced by subscriptions.subscription_type
CREATE TABLE IF NOT EXISTS subscription_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_key TEXT NOT NULL UNIQUE,
    type_name TEXT NOT NULL,
    type_description TEXT,
    type_color TEXT NOT NULL DEFAULT '#e2e3e5',
    created_at TEXT DEFAULT (datetime('now'))
);
"#;

/// Columns added after the first release. Applied with `ALTER TABLE ... ADD COLUMN`
/// when `PRAGMA table_info` does not list them yet.
pub struct ColumnMigration {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

pub const COLUMN_MIGRATIONS: &[ColumnMigration] = &[ColumnMigration {
    table: "subscriptions",
    column: "subscription_type",
    definition: "TEXT NOT NULL DEFAULT 'general'",
}];

// Runs after the column migrations, the index needs subscription_type.
pub const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_subscriptions_type ON subscriptions(subscription_type);
"#;

pub struct SeedTopic {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

pub const SEED_TOPICS: &[SeedTopic] = &[
    SeedTopic {
        key: "general",
        name: "General",
        description: "General announcements",
        color: "#e2e3e5",
    },
    SeedTopic {
        key: "news",
        name: "News",
        description: "News and articles",
        color: "#cce5ff",
    },
    SeedTopic {
        key: "updates",
        name: "Updates",
        description: "Product and release updates",
        color: "#d4edda",
    },
    SeedTopic {
        key: "alerts",
        name: "Alerts",
        description: "Urgent alerts",
        color: "#f8d7da",
    },
];
