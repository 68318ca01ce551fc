mod debug;
mod notifications;
mod subscriptions;
mod topics;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vapid-public-key", get(subscriptions::vapid_public_key))
        .route("/subscribe", post(subscriptions::subscribe))
        .route("/send-notification", post(notifications::send_notification))
        // Topics
        .route("/types", get(topics::list_types).post(topics::create_type))
        .route("/types/stats", get(topics::type_stats))
        .route(
            "/types/{key}",
            put(topics::update_type).delete(topics::delete_type),
        )
}

/// Diagnostic and destructive routes. Only mounted when explicitly enabled.
pub fn debug_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/debug/subscriptions", get(debug::list_subscriptions))
        .route("/debug/clear-all", post(debug::clear_all))
        .route("/debug/reset-db", post(debug::reset_db))
}
