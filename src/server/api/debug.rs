use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::server::AppState;
use crate::server::dto::{ClearAllResponse, ListSubscriptionsParams, SubscriptionListResponse};
use crate::server::response::{ApiError, StatusResponse};
use crate::service::subscriptions;

pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSubscriptionsParams>,
) -> impl IntoResponse {
    let subscriptions =
        subscriptions::list_subscriptions(state.store.as_ref(), params.topic.as_deref())?;

    Ok::<_, ApiError>(Json(SubscriptionListResponse {
        total: subscriptions.len(),
        subscriptions,
    }))
}

pub async fn clear_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let deleted = subscriptions::clear_all(state.store.as_ref())?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(ClearAllResponse { deleted })))
}

pub async fn reset_db(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    subscriptions::reset_database(state.store.as_ref())?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(json!({}))))
}
