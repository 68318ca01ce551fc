use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{SubscribeRequest, SubscribeResponse, VapidPublicKeyResponse};
use crate::server::response::{ApiError, StatusResponse};
use crate::service::subscriptions;
use crate::service::SubscribeCommand;

pub async fn vapid_public_key(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(VapidPublicKeyResponse {
        public_key: state.vapid.public_key.clone(),
    })
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let keys = req.keys.unwrap_or_default();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = subscriptions::subscribe(
        state.store.as_ref(),
        SubscribeCommand {
            endpoint: req.endpoint,
            auth_key: keys.auth,
            p256dh_key: keys.p256dh,
            topic: req.topic,
            user_agent,
        },
    )?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(SubscribeResponse {
        topic: outcome.topic,
        fallback: outcome.fallback,
    })))
}
