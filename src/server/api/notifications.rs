use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{SendNotificationRequest, SendNotificationResponse};
use crate::server::response::{ApiError, StatusResponse};
use crate::service::Broadcaster;

pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let notification = req.into_notification();

    let report = Broadcaster::new(
        state.store.as_ref(),
        state.push_client.as_ref(),
        &state.vapid,
    )
    .with_concurrency(state.config.delivery.concurrency)
    .broadcast(&notification)
    .await?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(SendNotificationResponse::from(
        report,
    ))))
}
