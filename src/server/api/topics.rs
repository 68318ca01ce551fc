use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{
    CreateTopicRequest, TopicKeyResponse, TopicListResponse, UpdateTopicRequest,
};
use crate::server::response::{ApiError, StatusResponse};
use crate::service::topics;

pub async fn list_types(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let types = topics::list_topics(state.store.as_ref())?;

    Ok::<_, ApiError>(Json(TopicListResponse { types }))
}

pub async fn create_type(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let topic = topics::create_topic(state.store.as_ref(), req.into())?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(StatusResponse::ok(TopicKeyResponse {
            type_key: topic.key,
        })),
    ))
}

pub async fn update_type(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    payload: Result<Json<UpdateTopicRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;
    let type_key = topics::update_topic(state.store.as_ref(), &key, req.into())?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(TopicKeyResponse { type_key })))
}

pub async fn delete_type(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let type_key = topics::delete_topic(state.store.as_ref(), &key)?;

    Ok::<_, ApiError>(Json(StatusResponse::ok(TopicKeyResponse { type_key })))
}

pub async fn type_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = topics::stats(state.store.as_ref())?;

    Ok::<_, ApiError>(Json(stats))
}
