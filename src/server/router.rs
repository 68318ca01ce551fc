use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use super::api::{api_router, debug_router};
use crate::config::{ServerConfig, VapidConfig};
use crate::push::PushClient;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub push_client: Arc<dyn PushClient>,
    pub vapid: VapidConfig,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        push_client: Arc<dyn PushClient>,
        vapid: VapidConfig,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            push_client,
            vapid,
            config,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let mut api = api_router();
    if config.debug_routes {
        tracing::warn!("Debug routes enabled under /api/debug");
        api = api.merge(debug_router());
    }

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api);

    if let Some(static_dir) = &config.static_dir {
        let index = static_dir.join("index.html");
        router = router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(cors_layer(&config.allowed_origins)),
        )
        .with_state(state)
}
