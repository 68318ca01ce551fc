use std::path::Path;
use std::sync::{Arc, LazyLock};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use pushcast::config::{ServerConfig, VapidConfig};
use pushcast::push::{VapidKeys, WebPushClient};
use pushcast::server::{AppState, create_router};
use pushcast::store::{SqliteStore, Store};

pub const TEST_SUBJECT: &str = "mailto:tests@example.com";

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("pushcast=debug")
            .with_test_writer()
            .try_init();
    }
});

/// The real router, served in-process on a random port.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub vapid: VapidConfig,
    client: reqwest::Client,
    server: JoinHandle<()>,
}

impl TestServer {
    /// Starts a server with the debug routes mounted.
    pub async fn start() -> Self {
        Self::start_with(ServerConfig {
            debug_routes: true,
            ..ServerConfig::default()
        })
        .await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        LazyLock::force(&TRACING);

        let temp_dir = TempDir::new().expect("create temp dir");
        let store =
            SqliteStore::new(temp_dir.path().join("subscriptions.db")).expect("open store");
        store.initialize().expect("initialize store");

        let vapid = VapidKeys::generate().into_config(TEST_SUBJECT);
        let state = Arc::new(AppState::new(
            Arc::new(store),
            Arc::new(WebPushClient::new(config.delivery.ttl)),
            vapid.clone(),
            config,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let app = create_router(state);

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://127.0.0.1:{}", port),
            vapid,
            client: reqwest::Client::new(),
            server,
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.expect("GET");
        Self::read(response).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("POST");
        Self::read(response).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("PUT");
        Self::read(response).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE");
        Self::read(response).await
    }

    /// Subscribes `endpoint` with freshly generated browser keys.
    pub async fn subscribe(&self, endpoint: &str, topic: Option<&str>) -> (StatusCode, Value) {
        let keys = BrowserKeys::generate();
        let mut body = serde_json::json!({
            "endpoint": endpoint,
            "keys": { "auth": keys.auth, "p256dh": keys.p256dh },
        });
        if let Some(topic) = topic {
            body["type"] = Value::from(topic);
        }
        self.post("/api/subscribe", body).await
    }

    async fn read(response: reqwest::Response) -> (StatusCode, Value) {
        let status = response.status();
        let text = response.text().await.expect("read body");
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Key material a browser would hand out with its push subscription.
pub struct BrowserKeys {
    pub p256dh: String,
    pub auth: String,
}

impl BrowserKeys {
    pub fn generate() -> Self {
        let secret = SigningKey::random(&mut OsRng);
        let public = secret.verifying_key().to_encoded_point(false);
        Self {
            p256dh: BASE64URL.encode(public.as_bytes()),
            auth: BASE64URL.encode([7u8; 16]),
        }
    }
}
