use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:test@example.com";
pub const DEFAULT_PUSH_TTL: u32 = 86_400;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Directory with the frontend bundle. Unmatched GET paths are served from here.
    pub static_dir: Option<PathBuf>,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Mounts the `/api/debug/*` routes. Never enable this on a public deployment.
    pub debug_routes: bool,
    pub delivery: DeliveryConfig,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            db_path: PathBuf::from("./subscriptions.db"),
            static_dir: None,
            allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
            debug_routes: false,
            delivery: DeliveryConfig::default(),
        }
    }
}

/// Tuning for the broadcast fan-out.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    /// Deliveries in flight at once. 1 keeps delivery strictly sequential.
    pub concurrency: usize,
    /// Seconds the push service should hold an undelivered message.
    pub ttl: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            ttl: DEFAULT_PUSH_TTL,
        }
    }
}

/// VAPID credentials, read once at startup and immutable afterwards.
#[derive(Clone)]
pub struct VapidConfig {
    /// Uncompressed P-256 public key, base64url. Handed to browsers as `applicationServerKey`.
    pub public_key: String,
    /// Raw 32-byte P-256 scalar, base64url.
    pub private_key: String,
    /// The `sub` claim, a `mailto:` or `https:` contact URI.
    pub subject: String,
}

impl VapidConfig {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            subject: DEFAULT_VAPID_SUBJECT.to_string(),
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

impl std::fmt::Debug for VapidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidConfig")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}
