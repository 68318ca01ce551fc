mod server;

pub use server::{
    DEFAULT_PUSH_TTL, DEFAULT_VAPID_SUBJECT, DeliveryConfig, ServerConfig, VapidConfig,
};
