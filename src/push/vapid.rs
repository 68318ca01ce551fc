//! VAPID key generation and validation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;

use crate::config::VapidConfig;
use crate::error::{Error, Result};

/// VAPID keypair for web push authentication.
///
/// The private key is kept as the raw 32-byte P-256 scalar (base64url), the
/// format `web_push::VapidSignatureBuilder::from_base64` expects. The public
/// key is the uncompressed SEC1 point (65 bytes, base64url).
#[derive(Clone)]
pub struct VapidKeys {
    private_key_b64: String,
    public_key_b64: String,
}

impl VapidKeys {
    /// Generate a fresh VAPID keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        // SEC1 uncompressed public key (65 bytes: 0x04 || x || y)
        let public_bytes = verifying_key.to_encoded_point(false);

        Self {
            private_key_b64: BASE64URL.encode(signing_key.to_bytes()),
            public_key_b64: BASE64URL.encode(public_bytes.as_bytes()),
        }
    }

    /// Reconstruct from base64url-encoded strings, validating both halves.
    pub fn from_base64url(public_key_b64: &str, private_key_b64: &str) -> Result<Self> {
        let public_key_b64 = public_key_b64.trim();
        let private_key_b64 = private_key_b64.trim();

        let pub_bytes = BASE64URL
            .decode(public_key_b64)
            .map_err(|e| Error::Config(format!("invalid base64url for VAPID public key: {e}")))?;
        if pub_bytes.len() != 65 || pub_bytes[0] != 0x04 {
            return Err(Error::Config(
                "VAPID public key must be a 65-byte uncompressed P-256 point".to_string(),
            ));
        }

        let priv_bytes = BASE64URL
            .decode(private_key_b64)
            .map_err(|e| Error::Config(format!("invalid base64url for VAPID private key: {e}")))?;
        if priv_bytes.len() != 32 {
            return Err(Error::Config(format!(
                "VAPID private key must be a 32-byte P-256 scalar, got {} bytes",
                priv_bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(&priv_bytes)
            .map_err(|_| Error::Config("VAPID private key is not a valid P-256 scalar".to_string()))?;

        let derived = signing_key.verifying_key().to_encoded_point(false);
        if derived.as_bytes() != pub_bytes.as_slice() {
            return Err(Error::Config(
                "VAPID public key does not match the private key".to_string(),
            ));
        }

        Ok(Self {
            private_key_b64: private_key_b64.to_string(),
            public_key_b64: public_key_b64.to_string(),
        })
    }

    /// Base64url-encoded uncompressed public key, sent to browsers as `applicationServerKey`.
    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    pub fn private_key_base64url(&self) -> &str {
        &self.private_key_b64
    }

    pub fn into_config(self, subject: impl Into<String>) -> VapidConfig {
        VapidConfig::new(self.public_key_b64, self.private_key_b64).with_subject(subject)
    }
}

impl std::fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key_b64", &self.public_key_b64)
            .finish_non_exhaustive()
    }
}
