//! KuCoin API credentials and request signing.
//!
//! # Authentication
//!
//! KuCoin uses HMAC-SHA256 signing with Base64 encoding:
//! - Sign string: timestamp + method + requestPath + body
//! - Headers: KC-API-KEY, KC-API-SIGN, KC-API-TIMESTAMP, KC-API-PASSPHRASE
//! - KC-API-KEY-VERSION: "2" (passphrase is HMAC-SHA256 hashed)
//!
//! The timestamp placed in the sign string is the exchange's own server
//! time; see [`crate::client::KucoinRestClient::signed_headers`].

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::error::{KucoinError, Result};

/// Builds the exact byte sequence that gets signed for a request.
///
/// The method must already be upper-cased and `request_path` must include
/// the query string exactly as it will appear on the wire.
pub fn prehash(timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
    format!("{}{}{}{}", timestamp, method, request_path, body)
}

/// KuCoin API credentials.
///
/// Constructed once by the caller and handed to the client; nothing in this
/// crate reads credentials from the environment. The secret and passphrase
/// are kept private and redacted from `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    api_secret: String,
    api_passphrase: String,
    pub key_version: String,
    hashed_passphrase: String,
}

impl Credentials {
    /// Creates credentials for a version-2 API key.
    ///
    /// The passphrase is hashed eagerly with HMAC-SHA256, as required for
    /// the `KC-API-PASSPHRASE` header of version-2 keys.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        api_passphrase: impl Into<String>,
    ) -> Self {
        let api_secret = api_secret.into();
        let api_passphrase = api_passphrase.into();

        let mut mac = Hmac::<Sha256>::new_from_slice(api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(api_passphrase.as_bytes());
        let hashed_passphrase =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        Self {
            api_key: api_key.into(),
            api_secret,
            api_passphrase,
            key_version: "2".to_string(),
            hashed_passphrase,
        }
    }

    /// Overrides the `KC-API-KEY-VERSION` value sent with every request.
    pub fn with_key_version(mut self, version: impl Into<String>) -> Self {
        self.key_version = version.into();
        self
    }

    /// The HMAC-hashed passphrase sent as `KC-API-PASSPHRASE`.
    ///
    /// Depends only on the secret and passphrase, never on the request
    /// being signed.
    pub fn encrypted_passphrase(&self) -> &str {
        &self.hashed_passphrase
    }

    /// Signs a request using HMAC-SHA256.
    ///
    /// Sign string format: timestamp + method + requestPath + body, with
    /// the method upper-cased by the caller.
    pub fn sign(&self, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        let sign_str = prehash(timestamp, method, request_path, body);

        let mut mac = Hmac::<Sha256>::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(sign_str.as_bytes());

        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Checks that every credential field is present before any network
    /// call is made on its behalf.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(KucoinError::InvalidCredentials { field: "api_key" });
        }
        if self.api_secret.is_empty() {
            return Err(KucoinError::InvalidCredentials { field: "api_secret" });
        }
        if self.api_passphrase.is_empty() {
            return Err(KucoinError::InvalidCredentials {
                field: "api_passphrase",
            });
        }
        if self.key_version.is_empty() {
            return Err(KucoinError::InvalidCredentials {
                field: "key_version",
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_passphrase", &"<redacted>")
            .field("key_version", &self.key_version)
            .finish()
    }
}
