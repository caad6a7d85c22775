//! Credential fixtures: token forging and canned collaborator stores.

use async_trait::async_trait;
use authgate::credentials::{ApiKeyRecord, ApiKeyStore, LookupError, TokenResolver};
use authgate_model::Principal;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Signing secret shared by the flow suites.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Forge a compact HS256 token over the given claims.
pub fn forge_token(claims: &serde_json::Value, secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("serializable claims"));
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{header}.{payload}.{signature}")
}

/// An API-key store that counts lookups, for cache assertions.
pub struct CountingKeyStore {
    records: BTreeMap<String, ApiKeyRecord>,
    lookups: AtomicUsize,
}

impl CountingKeyStore {
    /// A store holding the given key → record entries.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, ApiKeyRecord)>,
    {
        Self {
            records: records.into_iter().collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// How many lookups the store served.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiKeyStore for CountingKeyStore {
    async fn lookup(&self, key: &str) -> Result<Option<ApiKeyRecord>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.get(key).cloned())
    }
}

/// A resolver with a fixed token → principal table.
pub struct MapResolver {
    principals: BTreeMap<String, Principal>,
}

impl MapResolver {
    /// A resolver holding the given token → principal entries.
    pub fn with_principals<I>(principals: I) -> Self
    where
        I: IntoIterator<Item = (String, Principal)>,
    {
        Self {
            principals: principals.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TokenResolver for MapResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Principal>, LookupError> {
        Ok(self.principals.get(token).cloned())
    }
}
