//! API-key extraction: opaque key lookup with an offline fallback.

use crate::config::ApiKeyConfig;
use crate::error::AuthenticationError;
use authgate_model::{AttrValue, Principal, PrincipalType};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::{ExtractError, LookupError};

/// Identity attributes resolved for a known API key.
#[derive(Debug, Clone)]
pub struct ApiKeyRecord {
    /// Principal id the key belongs to.
    pub principal_id: String,
    /// Actor kind; keys usually identify services.
    pub principal_type: PrincipalType,
    /// Role attached to the key.
    pub role: Option<String>,
    /// Team memberships attached to the key.
    pub teams: BTreeSet<String>,
    /// Further claims attached to the key.
    pub attributes: BTreeMap<String, AttrValue>,
}

impl ApiKeyRecord {
    /// A minimal service record for `principal_id`.
    pub fn service(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            principal_type: PrincipalType::Service,
            role: None,
            teams: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }
}

/// External API-key store collaborator.
///
/// A missing key is `Ok(None)`; [`LookupError`] is reserved for the store
/// itself being unreachable, which surfaces as a transient failure rather
/// than an authentication rejection.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Resolve identity attributes for an opaque key.
    async fn lookup(&self, key: &str) -> Result<Option<ApiKeyRecord>, LookupError>;
}

/// Resolve an API key through the store, or through the offline prefix
/// fallback when no store is wired.
pub(super) async fn extract(
    store: Option<&dyn ApiKeyStore>,
    config: &ApiKeyConfig,
    key: &str,
) -> Result<Principal, ExtractError> {
    if key.is_empty() {
        return Err(AuthenticationError::MissingCredentials.into());
    }

    if let Some(store) = store {
        let record = store
            .lookup(key)
            .await?
            .ok_or(AuthenticationError::UnknownApiKey)?;
        return principal_from_record(record);
    }

    if !config.offline_fallback {
        warn!("API key presented but no key store is wired and the offline fallback is disabled");
        return Err(AuthenticationError::UnsupportedScheme("apikey".to_string()).into());
    }

    // Offline/minimal mode: identity is synthesized from the key prefix.
    let prefix: String = key.chars().take(config.prefix_len).collect();
    let principal = Principal::builder(format!("api-key-{prefix}"))
        .principal_type(PrincipalType::Service)
        .role("service")
        .attribute("api_key", prefix)
        .build()
        .map_err(|e| AuthenticationError::InvalidToken(e.to_string()))?;
    Ok(principal)
}

fn principal_from_record(record: ApiKeyRecord) -> Result<Principal, ExtractError> {
    let mut builder = Principal::builder(record.principal_id)
        .principal_type(record.principal_type)
        .teams(record.teams)
        .attributes(record.attributes);
    if let Some(role) = record.role {
        builder = builder.role(role);
    }
    builder
        .build()
        .map_err(|e| ExtractError::from(AuthenticationError::InvalidToken(e.to_string())))
}
