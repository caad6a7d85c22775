//! Credential extraction: turning raw authentication material into a
//! [`Principal`].
//!
//! This module is split by auth scheme:
//! - [`jwt`]: bearer-token validation (HS256) and claim mapping
//! - [`api_key`]: opaque key lookup against a pluggable store, with an
//!   offline prefix fallback
//! - [`basic`]: base64 `user:pass` decoding (candidate identity only;
//!   password verification is delegated downstream)
//! - [`custom`]: pluggable resolution for proprietary tokens/session ids
//!
//! [`CredentialExtractor`] owns scheme dispatch: the adapter hands it the
//! raw auth carrier, it recognizes the scheme and runs the matching
//! variant.

mod api_key;
mod basic;
mod custom;
mod jwt;

pub use api_key::{ApiKeyRecord, ApiKeyStore};
pub use custom::TokenResolver;
pub use jwt::JwtValidator;

use crate::config::{ApiKeyConfig, CacheConfig, GatewayConfig};
use crate::error::{AuthenticationError, TransientError};
use authgate_model::{Principal, PrincipalType};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A credential-store lookup failed on the store side.
///
/// Collaborator stores signal infrastructure failure with this; a missing
/// record is `Ok(None)`, not an error.
#[derive(Debug, Clone, Error)]
#[error("credential store lookup failed: {0}")]
pub struct LookupError(pub String);

/// Extraction failure: either the credential is bad (client-side) or a
/// collaborator store was unreachable (server-side).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error(transparent)]
    Transient(#[from] TransientError),
}

impl From<LookupError> for ExtractError {
    fn from(e: LookupError) -> Self {
        Self::Transient(TransientError::LookupUnavailable(e.0))
    }
}

impl From<ExtractError> for crate::error::GatewayError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Authentication(a) => a.into(),
            ExtractError::Transient(t) => Self::Transient(t),
        }
    }
}

/// A parsed raw auth carrier, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Bearer <token>` — a signed JWT.
    Bearer(String),
    /// `ApiKey <key>` — an opaque key resolved by lookup.
    ApiKey(String),
    /// `Basic <blob>` — base64 `user:pass`.
    Basic(String),
    /// A proprietary token or session id from a custom header.
    CustomToken(String),
}

impl Credential {
    /// Recognize the scheme of an `Authorization`-style header value.
    ///
    /// Scheme prefixes are matched ASCII case-insensitively. An empty
    /// value is "no valid authentication provided"; an unrecognized
    /// scheme word is an unsupported scheme.
    pub fn parse(header_value: &str) -> Result<Self, AuthenticationError> {
        let value = header_value.trim();
        if value.is_empty() {
            return Err(AuthenticationError::MissingCredentials);
        }

        for (prefix, build) in [
            ("Bearer ", Credential::Bearer as fn(String) -> Credential),
            ("ApiKey ", Credential::ApiKey),
            ("Basic ", Credential::Basic),
        ] {
            // get() rather than slicing: the value may not be ASCII.
            if let Some(head) = value.get(..prefix.len()) {
                if head.eq_ignore_ascii_case(prefix) && value.len() > prefix.len() {
                    return Ok(build(value[prefix.len()..].trim().to_string()));
                }
            }
        }

        let scheme = value.split_whitespace().next().unwrap_or(value);
        Err(AuthenticationError::UnsupportedScheme(scheme.to_string()))
    }

    /// Short scheme name for logging.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::ApiKey(_) => "apikey",
            Self::Basic(_) => "basic",
            Self::CustomToken(_) => "custom",
        }
    }
}

/// Scheme dispatch over the configured credential variants.
///
/// Built once per deployment and injected into adapters; all state is
/// read-only after construction.
pub struct CredentialExtractor {
    jwt: Option<JwtValidator>,
    api_key_store: Option<Arc<dyn ApiKeyStore>>,
    api_key_config: ApiKeyConfig,
    token_resolver: Option<Arc<dyn TokenResolver>>,
    cache_policy: CacheConfig,
}

impl CredentialExtractor {
    /// Build an extractor from gateway configuration.
    ///
    /// The JWT variant is enabled when a secret is configured; key store
    /// and token resolver are wired separately.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let jwt = if config.jwt.secret.is_empty() {
            None
        } else {
            Some(JwtValidator::from_config(&config.jwt))
        };
        Self {
            jwt,
            api_key_store: None,
            api_key_config: config.api_keys.clone(),
            token_resolver: None,
            cache_policy: config.cache.clone(),
        }
    }

    /// Wire an API-key store collaborator.
    pub fn with_api_key_store(mut self, store: Arc<dyn ApiKeyStore>) -> Self {
        self.api_key_store = Some(store);
        self
    }

    /// Wire a custom-token resolver collaborator.
    pub fn with_token_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.token_resolver = Some(resolver);
        self
    }

    /// Whether principals extracted from this credential may be cached
    /// under their raw material.
    ///
    /// Bearer tokens are cacheable because the raw text embeds the expiry
    /// (a rotated token is a new cache key). Basic-auth candidates are
    /// only cached when explicitly enabled.
    pub fn is_cacheable(&self, credential: &Credential) -> bool {
        if !self.cache_policy.enabled {
            return false;
        }
        match credential {
            Credential::Basic(_) => self.cache_policy.cache_basic,
            _ => true,
        }
    }

    /// Run the matching variant for a parsed credential.
    pub async fn extract(
        &self,
        credential: &Credential,
        default_type: PrincipalType,
    ) -> Result<Principal, ExtractError> {
        let principal = match credential {
            Credential::Bearer(token) => {
                let validator = self.jwt.as_ref().ok_or_else(|| {
                    AuthenticationError::UnsupportedScheme("bearer".to_string())
                })?;
                validator.validate(token, default_type)?
            }
            Credential::ApiKey(key) => {
                api_key::extract(
                    self.api_key_store.as_deref(),
                    &self.api_key_config,
                    key,
                )
                .await?
            }
            Credential::Basic(blob) => basic::extract(blob)?,
            Credential::CustomToken(token) => {
                let resolver = self.token_resolver.as_deref().ok_or_else(|| {
                    AuthenticationError::UnsupportedScheme("custom".to_string())
                })?;
                custom::extract(resolver, token).await?
            }
        };

        debug!(
            scheme = credential.scheme(),
            principal = %principal.id,
            "credential extracted"
        );
        Ok(principal)
    }

    /// Parse an `Authorization`-style header value and extract in one
    /// step.
    pub async fn extract_header(
        &self,
        header_value: &str,
        default_type: PrincipalType,
    ) -> Result<Principal, ExtractError> {
        let credential = Credential::parse(header_value)?;
        self.extract(&credential, default_type).await
    }
}
