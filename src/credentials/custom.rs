//! Custom-token extraction: pluggable resolution for proprietary schemes.
//!
//! Proprietary protocols carry session ids or bespoke tokens in their own
//! header fields; what those mean is deployment-specific, so resolution
//! is delegated to a [`TokenResolver`] wired at construction time.

use crate::error::AuthenticationError;
use authgate_model::Principal;
use async_trait::async_trait;

use super::{ExtractError, LookupError};

/// External resolver for proprietary tokens and session ids.
///
/// A token the resolver does not recognize is `Ok(None)`; [`LookupError`]
/// is reserved for the resolver's backing store being unreachable.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Resolve a token to the principal it identifies.
    async fn resolve(&self, token: &str) -> Result<Option<Principal>, LookupError>;
}

/// Resolve a custom token through the wired resolver.
pub(super) async fn extract(
    resolver: &dyn TokenResolver,
    token: &str,
) -> Result<Principal, ExtractError> {
    if token.is_empty() {
        return Err(AuthenticationError::MissingCredentials.into());
    }
    resolver
        .resolve(token)
        .await?
        .ok_or_else(|| AuthenticationError::UnknownSession.into())
}
