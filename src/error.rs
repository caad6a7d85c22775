//! Unified error handling for the authorization gateway core.
//!
//! This module provides the error taxonomy every adapter translates from:
//! client-side rejections (validation, authentication, translation) are
//! kept strictly apart from server-side transient failures, and both are
//! distinct from a policy denial, which is a business outcome rather than
//! an error.

use std::time::Duration;
use thiserror::Error;

pub use authgate_model::ValidationError;

// ============================================================================
// Authentication Errors (credential processing)
// ============================================================================

/// Credential material was absent, unparseable, or invalid.
///
/// Always a client-side rejection, translated to the protocol's
/// "unauthenticated" representation. Never an authorization denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("no valid authentication provided")]
    MissingCredentials,

    #[error("unsupported authentication scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("malformed credential encoding: {0}")]
    MalformedEncoding(String),

    #[error("unknown API key")]
    UnknownApiKey,

    #[error("unknown session token")]
    UnknownSession,
}

impl AuthenticationError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
            Self::InvalidToken(_) => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::MalformedEncoding(_) => "malformed_encoding",
            Self::UnknownApiKey => "unknown_api_key",
            Self::UnknownSession => "unknown_session",
        }
    }
}

// ============================================================================
// Translation Errors (request normalization)
// ============================================================================

/// Request translation failed before any policy evaluation took place.
///
/// Callers must treat this as "reject before evaluation": the canonical
/// request was never constructed, so no decision exists and none of these
/// map to the protocol's access-denied representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("could not identify resource: {0}")]
    MissingResource(String),

    #[error("could not identify operation: {0}")]
    MissingOperation(String),
}

impl TranslationError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(e) => e.error_code(),
            Self::Validation(_) => "validation",
            Self::MissingResource(_) => "missing_resource",
            Self::MissingOperation(_) => "missing_operation",
        }
    }

    /// Whether this rejection is an authentication failure, as opposed to
    /// a malformed request. Adapters use this to pick between their
    /// "unauthenticated" and "bad request" representations.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

// ============================================================================
// Transient Errors (collaborator failures)
// ============================================================================

/// A collaborator (decision engine, credential store, registry backend)
/// timed out or was unavailable.
///
/// Server-side and retryable by the caller; maps to the protocol's
/// internal-error representation, never to access-denied. The core itself
/// performs no retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransientError {
    #[error("decision engine timed out after {waited:?}")]
    Timeout {
        /// How long the core waited before giving up.
        waited: Duration,
    },

    #[error("decision engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("credential store unavailable: {0}")]
    LookupUnavailable(String),
}

impl TransientError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "engine_timeout",
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::LookupUnavailable(_) => "lookup_unavailable",
        }
    }
}

// ============================================================================
// Gateway Error (top-level union)
// ============================================================================

/// Everything that can go wrong between receiving a raw request and
/// emitting a raw response, excluding the denial outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Transient(#[from] TransientError),
}

impl GatewayError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Translation(e) => e.error_code(),
            Self::Transient(e) => e.error_code(),
        }
    }
}

impl From<AuthenticationError> for GatewayError {
    fn from(e: AuthenticationError) -> Self {
        Self::Translation(TranslationError::Authentication(e))
    }
}

impl From<ValidationError> for GatewayError {
    fn from(e: ValidationError) -> Self {
        Self::Translation(TranslationError::Validation(e))
    }
}
