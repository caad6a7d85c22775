//! Protocol adapters: bidirectional translation between raw protocol
//! messages and the canonical model.
//!
//! One adapter exists per protocol and is selected at process wiring
//! time, not per request. Every adapter composes the same four parts —
//! credential extraction (through the principal cache when the scheme is
//! cacheable), resource resolution, action mapping, and a fresh context —
//! and implements the response translation table for its protocol.

mod envelope;
mod http;
mod rpc;

pub use envelope::{
    EnvelopeAdapter, EnvelopeRequest, EnvelopeResourceDescriptor, EnvelopeResponse,
};
pub use http::{HttpAdapter, HttpRequest, HttpResourceDescriptor, HttpResponse};
pub use rpc::{RpcAdapter, RpcRequest, RpcResourceDescriptor, RpcResponse, RpcStatusCode};

use crate::cache::PrincipalCache;
use crate::credentials::{Credential, CredentialExtractor};
use crate::error::GatewayError;
use authgate_model::{
    AuthorizationDecision, AuthorizationRequest, Principal, PrincipalType, Resource,
    ValidationError,
};
use async_trait::async_trait;
use std::sync::Arc;

/// What one pass through the gateway produced: a decision from the
/// engine, or a failure that precludes one.
pub type Outcome = Result<AuthorizationDecision, GatewayError>;

/// The bidirectional translation contract, implemented once per protocol.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// The protocol's inbound request representation.
    type Raw: Send + Sync;
    /// The protocol's outbound response representation.
    type Response;
    /// The protocol's resource-registration input.
    type Descriptor;

    /// Normalize a raw request into the canonical form.
    ///
    /// Fails with a translation error ("reject before evaluation") when
    /// identity, resource, or operation cannot be determined, or with a
    /// transient error when a credential store is unreachable.
    async fn translate_request(
        &self,
        raw: &Self::Raw,
    ) -> Result<AuthorizationRequest, GatewayError>;

    /// Extract (or serve from cache) the principal for a raw request.
    async fn get_principal(&self, raw: &Self::Raw) -> Result<Arc<Principal>, GatewayError>;

    /// Render an outcome in the protocol's native representation.
    ///
    /// Deterministic: a fixed outcome always renders to the same
    /// response.
    fn translate_response(&self, outcome: &Outcome) -> Self::Response;

    /// Validate a protocol-specific descriptor, insert the resulting
    /// resource into the registry, and return it.
    fn register_resource(&self, descriptor: Self::Descriptor) -> Result<Resource, ValidationError>;
}

/// Three-way classification of an outcome, for serving layers that
/// terminate calls themselves (interceptor-style integrations) instead of
/// consuming a rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The request is allowed; run the underlying handler.
    Proceed,
    /// The request is denied by policy; terminate with the protocol's
    /// access-denied representation.
    Deny {
        /// Why the policy denied the request. Never empty.
        reason: String,
        /// Which policy produced the denial.
        policy_id: Option<String>,
    },
    /// Translation or infrastructure failure; terminate with the
    /// protocol's error representation.
    Error {
        /// Diagnostic text.
        message: String,
    },
}

impl Disposition {
    /// Classify an outcome.
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Ok(decision) if decision.allowed => Self::Proceed,
            Ok(decision) => Self::Deny {
                reason: decision.reason.clone(),
                policy_id: decision.policy_id.clone(),
            },
            Err(e) => Self::Error {
                message: e.to_string(),
            },
        }
    }
}

/// Extract a principal for `credential`, going through the cache when the
/// scheme's results may be memoized under `cache_key` (the raw, unparsed
/// credential material).
pub(crate) async fn extract_with_cache(
    extractor: &CredentialExtractor,
    cache: &PrincipalCache,
    cache_key: &str,
    credential: &Credential,
    default_type: PrincipalType,
) -> Result<Arc<Principal>, GatewayError> {
    if extractor.is_cacheable(credential) {
        cache
            .get_or_extract(cache_key, || extractor.extract(credential, default_type))
            .await
            .map_err(GatewayError::from)
    } else {
        let principal = extractor
            .extract(credential, default_type)
            .await
            .map_err(GatewayError::from)?;
        Ok(Arc::new(principal))
    }
}
