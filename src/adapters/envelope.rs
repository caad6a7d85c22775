//! Adapter for proprietary envelope protocols (sockets, message queues,
//! legacy RPC frameworks).
//!
//! The raw shape is a generic header/payload/metadata envelope: identity
//! comes from a configurable header field resolved through the wired
//! [`TokenResolver`](crate::credentials::TokenResolver), the target
//! resource and operation come from payload fields, and responses use a
//! simple numeric status model.

use crate::actions::ActionMapper;
use crate::cache::PrincipalCache;
use crate::credentials::{Credential, CredentialExtractor};
use crate::error::{AuthenticationError, GatewayError};
use crate::registry::ResourceRegistry;
use authgate_model::{
    AttrValue, AuthorizationRequest, Context, Principal, PrincipalType, Resource, ResourceType,
    Sensitivity, ValidationError,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{Outcome, ProtocolAdapter, extract_with_cache};

const DEFAULT_AUTH_HEADER: &str = "x-auth-token";

/// An inbound envelope request.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeRequest {
    /// Envelope header fields (auth token, request id).
    pub header: BTreeMap<String, String>,
    /// Structured payload; the adapter reads `target_resource`,
    /// `operation`, and `params` from it.
    pub payload: serde_json::Value,
    /// Transport metadata (source address and the like).
    pub metadata: BTreeMap<String, String>,
}

/// An outbound envelope response.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeResponse {
    /// Numeric status, HTTP-flavored for familiarity.
    pub status_code: u16,
    /// Short status text.
    pub status_message: String,
    /// Response payload (denial reasons, error details, engine data).
    pub data: Option<serde_json::Value>,
}

/// Registration input for an envelope-protocol resource.
#[derive(Debug, Clone)]
pub struct EnvelopeResourceDescriptor {
    /// Stable resource identifier.
    pub id: String,
    /// Display name; defaults to the id.
    pub name: Option<String>,
    /// Sensitivity classification; defaults to medium.
    pub sensitivity: Option<Sensitivity>,
    /// Owning team.
    pub owner: Option<String>,
}

/// Adapter for proprietary envelope traffic.
pub struct EnvelopeAdapter {
    extractor: Arc<CredentialExtractor>,
    cache: Arc<PrincipalCache>,
    registry: Arc<ResourceRegistry>,
    mapper: ActionMapper,
    auth_header: String,
    default_principal_type: PrincipalType,
}

impl EnvelopeAdapter {
    /// Build an envelope adapter over injected collaborators.
    pub fn new(
        extractor: Arc<CredentialExtractor>,
        cache: Arc<PrincipalCache>,
        registry: Arc<ResourceRegistry>,
    ) -> Self {
        Self {
            extractor,
            cache,
            registry,
            mapper: ActionMapper::new(),
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            default_principal_type: PrincipalType::Human,
        }
    }

    /// Use a different envelope header field for the auth token.
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    /// Replace the verb table.
    pub fn with_mapper(mut self, mapper: ActionMapper) -> Self {
        self.mapper = mapper;
        self
    }

    fn build_context(&self, raw: &EnvelopeRequest) -> Context {
        let mut context = Context::now().with_metadata("protocol", "custom");
        if let Some(request_id) = raw.header.get("request_id") {
            context = context.with_request_id(request_id.clone());
        }
        if let Some(source_ip) = raw.metadata.get("source_ip") {
            context = context.with_ip_address(source_ip.clone());
        }
        // Preserve the envelope header, minus the credential itself.
        let header: BTreeMap<String, AttrValue> = raw
            .header
            .iter()
            .filter(|(k, _)| *k != &self.auth_header)
            .map(|(k, v)| (k.clone(), AttrValue::from(v.as_str())))
            .collect();
        if !header.is_empty() {
            context = context.with_metadata("envelope_header", AttrValue::Map(header));
        }
        context
    }
}

#[async_trait]
impl ProtocolAdapter for EnvelopeAdapter {
    type Raw = EnvelopeRequest;
    type Response = EnvelopeResponse;
    type Descriptor = EnvelopeResourceDescriptor;

    async fn translate_request(
        &self,
        raw: &Self::Raw,
    ) -> Result<AuthorizationRequest, GatewayError> {
        // Identity first: an unauthenticated request is rejected before
        // the payload is inspected at all.
        let principal = self.get_principal(raw).await?;

        let target = raw
            .payload
            .get("target_resource")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                GatewayError::Translation(crate::error::TranslationError::MissingResource(
                    "payload has no target_resource".to_string(),
                ))
            })?;
        let resource = self.registry.resolve(target, ResourceType::CustomService);

        let operation = raw
            .payload
            .get("operation")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                GatewayError::Translation(crate::error::TranslationError::MissingOperation(
                    "payload has no operation".to_string(),
                ))
            })?;
        let action = self.mapper.map_body(operation, raw.payload.get("params"));

        let context = self.build_context(raw);

        debug!(
            principal = %principal.id,
            resource = %resource.id,
            operation = %action.operation,
            "envelope request translated"
        );

        Ok(AuthorizationRequest {
            principal: (*principal).clone(),
            resource: (*resource).clone(),
            action,
            context,
        })
    }

    async fn get_principal(&self, raw: &Self::Raw) -> Result<Arc<Principal>, GatewayError> {
        let token = raw
            .header
            .get(&self.auth_header)
            .filter(|t| !t.is_empty())
            .ok_or(AuthenticationError::MissingCredentials)
            .map_err(GatewayError::from)?;

        let credential = Credential::CustomToken(token.clone());
        extract_with_cache(
            &self.extractor,
            &self.cache,
            token,
            &credential,
            self.default_principal_type,
        )
        .await
    }

    fn translate_response(&self, outcome: &Outcome) -> Self::Response {
        match outcome {
            Err(GatewayError::Transient(e)) => EnvelopeResponse {
                status_code: 500,
                status_message: "Internal Error".to_string(),
                data: Some(serde_json::json!({"error_details": e.to_string()})),
            },
            Err(GatewayError::Translation(e)) => EnvelopeResponse {
                status_code: if e.is_authentication() { 401 } else { 400 },
                status_message: if e.is_authentication() {
                    "Unauthenticated".to_string()
                } else {
                    "Bad Request".to_string()
                },
                data: Some(serde_json::json!({"error_details": e.to_string()})),
            },
            Ok(decision) if !decision.allowed => EnvelopeResponse {
                status_code: 403,
                status_message: "Access Denied".to_string(),
                data: Some(serde_json::json!({
                    "reason": decision.reason,
                    "policy_id": decision.policy_id,
                })),
            },
            Ok(decision) => {
                let mut data = decision
                    .data
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({}));
                if let Some(rl) = decision.constraints.as_ref().and_then(|c| c.rate_limit) {
                    if let Some(map) = data.as_object_mut() {
                        map.insert(
                            "rate_limit".to_string(),
                            serde_json::json!({
                                "limit": rl.limit,
                                "remaining": rl.remaining,
                                "reset": rl.reset,
                            }),
                        );
                    }
                }
                EnvelopeResponse {
                    status_code: 200,
                    status_message: "Success".to_string(),
                    data: Some(data),
                }
            }
        }
    }

    fn register_resource(&self, descriptor: Self::Descriptor) -> Result<Resource, ValidationError> {
        if descriptor.id.is_empty() {
            return Err(ValidationError::new("id"));
        }

        let mut builder = Resource::builder(descriptor.id.clone())
            .resource_type(ResourceType::CustomService)
            .name(descriptor.name.unwrap_or_else(|| descriptor.id.clone()))
            .sensitivity(descriptor.sensitivity.unwrap_or_default());
        if let Some(owner) = descriptor.owner {
            builder = builder.owner(owner);
        }
        let resource = builder.build()?;

        self.registry.insert(descriptor.id, resource.clone())?;
        Ok(resource)
    }
}
