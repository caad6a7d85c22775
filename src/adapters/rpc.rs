//! RPC-style adapter for service/method call protocols.
//!
//! Maps RPC concepts onto the canonical model: the bearer token in call
//! metadata becomes the principal (machine identities by default), the
//! `service/method` pair becomes the resource, and the method name is the
//! verb. The rendered response is a status-code model plus trailing
//! metadata; interceptor-style serving layers can instead classify the
//! outcome with [`Disposition`](super::Disposition) and abort the call
//! themselves.

use crate::actions::ActionMapper;
use crate::cache::PrincipalCache;
use crate::credentials::{Credential, CredentialExtractor};
use crate::error::{AuthenticationError, GatewayError};
use crate::registry::ResourceRegistry;
use authgate_model::{
    AuthorizationRequest, Context, Principal, PrincipalType, Resource, ResourceType, Sensitivity,
    ValidationError,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{Outcome, ProtocolAdapter, extract_with_cache};

const METADATA_AUTHORIZATION: &str = "authorization";
const METADATA_REQUEST_ID: &str = "x-request-id";

/// An inbound RPC call, as handed over by the serving layer.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    /// Fully qualified service name.
    pub service: String,
    /// Method being invoked.
    pub method: String,
    /// Call metadata (lowercase keys, per RPC convention).
    pub metadata: BTreeMap<String, String>,
    /// The request message as structured data, when available.
    pub message: Option<serde_json::Value>,
    /// Peer address string.
    pub peer: Option<String>,
}

/// RPC status codes the adapter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatusCode {
    /// Call may proceed / succeeded.
    Ok,
    /// Request translation failed on malformed input.
    InvalidArgument,
    /// Credential material absent or invalid.
    Unauthenticated,
    /// Denied by policy.
    PermissionDenied,
    /// Infrastructure failure.
    Internal,
}

/// An outbound RPC termination.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    /// Status code for the call.
    pub code: RpcStatusCode,
    /// Status message (reason text for denials, diagnostic for errors).
    pub message: String,
    /// Trailing metadata: policy id, rate-limit entries.
    pub trailing_metadata: BTreeMap<String, String>,
    /// Response payload passthrough for allowed calls.
    pub data: Option<serde_json::Value>,
}

/// Registration input for an RPC method.
#[derive(Debug, Clone)]
pub struct RpcResourceDescriptor {
    /// Fully qualified service name.
    pub service: String,
    /// Method name.
    pub method: String,
    /// Sensitivity classification; defaults to medium.
    pub sensitivity: Option<Sensitivity>,
    /// Owning team.
    pub owner: Option<String>,
}

/// Adapter for RPC-style traffic.
pub struct RpcAdapter {
    extractor: Arc<CredentialExtractor>,
    cache: Arc<PrincipalCache>,
    registry: Arc<ResourceRegistry>,
    mapper: ActionMapper,
    default_principal_type: PrincipalType,
}

/// Registry key for a service/method pair.
fn resource_key(service: &str, method: &str) -> String {
    format!("rpc-{service}/{method}")
}

impl RpcAdapter {
    /// Build an RPC adapter over injected collaborators.
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
            default_principal_type: PrincipalType::Service,
        }
    }

    /// Replace the verb table.
    pub fn with_mapper(mut self, mapper: ActionMapper) -> Self {
        self.mapper = mapper;
        self
    }

    fn build_context(&self, raw: &RpcRequest) -> Context {
        let request_id = raw
            .metadata
            .get(METADATA_REQUEST_ID)
            .cloned()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut context = Context::now()
            .with_request_id(request_id)
            .with_metadata("protocol", "rpc")
            .with_metadata("service", raw.service.clone())
            .with_metadata("method", raw.method.clone());
        if let Some(peer) = &raw.peer {
            context = context.with_ip_address(peer.clone());
        }
        context
    }
}

#[async_trait]
impl ProtocolAdapter for RpcAdapter {
    type Raw = RpcRequest;
    type Response = RpcResponse;
    type Descriptor = RpcResourceDescriptor;

    async fn translate_request(
        &self,
        raw: &Self::Raw,
    ) -> Result<AuthorizationRequest, GatewayError> {
        let principal = self.get_principal(raw).await?;
        let key = resource_key(&raw.service, &raw.method);
        let resource = self.registry.resolve(&key, ResourceType::Service);
        let action = self.mapper.map_body(&raw.method, raw.message.as_ref());
        let context = self.build_context(raw);

        debug!(
            principal = %principal.id,
            resource = %resource.id,
            operation = %action.operation,
            "rpc request translated"
        );

        Ok(AuthorizationRequest {
            principal: (*principal).clone(),
            resource: (*resource).clone(),
            action,
            context,
        })
    }

    async fn get_principal(&self, raw: &Self::Raw) -> Result<Arc<Principal>, GatewayError> {
        let header = raw
            .metadata
            .get(METADATA_AUTHORIZATION)
            .ok_or(AuthenticationError::MissingCredentials)
            .map_err(GatewayError::from)?;

        let credential = Credential::parse(header).map_err(GatewayError::from)?;
        // Machine-to-machine calls authenticate with bearer tokens only.
        if !matches!(credential, Credential::Bearer(_)) {
            return Err(GatewayError::from(AuthenticationError::UnsupportedScheme(
                credential.scheme().to_string(),
            )));
        }

        extract_with_cache(
            &self.extractor,
            &self.cache,
            header,
            &credential,
            self.default_principal_type,
        )
        .await
    }

    fn translate_response(&self, outcome: &Outcome) -> Self::Response {
        match outcome {
            Err(GatewayError::Transient(e)) => RpcResponse {
                code: RpcStatusCode::Internal,
                message: format!("Internal server error: {e}"),
                trailing_metadata: BTreeMap::new(),
                data: None,
            },
            Err(GatewayError::Translation(e)) => RpcResponse {
                code: if e.is_authentication() {
                    RpcStatusCode::Unauthenticated
                } else {
                    RpcStatusCode::InvalidArgument
                },
                message: e.to_string(),
                trailing_metadata: BTreeMap::new(),
                data: None,
            },
            Ok(decision) if !decision.allowed => {
                let mut trailing_metadata = BTreeMap::new();
                if let Some(policy_id) = &decision.policy_id {
                    trailing_metadata.insert("policy-id".to_string(), policy_id.clone());
                }
                RpcResponse {
                    code: RpcStatusCode::PermissionDenied,
                    message: format!("Access denied: {}", decision.reason),
                    trailing_metadata,
                    data: None,
                }
            }
            Ok(decision) => {
                let mut trailing_metadata = BTreeMap::new();
                if let Some(rl) = decision.constraints.as_ref().and_then(|c| c.rate_limit) {
                    trailing_metadata.insert("ratelimit-limit".to_string(), rl.limit.to_string());
                    trailing_metadata
                        .insert("ratelimit-remaining".to_string(), rl.remaining.to_string());
                    trailing_metadata.insert("ratelimit-reset".to_string(), rl.reset.to_string());
                }
                RpcResponse {
                    code: RpcStatusCode::Ok,
                    message: String::new(),
                    trailing_metadata,
                    data: decision.data.clone(),
                }
            }
        }
    }

    fn register_resource(&self, descriptor: Self::Descriptor) -> Result<Resource, ValidationError> {
        if descriptor.service.is_empty() {
            return Err(ValidationError::new("service"));
        }
        if descriptor.method.is_empty() {
            return Err(ValidationError::new("method"));
        }

        let key = resource_key(&descriptor.service, &descriptor.method);
        let mut builder = Resource::builder(key.clone())
            .resource_type(ResourceType::Service)
            .name(format!("{}/{}", descriptor.service, descriptor.method))
            .sensitivity(descriptor.sensitivity.unwrap_or_default());
        if let Some(owner) = descriptor.owner {
            builder = builder.owner(owner);
        }
        let resource = builder.build()?;

        self.registry.insert(key, resource.clone())?;
        Ok(resource)
    }
}
