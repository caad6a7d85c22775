//! HTTP/REST adapter.
//!
//! Maps HTTP concepts onto the canonical model: the `Authorization`
//! header becomes the principal (bearer, API-key, and basic schemes), the
//! URL path becomes the resource, the method becomes the action, and the
//! remaining envelope (origin address, user agent, host, query) becomes
//! the context.

use crate::actions::ActionMapper;
use crate::cache::PrincipalCache;
use crate::credentials::{Credential, CredentialExtractor};
use crate::error::{AuthenticationError, GatewayError};
use crate::registry::ResourceRegistry;
use authgate_model::{
    AttrValue, AuthorizationRequest, Context, Environment, Principal, PrincipalType, Resource,
    ResourceType, Sensitivity, ValidationError,
};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use super::{Outcome, ProtocolAdapter, extract_with_cache};

const X_REQUEST_ID: &str = "x-request-id";
const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// An inbound HTTP request, as handed over by the serving layer.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// URL path, e.g. `/api/users`.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, when the request carried one.
    pub body: Option<serde_json::Value>,
    /// Query parameters.
    pub query: BTreeMap<String, String>,
    /// Peer address.
    pub remote_addr: Option<IpAddr>,
}

/// An outbound HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers; always carries `content-type: application/json`.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: serde_json::Value,
}

/// Registration input for an HTTP endpoint.
///
/// The path doubles as the registry key and may carry a wildcard segment
/// (`/api/admin/*`).
#[derive(Debug, Clone)]
pub struct HttpResourceDescriptor {
    /// Endpoint path or path pattern.
    pub path: String,
    /// Sensitivity classification; defaults to medium.
    pub sensitivity: Option<Sensitivity>,
    /// Owning team.
    pub owner: Option<String>,
    /// Additional managers.
    pub managers: BTreeSet<String>,
}

/// Adapter for HTTP/REST traffic.
pub struct HttpAdapter {
    extractor: Arc<CredentialExtractor>,
    cache: Arc<PrincipalCache>,
    registry: Arc<ResourceRegistry>,
    mapper: ActionMapper,
    environment: Option<Environment>,
    default_principal_type: PrincipalType,
}

impl HttpAdapter {
    /// Build an HTTP adapter over injected collaborators.
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
            environment: None,
            default_principal_type: PrincipalType::Human,
        }
    }

    /// Pin the environment instead of detecting it per request.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Replace the verb table.
    pub fn with_mapper(mut self, mapper: ActionMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Detect the environment from the Host header.
    fn detect_environment(&self, headers: &HeaderMap) -> Environment {
        if let Some(env) = self.environment {
            return env;
        }
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if host.contains("localhost") || host.contains("127.0.0.1") {
            Environment::Dev
        } else if host.contains("staging") {
            Environment::Staging
        } else {
            Environment::Production
        }
    }

    fn build_context(&self, raw: &HttpRequest) -> Context {
        let request_id = raw
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut context = Context::now()
            .with_environment(self.detect_environment(&raw.headers))
            .with_request_id(request_id)
            .with_metadata("protocol", "http")
            .with_metadata("method", raw.method.as_str())
            .with_metadata("path", raw.path.clone());

        if let Some(addr) = raw.remote_addr {
            context = context.with_ip_address(addr.to_string());
        }
        if let Some(ua) = raw.headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
            context = context.with_user_agent(ua);
        }
        if !raw.query.is_empty() {
            let query: BTreeMap<String, AttrValue> = raw
                .query
                .iter()
                .map(|(k, v)| (k.clone(), AttrValue::from(v.as_str())))
                .collect();
            context = context.with_metadata("query_params", AttrValue::Map(query));
        }
        context
    }
}

#[async_trait]
impl ProtocolAdapter for HttpAdapter {
    type Raw = HttpRequest;
    type Response = HttpResponse;
    type Descriptor = HttpResourceDescriptor;

    async fn translate_request(
        &self,
        raw: &Self::Raw,
    ) -> Result<AuthorizationRequest, GatewayError> {
        let principal = self.get_principal(raw).await?;
        let resource = self.registry.resolve(&raw.path, ResourceType::Service);
        let action = self.mapper.map_body(raw.method.as_str(), raw.body.as_ref());
        let context = self.build_context(raw);

        debug!(
            principal = %principal.id,
            resource = %resource.id,
            operation = %action.operation,
            "http request translated"
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
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthenticationError::MissingCredentials)
            .map_err(GatewayError::from)?;
        let header = header.to_str().map_err(|_| {
            GatewayError::from(AuthenticationError::MalformedEncoding(
                "non-ascii authorization header".to_string(),
            ))
        })?;

        let credential = Credential::parse(header).map_err(GatewayError::from)?;
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
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match outcome {
            Err(GatewayError::Transient(e)) => HttpResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                headers,
                body: serde_json::json!({
                    "error": "Internal server error",
                    "message": e.to_string(),
                }),
            },
            Err(GatewayError::Translation(e)) => {
                let status = if e.is_authentication() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::BAD_REQUEST
                };
                HttpResponse {
                    status,
                    headers,
                    body: serde_json::json!({
                        "error": if e.is_authentication() { "Unauthenticated" } else { "Bad request" },
                        "message": e.to_string(),
                    }),
                }
            }
            Ok(decision) if !decision.allowed => HttpResponse {
                status: StatusCode::FORBIDDEN,
                headers,
                body: serde_json::json!({
                    "error": "Access denied",
                    "reason": decision.reason,
                    "policy_id": decision.policy_id,
                }),
            },
            Ok(decision) => {
                if let Some(rl) = decision.constraints.as_ref().and_then(|c| c.rate_limit) {
                    for (name, value) in [
                        (X_RATELIMIT_LIMIT, rl.limit),
                        (X_RATELIMIT_REMAINING, rl.remaining),
                        (X_RATELIMIT_RESET, rl.reset),
                    ] {
                        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
                            headers.insert(name, value);
                        }
                    }
                }
                HttpResponse {
                    status: StatusCode::OK,
                    headers,
                    body: decision
                        .data
                        .clone()
                        .unwrap_or_else(|| serde_json::json!({"status": "success"})),
                }
            }
        }
    }

    fn register_resource(&self, descriptor: Self::Descriptor) -> Result<Resource, ValidationError> {
        if descriptor.path.is_empty() {
            return Err(ValidationError::new("path"));
        }

        let mut builder = Resource::builder(format!("http-{}", descriptor.path))
            .resource_type(ResourceType::Service)
            .name(descriptor.path.clone())
            .sensitivity(descriptor.sensitivity.unwrap_or_default());
        if let Some(owner) = descriptor.owner {
            builder = builder.owner(owner);
        }
        for manager in descriptor.managers {
            builder = builder.manager(manager);
        }
        let resource = builder.build()?;

        self.registry.insert(descriptor.path, resource.clone())?;
        Ok(resource)
    }
}
