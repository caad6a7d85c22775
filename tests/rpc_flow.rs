//! End-to-end flows through the RPC adapter, including the disposition
//! classification used by interceptor-style serving layers.

mod common;

use authgate::adapters::{
    Disposition, ProtocolAdapter, RpcAdapter, RpcRequest, RpcResourceDescriptor, RpcStatusCode,
};
use authgate::cache::PrincipalCache;
use authgate::config::GatewayConfig;
use authgate::credentials::CredentialExtractor;
use authgate::engine::{DecisionEngine, EngineClient};
use authgate::gateway::Gateway;
use authgate::registry::ResourceRegistry;
use authgate_model::{
    AuthorizationDecision, Constraints, Operation, PrincipalType, Sensitivity,
};
use common::{StaticEngine, TEST_SECRET, UnavailableEngine, forge_token};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn rpc_adapter(registry: Arc<ResourceRegistry>) -> RpcAdapter {
    let config = GatewayConfig::from_toml_str(&format!(
        r#"
        [jwt]
        secret = "{TEST_SECRET}"
        "#
    ))
    .unwrap();
    RpcAdapter::new(
        Arc::new(CredentialExtractor::from_config(&config)),
        Arc::new(PrincipalCache::new()),
        registry,
    )
}

fn gateway_with(adapter: RpcAdapter, engine: Arc<dyn DecisionEngine>) -> Gateway<RpcAdapter> {
    common::init_tracing();
    Gateway::new(adapter, EngineClient::new(engine, Duration::from_secs(1)))
}

fn call(service: &str, method: &str, token: &str) -> RpcRequest {
    RpcRequest {
        service: service.to_string(),
        method: method.to_string(),
        metadata: BTreeMap::from([(
            "authorization".to_string(),
            format!("Bearer {token}"),
        )]),
        message: Some(serde_json::json!({"user_id": "u-7"})),
        peer: Some("10.0.0.9:52110".to_string()),
    }
}

fn service_token() -> String {
    forge_token(&serde_json::json!({"sub": "mesh-client"}), TEST_SECRET)
}

#[tokio::test]
async fn service_call_translates_with_machine_defaults() {
    let engine = Arc::new(StaticEngine::returning(AuthorizationDecision::allow("ok")));
    let gateway = gateway_with(
        rpc_adapter(Arc::new(ResourceRegistry::new())),
        engine.clone(),
    );

    gateway
        .handle(&call("UserService", "GetUser", &service_token()))
        .await;

    let seen = engine.last_request().unwrap();
    assert_eq!(seen.principal.id, "mesh-client");
    // No `type` claim: machine-to-machine calls default to service.
    assert_eq!(seen.principal.principal_type, PrincipalType::Service);
    assert_eq!(seen.resource.id, "rpc-UserService/GetUser");
    // "GetUser" is not a mapped verb; classification fails open.
    assert_eq!(seen.action.operation, Operation::Execute);
    assert_eq!(
        seen.action.parameters.get("user_id").and_then(|v| v.as_str()),
        Some("u-7")
    );
    assert_eq!(
        seen.context.metadata.get("protocol").and_then(|v| v.as_str()),
        Some("rpc")
    );
}

#[tokio::test]
async fn registered_method_carries_its_sensitivity() {
    let registry = Arc::new(ResourceRegistry::new());
    let adapter = rpc_adapter(registry);
    adapter
        .register_resource(RpcResourceDescriptor {
            service: "UserService".to_string(),
            method: "DeleteUser".to_string(),
            sensitivity: Some(Sensitivity::Critical),
            owner: Some("identity-team".to_string()),
        })
        .unwrap();

    let engine = Arc::new(StaticEngine::returning(AuthorizationDecision::allow("ok")));
    let gateway = gateway_with(adapter, engine.clone());
    gateway
        .handle(&call("UserService", "DeleteUser", &service_token()))
        .await;

    let seen = engine.last_request().unwrap();
    assert_eq!(seen.resource.sensitivity, Sensitivity::Critical);
    assert_eq!(seen.resource.owner.as_deref(), Some("identity-team"));
}

#[tokio::test]
async fn denial_maps_to_permission_denied() {
    let engine = Arc::new(StaticEngine::returning(AuthorizationDecision::deny(
        "caller is not in the service mesh allowlist",
        "mesh-7",
    )));
    let gateway = gateway_with(rpc_adapter(Arc::new(ResourceRegistry::new())), engine);

    let response = gateway
        .handle(&call("UserService", "GetUser", &service_token()))
        .await;

    assert_eq!(response.code, RpcStatusCode::PermissionDenied);
    assert!(response.message.contains("not in the service mesh allowlist"));
    assert_eq!(
        response.trailing_metadata.get("policy-id").map(String::as_str),
        Some("mesh-7")
    );
}

#[tokio::test]
async fn disposition_lets_the_serving_layer_abort() {
    let registry = Arc::new(ResourceRegistry::new());

    // Denied: the interceptor should terminate the call itself.
    let gateway = gateway_with(
        rpc_adapter(registry.clone()),
        Arc::new(StaticEngine::returning(AuthorizationDecision::deny(
            "insufficient role",
            "rbac-1",
        ))),
    );
    let outcome = gateway
        .process(&call("UserService", "GetUser", &service_token()))
        .await;
    assert_eq!(
        Disposition::of(&outcome),
        Disposition::Deny {
            reason: "insufficient role".to_string(),
            policy_id: Some("rbac-1".to_string()),
        }
    );

    // Allowed: the interceptor proceeds to the real handler.
    let gateway = gateway_with(
        rpc_adapter(registry.clone()),
        Arc::new(StaticEngine::returning(AuthorizationDecision::allow("ok"))),
    );
    let outcome = gateway
        .process(&call("UserService", "GetUser", &service_token()))
        .await;
    assert_eq!(Disposition::of(&outcome), Disposition::Proceed);

    // Engine down: the interceptor aborts with an internal error.
    let gateway = gateway_with(rpc_adapter(registry), Arc::new(UnavailableEngine));
    let outcome = gateway
        .process(&call("UserService", "GetUser", &service_token()))
        .await;
    assert!(matches!(
        Disposition::of(&outcome),
        Disposition::Error { .. }
    ));
}

#[tokio::test]
async fn rate_limit_constraints_land_in_trailing_metadata() {
    let decision = AuthorizationDecision::allow("within quota")
        .with_constraints(Constraints::rate_limited(100, 1, 60));
    let gateway = gateway_with(
        rpc_adapter(Arc::new(ResourceRegistry::new())),
        Arc::new(StaticEngine::returning(decision)),
    );

    let response = gateway
        .handle(&call("UserService", "GetUser", &service_token()))
        .await;

    assert_eq!(response.code, RpcStatusCode::Ok);
    assert_eq!(
        response.trailing_metadata.get("ratelimit-limit").map(String::as_str),
        Some("100")
    );
    assert_eq!(
        response
            .trailing_metadata
            .get("ratelimit-remaining")
            .map(String::as_str),
        Some("1")
    );
    assert_eq!(
        response.trailing_metadata.get("ratelimit-reset").map(String::as_str),
        Some("60")
    );
}

#[tokio::test]
async fn missing_metadata_token_is_unauthenticated() {
    let gateway = gateway_with(
        rpc_adapter(Arc::new(ResourceRegistry::new())),
        Arc::new(StaticEngine::returning(AuthorizationDecision::allow("ok"))),
    );

    let mut request = call("UserService", "GetUser", &service_token());
    request.metadata.clear();
    let response = gateway.handle(&request).await;

    assert_eq!(response.code, RpcStatusCode::Unauthenticated);
}
