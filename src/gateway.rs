//! Gateway composition: the per-request pipeline.
//!
//! Each inbound request passes through exactly one linear sequence:
//! receive raw → translate (extract principal, resolve resource, map
//! action, build context) → evaluate against the external engine →
//! translate the outcome → emit raw response. No step retries
//! internally.

use crate::adapters::{Outcome, ProtocolAdapter};
use crate::engine::EngineClient;
use tracing::{info, warn};

/// One protocol's full request pipeline over injected collaborators.
///
/// Holds no per-call mutable state; the principal cache inside the
/// adapter's extractor path is the only shared mutable structure, so a
/// gateway is safely callable from any number of concurrent tasks.
pub struct Gateway<A: ProtocolAdapter> {
    adapter: A,
    engine: EngineClient,
}

impl<A: ProtocolAdapter> Gateway<A> {
    /// Compose an adapter with a deadline-wrapped engine client.
    pub fn new(adapter: A, engine: EngineClient) -> Self {
        Self { adapter, engine }
    }

    /// The adapter, for registration and response-only call sites.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Translate, evaluate, and classify one raw request.
    ///
    /// Translation failures reject before evaluation; engine failures
    /// surface as transient errors. A denial is an `Ok` outcome.
    pub async fn process(&self, raw: &A::Raw) -> Outcome {
        let request = self.adapter.translate_request(raw).await.map_err(|e| {
            warn!(code = e.error_code(), error = %e, "request rejected before evaluation");
            e
        })?;

        let decision = self.engine.evaluate(&request).await?;
        info!(
            principal = %request.principal.id,
            resource = %request.resource.id,
            operation = %request.action.operation,
            allowed = decision.allowed,
            policy_id = decision.policy_id.as_deref().unwrap_or(""),
            "authorization decided"
        );
        Ok(decision)
    }

    /// Run the full pipeline and render the protocol-native response.
    pub async fn handle(&self, raw: &A::Raw) -> A::Response {
        let outcome = self.process(raw).await;
        self.adapter.translate_response(&outcome)
    }
}
