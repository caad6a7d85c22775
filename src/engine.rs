//! Decision-engine boundary.
//!
//! The policy engine is an external collaborator: the core submits one
//! canonical [`AuthorizationRequest`] and receives one
//! [`AuthorizationDecision`] (or a transport failure). No evaluation
//! logic lives here, and no retries either; retry policy belongs to the
//! caller.

use crate::error::TransientError;
use authgate_model::{AuthorizationDecision, AuthorizationRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Transport-level failure reported by an engine implementation.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine rejected the request: {0}")]
    Rejected(String),
}

/// The external policy engine.
///
/// Implementations wrap whatever transport reaches the deployment's
/// engine (in-process library, HTTP client, message bus). They must be
/// cheap to clone behind an `Arc` and safe to call concurrently.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Evaluate one canonical request.
    async fn evaluate(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, EngineError>;
}

/// Deadline-enforcing wrapper around a [`DecisionEngine`].
///
/// The caller-supplied deadline is the only timeout the core imposes;
/// expiry surfaces as [`TransientError::Timeout`], which adapters map to
/// an internal-error representation, never to access-denied.
#[derive(Clone)]
pub struct EngineClient {
    engine: Arc<dyn DecisionEngine>,
    deadline: Duration,
}

impl EngineClient {
    /// Wrap an engine with a call deadline.
    pub fn new(engine: Arc<dyn DecisionEngine>, deadline: Duration) -> Self {
        Self { engine, deadline }
    }

    /// Evaluate with the configured deadline.
    pub async fn evaluate(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, TransientError> {
        let result = tokio::time::timeout(self.deadline, self.engine.evaluate(request)).await;
        match result {
            Ok(Ok(decision)) => {
                debug!(
                    principal = %request.principal.id,
                    resource = %request.resource.id,
                    operation = %request.action.operation,
                    allowed = decision.allowed,
                    "decision received"
                );
                Ok(decision)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "decision engine call failed");
                Err(TransientError::EngineUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(deadline = ?self.deadline, "decision engine call timed out");
                Err(TransientError::Timeout {
                    waited: self.deadline,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_model::{Action, Context, Operation, Principal, Resource};

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            principal: Principal::builder("alice").build().unwrap(),
            resource: Resource::builder("users-api").build().unwrap(),
            action: Action::new(Operation::Read),
            context: Context::now(),
        }
    }

    struct SlowEngine;

    #[async_trait]
    impl DecisionEngine for SlowEngine {
        async fn evaluate(
            &self,
            _request: &AuthorizationRequest,
        ) -> Result<AuthorizationDecision, EngineError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(AuthorizationDecision::allow("late"))
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl DecisionEngine for FailingEngine {
        async fn evaluate(
            &self,
            _request: &AuthorizationRequest,
        ) -> Result<AuthorizationDecision, EngineError> {
            Err(EngineError::Unavailable("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout() {
        let client = EngineClient::new(Arc::new(SlowEngine), Duration::from_millis(50));
        let err = client.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, TransientError::Timeout { .. }));
    }

    #[tokio::test]
    async fn engine_failure_is_unavailable() {
        let client = EngineClient::new(Arc::new(FailingEngine), Duration::from_secs(1));
        let err = client.evaluate(&request()).await.unwrap_err();
        assert!(matches!(err, TransientError::EngineUnavailable(_)));
    }
}
