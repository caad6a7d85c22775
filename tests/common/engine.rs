//! Scripted decision engines for integration tests.

use async_trait::async_trait;
use authgate::engine::{DecisionEngine, EngineError};
use authgate_model::{AuthorizationDecision, AuthorizationRequest};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An engine that always returns the scripted decision and records what
/// it was asked.
pub struct StaticEngine {
    decision: AuthorizationDecision,
    calls: AtomicUsize,
    last_request: Mutex<Option<AuthorizationRequest>>,
}

impl StaticEngine {
    /// Script the engine's answer.
    pub fn returning(decision: AuthorizationDecision) -> Self {
        Self {
            decision,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// How many times the engine was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The canonical request from the most recent call.
    pub fn last_request(&self) -> Option<AuthorizationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionEngine for StaticEngine {
    async fn evaluate(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.decision.clone())
    }
}

/// An engine whose transport is down.
pub struct UnavailableEngine;

#[async_trait]
impl DecisionEngine for UnavailableEngine {
    async fn evaluate(
        &self,
        _request: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, EngineError> {
        Err(EngineError::Unavailable("connection refused".to_string()))
    }
}
