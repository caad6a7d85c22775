//! The decision engine's answer, consumed and translated by adapters.

use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rate-limit constraint issued alongside an allow decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests permitted per window.
    pub limit: u64,
    /// Requests remaining in the current window.
    pub remaining: u64,
    /// Seconds until the window resets.
    pub reset: u64,
}

/// Constraints the caller must honor when acting on an allow decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Rate-limit metadata, propagated into protocol-appropriate fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    /// Engine-specific constraints the core passes through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttrValue>,
}

impl Constraints {
    /// Constraints carrying only a rate limit.
    pub fn rate_limited(limit: u64, remaining: u64, reset: u64) -> Self {
        Self {
            rate_limit: Some(RateLimit {
                limit,
                remaining,
                reset,
            }),
            extra: BTreeMap::new(),
        }
    }
}

/// The decision engine's allow/deny answer.
///
/// Produced only by the external engine; the normalization core consumes
/// and translates it, never fabricates one. A denial is a business
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Human-readable explanation. Never empty for denials.
    pub reason: String,
    /// Identifier of the policy that produced the decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Constraints the caller must honor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// Optional payload for the caller (pre-fetched data, hints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AuthorizationDecision {
    /// An allow decision with the given reason.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            policy_id: None,
            constraints: None,
            data: None,
        }
    }

    /// A deny decision carrying its reason and originating policy.
    ///
    /// An empty reason is replaced with a generic one: denial responses
    /// must always carry a non-empty reason for auditability.
    pub fn deny(reason: impl Into<String>, policy_id: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.is_empty() {
            "denied by policy".to_string()
        } else {
            reason
        };
        Self {
            allowed: false,
            reason,
            policy_id: Some(policy_id.into()),
            constraints: None,
            data: None,
        }
    }

    /// Attach a data payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Set the originating policy id.
    pub fn with_policy_id(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = Some(policy_id.into());
        self
    }
}
