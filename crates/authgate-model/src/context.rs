//! Context: request-time circumstance that is neither identity nor target.

use crate::value::AttrValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Deployment environment a request was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local development.
    Dev,
    /// Pre-production staging.
    Staging,
    /// Production.
    Production,
}

impl Environment {
    /// The wire name of this environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request-time metadata attached to every canonical request.
///
/// Built fresh per request and never cached or reused: the timestamp is
/// the moment of translation, and the metadata mapping carries the
/// protocol name plus whatever envelope fields the adapter preserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Moment the request was translated (UTC, serialized as RFC 3339).
    pub timestamp: DateTime<Utc>,
    /// Network origin, when the protocol exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client software identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Deployment environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Caller- or gateway-assigned request correlation id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Protocol name and protocol-native envelope fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, AttrValue>,
}

impl Context {
    /// A context stamped with the current UTC time and nothing else.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            ip_address: None,
            user_agent: None,
            environment: None,
            request_id: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the network origin.
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set the client software identifier.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the deployment environment.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the request correlation id.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Attach an envelope metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
