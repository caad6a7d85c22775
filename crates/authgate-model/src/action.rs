//! Action: the canonical operation category attempted on a resource.

use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of canonical operations.
///
/// Protocol verbs (HTTP methods, RPC method names, proprietary opcodes)
/// collapse into these six categories before policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Observe state without changing it.
    Read,
    /// Create, update, or delete state.
    Write,
    /// Invoke a computation or command.
    Execute,
    /// Steer a live process or device.
    Control,
    /// Administer the resource itself (ownership, configuration).
    Manage,
    /// Inspect audit records.
    Audit,
}

impl Operation {
    /// Parse an operation from its wire name (case-insensitive).
    ///
    /// Unknown names yield `None`; the defaulting policy for unmapped
    /// protocol verbs lives in the action mapper, not here.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "execute" => Some(Self::Execute),
            "control" => Some(Self::Control),
            "manage" => Some(Self::Manage),
            "audit" => Some(Self::Audit),
            _ => None,
        }
    }

    /// The wire name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Execute => "execute",
            Self::Control => "control",
            Self::Manage => "manage",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The operation attempted on a resource, with protocol-supplied parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Canonical operation category.
    pub operation: Operation,
    /// Structured arguments from the protocol payload. May be empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, AttrValue>,
}

impl Action {
    /// An action with no parameters.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            parameters: BTreeMap::new(),
        }
    }

    /// An action carrying protocol-supplied parameters.
    pub fn with_parameters(operation: Operation, parameters: BTreeMap<String, AttrValue>) -> Self {
        Self {
            operation,
            parameters,
        }
    }
}
