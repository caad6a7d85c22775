//! Resource: the target entity being accessed.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// What kind of target a resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// An invocable tool.
    Tool,
    /// A data set or document.
    Data,
    /// A service endpoint.
    Service,
    /// A physical or virtual device.
    Device,
    /// A proprietary-protocol service.
    CustomService,
}

impl ResourceType {
    /// The wire name of this resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Data => "data",
            Self::Service => "service",
            Self::Device => "device",
            Self::CustomService => "custom-service",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sensitivity classification, ordered from least to most sensitive.
///
/// The derived ordering is the classification ordering:
/// `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// Public or near-public material.
    Low,
    /// Internal material; the default for unregistered resources.
    #[default]
    Medium,
    /// Restricted material.
    High,
    /// Material whose exposure is a reportable incident.
    Critical,
}

impl Sensitivity {
    /// Parse a sensitivity from its wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// The wire name of this sensitivity level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or(ValidationError::new("sensitivity"))
    }
}

/// The target entity being accessed.
///
/// Resources are registered up front (or synthesized with defaults when no
/// registry entry matches) and are looked up, never mutated, afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier.
    pub id: String,
    /// What kind of target this is.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Human-readable name (path, service/method, display name).
    pub name: String,
    /// Sensitivity classification.
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// Owning team or user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Additional managers with administrative say over the resource.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub managers: BTreeSet<String>,
}

impl Resource {
    /// Start building a resource with the given id.
    ///
    /// The name defaults to the id; type defaults to
    /// [`ResourceType::Service`] and sensitivity to
    /// [`Sensitivity::Medium`].
    pub fn builder(id: impl Into<String>) -> ResourceBuilder {
        let id = id.into();
        ResourceBuilder {
            name: id.clone(),
            id,
            resource_type: ResourceType::Service,
            sensitivity: Sensitivity::Medium,
            owner: None,
            managers: BTreeSet::new(),
        }
    }
}

/// Builder for [`Resource`].
#[derive(Debug, Clone)]
pub struct ResourceBuilder {
    id: String,
    resource_type: ResourceType,
    name: String,
    sensitivity: Sensitivity,
    owner: Option<String>,
    managers: BTreeSet<String>,
}

impl ResourceBuilder {
    /// Set the resource type.
    pub fn resource_type(mut self, t: ResourceType) -> Self {
        self.resource_type = t;
        self
    }

    /// Set the human-readable name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the sensitivity classification.
    pub fn sensitivity(mut self, s: Sensitivity) -> Self {
        self.sensitivity = s;
        self
    }

    /// Set the owning team or user.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Add a manager.
    pub fn manager(mut self, manager: impl Into<String>) -> Self {
        self.managers.insert(manager.into());
        self
    }

    /// Validate and construct the resource.
    ///
    /// Fails with a [`ValidationError`] naming `id` when the id is empty.
    pub fn build(self) -> Result<Resource> {
        if self.id.is_empty() {
            return Err(ValidationError::new("id"));
        }
        Ok(Resource {
            id: self.id,
            resource_type: self.resource_type,
            name: self.name,
            sensitivity: self.sensitivity,
            owner: self.owner,
            managers: self.managers,
        })
    }
}
