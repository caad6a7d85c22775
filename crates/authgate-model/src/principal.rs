//! Principal: the authenticated identity attempting an action.

use crate::error::{Result, ValidationError};
use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// What kind of actor a principal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    /// A human user.
    Human,
    /// An autonomous agent acting on someone's behalf.
    Agent,
    /// A machine identity (service-to-service calls).
    Service,
    /// A physical or virtual device.
    Device,
}

impl PrincipalType {
    /// Parse a principal type from its wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Some(Self::Human),
            "agent" => Some(Self::Agent),
            "service" => Some(Self::Service),
            "device" => Some(Self::Device),
            _ => None,
        }
    }

    /// The wire name of this principal type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Agent => "agent",
            Self::Service => "service",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrincipalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or(ValidationError::new("type"))
    }
}

/// The authenticated identity making a request.
///
/// Immutable once constructed: a principal is created per-request by a
/// credential extractor (or served from the principal cache) and never
/// mutated afterwards. Construct through [`Principal::builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier within a trust domain.
    pub id: String,
    /// What kind of actor this is.
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    /// Primary role, when the auth scheme carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Team memberships.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub teams: BTreeSet<String>,
    /// Scheme-specific claims (issuer, scopes, key prefix, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Principal {
    /// Start building a principal with the given id.
    pub fn builder(id: impl Into<String>) -> PrincipalBuilder {
        PrincipalBuilder {
            id: id.into(),
            principal_type: PrincipalType::Human,
            role: None,
            teams: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }
}

/// Builder for [`Principal`].
#[derive(Debug, Clone)]
pub struct PrincipalBuilder {
    id: String,
    principal_type: PrincipalType,
    role: Option<String>,
    teams: BTreeSet<String>,
    attributes: BTreeMap<String, AttrValue>,
}

impl PrincipalBuilder {
    /// Set the principal type (defaults to [`PrincipalType::Human`]).
    pub fn principal_type(mut self, t: PrincipalType) -> Self {
        self.principal_type = t;
        self
    }

    /// Set the primary role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Add a team membership.
    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.teams.insert(team.into());
        self
    }

    /// Replace the team set wholesale.
    pub fn teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a scheme-specific claim.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the attribute map wholesale.
    pub fn attributes(mut self, attributes: BTreeMap<String, AttrValue>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Validate and construct the principal.
    ///
    /// Fails with a [`ValidationError`] naming `id` when the id is empty.
    pub fn build(self) -> Result<Principal> {
        if self.id.is_empty() {
            return Err(ValidationError::new("id"));
        }
        Ok(Principal {
            id: self.id,
            principal_type: self.principal_type,
            role: self.role,
            teams: self.teams,
            attributes: self.attributes,
        })
    }
}
