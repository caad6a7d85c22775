//! The canonical authorization request submitted to the decision engine.

use crate::{Action, Context, Principal, Resource};
use serde::{Deserialize, Serialize};

/// One protocol-agnostic authorization question.
///
/// All four parts are owned values, so a constructed request always has
/// its principal, resource, action, and context present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Who is asking.
    pub principal: Principal,
    /// What they want to touch.
    pub resource: Resource,
    /// What they want to do to it.
    pub action: Action,
    /// The circumstances of the ask.
    pub context: Context,
}
