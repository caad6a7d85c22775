//! # authgate-model
//!
//! The canonical authorization vocabulary shared by every protocol adapter.
//!
//! Every inbound protocol (HTTP, RPC, proprietary envelopes) is normalized
//! into one [`AuthorizationRequest`] built from four parts:
//!
//! - [`Principal`] — who is making the request
//! - [`Resource`] — what is being accessed
//! - [`Action`] — what operation is attempted
//! - [`Context`] — request-time circumstance (timestamp, origin, envelope)
//!
//! The decision engine answers with an [`AuthorizationDecision`] that the
//! adapter translates back into the calling protocol's native shape.
//!
//! ## Quick Start
//!
//! ```rust
//! use authgate_model::{Action, AuthorizationRequest, Context, Operation, Principal, Resource};
//!
//! let principal = Principal::builder("alice")
//!     .role("viewer")
//!     .team("platform")
//!     .build()
//!     .expect("valid principal");
//!
//! let resource = Resource::builder("users-api")
//!     .name("/api/users")
//!     .build()
//!     .expect("valid resource");
//!
//! let request = AuthorizationRequest {
//!     principal,
//!     resource,
//!     action: Action::new(Operation::Read),
//!     context: Context::now(),
//! };
//!
//! assert_eq!(request.action.operation, Operation::Read);
//! ```
//!
//! All types are plain serializable data: the only behavior is
//! construction-time validation, which fails with a [`ValidationError`]
//! naming the offending field.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod action;
mod context;
mod decision;
mod error;
mod principal;
mod request;
mod resource;
mod value;

pub use action::{Action, Operation};
pub use context::{Context, Environment};
pub use decision::{AuthorizationDecision, Constraints, RateLimit};
pub use error::{Result, ValidationError};
pub use principal::{Principal, PrincipalBuilder, PrincipalType};
pub use request::AuthorizationRequest;
pub use resource::{Resource, ResourceBuilder, ResourceType, Sensitivity};
pub use value::AttrValue;
