//! # authgate
//!
//! Protocol-normalization core for an authorization gateway: heterogeneous
//! inbound requests (HTTP/REST, RPC-style calls, proprietary envelopes)
//! are translated into one canonical authorization request, and the
//! engine's allow/deny decision is translated back into each protocol's
//! native success, denied, or error representation.
//!
//! ## Architecture
//!
//! - [`authgate_model`] (re-exported as [`model`]) — the canonical
//!   vocabulary: Principal, Resource, Action, Context, request, decision
//! - [`credentials`] — per-scheme credential extraction (bearer/JWT,
//!   API key, basic, custom token) behind one dispatching extractor
//! - [`cache`] — the shared principal cache keyed by raw credential
//!   material
//! - [`registry`] — exact and wildcard resource lookup with synthesized
//!   defaults
//! - [`actions`] — protocol verb → canonical operation mapping
//! - [`adapters`] — one [`ProtocolAdapter`](adapters::ProtocolAdapter)
//!   per protocol, composing the pieces above
//! - [`engine`] — the decision-engine boundary with deadline enforcement
//! - [`gateway`] — the linear per-request pipeline
//!
//! The decision engine itself, audit storage, policy CRUD, and process
//! wiring are external collaborators; this crate owns only the
//! translation layer between them and the wire.
//!
//! ## Quick Start
//!
//! ```no_run
//! use authgate::adapters::HttpAdapter;
//! use authgate::cache::PrincipalCache;
//! use authgate::config::GatewayConfig;
//! use authgate::credentials::CredentialExtractor;
//! use authgate::engine::{DecisionEngine, EngineClient};
//! use authgate::gateway::Gateway;
//! use authgate::registry::ResourceRegistry;
//! use std::sync::Arc;
//!
//! # async fn wire(engine: Arc<dyn DecisionEngine>) {
//! let config = GatewayConfig::load("gateway.toml").expect("config");
//! let adapter = HttpAdapter::new(
//!     Arc::new(CredentialExtractor::from_config(&config)),
//!     Arc::new(PrincipalCache::new()),
//!     Arc::new(ResourceRegistry::new()),
//! );
//! let gateway = Gateway::new(
//!     adapter,
//!     EngineClient::new(engine, config.decision_deadline()),
//! );
//! # let _ = gateway;
//! # }
//! ```

#![deny(clippy::all)]

pub mod actions;
pub mod adapters;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod registry;

/// The canonical model crate, re-exported for consumers.
pub use authgate_model as model;

pub use actions::ActionMapper;
pub use adapters::{Disposition, Outcome, ProtocolAdapter};
pub use cache::PrincipalCache;
pub use config::GatewayConfig;
pub use credentials::CredentialExtractor;
pub use engine::{DecisionEngine, EngineClient};
pub use error::{AuthenticationError, GatewayError, TransientError, TranslationError};
pub use gateway::Gateway;
pub use registry::ResourceRegistry;
