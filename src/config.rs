//! Configuration loading and validation.
//!
//! Gateway configuration covers the concerns the normalization core owns:
//! JWT validation parameters, API-key fallback behavior, principal-cache
//! policy, environment override, and the decision-engine deadline.
//! Everything else (listeners, TLS, policy storage) belongs to the
//! surrounding process and is configured there.

use authgate_model::Environment;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bearer-token (JWT) validation parameters.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// API-key extraction behavior.
    #[serde(default)]
    pub api_keys: ApiKeyConfig,
    /// Principal cache policy.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Environment override; when unset, adapters detect per request.
    #[serde(default)]
    pub environment: Option<Environment>,
    /// Deadline applied to decision-engine calls, in milliseconds.
    #[serde(default = "default_decision_deadline_ms")]
    pub decision_deadline_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            api_keys: ApiKeyConfig::default(),
            cache: CacheConfig::default(),
            environment: None,
            decision_deadline_ms: default_decision_deadline_ms(),
        }
    }
}

/// JWT validation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared secret for HMAC signature verification.
    #[serde(default)]
    pub secret: String,
    /// Signature algorithm. Only "HS256" is supported.
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,
    /// Clock skew tolerated when checking `exp`/`nbf`, in seconds.
    #[serde(default = "default_jwt_leeway_secs")]
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: default_jwt_algorithm(),
            leeway_secs: default_jwt_leeway_secs(),
        }
    }
}

/// API-key extraction behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyConfig {
    /// Synthesize a principal from the key prefix when no key store is
    /// wired. Offline/minimal deployments only.
    #[serde(default = "default_true")]
    pub offline_fallback: bool,
    /// How many leading key characters the synthesized identity keeps.
    #[serde(default = "default_api_key_prefix_len")]
    pub prefix_len: usize,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            offline_fallback: default_true(),
            prefix_len: default_api_key_prefix_len(),
        }
    }
}

/// Principal cache policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Whether extracted principals are cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether Basic-auth candidate identities are cached. Off by
    /// default: the candidate is cheap to derive and password checking
    /// happens downstream.
    #[serde(default)]
    pub cache_basic: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            cache_basic: false,
        }
    }
}

// =============================================================================
// Defaults
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_jwt_leeway_secs() -> u64 {
    30
}

fn default_api_key_prefix_len() -> usize {
    8
}

fn default_decision_deadline_ms() -> u64 {
    5000
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field combinations that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.jwt.secret.is_empty() && self.jwt.algorithm != "HS256" {
            return Err(ConfigError::Invalid(format!(
                "unsupported jwt.algorithm '{}', only HS256 is supported",
                self.jwt.algorithm
            )));
        }
        if self.api_keys.prefix_len == 0 {
            return Err(ConfigError::Invalid(
                "api_keys.prefix_len must be at least 1".to_string(),
            ));
        }
        if self.decision_deadline_ms == 0 {
            return Err(ConfigError::Invalid(
                "decision_deadline_ms must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    /// The decision-engine deadline as a [`Duration`].
    pub fn decision_deadline(&self) -> Duration {
        Duration::from_millis(self.decision_deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert!(config.cache.enabled);
        assert!(!config.cache.cache_basic);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.api_keys.prefix_len, 8);
        assert_eq!(config.decision_deadline_ms, 5000);
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "decision_deadline_ms = 750").unwrap();
        let config = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(config.decision_deadline_ms, 750);
    }

    #[test]
    fn rejects_unknown_jwt_algorithm() {
        let toml = r#"
            [jwt]
            secret = "s3cret"
            algorithm = "RS256"
        "#;
        let err = GatewayConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_deadline() {
        let err = GatewayConfig::from_toml_str("decision_deadline_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
            environment = "staging"
            decision_deadline_ms = 250

            [jwt]
            secret = "s3cret"
            leeway_secs = 5

            [api_keys]
            offline_fallback = false

            [cache]
            cache_basic = true
        "#;
        let config = GatewayConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.environment, Some(Environment::Staging));
        assert_eq!(config.decision_deadline(), Duration::from_millis(250));
        assert_eq!(config.jwt.leeway_secs, 5);
        assert!(!config.api_keys.offline_fallback);
        assert!(config.cache.cache_basic);
    }
}
