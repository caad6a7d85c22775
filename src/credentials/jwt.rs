//! Bearer-token (JWT, HS256) validation and claim mapping.
//!
//! Tokens are validated against a configured shared secret: signature
//! first (constant-time comparison), then time claims, then the subject.
//! Claims map onto the principal as `sub` → id, `type` → principal type
//! (adapter default when absent), plus `role`, `teams`, and `attributes`.

use crate::config::JwtConfig;
use crate::error::AuthenticationError;
use authgate_model::{AttrValue, Principal, PrincipalType};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// The JOSE header fields we check.
#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Registered and gateway-understood claims.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    exp: Option<i64>,
    nbf: Option<i64>,
    #[serde(rename = "type")]
    principal_type: Option<String>,
    role: Option<String>,
    #[serde(default)]
    teams: Vec<String>,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

/// HS256 token validator holding the shared secret.
///
/// The secret is zeroized when the validator is dropped.
pub struct JwtValidator {
    secret: Zeroizing<Vec<u8>>,
    leeway_secs: i64,
}

impl JwtValidator {
    /// Build a validator from JWT configuration.
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.as_bytes(), config.leeway_secs)
    }

    /// Build a validator from a raw secret and clock-skew leeway.
    pub fn new(secret: &[u8], leeway_secs: u64) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            leeway_secs: leeway_secs as i64,
        }
    }

    /// Validate a compact-serialized token and map its claims onto a
    /// principal.
    ///
    /// `default_type` applies when the token carries no `type` claim; the
    /// HTTP adapter defaults to human, the RPC adapter to service.
    pub fn validate(
        &self,
        token: &str,
        default_type: PrincipalType,
    ) -> Result<Principal, AuthenticationError> {
        let mut segments = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => {
                    return Err(AuthenticationError::MalformedEncoding(
                        "expected three token segments".to_string(),
                    ));
                }
            };

        let signature = decode_segment(signature_b64)?;
        self.verify_signature(header_b64, payload_b64, &signature)?;

        let header_bytes = decode_segment(header_b64)?;
        let header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|_| AuthenticationError::MalformedEncoding("invalid header JSON".to_string()))?;
        if header.alg != "HS256" {
            return Err(AuthenticationError::InvalidToken(format!(
                "unsupported algorithm: {}",
                header.alg
            )));
        }

        let payload_bytes = decode_segment(payload_b64)?;
        let claims: Claims = serde_json::from_slice(&payload_bytes)
            .map_err(|_| AuthenticationError::MalformedEncoding("invalid claims JSON".to_string()))?;

        self.check_time_claims(&claims)?;
        self.principal_from_claims(claims, default_type)
    }

    /// Recompute the HMAC over `header.payload` and compare in constant
    /// time.
    fn verify_signature(
        &self,
        header_b64: &str,
        payload_b64: &str,
        signature: &[u8],
    ) -> Result<(), AuthenticationError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthenticationError::InvalidToken("invalid signing key".to_string()))?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        let tag = mac.finalize().into_bytes();

        if bool::from(tag.as_slice().ct_eq(signature)) {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidToken(
                "signature mismatch".to_string(),
            ))
        }
    }

    fn check_time_claims(&self, claims: &Claims) -> Result<(), AuthenticationError> {
        let now = Utc::now().timestamp();
        if let Some(exp) = claims.exp {
            if now > exp + self.leeway_secs {
                return Err(AuthenticationError::TokenExpired);
            }
        }
        if let Some(nbf) = claims.nbf {
            if now < nbf - self.leeway_secs {
                return Err(AuthenticationError::InvalidToken(
                    "token not yet valid".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn principal_from_claims(
        &self,
        claims: Claims,
        default_type: PrincipalType,
    ) -> Result<Principal, AuthenticationError> {
        let sub = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthenticationError::InvalidToken("missing subject claim".to_string()))?;

        let principal_type = match claims.principal_type.as_deref() {
            Some(name) => PrincipalType::parse(name).ok_or_else(|| {
                AuthenticationError::InvalidToken(format!("unknown principal type: {name}"))
            })?,
            None => default_type,
        };

        let mut builder = Principal::builder(sub)
            .principal_type(principal_type)
            .teams(claims.teams);
        if let Some(role) = claims.role {
            builder = builder.role(role);
        }
        for (key, value) in &claims.attributes {
            if let Some(av) = AttrValue::from_json(value) {
                builder = builder.attribute(key.clone(), av);
            }
        }

        builder
            .build()
            .map_err(|e| AuthenticationError::InvalidToken(e.to_string()))
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthenticationError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthenticationError::MalformedEncoding("invalid base64url".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    /// Forge a compact token signed with `secret`.
    fn forge(claims: &serde_json::Value, secret: &[u8]) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header}.{payload}.{signature}")
    }

    fn validator() -> JwtValidator {
        JwtValidator::new(SECRET, 30)
    }

    #[test]
    fn valid_token_maps_claims() {
        let token = forge(
            &serde_json::json!({
                "sub": "alice",
                "role": "viewer",
                "teams": ["platform", "sre"],
                "attributes": {"issuer": "corp-idp"}
            }),
            SECRET,
        );
        let principal = validator().validate(&token, PrincipalType::Human).unwrap();
        assert_eq!(principal.id, "alice");
        assert_eq!(principal.principal_type, PrincipalType::Human);
        assert_eq!(principal.role.as_deref(), Some("viewer"));
        assert!(principal.teams.contains("sre"));
        assert_eq!(
            principal.attributes.get("issuer").and_then(|v| v.as_str()),
            Some("corp-idp")
        );
    }

    #[test]
    fn type_claim_overrides_default() {
        let token = forge(&serde_json::json!({"sub": "ci", "type": "service"}), SECRET);
        let principal = validator().validate(&token, PrincipalType::Human).unwrap();
        assert_eq!(principal.principal_type, PrincipalType::Service);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = forge(&serde_json::json!({"sub": "alice"}), b"other-secret");
        let err = validator().validate(&token, PrincipalType::Human).unwrap_err();
        assert!(matches!(err, AuthenticationError::InvalidToken(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = Utc::now().timestamp() - 3600;
        let token = forge(&serde_json::json!({"sub": "alice", "exp": past}), SECRET);
        assert_eq!(
            validator().validate(&token, PrincipalType::Human).unwrap_err(),
            AuthenticationError::TokenExpired
        );
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let just_expired = Utc::now().timestamp() - 5;
        let token = forge(&serde_json::json!({"sub": "alice", "exp": just_expired}), SECRET);
        assert!(validator().validate(&token, PrincipalType::Human).is_ok());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let v = validator();
        assert!(matches!(
            v.validate("not-a-token", PrincipalType::Human).unwrap_err(),
            AuthenticationError::MalformedEncoding(_)
        ));
        assert!(matches!(
            v.validate("a.b.c", PrincipalType::Human).unwrap_err(),
            AuthenticationError::MalformedEncoding(_)
        ));
    }

    #[test]
    fn missing_subject_is_rejected() {
        let token = forge(&serde_json::json!({"role": "viewer"}), SECRET);
        assert!(matches!(
            validator().validate(&token, PrincipalType::Human).unwrap_err(),
            AuthenticationError::InvalidToken(_)
        ));
    }
}
