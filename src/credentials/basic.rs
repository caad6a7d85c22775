//! Basic-auth decoding: candidate identity from a base64 `user:pass` blob.
//!
//! The core's responsibility ends at producing the candidate identity;
//! password verification is delegated to an external credential store.
//! The decoded password bytes never leave this module and are zeroized.

use crate::error::AuthenticationError;
use authgate_model::{Principal, PrincipalType};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroize;

/// Decode a `Basic` blob into a candidate principal.
pub(super) fn extract(blob: &str) -> Result<Principal, AuthenticationError> {
    let mut decoded = STANDARD
        .decode(blob)
        .map_err(|_| AuthenticationError::MalformedEncoding("invalid base64".to_string()))?;

    let text = match std::str::from_utf8(&decoded) {
        Ok(text) => text,
        Err(_) => {
            decoded.zeroize();
            return Err(AuthenticationError::MalformedEncoding(
                "invalid utf-8".to_string(),
            ));
        }
    };

    let username = match text.split_once(':') {
        Some((username, _password)) => username.to_string(),
        None => {
            decoded.zeroize();
            return Err(AuthenticationError::MalformedEncoding(
                "missing credential separator".to_string(),
            ));
        }
    };
    decoded.zeroize();

    if username.is_empty() {
        return Err(AuthenticationError::MalformedEncoding(
            "empty username".to_string(),
        ));
    }

    Principal::builder(username)
        .principal_type(PrincipalType::Human)
        .role("user")
        .build()
        .map_err(|e| AuthenticationError::InvalidToken(e.to_string()))
}
