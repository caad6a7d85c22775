//! Validation errors for canonical model construction.

use thiserror::Error;

/// Convenience type alias for Results using [`ValidationError`].
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// A required field was missing or malformed at construction time.
///
/// Carries the name of the offending field so adapters can surface a
/// precise client-side rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing or invalid required field: {field}")]
pub struct ValidationError {
    /// Name of the field that failed validation.
    pub field: &'static str,
}

impl ValidationError {
    /// Create a validation error naming the offending field.
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_field() {
        let err = ValidationError::new("id");
        assert_eq!(err.to_string(), "missing or invalid required field: id");
    }
}
