//! # Error Types
//!
//! Structured error types for estimate_core. A failed estimate always names
//! the single field that stopped it, so callers can point a user straight at
//! the offending input.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{EstimateError, EstimateResult};
//!
//! fn check_floors(floors: f64) -> EstimateResult<u8> {
//!     if floors != 1.0 && floors != 2.0 {
//!         return Err(EstimateError::invalid_input(
//!             "floors",
//!             floors.to_string(),
//!             "Floor count must be 1 or 2",
//!         ));
//!     }
//!     Ok(floors as u8)
//! }
//!
//! assert!(check_floors(3.0).unwrap_err().is_validation());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimation and rendering.
///
/// The estimation engine only ever produces the validation variants
/// (`InvalidInput`, `MissingField`). The remaining variants belong to the
/// price book loader and the PDF renderer.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid (out of range, not in a table, wrong type)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Price book failed to parse or contains unusable values
    #[error("Invalid price book: {reason}")]
    InvalidPriceBook { reason: String },

    /// Document compilation or PDF export failed
    #[error("Rendering failed: {stage} - {reason}")]
    RenderFailed { stage: String, reason: String },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        EstimateError::MissingField {
            field: field.into(),
        }
    }

    /// Create an InvalidPriceBook error
    pub fn invalid_price_book(reason: impl Into<String>) -> Self {
        EstimateError::InvalidPriceBook {
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error
    pub fn render_failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::RenderFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// True for faults caused by the caller's request (client errors)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidInput { .. } | EstimateError::MissingField { .. }
        )
    }

    /// The request field a validation fault refers to
    pub fn field(&self) -> Option<&str> {
        match self {
            EstimateError::InvalidInput { field, .. } | EstimateError::MissingField { field } => {
                Some(field)
            }
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::MissingField { .. } => "MISSING_FIELD",
            EstimateError::InvalidPriceBook { .. } => "INVALID_PRICE_BOOK",
            EstimateError::RenderFailed { .. } => "RENDER_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EstimateError::invalid_input("floors", "3", "Floor count must be 1 or 2");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: EstimateError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EstimateError::missing_field("walls").error_code(), "MISSING_FIELD");
        assert_eq!(EstimateError::render_failed("compile", "boom").error_code(), "RENDER_FAILED");
    }

    #[test]
    fn test_validation_classification() {
        assert!(EstimateError::missing_field("roof").is_validation());
        assert!(EstimateError::invalid_input("doors", "-1", "negative").is_validation());
        assert!(!EstimateError::invalid_price_book("empty").is_validation());
        assert!(!EstimateError::render_failed("pdf", "x").is_validation());
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(EstimateError::missing_field("walls").field(), Some("walls"));
        assert_eq!(
            EstimateError::invalid_input("walls.thickness", "200", "no").field(),
            Some("walls.thickness")
        );
        assert_eq!(EstimateError::invalid_price_book("x").field(), None);
    }

    #[test]
    fn test_message_names_field() {
        let msg = EstimateError::invalid_input("floors", "3", "Floor count must be 1 or 2").to_string();
        assert!(msg.contains("floors"));
        assert!(msg.contains('3'));
    }
}
