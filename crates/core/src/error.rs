//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Role-table violations are raised when a table is built and are never
/// transient; configuration input that cannot be parsed is reported as
/// `Validation`. Permission checks and expiry evaluation never fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Two symbolic role names map to the same canonical value.
    #[error("duplicate role value '{value}' (used by '{first}' and '{second}')")]
    DuplicateRoleValue {
        value: String,
        first: String,
        second: String,
    },

    /// A canonical role value contains the reserved list separator (`,`).
    #[error("invalid role value '{value}' for '{name}': role values must not contain commas")]
    InvalidRoleValue { name: String, value: String },

    /// A value failed validation (e.g. malformed configuration input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn duplicate_role_value(
        value: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateRoleValue {
            value: value.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn invalid_role_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidRoleValue {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
