//! Domain-specific error types for the batch engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! The registry modules return typed errors ([`AttrError`], [`LovError`])
//! while host conveniences at the application boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! BatchError
//! ├── Attr(AttrError) — attribute definition, access, and kind checks
//! └── Lov(LovError)   — controlled-vocabulary classes and membership
//! ```
//!
//! Every error is raised *before* any mutation takes place, so a failed
//! call leaves the registries exactly as they were. The registries never
//! decide process termination; escalation is the host's job (see
//! [`Batch::absorb`](crate::session::Batch::absorb)).

use thiserror::Error;

/// Top-level error type for the batch engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] at application boundaries.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Attribute registry error (definition, access, kind constraint).
    #[error("Attribute error: {0}")]
    Attr(#[from] AttrError),

    /// Controlled-vocabulary error (class registration, membership).
    #[error("Enumeration error: {0}")]
    Lov(#[from] LovError),
}

/// Errors raised by the attribute registry and the clone engine.
#[derive(Error, Debug)]
pub enum AttrError {
    /// A required call argument was missing or unparseable.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// An attribute with this name is already defined on the object.
    #[error("Attribute '{0}' is already defined")]
    DuplicateAttribute(String),

    /// The referenced attribute has never been defined on the object.
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// A direct set was attempted on a read-only attribute.
    #[error("Attribute '{0}' is read-only")]
    ReadOnlyViolation(String),

    /// The kind tag is unsupported, or a value violates its kind
    /// constraint (Boolean values must be 0 or 1).
    #[error("Invalid kind for attribute '{name}': {reason}")]
    InvalidKind {
        /// Name of the offending attribute.
        name: String,
        /// Human-readable constraint description.
        reason: String,
    },
}

/// Errors raised by the shared controlled-vocabulary (LoV) registry.
#[derive(Error, Debug)]
pub enum LovError {
    /// The enumeration class has never been registered, or was cleared.
    #[error("Unknown enumeration class '{0}'")]
    UnknownClass(String),

    /// The enumeration class is registered but holds no members to draw
    /// from.
    #[error("Enumeration class '{0}' has no members")]
    EmptyClass(String),

    /// The value is not a member of the enumeration class.
    #[error("'{value}' is not a member of class '{class}' (valid: {members})")]
    UnknownKey {
        /// The offending value.
        value: String,
        /// The enumeration class it was checked against.
        class: String,
        /// Comma-separated current member list, for diagnostics.
        members: String,
    },

    /// An attribute operation performed on behalf of a LoV helper failed.
    #[error(transparent)]
    Attr(#[from] AttrError),
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attr_error_display() {
        let err = AttrError::UnknownAttribute("retries".to_string());
        assert_eq!(err.to_string(), "Unknown attribute 'retries'");
    }

    #[test]
    fn read_only_display() {
        let err = AttrError::ReadOnlyViolation("locked".to_string());
        assert_eq!(err.to_string(), "Attribute 'locked' is read-only");
    }

    #[test]
    fn unknown_key_lists_members() {
        let err = LovError::UnknownKey {
            value: "purple".to_string(),
            class: "color".to_string(),
            members: "blue, red".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("purple"));
        assert!(msg.contains("color"));
        assert!(msg.contains("blue, red"));
    }

    #[test]
    fn batch_error_wraps_attr() {
        let err: BatchError = AttrError::Syntax("bad field".to_string()).into();
        assert!(err.to_string().contains("Syntax error"));
    }

    #[test]
    fn lov_error_wraps_attr() {
        let err: LovError = AttrError::UnknownAttribute("state".to_string()).into();
        assert!(err.to_string().contains("state"));
    }
}
