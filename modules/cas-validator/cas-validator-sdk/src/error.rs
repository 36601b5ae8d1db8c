//! Error types for the CAS validator module.

use thiserror::Error;

use crate::models::OutcomeKind;

/// Errors surfaced at the ticket validation boundary.
///
/// Every variant is a distinguishable validation failure. None of them is
/// retried internally; the caller decides whether to start a fresh ticket
/// exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CasValidationError {
    /// The server returned no body (empty or whitespace only).
    #[error("empty validation response")]
    EmptyResponse,

    /// The body is not a well-formed CAS service response.
    #[error("response does not match the CAS service response schema: {reason}")]
    SchemaViolation { reason: String },

    /// A success response without a usable `user` element.
    #[error("authentication success response carries no user identity")]
    MissingIdentity,

    /// The server explicitly rejected the ticket.
    #[error("ticket '{ticket}' rejected by CAS server: [{code}] {message}")]
    AuthenticationRejected {
        ticket: String,
        code: String,
        message: String,
    },

    /// A proxy-ticket-issuance outcome arrived where ticket validation was expected.
    #[error("unexpected {kind} outcome for ticket validation")]
    UnexpectedOutcome { kind: OutcomeKind },

    /// A result payload could not be interpreted as its declared shape.
    #[error("internal cast failure: {detail}")]
    InternalCastFailure { detail: String },

    /// The validator was constructed from an unusable configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl CasValidationError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "EMPTY_RESPONSE",
            Self::SchemaViolation { .. } => "SCHEMA_VIOLATION",
            Self::MissingIdentity => "MISSING_IDENTITY",
            Self::AuthenticationRejected { .. } => "AUTHENTICATION_REJECTED",
            Self::UnexpectedOutcome { .. } => "UNEXPECTED_OUTCOME",
            Self::InternalCastFailure { .. } => "INTERNAL_CAST_FAILURE",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
        }
    }
}
