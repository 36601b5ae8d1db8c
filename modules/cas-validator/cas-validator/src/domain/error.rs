//! Domain errors for the CAS validator.

use cas_validator_sdk::{CasValidationError, OutcomeKind};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("empty response")]
    EmptyResponse,

    #[error("malformed XML: {0}")]
    MalformedXml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    MalformedAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("missing identity")]
    MissingIdentity,

    #[error("ticket '{ticket}' rejected: [{code}] {message}")]
    Rejected {
        ticket: String,
        code: String,
        message: String,
    },

    #[error("unexpected {0} outcome")]
    UnexpectedOutcome(OutcomeKind),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<url::ParseError> for DomainError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<DomainError> for CasValidationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyResponse => Self::EmptyResponse,
            DomainError::MalformedXml(e) => Self::SchemaViolation {
                reason: e.to_string(),
            },
            DomainError::MalformedAttribute(e) => Self::SchemaViolation {
                reason: e.to_string(),
            },
            DomainError::Schema(reason) => Self::SchemaViolation { reason },
            DomainError::MissingIdentity => Self::MissingIdentity,
            DomainError::Rejected {
                ticket,
                code,
                message,
            } => Self::AuthenticationRejected {
                ticket,
                code,
                message,
            },
            DomainError::UnexpectedOutcome(kind) => Self::UnexpectedOutcome { kind },
            DomainError::Config(reason) => Self::InvalidConfiguration { reason },
        }
    }
}
