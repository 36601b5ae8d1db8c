//! CAS Validator SDK
//!
//! This crate provides the public API for the `cas_validator` module:
//!
//! - [`TicketValidatorClient`] - Public API trait for consumers (transport layer)
//! - [`ProxyTicketStore`] - Storage seam for PGT-IOU to PGT mappings
//! - [`ProxyCallbackUrlBuilder`] - Builds the proxy callback URL sent as `pgtUrl`
//! - [`ValidationResponse`] - Typed outcome of a CAS 3.0 service response
//! - [`Principal`] - Authenticated identity with attributes and proxy chain
//! - [`CasValidationError`] - Error types
//!
//! ## Usage
//!
//! The transport collaborator asks the validator which endpoint to call,
//! fetches the response body and hands it back for interpretation:
//!
//! ```ignore
//! use cas_validator_sdk::TicketValidatorClient;
//!
//! let url = format!("{server}/{}", validator.endpoint_suffix());
//! let body = http.get(url).query(&validator.extra_parameters()).send()?.text()?;
//!
//! let principal = validator.validate(ticket, &body)?;
//! println!("authenticated as {}", principal.name());
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{ProxyCallbackUrlBuilder, ProxyTicketStore, TicketValidatorClient};
pub use error::CasValidationError;
pub use models::{
    Attributes, AuthenticationSuccess, OutcomeKind, Principal, PrincipalBuilder, ProxySuccess,
    ServiceFailure, ValidationResponse,
};

/// Endpoint used when only service tickets are validated.
pub const SERVICE_VALIDATE_ENDPOINT: &str = "p3/serviceValidate";

/// Endpoint used when the validator can accept proxy tickets and request PGTs.
pub const PROXY_VALIDATE_ENDPOINT: &str = "p3/proxyValidate";

/// Request parameter carrying the proxy callback URL.
pub const PGT_URL_PARAM: &str = "pgtUrl";
