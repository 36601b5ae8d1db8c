//! Public API traits for the CAS validator.
//!
//! [`TicketValidatorClient`] is what the transport collaborator consumes.
//! [`ProxyTicketStore`] and [`ProxyCallbackUrlBuilder`] are the seams the
//! validator depends on; implementations are injected at construction time.

use std::collections::HashMap;

use secrecy::SecretString;

use crate::error::CasValidationError;
use crate::models::Principal;

/// Public API trait for CAS ticket validation.
///
/// Implementations hold only immutable configuration and are safe to call
/// from many requests at once.
///
/// ```ignore
/// let suffix = validator.endpoint_suffix(); // "p3/serviceValidate" or "p3/proxyValidate"
/// let principal = validator.validate("ST-1-abc", &response_body)?;
/// ```
pub trait TicketValidatorClient: Send + Sync {
    /// Validation endpoint, relative to the CAS server base URL.
    ///
    /// `p3/proxyValidate` when a proxy ticket store is configured,
    /// `p3/serviceValidate` otherwise.
    fn endpoint_suffix(&self) -> &'static str;

    /// Additional request parameters for the validation request.
    ///
    /// Contains `pgtUrl` (URL-encoded proxy callback URL) only when a proxy
    /// ticket store is configured; empty otherwise.
    fn extra_parameters(&self) -> HashMap<String, String>;

    /// Interpret a raw validation response for `ticket`.
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket that was validated, used for error context only
    /// * `raw` - The response body fetched from the validation endpoint
    ///
    /// # Errors
    ///
    /// - `EmptyResponse` if `raw` is empty or whitespace
    /// - `SchemaViolation` if `raw` is not a CAS service response
    /// - `MissingIdentity` if a success response has no user
    /// - `AuthenticationRejected` if the server rejected the ticket
    /// - `UnexpectedOutcome` for `proxySuccess` / `proxyFailure` documents
    fn validate(&self, ticket: &str, raw: &str) -> Result<Principal, CasValidationError>;
}

/// Storage for proxy-granting tickets delivered through the proxy callback.
///
/// The store owns the lifetime of IOU to PGT mappings. It must tolerate
/// concurrent `register` calls for different IOUs, and any waiting for a
/// callback that has not arrived yet happens inside `resolve`.
pub trait ProxyTicketStore: Send + Sync {
    /// Look up the PGT delivered for `iou`, if it has arrived.
    fn resolve(&self, iou: &str) -> Option<SecretString>;

    /// Persist the `iou` to `pgt` mapping.
    fn register(&self, iou: &str, pgt: &SecretString);
}

/// Builds the absolute URL the CAS server calls back with a PGT and its IOU.
pub trait ProxyCallbackUrlBuilder: Send + Sync {
    fn construct_proxy_callback_url(&self) -> String;
}
