//! Local (in-process) client for the CAS validator.

use std::collections::HashMap;
use std::sync::Arc;

use cas_validator_sdk::{CasValidationError, Principal, TicketValidatorClient};

use super::{DomainError, TicketValidator};

/// Local client wrapping the validator.
///
/// Handed to the transport layer as `Arc<dyn TicketValidatorClient>`.
pub struct CasValidatorLocalClient {
    svc: Arc<TicketValidator>,
}

impl CasValidatorLocalClient {
    #[must_use]
    pub fn new(svc: Arc<TicketValidator>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> CasValidationError {
    tracing::error!(operation = op, error = ?e, "cas_validator call failed");
    e.into()
}

impl TicketValidatorClient for CasValidatorLocalClient {
    fn endpoint_suffix(&self) -> &'static str {
        self.svc.endpoint_suffix()
    }

    fn extra_parameters(&self) -> HashMap<String, String> {
        self.svc.extra_parameters()
    }

    fn validate(&self, ticket: &str, raw: &str) -> Result<Principal, CasValidationError> {
        self.svc
            .validate(ticket, raw)
            .map_err(|e| log_and_convert("validate", e))
    }
}
