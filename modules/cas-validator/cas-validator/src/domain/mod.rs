//! Domain layer for the CAS validator.

pub mod error;
pub mod local_client;
pub mod parser;
pub mod principal;
pub mod registrar;
pub mod service;

pub use error::DomainError;
pub use local_client::CasValidatorLocalClient;
pub use service::TicketValidator;

#[cfg(test)]
mod test_support;
