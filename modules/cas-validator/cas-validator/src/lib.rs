//! CAS Validator Module
//!
//! Interprets CAS 3.0 service responses fetched by the transport layer and
//! turns them into an authenticated [`Principal`](cas_validator_sdk::Principal)
//! or a precise [`CasValidationError`](cas_validator_sdk::CasValidationError).
//!
//! When a proxy ticket store is configured, the validator also requests
//! proxy-capable validation and records the PGT-IOU to PGT mapping reported
//! by the server.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{CasValidatorConfig, StaticProxyCallbackUrl};
pub use domain::{CasValidatorLocalClient, TicketValidator};
