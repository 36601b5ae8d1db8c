#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! In-memory Proxy Ticket Store
//!
//! Keeps proxy-granting tickets in process memory for single-node
//! deployments, development and tests.
//!
//! ## Flow
//!
//! 1. The CAS server calls the proxy callback endpoint with `pgtIou` and
//!    `pgtId`; the endpoint hands both to [`InMemoryProxyTicketStore::receive_callback`].
//! 2. The validator parses the IOU out of the validation response and calls
//!    `resolve`, then `register` with the delivered ticket.
//! 3. The application looks up the PGT for a principal's IOU with
//!    [`InMemoryProxyTicketStore::proxy_granting_ticket`] when it needs
//!    proxy tickets.

pub mod store;

pub use store::InMemoryProxyTicketStore;
