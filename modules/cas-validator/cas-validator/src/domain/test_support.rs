//! Test doubles shared by the domain unit tests.

use std::collections::HashMap;

use cas_validator_sdk::ProxyTicketStore;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

/// `ProxyTicketStore` fake that serves fixed tickets and records every call.
#[derive(Default)]
pub struct RecordingStore {
    tickets: HashMap<String, String>,
    resolved: Mutex<Vec<String>>,
    registered: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_ticket(iou: &str, pgt: &str) -> Self {
        Self {
            tickets: HashMap::from([(iou.to_owned(), pgt.to_owned())]),
            ..Self::default()
        }
    }

    pub fn resolutions(&self) -> Vec<String> {
        self.resolved.lock().clone()
    }

    pub fn registrations(&self) -> Vec<(String, String)> {
        self.registered.lock().clone()
    }
}

impl ProxyTicketStore for RecordingStore {
    fn resolve(&self, iou: &str) -> Option<SecretString> {
        self.resolved.lock().push(iou.to_owned());
        self.tickets
            .get(iou)
            .map(|pgt| SecretString::from(pgt.clone()))
    }

    fn register(&self, iou: &str, pgt: &SecretString) {
        self.registered
            .lock()
            .push((iou.to_owned(), pgt.expose_secret().to_owned()));
    }
}
