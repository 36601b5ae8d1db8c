//! `ProxyTicketStore` backed by concurrent hash maps.

use std::time::{Duration, Instant};

use cas_validator_sdk::ProxyTicketStore;
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// In-memory proxy ticket store.
///
/// Callbacks and registered mappings live in separate maps: a callback is
/// consumed when its mapping is registered. Callbacks whose IOU never shows
/// up in a validation stay until [`InMemoryProxyTicketStore::evict_stale_callbacks`]
/// drops them; registered mappings stay until removed.
#[derive(Default)]
pub struct InMemoryProxyTicketStore {
    delivered: DashMap<String, DeliveredTicket>,
    registered: DashMap<String, SecretString>,
}

struct DeliveredTicket {
    pgt: SecretString,
    received_at: Instant,
}

impl InMemoryProxyTicketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a PGT delivered by the CAS server to the proxy callback.
    ///
    /// Empty IOUs or tickets are ignored; CAS probes the callback with an
    /// empty request before delivering.
    pub fn receive_callback(&self, iou: &str, pgt: impl Into<SecretString>) {
        if iou.is_empty() {
            return;
        }
        let pgt = pgt.into();
        if pgt.expose_secret().is_empty() {
            return;
        }
        debug!(pgt_iou = %iou, "Proxy-granting ticket delivered");
        self.delivered.insert(
            iou.to_owned(),
            DeliveredTicket {
                pgt,
                received_at: Instant::now(),
            },
        );
    }

    /// Drop callbacks older than `max_age` that were never registered.
    ///
    /// Returns the number of callbacks dropped. Meant to run periodically;
    /// an IOU is normally validated within seconds of its callback.
    pub fn evict_stale_callbacks(&self, max_age: Duration) -> usize {
        let before = self.delivered.len();
        self.delivered
            .retain(|_, ticket| ticket.received_at.elapsed() < max_age);
        let evicted = before.saturating_sub(self.delivered.len());
        if evicted > 0 {
            debug!(evicted, "Evicted stale proxy-granting ticket callbacks");
        }
        evicted
    }

    /// Number of delivered callbacks not registered yet.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.delivered.len()
    }

    /// PGT registered for `iou` during validation.
    #[must_use]
    pub fn proxy_granting_ticket(&self, iou: &str) -> Option<SecretString> {
        self.registered.get(iou).map(|entry| entry.value().clone())
    }

    /// Number of registered mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Forget everything held for `iou`, e.g. when the session ends.
    pub fn remove(&self, iou: &str) -> Option<SecretString> {
        let delivered = self.delivered.remove(iou).map(|(_, ticket)| ticket.pgt);
        self.registered
            .remove(iou)
            .map(|(_, pgt)| pgt)
            .or(delivered)
    }
}

impl ProxyTicketStore for InMemoryProxyTicketStore {
    fn resolve(&self, iou: &str) -> Option<SecretString> {
        self.delivered
            .get(iou)
            .map(|entry| entry.value().pgt.clone())
            .or_else(|| self.proxy_granting_ticket(iou))
    }

    fn register(&self, iou: &str, pgt: &SecretString) {
        self.delivered.remove(iou);
        self.registered.insert(iou.to_owned(), pgt.clone());
    }
}
