//! Proxy-granting ticket registration.

use cas_validator_sdk::ProxyTicketStore;
use tracing::{debug, info};

/// Record the IOU to PGT mapping for a successful validation.
///
/// Does nothing when `iou` is absent or empty. An IOU the store cannot
/// resolve yet is not an error: the callback may still be in flight, and the
/// principal is returned regardless.
pub fn register(iou: Option<&str>, store: &dyn ProxyTicketStore) {
    let Some(iou) = iou.filter(|iou| !iou.is_empty()) else {
        return;
    };

    match store.resolve(iou) {
        Some(pgt) => {
            store.register(iou, &pgt);
            debug!(pgt_iou = %iou, "Registered proxy-granting ticket mapping");
        }
        None => {
            info!(pgt_iou = %iou, "No proxy-granting ticket delivered for IOU yet");
        }
    }
}
