//! Builds the authenticated principal from a success payload.

use cas_validator_sdk::{AuthenticationSuccess, Principal};

use super::error::DomainError;

/// Build a [`Principal`] from `<cas:authenticationSuccess>`.
///
/// Attributes are attached whether or not the ticket came through a proxy
/// chain; the chain keeps the server's order.
///
/// # Errors
///
/// `MissingIdentity` if `user` is empty. A success without an identity is a
/// non-conformant server, never an anonymous login.
pub fn build(success: AuthenticationSuccess) -> Result<Principal, DomainError> {
    let AuthenticationSuccess {
        user,
        attributes,
        proxy_granting_ticket_iou,
        proxies,
    } = success;

    if user.is_empty() {
        return Err(DomainError::MissingIdentity);
    }

    let mut builder = Principal::builder(user).attributes(attributes);
    if let Some(iou) = proxy_granting_ticket_iou {
        builder = builder.proxy_granting_ticket_iou(iou);
    }
    if let Some(proxies) = proxies {
        builder = builder.proxy_chain(proxies);
    }

    Ok(builder.build())
}
