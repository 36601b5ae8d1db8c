//! Ticket validation orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use cas_validator_sdk::{
    PGT_URL_PARAM, PROXY_VALIDATE_ENDPOINT, Principal, ProxyCallbackUrlBuilder, ProxyTicketStore,
    SERVICE_VALIDATE_ENDPOINT, ValidationResponse,
};
use tracing::{debug, warn};
use url::Url;
use url::form_urlencoded;

use super::error::DomainError;
use super::{parser, principal, registrar};
use crate::config::{CasValidatorConfig, StaticProxyCallbackUrl};

/// CAS ticket validator.
///
/// Holds only configuration fixed at construction time, so one instance can
/// serve concurrent validations. The proxy ticket store is the only shared
/// mutable state and brings its own synchronization.
pub struct TicketValidator {
    server_url: Url,
    renew: bool,
    proxy: Option<ProxySupport>,
}

struct ProxySupport {
    store: Arc<dyn ProxyTicketStore>,
    /// Callback URL, already URL-encoded for the `pgtUrl` parameter.
    encoded_callback_url: String,
}

impl TicketValidator {
    /// Service-ticket-only validator for the CAS server at `server_url`.
    ///
    /// # Errors
    ///
    /// `Config` if `server_url` is not an absolute `http(s)` URL.
    pub fn new(server_url: &str) -> Result<Self, DomainError> {
        let mut server_url = parse_http_url("server_url", server_url)?;
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        Ok(Self {
            server_url,
            renew: false,
            proxy: None,
        })
    }

    /// Build a validator from configuration.
    ///
    /// Proxy validation is enabled when `store` is supplied, in which case
    /// `cfg.proxy_callback_url` must be an absolute `https` URL.
    ///
    /// # Errors
    ///
    /// `Config` for an unusable server or callback URL, or a store without a
    /// callback URL.
    pub fn from_config(
        cfg: &CasValidatorConfig,
        store: Option<Arc<dyn ProxyTicketStore>>,
    ) -> Result<Self, DomainError> {
        let validator = Self::new(&cfg.server_url)?.with_renew(cfg.renew);

        let Some(store) = store else {
            return Ok(validator);
        };
        let callback = cfg.proxy_callback_url.as_deref().ok_or_else(|| {
            DomainError::Config(
                "proxy_callback_url is required when a proxy ticket store is configured"
                    .to_owned(),
            )
        })?;
        let callback = parse_http_url("proxy_callback_url", callback)?;
        if callback.scheme() != "https" {
            return Err(DomainError::Config(
                "proxy_callback_url must use https".to_owned(),
            ));
        }

        Ok(validator.with_proxy_support(store, &StaticProxyCallbackUrl::new(callback.as_str())))
    }

    /// Enable proxy validation backed by `store`.
    ///
    /// The callback URL is built once, here.
    #[must_use]
    pub fn with_proxy_support(
        mut self,
        store: Arc<dyn ProxyTicketStore>,
        url_builder: &dyn ProxyCallbackUrlBuilder,
    ) -> Self {
        let callback_url = url_builder.construct_proxy_callback_url();
        self.proxy = Some(ProxySupport {
            store,
            encoded_callback_url: urlencoding::encode(&callback_url).into_owned(),
        });
        self
    }

    #[must_use]
    pub fn with_renew(mut self, renew: bool) -> Self {
        self.renew = renew;
        self
    }

    #[must_use]
    pub fn endpoint_suffix(&self) -> &'static str {
        if self.proxy.is_some() {
            PROXY_VALIDATE_ENDPOINT
        } else {
            SERVICE_VALIDATE_ENDPOINT
        }
    }

    #[must_use]
    pub fn extra_parameters(&self) -> HashMap<String, String> {
        self.proxy
            .iter()
            .map(|proxy| (PGT_URL_PARAM.to_owned(), proxy.encoded_callback_url.clone()))
            .collect()
    }

    /// Full validation request URL for `ticket` issued to `service`.
    ///
    /// Extra parameters are appended as-is since their values are already
    /// encoded.
    ///
    /// # Errors
    ///
    /// `Config` if the endpoint cannot be resolved against the server URL.
    pub fn validation_url(&self, service: &str, ticket: &str) -> Result<Url, DomainError> {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("service", service);
        query.append_pair("ticket", ticket);
        if self.renew {
            query.append_pair("renew", "true");
        }
        let mut query = query.finish();
        for (name, value) in self.extra_parameters() {
            query.push('&');
            query.push_str(&name);
            query.push('=');
            query.push_str(&value);
        }

        let mut url = self.server_url.join(self.endpoint_suffix())?;
        url.set_query(Some(&query));
        Ok(url)
    }

    /// Interpret the raw validation response for `ticket`.
    ///
    /// # Errors
    ///
    /// - `EmptyResponse`, `MalformedXml`, `MalformedAttribute`, `Schema` from parsing
    /// - `MissingIdentity` for a success without a user
    /// - `Rejected` for `authenticationFailure`
    /// - `UnexpectedOutcome` for `proxySuccess` / `proxyFailure`
    #[tracing::instrument(skip_all, fields(ticket = %ticket, endpoint = self.endpoint_suffix()))]
    pub fn validate(&self, ticket: &str, raw: &str) -> Result<Principal, DomainError> {
        match parser::parse(raw)? {
            ValidationResponse::AuthenticationSuccess(success) => {
                let principal = principal::build(success)?;
                if let Some(proxy) = &self.proxy {
                    registrar::register(principal.proxy_granting_ticket_iou(), proxy.store.as_ref());
                }
                debug!(
                    user = principal.name(),
                    proxied = principal.is_proxied(),
                    "Ticket validated"
                );
                Ok(principal)
            }
            ValidationResponse::AuthenticationFailure(failure) => {
                warn!(code = %failure.code, "CAS server rejected ticket");
                Err(DomainError::Rejected {
                    ticket: ticket.to_owned(),
                    code: failure.code,
                    message: failure.message,
                })
            }
            other @ (ValidationResponse::ProxySuccess(_) | ValidationResponse::ProxyFailure(_)) => {
                warn!(outcome = %other.kind(), "Proxy outcome received for ticket validation");
                Err(DomainError::UnexpectedOutcome(other.kind()))
            }
        }
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, DomainError> {
    let url = Url::parse(value)
        .map_err(|e| DomainError::Config(format!("{field} '{value}' is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DomainError::Config(format!(
            "{field} must use http or https, got '{scheme}'"
        ))),
    }
}
