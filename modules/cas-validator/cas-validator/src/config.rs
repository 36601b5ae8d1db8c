//! Configuration for the CAS validator.

use cas_validator_sdk::ProxyCallbackUrlBuilder;
use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasValidatorConfig {
    /// CAS server base URL, e.g. `https://sso.example.org/cas`.
    ///
    /// Validation endpoints are resolved relative to it.
    pub server_url: String,

    /// Absolute `https` URL the CAS server calls back with proxy-granting
    /// tickets. Required when a proxy ticket store is supplied.
    pub proxy_callback_url: Option<String>,

    /// Ask the server to validate only tickets issued from a fresh login.
    pub renew: bool,
}

impl Default for CasValidatorConfig {
    fn default() -> Self {
        Self {
            server_url: "https://localhost:8443/cas".to_owned(),
            proxy_callback_url: None,
            renew: false,
        }
    }
}

/// Callback URL builder returning a fixed, preconfigured URL.
#[derive(Debug, Clone)]
pub struct StaticProxyCallbackUrl {
    url: String,
}

impl StaticProxyCallbackUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ProxyCallbackUrlBuilder for StaticProxyCallbackUrl {
    fn construct_proxy_callback_url(&self) -> String {
        self.url.clone()
    }
}
