//! Domain models for the CAS validator module.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Principal attributes. Keys may repeat on the wire, so every key maps to
/// the values in document order.
pub type Attributes = BTreeMap<String, Vec<String>>;

/// Typed outcome of a CAS 3.0 service response.
///
/// Exactly one result element is present in a valid document; a document
/// without a recognizable result is a parse error, not a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResponse {
    AuthenticationSuccess(AuthenticationSuccess),
    AuthenticationFailure(ServiceFailure),
    ProxySuccess(ProxySuccess),
    ProxyFailure(ServiceFailure),
}

impl ValidationResponse {
    /// Which result element the document carried.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::AuthenticationSuccess(_) => OutcomeKind::AuthenticationSuccess,
            Self::AuthenticationFailure(_) => OutcomeKind::AuthenticationFailure,
            Self::ProxySuccess(_) => OutcomeKind::ProxySuccess,
            Self::ProxyFailure(_) => OutcomeKind::ProxyFailure,
        }
    }
}

/// Payload of `<cas:authenticationSuccess>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticationSuccess {
    /// Authenticated identity. Empty when the server omitted it.
    pub user: String,
    pub attributes: Attributes,
    /// `<cas:proxyGrantingTicket>`: the IOU to resolve against the proxy ticket store.
    pub proxy_granting_ticket_iou: Option<String>,
    /// `<cas:proxies>`, outermost proxy first.
    pub proxies: Option<Vec<String>>,
}

/// Payload of `<cas:authenticationFailure>` and `<cas:proxyFailure>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub code: String,
    pub message: String,
}

/// Payload of `<cas:proxySuccess>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySuccess {
    pub proxy_ticket: String,
}

/// Result element names of a CAS service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    AuthenticationSuccess,
    AuthenticationFailure,
    ProxySuccess,
    ProxyFailure,
}

impl OutcomeKind {
    /// Local element name as it appears in the response document.
    #[must_use]
    pub fn element_name(self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authenticationSuccess",
            Self::AuthenticationFailure => "authenticationFailure",
            Self::ProxySuccess => "proxySuccess",
            Self::ProxyFailure => "proxyFailure",
        }
    }

    /// Inverse of [`OutcomeKind::element_name`].
    #[must_use]
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "authenticationSuccess" => Some(Self::AuthenticationSuccess),
            "authenticationFailure" => Some(Self::AuthenticationFailure),
            "proxySuccess" => Some(Self::ProxySuccess),
            "proxyFailure" => Some(Self::ProxyFailure),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// Authenticated principal produced by a successful ticket validation.
///
/// Immutable once built. The proxy chain, when present, is ordered
/// outermost-first and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    name: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy_granting_ticket_iou: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_chain"
    )]
    proxy_chain: Option<Vec<String>>,
}

fn non_empty_chain<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let chain = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(chain.filter(|proxies| !proxies.is_empty()))
}

impl Principal {
    /// Create a new `Principal` builder for the given identity.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PrincipalBuilder {
        PrincipalBuilder {
            name: name.into(),
            attributes: Attributes::new(),
            proxy_granting_ticket_iou: None,
            proxy_chain: Vec::new(),
        }
    }

    /// Authenticated identity (`<cas:user>`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// First value of attribute `key`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of attribute `key`, in document order.
    #[must_use]
    pub fn attribute_values(&self, key: &str) -> &[String] {
        self.attributes
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn proxy_granting_ticket_iou(&self) -> Option<&str> {
        self.proxy_granting_ticket_iou.as_deref()
    }

    /// Proxies the ticket passed through, outermost first.
    #[must_use]
    pub fn proxy_chain(&self) -> Option<&[String]> {
        self.proxy_chain.as_deref()
    }

    /// Whether the principal was authenticated through at least one proxy.
    #[must_use]
    pub fn is_proxied(&self) -> bool {
        self.proxy_chain.is_some()
    }
}

pub struct PrincipalBuilder {
    name: String,
    attributes: Attributes,
    proxy_granting_ticket_iou: Option<String>,
    proxy_chain: Vec<String>,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    #[must_use]
    pub fn proxy_granting_ticket_iou(mut self, iou: impl Into<String>) -> Self {
        self.proxy_granting_ticket_iou = Some(iou.into());
        self
    }

    #[must_use]
    pub fn proxy_chain(mut self, proxies: Vec<String>) -> Self {
        self.proxy_chain = proxies;
        self
    }

    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            name: self.name,
            attributes: self.attributes,
            proxy_granting_ticket_iou: self.proxy_granting_ticket_iou,
            proxy_chain: (!self.proxy_chain.is_empty()).then_some(self.proxy_chain),
        }
    }
}
