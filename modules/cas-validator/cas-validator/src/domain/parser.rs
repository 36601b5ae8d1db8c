//! CAS 3.0 service response parser.
//!
//! Reads the raw response body into a small element tree keyed by local
//! names (the `cas:` prefix and namespace URI are not checked), then maps
//! the single result element onto a [`ValidationResponse`] variant.

use cas_validator_sdk::{
    Attributes, AuthenticationSuccess, OutcomeKind, ProxySuccess, ServiceFailure,
    ValidationResponse,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::DomainError;

const ROOT_ELEMENT: &str = "serviceResponse";

/// Parse a raw validation response body.
///
/// # Errors
///
/// - `EmptyResponse` if `raw` is empty or whitespace only
/// - `MalformedXml` / `MalformedAttribute` if `raw` is not well-formed XML
/// - `Schema` if the document is not a service response with exactly one
///   recognized result element, or a result element lacks a required part
pub fn parse(raw: &str) -> Result<ValidationResponse, DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::EmptyResponse);
    }

    let root = read_document(raw)?;
    if root.name != ROOT_ELEMENT {
        return Err(DomainError::Schema(format!(
            "expected '{ROOT_ELEMENT}' document element, found '{}'",
            root.name
        )));
    }

    let mut results = root.children.into_iter().filter_map(|child| {
        OutcomeKind::from_element_name(&child.name).map(|kind| (kind, child))
    });
    let (kind, element) = results
        .next()
        .ok_or_else(|| DomainError::Schema("no result element in service response".to_owned()))?;
    if let Some((extra, _)) = results.next() {
        return Err(DomainError::Schema(format!(
            "more than one result element: '{kind}' and '{extra}'"
        )));
    }

    Ok(match kind {
        OutcomeKind::AuthenticationSuccess => {
            ValidationResponse::AuthenticationSuccess(authentication_success(element)?)
        }
        OutcomeKind::AuthenticationFailure => {
            ValidationResponse::AuthenticationFailure(service_failure(element)?)
        }
        OutcomeKind::ProxySuccess => ValidationResponse::ProxySuccess(proxy_success(element)?),
        OutcomeKind::ProxyFailure => ValidationResponse::ProxyFailure(service_failure(element)?),
    })
}

fn authentication_success(element: XmlElement) -> Result<AuthenticationSuccess, DomainError> {
    let mut user: Option<String> = None;
    let mut success = AuthenticationSuccess::default();

    for mut child in element.children {
        let name = std::mem::take(&mut child.name);
        match name.as_str() {
            "user" => {
                if user.replace(child.text).is_some() {
                    return Err(DomainError::Schema(
                        "more than one 'user' element".to_owned(),
                    ));
                }
            }
            "proxyGrantingTicket" => {
                success.proxy_granting_ticket_iou = Some(child.text).filter(|t| !t.is_empty());
            }
            "proxies" => {
                success.proxies = Some(
                    child
                        .children
                        .into_iter()
                        .filter(|p| p.name == "proxy" && !p.text.is_empty())
                        .map(|p| p.text)
                        .collect(),
                );
            }
            "attributes" => collect_attributes(child, &mut success.attributes),
            _ => {}
        }
    }

    success.user = user.unwrap_or_default();
    Ok(success)
}

/// Accepts `<cas:mail>v</cas:mail>` as well as `<cas:attribute name="mail" value="v"/>`.
fn collect_attributes(block: XmlElement, attributes: &mut Attributes) {
    for mut child in block.children {
        let named = if child.name == "attribute" {
            child.take_attr("name")
        } else {
            None
        };
        let (key, value) = match named {
            Some(key) => {
                let value = child.take_attr("value").unwrap_or(child.text);
                (key, value)
            }
            None => (child.name, child.text),
        };
        attributes.entry(key).or_default().push(value);
    }
}

fn service_failure(mut element: XmlElement) -> Result<ServiceFailure, DomainError> {
    let code = element.take_attr("code").ok_or_else(|| {
        DomainError::Schema(format!("'{}' element without 'code' attribute", element.name))
    })?;

    Ok(ServiceFailure {
        code,
        message: element.text,
    })
}

fn proxy_success(element: XmlElement) -> Result<ProxySuccess, DomainError> {
    element
        .children
        .into_iter()
        .find(|child| child.name == "proxyTicket" && !child.text.is_empty())
        .map(|child| ProxySuccess {
            proxy_ticket: child.text,
        })
        .ok_or_else(|| DomainError::Schema("'proxySuccess' without 'proxyTicket'".to_owned()))
}

#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DomainError> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attrs,
            ..Self::default()
        })
    }

    fn take_attr(&mut self, key: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.swap_remove(idx).1)
    }

    fn finish(mut self) -> Self {
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_owned();
        }
        self
    }
}

fn read_document(raw: &str) -> Result<XmlElement, DomainError> {
    let mut reader = Reader::from_str(raw);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DomainError::Schema(
                        "content after the document element".to_owned(),
                    ));
                }
                stack.push(XmlElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DomainError::Schema("unbalanced end tag".to_owned()))?;
                attach(&mut stack, &mut root, element.finish())?;
            }
            Event::Text(text) => push_text(&mut stack, &text.unescape()?)?,
            Event::CData(cdata) => push_text(&mut stack, &String::from_utf8_lossy(&cdata))?,
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DomainError::Schema(format!(
            "document ended inside '{}'",
            open.name
        )));
    }
    root.ok_or_else(|| DomainError::Schema("no document element".to_owned()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DomainError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(DomainError::Schema(
            "more than one document element".to_owned(),
        ))
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), DomainError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(DomainError::Schema(
            "text outside the document element".to_owned(),
        )),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const SUCCESS: &str = r"<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>
    <cas:authenticationSuccess>
        <cas:user>alice</cas:user>
        <cas:attributes>
            <cas:mail>alice@example.org</cas:mail>
            <cas:memberOf>staff</cas:memberOf>
            <cas:memberOf>admins</cas:memberOf>
        </cas:attributes>
        <cas:proxyGrantingTicket>PGTIOU-84678-8a9d</cas:proxyGrantingTicket>
        <cas:proxies>
            <cas:proxy>https://outer.example.org/pgtCallback</cas:proxy>
            <cas:proxy>https://inner.example.org/pgtCallback</cas:proxy>
        </cas:proxies>
    </cas:authenticationSuccess>
</cas:serviceResponse>";

    fn expect_schema(raw: &str) -> String {
        match parse(raw) {
            Err(DomainError::Schema(reason)) => reason,
            other => panic!("Expected Schema, got: {other:?}"),
        }
    }

    #[test]
    fn parses_full_success_document() {
        let ValidationResponse::AuthenticationSuccess(success) = parse(SUCCESS).unwrap() else {
            panic!("expected authenticationSuccess");
        };

        assert_eq!(success.user, "alice");
        assert_eq!(
            success.proxy_granting_ticket_iou.as_deref(),
            Some("PGTIOU-84678-8a9d")
        );
        assert_eq!(
            success.proxies,
            Some(vec![
                "https://outer.example.org/pgtCallback".to_owned(),
                "https://inner.example.org/pgtCallback".to_owned(),
            ])
        );
        assert_eq!(success.attributes["mail"], ["alice@example.org"]);
        assert_eq!(success.attributes["memberOf"], ["staff", "admins"]);
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(parse(SUCCESS).unwrap(), parse(SUCCESS).unwrap());
    }

    #[test]
    fn minimal_success_has_no_optional_parts() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>bob</cas:user></cas:authenticationSuccess>\
                   </cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert_eq!(success.user, "bob");
        assert!(success.attributes.is_empty());
        assert!(success.proxy_granting_ticket_iou.is_none());
        assert!(success.proxies.is_none());
    }

    #[test]
    fn missing_user_parses_as_empty_identity() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:attributes/></cas:authenticationSuccess>\
                   </cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert!(success.user.is_empty());
    }

    #[test]
    fn duplicate_user_is_schema_violation() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>a</cas:user><cas:user>b</cas:user>\
                   </cas:authenticationSuccess></cas:serviceResponse>";

        assert!(expect_schema(raw).contains("user"));
    }

    #[test]
    fn name_value_attributes_are_accepted() {
        let raw = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
  <cas:authenticationSuccess>
    <cas:user>carol</cas:user>
    <cas:attributes>
      <cas:attribute name="uid" value="carol"/>
      <cas:attribute name="role" value="reader"/>
      <cas:attribute name="role" value="writer"/>
    </cas:attributes>
  </cas:authenticationSuccess>
</cas:serviceResponse>"#;

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert_eq!(success.attributes["uid"], ["carol"]);
        assert_eq!(success.attributes["role"], ["reader", "writer"]);
    }

    #[test]
    fn text_is_unescaped_and_cdata_kept() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess>\
                   <cas:user>d&amp;e</cas:user>\
                   <cas:attributes><cas:note><![CDATA[<b>bold</b>]]></cas:note></cas:attributes>\
                   </cas:authenticationSuccess></cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert_eq!(success.user, "d&e");
        assert_eq!(success.attributes["note"], ["<b>bold</b>"]);
    }

    #[test]
    fn mixed_text_and_cdata_keep_inner_whitespace() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess>\
                   <cas:user>  bob </cas:user>\
                   <cas:attributes>\
                   <cas:cn>Bob <![CDATA[Smith]]></cas:cn>\
                   <cas:title><![CDATA[Head of]]> R&amp;D</cas:title>\
                   </cas:attributes>\
                   </cas:authenticationSuccess></cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert_eq!(success.user, "bob");
        assert_eq!(success.attributes["cn"], ["Bob Smith"]);
        assert_eq!(success.attributes["title"], ["Head of R&D"]);
    }

    #[test]
    fn blank_proxy_entries_are_dropped() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>alice</cas:user>\
                   <cas:proxies><cas:proxy/><cas:proxy>https://a.example.org/cb</cas:proxy>\
                   <cas:proxy>  </cas:proxy></cas:proxies>\
                   </cas:authenticationSuccess></cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        assert_eq!(success.proxies, Some(vec!["https://a.example.org/cb".to_owned()]));
    }

    #[test]
    fn only_blank_proxies_mean_not_proxied() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>alice</cas:user>\
                   <cas:proxies><cas:proxy/></cas:proxies>\
                   </cas:authenticationSuccess></cas:serviceResponse>";

        let ValidationResponse::AuthenticationSuccess(success) = parse(raw).unwrap() else {
            panic!("expected authenticationSuccess");
        };
        let principal = crate::domain::principal::build(success).unwrap();
        assert!(!principal.is_proxied());
    }

    #[test]
    fn parses_authentication_failure() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationFailure code=\"INVALID_TICKET\">\n\
                   Ticket ST-1856339-aA5Yuvrxzpv8Tau1cYQ7 not recognized\n\
                   </cas:authenticationFailure></cas:serviceResponse>";

        assert_eq!(
            parse(raw).unwrap(),
            ValidationResponse::AuthenticationFailure(ServiceFailure {
                code: "INVALID_TICKET".to_owned(),
                message: "Ticket ST-1856339-aA5Yuvrxzpv8Tau1cYQ7 not recognized".to_owned(),
            })
        );
    }

    #[test]
    fn failure_without_code_is_schema_violation() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationFailure>nope</cas:authenticationFailure>\
                   </cas:serviceResponse>";

        assert!(expect_schema(raw).contains("code"));
    }

    #[test]
    fn parses_proxy_outcomes() {
        let success = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                       <cas:proxySuccess><cas:proxyTicket>PT-1856392-b98xZrQN4p90ASrw96c8</cas:proxyTicket>\
                       </cas:proxySuccess></cas:serviceResponse>";
        let failure = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                       <cas:proxyFailure code=\"INVALID_REQUEST\">'pgt' and 'targetService' parameters are both required</cas:proxyFailure>\
                       </cas:serviceResponse>";

        assert_eq!(
            parse(success).unwrap(),
            ValidationResponse::ProxySuccess(ProxySuccess {
                proxy_ticket: "PT-1856392-b98xZrQN4p90ASrw96c8".to_owned(),
            })
        );
        assert_eq!(parse(failure).unwrap().kind(), OutcomeKind::ProxyFailure);
    }

    #[test]
    fn proxy_success_without_ticket_is_schema_violation() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:proxySuccess/></cas:serviceResponse>";

        assert!(expect_schema(raw).contains("proxyTicket"));
    }

    #[test]
    fn empty_and_blank_input_is_empty_response() {
        assert!(matches!(parse(""), Err(DomainError::EmptyResponse)));
        assert!(matches!(parse("  \n\t "), Err(DomainError::EmptyResponse)));
    }

    #[test]
    fn non_xml_body_is_rejected() {
        assert!(expect_schema("Service Unavailable").contains("outside"));
    }

    #[test]
    fn wrong_document_element_is_rejected() {
        let reason = expect_schema("<html><body>login</body></html>");
        assert!(reason.contains("serviceResponse"));
    }

    #[test]
    fn missing_result_element_is_rejected() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:somethingElse/></cas:serviceResponse>";

        assert!(expect_schema(raw).contains("no result element"));
    }

    #[test]
    fn two_result_elements_are_rejected() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>a</cas:user></cas:authenticationSuccess>\
                   <cas:authenticationFailure code=\"X\">y</cas:authenticationFailure>\
                   </cas:serviceResponse>";

        assert!(expect_schema(raw).contains("more than one result"));
    }

    #[test]
    fn truncated_document_is_rejected() {
        let raw = "<cas:serviceResponse xmlns:cas='http://www.yale.edu/tp/cas'>\
                   <cas:authenticationSuccess><cas:user>a</cas:user>";

        assert!(parse(raw).is_err());
        assert!(!matches!(parse(raw), Err(DomainError::EmptyResponse)));
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let raw = "<cas:serviceResponse><cas:user>a</cas:proxy></cas:serviceResponse>";

        assert!(matches!(parse(raw), Err(DomainError::MalformedXml(_))));
    }
}
