//! Activation request/response XML

use serde::Deserialize;

use crate::error::XmlResult;
use crate::strip::strip_namespaces;

/// Closed severity taxonomy for activation (and syntax-check) messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Severity {
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "W")]
    Warning,
    #[serde(rename = "I")]
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivationMessage {
    #[serde(rename = "@type", default = "default_severity")]
    pub severity: Severity,
    #[serde(rename = "@shortText", default)]
    pub text: String,
    #[serde(rename = "@line", default)]
    pub line: Option<u32>,
    #[serde(rename = "@href", default)]
    pub href: Option<String>,
}

fn default_severity() -> Severity {
    Severity::Info
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActivationResult {
    #[serde(rename = "msg", default)]
    pub messages: Vec<ActivationMessage>,
}

impl ActivationResult {
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity.is_error())
    }
}

pub fn parse_activation_result(xml: &str) -> XmlResult<ActivationResult> {
    let stripped = strip_namespaces(xml)?;
    Ok(quick_xml::de::from_str(&stripped)?)
}

/// Build an activation request body for one or more object URIs.
pub fn build_activation_request(object_uris: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><adtcore:objectReferences xmlns:adtcore="http://www.sap.com/adt/core">"#,
    );
    for uri in object_uris {
        xml.push_str(&format!(
            r#"<adtcore:objectReference adtcore:uri="{}"/>"#,
            quick_xml::escape::escape(uri)
        ));
    }
    xml.push_str("</adtcore:objectReferences>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_severity_messages() {
        let xml = r#"<chkrun:checkMessageList xmlns:chkrun="urn:x"><msg type="E" shortText="syntax error" line="12"/><msg type="W" shortText="unused variable" line="4"/></chkrun:checkMessageList>"#;
        let result = parse_activation_result(xml).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert!(result.has_errors());
        assert_eq!(result.messages[0].line, Some(12));
    }

    #[test]
    fn empty_message_list_has_no_errors() {
        let xml = r#"<checkMessageList/>"#;
        let result = parse_activation_result(xml).unwrap();
        assert!(!result.has_errors());
    }

    #[test]
    fn builds_activation_request_with_one_reference_per_uri() {
        let xml = build_activation_request(&["/sap/bc/adt/programs/programs/zmcp_1"]);
        assert_eq!(xml.matches("adtcore:objectReference ").count(), 1);
    }
}
