//! Where-used (find references) response decoding

use serde::Deserialize;

use crate::error::XmlResult;
use crate::strip::strip_namespaces;

#[derive(Debug, Clone, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "@uri")]
    pub uri: String,
    #[serde(rename = "@type", default)]
    pub object_type: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@packageName", default)]
    pub package: String,
    #[serde(rename = "@usageInformation", default)]
    pub usage_context: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsageReferences {
    #[serde(rename = "referencedObject", default)]
    pub references: Vec<UsageRecord>,
}

/// Anchor for a find-references request: an object URI, optionally a
/// specific line/column within it.
pub struct ReferenceRequest<'a> {
    pub object_uri: &'a str,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

pub fn build_reference_request(req: &ReferenceRequest) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><usagereferences:usageReferenceRequest xmlns:usagereferences="http://www.sap.com/adt/ris/usageReferences">"#,
    );
    xml.push_str(&format!(
        r#"<usagereferences:affectedObjects adtcore:uri="{}" xmlns:adtcore="http://www.sap.com/adt/core">"#,
        quick_xml::escape::escape(req.object_uri)
    ));
    if let (Some(line), Some(column)) = (req.line, req.column) {
        xml.push_str(&format!(
            r#"<usagereferences:position line="{line}" column="{column}"/>"#
        ));
    }
    xml.push_str("</usagereferences:affectedObjects></usagereferences:usageReferenceRequest>");
    xml
}

pub fn parse_usage_references(xml: &str) -> XmlResult<UsageReferences> {
    let stripped = strip_namespaces(xml)?;
    Ok(quick_xml::de::from_str(&stripped)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_usage_records() {
        let xml = r#"<usagereferences:usageReferenceResult xmlns:usagereferences="urn:x"><referencedObject uri="/sap/bc/adt/programs/programs/zfoo" type="PROG/P" name="ZFOO" packageName="$TMP" usageInformation="call"/></usagereferences:usageReferenceResult>"#;
        let result = parse_usage_references(xml).unwrap();
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].name, "ZFOO");
    }

    #[test]
    fn build_request_includes_position_only_when_both_coords_given() {
        let req = ReferenceRequest { object_uri: "/x", line: Some(10), column: None };
        let xml = build_reference_request(&req);
        assert!(!xml.contains("position"));
    }
}
