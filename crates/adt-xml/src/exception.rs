//! ADT exception envelope decoding
//!
//! Non-2xx responses that aren't a bare HTTP status carry a structured
//! body naming a sub-type (e.g. `DEBUGGEE_CONTEXT_LOCKED_BY_ME`) and a
//! human-readable message. Callers attempt this decode first and fall
//! back to a generic transport error when the body doesn't match.

use serde::Deserialize;

use crate::strip::strip_namespaces;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtException {
    pub subtype: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawException {
    #[serde(rename = "type")]
    exc_type: RawId,
    message: RawText,
}

#[derive(Debug, Clone, Deserialize)]
struct RawId {
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawText {
    #[serde(rename = "$text", default)]
    text: String,
}

/// Attempts to decode an ADT exception envelope from an error response
/// body. Returns `None` rather than an error when the body isn't one
/// (a different fault shape, or plain text) — this is a best-effort
/// classification, not the authoritative parse of the response.
pub fn try_parse_adt_exception(body: &str) -> Option<AdtException> {
    let stripped = strip_namespaces(body).ok()?;
    let raw: RawException = quick_xml::de::from_str(&stripped).ok()?;
    Some(AdtException { subtype: raw.exc_type.id, message: raw.message.text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_well_formed_exception_envelope() {
        let xml = r#"<exc:exception xmlns:exc="http://www.sap.com/abapxml/types/communicationframework"><namespace id="com.sap.adt"/><type id="DEBUGGEE_CONTEXT_LOCKED_BY_ME"/><message lang="en">Debuggee is already locked by you</message></exc:exception>"#;
        let exc = try_parse_adt_exception(xml).unwrap();
        assert_eq!(exc.subtype, "DEBUGGEE_CONTEXT_LOCKED_BY_ME");
        assert_eq!(exc.message, "Debuggee is already locked by you");
    }

    #[test]
    fn non_exception_bodies_decode_to_none() {
        assert!(try_parse_adt_exception("Internal Server Error").is_none());
        assert!(try_parse_adt_exception("<html><body>500</body></html>").is_none());
    }
}
