//! Namespace stripping
//!
//! ADT mixes namespace declarations onto elements inconsistently across
//! dialects. Rather than decode namespace-aware, every dialect here strips
//! element/attribute prefixes and drops `xmlns`/`xmlns:*` declarations
//! first, then binds purely on local names.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::XmlResult;

fn local_name(name: QName) -> Vec<u8> {
    name.local_name().as_ref().to_vec()
}

fn strip_start(reader_event: &BytesStart, writer: &mut Writer<&mut Vec<u8>>, empty: bool) -> XmlResult<()> {
    let mut elem = BytesStart::new(String::from_utf8_lossy(&local_name(reader_event.name())).into_owned());

    for attr in reader_event.attributes().flatten() {
        let key = attr.key;
        let raw = key.as_ref();
        if raw == b"xmlns" || raw.starts_with(b"xmlns:") {
            continue;
        }
        let name = String::from_utf8_lossy(&local_name(key)).into_owned();
        let value = attr.unescape_value()?.into_owned();
        elem.push_attribute((name.as_str(), value.as_str()));
    }

    if empty {
        writer.write_event(Event::Empty(elem))?;
    } else {
        writer.write_event(Event::Start(elem))?;
    }
    Ok(())
}

/// Strip element/attribute namespace prefixes and `xmlns*` declarations
/// from an XML document, returning a plain document safe to decode by
/// local name alone.
pub fn strip_namespaces(xml: &str) -> XmlResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out: Vec<u8> = Vec::with_capacity(xml.len());
    let mut writer = Writer::new(&mut out);

    loop {
        match reader.read_event()? {
            Event::Start(e) => strip_start(&e, &mut writer, false)?,
            Event::Empty(e) => strip_start(&e, &mut writer, true)?,
            Event::End(e) => {
                let name = String::from_utf8_lossy(&local_name(e.name())).into_owned();
                writer.write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefixes_and_xmlns_declarations() {
        let input = r#"<aunit:runResult xmlns:aunit="urn:x" xmlns:adtcore="urn:y"><program adtcore:name="ZFOO"/></aunit:runResult>"#;
        let stripped = strip_namespaces(input).unwrap();
        assert!(!stripped.contains("xmlns"));
        assert!(!stripped.contains("aunit:"));
        assert!(!stripped.contains("adtcore:"));
        assert!(stripped.contains("<runResult>"));
        assert!(stripped.contains(r#"name="ZFOO""#));
    }

    #[test]
    fn leaves_unprefixed_documents_unchanged_in_spirit() {
        let input = "<lockResult handle=\"abc\"/>";
        let stripped = strip_namespaces(input).unwrap();
        assert!(stripped.contains("handle=\"abc\""));
    }
}
