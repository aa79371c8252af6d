//! CDS dependency tree decoding
//!
//! The response is a recursive `node` structure. Modeled as a tagged
//! variant with a child list rather than a pointer graph, per the safety
//! guidance in the corpus this was distilled from: the server never emits
//! an infinite response, but a depth limit is a belt-and-braces guard
//! against a malformed or adversarial one.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};
use crate::strip::strip_namespaces;

/// Safety guard against pathologically deep or malformed dependency trees.
pub const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsNode {
    pub name: String,
    /// TABLE, CDS_VIEW, CDS_DB_VIEW, CDS_TABLE_FUNCTION, ...
    pub kind: String,
    /// FROM, INNER_JOIN, LEFT_OUTER_JOIN, ... absent at the tree root.
    pub relation: Option<String>,
    pub activation_state: Option<String>,
    pub children: Vec<CdsNode>,
}

pub fn parse_cds_dependencies(xml: &str) -> XmlResult<CdsNode> {
    let stripped = strip_namespaces(xml)?;
    let mut reader = Reader::from_str(&stripped);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() != b"node" {
                    continue;
                }
                return parse_node(&mut reader, &e, 0, false);
            }
            Event::Empty(e) => {
                if e.name().as_ref() != b"node" {
                    continue;
                }
                return parse_node(&mut reader, &e, 0, true);
            }
            Event::Eof => return Err(XmlError::MissingField("node")),
            _ => continue,
        }
    }
}

/// `is_empty` reflects whether `start` came from a self-closing `<node/>`
/// tag: those have no matching `Event::End` of their own, so the child
/// loop below must not run for them or it will consume the next node's
/// closing tag instead.
fn parse_node(
    reader: &mut Reader<&[u8]>,
    start: &quick_xml::events::BytesStart,
    depth: usize,
    is_empty: bool,
) -> XmlResult<CdsNode> {
    if depth > MAX_DEPTH {
        return Err(XmlError::DepthExceeded(MAX_DEPTH));
    }

    let mut name = String::new();
    let mut kind = String::new();
    let mut relation = None;
    let mut activation_state = None;

    for attr in start.attributes().flatten() {
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"name" => name = value,
            b"type" => kind = value,
            b"relation" => relation = Some(value),
            b"activationState" => activation_state = Some(value),
            _ => {}
        }
    }

    if is_empty {
        return Ok(CdsNode { name, kind, relation, activation_state, children: Vec::new() });
    }

    let mut children = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"node" => {
                children.push(parse_node(reader, &e, depth + 1, false)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"node" => {
                children.push(parse_node(reader, &e, depth + 1, true)?);
            }
            Event::End(e) if e.name().as_ref() == b"node" => break,
            Event::Eof => return Err(XmlError::MissingField("node closing tag")),
            _ => continue,
        }
    }

    Ok(CdsNode { name, kind, relation, activation_state, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_dependency_tree() {
        let xml = r#"<cds:dependencies xmlns:cds="urn:x"><node name="Z_VIEW" type="CDS_VIEW" activationState="active"><node name="T000" type="TABLE" relation="FROM"/></node></cds:dependencies>"#;
        let root = parse_cds_dependencies(xml).unwrap();
        assert_eq!(root.name, "Z_VIEW");
        assert_eq!(root.kind, "CDS_VIEW");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "T000");
        assert_eq!(root.children[0].relation.as_deref(), Some("FROM"));
    }

    #[test]
    fn leaf_siblings_each_keep_their_own_boundary() {
        let xml = r#"<node name="Z_VIEW" type="CDS_VIEW"><node name="T000" type="TABLE" relation="FROM"/><node name="T001" type="TABLE" relation="INNER_JOIN"/></node>"#;
        let root = parse_cds_dependencies(xml).unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name, "T000");
        assert_eq!(root.children[1].name, "T001");
        assert_eq!(root.children[1].relation.as_deref(), Some("INNER_JOIN"));
    }

    #[test]
    fn enforces_depth_limit() {
        let mut xml = String::from(r#"<node name="root" type="CDS_VIEW">"#);
        for i in 0..(MAX_DEPTH + 5) {
            xml.push_str(&format!(r#"<node name="n{i}" type="CDS_VIEW">"#));
        }
        for _ in 0..(MAX_DEPTH + 5) {
            xml.push_str("</node>");
        }
        xml.push_str("</node>");

        let err = parse_cds_dependencies(&xml).unwrap_err();
        assert!(matches!(err, XmlError::DepthExceeded(_)));
    }
}
