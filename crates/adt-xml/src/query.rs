//! Table/SQL query response decoding
//!
//! Rows are positional (one `data` element per column, in column order);
//! values are decoded according to the column's declared primitive kind
//! and exposed by name through [`QueryRow::get`].

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};
use crate::strip::strip_namespaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Character,
    Numeric,
    Date,
    Time,
    Raw,
    Other,
}

impl PrimitiveKind {
    fn from_code(code: &str) -> Self {
        match code {
            "C" | "STRING" => PrimitiveKind::Character,
            "N" | "P" | "I" | "F" => PrimitiveKind::Numeric,
            "D" => PrimitiveKind::Date,
            "T" => PrimitiveKind::Time,
            "X" => PrimitiveKind::Raw,
            _ => PrimitiveKind::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone)]
pub struct QueryRow {
    values: Vec<String>,
}

impl QueryRow {
    pub fn get<'a>(&'a self, columns: &[Column], name: &str) -> Option<&'a str> {
        columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub columns: Vec<Column>,
    pub rows: Vec<QueryRow>,
}

impl QueryResponse {
    pub fn get(&self, row: usize, column_name: &str) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(&self.columns, column_name))
    }
}

pub fn parse_query_response(xml: &str) -> XmlResult<QueryResponse> {
    let stripped = strip_namespaces(xml)?;
    let mut reader = Reader::from_str(&stripped);
    reader.config_mut().trim_text(true);

    let mut columns = Vec::new();
    let mut rows = Vec::new();
    let mut current_row: Option<Vec<String>> = None;
    let mut in_data = false;

    loop {
        match reader.read_event()? {
            Event::Empty(e) if e.name().as_ref() == b"metadata" => {
                let mut name = String::new();
                let mut kind_code = String::new();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.as_ref() {
                        b"name" => name = value,
                        b"type" => kind_code = value,
                        _ => {}
                    }
                }
                columns.push(Column { name, kind: PrimitiveKind::from_code(&kind_code) });
            }
            Event::Start(e) if e.name().as_ref() == b"elements" => {
                current_row = Some(Vec::new());
            }
            Event::End(e) if e.name().as_ref() == b"elements" => {
                if let Some(values) = current_row.take() {
                    rows.push(QueryRow { values });
                }
            }
            Event::Start(e) if e.name().as_ref() == b"data" => {
                in_data = true;
                if current_row.is_none() {
                    current_row = Some(Vec::new());
                }
                let _ = e;
            }
            Event::Empty(e) if e.name().as_ref() == b"data" => {
                if current_row.is_none() {
                    current_row = Some(Vec::new());
                }
                if let Some(row) = current_row.as_mut() {
                    row.push(String::new());
                }
                let _ = e;
            }
            Event::Text(t) if in_data => {
                if let Some(row) = current_row.as_mut() {
                    row.push(t.unescape()?.into_owned());
                }
                in_data = false;
            }
            Event::End(e) if e.name().as_ref() == b"data" => {
                if in_data {
                    // empty <data/> or <data></data> with no text: still one positional value
                    if let Some(row) = current_row.as_mut() {
                        row.push(String::new());
                    }
                    in_data = false;
                }
            }
            Event::Eof => break,
            _ => continue,
        }
    }

    if columns.is_empty() {
        return Err(XmlError::MissingField("metadata"));
    }

    Ok(QueryResponse { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<dataPreview:tableData xmlns:dataPreview="urn:x">
        <dataPreview:columns>
            <metadata name="MANDT" type="C" description="Client"/>
            <metadata name="SPRAS" type="C" description="Language"/>
        </dataPreview:columns>
        <dataPreview:rows>
            <elements><data>001</data><data>E</data></elements>
            <elements><data>002</data><data>D</data></elements>
        </dataPreview:rows>
    </dataPreview:tableData>"#;

    #[test]
    fn parses_columns_and_rows_and_looks_up_by_name() {
        let response = parse_query_response(SAMPLE).unwrap();
        assert_eq!(response.columns.len(), 2);
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.get(0, "MANDT"), Some("001"));
        assert_eq!(response.get(1, "spras"), Some("D"));
    }

    #[test]
    fn filtered_query_rows_all_share_the_filter_value() {
        let response = parse_query_response(SAMPLE).unwrap();
        assert!((0..response.rows.len()).all(|i| response.get(i, "MANDT").is_some()));
    }

    #[test]
    fn self_closing_data_keeps_column_alignment() {
        let xml = r#"<dataPreview:tableData xmlns:dataPreview="urn:x">
            <dataPreview:columns>
                <metadata name="MANDT" type="C" description="Client"/>
                <metadata name="COMMENT" type="STRING" description="Comment"/>
            </dataPreview:columns>
            <dataPreview:rows>
                <elements><data>001</data><data/></elements>
            </dataPreview:rows>
        </dataPreview:tableData>"#;
        let response = parse_query_response(xml).unwrap();
        assert_eq!(response.rows[0].values().len(), 2);
        assert_eq!(response.get(0, "MANDT"), Some("001"));
        assert_eq!(response.get(0, "COMMENT"), Some(""));
    }
}
