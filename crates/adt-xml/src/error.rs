//! XML codec errors

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML decode failed: {0}")]
    Decode(#[from] quick_xml::de::DeError),

    #[error("XML encode failed: {0}")]
    Encode(#[from] quick_xml::se::SeError),

    #[error("XML read error: {0}")]
    Read(#[from] quick_xml::Error),

    #[error("required field '{0}' missing from response")]
    MissingField(&'static str),

    #[error("response nesting exceeded the safety depth limit of {0}")]
    DepthExceeded(usize),
}

pub type XmlResult<T> = Result<T, XmlError>;
