//! The closed error taxonomy atomics and workflows surface to the tool layer

use adt_transport::TransportError;
use adt_xml::XmlError;

use crate::ops::ActivationOutcome;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("object not found")]
    NotFound,

    #[error("lock conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("ADT exception ({subtype}): {message}")]
    AdtException { message: String, subtype: String },

    /// The workflow step itself succeeded but activation reported errors;
    /// this is not fatal, the caller decides what to do with the messages.
    #[error("activation reported {} error(s)", .0.error_count())]
    PartialFailure(ActivationOutcome),
}

impl CoreError {
    pub fn from_transport(err: TransportError) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound;
        }
        if let TransportError::Status { status, body } = &err {
            if let Some(exc) = adt_xml::exception::try_parse_adt_exception(body) {
                if *status == 423 || exc.subtype.contains("LOCKED") {
                    return CoreError::Conflict(exc.message);
                }
                return CoreError::AdtException { message: exc.message, subtype: exc.subtype };
            }
        }
        if err.is_locked() {
            CoreError::Conflict(err.to_string())
        } else {
            CoreError::Transport(err)
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_with_exception_envelope_becomes_adt_exception() {
        let body = r#"<exc:exception xmlns:exc="http://www.sap.com/abapxml/types/communicationframework"><type id="INVALID_SQL_STATEMENT"/><message lang="en">malformed SQL near 'FORM'</message></exc:exception>"#.to_string();
        let err = CoreError::from_transport(TransportError::Status { status: 400, body });
        match err {
            CoreError::AdtException { subtype, message } => {
                assert_eq!(subtype, "INVALID_SQL_STATEMENT");
                assert_eq!(message, "malformed SQL near 'FORM'");
            }
            other => panic!("expected AdtException, got {other:?}"),
        }
    }

    #[test]
    fn status_body_with_lock_exception_becomes_conflict() {
        let body = r#"<exc:exception xmlns:exc="http://www.sap.com/abapxml/types/communicationframework"><type id="OBJECT_LOCKED_BY_ANOTHER_USER"/><message lang="en">locked by DEVELOPER2</message></exc:exception>"#.to_string();
        let err = CoreError::from_transport(TransportError::Status { status: 403, body });
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn status_body_without_an_envelope_falls_back_to_transport() {
        let err = CoreError::from_transport(TransportError::Status { status: 500, body: "internal server error".to_string() });
        assert!(matches!(err, CoreError::Transport(_)));
    }
}
