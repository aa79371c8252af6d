//! Argument extraction helpers shared by every tool handler.

use adt_core::{ObjectKind, ObjectRef, SourceSection};
use serde_json::Value;

use crate::error::McpError;

pub fn str_field(args: &Value, key: &str) -> Result<String, McpError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| McpError::Validation(format!("missing required argument `{key}`")))
}

pub fn opt_str_field(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn u32_field(args: &Value, key: &str, default: u32) -> u32 {
    args.get(key).and_then(Value::as_u64).map(|n| n as u32).unwrap_or(default)
}

pub fn bool_field(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn parse_kind(raw: &str) -> Result<ObjectKind, McpError> {
    match raw {
        "program" => Ok(ObjectKind::Program),
        "class" => Ok(ObjectKind::Class),
        "interface" => Ok(ObjectKind::Interface),
        "include" => Ok(ObjectKind::Include),
        "function_group" => Ok(ObjectKind::FunctionGroup),
        "function_module" => Ok(ObjectKind::FunctionModule),
        "table" => Ok(ObjectKind::Table),
        "structure" => Ok(ObjectKind::Structure),
        "data_element" => Ok(ObjectKind::DataElement),
        "domain" => Ok(ObjectKind::Domain),
        "transaction" => Ok(ObjectKind::Transaction),
        "package" => Ok(ObjectKind::Package),
        "cds_ddl_source" => Ok(ObjectKind::CdsDdlSource),
        other => Err(McpError::Validation(format!("unknown object kind `{other}`"))),
    }
}

pub fn parse_section(raw: &str) -> Result<SourceSection, McpError> {
    match raw {
        "main" => Ok(SourceSection::Main),
        "definitions" => Ok(SourceSection::Definitions),
        "implementations" => Ok(SourceSection::Implementations),
        "macros" => Ok(SourceSection::Macros),
        "testclasses" => Ok(SourceSection::Testclasses),
        other => Err(McpError::Validation(format!("unknown source section `{other}`"))),
    }
}

/// Builds the `(kind, name, parent?)` triple every object-addressing tool
/// takes, under the argument names `kind`/`name`/`parent`.
pub fn object_ref(args: &Value) -> Result<ObjectRef, McpError> {
    let kind = parse_kind(&str_field(args, "kind")?)?;
    let name = str_field(args, "name")?;
    Ok(match opt_str_field(args, "parent") {
        Some(parent) => ObjectRef::with_parent(kind, name, parent),
        None => ObjectRef::new(kind, name),
    })
}

pub const DEFAULT_RESPONSIBLE: &str = "DDIC";

/// Resolves the `responsible` developer for a create/rename call: the
/// caller's explicit argument first, then the authenticated user (set for
/// `AuthMethod::Basic` sessions), then the fixed literal.
pub fn responsible_field(args: &Value, authenticated_user: Option<&str>) -> String {
    opt_str_field(args, "responsible")
        .or_else(|| authenticated_user.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_RESPONSIBLE.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn explicit_argument_wins_over_the_authenticated_user() {
        let args = json!({ "responsible": "DEVELOPER1" });
        assert_eq!(responsible_field(&args, Some("DEVELOPER2")), "DEVELOPER1");
    }

    #[test]
    fn authenticated_user_wins_over_the_fixed_literal() {
        let args = json!({});
        assert_eq!(responsible_field(&args, Some("DEVELOPER2")), "DEVELOPER2");
    }

    #[test]
    fn falls_back_to_the_fixed_literal_when_nothing_else_is_known() {
        let args = json!({});
        assert_eq!(responsible_field(&args, None), DEFAULT_RESPONSIBLE);
    }
}
