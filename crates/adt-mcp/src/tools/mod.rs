//! Tool catalogue: the JSON-Schema descriptors MCP clients see from
//! `tools/list`, registered in one of two modes.

pub mod args;
pub mod dispatch;
pub mod json;

pub use dispatch::ToolDispatcher;

use serde_json::{json, Value};

use crate::protocol::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    Focused,
    Expert,
}

impl ToolMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "focused" => Some(ToolMode::Focused),
            "expert" => Some(ToolMode::Expert),
            _ => None,
        }
    }
}

fn tool(name: &str, description: &str, schema: Value) -> Tool {
    Tool { name: name.to_string(), description: description.to_string(), input_schema: schema }
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Returns the tool catalogue for the given mode. Every focused tool is
/// present in expert mode too; expert adds direct access to the
/// lower-level atomics and composites the focused set only exposes
/// indirectly.
pub fn catalogue(mode: ToolMode) -> Vec<Tool> {
    let mut tools = focused_tools();
    if mode == ToolMode::Expert {
        tools.extend(expert_only_tools());
    }
    tools
}

fn kind_field() -> Value {
    json!({
        "type": "string",
        "description": "program|class|interface|include|function_group|function_module|table|structure|data_element|domain|transaction|package|cds_ddl_source",
    })
}

fn focused_tools() -> Vec<Tool> {
    vec![
        tool(
            "GrepObject",
            "Read one object's source (or structural properties, for kinds without source) and scan it locally with a regular expression.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "section": { "type": "string", "description": "main|definitions|implementations|macros|testclasses" },
                    "pattern": { "type": "string", "description": "regular expression" },
                }),
                &["kind", "name", "pattern"],
            ),
        ),
        tool(
            "GrepPackage",
            "List a package's contents and regex-scan the source of every source-bearing member.",
            schema(
                json!({
                    "package": { "type": "string" },
                    "pattern": { "type": "string" },
                    "limit": { "type": "integer", "default": 100 },
                }),
                &["package", "pattern"],
            ),
        ),
        tool(
            "SearchObject",
            "Quick-search the repository by name pattern.",
            schema(json!({ "pattern": { "type": "string" }, "limit": { "type": "integer", "default": 50 } }), &["pattern"]),
        ),
        tool(
            "GetSource",
            "Return source text only, for kinds that carry source (program, class, interface, function module, include, CDS DDL source).",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "section": { "type": "string" },
                }),
                &["kind", "name"],
            ),
        ),
        tool(
            "GetFunctionGroup",
            "Return a function group's sub-object listing.",
            schema(json!({ "name": { "type": "string" } }), &["name"]),
        ),
        tool("GetPackage", "Return a package's sub-package and object listing.", schema(json!({ "name": { "type": "string" } }), &["name"])),
        tool(
            "GetTable",
            "Return structural properties for a DDIC kind without source (table, structure, data element, domain).",
            schema(json!({ "name": { "type": "string" }, "kind": { "type": "string", "default": "table" } }), &["name"]),
        ),
        tool(
            "GetCDSDependencies",
            "Return the dependency tree for a CDS DDL source.",
            schema(
                json!({
                    "name": { "type": "string" },
                    "level": { "type": "string", "description": "unit|hierarchy", "default": "unit" },
                    "associations": { "type": "boolean", "default": false },
                }),
                &["name"],
            ),
        ),
        tool(
            "QueryData",
            "Run a freestyle SQL query, or a bare table name (expanded to `SELECT * FROM <name>`).",
            schema(json!({ "query": { "type": "string" }, "limit": { "type": "integer", "default": 100 } }), &["query"]),
        ),
        tool(
            "EditSource",
            "Read an object's source, apply a bounded regex substitution, and write it back through lock/update/unlock/activate. A no-op when the pattern does not match.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "section": { "type": "string" },
                    "pattern": { "type": "string" },
                    "replacement": { "type": "string" },
                    "max_replacements": { "type": "integer" },
                }),
                &["kind", "name", "pattern", "replacement"],
            ),
        ),
        tool(
            "WriteSource",
            "Create or update an object's main source and activate it. `mode` is required; there is no implicit upsert.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "source": { "type": "string" },
                    "mode": { "type": "string", "description": "create|update" },
                    "description": { "type": "string" },
                    "responsible": { "type": "string" },
                }),
                &["kind", "name", "source", "mode"],
            ),
        ),
        tool(
            "FindDefinition",
            "Locate the declaration of the symbol at an object's position (alias over the where-used search).",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "line": { "type": "integer" },
                    "column": { "type": "integer" },
                }),
                &["kind", "name"],
            ),
        ),
        tool(
            "FindReferences",
            "Find all usages of the object, optionally anchored at a line/column.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "line": { "type": "integer" },
                    "column": { "type": "integer" },
                }),
                &["kind", "name"],
            ),
        ),
        tool(
            "RunUnitTests",
            "Run ABAP Unit tests for an object.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "risk_level": { "type": "string", "description": "harmless|dangerous|critical", "default": "harmless" },
                    "duration": { "type": "string", "description": "short|medium|long", "default": "short" },
                    "with_coverage": { "type": "boolean", "default": false },
                }),
                &["kind", "name"],
            ),
        ),
        tool(
            "SyntaxCheck",
            "Check candidate source against the server without saving it.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "source": { "type": "string" },
                }),
                &["kind", "name", "source"],
            ),
        ),
        tool(
            "LockObject",
            "Acquire an edit lock (access mode MODIFY).",
            schema(
                json!({ "kind": kind_field(), "name": { "type": "string" }, "parent": { "type": "string" } }),
                &["kind", "name"],
            ),
        ),
        tool(
            "UnlockObject",
            "Release a previously acquired lock. Idempotent: unlocking an unknown handle succeeds.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "handle": { "type": "string" },
                }),
                &["kind", "name", "handle"],
            ),
        ),
    ]
}

fn expert_only_tools() -> Vec<Tool> {
    vec![
        tool(
            "UpdateSource",
            "Raw atomic: PUT a section's source given an already-held lock handle. No unlock, no activation.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "section": { "type": "string" },
                    "handle": { "type": "string" },
                    "source": { "type": "string" },
                }),
                &["kind", "name", "handle", "source"],
            ),
        ),
        tool(
            "CreateObject",
            "Raw atomic: create a non-package repository object. Does not write source or activate.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "description": { "type": "string" },
                    "responsible": { "type": "string" },
                }),
                &["kind", "name"],
            ),
        ),
        tool(
            "CreatePackage",
            "Raw atomic: create a local ($-prefixed) package.",
            schema(
                json!({
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "parent": { "type": "string" },
                    "software_component": { "type": "string", "default": "LOCAL" },
                    "transport_layer": { "type": "string" },
                    "responsible": { "type": "string" },
                }),
                &["name"],
            ),
        ),
        tool(
            "DeleteObject",
            "Raw atomic: delete an object given an already-held lock handle.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "handle": { "type": "string" },
                }),
                &["kind", "name", "handle"],
            ),
        ),
        tool(
            "Activate",
            "Raw atomic: activate one or more object URIs, or the object named by kind/name.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "uris": { "type": "array", "items": { "type": "string" } },
                }),
                &[],
            ),
        ),
        tool(
            "PrettyPrint",
            "Raw atomic: run the ABAP pretty printer over candidate source.",
            schema(json!({ "source": { "type": "string" } }), &["source"]),
        ),
        tool(
            "CreateAndActivate",
            "Composite: create the object, then lock/write/unlock/activate its initial source.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "description": { "type": "string" },
                    "responsible": { "type": "string" },
                    "source": { "type": "string" },
                }),
                &["kind", "name", "parent", "source"],
            ),
        ),
        tool(
            "ClassWithTests",
            "Composite: create a class, write its implementation and test-class includes, activate once.",
            schema(
                json!({
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "description": { "type": "string" },
                    "responsible": { "type": "string" },
                    "implementation_source": { "type": "string" },
                    "test_source": { "type": "string" },
                }),
                &["name", "parent", "implementation_source", "test_source"],
            ),
        ),
        tool(
            "RenameObject",
            "Composite: copy an object's source under a new name, activate, then delete the original.",
            schema(
                json!({
                    "kind": kind_field(),
                    "name": { "type": "string" },
                    "parent": { "type": "string" },
                    "new_name": { "type": "string" },
                    "description": { "type": "string" },
                    "responsible": { "type": "string" },
                }),
                &["kind", "name", "new_name"],
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_mode_has_seventeen_tools() {
        assert_eq!(catalogue(ToolMode::Focused).len(), 17);
    }

    #[test]
    fn expert_mode_is_a_strict_superset_of_focused() {
        let focused = catalogue(ToolMode::Focused);
        let expert = catalogue(ToolMode::Expert);
        assert!(expert.len() > focused.len());
        for t in &focused {
            assert!(expert.iter().any(|e| e.name == t.name));
        }
    }

    #[test]
    fn write_source_schema_requires_mode() {
        let tools = catalogue(ToolMode::Focused);
        let write_source = tools.iter().find(|t| t.name == "WriteSource").unwrap();
        let required = write_source.input_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "mode"));
    }

    #[test]
    fn tool_mode_parses_known_strings_only() {
        assert_eq!(ToolMode::parse("focused"), Some(ToolMode::Focused));
        assert_eq!(ToolMode::parse("expert"), Some(ToolMode::Expert));
        assert_eq!(ToolMode::parse("bogus"), None);
    }
}
