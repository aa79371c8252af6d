//! Converts `adt-core`/`adt-xml` result types into the JSON shapes handed
//! back to MCP clients as tool output. Kept here, not as `Serialize` impls
//! upstream, so the XML/core crates stay free of MCP-specific shaping.

use adt_core::{ActivationOutcome, CatalogueEntry};
use adt_xml::cds::CdsNode;
use adt_xml::lock::LockResult;
use adt_xml::query::QueryResponse;
use adt_xml::unittest::RunResult;
use adt_xml::whereused::UsageRecord;
use serde_json::{json, Value};

pub fn activation_json(outcome: &ActivationOutcome) -> Value {
    json!({
        "success": !outcome.has_errors(),
        "error_count": outcome.error_count(),
        "messages": outcome.messages.iter().map(|m| json!({
            "severity": format!("{:?}", m.severity),
            "text": m.text,
            "line": m.line,
            "href": m.href,
        })).collect::<Vec<_>>(),
    })
}

pub fn lock_json(lock: &LockResult) -> Value {
    json!({
        "handle": lock.handle,
        "is_local": lock.is_local,
        "transport_request": lock.transport_request,
    })
}

pub fn cds_json(node: &CdsNode) -> Value {
    json!({
        "name": node.name,
        "kind": node.kind,
        "relation": node.relation,
        "activation_state": node.activation_state,
        "children": node.children.iter().map(cds_json).collect::<Vec<_>>(),
    })
}

pub fn usage_json(records: &[UsageRecord]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|r| {
                json!({
                    "uri": r.uri,
                    "object_type": r.object_type,
                    "name": r.name,
                    "package": r.package,
                    "usage_context": r.usage_context,
                })
            })
            .collect(),
    )
}

pub fn query_json(response: &QueryResponse) -> Value {
    let rows: Vec<Value> = response
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (column, value) in response.columns.iter().zip(row.values()) {
                obj.insert(column.name.clone(), Value::String(value.clone()));
            }
            Value::Object(obj)
        })
        .collect();
    json!({
        "columns": response.columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
        "rows": rows,
    })
}

pub fn run_result_json(result: &RunResult) -> Value {
    let classes: Vec<Value> = result
        .classes()
        .map(|class| {
            let methods: Vec<Value> = class
                .test_methods
                .methods
                .iter()
                .map(|method| {
                    json!({
                        "name": method.name,
                        "alerts": method.alerts.alerts.iter().map(|a| json!({
                            "kind": a.kind,
                            "title": a.title,
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect();
            json!({ "name": class.name, "methods": methods })
        })
        .collect();
    json!({ "classes": classes })
}

pub fn catalogue_entries_json(entries: &[CatalogueEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|e| {
                json!({
                    "uri": e.uri,
                    "type": e.object_type,
                    "name": e.name,
                    "package": e.package,
                })
            })
            .collect(),
    )
}
