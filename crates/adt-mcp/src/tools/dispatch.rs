//! Routes a `tools/call` name and argument object to the matching
//! `AtomicOps`/`WorkflowComposer` method and shapes the result as JSON.

use std::sync::Arc;

use adt_core::{
    descriptor, kind_from_type_code, AtomicOps, CdsDependencyLevel, ObjectKind, ObjectRef, SourceSection, WorkflowComposer,
};
use adt_xml::unittest::{Duration, RiskLevel, RunConfig};
use adt_xml::whereused::ReferenceRequest;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::{McpError, McpResult};
use crate::tools::args::{
    bool_field, object_ref, opt_str_field, parse_kind, parse_section, responsible_field, str_field, u32_field,
};
use crate::tools::json::{
    activation_json, catalogue_entries_json, cds_json, lock_json, query_json, run_result_json, usage_json,
};

pub struct ToolDispatcher {
    ops: Arc<AtomicOps>,
    workflow: Arc<WorkflowComposer>,
    /// The Basic-auth username, when that's the configured auth method;
    /// `responsible_field`'s fallback ahead of the fixed `DDIC` literal.
    authenticated_user: Option<String>,
}

impl ToolDispatcher {
    pub fn new(ops: Arc<AtomicOps>, workflow: Arc<WorkflowComposer>, authenticated_user: Option<String>) -> Self {
        Self { ops, workflow, authenticated_user }
    }

    fn responsible(&self, args: &Value) -> String {
        responsible_field(args, self.authenticated_user.as_deref())
    }

    pub async fn call(&self, name: &str, args: Value) -> McpResult<Value> {
        match name {
            "GrepObject" => self.grep_object(&args).await,
            "GrepPackage" => self.grep_package(&args).await,
            "SearchObject" => self.search_object(&args).await,
            "GetSource" => self.get_source(&args).await,
            "GetFunctionGroup" | "GetPackage" => self.get_container(&args).await,
            "GetTable" => self.get_properties(&args).await,
            "GetCDSDependencies" => self.get_cds_dependencies(&args).await,
            "QueryData" => self.query_data(&args).await,
            "EditSource" => self.edit_source(&args).await,
            "WriteSource" => self.write_source(&args).await,
            "FindDefinition" | "FindReferences" => self.find_references(&args).await,
            "RunUnitTests" => self.run_unit_tests(&args).await,
            "SyntaxCheck" => self.syntax_check(&args).await,
            "LockObject" => self.lock_object(&args).await,
            "UnlockObject" => self.unlock_object(&args).await,
            "UpdateSource" => self.update_source(&args).await,
            "CreateObject" => self.create_object(&args).await,
            "CreatePackage" => self.create_package(&args).await,
            "DeleteObject" => self.delete_object(&args).await,
            "Activate" => self.activate(&args).await,
            "PrettyPrint" => self.pretty_print(&args).await,
            "CreateAndActivate" => self.create_and_activate(&args).await,
            "ClassWithTests" => self.class_with_tests(&args).await,
            "RenameObject" => self.rename_object(&args).await,
            other => Err(McpError::ToolNotFound(other.to_string())),
        }
    }

    async fn source_for(&self, obj: &ObjectRef, section: SourceSection) -> McpResult<String> {
        if descriptor(obj.kind).supports_source {
            Ok(self.ops.read_source(obj, section).await?)
        } else {
            Ok(self.ops.read_properties(obj).await?)
        }
    }

    async fn grep_object(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let section = match opt_str_field(args, "section") {
            Some(s) => parse_section(&s)?,
            None => SourceSection::Main,
        };
        let pattern = str_field(args, "pattern")?;
        let regex = Regex::new(&pattern).map_err(|e| McpError::Validation(format!("invalid regex: {e}")))?;
        let text = self.source_for(&obj, section).await?;
        Ok(json!({ "object": obj.name, "matches": scan_lines(&text, &regex) }))
    }

    async fn grep_package(&self, args: &Value) -> McpResult<Value> {
        let package = str_field(args, "package")?;
        let pattern = str_field(args, "pattern")?;
        let limit = u32_field(args, "limit", 100);
        let regex = Regex::new(&pattern).map_err(|e| McpError::Validation(format!("invalid regex: {e}")))?;

        let entries = self.ops.package_contents(&package).await?;
        let mut results = Vec::new();
        for entry in entries.into_iter().take(limit as usize) {
            let Some(kind) = kind_from_type_code(&entry.object_type) else { continue };
            if !descriptor(kind).supports_source {
                continue;
            }
            let obj = ObjectRef::new(kind, entry.name.clone());
            let text = match self.ops.read_source(&obj, SourceSection::Main).await {
                Ok(t) => t,
                Err(_) => continue,
            };
            let matches = scan_lines(&text, &regex);
            if !matches.is_empty() {
                results.push(json!({ "object": entry.name, "matches": matches }));
            }
        }
        Ok(json!({ "package": package, "results": results }))
    }

    async fn search_object(&self, args: &Value) -> McpResult<Value> {
        let pattern = str_field(args, "pattern")?;
        let limit = u32_field(args, "limit", 50);
        let entries = self.ops.search(&pattern, limit).await?;
        Ok(catalogue_entries_json(&entries))
    }

    async fn get_source(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let section = match opt_str_field(args, "section") {
            Some(s) => parse_section(&s)?,
            None => SourceSection::Main,
        };
        let source = self.ops.read_source(&obj, section).await?;
        Ok(json!({ "source": source }))
    }

    async fn get_container(&self, args: &Value) -> McpResult<Value> {
        let name = str_field(args, "name")?;
        let entries = self.ops.package_contents(&name).await?;
        Ok(json!({ "name": name, "contents": catalogue_entries_json(&entries) }))
    }

    async fn get_properties(&self, args: &Value) -> McpResult<Value> {
        let name = str_field(args, "name")?;
        let kind = match opt_str_field(args, "kind") {
            Some(k) => parse_kind(&k)?,
            None => ObjectKind::Table,
        };
        let obj = ObjectRef::new(kind, name);
        let properties = self.ops.read_properties(&obj).await?;
        Ok(json!({ "properties": properties }))
    }

    async fn get_cds_dependencies(&self, args: &Value) -> McpResult<Value> {
        let name = str_field(args, "name")?;
        let level = match opt_str_field(args, "level").as_deref() {
            Some("hierarchy") => CdsDependencyLevel::Hierarchy,
            _ => CdsDependencyLevel::Unit,
        };
        let associations = bool_field(args, "associations", false);
        let tree = self.ops.cds_dependencies(&name, level, associations).await?;
        Ok(cds_json(&tree))
    }

    async fn query_data(&self, args: &Value) -> McpResult<Value> {
        let query = str_field(args, "query")?;
        let limit = u32_field(args, "limit", 100);
        let response = self.ops.query(&query, limit).await?;
        Ok(query_json(&response))
    }

    async fn edit_source(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let section = match opt_str_field(args, "section") {
            Some(s) => parse_section(&s)?,
            None => SourceSection::Main,
        };
        let pattern = str_field(args, "pattern")?;
        let replacement = str_field(args, "replacement")?;
        let max_replacements = args.get("max_replacements").and_then(Value::as_u64).map(|n| n as usize);
        let outcome = self.workflow.edit_source(&obj, section, &pattern, &replacement, max_replacements).await?;
        Ok(activation_json(&outcome))
    }

    async fn write_source(&self, args: &Value) -> McpResult<Value> {
        let mode = args
            .get("mode")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::Validation("WriteSource requires `mode` (create or update)".to_string()))?;
        let kind = parse_kind(&str_field(args, "kind")?)?;
        let name = str_field(args, "name")?;
        let source = str_field(args, "source")?;
        let responsible = self.responsible(args);

        match mode {
            "update" => {
                let obj = match opt_str_field(args, "parent") {
                    Some(parent) => ObjectRef::with_parent(kind, name, parent),
                    None => ObjectRef::new(kind, name),
                };
                let outcome = self.workflow.write_source(&obj, SourceSection::Main, &source).await?;
                Ok(activation_json(&outcome))
            }
            "create" => {
                let parent = str_field(args, "parent")?;
                let description = opt_str_field(args, "description").unwrap_or_default();
                let outcome =
                    self.workflow.create_and_activate(kind, &name, &description, &parent, &responsible, &source).await?;
                Ok(activation_json(&outcome))
            }
            other => Err(McpError::Validation(format!("WriteSource mode must be `create` or `update`, got `{other}`"))),
        }
    }

    async fn find_references(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let uri = obj.uri();
        let line = args.get("line").and_then(Value::as_u64).map(|n| n as u32);
        let column = args.get("column").and_then(Value::as_u64).map(|n| n as u32);
        let req = ReferenceRequest { object_uri: &uri, line, column };
        let records = self.ops.find_references(&req).await?;
        Ok(usage_json(&records))
    }

    async fn run_unit_tests(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let uri = obj.uri();
        let risk_level = match opt_str_field(args, "risk_level").as_deref() {
            Some("dangerous") => RiskLevel::Dangerous,
            Some("critical") => RiskLevel::Critical,
            _ => RiskLevel::Harmless,
        };
        let duration = match opt_str_field(args, "duration").as_deref() {
            Some("medium") => Duration::Medium,
            Some("long") => Duration::Long,
            _ => Duration::Short,
        };
        let with_coverage = bool_field(args, "with_coverage", false);
        let config = RunConfig { object_uris: &[&uri], risk_level, duration, with_coverage };
        let result = self.ops.run_tests(&config).await?;
        Ok(run_result_json(&result))
    }

    async fn syntax_check(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let source = str_field(args, "source")?;
        let outcome = self.ops.syntax_check(&obj, &source).await?;
        Ok(activation_json(&outcome))
    }

    async fn lock_object(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let lock = self.ops.lock(&obj).await?;
        Ok(lock_json(&lock))
    }

    async fn unlock_object(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let handle = str_field(args, "handle")?;
        self.ops.unlock(&obj, &handle).await?;
        Ok(json!({ "success": true }))
    }

    async fn update_source(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let section = match opt_str_field(args, "section") {
            Some(s) => parse_section(&s)?,
            None => SourceSection::Main,
        };
        let handle = str_field(args, "handle")?;
        let source = str_field(args, "source")?;
        self.ops.update_source(&obj, section, &handle, &source).await?;
        Ok(json!({ "success": true }))
    }

    async fn create_object(&self, args: &Value) -> McpResult<Value> {
        let kind = parse_kind(&str_field(args, "kind")?)?;
        let name = str_field(args, "name")?;
        let description = opt_str_field(args, "description").unwrap_or_default();
        let parent = opt_str_field(args, "parent");
        let responsible = self.responsible(args);
        self.ops.create_object(kind, &name, &description, parent.as_deref(), &responsible).await?;
        Ok(json!({ "success": true }))
    }

    async fn create_package(&self, args: &Value) -> McpResult<Value> {
        let name = str_field(args, "name")?;
        let description = opt_str_field(args, "description").unwrap_or_default();
        let super_package = opt_str_field(args, "parent");
        let software_component = opt_str_field(args, "software_component").unwrap_or_else(|| "LOCAL".to_string());
        let transport_layer = opt_str_field(args, "transport_layer").unwrap_or_default();
        let responsible = self.responsible(args);
        self.ops
            .create_package(&name, &description, super_package.as_deref(), &software_component, &transport_layer, &responsible)
            .await?;
        Ok(json!({ "success": true }))
    }

    async fn delete_object(&self, args: &Value) -> McpResult<Value> {
        let obj = object_ref(args)?;
        let handle = str_field(args, "handle")?;
        self.ops.delete(&obj, &handle).await?;
        Ok(json!({ "success": true }))
    }

    async fn activate(&self, args: &Value) -> McpResult<Value> {
        let uris: Vec<String> = match args.get("uris").and_then(Value::as_array) {
            Some(list) => list.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            None => vec![object_ref(args)?.uri()],
        };
        let refs: Vec<&str> = uris.iter().map(String::as_str).collect();
        let outcome = self.ops.activate(&refs).await?;
        Ok(activation_json(&outcome))
    }

    async fn pretty_print(&self, args: &Value) -> McpResult<Value> {
        let source = str_field(args, "source")?;
        let formatted = self.ops.pretty_print(&source).await?;
        Ok(json!({ "source": formatted }))
    }

    async fn create_and_activate(&self, args: &Value) -> McpResult<Value> {
        let kind = parse_kind(&str_field(args, "kind")?)?;
        let name = str_field(args, "name")?;
        let description = opt_str_field(args, "description").unwrap_or_default();
        let parent = str_field(args, "parent")?;
        let responsible = self.responsible(args);
        let source = str_field(args, "source")?;
        let outcome = self.workflow.create_and_activate(kind, &name, &description, &parent, &responsible, &source).await?;
        Ok(activation_json(&outcome))
    }

    async fn class_with_tests(&self, args: &Value) -> McpResult<Value> {
        let name = str_field(args, "name")?;
        let description = opt_str_field(args, "description").unwrap_or_default();
        let parent = str_field(args, "parent")?;
        let responsible = self.responsible(args);
        let implementation_source = str_field(args, "implementation_source")?;
        let test_source = str_field(args, "test_source")?;
        let outcome = self
            .workflow
            .class_with_tests(&name, &description, &parent, &responsible, &implementation_source, &test_source)
            .await?;
        Ok(activation_json(&outcome))
    }

    async fn rename_object(&self, args: &Value) -> McpResult<Value> {
        let old = object_ref(args)?;
        let new_name = str_field(args, "new_name")?;
        let description = opt_str_field(args, "description").unwrap_or_default();
        let responsible = self.responsible(args);
        let outcome = self.workflow.rename(&old, &new_name, &description, &responsible).await?;
        Ok(activation_json(&outcome))
    }
}

fn scan_lines(text: &str, pattern: &Regex) -> Vec<Value> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| pattern.is_match(line))
        .map(|(idx, line)| json!({ "line": idx + 1, "text": line }))
        .collect()
}
