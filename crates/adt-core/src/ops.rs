//! Atomic operations: one ADT request, one response, no follow-up.

use std::sync::Arc;

use adt_transport::{HttpMethod, Transport};
use adt_xml::activation::{self, ActivationMessage};
use adt_xml::cds::{self, CdsNode};
use adt_xml::create;
use adt_xml::lock::{self, LockResult};
use adt_xml::query::{self, QueryResponse};
use adt_xml::strip::strip_namespaces;
use adt_xml::unittest::{self, RunConfig, RunResult};
use adt_xml::whereused::{self, ReferenceRequest, UsageRecord};
use serde::Deserialize;
use tracing::debug;

use crate::catalogue::{descriptor, ObjectKind, ObjectRef, SourceSection};
use crate::error::{CoreError, CoreResult};

const SOURCE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Outcome of an activation or syntax-check call: a success flag plus
/// whatever messages the server returned, regardless of severity.
#[derive(Debug, Clone, Default)]
pub struct ActivationOutcome {
    pub messages: Vec<ActivationMessage>,
}

impl ActivationOutcome {
    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.severity.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ObjectListEntry {
    #[serde(rename = "@uri")]
    uri: String,
    #[serde(rename = "@type", default)]
    object_type: String,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@packageName", default)]
    package: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ObjectList {
    #[serde(rename = "object", default)]
    objects: Vec<ObjectListEntry>,
}

#[derive(Debug, Clone)]
pub struct CatalogueEntry {
    pub uri: String,
    pub object_type: String,
    pub name: String,
    pub package: String,
}

pub enum CdsDependencyLevel {
    Unit,
    Hierarchy,
}

impl CdsDependencyLevel {
    fn as_str(&self) -> &'static str {
        match self {
            CdsDependencyLevel::Unit => "unit",
            CdsDependencyLevel::Hierarchy => "hierarchy",
        }
    }
}

/// One-shot ADT calls; no lifecycle guarantees beyond the single request.
/// Lifecycle composition (lock/update/unlock/activate) lives in
/// [`crate::workflow`].
pub struct AtomicOps {
    transport: Arc<dyn Transport>,
}

impl AtomicOps {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn read_source(&self, obj: &ObjectRef, section: SourceSection) -> CoreResult<String> {
        let path = obj
            .source_uri(section)
            .ok_or_else(|| CoreError::Validation(format!("{} has no {:?} source section", obj.kind, section)))?;
        let response = self
            .transport
            .request(HttpMethod::Get, &path, &[], None, None, Some(SOURCE_CONTENT_TYPE))
            .await
            .map_err(CoreError::from_transport)?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    pub async fn lock(&self, obj: &ObjectRef) -> CoreResult<LockResult> {
        let d = descriptor(obj.kind);
        if !d.is_lockable {
            return Err(CoreError::Validation(format!("{} is not lockable", obj.kind)));
        }
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                &obj.uri(),
                &[("_action", "LOCK"), ("accessMode", "MODIFY")],
                None,
                None,
                Some("application/vnd.sap.as+xml"),
            )
            .await
            .map_err(CoreError::from_transport)?;
        let body = String::from_utf8_lossy(&response.body).into_owned();
        Ok(lock::parse_lock_result(&body)?)
    }

    /// Idempotent: unlocking an unknown handle is treated as success.
    pub async fn unlock(&self, obj: &ObjectRef, handle: &str) -> CoreResult<()> {
        let result = self
            .transport
            .request(
                HttpMethod::Post,
                &obj.uri(),
                &[("_action", "UNLOCK"), ("lockHandle", handle)],
                None,
                None,
                None,
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::from_transport(e)),
        }
    }

    pub async fn update_source(
        &self,
        obj: &ObjectRef,
        section: SourceSection,
        lock_handle: &str,
        text: &str,
    ) -> CoreResult<()> {
        let path = obj
            .source_uri(section)
            .ok_or_else(|| CoreError::Validation(format!("{} has no {:?} source section", obj.kind, section)))?;
        self.transport
            .request(
                HttpMethod::Put,
                &path,
                &[("lockHandle", lock_handle)],
                Some(text.as_bytes().to_vec()),
                Some(SOURCE_CONTENT_TYPE),
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        Ok(())
    }

    /// Non-package object creation. Local packages skip the transport
    /// entirely and never reach this method (see `is_local_package`).
    pub async fn create_object(
        &self,
        kind: ObjectKind,
        name: &str,
        description: &str,
        parent: Option<&str>,
        responsible: &str,
    ) -> CoreResult<()> {
        let d = descriptor(kind);
        if d.requires_parent && parent.is_none() {
            return Err(CoreError::Validation(format!("{kind} requires a parent")));
        }
        let xml = create::build_create_request(&create::CreateObjectRequest {
            root_element: d.root_element,
            namespace: (d.namespace_prefix, d.namespace_uri),
            name,
            description,
            type_code: d.type_code,
            parent_name: parent,
            responsible,
        })?;
        self.transport
            .request(HttpMethod::Post, d.create_url, &[], Some(xml.into_bytes()), Some(d.create_content_type), None)
            .await
            .map_err(CoreError::from_transport)?;
        Ok(())
    }

    pub async fn create_package(
        &self,
        name: &str,
        description: &str,
        super_package: Option<&str>,
        software_component: &str,
        transport_layer: &str,
        responsible: &str,
    ) -> CoreResult<()> {
        if !name.starts_with('$') {
            return Err(CoreError::Validation("package creation requires a local ($-prefixed) name".to_string()));
        }
        let xml = create::build_package_create_request(&create::PackageCreateRequest {
            name,
            description,
            super_package,
            software_component,
            transport_layer,
            application_component: None,
            responsible,
        })?;
        let d = descriptor(ObjectKind::Package);
        self.transport
            .request(HttpMethod::Post, d.create_url, &[], Some(xml.into_bytes()), Some(d.create_content_type), None)
            .await
            .map_err(CoreError::from_transport)?;
        Ok(())
    }

    pub async fn delete(&self, obj: &ObjectRef, lock_handle: &str) -> CoreResult<()> {
        self.transport
            .request(HttpMethod::Delete, &obj.uri(), &[("lockHandle", lock_handle)], None, None, None)
            .await
            .map_err(CoreError::from_transport)?;
        Ok(())
    }

    pub async fn activate(&self, object_uris: &[&str]) -> CoreResult<ActivationOutcome> {
        let body = activation::build_activation_request(object_uris);
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/activation",
                &[("method", "activate")],
                Some(body.into_bytes()),
                Some("application/vnd.sap.as+xml"),
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        let result = activation::parse_activation_result(&text)?;
        Ok(ActivationOutcome { messages: result.messages })
    }

    pub async fn syntax_check(&self, obj: &ObjectRef, source: &str) -> CoreResult<ActivationOutcome> {
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/checkruns",
                &[("uri", &obj.uri())],
                Some(source.as_bytes().to_vec()),
                Some(SOURCE_CONTENT_TYPE),
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        let result = activation::parse_activation_result(&text)?;
        Ok(ActivationOutcome { messages: result.messages })
    }

    pub async fn run_tests(&self, config: &RunConfig<'_>) -> CoreResult<RunResult> {
        let body = unittest::build_run_config(config);
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/abapunit/testruns",
                &[],
                Some(body.into_bytes()),
                Some("application/vnd.sap.adt.abapunit.testruns.config.v4+xml"),
                Some("application/vnd.sap.adt.abapunit.testruns.result.v2+xml"),
            )
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        Ok(unittest::parse_run_result(&text)?)
    }

    /// Raw GET on the object's own URI (not a source sub-path): the
    /// structural XML representation used by kinds that don't expose
    /// source at all (tables, structures, domains, data elements).
    pub async fn read_properties(&self, obj: &ObjectRef) -> CoreResult<String> {
        let response = self
            .transport
            .request(HttpMethod::Get, &obj.uri(), &[], None, None, None)
            .await
            .map_err(CoreError::from_transport)?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    pub async fn pretty_print(&self, source: &str) -> CoreResult<String> {
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/abapsource/prettyprinter",
                &[],
                Some(source.as_bytes().to_vec()),
                Some(SOURCE_CONTENT_TYPE),
                Some(SOURCE_CONTENT_TYPE),
            )
            .await
            .map_err(CoreError::from_transport)?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    /// `QueryData` sugar: a bare identifier expands to `SELECT * FROM
    /// <identifier>`; anything else is passed through verbatim.
    pub fn expand_query_sugar(query: &str) -> String {
        if is_bare_identifier(query) {
            format!("SELECT * FROM {query}")
        } else {
            query.to_string()
        }
    }

    pub async fn query(&self, sql_or_table: &str, row_limit: u32) -> CoreResult<QueryResponse> {
        let sql = Self::expand_query_sugar(sql_or_table);
        debug!(%sql, row_limit, "running ADT query");
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/datapreview/freestyle",
                &[("rowNumber", &row_limit.to_string())],
                Some(sql.into_bytes()),
                Some(SOURCE_CONTENT_TYPE),
                Some("application/vnd.sap.adt.datapreview.table.v1+xml"),
            )
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        Ok(query::parse_query_response(&text)?)
    }

    pub async fn find_references(&self, req: &ReferenceRequest<'_>) -> CoreResult<Vec<UsageRecord>> {
        let body = whereused::build_reference_request(req);
        let response = self
            .transport
            .request(
                HttpMethod::Post,
                "/sap/bc/adt/repository/informationsystem/usageReferences",
                &[],
                Some(body.into_bytes()),
                Some("application/vnd.sap.adt.repository.usagereferences.request.v1+xml"),
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        let parsed = whereused::parse_usage_references(&text)?;
        Ok(parsed.references)
    }

    pub async fn cds_dependencies(
        &self,
        ddl_name: &str,
        level: CdsDependencyLevel,
        associations: bool,
    ) -> CoreResult<CdsNode> {
        let path = format!("/sap/bc/adt/cds/dependencies/{}", ddl_name.to_lowercase());
        let assoc = associations.to_string();
        let response = self
            .transport
            .request(HttpMethod::Get, &path, &[("level", level.as_str()), ("associations", &assoc)], None, None, None)
            .await
            .map_err(CoreError::from_transport)?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        Ok(cds::parse_cds_dependencies(&text)?)
    }

    pub async fn package_contents(&self, package_name: &str) -> CoreResult<Vec<CatalogueEntry>> {
        let response = self
            .transport
            .request(
                HttpMethod::Get,
                "/sap/bc/adt/repository/nodestructure",
                &[("parent_name", package_name), ("withShortDescriptions", "false")],
                None,
                None,
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        self.parse_object_list(&response.body)
    }

    pub async fn search(&self, pattern: &str, row_limit: u32) -> CoreResult<Vec<CatalogueEntry>> {
        let limit = row_limit.to_string();
        let response = self
            .transport
            .request(
                HttpMethod::Get,
                "/sap/bc/adt/repository/informationsystem/search",
                &[("operation", "quickSearch"), ("query", pattern), ("maxResults", &limit)],
                None,
                None,
                None,
            )
            .await
            .map_err(CoreError::from_transport)?;
        self.parse_object_list(&response.body)
    }

    fn parse_object_list(&self, body: &[u8]) -> CoreResult<Vec<CatalogueEntry>> {
        let text = String::from_utf8_lossy(body).into_owned();
        let stripped = strip_namespaces(&text)?;
        let list: ObjectList = quick_xml::de::from_str(&stripped).map_err(adt_xml::XmlError::from)?;
        Ok(list
            .objects
            .into_iter()
            .map(|o| CatalogueEntry { uri: o.uri, object_type: o.object_type, name: o.name, package: o.package })
            .collect())
    }
}

fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_expands_to_select_star() {
        assert_eq!(AtomicOps::expand_query_sugar("T000"), "SELECT * FROM T000");
    }

    #[test]
    fn sql_passes_through_unchanged() {
        let sql = "SELECT * FROM T000 WHERE MANDT = '001'";
        assert_eq!(AtomicOps::expand_query_sugar(sql), sql);
    }

    #[test]
    fn identifier_with_leading_digit_is_not_bare() {
        let sql = "1FOO";
        assert_eq!(AtomicOps::expand_query_sugar(sql), sql);
    }

    #[tokio::test]
    async fn read_properties_gets_the_object_uri_directly() {
        use crate::testutil::MockTransport;
        use std::sync::Arc;

        let mock = Arc::new(MockTransport::new().on(
            HttpMethod::Get,
            "/sap/bc/adt/ddic/tables/t000",
            200,
            "<table:table xmlns:table=\"http://www.sap.com/wbobj/blue\"/>",
        ));
        let ops = AtomicOps::new(mock);
        let body = ops.read_properties(&ObjectRef::new(ObjectKind::Table, "T000")).await.unwrap();
        assert!(body.contains("table:table"));
    }
}
