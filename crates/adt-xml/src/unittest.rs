//! Unit-test run configuration and result XML
//!
//! The response root is `runResult`, not wrapped in a further envelope.
//! Namespace prefixes and `xmlns` declarations must be stripped before
//! decoding or the namespace-qualified elements silently fail to bind.

use serde::Deserialize;

use crate::error::XmlResult;
use crate::strip::strip_namespaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Harmless,
    Dangerous,
    Critical,
}

impl RiskLevel {
    fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Harmless => "harmless",
            RiskLevel::Dangerous => "dangerous",
            RiskLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Short,
    Medium,
    Long,
}

impl Duration {
    fn as_str(&self) -> &'static str {
        match self {
            Duration::Short => "short",
            Duration::Medium => "medium",
            Duration::Long => "long",
        }
    }
}

pub struct RunConfig<'a> {
    pub object_uris: &'a [&'a str],
    pub risk_level: RiskLevel,
    pub duration: Duration,
    pub with_coverage: bool,
}

pub fn build_run_config(config: &RunConfig) -> String {
    let dangerous = matches!(config.risk_level, RiskLevel::Dangerous | RiskLevel::Critical);
    let critical = matches!(config.risk_level, RiskLevel::Critical);
    let medium = matches!(config.duration, Duration::Medium | Duration::Long);
    let long = matches!(config.duration, Duration::Long);

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><aunit:runConfiguration xmlns:aunit="http://www.sap.com/adt/aunit">"#,
    );
    xml.push_str("<external><coverage active=\"");
    xml.push_str(if config.with_coverage { "true" } else { "false" });
    xml.push_str("\"/></external>");
    xml.push_str(&format!(
        r#"<options><testDetermination strategy="assigned-tests"/><riskLevel harmless="true" dangerous="{dangerous}" critical="{critical}"/><duration short="true" medium="{medium}" long="{long}"/></options>"#,
    ));
    xml.push_str("<adtcore:objectSet xmlns:adtcore=\"http://www.sap.com/adt/core\">");
    for uri in config.object_uris {
        xml.push_str(&format!(r#"<adtcore:objectReference adtcore:uri="{}"/>"#, quick_xml::escape::escape(uri)));
    }
    xml.push_str("</adtcore:objectSet>");
    xml.push_str("</aunit:runConfiguration>");
    xml
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunResult {
    #[serde(rename = "program", default)]
    pub programs: Vec<ProgramResult>,
}

impl RunResult {
    pub fn classes(&self) -> impl Iterator<Item = &TestClass> {
        self.programs.iter().flat_map(|p| p.test_classes.classes.iter())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProgramResult {
    #[serde(rename = "testClasses", default)]
    pub test_classes: TestClasses,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestClasses {
    #[serde(rename = "testClass", default)]
    pub classes: Vec<TestClass>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestClass {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "testMethods", default)]
    pub test_methods: TestMethods,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestMethods {
    #[serde(rename = "testMethod", default)]
    pub methods: Vec<TestMethod>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestMethod {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "alerts", default)]
    pub alerts: Alerts,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Alerts {
    #[serde(rename = "alert", default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    #[serde(rename = "@kind", default)]
    pub kind: String,
    #[serde(rename = "title", default)]
    pub title: String,
}

/// Parse a `runResult` response. An empty or absent `program` list maps to
/// zero test classes, not an error.
pub fn parse_run_result(xml: &str) -> XmlResult<RunResult> {
    let stripped = strip_namespaces(xml)?;
    Ok(quick_xml::de::from_str(&stripped)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?><aunit:runResult xmlns:aunit="http://www.sap.com/adt/aunit"><program adtcore:name="ZFOO" xmlns:adtcore="http://www.sap.com/adt/core"><testClasses><testClass adtcore:name="LCL_TEST"><testMethods><testMethod adtcore:name="TEST_ADDITION"/></testMethods></testClass></testClasses></program></aunit:runResult>"#;

    #[test]
    fn parses_single_class_and_method_with_no_alerts() {
        let result = parse_run_result(SAMPLE).unwrap();
        let classes: Vec<_> = result.classes().collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "LCL_TEST");
        assert_eq!(classes[0].test_methods.methods.len(), 1);
        assert_eq!(classes[0].test_methods.methods[0].name, "TEST_ADDITION");
        assert!(classes[0].test_methods.methods[0].alerts.alerts.is_empty());
    }

    #[test]
    fn empty_run_result_has_zero_classes() {
        let xml = r#"<aunit:runResult xmlns:aunit="urn:x"/>"#;
        let result = parse_run_result(xml).unwrap();
        assert_eq!(result.classes().count(), 0);
    }
}
