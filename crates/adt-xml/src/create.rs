//! Object create request XML
//!
//! Root element and required attributes are kind-specific; package
//! creation additionally requires an exact child ordering that the server
//! rejects the XML for getting wrong, so it gets its own builder instead
//! of a generic one with optional fields.

use quick_xml::escape::escape;

use crate::error::XmlResult;

const ADTCORE_NS: &str = "http://www.sap.com/adt/core";

/// Generic non-package object creation (program, class, interface,
/// function group/module, include).
pub struct CreateObjectRequest<'a> {
    /// Element name without prefix, e.g. `abapProgram`, `abapClass`.
    pub root_element: &'a str,
    /// Namespace prefix/URI pair for the root element, e.g. `("program",
    /// "http://www.sap.com/adt/programs/programs")`.
    pub namespace: (&'a str, &'a str),
    pub name: &'a str,
    pub description: &'a str,
    /// `PROG/P`, `CLAS/OC`, `INTF/OI`, `FUGR/F`, `FUGR/FF`, `PROG/I`, ...
    pub type_code: &'a str,
    pub parent_name: Option<&'a str>,
    pub responsible: &'a str,
}

pub fn build_create_request(req: &CreateObjectRequest) -> XmlResult<String> {
    let (prefix, uri) = req.namespace;
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><{prefix}:{root} xmlns:{prefix}="{uri}" xmlns:adtcore="{adtcore}" adtcore:type="{ty}" adtcore:name="{name}" adtcore:description="{desc}" adtcore:responsible="{resp}""#,
        prefix = prefix,
        root = req.root_element,
        uri = escape(uri),
        adtcore = ADTCORE_NS,
        ty = escape(req.type_code),
        name = escape(req.name),
        desc = escape(req.description),
        resp = escape(req.responsible),
    );

    xml.push_str(r#" adtcore:masterLanguage="EN">"#);
    if let Some(parent) = req.parent_name {
        xml.push_str(&format!(r#"<adtcore:packageRef adtcore:name="{}"/>"#, escape(parent)));
    }
    xml.push_str(&format!("</{prefix}:{root}>", prefix = prefix, root = req.root_element));

    Ok(xml)
}

/// Package creation with the mandated child ordering: `attributes`,
/// `superPackage`, `applicationComponent`, `transport`
/// (`softwareComponent`/`transportLayer`), `translation`, `useAccesses`,
/// `packageInterfaces`, `subPackages`.
pub struct PackageCreateRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub super_package: Option<&'a str>,
    pub software_component: &'a str,
    pub transport_layer: &'a str,
    pub application_component: Option<&'a str>,
    pub responsible: &'a str,
}

pub fn build_package_create_request(req: &PackageCreateRequest) -> XmlResult<String> {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><pak:package xmlns:pak="http://www.sap.com/adt/packages" xmlns:adtcore="{adtcore}" adtcore:type="DEVC/K" adtcore:name="{name}" adtcore:description="{desc}" adtcore:responsible="{resp}">"#,
        adtcore = ADTCORE_NS,
        name = escape(req.name),
        desc = escape(req.description),
        resp = escape(req.responsible),
    );

    xml.push_str("<pak:attributes pak:packageType=\"development\"/>");

    if let Some(super_pkg) = req.super_package {
        xml.push_str(&format!(r#"<pak:superPackage adtcore:name="{}"/>"#, escape(super_pkg)));
    }

    if let Some(app_component) = req.application_component {
        xml.push_str(&format!(r#"<pak:applicationComponent pak:name="{}"/>"#, escape(app_component)));
    }

    xml.push_str(&format!(
        r#"<pak:transport><pak:softwareComponent pak:name="{sc}"/><pak:transportLayer pak:name="{tl}"/></pak:transport>"#,
        sc = escape(req.software_component),
        tl = escape(req.transport_layer),
    ));

    xml.push_str("<pak:translation/>");
    xml.push_str("<pak:useAccesses/>");
    xml.push_str("<pak:packageInterfaces/>");
    xml.push_str("<pak:subPackages/>");

    xml.push_str("</pak:package>");

    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_request_preserves_mandated_child_order() {
        let req = PackageCreateRequest {
            name: "$ZMCP_00001",
            description: "scratch package",
            super_package: Some("$TMP"),
            software_component: "LOCAL",
            transport_layer: "SBX",
            application_component: None,
            responsible: "DEVELOPER",
        };
        let xml = build_package_create_request(&req).unwrap();

        let order = [
            "pak:attributes",
            "pak:superPackage",
            "pak:transport",
            "pak:translation",
            "pak:useAccesses",
            "pak:packageInterfaces",
            "pak:subPackages",
        ];
        let positions: Vec<_> = order.iter().map(|tag| xml.find(tag).expect(tag)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "child order violated: {xml}");
        assert!(!xml.contains("pak:applicationComponent"));
    }

    #[test]
    fn package_request_includes_application_component_when_present() {
        let req = PackageCreateRequest {
            name: "$ZMCP_00002",
            description: "with app component",
            super_package: None,
            software_component: "LOCAL",
            transport_layer: "SBX",
            application_component: Some("BC-DWB"),
            responsible: "DEVELOPER",
        };
        let xml = build_package_create_request(&req).unwrap();
        assert!(xml.find("pak:applicationComponent").unwrap() < xml.find("pak:transport").unwrap());
    }

    #[test]
    fn generic_create_request_sets_parent_ref_when_given() {
        let req = CreateObjectRequest {
            root_element: "abapProgram",
            namespace: ("program", "http://www.sap.com/adt/programs/programs"),
            name: "ZMCP_00001",
            description: "generated program",
            type_code: "PROG/P",
            parent_name: Some("$TMP"),
            responsible: "DEVELOPER",
        };
        let xml = build_create_request(&req).unwrap();
        assert!(xml.contains("adtcore:packageRef adtcore:name=\"$TMP\""));
    }
}
