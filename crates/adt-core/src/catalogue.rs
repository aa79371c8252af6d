//! Static object catalogue
//!
//! One table drives all URL construction; nothing else in the crate
//! branches per kind. Grounded on the ADT discovery/collection shape in
//! the corpus (each object kind maps to a fixed `href` prefix, root
//! element, and namespace), flattened into a `match` instead of a parsed
//! discovery document since the spec treats the catalogue as static.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Program,
    Class,
    Interface,
    Include,
    FunctionGroup,
    FunctionModule,
    Table,
    Structure,
    DataElement,
    Domain,
    Transaction,
    Package,
    CdsDdlSource,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One addressable source include for a kind that supports source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSection {
    Main,
    Definitions,
    Implementations,
    Macros,
    Testclasses,
}

impl SourceSection {
    fn subpath(&self) -> &'static str {
        match self {
            SourceSection::Main => "source/main",
            SourceSection::Definitions => "includes/definitions",
            SourceSection::Implementations => "includes/implementations",
            SourceSection::Macros => "includes/macros",
            SourceSection::Testclasses => "includes/testclasses",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub kind: ObjectKind,
    pub url_prefix: &'static str,
    pub create_url: &'static str,
    pub root_element: &'static str,
    pub namespace_prefix: &'static str,
    pub namespace_uri: &'static str,
    pub type_code: &'static str,
    pub create_content_type: &'static str,
    pub is_lockable: bool,
    pub is_activatable: bool,
    pub supports_source: bool,
    pub requires_parent: bool,
    sections: &'static [SourceSection],
}

impl Descriptor {
    /// Default (only, for non-class kinds) source include.
    pub fn sections(&self) -> &'static [SourceSection] {
        self.sections
    }

    pub fn source_subpath(&self, section: SourceSection) -> Option<&'static str> {
        if self.sections.contains(&section) {
            Some(section.subpath())
        } else {
            None
        }
    }
}

const CLASS_SECTIONS: &[SourceSection] = &[
    SourceSection::Definitions,
    SourceSection::Implementations,
    SourceSection::Macros,
    SourceSection::Testclasses,
];
const MAIN_ONLY: &[SourceSection] = &[SourceSection::Main];
const NO_SECTIONS: &[SourceSection] = &[];

pub fn descriptor(kind: ObjectKind) -> Descriptor {
    match kind {
        ObjectKind::Program => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/programs/programs",
            create_url: "/sap/bc/adt/programs/programs",
            root_element: "abapProgram",
            namespace_prefix: "program",
            namespace_uri: "http://www.sap.com/adt/programs/programs",
            type_code: "PROG/P",
            create_content_type: "application/vnd.sap.adt.programs.programs.v2+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
        ObjectKind::Class => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/oo/classes",
            create_url: "/sap/bc/adt/oo/classes",
            root_element: "abapClass",
            namespace_prefix: "class",
            namespace_uri: "http://www.sap.com/adt/oo/classes",
            type_code: "CLAS/OC",
            create_content_type: "application/vnd.sap.adt.oo.classes.v4+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: CLASS_SECTIONS,
        },
        ObjectKind::Interface => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/oo/interfaces",
            create_url: "/sap/bc/adt/oo/interfaces",
            root_element: "abapInterface",
            namespace_prefix: "intf",
            namespace_uri: "http://www.sap.com/adt/oo/interfaces",
            type_code: "INTF/OI",
            create_content_type: "application/vnd.sap.adt.oo.interfaces.v2+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
        ObjectKind::Include => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/programs/includes",
            create_url: "/sap/bc/adt/programs/includes",
            root_element: "abapInclude",
            namespace_prefix: "include",
            namespace_uri: "http://www.sap.com/adt/programs/includes",
            type_code: "PROG/I",
            create_content_type: "application/vnd.sap.adt.programs.includes.v2+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
        ObjectKind::FunctionGroup => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/functions/groups",
            create_url: "/sap/bc/adt/functions/groups",
            root_element: "abapFunctionGroup",
            namespace_prefix: "group",
            namespace_uri: "http://www.sap.com/adt/functions/groups",
            type_code: "FUGR/F",
            create_content_type: "application/vnd.sap.adt.functions.groups.v3+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
        ObjectKind::FunctionModule => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/functions/groups/{group}/fmodules",
            create_url: "/sap/bc/adt/functions/groups/{group}/fmodules",
            root_element: "abapFunctionModule",
            namespace_prefix: "fmodule",
            namespace_uri: "http://www.sap.com/adt/functions/fmodules",
            type_code: "FUGR/FF",
            create_content_type: "application/vnd.sap.adt.functions.fmodules.v3+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
        ObjectKind::Table => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/ddic/tables",
            create_url: "/sap/bc/adt/ddic/tables",
            root_element: "table",
            namespace_prefix: "blue",
            namespace_uri: "http://www.sap.com/wbobj/blue",
            type_code: "TABL/DT",
            create_content_type: "application/vnd.sap.adt.blue.tables.v2+xml",
            is_lockable: false,
            is_activatable: false,
            supports_source: false,
            requires_parent: true,
            sections: NO_SECTIONS,
        },
        ObjectKind::Structure => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/ddic/structures",
            create_url: "/sap/bc/adt/ddic/structures",
            root_element: "structure",
            namespace_prefix: "blue",
            namespace_uri: "http://www.sap.com/wbobj/blue",
            type_code: "TABL/DS",
            create_content_type: "application/vnd.sap.adt.blue.structures.v2+xml",
            is_lockable: false,
            is_activatable: false,
            supports_source: false,
            requires_parent: true,
            sections: NO_SECTIONS,
        },
        ObjectKind::DataElement => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/ddic/dataelements",
            create_url: "/sap/bc/adt/ddic/dataelements",
            root_element: "dataElement",
            namespace_prefix: "blue",
            namespace_uri: "http://www.sap.com/wbobj/blue",
            type_code: "DTEL/DE",
            create_content_type: "application/vnd.sap.adt.blue.dataelements.v2+xml",
            is_lockable: false,
            is_activatable: false,
            supports_source: false,
            requires_parent: true,
            sections: NO_SECTIONS,
        },
        ObjectKind::Domain => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/ddic/domains",
            create_url: "/sap/bc/adt/ddic/domains",
            root_element: "domain",
            namespace_prefix: "blue",
            namespace_uri: "http://www.sap.com/wbobj/blue",
            type_code: "DOMA/DD",
            create_content_type: "application/vnd.sap.adt.blue.domains.v2+xml",
            is_lockable: false,
            is_activatable: false,
            supports_source: false,
            requires_parent: true,
            sections: NO_SECTIONS,
        },
        ObjectKind::Transaction => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/vit/wb/object_type/trant/object_name",
            create_url: "/sap/bc/adt/vit/wb/object_type/trant/object_name",
            root_element: "transaction",
            namespace_prefix: "trans",
            namespace_uri: "http://www.sap.com/adt/transactions",
            type_code: "TRAN/T",
            create_content_type: "application/vnd.sap.adt.transactions.v1+xml",
            is_lockable: false,
            is_activatable: false,
            supports_source: false,
            requires_parent: false,
            sections: NO_SECTIONS,
        },
        ObjectKind::Package => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/packages",
            create_url: "/sap/bc/adt/packages",
            root_element: "package",
            namespace_prefix: "pak",
            namespace_uri: "http://www.sap.com/adt/packages",
            type_code: "DEVC/K",
            create_content_type: "application/vnd.sap.adt.packages.v1+xml",
            is_lockable: true,
            is_activatable: false,
            supports_source: false,
            requires_parent: false,
            sections: NO_SECTIONS,
        },
        ObjectKind::CdsDdlSource => Descriptor {
            kind,
            url_prefix: "/sap/bc/adt/ddic/ddl/sources",
            create_url: "/sap/bc/adt/ddic/ddl/sources",
            root_element: "ddlSource",
            namespace_prefix: "ddl",
            namespace_uri: "http://www.sap.com/adt/ddic/ddlsources",
            type_code: "DDLS/DF",
            create_content_type: "application/vnd.sap.adt.ddlsources.v3+xml",
            is_lockable: true,
            is_activatable: true,
            supports_source: true,
            requires_parent: true,
            sections: MAIN_ONLY,
        },
    }
}

/// Reverses `descriptor(kind).type_code` for kinds that carry source, so
/// a catalogue/search result's `@type` attribute can be mapped back to a
/// kind without a second static table.
pub fn kind_from_type_code(code: &str) -> Option<ObjectKind> {
    match code {
        "PROG/P" => Some(ObjectKind::Program),
        "CLAS/OC" => Some(ObjectKind::Class),
        "INTF/OI" => Some(ObjectKind::Interface),
        "PROG/I" => Some(ObjectKind::Include),
        "FUGR/F" => Some(ObjectKind::FunctionGroup),
        "FUGR/FF" => Some(ObjectKind::FunctionModule),
        "DDLS/DF" => Some(ObjectKind::CdsDdlSource),
        _ => None,
    }
}

/// A reference to one repository object. `parent` is required only for
/// function modules (enclosing group) and class sub-includes needing a
/// parent class, which in this catalogue is always the class itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub name: String,
    pub parent: Option<String>,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into(), parent: None }
    }

    pub fn with_parent(kind: ObjectKind, name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self { kind, name: name.into(), parent: Some(parent.into()) }
    }

    /// Canonical ADT URI for this object, e.g.
    /// `/sap/bc/adt/programs/programs/ZFOO`.
    pub fn uri(&self) -> String {
        let d = descriptor(self.kind);
        if self.kind == ObjectKind::FunctionModule {
            let group = self.parent.as_deref().unwrap_or_default();
            format!(
                "/sap/bc/adt/functions/groups/{}/fmodules/{}",
                group.to_lowercase(),
                self.name.to_lowercase()
            )
        } else {
            format!("{}/{}", d.url_prefix, self.name.to_lowercase())
        }
    }

    pub fn source_uri(&self, section: SourceSection) -> Option<String> {
        let d = descriptor(self.kind);
        d.source_subpath(section).map(|sub| format!("{}/{}", self.uri(), sub))
    }

    pub fn is_local_package(&self) -> bool {
        self.kind == ObjectKind::Package && self.name.starts_with('$')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_uri_has_no_unescaped_whitespace() {
        let obj = ObjectRef::new(ObjectKind::Program, "ZMCP_00001");
        assert!(!obj.uri().contains(' '));
        assert_eq!(obj.uri(), "/sap/bc/adt/programs/programs/zmcp_00001");
    }

    #[test]
    fn function_module_uri_nests_under_its_group() {
        let obj = ObjectRef::with_parent(ObjectKind::FunctionModule, "Z_FOO", "ZGROUP");
        assert_eq!(obj.uri(), "/sap/bc/adt/functions/groups/zgroup/fmodules/z_foo");
    }

    #[test]
    fn class_exposes_four_independent_sections() {
        let d = descriptor(ObjectKind::Class);
        assert_eq!(d.sections().len(), 4);
        assert_eq!(d.source_subpath(SourceSection::Definitions), Some("includes/definitions"));
        assert_eq!(d.source_subpath(SourceSection::Main), None);
    }

    #[test]
    fn program_exposes_only_main_section() {
        let d = descriptor(ObjectKind::Program);
        assert_eq!(d.source_subpath(SourceSection::Main), Some("source/main"));
        assert_eq!(d.source_subpath(SourceSection::Definitions), None);
    }

    #[test]
    fn local_package_names_start_with_dollar() {
        assert!(ObjectRef::new(ObjectKind::Package, "$TMP").is_local_package());
        assert!(!ObjectRef::new(ObjectKind::Package, "ZMYPKG").is_local_package());
    }

    #[test]
    fn type_code_round_trips_through_the_catalogue() {
        for kind in [ObjectKind::Program, ObjectKind::Class, ObjectKind::FunctionModule] {
            let code = descriptor(kind).type_code;
            assert_eq!(kind_from_type_code(code), Some(kind));
        }
    }

    #[test]
    fn unknown_type_code_maps_to_none() {
        assert_eq!(kind_from_type_code("DEVC/K"), None);
    }
}
