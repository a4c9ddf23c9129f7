//! The schema annotation surface
//!
//! The engine does not validate documents. It consumes declared-type
//! annotations from a schema-aware front end through the [`TypeAnnotations`]
//! trait, and ships one lightweight implementation, [`SchemaIndex`], that
//! reads an XSD with roxmltree and records element/attribute declared-type
//! names. Type names are compared by local name; prefixes are resolved and
//! dropped.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::events::ElementStart;
use crate::namespaces::{split_prefixed, QName};
use crate::XSI_NAMESPACE;

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Declared-type lookups supplied by the validating front end
pub trait TypeAnnotations {
    /// Declared type name (local part) for an element, if known
    fn element_type(&self, qname: &QName) -> Option<&str>;

    /// Declared type name (local part) for an attribute of an element
    fn attribute_type(&self, element: &QName, attribute: &QName) -> Option<&str>;
}

/// A null annotation source: every type is unknown
///
/// Parsing with `NoAnnotations` still builds the feature tree, but no
/// element can be classified as geometry-bearing, so no geometry is
/// extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl TypeAnnotations for NoAnnotations {
    fn element_type(&self, _qname: &QName) -> Option<&str> {
        None
    }

    fn attribute_type(&self, _element: &QName, _attribute: &QName) -> Option<&str> {
        None
    }
}

/// Resolve the effective declared type of an opened element
///
/// An explicit `xsi:type` attribute overrides the schema-declared type for
/// this element only; downstream logic sees only the effective type. Pure
/// function: no side effects, and "type unknown" simply yields `None`.
pub fn effective_type(start: &ElementStart, annotations: &dyn TypeAnnotations) -> Option<String> {
    if let Some(value) = start.attribute_ns(XSI_NAMESPACE, "type") {
        let (_, local) = split_prefixed(value.trim());
        if !local.is_empty() {
            return Some(local.to_string());
        }
    }
    annotations.element_type(&start.qname).map(str::to_string)
}

/// A declared-type index read from an XSD document
///
/// Walks every named `xs:element` and `xs:attribute` declaration (global and
/// nested) and records its qualified name and declared type. Performs no
/// validation. Iteration order is the declaration order of the schema, which
/// keeps inspection output stable.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    target_namespace: Option<String>,
    elements: IndexMap<QName, String>,
    attributes: IndexMap<QName, String>,
}

impl SchemaIndex {
    /// Read a schema index from XSD text
    pub fn from_string(xsd: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xsd)
            .map_err(|e| Error::Schema(format!("cannot parse schema: {}", e)))?;
        let root = doc.root_element();
        if root.tag_name().namespace() != Some(XSD_NAMESPACE) || root.tag_name().name() != "schema"
        {
            return Err(Error::Schema(format!(
                "root element is not an XSD schema: {}",
                root.tag_name().name()
            )));
        }

        let target_namespace = root.attribute("targetNamespace").map(str::to_string);
        let qualified_elements = root.attribute("elementFormDefault") == Some("qualified");
        let qualified_attributes = root.attribute("attributeFormDefault") == Some("qualified");

        let mut index = Self {
            target_namespace,
            elements: IndexMap::new(),
            attributes: IndexMap::new(),
        };

        for node in doc.descendants().filter(|n| n.is_element()) {
            if node.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let (name, type_name) = match (node.attribute("name"), node.attribute("type")) {
                (Some(name), Some(type_name)) => (name, type_name),
                _ => continue,
            };
            let global = node
                .parent_element()
                .map(|p| p.tag_name().name() == "schema")
                .unwrap_or(false);
            let form = node.attribute("form");

            match node.tag_name().name() {
                "element" => {
                    let qualified =
                        global || form == Some("qualified") || (form.is_none() && qualified_elements);
                    let qname = index.qualify(name, qualified);
                    index.elements.insert(qname, local_type_name(type_name));
                }
                "attribute" => {
                    let qualified = global
                        || form == Some("qualified")
                        || (form.is_none() && qualified_attributes);
                    let qname = index.qualify(name, qualified);
                    index.attributes.insert(qname, local_type_name(type_name));
                }
                _ => {}
            }
        }

        Ok(index)
    }

    /// Read a schema index from an XSD file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let xsd = fs::read_to_string(path)?;
        Self::from_string(&xsd)
    }

    fn qualify(&self, name: &str, qualified: bool) -> QName {
        if qualified {
            QName::new(self.target_namespace.clone(), name)
        } else {
            QName::local(name)
        }
    }

    /// The schema's target namespace
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Number of indexed element declarations
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of indexed attribute declarations
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Iterate indexed element declarations in schema order
    pub fn elements(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.elements.iter().map(|(q, t)| (q, t.as_str()))
    }

    /// Iterate indexed attribute declarations in schema order
    pub fn attributes(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.attributes.iter().map(|(q, t)| (q, t.as_str()))
    }
}

impl TypeAnnotations for SchemaIndex {
    fn element_type(&self, qname: &QName) -> Option<&str> {
        self.elements.get(qname).map(String::as_str)
    }

    fn attribute_type(&self, _element: &QName, attribute: &QName) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }
}

fn local_type_name(type_name: &str) -> String {
    let (_, local) = split_prefixed(type_name.trim());
    local.to_string()
}
