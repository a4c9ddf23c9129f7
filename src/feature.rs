//! The generic feature tree
//!
//! Every GML element that is not part of a geometry subtree becomes a
//! `ComplexFeature` node. A node's children interleave schema attributes and
//! nested features in source order, so both can be looked up by name in the
//! order the document presented them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geometry::Geometry;
use crate::namespaces::QName;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// A simple attribute on a feature node
#[derive(Debug, Clone)]
pub struct SimpleAttribute {
    /// Attribute qualified name
    pub qname: QName,
    /// Attribute value as written in the source
    pub value: String,
    /// Declared schema type name, when the annotation surface knows it
    pub declared_type: Option<String>,
}

/// One entry in a feature's child list: either a simple attribute or a
/// nested feature, in source order
#[derive(Debug, Clone)]
pub enum FeatureChild {
    /// A schema attribute of the element
    Attribute(SimpleAttribute),
    /// A nested child element
    Feature(ComplexFeature),
}

/// A node in the generic attribute tree
#[derive(Debug, Clone)]
pub struct ComplexFeature {
    /// Namespace + local name of the source element
    pub qname: QName,
    /// Resolved schema type name; immutable once set, `None` when the type
    /// could not be resolved
    pub declared_type: Option<String>,
    /// Attributes and nested features, interleaved in source order
    pub children: Vec<FeatureChild>,
    /// Whitespace-normalized character content, for leaf nodes
    pub text: Option<String>,
    /// Primary geometry, when one was reconstructed under this feature
    pub geometry: Option<Geometry>,
    /// Secondary point geometry for features that carry both a full
    /// geometry and a separate representative point
    pub representative_point: Option<Geometry>,
    /// Marks a geometry-property wrapper frame; such frames are popped
    /// without ever being appended to the parent's children
    pub(crate) property_wrapper: bool,
}

impl ComplexFeature {
    /// Create a new feature node
    pub fn new(qname: QName, declared_type: Option<String>) -> Self {
        Self {
            qname,
            declared_type,
            children: Vec::new(),
            text: None,
            geometry: None,
            representative_point: None,
            property_wrapper: false,
        }
    }

    /// Get the local name of the source element
    pub fn local_name(&self) -> &str {
        self.qname.local_name()
    }

    /// Get the namespace of the source element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace()
    }

    /// Iterate the simple attributes in source order
    pub fn attributes(&self) -> impl Iterator<Item = &SimpleAttribute> {
        self.children.iter().filter_map(|child| match child {
            FeatureChild::Attribute(attr) => Some(attr),
            FeatureChild::Feature(_) => None,
        })
    }

    /// Iterate the nested features in source order
    pub fn features(&self) -> impl Iterator<Item = &ComplexFeature> {
        self.children.iter().filter_map(|child| match child {
            FeatureChild::Feature(feature) => Some(feature),
            FeatureChild::Attribute(_) => None,
        })
    }

    /// Get an attribute value by local name
    pub fn attribute(&self, local_name: &str) -> Option<&SimpleAttribute> {
        self.attributes()
            .find(|attr| attr.qname.local_name() == local_name)
    }

    /// Find nested features by local name
    pub fn find_features(&self, local_name: &str) -> Vec<&ComplexFeature> {
        self.features()
            .filter(|f| f.local_name() == local_name)
            .collect()
    }

    /// Add a nested feature
    pub fn add_feature(&mut self, feature: ComplexFeature) {
        self.children.push(FeatureChild::Feature(feature));
    }

    /// Add a simple attribute
    pub fn add_attribute(&mut self, attribute: SimpleAttribute) {
        self.children.push(FeatureChild::Attribute(attribute));
    }

    /// Set the normalized text value
    pub(crate) fn set_text(&mut self, text: String) {
        if !text.is_empty() {
            self.text = Some(text);
        }
    }

    /// Attach a reconstructed geometry: the first one wins the primary
    /// slot, a later one becomes the representative point.
    pub fn attach_geometry(&mut self, geometry: Geometry) {
        if self.geometry.is_none() {
            self.geometry = Some(geometry);
        } else {
            self.representative_point = Some(geometry);
        }
    }

    /// Collect every geometry in this subtree, depth-first in source order
    pub fn all_geometries(&self) -> Vec<&Geometry> {
        let mut out = Vec::new();
        self.collect_geometries(&mut out);
        out
    }

    fn collect_geometries<'a>(&'a self, out: &mut Vec<&'a Geometry>) {
        if let Some(ref g) = self.geometry {
            out.push(g);
        }
        if let Some(ref g) = self.representative_point {
            out.push(g);
        }
        for feature in self.features() {
            feature.collect_geometries(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeKind;

    fn point_geometry() -> Geometry {
        let mut g = Geometry::new(ShapeKind::Point, QName::local("Point"));
        g.wkt = "POINT(1 2)".to_string();
        g.is_empty = false;
        g
    }

    #[test]
    fn test_children_interleaved_in_source_order() {
        let mut feature = ComplexFeature::new(QName::local("City"), Some("CityType".into()));
        feature.add_attribute(SimpleAttribute {
            qname: QName::local("id"),
            value: "c1".to_string(),
            declared_type: Some("ID".to_string()),
        });
        feature.add_feature(ComplexFeature::new(QName::local("name"), None));
        feature.add_attribute(SimpleAttribute {
            qname: QName::local("code"),
            value: "75".to_string(),
            declared_type: None,
        });

        assert_eq!(feature.children.len(), 3);
        assert!(matches!(feature.children[0], FeatureChild::Attribute(_)));
        assert!(matches!(feature.children[1], FeatureChild::Feature(_)));
        assert!(matches!(feature.children[2], FeatureChild::Attribute(_)));

        assert_eq!(feature.attribute("id").map(|a| a.value.as_str()), Some("c1"));
        assert_eq!(feature.find_features("name").len(), 1);
    }

    #[test]
    fn test_first_geometry_wins_primary() {
        let mut feature = ComplexFeature::new(QName::local("City"), None);
        feature.attach_geometry(point_geometry());
        assert!(feature.geometry.is_some());
        assert!(feature.representative_point.is_none());

        feature.attach_geometry(point_geometry());
        assert!(feature.geometry.is_some());
        assert!(feature.representative_point.is_some());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n b\t c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_all_geometries_walks_subtree() {
        let mut child = ComplexFeature::new(QName::local("District"), None);
        child.attach_geometry(point_geometry());

        let mut root = ComplexFeature::new(QName::local("City"), None);
        root.attach_geometry(point_geometry());
        root.attach_geometry(point_geometry());
        root.add_feature(child);

        assert_eq!(root.all_geometries().len(), 3);
    }
}
