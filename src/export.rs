//! JSON export of the feature tree
//!
//! A convenience view for downstream consumers and the CLI. Attributes are
//! keyed with an `@` prefix and text content under `$`, following the usual
//! XML-to-JSON conventions. Geometries appear under `geometry` and
//! `representativePoint` with their WKT and spatial reference.

use serde_json::{json, Map, Value};

use crate::feature::{ComplexFeature, FeatureChild};
use crate::geometry::Geometry;

/// Convert a feature tree to a JSON value keyed by the root's local name
pub fn feature_to_json(feature: &ComplexFeature) -> Value {
    let mut root = Map::new();
    root.insert(feature.local_name().to_string(), node_to_json(feature));
    Value::Object(root)
}

/// Convert a reconstructed geometry to its JSON view
pub fn geometry_to_json(geometry: &Geometry) -> Value {
    let mut map = Map::new();
    map.insert("kind".to_string(), json!(geometry.shape));
    map.insert("wkt".to_string(), json!(geometry.wkt));
    map.insert("srid".to_string(), json!(geometry.spatial_ref()));
    map.insert("dimension".to_string(), json!(geometry.dimension));
    map.insert("isEmpty".to_string(), json!(geometry.is_empty));
    if let Some(ref id) = geometry.id {
        map.insert("id".to_string(), json!(id));
    }
    Value::Object(map)
}

fn node_to_json(feature: &ComplexFeature) -> Value {
    let mut map = Map::new();

    for child in &feature.children {
        match child {
            FeatureChild::Attribute(attr) => {
                map.insert(
                    format!("@{}", attr.qname.local_name()),
                    Value::String(attr.value.clone()),
                );
            }
            FeatureChild::Feature(nested) => {
                let key = nested.local_name().to_string();
                let value = node_to_json(nested);
                match map.remove(&key) {
                    Some(Value::Array(mut items)) => {
                        items.push(value);
                        map.insert(key, Value::Array(items));
                    }
                    Some(existing) => {
                        map.insert(key, Value::Array(vec![existing, value]));
                    }
                    None => {
                        map.insert(key, value);
                    }
                }
            }
        }
    }

    if let Some(ref geometry) = feature.geometry {
        map.insert("geometry".to_string(), geometry_to_json(geometry));
    }
    if let Some(ref point) = feature.representative_point {
        map.insert("representativePoint".to_string(), geometry_to_json(point));
    }

    match &feature.text {
        Some(text) if map.is_empty() => Value::String(text.clone()),
        Some(text) => {
            map.insert("$".to_string(), Value::String(text.clone()));
            Value::Object(map)
        }
        None => Value::Object(map),
    }
}
