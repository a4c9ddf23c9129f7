//! # gmlgeom
//!
//! A streaming, schema-aware GML 3.2 geometry extraction engine.
//!
//! The parser consumes a GML document describing geographic features and
//! produces, per feature, a generic attribute tree ([`ComplexFeature`]) plus
//! reconstructed geometries (point, line, polygon, multi-polygon,
//! multi-point, multi-line) as Well-Known Text and as parsed
//! [`geo-types`](geo_types) values with spatial-reference metadata.
//!
//! Schema awareness is consumed through the [`schema::TypeAnnotations`]
//! boundary: a validating front end supplies declared type names, and the
//! engine classifies geometry-bearing elements from them. The crate ships a
//! lightweight XSD index ([`schema::SchemaIndex`]) for that purpose; it
//! performs no validation of its own.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gmlgeom::{GmlParser, SchemaIndex};
//!
//! let index = SchemaIndex::from_file("city.xsd")?;
//! let parser = GmlParser::new(&index);
//! let root = parser.parse_str(&gml_text)?;
//! for geometry in root.all_geometries() {
//!     println!("{} {}", geometry.spatial_ref(), geometry.wkt);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub mod coords;
pub mod namespaces;

pub mod events;
pub mod schema;

pub mod feature;
pub mod geometry;

pub mod parser;

pub mod export;

// Re-exports for convenience
pub use error::{Error, Result};
pub use feature::{ComplexFeature, FeatureChild, SimpleAttribute};
pub use geometry::{Geometry, ShapeKind, DEFAULT_SRID};
pub use limits::Limits;
pub use namespaces::QName;
pub use parser::{GmlParser, ParserOptions};
pub use schema::{NoAnnotations, SchemaIndex, TypeAnnotations};

/// Version of the gmlgeom library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GML 3.2 namespace
pub const GML_32_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

/// Legacy GML namespace (GML 2 and 3.1 documents)
pub const GML_LEGACY_NAMESPACE: &str = "http://www.opengis.net/gml";

/// XML Schema instance namespace (carries the `xsi:type` override)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
