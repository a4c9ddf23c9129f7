//! Reconstructed geometry values
//!
//! The `Geometry` produced for each geometry subtree: shape kind, spatial
//! reference, dimensionality, the synthesized WKT string and the value
//! obtained by reading that WKT back through the `wkt` crate into a
//! `geo-types` geometry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::namespaces::QName;

/// Spatial reference assigned when the source declares none
pub const DEFAULT_SRID: &str = "EPSG:4326";

// urn:ogc:def:crs:EPSG::4326 and the urn:x-ogc variant
static URN_CRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^urn:(?:x-)?ogc:def:crs:(.+)$").unwrap());

// Bare AUTHORITY:CODE, e.g. EPSG:4326
static AUTHORITY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*):([0-9]+)$").unwrap());

/// The concrete geometry shape being reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeKind {
    /// A single position
    Point,
    /// An open sequence of positions
    LineString,
    /// A closed ring (emitted with the LINESTRING keyword when standalone)
    LinearRing,
    /// One exterior ring plus zero or more interior rings
    Polygon,
    /// A collection of polygons
    MultiPolygon,
    /// A collection of line strings
    MultiLineString,
    /// A collection of points
    MultiPoint,
}

impl ShapeKind {
    /// WKT keyword for this shape
    pub fn wkt_keyword(&self) -> &'static str {
        match self {
            ShapeKind::Point => "POINT",
            ShapeKind::LineString | ShapeKind::LinearRing => "LINESTRING",
            ShapeKind::Polygon => "POLYGON",
            ShapeKind::MultiPolygon => "MULTIPOLYGON",
            ShapeKind::MultiLineString => "MULTILINESTRING",
            ShapeKind::MultiPoint => "MULTIPOINT",
        }
    }

    /// Resolve a shape from a declared type name (local part)
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "PointType" => Some(ShapeKind::Point),
            "LineStringType" | "CurveType" => Some(ShapeKind::LineString),
            "LinearRingType" | "RingType" => Some(ShapeKind::LinearRing),
            "PolygonType" | "SurfaceType" => Some(ShapeKind::Polygon),
            "MultiSurfaceType" | "MultiPolygonType" => Some(ShapeKind::MultiPolygon),
            "MultiCurveType" | "MultiLineStringType" => Some(ShapeKind::MultiLineString),
            "MultiPointType" => Some(ShapeKind::MultiPoint),
            _ => None,
        }
    }

    /// Resolve a shape from a GML element local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(ShapeKind::Point),
            "LineString" | "Curve" => Some(ShapeKind::LineString),
            "LinearRing" | "Ring" => Some(ShapeKind::LinearRing),
            "Polygon" | "Surface" => Some(ShapeKind::Polygon),
            "MultiSurface" | "MultiPolygon" => Some(ShapeKind::MultiPolygon),
            "MultiCurve" | "MultiLineString" => Some(ShapeKind::MultiLineString),
            "MultiPoint" => Some(ShapeKind::MultiPoint),
            _ => None,
        }
    }

    /// Member shape of an aggregate kind (None for atomic shapes)
    pub fn member_kind(&self) -> Option<ShapeKind> {
        match self {
            ShapeKind::MultiPolygon => Some(ShapeKind::Polygon),
            ShapeKind::MultiLineString => Some(ShapeKind::LineString),
            ShapeKind::MultiPoint => Some(ShapeKind::Point),
            _ => None,
        }
    }
}

/// Check whether a declared type name (local part) is one of the recognized
/// geometry-property wrapper types
pub fn is_geometry_property_type(name: &str) -> bool {
    matches!(
        name,
        "GeometryPropertyType"
            | "GeometricPrimitivePropertyType"
            | "PointPropertyType"
            | "CurvePropertyType"
            | "LineStringPropertyType"
            | "SurfacePropertyType"
            | "PolygonPropertyType"
            | "MultiSurfacePropertyType"
            | "MultiPolygonPropertyType"
            | "MultiCurvePropertyType"
            | "MultiLineStringPropertyType"
            | "MultiPointPropertyType"
    )
}

/// Normalize a `srsName` attribute value to an `AUTHORITY:CODE` identifier
///
/// Recognizes the OGC URN forms (`urn:ogc:def:crs:EPSG::4326`), bare
/// `EPSG:4326` identifiers, OGC HTTP URIs
/// (`http://www.opengis.net/def/crs/EPSG/0/4326`) and the legacy
/// `.../srs/epsg.xml#4326` form. Unrecognized values are kept verbatim.
pub fn parse_srs_name(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = URN_CRS.captures(value) {
        // urn:ogc:def:crs:AUTHORITY:VERSION:CODE, version possibly empty
        let rest = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() >= 2 {
            let authority = parts[0];
            let code = parts[parts.len() - 1];
            if !authority.is_empty() && !code.is_empty() {
                return Some(format!("{}:{}", authority.to_uppercase(), code));
            }
        }
        return Some(value.to_string());
    }

    if let Some(caps) = AUTHORITY_CODE.captures(value) {
        let authority = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let code = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        return Some(format!("{}:{}", authority.to_uppercase(), code));
    }

    if value.starts_with("http://") || value.starts_with("https://") {
        if let Ok(url) = Url::parse(value) {
            if let Some(segments) = url.path_segments() {
                let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
                // http://www.opengis.net/def/crs/EPSG/0/4326
                if let Some(pos) = segments.iter().position(|s| *s == "crs") {
                    if segments.len() >= pos + 2 {
                        let authority = segments[pos + 1];
                        let code = segments[segments.len() - 1];
                        if code != authority {
                            return Some(format!("{}:{}", authority.to_uppercase(), code));
                        }
                    }
                }
                // http://www.opengis.net/gml/srs/epsg.xml#4326
                if let (Some(last), Some(fragment)) = (segments.last(), url.fragment()) {
                    if let Some(stem) = last.strip_suffix(".xml") {
                        return Some(format!("{}:{}", stem.to_uppercase(), fragment));
                    }
                }
            }
        }
        return Some(value.to_string());
    }

    Some(value.to_string())
}

/// Read a WKT string into a `geo-types` geometry
pub fn read_wkt(text: &str) -> std::result::Result<geo_types::Geometry<f64>, String> {
    use wkt::TryFromWkt;
    geo_types::Geometry::try_from_wkt_str(text).map_err(|e| e.to_string())
}

/// A reconstructed spatial value
#[derive(Debug, Clone)]
pub struct Geometry {
    /// The concrete shape
    pub shape: ShapeKind,
    /// Qualified name of the source shape element
    pub source_element: QName,
    /// Stable identifier from the source (`gml:id`), if any
    pub id: Option<String>,
    /// Spatial reference identifier; defaulted at finalization when the
    /// source declares none
    pub srid: Option<String>,
    /// Declared coordinate dimensionality (2 or 3)
    pub dimension: u8,
    /// Synthesized Well-Known Text
    pub wkt: String,
    /// The WKT string read back into a geometry value; `None` when reading
    /// failed or the coordinate text was malformed
    pub parsed: Option<geo_types::Geometry<f64>>,
    /// True until at least one coordinate tuple has been accumulated
    pub is_empty: bool,
    /// Present when coordinate text inside this geometry failed to parse
    pub coordinate_failure: Option<String>,
}

impl Geometry {
    /// Create a placeholder for a shape whose subtree is being parsed
    pub fn new(shape: ShapeKind, source_element: QName) -> Self {
        Self {
            shape,
            source_element,
            id: None,
            srid: None,
            dimension: 2,
            wkt: String::new(),
            parsed: None,
            is_empty: true,
            coordinate_failure: None,
        }
    }

    /// The spatial reference identifier, defaulted when undeclared
    pub fn spatial_ref(&self) -> &str {
        self.srid.as_deref().unwrap_or(DEFAULT_SRID)
    }
}
