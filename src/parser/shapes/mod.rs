//! Shape reconstructors
//!
//! One reconstructor per geometry kind. Each is handed the shape's outer
//! element qname (its closing signal) and produces a WKT fragment when that
//! element closes. Leaf reconstructors (point, line) accumulate coordinate
//! text, resetting their buffer on every nested element open so text from
//! different sub-elements never concatenates. Composite reconstructors
//! (polygon, multi) delegate to nested reconstructors and collect their
//! fragments.

mod line;
mod multi;
mod point;
mod polygon;

use tracing::warn;

use crate::error::Result;
use crate::events::{ElementStart, XmlEvent};
use crate::geometry::ShapeKind;
use crate::namespaces::QName;

use super::{Flow, Outcome, ParserOptions};

pub(crate) use line::LineShape;
pub(crate) use multi::MultiShape;
pub(crate) use point::PointShape;
pub(crate) use polygon::PolygonShape;

/// The active shape reconstructor
pub(crate) enum ShapeMode {
    Point(PointShape),
    Line(LineShape),
    Polygon(PolygonShape),
    Multi(MultiShape),
}

impl ShapeMode {
    /// Create the reconstructor for a resolved shape kind
    pub fn for_kind(kind: ShapeKind, closing: QName, dimension: u8) -> Self {
        match kind {
            ShapeKind::Point => ShapeMode::Point(PointShape::new(closing, dimension)),
            ShapeKind::LineString | ShapeKind::LinearRing => {
                ShapeMode::Line(LineShape::new(kind, closing, dimension))
            }
            ShapeKind::Polygon => ShapeMode::Polygon(PolygonShape::new(closing, dimension)),
            ShapeKind::MultiPolygon | ShapeKind::MultiLineString | ShapeKind::MultiPoint => {
                ShapeMode::Multi(MultiShape::new(kind, closing, dimension))
            }
        }
    }

    pub fn handle(
        &mut self,
        event: &XmlEvent,
        options: &ParserOptions,
        position: u64,
    ) -> Result<Flow> {
        match self {
            ShapeMode::Point(shape) => shape.handle(event, options, position),
            ShapeMode::Line(shape) => shape.handle(event, options, position),
            ShapeMode::Polygon(shape) => shape.handle(event, options, position),
            ShapeMode::Multi(shape) => shape.handle(event, options, position),
        }
    }

    pub fn absorb(&mut self, outcome: Outcome) {
        match self {
            ShapeMode::Polygon(shape) => shape.absorb(outcome),
            ShapeMode::Multi(shape) => shape.absorb(outcome),
            // Leaf reconstructors never install nested modes
            ShapeMode::Point(_) | ShapeMode::Line(_) => {}
        }
    }
}

/// Honor a `srsDimension` attribute appearing on a nested element
/// (typically `gml:posList`)
pub(crate) fn update_dimension(dimension: &mut u8, start: &ElementStart) {
    if let Some(value) = start.attribute("srsDimension") {
        match value.trim().parse::<u8>() {
            Ok(dim @ 2..=3) => *dimension = dim,
            _ => warn!(value, "unsupported srsDimension value; keeping {}", *dimension),
        }
    }
}
