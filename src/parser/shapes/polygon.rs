//! Polygon reconstructor
//!
//! Delegates ring construction to a nested line reconstructor once per ring
//! element: the first ring encountered is the exterior, every further one an
//! interior. Each ring fragment is collected parenthesized; the polygon's
//! own close joins them into the `(ext),(int1),...` body.

use crate::error::{Result, StructuralError};
use crate::events::XmlEvent;
use crate::geometry::ShapeKind;
use crate::namespaces::QName;

use super::super::{Flow, Fragment, Mode, Outcome, ParserOptions};
use super::{update_dimension, LineShape, ShapeMode};

/// Reconstructs a `(ring),(ring),...` polygon body from ring fragments
pub(crate) struct PolygonShape {
    closing: QName,
    dimension: u8,
    depth: usize,
    rings: Vec<String>,
    has_content: bool,
    failure: Option<String>,
}

impl PolygonShape {
    pub fn new(closing: QName, dimension: u8) -> Self {
        Self {
            closing,
            dimension,
            depth: 0,
            rings: Vec::new(),
            has_content: false,
            failure: None,
        }
    }

    pub fn handle(
        &mut self,
        event: &XmlEvent,
        _options: &ParserOptions,
        position: u64,
    ) -> Result<Flow> {
        match event {
            XmlEvent::Open(start) => {
                self.depth += 1;
                update_dimension(&mut self.dimension, start);
                if self.depth > 1 {
                    let local = start.qname.local_name();
                    if matches!(
                        ShapeKind::from_local_name(local),
                        Some(ShapeKind::LinearRing) | Some(ShapeKind::LineString)
                    ) {
                        return Ok(Flow::Descend(Mode::Shape(ShapeMode::Line(LineShape::new(
                            ShapeKind::LinearRing,
                            start.qname.clone(),
                            self.dimension,
                        )))));
                    }
                }
                Ok(Flow::Consumed)
            }
            XmlEvent::Text(_) => Ok(Flow::Consumed),
            XmlEvent::Close(qname) => {
                if self.depth == 0 {
                    return Err(StructuralError::new("unexpected close in polygon geometry")
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                self.depth -= 1;
                if self.depth > 0 {
                    return Ok(Flow::Consumed);
                }
                if *qname != self.closing {
                    return Err(StructuralError::new("polygon closed by a different element")
                        .with_expected(self.closing.to_string())
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                Ok(Flow::Ascend(Outcome::Fragment(Fragment {
                    kind: ShapeKind::Polygon,
                    body: self.rings.join(","),
                    empty: !self.has_content,
                    failure: self.failure.take(),
                    dimension: self.dimension,
                })))
            }
        }
    }

    pub fn absorb(&mut self, outcome: Outcome) {
        if let Outcome::Fragment(fragment) = outcome {
            self.rings.push(format!("({})", fragment.body));
            if !fragment.empty {
                self.has_content = true;
            }
            if self.failure.is_none() {
                self.failure = fragment.failure;
            }
            self.dimension = fragment.dimension;
        }
    }
}
