//! Point reconstructor

use crate::coords::{format_tuple, parse_tuples};
use crate::error::{Result, StructuralError};
use crate::events::XmlEvent;
use crate::geometry::ShapeKind;
use crate::namespaces::QName;

use super::super::{Flow, Fragment, Outcome, ParserOptions};
use super::update_dimension;

/// Reconstructs a `POINT(x y)` fragment from one coordinate tuple
pub(crate) struct PointShape {
    closing: QName,
    dimension: u8,
    depth: usize,
    buf: String,
}

impl PointShape {
    pub fn new(closing: QName, dimension: u8) -> Self {
        Self {
            closing,
            dimension,
            depth: 0,
            buf: String::new(),
        }
    }

    pub fn handle(
        &mut self,
        event: &XmlEvent,
        options: &ParserOptions,
        position: u64,
    ) -> Result<Flow> {
        match event {
            XmlEvent::Open(start) => {
                self.depth += 1;
                if self.depth > 1 {
                    // Coordinate text belongs to one sub-element at a time
                    self.buf.clear();
                }
                update_dimension(&mut self.dimension, start);
                Ok(Flow::Consumed)
            }
            XmlEvent::Text(text) => {
                self.buf.push_str(text);
                Ok(Flow::Consumed)
            }
            XmlEvent::Close(qname) => {
                if self.depth == 0 {
                    return Err(StructuralError::new("unexpected close in point geometry")
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                self.depth -= 1;
                if self.depth > 0 {
                    return Ok(Flow::Consumed);
                }
                if *qname != self.closing {
                    return Err(StructuralError::new("point closed by a different element")
                        .with_expected(self.closing.to_string())
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                Ok(Flow::Ascend(Outcome::Fragment(self.finish(options))))
            }
        }
    }

    fn finish(&mut self, options: &ParserOptions) -> Fragment {
        let emit_z = options.emit_z;
        match parse_tuples(&self.buf, self.dimension) {
            Ok(tuples) if tuples.is_empty() => Fragment {
                kind: ShapeKind::Point,
                body: String::new(),
                empty: true,
                failure: None,
                dimension: self.dimension,
            },
            Ok(tuples) if tuples.len() == 1 => Fragment {
                kind: ShapeKind::Point,
                body: format_tuple(&tuples[0], emit_z),
                empty: false,
                failure: None,
                dimension: self.dimension,
            },
            Ok(tuples) => Fragment {
                kind: ShapeKind::Point,
                body: format_tuple(&tuples[0], emit_z),
                empty: false,
                failure: Some(format!(
                    "a point takes exactly one coordinate tuple, found {}",
                    tuples.len()
                )),
                dimension: self.dimension,
            },
            Err(error) => Fragment {
                kind: ShapeKind::Point,
                body: String::new(),
                empty: true,
                failure: Some(error.to_string()),
                dimension: self.dimension,
            },
        }
    }
}
