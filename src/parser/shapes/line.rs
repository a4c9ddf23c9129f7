//! LineString / LinearRing reconstructor
//!
//! Used both standalone (a LineString geometry) and nested (ring fragments
//! inside a polygon, members inside a MultiLineString). The fragment body is
//! the bare coordinate list; the installing mode decides whether to wrap it
//! in the LINESTRING keyword or in ring/member parentheses.

use crate::coords::{format_sequence, parse_tuples};
use crate::error::{Error, Result, StructuralError};
use crate::events::XmlEvent;
use crate::geometry::ShapeKind;
use crate::namespaces::QName;

use super::super::{Flow, Fragment, Outcome, ParserOptions};
use super::update_dimension;

/// Reconstructs an `x1 y1, x2 y2, ...` coordinate-list fragment
pub(crate) struct LineShape {
    kind: ShapeKind,
    closing: QName,
    dimension: u8,
    depth: usize,
    buf: String,
}

impl LineShape {
    pub fn new(kind: ShapeKind, closing: QName, dimension: u8) -> Self {
        Self {
            kind,
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
                    return Err(StructuralError::new("unexpected close in line geometry")
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                self.depth -= 1;
                if self.depth > 0 {
                    return Ok(Flow::Consumed);
                }
                if *qname != self.closing {
                    return Err(StructuralError::new("line closed by a different element")
                        .with_expected(self.closing.to_string())
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                let fragment = self.finish(options)?;
                Ok(Flow::Ascend(Outcome::Fragment(fragment)))
            }
        }
    }

    fn finish(&mut self, options: &ParserOptions) -> std::result::Result<Fragment, Error> {
        match parse_tuples(&self.buf, self.dimension) {
            Ok(tuples) => {
                options.limits.check_coordinates(tuples.len())?;
                Ok(Fragment {
                    kind: self.kind,
                    body: format_sequence(&tuples, options.emit_z),
                    empty: tuples.is_empty(),
                    failure: None,
                    dimension: self.dimension,
                })
            }
            Err(error) => Ok(Fragment {
                kind: self.kind,
                body: String::new(),
                empty: true,
                failure: Some(error.to_string()),
                dimension: self.dimension,
            }),
        }
    }
}
