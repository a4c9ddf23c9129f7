//! Aggregate reconstructors: MultiPolygon, MultiLineString, MultiPoint
//!
//! One delegation pattern for all three: every member element of the
//! aggregate's base kind descends into a nested reconstructor of that kind,
//! and each member's fragment body is collected parenthesized. Member
//! wrapper elements (`surfaceMember`, `pointMember`, the plural aggregate
//! forms) are passed over.

use crate::error::{Result, StructuralError};
use crate::events::XmlEvent;
use crate::geometry::ShapeKind;
use crate::namespaces::QName;

use super::super::{Flow, Fragment, Mode, Outcome, ParserOptions};
use super::{update_dimension, ShapeMode};

/// Reconstructs a `(member),(member),...` aggregate body
pub(crate) struct MultiShape {
    kind: ShapeKind,
    member: ShapeKind,
    closing: QName,
    dimension: u8,
    depth: usize,
    parts: Vec<String>,
    has_content: bool,
    failure: Option<String>,
}

impl MultiShape {
    pub fn new(kind: ShapeKind, closing: QName, dimension: u8) -> Self {
        let member = kind
            .member_kind()
            .expect("aggregate shapes always have a member kind");
        Self {
            kind,
            member,
            closing,
            dimension,
            depth: 0,
            parts: Vec::new(),
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
                if self.depth > 1
                    && ShapeKind::from_local_name(start.qname.local_name()) == Some(self.member)
                {
                    return Ok(Flow::Descend(Mode::Shape(ShapeMode::for_kind(
                        self.member,
                        start.qname.clone(),
                        self.dimension,
                    ))));
                }
                Ok(Flow::Consumed)
            }
            XmlEvent::Text(_) => Ok(Flow::Consumed),
            XmlEvent::Close(qname) => {
                if self.depth == 0 {
                    return Err(
                        StructuralError::new("unexpected close in aggregate geometry")
                            .with_found(qname.to_string())
                            .with_position(position)
                            .into(),
                    );
                }
                self.depth -= 1;
                if self.depth > 0 {
                    return Ok(Flow::Consumed);
                }
                if *qname != self.closing {
                    return Err(StructuralError::new(
                        "aggregate geometry closed by a different element",
                    )
                    .with_expected(self.closing.to_string())
                    .with_found(qname.to_string())
                    .with_position(position)
                    .into());
                }
                Ok(Flow::Ascend(Outcome::Fragment(Fragment {
                    kind: self.kind,
                    body: self.parts.join(","),
                    empty: !self.has_content,
                    failure: self.failure.take(),
                    dimension: self.dimension,
                })))
            }
        }
    }

    pub fn absorb(&mut self, outcome: Outcome) {
        if let Outcome::Fragment(fragment) = outcome {
            self.parts.push(format!("({})", fragment.body));
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
