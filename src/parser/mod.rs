//! The geometry extraction engine
//!
//! One event-dispatch loop consumes the document stream against an explicit,
//! owned stack of parser modes. The bottom mode is always the feature tree
//! builder; detecting a geometry-property wrapper pushes the geometry
//! dispatcher, which in turn pushes one shape reconstructor per nested shape
//! element. Handing off control means pushing a mode and re-dispatching the
//! current event; handing back means popping the mode, delivering its
//! outcome to the mode below, and re-dispatching the close event exactly
//! once. At any instant exactly one mode is active, and modes unwind in
//! LIFO order matching the document's element nesting.

mod property;
mod shapes;
mod tree;

use crate::error::{Error, Result, StructuralError};
use crate::events::{EventReader, XmlEvent};
use crate::feature::ComplexFeature;
use crate::geometry::{Geometry, ShapeKind};
use crate::limits::Limits;
use crate::schema::TypeAnnotations;

pub(crate) use property::PropertyMode;
pub(crate) use shapes::ShapeMode;

/// Parse options
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Emit Z components into WKT for 3-dimensional coordinates.
    /// Off by default: Z is parsed but dropped from the emitted WKT.
    pub emit_z: bool,
    /// Resource limits for this parse
    pub limits: Limits,
}

/// A WKT fragment produced by a completed shape reconstructor
#[derive(Debug)]
pub(crate) struct Fragment {
    /// Shape that produced the fragment
    pub kind: ShapeKind,
    /// Parenthesized-argument body, without the WKT keyword
    pub body: String,
    /// True when no coordinate tuple was accumulated
    pub empty: bool,
    /// Malformed-coordinate message, recoverable at geometry scope
    pub failure: Option<String>,
    /// Dimensionality the reconstructor ended up with
    pub dimension: u8,
}

/// What a popped mode hands to the mode below it
pub(crate) enum Outcome {
    /// A shape reconstructor finished its element
    Fragment(Fragment),
    /// The geometry dispatcher finished the whole geometry subtree;
    /// `None` when the geometry degraded to missing
    Geometry(Option<Box<Geometry>>),
}

/// What a mode does with the current event
pub(crate) enum Flow {
    /// Event fully handled
    Consumed,
    /// Push a new mode and re-dispatch the same event into it
    Descend(Mode),
    /// Pop this mode, deliver the outcome below, re-dispatch the event
    Ascend(Outcome),
}

/// One entry of the mode stack
pub(crate) enum Mode {
    /// Feature tree builder (always at the bottom)
    Tree,
    /// Geometry dispatcher for one geometry-property subtree
    Property(PropertyMode),
    /// Shape reconstructor for one shape element
    Shape(ShapeMode),
}

/// Streaming, schema-aware GML parser
///
/// Borrows a [`TypeAnnotations`] source for the lifetime of the parser;
/// each `parse_*` call processes one complete document synchronously and
/// yields the document's root feature.
pub struct GmlParser<'a> {
    annotations: &'a dyn TypeAnnotations,
    options: ParserOptions,
}

impl<'a> GmlParser<'a> {
    /// Create a parser with default options
    pub fn new(annotations: &'a dyn TypeAnnotations) -> Self {
        Self {
            annotations,
            options: ParserOptions::default(),
        }
    }

    /// Create a parser with explicit options
    pub fn with_options(annotations: &'a dyn TypeAnnotations, options: ParserOptions) -> Self {
        Self {
            annotations,
            options,
        }
    }

    /// Parse one GML document from a string
    pub fn parse_str(&self, xml: &str) -> Result<ComplexFeature> {
        let mut reader = EventReader::new(xml, self.options.limits.clone())?;
        let mut state = tree::TreeState::new();
        let mut modes: Vec<Mode> = vec![Mode::Tree];

        while let Some(event) = reader.next_event()? {
            let position = reader.position();
            self.dispatch(&mut modes, &mut state, event, position)?;
        }

        if modes.len() > 1 {
            return Err(StructuralError::new("document ended inside a geometry subtree").into());
        }
        if let Some(open) = state.stack.last() {
            return Err(StructuralError::new("document ended with open elements")
                .with_expected(open.qname.to_string())
                .into());
        }
        state
            .root
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    /// Parse one GML document from bytes
    pub fn parse_bytes(&self, xml: &[u8]) -> Result<ComplexFeature> {
        let text = std::str::from_utf8(xml)
            .map_err(|e| Error::Xml(format!("document is not valid UTF-8: {}", e)))?;
        self.parse_str(text)
    }

    fn dispatch(
        &self,
        modes: &mut Vec<Mode>,
        state: &mut tree::TreeState,
        event: XmlEvent,
        position: u64,
    ) -> Result<()> {
        loop {
            let flow = match modes.last_mut().expect("mode stack is never empty") {
                Mode::Tree => tree::handle(state, &event, self.annotations, position)?,
                Mode::Property(p) => p.handle(&event, self.annotations, position)?,
                Mode::Shape(s) => s.handle(&event, &self.options, position)?,
            };
            match flow {
                Flow::Consumed => return Ok(()),
                Flow::Descend(mode) => modes.push(mode),
                Flow::Ascend(outcome) => {
                    modes.pop();
                    match modes.last_mut().expect("the tree mode never ascends") {
                        Mode::Tree => tree::absorb(state, outcome),
                        Mode::Property(p) => p.absorb(outcome),
                        Mode::Shape(s) => s.absorb(outcome),
                    }
                }
            }
        }
    }
}
