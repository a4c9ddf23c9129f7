//! Feature tree builder
//!
//! The default, always-active mode. Owns the stack of in-progress feature
//! nodes: element opens push a node, matching closes pop it and append it
//! under the new top (or yield it as the document root). When an opened
//! element's effective type is a recognized geometry-property wrapper type,
//! the node is pushed as a detached wrapper frame and control descends into
//! the geometry dispatcher instead.

use tracing::warn;

use crate::error::{Result, StructuralError};
use crate::events::XmlEvent;
use crate::feature::{collapse_whitespace, ComplexFeature, SimpleAttribute};
use crate::geometry::is_geometry_property_type;
use crate::schema::{effective_type, TypeAnnotations};

use super::{Flow, Mode, Outcome, PropertyMode};

/// Shared parse state: the feature stack and the pending text buffer
#[derive(Debug, Default)]
pub(crate) struct TreeState {
    /// In-progress nodes, document root at the bottom
    pub stack: Vec<ComplexFeature>,
    /// Completed document root
    pub root: Option<ComplexFeature>,
    /// Pending character content of the current top-of-stack; cleared on
    /// every element open so mixed content never concatenates across
    /// siblings
    pub text_buf: String,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn handle(
    state: &mut TreeState,
    event: &XmlEvent,
    annotations: &dyn TypeAnnotations,
    position: u64,
) -> Result<Flow> {
    match event {
        XmlEvent::Open(start) => {
            let declared = effective_type(start, annotations);
            let mut node = ComplexFeature::new(start.qname.clone(), declared.clone());
            for attr in &start.attributes {
                node.add_attribute(SimpleAttribute {
                    qname: attr.qname.clone(),
                    value: attr.value.clone(),
                    declared_type: annotations
                        .attribute_type(&start.qname, &attr.qname)
                        .map(str::to_string),
                });
            }
            state.text_buf.clear();

            let is_wrapper = declared
                .as_deref()
                .map(is_geometry_property_type)
                .unwrap_or(false);
            if is_wrapper && !state.stack.is_empty() {
                node.property_wrapper = true;
                state.stack.push(node);
                return Ok(Flow::Descend(Mode::Property(PropertyMode::new(
                    start.qname.clone(),
                ))));
            }

            state.stack.push(node);
            Ok(Flow::Consumed)
        }
        XmlEvent::Text(text) => {
            if !state.stack.is_empty() {
                state.text_buf.push_str(text);
            }
            Ok(Flow::Consumed)
        }
        XmlEvent::Close(qname) => {
            let mut node = state.stack.pop().ok_or_else(|| {
                StructuralError::new("close tag without a matching open element")
                    .with_found(qname.to_string())
                    .with_position(position)
            })?;
            if node.qname != *qname {
                return Err(StructuralError::new("close tag does not match open element")
                    .with_expected(node.qname.to_string())
                    .with_found(qname.to_string())
                    .with_position(position)
                    .into());
            }

            node.set_text(collapse_whitespace(&state.text_buf));
            state.text_buf.clear();

            if node.property_wrapper {
                // Wrapper frames carry no tree content of their own; the
                // geometry was already attached to the owning feature.
                return Ok(Flow::Consumed);
            }

            match state.stack.last_mut() {
                Some(parent) => parent.add_feature(node),
                None => state.root = Some(node),
            }
            Ok(Flow::Consumed)
        }
    }
}

/// Receive the dispatcher's outcome while the wrapper frame is still on the
/// stack: the owning feature is the frame directly below it.
pub(crate) fn absorb(state: &mut TreeState, outcome: Outcome) {
    if let Outcome::Geometry(Some(geometry)) = outcome {
        let len = state.stack.len();
        if len >= 2 {
            state.stack[len - 2].attach_geometry(*geometry);
        } else {
            warn!("geometry subtree has no owning feature; dropping it");
        }
    }
}
