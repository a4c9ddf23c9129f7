//! Geometry dispatcher and finalizer
//!
//! Active for exactly one geometry-property subtree at a time. Resolves the
//! concrete shape from the first nested element, initializes the shared
//! geometry placeholder (shape kind, dimensionality, spatial reference,
//! stable id) and descends into the matching shape reconstructor. When the
//! wrapper element closes, the finalizer assembles the WKT, reads it back
//! through the WKT reader and hands the finished geometry to the tree
//! builder below.

use tracing::{debug, warn};

use crate::error::{Result, StructuralError};
use crate::events::{ElementStart, XmlEvent};
use crate::geometry::{parse_srs_name, read_wkt, Geometry, ShapeKind, DEFAULT_SRID};
use crate::namespaces::QName;
use crate::schema::{effective_type, TypeAnnotations};

use super::{Flow, Fragment, Mode, Outcome, ShapeMode};

/// Mode state for one geometry-property subtree
pub(crate) struct PropertyMode {
    /// Wrapper element qname: the closing signal for this subtree
    closing: QName,
    /// Open elements seen and not yet closed inside this mode
    depth: usize,
    /// The geometry placeholder, created once the shape is resolved
    geometry: Option<Box<Geometry>>,
    /// Assembled shape fragment, delivered when the reconstructor pops
    fragment: Option<Fragment>,
    /// Spatial reference captured from wrapper or shape attributes
    srid: Option<String>,
    /// Declared dimensionality (default 2)
    dimension: u8,
    /// Stable identifier captured from a `gml:id`-style attribute
    id: Option<String>,
    /// Set when the nested shape could not be resolved; the subtree is
    /// then consumed without reconstruction
    skipped: bool,
}

impl PropertyMode {
    pub fn new(closing: QName) -> Self {
        Self {
            closing,
            depth: 0,
            geometry: None,
            fragment: None,
            srid: None,
            dimension: 2,
            id: None,
            skipped: false,
        }
    }

    pub fn handle(
        &mut self,
        event: &XmlEvent,
        annotations: &dyn TypeAnnotations,
        position: u64,
    ) -> Result<Flow> {
        match event {
            XmlEvent::Open(start) => {
                self.depth += 1;
                if self.depth == 1 {
                    // The wrapper's own open event, replayed by the builder
                    self.capture_attributes(start);
                    return Ok(Flow::Consumed);
                }
                if self.geometry.is_none() && !self.skipped {
                    return self.resolve_shape(start, annotations);
                }
                Ok(Flow::Consumed)
            }
            XmlEvent::Text(_) => Ok(Flow::Consumed),
            XmlEvent::Close(qname) => {
                if self.depth == 0 {
                    return Err(StructuralError::new("unexpected close in geometry property")
                        .with_found(qname.to_string())
                        .with_position(position)
                        .into());
                }
                self.depth -= 1;
                if self.depth > 0 {
                    return Ok(Flow::Consumed);
                }
                if *qname != self.closing {
                    return Err(StructuralError::new(
                        "geometry property closed by a different element",
                    )
                    .with_expected(self.closing.to_string())
                    .with_found(qname.to_string())
                    .with_position(position)
                    .into());
                }
                Ok(Flow::Ascend(Outcome::Geometry(self.finalize())))
            }
        }
    }

    pub fn absorb(&mut self, outcome: Outcome) {
        if let Outcome::Fragment(fragment) = outcome {
            self.fragment = Some(fragment);
        }
    }

    /// Determine the concrete shape from the first nested element and
    /// descend into its reconstructor, replaying the open event.
    fn resolve_shape(
        &mut self,
        start: &ElementStart,
        annotations: &dyn TypeAnnotations,
    ) -> Result<Flow> {
        let kind = effective_type(start, annotations)
            .as_deref()
            .and_then(ShapeKind::from_type_name)
            .or_else(|| ShapeKind::from_local_name(start.qname.local_name()));

        match kind {
            Some(kind) => {
                self.capture_attributes(start);
                let mut geometry = Box::new(Geometry::new(kind, start.qname.clone()));
                geometry.id = self.id.clone();
                geometry.srid = self.srid.clone();
                geometry.dimension = self.dimension;
                self.geometry = Some(geometry);
                Ok(Flow::Descend(Mode::Shape(ShapeMode::for_kind(
                    kind,
                    start.qname.clone(),
                    self.dimension,
                ))))
            }
            None => {
                warn!(
                    element = %start.qname,
                    "cannot resolve a geometry shape; skipping this geometry subtree"
                );
                self.skipped = true;
                Ok(Flow::Consumed)
            }
        }
    }

    fn capture_attributes(&mut self, start: &ElementStart) {
        if let Some(value) = start.attribute("srsName") {
            if let Some(srid) = parse_srs_name(value) {
                self.srid = Some(srid);
            }
        }
        if let Some(value) = start.attribute("srsDimension") {
            match value.trim().parse::<u8>() {
                Ok(dim @ 2..=3) => self.dimension = dim,
                _ => warn!(value, "unsupported srsDimension value; assuming 2"),
            }
        }
        if let Some(value) = start.attribute("id") {
            self.id = Some(value.to_string());
        }
    }

    /// The finalizer step: assemble the WKT, read it back, default the
    /// spatial reference. Returns `None` when the geometry degraded to
    /// missing (no shape, or the WKT reader rejected the result).
    fn finalize(&mut self) -> Option<Box<Geometry>> {
        let mut geometry = match self.geometry.take() {
            Some(g) => g,
            None => {
                if !self.skipped {
                    debug!(wrapper = %self.closing, "geometry property closed without a shape");
                }
                return None;
            }
        };
        let fragment = self.fragment.take()?;

        let keyword = geometry.shape.wkt_keyword();
        geometry.dimension = fragment.dimension;
        geometry.is_empty = fragment.empty;
        geometry.coordinate_failure = fragment.failure;
        geometry.wkt = if fragment.empty {
            format!("{} EMPTY", keyword)
        } else {
            format!("{}({})", keyword, fragment.body)
        };
        if geometry.srid.is_none() {
            geometry.srid = Some(DEFAULT_SRID.to_string());
        }

        if let Some(ref failure) = geometry.coordinate_failure {
            warn!(
                failure = %failure,
                wkt = %geometry.wkt,
                "malformed coordinate text; keeping geometry without a parsed value"
            );
            return Some(geometry);
        }
        if geometry.is_empty {
            return Some(geometry);
        }

        match read_wkt(&geometry.wkt) {
            Ok(parsed) => {
                geometry.parsed = Some(parsed);
                Some(geometry)
            }
            Err(error) => {
                warn!(
                    error = %error,
                    wkt = %geometry.wkt,
                    "WKT reader rejected the assembled geometry; dropping it"
                );
                None
            }
        }
    }
}
