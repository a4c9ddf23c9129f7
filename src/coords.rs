//! Coordinate-tuple parsing shared by the shape reconstructors
//!
//! Coordinate text from `gml:pos`, `gml:posList` and legacy
//! `gml:coordinates` elements is tokenized, validated as finite numbers and
//! grouped into tuples according to the declared dimensionality. The source
//! tokens are kept verbatim so the emitted WKT reproduces them exactly
//! (modulo single-space normalization).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoordinateError;

// Legacy gml:coordinates separates tuple members with commas; pos/posList
// use whitespace only. Both collapse to single spaces here.
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").unwrap());

/// One coordinate tuple, holding the validated source tokens verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    tokens: Vec<String>,
}

impl Tuple {
    /// The X token
    pub fn x(&self) -> &str {
        &self.tokens[0]
    }

    /// The Y token
    pub fn y(&self) -> &str {
        &self.tokens[1]
    }

    /// The Z token, when the declared dimension is 3
    pub fn z(&self) -> Option<&str> {
        self.tokens.get(2).map(|s| s.as_str())
    }

    /// Number of components in the tuple
    pub fn dimension(&self) -> usize {
        self.tokens.len()
    }
}

/// Collapse separators (whitespace runs, commas) to single spaces and trim
pub fn normalize(text: &str) -> String {
    SEPARATORS.replace_all(text.trim(), " ").into_owned()
}

/// Parse coordinate text into tuples of the declared dimension
///
/// An empty or all-whitespace buffer yields an empty vector. A token that is
/// not a finite number, or a token count that is not a multiple of the
/// dimension, is a coordinate error - never padded.
pub fn parse_tuples(text: &str, dimension: u8) -> Result<Vec<Tuple>, CoordinateError> {
    if !(2..=3).contains(&dimension) {
        return Err(CoordinateError::new(format!(
            "unsupported coordinate dimension {}",
            dimension
        )));
    }
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let dim = dimension as usize;
    if tokens.len() % dim != 0 {
        return Err(CoordinateError::new(format!(
            "{} coordinate tokens do not group into {}-dimensional tuples",
            tokens.len(),
            dim
        ))
        .with_text(normalized));
    }

    for token in &tokens {
        let value: f64 = token.parse().map_err(|_| {
            CoordinateError::new("coordinate token is not a number").with_text(*token)
        })?;
        if !value.is_finite() {
            return Err(
                CoordinateError::new("coordinate token is not a finite number").with_text(*token)
            );
        }
    }

    Ok(tokens
        .chunks(dim)
        .map(|chunk| Tuple {
            tokens: chunk.iter().map(|t| t.to_string()).collect(),
        })
        .collect())
}

/// Format one tuple as a WKT coordinate ("x y", or "x y z" with `emit_z`)
pub fn format_tuple(tuple: &Tuple, emit_z: bool) -> String {
    match tuple.z() {
        Some(z) if emit_z => format!("{} {} {}", tuple.x(), tuple.y(), z),
        _ => format!("{} {}", tuple.x(), tuple.y()),
    }
}

/// Format a tuple sequence as a WKT coordinate list ("x1 y1, x2 y2, ...")
pub fn format_sequence(tuples: &[Tuple], emit_z: bool) -> String {
    tuples
        .iter()
        .map(|t| format_tuple(t, emit_z))
        .collect::<Vec<_>>()
        .join(", ")
}
