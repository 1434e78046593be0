//! Target preprocessing.
//!
//! Turns a candidate text into its indexable form: the case-folded string,
//! one atom sequence per grapheme cluster, and the two index maps that let
//! the matcher and range builder move between UTF-16 offsets and grapheme
//! indices in either direction.
//!
//! Plain data with public fields; the matcher only reads it, so one
//! preprocessed target can serve any number of match calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::jamo::{decompose, Atom, Atoms};
use crate::segment::{segment_graphemes, utf16_len};

/// Options for [`preprocess_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOptions {
    /// Fold the text to lowercase when false.
    pub case_sensitive: bool,
}

impl Default for TargetOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}

/// A preprocessed search target.
#[derive(Debug, Clone)]
pub struct Target {
    /// The original text, untouched.
    pub input: Box<str>,
    /// The case-folded text the matcher actually scans.
    pub normalized_input: Box<str>,
    /// One atom sequence per grapheme cluster, in order.
    pub graphemes: Vec<Atoms>,
    /// UTF-16 code unit offset -> owning grapheme index. Every code unit of
    /// a multi-unit cluster maps to the same index.
    pub grapheme_indexes: Vec<usize>,
    /// Grapheme index -> starting UTF-16 offset. Inverse of
    /// `grapheme_indexes`; strictly increasing.
    pub char_indexes: Vec<usize>,
}

impl Target {
    /// Total UTF-16 length of the normalized text.
    pub fn utf16_len(&self) -> usize {
        self.grapheme_indexes.len()
    }
}

/// Preprocess `input` into a [`Target`].
///
/// Single-code-unit clusters go through the decomposition cache; wider
/// clusters (surrogate pairs, ZWJ sequences, combining stacks) are stored as
/// one verbatim atom and every code unit of their span maps to the same
/// grapheme index.
pub fn preprocess_target(input: &str, options: &TargetOptions) -> Target {
    let normalized = if options.case_sensitive {
        input.to_string()
    } else {
        input.to_lowercase()
    };

    let mut graphemes: Vec<Atoms> = Vec::new();
    let mut grapheme_indexes: Vec<usize> = Vec::new();
    let mut char_indexes: Vec<usize> = Vec::new();

    for (grapheme_index, cluster) in segment_graphemes(&normalized).enumerate() {
        char_indexes.push(cluster.utf16_offset);

        let width = utf16_len(cluster.text);
        if width == 1 {
            graphemes.push(decompose(cluster.text));
        } else {
            graphemes.push(Arc::from(vec![Atom::Cluster(Box::from(cluster.text))]));
        }
        grapheme_indexes.extend(std::iter::repeat(grapheme_index).take(width));
    }

    Target {
        input: Box::from(input),
        normalized_input: normalized.into_boxed_str(),
        graphemes,
        grapheme_indexes,
        char_indexes,
    }
}
