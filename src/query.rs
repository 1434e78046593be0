//! Query construction.
//!
//! Turns a raw search string into a structured [`Query`]: either a literal
//! (quoted) exact-match request, or one decomposed [`QueryGrapheme`] per
//! cluster with the vowel/tail position markers the matcher steers by.

use serde::{Deserialize, Serialize};

use crate::jamo::{decompose, Atoms};
use crate::segment::segment_graphemes;

/// Options for [`build_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Fold the input to lowercase when false. Hangul is unaffected either
    /// way; this only matters for embedded Latin text.
    pub case_sensitive: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}

/// One query grapheme: the cluster text plus its decomposed atoms and the
/// positions the matcher branches on.
#[derive(Debug, Clone)]
pub struct QueryGrapheme {
    /// The original cluster text (post case-fold).
    pub text: Box<str>,
    /// Atom sequence from [`decompose`].
    pub atoms: Atoms,
    /// Index of the first vowel atom, if any.
    pub vowel_index: Option<usize>,
    /// Index of the first trailing-consonant atom after the vowel run.
    pub tail_index: Option<usize>,
    /// Whether an incomplete trailing consonant may match as the lead of the
    /// next target grapheme. Callers set this on the final grapheme of a
    /// token while the user is still composing it; see
    /// [`Query::set_tail_spillover_on_last`].
    pub allow_tail_spillover: bool,
}

/// The two query modes. Keeping them as variants (rather than a nullable
/// literal field) makes it impossible to hold both at once.
#[derive(Debug, Clone)]
pub enum QueryKind {
    /// Exact substring match of the unquoted text.
    Literal(Box<str>),
    /// Jamo-level fuzzy match, one entry per grapheme cluster.
    Fuzzy(Vec<QueryGrapheme>),
}

/// A built query. Immutable after construction except for the single
/// sanctioned mutation in [`Query::set_tail_spillover_on_last`].
#[derive(Debug, Clone)]
pub struct Query {
    /// The raw search input as typed.
    pub input: Box<str>,
    pub kind: QueryKind,
}

impl Query {
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, QueryKind::Literal(_))
    }

    /// Mark the final grapheme as an in-progress syllable so its tail may
    /// spill over into the following target grapheme under
    /// `TailSpillover::LastOnly`. This is the only post-construction
    /// mutation a caller may perform. No-op for literal or empty queries.
    pub fn set_tail_spillover_on_last(&mut self, allow: bool) {
        if let QueryKind::Fuzzy(graphemes) = &mut self.kind {
            if let Some(last) = graphemes.last_mut() {
                last.allow_tail_spillover = allow;
            }
        }
    }
}

/// Build a [`Query`] from raw input.
///
/// An input of length >= 2 that starts and ends with a double quote is a
/// literal: exactly the first and last characters are stripped and the inner
/// text (interior quotes included) is matched as a substring. `""` is the
/// empty literal, which matches everything.
///
/// Any other input has all double quotes stripped before decomposition, so a
/// bare `"` cannot be fuzzy-searched. Known limitation, kept as-is: quote
/// syntax and quote content collide and the syntax wins.
pub fn build_query(input: &str, options: &QueryOptions) -> Query {
    let is_literal = input.len() >= 2 && input.starts_with('"') && input.ends_with('"');

    if is_literal {
        let inner = &input[1..input.len() - 1];
        return Query {
            input: Box::from(input),
            kind: QueryKind::Literal(fold_case(inner, options.case_sensitive).into_boxed_str()),
        };
    }

    let cleaned: String = input.chars().filter(|c| *c != '"').collect();
    let cleaned = fold_case(&cleaned, options.case_sensitive);

    if cleaned.is_empty() {
        // Trivially-matching sentinel: zero graphemes.
        return Query {
            input: Box::from(input),
            kind: QueryKind::Fuzzy(Vec::new()),
        };
    }

    let mut graphemes = Vec::new();
    for cluster in segment_graphemes(&cleaned) {
        let atoms = decompose(cluster.text);
        let (vowel_index, tail_index) = scan_vowel_tail(&atoms);
        graphemes.push(QueryGrapheme {
            text: Box::from(cluster.text),
            atoms,
            vowel_index,
            tail_index,
            allow_tail_spillover: false,
        });
    }

    Query {
        input: Box::from(input),
        kind: QueryKind::Fuzzy(graphemes),
    }
}

fn fold_case(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

/// Left-to-right scan: the first vowel atom sets `vowel_index`, the first
/// non-vowel atom after it sets `tail_index`.
fn scan_vowel_tail(atoms: &Atoms) -> (Option<usize>, Option<usize>) {
    let mut vowel_index = None;
    for (i, atom) in atoms.iter().enumerate() {
        match vowel_index {
            None => {
                if atom.is_vowel() {
                    vowel_index = Some(i);
                }
            }
            Some(_) => {
                if !atom.is_vowel() {
                    return (vowel_index, Some(i));
                }
            }
        }
    }
    (vowel_index, None)
}
