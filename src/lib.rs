//! hangul-fuzzy
//!
//! Jamo-level fuzzy matching for Hangul text, built for as-you-type search
//! (command palettes, autocomplete). Korean syllables are composite glyphs
//! assembled from lead consonant + vowel + optional trailing consonant, so a
//! query the user is still composing (an incomplete syllable, or initial
//! consonants only) must still match completed target text. The matcher
//! works at the level of individual jamo ("atoms"), letting a half-typed
//! syllable's trailing consonant spill over into the next target syllable's
//! lead.
//!
//! The pipeline is four pure functions; the surrounding search/ranking layer
//! (tokenization, scoring, field extraction) is the caller's business:
//! - [`build_query`] - raw input into a literal or per-grapheme fuzzy query
//! - [`preprocess_target`] - candidate text into atoms plus offset maps
//! - [`match_indices`] - one query against one target, matched grapheme
//!   indices or no-match
//! - [`build_match_ranges`] - matched indices back into UTF-16 highlight
//!   ranges
//!
//! ```
//! use hangul_fuzzy::{build_query, preprocess_target, match_indices, build_match_ranges};
//! use hangul_fuzzy::{MatchOptions, QueryOptions, TargetOptions};
//!
//! let query = build_query("도", &QueryOptions::default());
//! let target = preprocess_target("돋움체", &TargetOptions::default());
//! let indices = match_indices(&query, &target, &MatchOptions::default()).unwrap();
//! let ranges = build_match_ranges(&[indices], &target);
//! assert_eq!((ranges[0].start, ranges[0].end), (0, 1));
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub mod jamo;
pub use jamo::{decompose, is_vowel_jamo, normalize_to_compat, Atom, Atoms};

pub mod segment;
pub use segment::{segment_graphemes, utf16_len, GraphemeCluster};

pub mod query;
pub use query::{build_query, Query, QueryGrapheme, QueryKind, QueryOptions};

pub mod target;
pub use target::{preprocess_target, Target, TargetOptions};

pub mod matcher;
pub use matcher::{match_indices, MatchOptions, Remainder, TailSpillover, WhitespacePolicy};

pub mod ranges;
pub use ranges::{build_match_ranges, MatchRange};

/// Engine-wide configuration.
///
/// Collects the knobs of the whole pipeline in one serializable place;
/// the projection helpers hand the right slice to each stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Case sensitivity applied by the query builder and target
    /// preprocessor. Hangul has no case; this only affects embedded Latin
    /// text.
    pub case_sensitive: bool,
    /// How whitespace graphemes in the query participate in matching.
    pub whitespace: WhitespacePolicy,
    /// When an in-progress trailing consonant may spill into the next
    /// target syllable's lead.
    pub tail_spillover: TailSpillover,
    /// How leftover target atoms are treated once a query grapheme is fully
    /// consumed.
    pub remainder: Remainder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            whitespace: WhitespacePolicy::Ignore,
            // As-you-type defaults: only the syllable under composition may
            // spill, and leftovers ride on the same permission.
            tail_spillover: TailSpillover::LastOnly,
            remainder: Remainder::TailSpilloverOnly,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config to {}", path.display()))
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            case_sensitive: self.case_sensitive,
        }
    }

    pub fn target_options(&self) -> TargetOptions {
        TargetOptions {
            case_sensitive: self.case_sensitive,
        }
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            whitespace: self.whitespace,
            // Folding already happened in the builders when requested.
            case_sensitive: true,
            tail_spillover: self.tail_spillover,
            remainder: self.remainder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert!(!cfg.case_sensitive);
        assert_eq!(cfg.whitespace, WhitespacePolicy::Ignore);
        assert_eq!(cfg.tail_spillover, TailSpillover::LastOnly);
        assert_eq!(cfg.remainder, Remainder::TailSpilloverOnly);
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = Config {
            case_sensitive: true,
            whitespace: WhitespacePolicy::Literal,
            tail_spillover: TailSpillover::Always,
            remainder: Remainder::Strict,
        };
        let text = cfg.to_toml_string().unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.case_sensitive, cfg.case_sensitive);
        assert_eq!(back.whitespace, cfg.whitespace);
        assert_eq!(back.tail_spillover, cfg.tail_spillover);
        assert_eq!(back.remainder, cfg.remainder);
    }

    #[test]
    fn test_option_projections() {
        let cfg = Config::default();
        assert!(!cfg.query_options().case_sensitive);
        assert!(!cfg.target_options().case_sensitive);
        let opts = cfg.match_options();
        assert!(opts.case_sensitive);
        assert_eq!(opts.tail_spillover, TailSpillover::LastOnly);
    }
}
