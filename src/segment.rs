//! Grapheme cluster segmentation with UTF-16 offset tracking.
//!
//! Thin adapter over `unicode-segmentation`'s extended grapheme clusters
//! (UAX #29). Every offset computed downstream (the target index maps, the
//! final match ranges) is a UTF-16 code unit offset, so the segmenter
//! reports where each cluster starts in UTF-16 terms rather than bytes.

use unicode_segmentation::UnicodeSegmentation;

/// One extended grapheme cluster and its starting UTF-16 code unit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphemeCluster<'a> {
    pub text: &'a str,
    pub utf16_offset: usize,
}

/// Number of UTF-16 code units needed to encode `s`.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Iterate `input`'s extended grapheme clusters in order, each paired with
/// its starting UTF-16 offset. The clusters form a covering, non-overlapping
/// partition of `input`.
pub fn segment_graphemes(input: &str) -> impl Iterator<Item = GraphemeCluster<'_>> {
    let mut offset = 0usize;
    input.graphemes(true).map(move |text| {
        let cluster = GraphemeCluster {
            text,
            utf16_offset: offset,
        };
        offset += utf16_len(text);
        cluster
    })
}
