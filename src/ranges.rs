//! Match range construction.
//!
//! Converts matched grapheme indices back into UTF-16 highlight ranges over
//! the target. Several index lists may contribute to one target (multi-token
//! AND search runs one match per token); they are merged, deduped, and
//! compressed so adjacent graphemes become a single range.

use serde::{Deserialize, Serialize};

use crate::target::Target;

/// A half-open `[start, end)` interval of UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// Build highlight ranges from one or more matched-index lists against the
/// same target.
///
/// Indices are concatenated, sorted, and deduped; maximal runs of
/// consecutive grapheme indices collapse into one range. Output ranges are
/// ascending and non-overlapping, with adjacent ranges already merged.
pub fn build_match_ranges(index_lists: &[Vec<usize>], target: &Target) -> Vec<MatchRange> {
    let mut merged: Vec<usize> = index_lists.iter().flatten().copied().collect();
    if merged.is_empty() {
        return Vec::new();
    }
    merged.sort_unstable();
    merged.dedup();

    let mut ranges = Vec::new();
    let mut lo = merged[0];
    let mut prev = lo;
    for &index in &merged[1..] {
        if index == prev + 1 {
            prev = index;
            continue;
        }
        ranges.push(range_for_run(lo, prev, target));
        lo = index;
        prev = index;
    }
    ranges.push(range_for_run(lo, prev, target));
    ranges
}

/// A run `[lo, hi]` of grapheme indices spans from `lo`'s start offset to
/// the next grapheme's start offset, or to the end of the text when the
/// run closes out the final grapheme.
fn range_for_run(lo: usize, hi: usize, target: &Target) -> MatchRange {
    MatchRange {
        start: target.char_indexes[lo],
        end: target
            .char_indexes
            .get(hi + 1)
            .copied()
            .unwrap_or_else(|| target.utf16_len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{preprocess_target, TargetOptions};

    fn t(input: &str) -> Target {
        preprocess_target(input, &TargetOptions::default())
    }

    fn r(start: usize, end: usize) -> MatchRange {
        MatchRange { start, end }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(build_match_ranges(&[], &t("안녕")), vec![]);
        assert_eq!(build_match_ranges(&[vec![]], &t("안녕")), vec![]);
    }

    #[test]
    fn test_consecutive_run_compresses() {
        let target = t("안녕하세요");
        assert_eq!(
            build_match_ranges(&[vec![0, 1, 2]], &target),
            vec![r(0, 3)]
        );
    }

    #[test]
    fn test_gap_produces_two_ranges() {
        let target = t("안녕하세요");
        assert_eq!(
            build_match_ranges(&[vec![0, 2]], &target),
            vec![r(0, 1), r(2, 3)]
        );
    }

    #[test]
    fn test_run_reaching_final_grapheme_ends_at_text_length() {
        let target = t("안녕");
        assert_eq!(build_match_ranges(&[vec![1]], &target), vec![r(1, 2)]);
        assert_eq!(build_match_ranges(&[vec![0, 1]], &target), vec![r(0, 2)]);
    }

    #[test]
    fn test_multiple_lists_merge_and_dedup() {
        let target = t("값어치");
        let lists = vec![vec![2, 0], vec![1, 1]];
        assert_eq!(build_match_ranges(&lists, &target), vec![r(0, 3)]);
    }

    #[test]
    fn test_multi_unit_graphemes_span_their_width() {
        // 😊 occupies UTF-16 offsets 1..3.
        let target = t("a😊b");
        assert_eq!(build_match_ranges(&[vec![1]], &target), vec![r(1, 3)]);
        assert_eq!(build_match_ranges(&[vec![1, 2]], &target), vec![r(1, 4)]);
    }

    #[test]
    fn test_ranges_ascending_non_overlapping() {
        let target = t("안녕하세요 반갑습니다");
        let ranges = build_match_ranges(&[vec![9, 0, 4, 3, 7]], &target);
        for pair in ranges.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
        assert_eq!(ranges, vec![r(0, 1), r(3, 5), r(7, 8), r(9, 10)]);
    }
}
