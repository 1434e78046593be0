//! The matcher.
//!
//! Consumes one [`Query`] against one [`Target`] and produces either the
//! sorted list of matched grapheme indices or no-match. The fuzzy branch is
//! a single greedy left-to-right scan: it never backtracks past a committed
//! match, trading the occasional findable-but-missed alternative for O(n)
//! behavior on every keystroke.
//!
//! No-match (`None`) and trivially-matches-everything (`Some(vec![])`, from
//! an empty query or empty literal) are distinct outcomes; callers must not
//! collapse them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::query::{Query, QueryGrapheme, QueryKind};
use crate::segment::utf16_len;
use crate::target::Target;

/// When an incomplete trailing consonant may match as the lead consonant of
/// the next target grapheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailSpillover {
    /// Any query grapheme's tail may spill over.
    Always,
    /// Only the final query grapheme, or a grapheme the caller explicitly
    /// flagged via [`Query::set_tail_spillover_on_last`].
    LastOnly,
    /// Never.
    Never,
}

impl Default for TailSpillover {
    fn default() -> Self {
        Self::LastOnly
    }
}

/// What to do when every query atom matched but the target grapheme has
/// trailing atoms left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remainder {
    /// Reject the grapheme and retry against the next target grapheme.
    Strict,
    /// Accept the leftover unconditionally.
    Allow,
    /// Accept only where tail spillover is permitted for this grapheme.
    TailSpilloverOnly,
}

impl Default for Remainder {
    fn default() -> Self {
        Self::TailSpilloverOnly
    }
}

/// How whitespace graphemes in the query participate in fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhitespacePolicy {
    /// Whitespace-only query graphemes are skipped.
    Ignore,
    /// Whitespace matches like any other grapheme.
    Literal,
}

impl Default for WhitespacePolicy {
    fn default() -> Self {
        Self::Ignore
    }
}

/// Options for [`match_indices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub whitespace: WhitespacePolicy,
    /// Carried for completeness; case folding is expected to have been
    /// applied upstream by the query builder and target preprocessor, so the
    /// matcher itself never consults this.
    pub case_sensitive: bool,
    pub tail_spillover: TailSpillover,
    pub remainder: Remainder,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            whitespace: WhitespacePolicy::Ignore,
            case_sensitive: true,
            tail_spillover: TailSpillover::LastOnly,
            remainder: Remainder::TailSpilloverOnly,
        }
    }
}

/// Match `query` against `target`.
///
/// Returns the matched grapheme indices in ascending order, or `None` when
/// nothing matched. `Some(vec![])` is the trivially-matching sentinel
/// produced by empty queries and empty literals.
pub fn match_indices(
    query: &Query,
    target: &Target,
    options: &MatchOptions,
) -> Option<Vec<usize>> {
    let result = match &query.kind {
        QueryKind::Literal(text) => match_literal(text, target),
        QueryKind::Fuzzy(graphemes) => match_fuzzy(graphemes, target, options),
    };
    debug!(
        query = query.input.as_ref(),
        matched = result.is_some(),
        "match_indices"
    );
    result
}

/// Direct substring search over the normalized target text. The found span
/// is walked offset by offset through the grapheme index map, deduping
/// consecutive duplicates (one grapheme can own several code units).
fn match_literal(text: &str, target: &Target) -> Option<Vec<usize>> {
    if text.is_empty() {
        return Some(Vec::new());
    }

    let byte_pos = target.normalized_input.find(text)?;
    let found_at = utf16_len(&target.normalized_input[..byte_pos]);

    let mut indexes = Vec::new();
    for offset in found_at..found_at + utf16_len(text) {
        let grapheme_index = target.grapheme_indexes[offset];
        if indexes.last() != Some(&grapheme_index) {
            indexes.push(grapheme_index);
        }
    }
    Some(indexes)
}

fn spillover_permitted(options: &MatchOptions, grapheme: &QueryGrapheme, is_last: bool) -> bool {
    match options.tail_spillover {
        TailSpillover::Always => true,
        TailSpillover::Never => false,
        TailSpillover::LastOnly => is_last || grapheme.allow_tail_spillover,
    }
}

fn is_whitespace_grapheme(grapheme: &QueryGrapheme) -> bool {
    !grapheme.text.is_empty() && grapheme.text.chars().all(char::is_whitespace)
}

/// The greedy two-pointer scan. State: `qi` (query grapheme), `qai` (atom
/// offset within the query grapheme, nonzero only mid-spillover), `tgi`
/// (target grapheme). Success when `qi` consumes the query; failure when the
/// target runs out first.
fn match_fuzzy(
    query_graphemes: &[QueryGrapheme],
    target: &Target,
    options: &MatchOptions,
) -> Option<Vec<usize>> {
    if query_graphemes.is_empty() {
        return Some(Vec::new());
    }
    if query_graphemes.len() > target.graphemes.len() {
        return None;
    }

    let mut qi = 0usize;
    let mut qai = 0usize;
    let mut tgi = 0usize;
    let mut matches: Vec<usize> = Vec::new();

    'target_grapheme: while qi < query_graphemes.len() && tgi < target.graphemes.len() {
        let q_grapheme = &query_graphemes[qi];

        if qai == 0
            && options.whitespace == WhitespacePolicy::Ignore
            && is_whitespace_grapheme(q_grapheme)
        {
            qi += 1;
            continue;
        }

        let q_atoms = &q_grapheme.atoms;
        let t_atoms = &target.graphemes[tgi];

        // Mid-spillover: the pending query atom must land as the lead of
        // some later target grapheme.
        if qai != 0 {
            if t_atoms.first() != Some(&q_atoms[qai]) {
                tgi += 1;
                continue;
            }

            qai += 1;

            if qai < q_atoms.len() {
                // Compound tail: one atom landed, the next must go into yet
                // another grapheme's lead. A lead slot holds a single
                // consonant, never a compound.
                trace!(qi, qai, tgi, "spillover continues");
                tgi += 1;
                continue;
            }

            qai = 0;
            qi += 1;
            matches.push(tgi);
            tgi += 1;
            continue;
        }

        // Whole-grapheme identity. The cache hands out shared sequences, so
        // pointer equality settles the common case before the value check.
        if Arc::ptr_eq(q_atoms, t_atoms) || q_atoms == t_atoms {
            qi += 1;
            matches.push(tgi);
            tgi += 1;
            continue;
        }

        if q_atoms.first() != t_atoms.first() {
            tgi += 1;
            continue;
        }

        if q_atoms.len() > 1 {
            qai = 1;
            while qai < q_atoms.len() {
                if t_atoms.get(qai) != Some(&q_atoms[qai]) {
                    if q_grapheme.vowel_index.map_or(true, |v| qai < v) {
                        // No vowel in the query grapheme: a compound jamo
                        // standing in lead position (e.g. bare ㄳ). Its
                        // atoms must spread across target graphemes, so
                        // this spillover is unconditional.
                        trace!(qi, qai, tgi, "compound lead spillover");
                        matches.push(tgi);
                        tgi += 1;
                        continue 'target_grapheme;
                    } else if q_grapheme.tail_index.map_or(true, |t| qai < t) {
                        // Vowel mismatch: fatal for this target grapheme.
                        qai = 0;
                        tgi += 1;
                        continue 'target_grapheme;
                    } else if spillover_permitted(
                        options,
                        q_grapheme,
                        qi == query_graphemes.len() - 1,
                    ) {
                        // Tail mismatch: the tail spills into the next
                        // syllable's lead. Stays in spillover state.
                        trace!(qi, qai, tgi, "tail spillover");
                        matches.push(tgi);
                        tgi += 1;
                        continue 'target_grapheme;
                    } else {
                        qai = 0;
                        tgi += 1;
                        continue 'target_grapheme;
                    }
                }
                qai += 1;
            }

            // Every query atom matched; the target grapheme may still have
            // trailing atoms.
            if q_atoms.len() < t_atoms.len() {
                let accept = match options.remainder {
                    Remainder::Allow => true,
                    Remainder::Strict => false,
                    Remainder::TailSpilloverOnly => spillover_permitted(
                        options,
                        q_grapheme,
                        qi == query_graphemes.len() - 1,
                    ),
                };
                if !accept {
                    qai = 0;
                    tgi += 1;
                    continue;
                }
            }
        }

        qai = 0;
        qi += 1;
        matches.push(tgi);
        tgi += 1;
    }

    // Trailing ignorable whitespace does not need target graphemes.
    if options.whitespace == WhitespacePolicy::Ignore {
        while qi < query_graphemes.len() && is_whitespace_grapheme(&query_graphemes[qi]) {
            qi += 1;
        }
    }

    if qi < query_graphemes.len() {
        return None;
    }
    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_query, QueryOptions};
    use crate::target::{preprocess_target, TargetOptions};

    fn q(input: &str) -> Query {
        build_query(input, &QueryOptions::default())
    }

    fn t(input: &str) -> Target {
        preprocess_target(input, &TargetOptions::default())
    }

    fn m(query: &str, target: &str) -> Option<Vec<usize>> {
        match_indices(&q(query), &t(target), &MatchOptions::default())
    }

    #[test]
    fn test_exact_grapheme_match() {
        assert_eq!(m("안", "안"), Some(vec![0]));
        assert_eq!(m("안녕", "안녕하세요"), Some(vec![0, 1]));
    }

    #[test]
    fn test_subsequence_match_skips_targets() {
        assert_eq!(m("안하", "안녕하세요"), Some(vec![0, 2]));
        assert_eq!(m("녕요", "안녕하세요"), Some(vec![1, 4]));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(m("미", "안녕하세요"), None);
        assert_eq!(m("안", ""), None);
    }

    #[test]
    fn test_query_longer_than_target_fails_fast() {
        assert_eq!(m("안녕하", "안녕"), None);
    }

    #[test]
    fn test_empty_query_is_trivial_sentinel() {
        assert_eq!(m("", "안녕"), Some(vec![]));
        assert_eq!(m("\"\"", "안녕"), Some(vec![]));
    }

    #[test]
    fn test_initial_consonant_search() {
        // Single-jamo query graphemes match on lead consonants alone.
        assert_eq!(m("ㅇㄴ", "안녕"), Some(vec![0, 1]));
        assert_eq!(m("ㅎㅅ", "안녕하세요"), Some(vec![2, 3]));
    }

    #[test]
    fn test_in_progress_syllable_matches_ahead() {
        // Typing 아 on the way to 안: leftover target tail accepted for the
        // final query grapheme under the defaults.
        assert_eq!(m("아", "안녕"), Some(vec![0]));
        // Typing 갑 on the way to 값.
        assert_eq!(m("갑", "값어치"), Some(vec![0]));
    }

    #[test]
    fn test_tail_spillover_into_next_lead() {
        // 돋 is what the display shows halfway through typing 도다.
        assert_eq!(m("돋", "도다"), Some(vec![0, 1]));
        // Compound tail spreads over two following graphemes: 닭 -> 달기.
        assert_eq!(m("닭", "달기"), Some(vec![0, 1]));
    }

    #[test]
    fn test_tail_spillover_lastonly_vs_never() {
        let query = q("도");
        let target = t("돋음");
        assert_eq!(
            match_indices(&query, &target, &MatchOptions::default()),
            Some(vec![0])
        );
        let never = MatchOptions {
            tail_spillover: TailSpillover::Never,
            ..MatchOptions::default()
        };
        assert_eq!(match_indices(&query, &target, &never), None);
    }

    #[test]
    fn test_tail_spillover_lastonly_blocks_inner_grapheme() {
        // 돋 is not the last query grapheme, so its tail may not spill.
        assert_eq!(m("돋음", "도다음"), None);
        let always = MatchOptions {
            tail_spillover: TailSpillover::Always,
            ..MatchOptions::default()
        };
        assert_eq!(
            match_indices(&q("돋음"), &t("도다음"), &always),
            Some(vec![0, 1, 2])
        );
    }

    #[test]
    fn test_allow_tail_spillover_flag_enables_inner_spillover() {
        // A flagged grapheme spills under LastOnly even when it is not
        // positionally last, which is what a multi-token caller marks per token.
        let mut query = q("돋음");
        if let QueryKind::Fuzzy(graphemes) = &mut query.kind {
            graphemes[0].allow_tail_spillover = true;
        }
        assert_eq!(
            match_indices(&query, &t("도다음"), &MatchOptions::default()),
            Some(vec![0, 1, 2])
        );
        // Never stays absolute regardless of the flag.
        let never = MatchOptions {
            tail_spillover: TailSpillover::Never,
            ..MatchOptions::default()
        };
        assert_eq!(match_indices(&query, &t("도다음"), &never), None);
    }

    #[test]
    fn test_compound_jamo_lead_spreads() {
        assert_eq!(m("ㄳ", "감사"), Some(vec![0, 1]));
        assert_eq!(m("ㄳ", "개선"), Some(vec![0, 1]));
        // Spillover scans past non-matching graphemes.
        assert_eq!(m("ㄳ", "관악산"), Some(vec![0, 2]));
    }

    #[test]
    fn test_greedy_spillover_exhausts_target() {
        // ㄳ consumes both graphemes; nothing is left for ㅅ. The greedy
        // scan does not backtrack to find the alternative split.
        assert_eq!(m("ㄳㅅ", "감사"), None);
    }

    #[test]
    fn test_vowel_mismatch_retries_next_grapheme() {
        assert_eq!(m("고", "간고"), Some(vec![1]));
        assert_eq!(m("화", "회화"), Some(vec![1]));
    }

    #[test]
    fn test_partial_diphthong_matches() {
        // 호 is the display halfway through typing 화 (ㅎ ㅗ ㅏ).
        assert_eq!(m("호", "화가"), Some(vec![0]));
    }

    #[test]
    fn test_remainder_strict_rejects_leftover() {
        let strict = MatchOptions {
            remainder: Remainder::Strict,
            ..MatchOptions::default()
        };
        assert_eq!(match_indices(&q("아"), &t("안녕"), &strict), None);
        // Exact matches are unaffected.
        assert_eq!(
            match_indices(&q("안"), &t("안녕"), &strict),
            Some(vec![0])
        );
    }

    #[test]
    fn test_remainder_allow_accepts_leftover() {
        let allow = MatchOptions {
            remainder: Remainder::Allow,
            tail_spillover: TailSpillover::Never,
            ..MatchOptions::default()
        };
        assert_eq!(
            match_indices(&q("아"), &t("안녕"), &allow),
            Some(vec![0])
        );
    }

    #[test]
    fn test_remainder_tail_spillover_only_follows_permission() {
        let opts = MatchOptions {
            remainder: Remainder::TailSpilloverOnly,
            tail_spillover: TailSpillover::Never,
            ..MatchOptions::default()
        };
        assert_eq!(match_indices(&q("아"), &t("안녕"), &opts), None);
    }

    #[test]
    fn test_whitespace_ignored_in_query() {
        assert_eq!(m("안 녕", "안녕하"), Some(vec![0, 1]));
        // Whitespace-only query consumes nothing.
        assert_eq!(m("   ", "   안   "), Some(vec![]));
    }

    #[test]
    fn test_whitespace_literal_must_match() {
        let literal_ws = MatchOptions {
            whitespace: WhitespacePolicy::Literal,
            ..MatchOptions::default()
        };
        assert_eq!(
            match_indices(&q("안 녕"), &t("안 녕"), &literal_ws),
            Some(vec![0, 1, 2])
        );
        assert_eq!(
            match_indices(&q("안 녕"), &t("안녕하"), &literal_ws),
            None
        );
    }

    #[test]
    fn test_literal_query_substring() {
        assert_eq!(m("\"안녕\"", "안녕하세요"), Some(vec![0, 1]));
        assert_eq!(m("\"녕하\"", "안녕하세요"), Some(vec![1, 2]));
        assert_eq!(m("\"안녕하\"", "안녕 하"), None);
    }

    #[test]
    fn test_literal_dedups_multi_unit_graphemes() {
        // 😊 spans two code units but one grapheme.
        assert_eq!(m("\"😊\"", "안😊녕"), Some(vec![1]));
    }

    #[test]
    fn test_literal_fuzzy_never_conflated() {
        // Fuzzy 녕 matches out of order positions; literal must be a
        // contiguous substring.
        assert_eq!(m("안하", "안녕하세요"), Some(vec![0, 2]));
        assert_eq!(m("\"안하\"", "안녕하세요"), None);
    }

    #[test]
    fn test_emoji_fuzzy_match() {
        assert_eq!(m("😊", "안녕 😊 하세요"), Some(vec![3]));
        let family = "👨\u{200D}👩\u{200D}👧\u{200D}👦";
        let target_text = format!("a{family}b");
        assert_eq!(m(family, &target_text), Some(vec![1]));
    }

    #[test]
    fn test_mixed_scripts() {
        assert_eq!(m("a1", "a1 안녕 ABC123"), Some(vec![0, 1]));
        assert_eq!(m("안c", "안녕 abc"), Some(vec![0, 5]));
    }

    #[test]
    fn test_compound_lead_branch_no_false_positives() {
        // The unconditional compound-lead spillover is only reachable for
        // vowel-less query graphemes; ordinary syllable queries must not
        // match unrelated text through it.
        for target_text in ["나무", "구름", "바다", "하늘", "사람"] {
            assert_eq!(m("값", target_text), None, "값 vs {target_text}");
            assert_eq!(m("닭", target_text), None, "닭 vs {target_text}");
        }
    }

    #[test]
    fn test_match_indices_sorted_ascending() {
        let result = m("ㅇㅇ", "안녕하세요").unwrap();
        let mut sorted = result.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(result, sorted);
    }
}
