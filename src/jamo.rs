//! Hangul jamo decomposition.
//!
//! Maps one grapheme cluster to its ordered sequence of atomic input units
//! ("atoms"): the individual jamo a Korean user would press to produce the
//! cluster, with diphthongs and compound finals broken down to their base
//! letters, or the cluster itself held opaque for non-Hangul text.
//!
//! Decomposition results are memoized process-wide, keyed by the exact
//! cluster text. The cache never evicts; the key space is bounded by the
//! finite Hangul alphabet plus whatever other characters the host text
//! actually contains. Handing out shared `Arc`s also canonicalizes the atom
//! sequences, so the matcher can short-circuit whole-grapheme comparisons
//! with `Arc::ptr_eq` before falling back to value equality.

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// First code point of the precomposed syllable block (가).
const SYLLABLE_BASE: u32 = 0xAC00;
/// Last code point of the precomposed syllable block (힣).
const SYLLABLE_LAST: u32 = 0xD7A3;

/// 21 vowels x 28 tails per lead consonant.
const VOWELS_X_TAILS: u32 = 588;
/// 27 tail consonants plus "no tail".
const TAIL_COUNT: u32 = 28;

/// Lead consonants in syllable order. Doubles as the conjoining-to-
/// compatibility normalization table for U+1100..=U+1112.
const LEAD_TABLE: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ',
    'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Vowels in syllable order; also normalizes U+1161..=U+1175.
const VOWEL_TABLE: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ',
    'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ', 'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Tail consonants for syllable tail index 1..=27 (index 0 means no tail);
/// also normalizes U+11A8..=U+11C2.
const TAIL_TABLE: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ',
    'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ', 'ㅁ', 'ㅂ', 'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ',
    'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// One indivisible matching unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// A single UTF-16 code unit: a compatibility jamo after decomposition,
    /// or any other BMP character passed through opaquely.
    Jamo(char),
    /// A grapheme cluster wider than one UTF-16 code unit (surrogate pair,
    /// ZWJ sequence, combining stack), held verbatim.
    Cluster(Box<str>),
}

impl Atom {
    /// True iff the atom is one of the 21 canonical vowel jamo.
    pub fn is_vowel(&self) -> bool {
        matches!(self, Atom::Jamo(c) if is_vowel_jamo(*c))
    }
}

/// The atom sequence of one grapheme cluster. Shared out of the cache, so
/// sequences for the same cluster text are pointer-identical.
pub type Atoms = Arc<[Atom]>;

/// True iff `ch` is one of the 21 canonical vowel jamo (compatibility form).
pub fn is_vowel_jamo(ch: char) -> bool {
    matches!(
        ch,
        'ㅏ' | 'ㅐ' | 'ㅑ' | 'ㅒ' | 'ㅓ' | 'ㅔ' | 'ㅕ' | 'ㅖ' | 'ㅗ' | 'ㅘ'
            | 'ㅙ' | 'ㅚ' | 'ㅛ' | 'ㅜ' | 'ㅝ' | 'ㅞ' | 'ㅟ' | 'ㅠ' | 'ㅡ' | 'ㅢ' | 'ㅣ'
    )
}

/// Diphthong decomposition: the seven two-keystroke vowels.
fn split_vowel(v: char) -> Option<[char; 2]> {
    match v {
        'ㅘ' => Some(['ㅗ', 'ㅏ']),
        'ㅙ' => Some(['ㅗ', 'ㅐ']),
        'ㅚ' => Some(['ㅗ', 'ㅣ']),
        'ㅝ' => Some(['ㅜ', 'ㅓ']),
        'ㅞ' => Some(['ㅜ', 'ㅔ']),
        'ㅟ' => Some(['ㅜ', 'ㅣ']),
        'ㅢ' => Some(['ㅡ', 'ㅣ']),
        _ => None,
    }
}

/// Compound final decomposition: the eleven two-keystroke tails.
fn split_tail(t: char) -> Option<[char; 2]> {
    match t {
        'ㄳ' => Some(['ㄱ', 'ㅅ']),
        'ㄵ' => Some(['ㄴ', 'ㅈ']),
        'ㄶ' => Some(['ㄴ', 'ㅎ']),
        'ㄺ' => Some(['ㄹ', 'ㄱ']),
        'ㄻ' => Some(['ㄹ', 'ㅁ']),
        'ㄼ' => Some(['ㄹ', 'ㅂ']),
        'ㄽ' => Some(['ㄹ', 'ㅅ']),
        'ㄾ' => Some(['ㄹ', 'ㅌ']),
        'ㄿ' => Some(['ㄹ', 'ㅍ']),
        'ㅀ' => Some(['ㄹ', 'ㅎ']),
        'ㅄ' => Some(['ㅂ', 'ㅅ']),
        _ => None,
    }
}

/// Map a conjoining jamo (the forms NFD produces) to its compatibility-block
/// equivalent. Characters outside the three conjoining ranges pass through.
pub fn normalize_to_compat(ch: char) -> char {
    let code = ch as u32;
    match code {
        0x1100..=0x1112 => LEAD_TABLE[(code - 0x1100) as usize],
        0x1161..=0x1175 => VOWEL_TABLE[(code - 0x1161) as usize],
        0x11A8..=0x11C2 => TAIL_TABLE[(code - 0x11A8) as usize],
        _ => ch,
    }
}

static DECOMPOSE_CACHE: Lazy<RwLock<AHashMap<Box<str>, Atoms>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

/// Decompose one grapheme cluster into its atom sequence.
///
/// Precomposed syllables split arithmetically into lead + vowel run + tail
/// run; bare jamo (conjoining or compatibility block) are normalized and get
/// the same diphthong/compound-final splitting; everything else becomes a
/// single opaque atom. Results are cached for the process lifetime, and the
/// first write for a key wins, so concurrent callers always observe the same
/// canonical `Arc`.
pub fn decompose(cluster: &str) -> Atoms {
    if let Some(hit) = DECOMPOSE_CACHE.read().get(cluster) {
        return Arc::clone(hit);
    }
    let atoms = decompose_uncached(cluster);
    let mut cache = DECOMPOSE_CACHE.write();
    Arc::clone(cache.entry(Box::from(cluster)).or_insert(atoms))
}

fn decompose_uncached(cluster: &str) -> Atoms {
    let mut chars = cluster.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Arc::from(vec![]),
    };

    // Jamo decomposition only applies to single-code-unit clusters; wider
    // clusters stay verbatim so both sides of a match see the same token.
    if chars.next().is_some() || first.len_utf16() != 1 {
        return Arc::from(vec![Atom::Cluster(Box::from(cluster))]);
    }

    let code = first as u32;
    let mut out: Vec<Atom> = Vec::with_capacity(4);
    match code {
        SYLLABLE_BASE..=SYLLABLE_LAST => {
            let base = code - SYLLABLE_BASE;
            let lead = (base / VOWELS_X_TAILS) as usize;
            let vowel = ((base % VOWELS_X_TAILS) / TAIL_COUNT) as usize;
            let tail = (base % TAIL_COUNT) as usize;

            out.push(Atom::Jamo(LEAD_TABLE[lead]));
            push_split(&mut out, VOWEL_TABLE[vowel], split_vowel);
            if tail != 0 {
                push_split(&mut out, TAIL_TABLE[tail - 1], split_tail);
            }
        }
        0x1100..=0x11FF | 0x3130..=0x318F => {
            let norm = normalize_to_compat(first);
            match split_vowel(norm).or_else(|| split_tail(norm)) {
                Some([a, b]) => {
                    out.push(Atom::Jamo(a));
                    out.push(Atom::Jamo(b));
                }
                None => out.push(Atom::Jamo(norm)),
            }
        }
        _ => out.push(Atom::Jamo(first)),
    }
    Arc::from(out)
}

fn push_split(out: &mut Vec<Atom>, ch: char, split: fn(char) -> Option<[char; 2]>) {
    match split(ch) {
        Some([a, b]) => {
            out.push(Atom::Jamo(a));
            out.push(Atom::Jamo(b));
        }
        None => out.push(Atom::Jamo(ch)),
    }
}
