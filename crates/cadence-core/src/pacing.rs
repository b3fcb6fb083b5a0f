//! Per-token dwell model and the dense duration table built from it.

use alloc::vec::Vec;

use crate::document::Token;

/// Dwell multipliers are expressed in thousandths.
pub const FACTOR_UNIT: u64 = 1_000;

pub const PARAGRAPH_BREAK_FACTOR: u64 = 2_500;
pub const RARE_WORD_MIN_LETTERS: usize = 9;

const SENTENCE_END_FACTOR: u64 = 1_800;
const CLAUSE_END_FACTOR: u64 = 1_300;
const RARE_WORD_FACTOR: u64 = 1_250;
const SENTENCE_START_FACTOR: u64 = 1_200;
const SHORT_COMMON_FACTOR: u64 = 650;

/// Short function words read faster than their length suggests.
const COMMON_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "it", "is",
    "was", "are", "be", "been", "by", "from", "as", "we", "he", "she", "they", "you", "i", "my",
    "your", "our", "his", "her", "its", "this", "that", "these", "those", "not", "no", "so", "if",
    "up", "do", "did", "can", "will", "just", "all", "one", "had", "has", "have", "would",
    "could", "should", "may", "might", "than", "then", "when", "who", "what", "how", "am", "were",
    "get", "got", "go", "went", "see", "say", "said", "know", "think", "come", "also", "very",
    "well", "more", "over", "into", "out", "about", "like", "im", "id", "ive", "dont", "wont",
    "cant", "isnt", "wasnt", "arent",
];

/// `num / den` rounded half up.
pub(crate) const fn div_round(num: u64, den: u64) -> u64 {
    (num + den / 2) / den
}

/// Milliseconds per word at `wpm`, before any ramp.
///
/// ```
/// use cadence_core::pacing::base_interval_ms;
///
/// assert_eq!(base_interval_ms(600), 100);
/// assert_eq!(base_interval_ms(64), 938);
/// ```
pub fn base_interval_ms(wpm: u16) -> u32 {
    div_round(60_000, wpm.max(1) as u64) as u32
}

/// Product of `base` and every factor, rounded once at the end.
struct Dwell {
    num: u64,
    den: u64,
}

impl Dwell {
    const fn new(base: u32) -> Self {
        Self {
            num: base as u64,
            den: 1,
        }
    }

    fn scale(&mut self, factor: u64) {
        self.num = self.num.saturating_mul(factor);
        self.den = self.den.saturating_mul(FACTOR_UNIT);
    }

    fn ms(&self) -> u32 {
        div_round(self.num, self.den).min(u32::MAX as u64) as u32
    }
}

/// Planned dwell for `token`; `previous` is the token right before it, if any.
pub fn dwell_ms(token: &Token, previous: Option<&Token>, wpm: u16, speed_ramp: bool) -> u32 {
    let base = base_interval_ms(wpm);
    let word = match token {
        Token::ParagraphBreak => {
            let mut dwell = Dwell::new(base);
            dwell.scale(PARAGRAPH_BREAK_FACTOR);
            return dwell.ms();
        }
        Token::Word(word) => word.as_str(),
    };

    if !speed_ramp {
        return base;
    }

    let letters = letter_count(word);
    let common = letters <= 4 && is_common_word(word);
    let mut dwell = Dwell::new(base);

    dwell.scale(if letters >= 15 {
        2_000
    } else if letters >= 12 {
        1_650
    } else if letters >= 9 {
        1_350
    } else if letters >= 7 {
        1_150
    } else if letters <= 2 {
        600
    } else if common {
        SHORT_COMMON_FACTOR
    } else {
        FACTOR_UNIT
    });

    if ends_sentence(word) {
        dwell.scale(SENTENCE_END_FACTOR);
    } else if ends_clause(word) {
        dwell.scale(CLAUSE_END_FACTOR);
    }

    // Common words are all short, so anything this long is rare.
    if letters >= RARE_WORD_MIN_LETTERS {
        dwell.scale(RARE_WORD_FACTOR);
    }

    let after_sentence = previous.and_then(Token::as_word).is_some_and(ends_sentence);
    if after_sentence && starts_sentence(word) {
        dwell.scale(SENTENCE_START_FACTOR);
    }

    dwell.ms()
}

/// Optimal recognition point: roughly a third into the word.
pub fn pivot_index(word: &str) -> usize {
    let len = word.chars().count();
    if len == 0 {
        return 0;
    }

    let third = div_round(len as u64, 3) as usize;
    third.saturating_sub(1).min(len - 1)
}

pub fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end();
    let trimmed = trimmed.strip_suffix(['\'', '"']).unwrap_or(trimmed);
    trimmed.ends_with(['.', '!', '?', '…'])
}

pub fn ends_clause(word: &str) -> bool {
    word.trim_end().ends_with([',', ';', ':', '—', '–'])
}

fn starts_sentence(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn letter_count(word: &str) -> usize {
    word.chars().filter(|ch| ch.is_alphabetic()).count()
}

fn is_common_word(word: &str) -> bool {
    let mut lower = heapless::String::<24>::new();
    for ch in word.chars().filter(|ch| ch.is_alphabetic()) {
        for low in ch.to_lowercase() {
            if lower.push(low).is_err() {
                return false;
            }
        }
    }

    COMMON_WORDS.contains(&lower.as_str())
}

/// Dense dwell table aligned 1:1 with the token sequence.
#[derive(Clone, Debug, Default)]
pub struct DurationTable {
    entries: Vec<u32>,
}

impl DurationTable {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Recomputes every entry. Reuses the allocation when the length is unchanged.
    pub fn rebuild(&mut self, tokens: &[Token], wpm: u16, speed_ramp: bool) {
        self.entries.clear();
        self.entries.reserve(tokens.len());

        let mut previous = None;
        for token in tokens {
            self.entries.push(dwell_ms(token, previous, wpm, speed_ramp));
            previous = Some(token);
        }
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn word(text: &str) -> Token {
        Token::word(text)
    }

    #[test]
    fn ramp_off_is_flat_base_for_every_rate() {
        for wpm in 100..=1500u16 {
            let expected = (60_000 + u32::from(wpm) / 2) / u32::from(wpm);
            for text in ["a", "the", "extraordinarily", "end.", "Start"] {
                assert_eq!(dwell_ms(&word(text), Some(&word("prior.")), wpm, false), expected);
            }
        }
    }

    #[test]
    fn paragraph_break_ignores_ramp_flag() {
        for wpm in 100..=1500u16 {
            let expected = (base_interval_ms(wpm) * 5 + 1) / 2;
            assert_eq!(dwell_ms(&Token::ParagraphBreak, None, wpm, true), expected);
            assert_eq!(dwell_ms(&Token::ParagraphBreak, None, wpm, false), expected);
        }
    }

    #[test]
    fn half_millisecond_rounds_up() {
        // 60_000 / 64 = 937.5 rounds to 938; 0.60 * 938 = 562.8.
        assert_eq!(base_interval_ms(64), 938);
        assert_eq!(dwell_ms(&word("of"), None, 64, true), 563);
        // 1.65 * 1.25 * 1.80 on base 100 = 371.25.
        assert_eq!(dwell_ms(&word("misunderstand."), None, 600, true), 371);
    }

    #[test]
    fn pivot_follows_first_third() {
        assert_eq!(pivot_index("the"), 0);
        assert_eq!(pivot_index("a"), 0);
        assert_eq!(pivot_index("international"), 3);
        assert_eq!(pivot_index("reading"), 1);
        assert_eq!(pivot_index(""), 0);
    }

    #[test]
    fn ramp_multipliers_combine() {
        // base = 100 ms at 600 wpm.
        assert_eq!(dwell_ms(&word("of"), None, 600, true), 60);
        assert_eq!(dwell_ms(&word("with"), None, 600, true), 65);
        assert_eq!(dwell_ms(&word("word"), None, 600, true), 100);
        assert_eq!(dwell_ms(&word("reading"), None, 600, true), 115);
        // 1.35 length tier * 1.25 rare word.
        assert_eq!(dwell_ms(&word("wonderful"), None, 600, true), 169);
        // 1.15 length tier * 1.80 sentence end.
        assert_eq!(dwell_ms(&word("reading."), None, 600, true), 207);
        assert_eq!(dwell_ms(&word("word,"), None, 600, true), 130);
        assert_eq!(dwell_ms(&word("word!\""), None, 600, true), 180);
    }

    #[test]
    fn capitalised_word_after_sentence_end_pauses() {
        let prev = word("done.");
        assert_eq!(dwell_ms(&word("Next"), Some(&prev), 600, true), 120);
        assert_eq!(dwell_ms(&word("next"), Some(&prev), 600, true), 100);
        assert_eq!(dwell_ms(&word("Next"), Some(&word("done")), 600, true), 100);
        assert_eq!(dwell_ms(&word("Next"), None, 600, true), 100);
    }

    #[test]
    fn table_tracks_token_count_across_rebuilds() {
        let tokens = vec![word("Hello"), Token::ParagraphBreak, word("world.")];
        let mut table = DurationTable::new();
        table.rebuild(&tokens, 300, true);
        assert_eq!(table.len(), tokens.len());
        table.rebuild(&tokens, 900, false);
        assert_eq!(table.len(), tokens.len());
        assert_eq!(table.as_slice(), &[67, 168, 67]);
        table.rebuild(&tokens[..1], 900, false);
        assert_eq!(table.len(), 1);
    }
}
