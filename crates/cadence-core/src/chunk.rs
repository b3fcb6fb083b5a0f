//! Groups tokens into reveal units and decides inter-reveal blanking.

use crate::{document::Token, render::LayoutMode};

/// Largest number of words one reveal may hold.
pub const MAX_CHUNK_SIZE: usize = 5;

/// Fixed blank between multi-word reveals.
pub const BLANK_MULTI_MS: u32 = 25;

const ISI_SLOW_MS: u32 = 50;
const ISI_MEDIUM_MS: u32 = 30;
const ISI_SLOW_MAX_WPM: u16 = 200;
const ISI_MEDIUM_MAX_WPM: u16 = 300;

/// Token range chosen for one reveal. Never straddles a paragraph break.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlannedChunk {
    /// First word index (leading breaks already skipped).
    pub start: usize,
    /// One past the last word index.
    pub end: usize,
    pub layout: LayoutMode,
}

impl PlannedChunk {
    pub fn word_count(&self) -> usize {
        self.end - self.start
    }

    pub fn words(self, tokens: &[Token]) -> impl Iterator<Item = &str> {
        tokens[self.start..self.end].iter().filter_map(Token::as_word)
    }
}

/// Collects up to `chunk_size` words starting at `cursor`.
/// Returns `None` when only paragraph breaks remain.
pub fn plan(tokens: &[Token], cursor: usize, chunk_size: usize) -> Option<PlannedChunk> {
    let chunk_size = chunk_size.max(1);
    let start = cursor
        + tokens
            .get(cursor..)?
            .iter()
            .position(|token| !token.is_break())?;

    let end = tokens[start..]
        .iter()
        .take(chunk_size)
        .position(Token::is_break)
        .map_or_else(|| (start + chunk_size).min(tokens.len()), |offset| start + offset);

    let layout = if chunk_size > 1 {
        LayoutMode::Centered
    } else {
        LayoutMode::Split
    };

    Some(PlannedChunk { start, end, layout })
}

/// Blank inserted before the next reveal; `0` means reveal immediately.
pub fn blank_interval_ms(chunk_size: usize, blank_flash: bool, wpm: u16) -> u32 {
    if chunk_size > 1 {
        return BLANK_MULTI_MS;
    }
    if !blank_flash {
        return 0;
    }

    if wpm <= ISI_SLOW_MAX_WPM {
        ISI_SLOW_MS
    } else if wpm <= ISI_MEDIUM_MAX_WPM {
        ISI_MEDIUM_MS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn tokens(spec: &[&str]) -> Vec<Token> {
        spec.iter()
            .map(|text| {
                if *text == "|" {
                    Token::ParagraphBreak
                } else {
                    Token::word(*text)
                }
            })
            .collect()
    }

    #[test]
    fn single_word_chunk_uses_split_layout() {
        let toks = tokens(&["alpha", "beta"]);
        let chunk = plan(&toks, 1, 1).unwrap();
        assert_eq!((chunk.start, chunk.end), (1, 2));
        assert_eq!(chunk.layout, LayoutMode::Split);
    }

    #[test]
    fn skips_leading_breaks_and_stops_at_next_break() {
        let toks = tokens(&["a", "|", "|", "b", "c", "|", "d"]);
        let chunk = plan(&toks, 1, 4).unwrap();
        assert_eq!((chunk.start, chunk.end), (3, 5));
        assert_eq!(chunk.layout, LayoutMode::Centered);
        let words: Vec<&str> = chunk.words(&toks).collect();
        assert_eq!(words, ["b", "c"]);
    }

    #[test]
    fn chunk_is_cut_at_document_end() {
        let toks = tokens(&["a", "b", "c"]);
        let chunk = plan(&toks, 1, 5).unwrap();
        assert_eq!((chunk.start, chunk.end), (1, 3));
    }

    #[test]
    fn only_breaks_left_means_no_content() {
        let toks = tokens(&["a", "|", "|"]);
        assert_eq!(plan(&toks, 1, 1), None);
        assert_eq!(plan(&toks, 3, 1), None);
        assert_eq!(plan(&toks, 9, 1), None);
    }

    #[test]
    fn blank_policy_by_rate_and_mode() {
        assert_eq!(blank_interval_ms(1, true, 150), 50);
        assert_eq!(blank_interval_ms(1, true, 200), 50);
        assert_eq!(blank_interval_ms(1, true, 300), 30);
        assert_eq!(blank_interval_ms(1, true, 400), 0);
        assert_eq!(blank_interval_ms(1, false, 150), 0);
        assert_eq!(blank_interval_ms(3, false, 900), BLANK_MULTI_MS);
        assert_eq!(blank_interval_ms(2, true, 150), BLANK_MULTI_MS);
    }
}
