//! Loaded document: ordered tokens with paragraph breaks, plus chapters.

use alloc::{string::String, vec::Vec};
use core::fmt;

/// One entry of the token sequence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Word(String),
    ParagraphBreak,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Self::Word(text.into())
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(text) => Some(text.as_str()),
            Self::ParagraphBreak => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::ParagraphBreak)
    }
}

/// Table-of-contents entry supplied by the loader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub token_offset: usize,
}

impl Chapter {
    pub fn new(title: impl Into<String>, token_offset: usize) -> Self {
        Self {
            title: title.into(),
            token_offset,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentError {
    NoReadableText,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReadableText => f.write_str("no readable text found in document"),
        }
    }
}

/// Immutable token sequence owned by a reading session.
#[derive(Clone, Debug)]
pub struct Document {
    identity: String,
    tokens: Vec<Token>,
    chapters: Vec<Chapter>,
    /// `real_before[i]` = number of words in `tokens[..i]`.
    real_before: Vec<u32>,
}

impl Document {
    pub fn new(
        identity: impl Into<String>,
        tokens: Vec<Token>,
        mut chapters: Vec<Chapter>,
    ) -> Result<Self, DocumentError> {
        let mut real_before = Vec::with_capacity(tokens.len() + 1);
        let mut real = 0u32;
        real_before.push(0);
        for token in &tokens {
            if !token.is_break() {
                real = real.saturating_add(1);
            }
            real_before.push(real);
        }

        if real == 0 {
            return Err(DocumentError::NoReadableText);
        }

        chapters.retain(|chapter| chapter.token_offset < tokens.len());
        chapters.sort_by_key(|chapter| chapter.token_offset);

        Ok(Self {
            identity: identity.into(),
            tokens,
            chapters,
            real_before,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Count of words, paragraph breaks excluded.
    pub fn real_token_count(&self) -> usize {
        self.real_before.last().copied().unwrap_or(0) as usize
    }

    /// Words at or after `index`.
    pub fn real_tokens_from(&self, index: usize) -> usize {
        let index = index.min(self.tokens.len());
        (self.real_token_count() as u32).saturating_sub(self.real_before[index]) as usize
    }

    /// Last chapter starting at or before `cursor`.
    pub fn chapter_index_at(&self, cursor: usize) -> Option<usize> {
        let upto = self
            .chapters
            .partition_point(|chapter| chapter.token_offset <= cursor);
        upto.checked_sub(1)
    }

    /// Up to `max_words` words starting at `index`, skipping paragraph breaks.
    pub fn words_from(&self, index: usize, max_words: usize) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .skip(index)
            .filter_map(Token::as_word)
            .take(max_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> Document {
        Document::new(
            "sample.txt",
            vec![
                Token::word("One"),
                Token::word("two."),
                Token::ParagraphBreak,
                Token::word("Three"),
                Token::word("four"),
            ],
            vec![Chapter::new("Second", 3), Chapter::new("First", 0)],
        )
        .unwrap()
    }

    #[test]
    fn rejects_documents_without_words() {
        let err = Document::new("empty", vec![Token::ParagraphBreak], vec![]).unwrap_err();
        assert_eq!(err, DocumentError::NoReadableText);
    }

    #[test]
    fn counts_real_tokens_around_breaks() {
        let doc = sample();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.real_token_count(), 4);
        assert_eq!(doc.real_tokens_from(0), 4);
        assert_eq!(doc.real_tokens_from(2), 2);
        assert_eq!(doc.real_tokens_from(3), 2);
        assert_eq!(doc.real_tokens_from(5), 0);
        assert_eq!(doc.real_tokens_from(50), 0);
    }

    #[test]
    fn chapters_are_sorted_and_resolved_by_cursor() {
        let doc = sample();
        assert_eq!(doc.chapters()[0].title, "First");
        assert_eq!(doc.chapter_index_at(0), Some(0));
        assert_eq!(doc.chapter_index_at(2), Some(0));
        assert_eq!(doc.chapter_index_at(4), Some(1));
    }

    #[test]
    fn words_from_skips_breaks() {
        let doc = sample();
        let words: Vec<&str> = doc.words_from(1, 2).collect();
        assert_eq!(words, vec!["two.", "Three"]);
    }
}
