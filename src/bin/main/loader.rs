use std::{fs, path::Path};

use cadence_core::document::{Document, Token};

use super::error::HostError;

/// Latin and extended Latin letters; tokens without one are dropped.
fn is_latin_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{024F}').contains(&ch)
        || ('\u{1E00}'..='\u{1EFF}').contains(&ch)
}

/// Splits paragraphs on blank lines and words on whitespace, inserting a
/// paragraph break between non-empty paragraphs.
pub(super) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut paragraph_open = false;
    let mut pending_break = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            if paragraph_open {
                pending_break = true;
                paragraph_open = false;
            }
            continue;
        }

        for word in line
            .split_whitespace()
            .filter(|word| word.chars().any(is_latin_letter))
        {
            if pending_break {
                tokens.push(Token::ParagraphBreak);
                pending_break = false;
            }
            tokens.push(Token::word(word));
            paragraph_open = true;
        }
    }

    tokens
}

pub(super) fn load_text_file(path: &Path) -> Result<Document, HostError> {
    let text = fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // Same identity for the same file name, wherever it was opened from.
    let identity = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document::new(identity, tokenize(&text), Vec::new())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .map(|token| token.as_word().unwrap_or("|"))
            .collect()
    }

    #[test]
    fn breaks_only_between_non_empty_paragraphs() {
        let text = "\n\nFirst line\nstill first.\n\n\n--- ***\n\nSecond, para.\n\n";
        assert_eq!(
            render(&tokenize(text)),
            ["First", "line", "still", "first.", "|", "Second,", "para."]
        );
    }

    #[test]
    fn keeps_accented_words_and_drops_symbols() {
        let text = "Ação — 42 über ½ résumé";
        assert_eq!(render(&tokenize(text)), ["Ação", "über", "résumé"]);
    }

    #[test]
    fn symbol_only_text_is_rejected() {
        let err = Document::new("x", tokenize("--- 123 ***"), Vec::new()).unwrap_err();
        assert_eq!(err, cadence_core::document::DocumentError::NoReadableText);
    }
}
