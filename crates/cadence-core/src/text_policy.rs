//! Shared text joining and truncation for fixed-size view buffers.

use core::str;

pub const BOOKMARK_CONTEXT_WORDS: usize = 4;
pub const BOOKMARK_CONTEXT_CHARS: usize = 30;

/// Joins `words` with single spaces into `out`, stopping at `max_words` words
/// or `max_chars` characters. A truncated result ends with `...` when it fits.
pub fn join_limited<'a, 'w>(
    words: impl IntoIterator<Item = &'w str>,
    out: &'a mut [u8],
    max_words: usize,
    max_chars: usize,
) -> &'a str {
    if out.is_empty() {
        return "";
    }

    let mut len = 0usize;
    let mut char_count = 0usize;
    let mut truncated = false;

    for (word_count, word) in words.into_iter().enumerate() {
        if word_count >= max_words {
            truncated = true;
            break;
        }

        if word_count > 0 {
            if len + 1 > out.len() || char_count >= max_chars {
                truncated = true;
                break;
            }
            out[len] = b' ';
            len += 1;
            char_count += 1;
        }

        for ch in word.chars() {
            let mut utf8 = [0u8; 4];
            let encoded = ch.encode_utf8(&mut utf8).as_bytes();
            if char_count >= max_chars || len + encoded.len() > out.len() {
                truncated = true;
                break;
            }

            out[len..len + encoded.len()].copy_from_slice(encoded);
            len += encoded.len();
            char_count += 1;
        }

        if truncated {
            break;
        }
    }

    if len == 0 {
        return "";
    }

    if truncated && len + 3 <= out.len() {
        out[len..len + 3].copy_from_slice(b"...");
        len += 3;
    }

    str::from_utf8(&out[..len]).unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_single_spaces() {
        let mut buf = [0u8; 64];
        assert_eq!(join_limited(["one", "two", "three"], &mut buf, 5, 64), "one two three");
    }

    #[test]
    fn marks_truncation_by_word_limit() {
        let mut buf = [0u8; 64];
        assert_eq!(join_limited(["a", "b", "c"], &mut buf, 2, 64), "a b...");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let mut buf = [0u8; 64];
        assert_eq!(join_limited(["coração", "bom"], &mut buf, 4, 5), "coraç...");
    }

    #[test]
    fn empty_buffer_yields_empty_text() {
        let mut buf = [0u8; 0];
        assert_eq!(join_limited(["word"], &mut buf, 1, 10), "");
    }
}
