//! View models handed to the display surface.

use crate::{pacing::pivot_index, telemetry::SessionSummary};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutMode {
    /// Single word split around its recognition point.
    Split,
    /// Several words joined and centred as one block.
    Centered,
}

/// What the display shows for one reveal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderSpec<'a> {
    Split {
        before: &'a str,
        pivot: &'a str,
        after: &'a str,
        /// Character index of `pivot` within the word.
        pivot_offset: usize,
    },
    Centered {
        text: &'a str,
        word_count: usize,
    },
}

impl<'a> RenderSpec<'a> {
    pub fn split(word: &'a str) -> Self {
        let pivot_offset = pivot_index(word);
        let mut chars = word.char_indices().skip(pivot_offset);
        let (start, end) = match chars.next() {
            Some((start, ch)) => (start, start + ch.len_utf8()),
            None => (word.len(), word.len()),
        };

        Self::Split {
            before: &word[..start],
            pivot: &word[start..end],
            after: &word[end..],
            pivot_offset,
        }
    }

    pub const fn centered(text: &'a str, word_count: usize) -> Self {
        Self::Centered { text, word_count }
    }

    pub const fn layout(&self) -> LayoutMode {
        match self {
            Self::Split { .. } => LayoutMode::Split,
            Self::Centered { .. } => LayoutMode::Centered,
        }
    }

    /// Vertical fixation guide is only drawn for split words.
    pub const fn guide_visible(&self) -> bool {
        matches!(self, Self::Split { .. })
    }
}

/// App-level view model consumed by the host renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Screen<'a> {
    /// Nothing left to reveal at the cursor.
    Empty,
    Reading {
        spec: RenderSpec<'a>,
        /// `false` during a blank interval.
        visible: bool,
        playing: bool,
        wpm: u16,
        cursor: usize,
        total: usize,
        chapter: Option<&'a str>,
    },
    Finished {
        summary: &'a SessionSummary,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_slices_around_pivot() {
        let spec = RenderSpec::split("international");
        assert_eq!(
            spec,
            RenderSpec::Split {
                before: "int",
                pivot: "e",
                after: "rnational",
                pivot_offset: 3,
            }
        );
        assert!(spec.guide_visible());
    }

    #[test]
    fn split_handles_multibyte_words() {
        let spec = RenderSpec::split("ação");
        assert_eq!(
            spec,
            RenderSpec::Split {
                before: "",
                pivot: "a",
                after: "ção",
                pivot_offset: 0,
            }
        );

        let spec = RenderSpec::split("coração");
        let RenderSpec::Split { before, pivot, after, .. } = spec else {
            panic!("expected split layout");
        };
        assert_eq!((before, pivot, after), ("c", "o", "ração"));
    }

    #[test]
    fn centered_hides_guide() {
        let spec = RenderSpec::centered("one two", 2);
        assert_eq!(spec.layout(), LayoutMode::Centered);
        assert!(!spec.guide_visible());
    }
}
