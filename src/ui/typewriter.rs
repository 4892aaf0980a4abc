//! Typing-effect playback for assistant replies.
//!
//! The full reply is known before playback starts; this only controls how much
//! of it is revealed each tick. Purely presentational: the transcript already
//! holds the complete text, and the final frame always renders the original
//! string, not the accumulated prefix.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typewriter {
    revealed: usize,
    total: usize,
}

impl Typewriter {
    /// Start playback over the given reply. Counting graphemes keeps accents
    /// and emoji from being split mid-character.
    pub fn new(text: &str) -> Self {
        Self {
            revealed: 0,
            total: text.graphemes(true).count(),
        }
    }

    /// Reveal one more grapheme. Ticking past the end is a no-op.
    pub fn tick(&mut self) {
        if self.revealed < self.total {
            self.revealed += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.total
    }

    /// The currently visible prefix of `text`. Once playback finishes this is
    /// the whole original string.
    pub fn visible_prefix<'a>(&self, text: &'a str) -> &'a str {
        if self.is_done() {
            return text;
        }
        match text.grapheme_indices(true).nth(self.revealed) {
            Some((byte_offset, _)) => &text[..byte_offset],
            None => text,
        }
    }
}
