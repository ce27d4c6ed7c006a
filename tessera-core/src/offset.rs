//! Character/byte offset conversion.
//!
//! Spans count characters, Rust strings index bytes. An [`OffsetMap`] is
//! built once per text so every conversion afterwards is O(1). For ASCII
//! text both coordinate systems coincide and no tables are allocated.
//!
//! ```text
//! Text:   "café au"
//! bytes:   c a f [é ] _ a u      0 1 2 3-4 5 6 7
//! chars:   c a f  é   _ a u      0 1 2  3  4 5 6
//! ```

use crate::span::Span;

/// Precomputed char ↔ byte tables for one text.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    /// `char_to_byte[c]` is the byte offset of character `c`; has `chars + 1` entries.
    char_to_byte: Vec<usize>,
    /// `byte_to_char[b]` is the character containing byte `b`; has `bytes + 1` entries.
    byte_to_char: Vec<usize>,
    char_len: usize,
    is_ascii: bool,
}

impl OffsetMap {
    /// Build the tables for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: Vec::new(),
                byte_to_char: Vec::new(),
                char_len: text.len(),
                is_ascii: true,
            };
        }

        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        let mut byte_to_char = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            char_to_byte.push(byte_idx);
            for slot in &mut byte_to_char[byte_idx..byte_idx + ch.len_utf8()] {
                *slot = char_idx;
            }
        }
        let char_len = char_to_byte.len();
        char_to_byte.push(text.len());
        byte_to_char[text.len()] = char_len;

        Self {
            char_to_byte,
            byte_to_char,
            char_len,
            is_ascii: false,
        }
    }

    /// Length of the text in characters.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.char_len
    }

    /// True if the text is pure ASCII.
    #[must_use]
    pub const fn is_ascii(&self) -> bool {
        self.is_ascii
    }

    /// Byte offset of character `char_idx`, clamped to the end of the text.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx.min(self.char_len);
        }
        self.char_to_byte
            .get(char_idx)
            .or_else(|| self.char_to_byte.last())
            .copied()
            .unwrap_or(0)
    }

    /// Character containing byte `byte_idx`, clamped to the end of the text.
    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.char_len);
        }
        self.byte_to_char
            .get(byte_idx)
            .or_else(|| self.byte_to_char.last())
            .copied()
            .unwrap_or(0)
    }

    /// Byte range for a character span.
    #[must_use]
    pub fn byte_range(&self, span: Span) -> std::ops::Range<usize> {
        self.char_to_byte(span.start())..self.char_to_byte(span.end())
    }

    /// Slice `text` (the text this map was built from) by a character span.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t str, span: Span) -> &'t str {
        text.get(self.byte_range(span)).unwrap_or("")
    }
}
