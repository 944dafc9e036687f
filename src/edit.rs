//! Editable text state for input widgets.
//!
//! An [`EditBox`] owns its text in a [`Buffer`] arena and keeps the cursor
//! as a byte offset that is always on a codepoint boundary, so slicing at
//! the cursor can never split a multi-byte sequence.

use crate::buffer::{Buffer, BufferSide};
use crate::utf8;

/// Per-codepoint input filter; rejected codepoints are dropped silently.
pub type Filter = fn(char) -> bool;

pub fn filter_default(_: char) -> bool {
    true
}

pub fn filter_ascii(c: char) -> bool {
    c.is_ascii()
}

pub fn filter_float(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}

pub fn filter_decimal(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

pub fn filter_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

pub fn filter_oct(c: char) -> bool {
    ('0'..='7').contains(&c)
}

pub fn filter_binary(c: char) -> bool {
    c == '0' || c == '1'
}

/// Host clipboard capability for the edit widget's copy/cut/paste keys.
pub trait Clipboard {
    /// Inserts the host clipboard's content at the edit box cursor.
    fn paste(&mut self, edit: &mut EditBox);
    /// Publishes `text` to the host clipboard.
    fn copy(&mut self, text: &str);
}

/// Byte span of selected text, `begin <= end`, both on codepoint boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub begin: usize,
    pub end: usize,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

pub struct EditBox {
    buffer: Buffer,
    len: usize,
    glyphs: usize,
    cursor: usize,
    pub active: bool,
    pub selection: Selection,
    filter: Filter,
}

impl EditBox {
    /// Growable edit box starting with `capacity` bytes.
    pub fn new(capacity: usize, filter: Option<Filter>) -> Self {
        Self::with_buffer(Buffer::with_default_allocator(capacity.max(1)), filter)
    }

    /// Edit box over a fixed allocation; input past capacity is dropped.
    pub fn with_fixed_size(capacity: usize, filter: Option<Filter>) -> Self {
        Self::with_buffer(Buffer::with_fixed_size(capacity), filter)
    }

    fn with_buffer(buffer: Buffer, filter: Option<Filter>) -> Self {
        Self {
            buffer,
            len: 0,
            glyphs: 0,
            cursor: 0,
            active: false,
            selection: Selection::default(),
            filter: filter.unwrap_or(filter_default),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.reset();
        self.len = 0;
        self.glyphs = 0;
        self.cursor = 0;
        self.selection = Selection::default();
    }

    /// Text content. Only filtered codepoints ever enter the buffer, so the
    /// content is valid UTF-8 by construction.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.buffer.memory()[..self.len]).unwrap_or("")
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Content length in codepoints.
    pub fn len_chars(&self) -> usize {
        self.glyphs
    }

    /// Cursor byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor to `byte`, snapping down to the nearest codepoint
    /// boundary.
    pub fn set_cursor(&mut self, byte: usize) {
        let byte = byte.min(self.len);
        self.cursor = if byte == 0 || byte == self.len {
            byte
        } else {
            let bytes = &self.buffer.memory()[..self.len];
            if bytes[byte] & 0xC0 == 0x80 {
                utf8::prev_boundary(bytes, byte)
            } else {
                byte
            }
        };
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.len;
    }

    fn ensure_capacity(&mut self, additional: usize) -> bool {
        while self.buffer.front_len() < self.len + additional {
            let want = self.len + additional - self.buffer.front_len();
            // Byte alignment keeps the text region gap-free.
            if self.buffer.alloc(BufferSide::Front, want, 1).is_none() {
                return false;
            }
        }
        true
    }

    /// Inserts `text` at the cursor, one filtered codepoint at a time.
    /// Returns how many codepoints were accepted.
    pub fn insert(&mut self, text: &str) -> usize {
        let mut accepted = 0;
        for c in text.chars() {
            if !(self.filter)(c) {
                continue;
            }
            let mut scratch = [0u8; utf8::GLYPH_SIZE];
            let n = utf8::encode(c, &mut scratch);
            if n == 0 || !self.ensure_capacity(n) {
                break;
            }
            let at = self.cursor;
            let memory = self.buffer.memory_mut();
            memory.copy_within(at..self.len, at + n);
            memory[at..at + n].copy_from_slice(&scratch[..n]);
            self.len += n;
            self.cursor += n;
            self.glyphs += 1;
            accepted += 1;
        }
        accepted
    }

    /// Feeds raw device text (as captured by the input layer) through the
    /// filter; invalid sequences decode to the replacement character.
    pub fn insert_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut accepted = 0;
        let mut offset = 0;
        while offset < bytes.len() {
            let (c, n) = utf8::decode(&bytes[offset..]);
            if n == 0 {
                break;
            }
            offset += n;
            let mut buf = [0u8; utf8::GLYPH_SIZE];
            let s = c.encode_utf8(&mut buf);
            accepted += self.insert(s);
        }
        accepted
    }

    fn remove_span(&mut self, begin: usize, end: usize) {
        let removed_glyphs = utf8::len(&self.buffer.memory()[begin..end]);
        self.buffer.memory_mut().copy_within(end..self.len, begin);
        self.len -= end - begin;
        self.glyphs -= removed_glyphs;
        self.cursor = begin;
        self.selection = Selection::default();
    }

    /// Backspace semantics: removes the selection if any, otherwise the
    /// codepoint before the cursor.
    pub fn delete_backward(&mut self) {
        if !self.selection.is_empty() {
            let Selection { begin, end } = self.selection;
            self.remove_span(begin, end);
        } else if self.cursor > 0 {
            let begin = utf8::prev_boundary(&self.buffer.memory()[..self.len], self.cursor);
            self.remove_span(begin, self.cursor);
        }
    }

    /// Delete semantics: removes the selection if any, otherwise the
    /// codepoint after the cursor.
    pub fn delete_forward(&mut self) {
        if !self.selection.is_empty() {
            let Selection { begin, end } = self.selection;
            self.remove_span(begin, end);
        } else if self.cursor < self.len {
            let (_, n) = utf8::decode(&self.buffer.memory()[self.cursor..self.len]);
            self.remove_span(self.cursor, (self.cursor + n).min(self.len));
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = utf8::prev_boundary(&self.buffer.memory()[..self.len], self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len {
            let (_, n) = utf8::decode(&self.buffer.memory()[self.cursor..self.len]);
            self.cursor = (self.cursor + n).min(self.len);
        }
    }

    /// Codepoint at glyph index `index` with its byte offset.
    pub fn at(&self, index: usize) -> Option<(char, usize)> {
        let bytes = &self.buffer.memory()[..self.len];
        let mut offset = 0;
        let mut glyph = 0;
        while offset < bytes.len() {
            let (c, n) = utf8::decode(&bytes[offset..]);
            if glyph == index {
                return Some((c, offset));
            }
            offset += n;
            glyph += 1;
        }
        None
    }

    /// Codepoint immediately after the cursor.
    pub fn at_cursor(&self) -> Option<char> {
        if self.cursor >= self.len {
            return None;
        }
        let (c, _) = utf8::decode(&self.buffer.memory()[self.cursor..self.len]);
        Some(c)
    }

    pub fn select(&mut self, begin: usize, end: usize) {
        let begin = begin.min(self.len);
        let end = end.min(self.len);
        self.selection = Selection {
            begin: begin.min(end),
            end: begin.max(end),
        };
    }

    pub fn selected_text(&self) -> &str {
        let Selection { begin, end } = self.selection;
        self.text().get(begin..end).unwrap_or("")
    }

    /// Replaces the whole content, cursor moving to the end.
    pub fn assign(&mut self, text: &str) {
        self.clear();
        self.insert(text);
    }
}

impl core::fmt::Debug for EditBox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EditBox")
            .field("text", &self.text())
            .field("cursor", &self.cursor)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_at_cursor_moves_cursor() {
        let mut edit = EditBox::new(64, None);
        edit.insert("hello");
        assert_eq!(edit.text(), "hello");
        assert_eq!(edit.cursor(), 5);
        edit.set_cursor(0);
        edit.insert("ab");
        assert_eq!(edit.text(), "abhello");
        assert_eq!(edit.cursor(), 2);
    }

    #[test]
    fn cursor_snaps_to_codepoint_boundary() {
        let mut edit = EditBox::new(64, None);
        edit.insert("a€b"); // € is 3 bytes at offset 1..4
        edit.set_cursor(2);
        assert_eq!(edit.cursor(), 1);
        edit.set_cursor(4);
        assert_eq!(edit.cursor(), 4);
        assert_eq!(edit.at_cursor(), Some('b'));
    }

    #[test]
    fn backspace_removes_whole_codepoint() {
        let mut edit = EditBox::new(64, None);
        edit.insert("a€b");
        edit.set_cursor(4);
        edit.delete_backward();
        assert_eq!(edit.text(), "ab");
        assert_eq!(edit.cursor(), 1);
        assert_eq!(edit.len_chars(), 2);
    }

    #[test]
    fn delete_forward_and_selection() {
        let mut edit = EditBox::new(64, None);
        edit.insert("abcdef");
        edit.set_cursor(1);
        edit.delete_forward();
        assert_eq!(edit.text(), "acdef");
        edit.select(1, 3);
        assert_eq!(edit.selected_text(), "cd");
        edit.delete_backward();
        assert_eq!(edit.text(), "aef");
        assert_eq!(edit.cursor(), 1);
    }

    #[test]
    fn filter_rejects_codepoints() {
        let mut edit = EditBox::new(64, Some(filter_decimal));
        let accepted = edit.insert("a1b2-c3");
        assert_eq!(accepted, 4);
        assert_eq!(edit.text(), "12-3");
    }

    #[test]
    fn fixed_capacity_drops_overflow() {
        let mut edit = EditBox::with_fixed_size(4, None);
        edit.insert("abcdef");
        assert_eq!(edit.text(), "abcd");
        // A 3-byte codepoint that does not fit is dropped whole.
        edit.delete_backward();
        edit.insert("€€");
        assert_eq!(edit.text(), "abc");
    }

    #[test]
    fn invalid_bytes_become_replacement_character() {
        let mut edit = EditBox::new(64, None);
        edit.insert_bytes(&[b'a', 0xFF, b'b']);
        assert_eq!(edit.text(), "a\u{FFFD}b");
    }

    #[test]
    fn glyph_indexing() {
        let mut edit = EditBox::new(64, None);
        edit.insert("a€b");
        assert_eq!(edit.at(0), Some(('a', 0)));
        assert_eq!(edit.at(1), Some(('€', 1)));
        assert_eq!(edit.at(2), Some(('b', 4)));
        assert_eq!(edit.at(3), None);
    }
}
