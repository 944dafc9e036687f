//! Forward-decoding UTF-8 helpers used by the edit box and text input.
//!
//! Decoding never assumes fixed-width characters and never panics on
//! malformed bytes: an invalid or truncated sequence yields [`INVALID`]
//! and advances by exactly one byte, so subsequent decoding stays aligned.

/// Replacement codepoint substituted for malformed sequences.
pub const INVALID: char = '\u{FFFD}';

/// Maximum number of bytes a single encoded codepoint occupies.
pub const GLYPH_SIZE: usize = 4;

/// Decodes the codepoint starting at `bytes[0]`.
///
/// Returns the codepoint and the number of bytes consumed. Empty input
/// yields `(INVALID, 0)`.
pub fn decode(bytes: &[u8]) -> (char, usize) {
    if bytes.is_empty() {
        return (INVALID, 0);
    }
    let len = match bytes[0] {
        b if b < 0x80 => 1,
        b if b & 0xE0 == 0xC0 => 2,
        b if b & 0xF0 == 0xE0 => 3,
        b if b & 0xF8 == 0xF0 => 4,
        _ => return (INVALID, 1),
    };
    if bytes.len() < len {
        return (INVALID, 1);
    }
    match core::str::from_utf8(&bytes[..len]) {
        Ok(s) => (s.chars().next().unwrap_or(INVALID), len),
        Err(_) => (INVALID, 1),
    }
}

/// Encodes `codepoint` into `out`, returning the number of bytes written.
/// Returns 0 if `out` is too small to hold the encoding.
pub fn encode(codepoint: char, out: &mut [u8]) -> usize {
    let need = codepoint.len_utf8();
    if out.len() < need {
        return 0;
    }
    codepoint.encode_utf8(out);
    need
}

/// Number of codepoints in `bytes`, counting each malformed byte as one.
pub fn len(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut at = 0;
    while at < bytes.len() {
        let (_, n) = decode(&bytes[at..]);
        at += n.max(1);
        count += 1;
    }
    count
}

/// Byte offset of the codepoint preceding `pos`, assuming `pos` is on a
/// codepoint boundary. Returns 0 at the start of the buffer.
pub fn prev_boundary(bytes: &[u8], pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    let mut at = pos - 1;
    while at > 0 && bytes[at] & 0xC0 == 0x80 {
        at -= 1;
    }
    at
}
