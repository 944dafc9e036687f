use thiserror::Error;

/// Failures surfaced by the bounded style stacks.
///
/// Both conditions are caller bugs (a missing or extra push/pop), so they
/// are reported instead of silently dropped; the frame keeps rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("style stack is full (capacity {0})")]
    StackFull(usize),
    #[error("pop on empty style stack")]
    StackEmpty,
}

/// Failures of the font baking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    /// The requested glyph set cannot fit within the packer's dimension
    /// ceiling. This is a hard error: there is no safe partial atlas.
    /// Retrying with fewer glyphs or smaller sizes is a caller decision.
    #[error("glyphs do not fit into a {0}x{0} atlas")]
    AtlasTooSmall(u32),
    #[error("font data could not be parsed")]
    BadFontData,
    #[error("baking temp buffer exhausted (needed {needed} more bytes)")]
    OutOfTempMemory { needed: usize },
    #[error("no font configurations given")]
    NoConfigs,
}
