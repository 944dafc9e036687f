//! Font abstraction and TTF atlas baking.
//!
//! Widgets never touch font data directly; they measure and draw through the
//! [`UserFont`] capability so any text stack can be plugged in. For users
//! without one, this module bakes TrueType fonts into a single alpha-8 atlas
//! in three phases over a caller-provided temporary [`Buffer`]:
//!
//! 1. [`bake_memory`] sizes the scratch space,
//! 2. [`bake_pack`] measures every requested glyph and packs the atlas,
//! 3. [`bake`] rasterizes into the caller's pixel block and emits glyph
//!    tables.
//!
//! Phase separation exists so the caller owns every allocation: nothing here
//! allocates atlas or scratch memory behind the caller's back (glyph tables
//! and rasterizer internals aside).

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use rusttype::{point, Font as TtfFont, Scale};

use crate::buffer::Buffer;
use crate::command::Handle;
use crate::errors::FontError;
use crate::math::{Recti, Vector2};
use crate::utf8;

// ===============================================================
//
//                          USER FONT
//
// ===============================================================

/// Glyph metrics handed to the vertex emitter, in display pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFontGlyph {
    /// Texture coordinates, top-left and bottom-right.
    pub uv: [Vector2; 2],
    /// Offset from the pen position to the glyph quad's top-left corner.
    pub offset: Vector2,
    pub width: f32,
    pub height: f32,
    /// Horizontal pen advance.
    pub xadvance: f32,
}

/// Text measuring and glyph lookup capability.
///
/// Only [`DrawList::text`](crate::draw::DrawList) needs `glyph` and
/// `texture`; a measuring-only font that panics there is fine as long as
/// vertex output is never requested.
pub trait UserFont {
    /// Natural pixel height of the font.
    fn height(&self) -> f32;
    /// Width of `text` rendered at `height` pixels.
    fn width(&self, height: f32, text: &str) -> f32;
    /// Quad and advance for one codepoint. `next` is the following
    /// codepoint so implementations can apply pair kerning; fonts baked by
    /// this module carry no kerning table and ignore it.
    fn glyph(&self, height: f32, codepoint: char, next: Option<char>) -> UserFontGlyph;
    /// Atlas texture the glyph coordinates refer to.
    fn texture(&self) -> Handle;
}

/// Shared font handle as stored in styles and text commands.
pub type UserFontRef = Rc<dyn UserFont>;

// ===============================================================
//
//                          BAKING
//
// ===============================================================

/// How glyph texture coordinates are expressed in the baked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordType {
    /// Normalized 0..1 over the atlas.
    #[default]
    Uv,
    /// Absolute atlas pixels.
    Pixel,
}

/// Inclusive codepoint range.
pub type GlyphRange = (u32, u32);

pub fn default_glyph_ranges() -> &'static [GlyphRange] {
    &[(0x0020, 0x00FF)]
}

pub fn chinese_glyph_ranges() -> &'static [GlyphRange] {
    &[
        (0x0020, 0x00FF),
        (0x3000, 0x30FF),
        (0x31F0, 0x31FF),
        (0xFF00, 0xFFEF),
        (0x4E00, 0x9FAF),
    ]
}

pub fn cyrillic_glyph_ranges() -> &'static [GlyphRange] {
    &[(0x0020, 0x00FF), (0x0400, 0x052F), (0x2DE0, 0x2DFF), (0xA640, 0xA69F)]
}

pub fn korean_glyph_ranges() -> &'static [GlyphRange] {
    &[(0x0020, 0x00FF), (0x3131, 0x3163), (0xAC00, 0xD79D)]
}

/// One font to bake into the shared atlas.
#[derive(Clone)]
pub struct FontConfig {
    /// Raw TTF file contents.
    pub ttf: Vec<u8>,
    /// Baked pixel height.
    pub size: f32,
    /// Horizontal/vertical rasterization multiplier; the glyph is rendered
    /// oversized and averaged back down for sub-pixel quality.
    pub oversample_h: u32,
    pub oversample_v: u32,
    /// Rounds glyph advances to whole pixels.
    pub pixel_snap: bool,
    pub coord_type: CoordType,
    /// Extra spacing added to every glyph advance.
    pub spacing: Vector2,
    pub ranges: Vec<GlyphRange>,
}

impl FontConfig {
    pub fn new(ttf: Vec<u8>, size: f32) -> Self {
        Self {
            ttf,
            size,
            oversample_h: 1,
            oversample_v: 1,
            pixel_snap: false,
            coord_type: CoordType::Uv,
            spacing: Vector2::default(),
            ranges: default_glyph_ranges().to_vec(),
        }
    }

    fn glyph_count(&self) -> usize {
        self.ranges
            .iter()
            .map(|&(lo, hi)| (hi.saturating_sub(lo) as usize) + 1)
            .sum()
    }
}

/// Packer working record, one per glyph, living in the temporary buffer
/// between [`bake_pack`] and [`bake`].
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct PackedRect {
    pub w: u16,
    pub h: u16,
    pub x: u16,
    pub y: u16,
}

/// Per-font slice of the packed rect slab.
#[derive(Debug, Clone, Copy)]
pub struct PackedFont {
    /// Index of the font's first rect in the slab.
    pub rect_offset: usize,
    pub glyph_count: usize,
}

/// Result of the packing phase, consumed by [`bake`].
pub struct PackOutput {
    pub width: u32,
    pub height: u32,
    /// Required size of the caller's alpha-8 pixel block.
    pub image_size: usize,
    /// Region reserved for custom data, if requested.
    pub custom: Recti,
    pub(crate) rect_range: core::ops::Range<usize>,
    pub fonts: Vec<PackedFont>,
}

/// Metrics of one baked font within the shared atlas.
#[derive(Debug, Clone)]
pub struct BakedFont {
    /// Pixel height the font was baked at.
    pub height: f32,
    pub ascent: f32,
    pub descent: f32,
    /// First index of this font's glyphs in the shared glyph table.
    pub glyph_offset: usize,
    pub glyph_count: usize,
    pub ranges: Vec<GlyphRange>,
}

/// One baked glyph. Position fields are display-pixel offsets from the pen
/// position, texture fields follow the config's [`CoordType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FontGlyph {
    pub codepoint: char,
    pub xadvance: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

/// Phase 1: returns `(temp_size, glyph_count)`, where `temp_size` is the
/// number of bytes [`bake_pack`] needs in its temporary buffer.
pub fn bake_memory(configs: &[FontConfig]) -> (usize, usize) {
    let glyph_count: usize = configs.iter().map(FontConfig::glyph_count).sum();
    // One rect per glyph plus alignment slack.
    let temp = glyph_count * core::mem::size_of::<PackedRect>() + 64;
    (temp, glyph_count)
}

const PACK_MIN_SIZE: u32 = 128;
const PACK_MAX_SIZE: u32 = 8192;
/// One pixel of padding between packed rects.
const PACK_PADDING: u16 = 1;

/// Phase 2: measures every glyph, packs the atlas and reserves an optional
/// `custom` region (width, height in pixels) for caller-stamped data.
///
/// The rect slab lives in `temp` and must survive untouched until [`bake`].
pub fn bake_pack(
    temp: &mut Buffer,
    configs: &[FontConfig],
    custom: Option<(u16, u16)>,
) -> Result<PackOutput, FontError> {
    if configs.is_empty() {
        return Err(FontError::NoConfigs);
    }

    let glyph_count: usize = configs.iter().map(FontConfig::glyph_count).sum();
    let slab_bytes = glyph_count * core::mem::size_of::<PackedRect>();
    let rect_range = temp
        .alloc(
            crate::buffer::BufferSide::Front,
            slab_bytes,
            core::mem::align_of::<PackedRect>(),
        )
        .ok_or(FontError::OutOfTempMemory { needed: slab_bytes })?;

    // Measure every glyph's rasterized footprint at its oversampled scale.
    let mut fonts = Vec::with_capacity(configs.len());
    {
        let rects: &mut [PackedRect] =
            bytemuck::cast_slice_mut(&mut temp.memory_mut()[rect_range.clone()]);
        let mut cursor = 0usize;
        for config in configs {
            let font =
                TtfFont::try_from_bytes(&config.ttf).ok_or(FontError::BadFontData)?;
            let scale = Scale {
                x: config.size * config.oversample_h as f32,
                y: config.size * config.oversample_v as f32,
            };
            let count = config.glyph_count();
            fonts.push(PackedFont {
                rect_offset: cursor,
                glyph_count: count,
            });
            let mut slot = cursor;
            for &(lo, hi) in &config.ranges {
                for codepoint in lo..=hi {
                    let rect = &mut rects[slot];
                    slot += 1;
                    let Some(c) = char::from_u32(codepoint) else {
                        *rect = PackedRect::default();
                        continue;
                    };
                    let glyph = font.glyph(c).scaled(scale).positioned(point(0.0, 0.0));
                    match glyph.pixel_bounding_box() {
                        Some(bb) => {
                            *rect = PackedRect {
                                w: bb.width() as u16 + PACK_PADDING,
                                h: bb.height() as u16 + PACK_PADDING,
                                x: 0,
                                y: 0,
                            };
                        }
                        // Whitespace still owes an advance but no pixels.
                        None => *rect = PackedRect::default(),
                    }
                }
            }
            cursor += count;
        }
    }

    let custom_rect = custom.map(|(w, h)| PackedRect {
        w: w + PACK_PADDING,
        h: h + PACK_PADDING,
        x: 0,
        y: 0,
    });

    // Grow the atlas width in power-of-two steps until a shelf pack fits
    // within a square of that width.
    let mut size = PACK_MIN_SIZE;
    let (width, height, custom_out) = loop {
        let rects: &mut [PackedRect] =
            bytemuck::cast_slice_mut(&mut temp.memory_mut()[rect_range.clone()]);
        match shelf_pack(rects, custom_rect, size) {
            Some((height, custom_out)) => break (size, height, custom_out),
            None => {
                if size >= PACK_MAX_SIZE {
                    return Err(FontError::AtlasTooSmall(PACK_MAX_SIZE));
                }
                size *= 2;
            }
        }
    };

    Ok(PackOutput {
        width,
        height,
        image_size: (width * height) as usize,
        custom: custom_out,
        rect_range,
        fonts,
    })
}

/// Shelf packer: rows are opened left to right, each as tall as its tallest
/// occupant, top to bottom. Rects are placed in slab order, which keeps the
/// layout deterministic for identical inputs. Returns the used height, or
/// `None` if the pack exceeds a `max_width` square.
fn shelf_pack(
    rects: &mut [PackedRect],
    custom: Option<PackedRect>,
    max_width: u32,
) -> Option<(u32, Recti)> {
    let mut shelf_x = 0u32;
    let mut shelf_y = 0u32;
    let mut shelf_h = 0u32;
    let mut custom_out = Recti::default();

    let mut place = |w: u16, h: u16| -> Option<(u16, u16)> {
        if w == 0 || h == 0 {
            return Some((0, 0));
        }
        if w as u32 > max_width {
            return None;
        }
        if shelf_x + w as u32 > max_width {
            shelf_y += shelf_h;
            shelf_x = 0;
            shelf_h = 0;
        }
        if shelf_y + h as u32 > max_width {
            return None;
        }
        let pos = (shelf_x as u16, shelf_y as u16);
        shelf_x += w as u32;
        shelf_h = shelf_h.max(h as u32);
        Some(pos)
    };

    // Custom data goes first so its location is stable across font sets.
    if let Some(c) = custom {
        let (x, y) = place(c.w, c.h)?;
        custom_out = Recti::new(
            x as i16,
            y as i16,
            (c.w - PACK_PADDING) as i16,
            (c.h - PACK_PADDING) as i16,
        );
    }
    for rect in rects.iter_mut() {
        let (x, y) = place(rect.w, rect.h)?;
        rect.x = x;
        rect.y = y;
    }
    Some((shelf_y + shelf_h, custom_out))
}

/// Phase 3: rasterizes every glyph into `image` (alpha-8, `pack.width` by
/// `pack.height`) and returns the shared glyph table plus per-font metrics.
pub fn bake(
    image: &mut [u8],
    pack: &PackOutput,
    temp: &Buffer,
    configs: &[FontConfig],
) -> Result<(Vec<FontGlyph>, Vec<BakedFont>), FontError> {
    if image.len() < pack.image_size {
        return Err(FontError::OutOfTempMemory {
            needed: pack.image_size - image.len(),
        });
    }
    let rects: &[PackedRect] = bytemuck::cast_slice(&temp.memory()[pack.rect_range.clone()]);
    let atlas_w = pack.width as usize;

    let mut glyphs = Vec::new();
    let mut baked = Vec::with_capacity(configs.len());

    for (config, packed) in configs.iter().zip(&pack.fonts) {
        let font = TtfFont::try_from_bytes(&config.ttf).ok_or(FontError::BadFontData)?;
        let oh = config.oversample_h.max(1);
        let ov = config.oversample_v.max(1);
        let scale = Scale {
            x: config.size * oh as f32,
            y: config.size * ov as f32,
        };
        let metrics = font.v_metrics(Scale::uniform(config.size));

        let glyph_offset = glyphs.len();
        let mut slot = packed.rect_offset;
        for &(lo, hi) in &config.ranges {
            for codepoint in lo..=hi {
                let rect = rects[slot];
                slot += 1;
                let Some(c) = char::from_u32(codepoint) else {
                    continue;
                };
                let positioned = font.glyph(c).scaled(scale).positioned(point(0.0, 0.0));
                let advance = positioned.unpositioned().h_metrics().advance_width / oh as f32;
                let mut xadvance = advance + config.spacing.x;
                if config.pixel_snap {
                    xadvance = xadvance.round();
                }

                let mut glyph = FontGlyph {
                    codepoint: c,
                    xadvance,
                    ..Default::default()
                };

                // A non-empty rect was measured from this same glyph in the
                // packing phase, so the bounding box is present again here.
                let bounding = (rect.w > PACK_PADDING && rect.h > PACK_PADDING)
                    .then(|| positioned.pixel_bounding_box())
                    .flatten();
                if let Some(bb) = bounding {
                    let src_w = (rect.w - PACK_PADDING) as usize;
                    let src_h = (rect.h - PACK_PADDING) as usize;
                    rasterize_into(
                        &positioned,
                        image,
                        atlas_w,
                        rect.x as usize,
                        rect.y as usize,
                        src_w,
                        src_h,
                        oh as usize,
                        ov as usize,
                    );

                    // Quad extent is in display pixels, baseline-relative
                    // with y growing downward from the line top.
                    glyph.x0 = bb.min.x as f32 / oh as f32;
                    glyph.y0 = bb.min.y as f32 / ov as f32 + metrics.ascent;
                    glyph.x1 = glyph.x0 + src_w as f32 / oh as f32;
                    glyph.y1 = glyph.y0 + src_h as f32 / ov as f32;

                    let out_w = src_w.div_ceil(oh as usize) as f32;
                    let out_h = src_h.div_ceil(ov as usize) as f32;
                    let (u0, v0) = (rect.x as f32, rect.y as f32);
                    match config.coord_type {
                        CoordType::Pixel => {
                            glyph.u0 = u0;
                            glyph.v0 = v0;
                            glyph.u1 = u0 + out_w;
                            glyph.v1 = v0 + out_h;
                        }
                        CoordType::Uv => {
                            glyph.u0 = u0 / pack.width as f32;
                            glyph.v0 = v0 / pack.height as f32;
                            glyph.u1 = (u0 + out_w) / pack.width as f32;
                            glyph.v1 = (v0 + out_h) / pack.height as f32;
                        }
                    }
                }

                glyphs.push(glyph);
            }
        }

        baked.push(BakedFont {
            height: config.size,
            ascent: metrics.ascent,
            descent: metrics.descent,
            glyph_offset,
            glyph_count: glyphs.len() - glyph_offset,
            ranges: config.ranges.clone(),
        });
    }

    Ok((glyphs, baked))
}

/// Rasterizes one glyph at oversampled resolution and box-filters it down
/// into the atlas at `(dst_x, dst_y)`.
#[allow(clippy::too_many_arguments)]
fn rasterize_into(
    glyph: &rusttype::PositionedGlyph<'_>,
    image: &mut [u8],
    atlas_w: usize,
    dst_x: usize,
    dst_y: usize,
    src_w: usize,
    src_h: usize,
    oh: usize,
    ov: usize,
) {
    if oh == 1 && ov == 1 {
        glyph.draw(|x, y, v| {
            let (x, y) = (x as usize, y as usize);
            if x < src_w && y < src_h {
                image[(dst_y + y) * atlas_w + dst_x + x] = (v * 255.0) as u8;
            }
        });
        return;
    }
    let mut coverage = vec![0u8; src_w * src_h];
    glyph.draw(|x, y, v| {
        let (x, y) = (x as usize, y as usize);
        if x < src_w && y < src_h {
            coverage[y * src_w + x] = (v * 255.0) as u8;
        }
    });
    let out_w = src_w.div_ceil(oh);
    let out_h = src_h.div_ceil(ov);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let mut sum = 0u32;
            let mut n = 0u32;
            for sy in oy * ov..((oy + 1) * ov).min(src_h) {
                for sx in ox * oh..((ox + 1) * oh).min(src_w) {
                    sum += coverage[sy * src_w + sx] as u32;
                    n += 1;
                }
            }
            image[(dst_y + oy) * atlas_w + dst_x + ox] = (sum / n.max(1)) as u8;
        }
    }
}

/// Stamps an ASCII-art bitmap into the custom region reserved by
/// [`bake_pack`]. `white` maps to 0xFF, `black` to 0x01, anything else to 0.
pub fn bake_custom_data(
    image: &mut [u8],
    atlas_width: u32,
    region: Recti,
    data: &str,
    white: char,
    black: char,
) {
    let w = region.w as usize;
    for (i, c) in data.chars().enumerate() {
        let x = region.x as usize + i % w;
        let y = region.y as usize + i / w;
        image[y * atlas_width as usize + x] = if c == white {
            0xFF
        } else if c == black {
            0x01
        } else {
            0x00
        };
    }
}

/// Expands an alpha-8 atlas into RGBA8 with white color channels, for
/// backends without single-channel texture support.
pub fn bake_convert(out: &mut [u8], width: u32, height: u32, alpha: &[u8]) {
    let n = (width * height) as usize;
    for i in 0..n {
        let o = i * 4;
        out[o] = 0xFF;
        out[o + 1] = 0xFF;
        out[o + 2] = 0xFF;
        out[o + 3] = alpha[i];
    }
}

// ===============================================================
//
//                          BAKED FONT RUNTIME
//
// ===============================================================

/// Runtime font over a baked glyph table; implements [`UserFont`] so baked
/// fonts plug into styles and the draw list like any user-provided one.
pub struct Font {
    size: f32,
    fallback: FontGlyph,
    fallback_codepoint: char,
    glyphs: Rc<Vec<FontGlyph>>,
    glyph_offset: usize,
    glyph_count: usize,
    ranges: Vec<GlyphRange>,
    atlas: Handle,
}

impl Font {
    pub fn new(
        baked: &BakedFont,
        glyphs: Rc<Vec<FontGlyph>>,
        fallback_codepoint: char,
        atlas: Handle,
    ) -> Self {
        let mut font = Self {
            size: baked.height,
            fallback: FontGlyph::default(),
            fallback_codepoint,
            glyphs,
            glyph_offset: baked.glyph_offset,
            glyph_count: baked.glyph_count,
            ranges: baked.ranges.clone(),
            atlas,
        };
        font.fallback = font
            .lookup(fallback_codepoint)
            .copied()
            .unwrap_or(FontGlyph {
                codepoint: fallback_codepoint,
                xadvance: baked.height * 0.5,
                ..Default::default()
            });
        font
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn lookup(&self, codepoint: char) -> Option<&FontGlyph> {
        // Glyphs are laid out range by range, so the index is the rank of
        // the codepoint across the font's ranges.
        let cp = codepoint as u32;
        let mut index = 0usize;
        for &(lo, hi) in &self.ranges {
            if cp >= lo && cp <= hi {
                let i = index + (cp - lo) as usize;
                if i < self.glyph_count {
                    return Some(&self.glyphs[self.glyph_offset + i]);
                }
                return None;
            }
            index += (hi - lo) as usize + 1;
        }
        None
    }

    /// Glyph for `codepoint`, falling back to the configured fallback glyph
    /// for codepoints outside the baked ranges.
    pub fn find_glyph(&self, codepoint: char) -> &FontGlyph {
        self.lookup(codepoint).unwrap_or(&self.fallback)
    }

    pub fn fallback_codepoint(&self) -> char {
        self.fallback_codepoint
    }

    /// Width of the first `len` bytes of `text` at `height` pixels,
    /// decoding invalid sequences as the replacement character.
    pub fn text_width(&self, height: f32, text: &[u8]) -> f32 {
        let scale = height / self.size;
        let mut width = 0.0;
        let mut offset = 0;
        while offset < text.len() {
            let (c, n) = utf8::decode(&text[offset..]);
            if n == 0 {
                break;
            }
            offset += n;
            width += self.find_glyph(c).xadvance * scale;
        }
        width
    }
}

impl UserFont for Font {
    fn height(&self) -> f32 {
        self.size
    }

    fn width(&self, height: f32, text: &str) -> f32 {
        self.text_width(height, text.as_bytes())
    }

    fn glyph(&self, height: f32, codepoint: char, _next: Option<char>) -> UserFontGlyph {
        let scale = height / self.size;
        let g = self.find_glyph(codepoint);
        UserFontGlyph {
            uv: [Vector2::new(g.u0, g.v0), Vector2::new(g.u1, g.v1)],
            offset: Vector2::new(g.x0 * scale, g.y0 * scale),
            width: (g.x1 - g.x0) * scale,
            height: (g.y1 - g.y0) * scale,
            xadvance: g.xadvance * scale,
        }
    }

    fn texture(&self) -> Handle {
        self.atlas
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Measuring-only font where every codepoint is `advance` wide.
    pub struct FixedWidthFont {
        height: f32,
        advance: f32,
    }

    impl FixedWidthFont {
        pub fn new(height: f32, advance: f32) -> Self {
            Self { height, advance }
        }
    }

    impl UserFont for FixedWidthFont {
        fn height(&self) -> f32 {
            self.height
        }

        fn width(&self, height: f32, text: &str) -> f32 {
            text.chars().count() as f32 * self.advance * (height / self.height)
        }

        fn glyph(&self, height: f32, _codepoint: char, _next: Option<char>) -> UserFontGlyph {
            let scale = height / self.height;
            UserFontGlyph {
                uv: [Vector2::default(), Vector2::new(1.0, 1.0)],
                offset: Vector2::default(),
                width: self.advance * scale,
                height,
                xadvance: self.advance * scale,
            }
        }

        fn texture(&self) -> Handle {
            Handle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelf_pack_places_all_rects_disjointly() {
        let mut rects = [
            PackedRect { w: 40, h: 20, x: 0, y: 0 },
            PackedRect { w: 100, h: 30, x: 0, y: 0 },
            PackedRect { w: 0, h: 0, x: 0, y: 0 },
            PackedRect { w: 90, h: 10, x: 0, y: 0 },
            PackedRect { w: 50, h: 25, x: 0, y: 0 },
        ];
        let (height, _) = shelf_pack(&mut rects, None, 128).unwrap();
        assert!(height <= 128);
        for (i, a) in rects.iter().enumerate() {
            if a.w == 0 {
                continue;
            }
            assert!(a.x as u32 + a.w as u32 <= 128);
            for b in rects.iter().skip(i + 1) {
                if b.w == 0 {
                    continue;
                }
                let disjoint = a.x + a.w <= b.x
                    || b.x + b.w <= a.x
                    || a.y + a.h <= b.y
                    || b.y + b.h <= a.y;
                assert!(disjoint, "rects {a:?} and {b:?} overlap");
            }
        }
    }

    #[test]
    fn shelf_pack_is_deterministic() {
        let mk = || {
            [
                PackedRect { w: 33, h: 12, x: 0, y: 0 },
                PackedRect { w: 7, h: 40, x: 0, y: 0 },
                PackedRect { w: 64, h: 9, x: 0, y: 0 },
            ]
        };
        let mut a = mk();
        let mut b = mk();
        shelf_pack(&mut a, None, 128).unwrap();
        shelf_pack(&mut b, None, 128).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!((x.x, x.y), (y.x, y.y));
        }
    }

    #[test]
    fn shelf_pack_rejects_oversized_input() {
        let mut rects = [PackedRect { w: 200, h: 10, x: 0, y: 0 }];
        assert!(shelf_pack(&mut rects, None, 128).is_none());
    }

    #[test]
    fn custom_data_stamping() {
        let mut image = vec![0u8; 8 * 8];
        let region = Recti::new(2, 1, 3, 2);
        bake_custom_data(&mut image, 8, region, "X.XX.X", 'X', '.');
        assert_eq!(image[1 * 8 + 2], 0xFF);
        assert_eq!(image[1 * 8 + 3], 0x01);
        assert_eq!(image[1 * 8 + 4], 0xFF);
        assert_eq!(image[2 * 8 + 2], 0xFF);
        assert_eq!(image[2 * 8 + 3], 0x01);
        assert_eq!(image[2 * 8 + 4], 0xFF);
        assert_eq!(image[0], 0x00);
    }

    #[test]
    fn alpha_to_rgba_conversion() {
        let alpha = [0u8, 128, 255, 7];
        let mut rgba = [0u8; 16];
        bake_convert(&mut rgba, 2, 2, &alpha);
        assert_eq!(&rgba[0..4], &[255, 255, 255, 0]);
        assert_eq!(&rgba[4..8], &[255, 255, 255, 128]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        assert_eq!(&rgba[12..16], &[255, 255, 255, 7]);
    }

    #[test]
    fn find_glyph_falls_back_outside_ranges() {
        let glyphs: Vec<FontGlyph> = (0x20..=0x7F)
            .map(|cp| FontGlyph {
                codepoint: char::from_u32(cp).unwrap(),
                xadvance: cp as f32,
                ..Default::default()
            })
            .collect();
        let baked = BakedFont {
            height: 16.0,
            ascent: 12.0,
            descent: -4.0,
            glyph_offset: 0,
            glyph_count: glyphs.len(),
            ranges: vec![(0x20, 0x7F)],
        };
        let font = Font::new(&baked, Rc::new(glyphs), '?', Handle::default());
        assert_eq!(font.find_glyph('A').codepoint, 'A');
        assert_eq!(font.find_glyph('A').xadvance, 'A' as u32 as f32);
        // Outside any range resolves to the fallback glyph.
        assert_eq!(font.find_glyph('€').codepoint, '?');
    }

    #[test]
    fn text_width_scales_with_height() {
        let glyphs: Vec<FontGlyph> = (0x20..=0x7F)
            .map(|cp| FontGlyph {
                codepoint: char::from_u32(cp).unwrap(),
                xadvance: 10.0,
                ..Default::default()
            })
            .collect();
        let baked = BakedFont {
            height: 20.0,
            ascent: 15.0,
            descent: -5.0,
            glyph_offset: 0,
            glyph_count: glyphs.len(),
            ranges: vec![(0x20, 0x7F)],
        };
        let font = Font::new(&baked, Rc::new(glyphs), '?', Handle::default());
        assert_eq!(font.text_width(20.0, b"abcd"), 40.0);
        assert_eq!(font.text_width(10.0, b"abcd"), 20.0);
    }

    #[test]
    fn bake_memory_counts_all_ranges() {
        let mut config = FontConfig::new(Vec::new(), 13.0);
        config.ranges = vec![(0x20, 0x2F), (0x40, 0x41)];
        let (temp, count) = bake_memory(core::slice::from_ref(&config));
        assert_eq!(count, 18);
        assert!(temp >= 18 * core::mem::size_of::<PackedRect>());
    }
}
