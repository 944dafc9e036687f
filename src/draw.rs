//! Command-to-vertex conversion for GPU backends.
//!
//! Replaying a [`CommandBuffer`](crate::command::CommandBuffer) through a
//! [`DrawList`] flattens every primitive into textured triangles: vertex and
//! index arrays plus a batch list, where each batch spans a run of elements
//! sharing one clip rectangle and one texture. Solid shapes sample the
//! atlas's white pixel so text and geometry stay in a single pipeline.

use bytemuck::{Pod, Zeroable};

use crate::color::Color;
use crate::command::{Command, CommandKind, Handle, Image};
use crate::font::UserFontRef;
use crate::math::{Rect, Vector2};
use crate::utf8;

/// One interleaved vertex as uploaded to the GPU.
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct DrawVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Packed 0xAABBGGRR, matching [`Color::packed`].
    pub color: u32,
}

/// A run of indices to draw with one clip rectangle and texture binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch {
    pub elem_count: u32,
    pub clip_rect: Rect,
    pub texture: Handle,
}

/// Atlas texture and the uv of a solid white pixel inside it, as produced
/// by the font baker's custom data region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTexture {
    pub texture: Handle,
    pub uv: Vector2,
}

const CIRCLE_VTX_COUNT: usize = 12;
/// Feather width of the anti-aliasing fringe, in pixels.
const AA_SIZE: f32 = 1.0;

pub struct DrawList {
    pub antialiasing: bool,
    /// Segment count used when flattening full circles.
    pub circle_segment_count: u32,
    /// Thickness applied to stroked primitives.
    pub line_thickness: f32,
    null: NullTexture,
    clip_rect: Rect,
    circle_vtx: [Vector2; CIRCLE_VTX_COUNT],
    path: Vec<Vector2>,
    vertices: Vec<DrawVertex>,
    indices: Vec<u16>,
    batches: Vec<DrawBatch>,
}

impl DrawList {
    pub fn new(null: NullTexture, antialiasing: bool) -> Self {
        let mut circle_vtx = [Vector2::default(); CIRCLE_VTX_COUNT];
        for (i, v) in circle_vtx.iter_mut().enumerate() {
            let a = i as f32 / CIRCLE_VTX_COUNT as f32 * core::f32::consts::TAU;
            *v = Vector2::new(a.cos(), a.sin());
        }
        Self {
            antialiasing,
            circle_segment_count: 22,
            line_thickness: 1.0,
            null,
            clip_rect: Rect::null(),
            circle_vtx,
            path: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// Drops all accumulated geometry; batch memory is retained.
    pub fn clear(&mut self) {
        self.path.clear();
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.clip_rect = Rect::null();
    }

    pub fn vertices(&self) -> &[DrawVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Replays a full command stream into the list.
    pub fn convert<'a>(&mut self, commands: impl Iterator<Item = &'a Command>) {
        for command in commands {
            self.convert_command(command);
        }
    }

    pub fn convert_command(&mut self, command: &Command) {
        match &command.kind {
            CommandKind::Scissor { rect } => self.add_clip(*rect),
            CommandKind::Line { begin, end, color } => {
                self.stroke_line(*begin, *end, *color, self.line_thickness)
            }
            CommandKind::Curve {
                begin,
                ctrl,
                end,
                color,
            } => self.stroke_curve(*begin, *ctrl, *end, *color, self.line_thickness),
            CommandKind::Rect {
                rect,
                rounding,
                color,
            } => self.fill_rect(*rect, *rounding, *color),
            CommandKind::Circle { rect, color } => self.fill_circle(*rect, *color),
            CommandKind::Arc {
                center,
                radius,
                angles,
                color,
            } => self.fill_arc(*center, *radius, angles[0], angles[1], *color),
            CommandKind::Triangle { a, b, c, color } => self.fill_triangle(*a, *b, *c, *color),
            CommandKind::Text {
                rect,
                text,
                font,
                height,
                foreground,
                ..
            } => self.add_text(font.clone(), *rect, text, *height, *foreground),
            CommandKind::Image { rect, image } => self.add_image(*rect, *image),
        }
    }

    // --- batching ---

    fn current_batch(&mut self, texture: Handle) -> &mut DrawBatch {
        let needs_new = match self.batches.last() {
            Some(batch) => batch.texture != texture || batch.clip_rect != self.clip_rect,
            None => true,
        };
        if needs_new {
            self.batches.push(DrawBatch {
                elem_count: 0,
                clip_rect: self.clip_rect,
                texture,
            });
        }
        self.batches.last_mut().expect("batch pushed above")
    }

    pub fn add_clip(&mut self, rect: Rect) {
        self.clip_rect = rect;
    }

    fn push_indices(&mut self, texture: Handle, base: u16, local: &[u16]) {
        for &i in local {
            self.indices.push(base + i);
        }
        self.current_batch(texture).elem_count += local.len() as u32;
    }

    fn vertex(&mut self, pos: Vector2, uv: Vector2, color: u32) {
        self.vertices.push(DrawVertex {
            position: [pos.x, pos.y],
            uv: [uv.x, uv.y],
            color,
        });
    }

    /// Indices are u16; a conversion past 65535 vertices would silently
    /// wrap the base and stitch triangles to the wrong corners.
    fn base_index(&self) -> u16 {
        debug_assert!(
            self.vertices.len() <= u16::MAX as usize,
            "vertex count exceeds the u16 index range"
        );
        self.vertices.len() as u16
    }

    // --- path building ---

    pub fn path_clear(&mut self) {
        self.path.clear();
    }

    pub fn path_line_to(&mut self, pos: Vector2) {
        self.path.push(pos);
    }

    /// Appends a circular arc using the precomputed 12-point unit circle.
    /// `a_min`/`a_max` index into that table, not radians.
    pub fn path_arc_to_fast(&mut self, center: Vector2, radius: f32, a_min: i32, a_max: i32) {
        if a_min > a_max {
            return;
        }
        for i in a_min..=a_max {
            let v = self.circle_vtx[(i.rem_euclid(CIRCLE_VTX_COUNT as i32)) as usize];
            self.path
                .push(Vector2::new(center.x + v.x * radius, center.y + v.y * radius));
        }
    }

    pub fn path_arc_to(&mut self, center: Vector2, radius: f32, a_min: f32, a_max: f32, segments: u32) {
        if segments == 0 {
            self.path.push(center);
            return;
        }
        for i in 0..=segments {
            let a = a_min + (i as f32 / segments as f32) * (a_max - a_min);
            self.path
                .push(Vector2::new(center.x + a.cos() * radius, center.y + a.sin() * radius));
        }
    }

    pub fn path_rect_to(&mut self, min: Vector2, max: Vector2, rounding: f32) {
        let r = rounding
            .min((max.x - min.x).abs() * 0.5)
            .min((max.y - min.y).abs() * 0.5);
        if r <= 0.0 {
            self.path_line_to(min);
            self.path_line_to(Vector2::new(max.x, min.y));
            self.path_line_to(max);
            self.path_line_to(Vector2::new(min.x, max.y));
        } else {
            // Corner arcs walk quarter turns of the 12-point circle.
            self.path_arc_to_fast(Vector2::new(min.x + r, min.y + r), r, 6, 9);
            self.path_arc_to_fast(Vector2::new(max.x - r, min.y + r), r, 9, 12);
            self.path_arc_to_fast(Vector2::new(max.x - r, max.y - r), r, 0, 3);
            self.path_arc_to_fast(Vector2::new(min.x + r, max.y - r), r, 3, 6);
        }
    }

    pub fn path_fill(&mut self, color: Color) {
        let points = core::mem::take(&mut self.path);
        self.fill_poly_convex(&points, color);
        self.path = points;
        self.path.clear();
    }

    pub fn path_stroke(&mut self, color: Color, closed: bool, thickness: f32) {
        let points = core::mem::take(&mut self.path);
        self.stroke_poly_line(&points, color, closed, thickness);
        self.path = points;
        self.path.clear();
    }

    // --- polygon emission ---

    /// Fills a convex polygon. With anti-aliasing on, the fill is inset by
    /// half the feather width and ringed with a 1px fringe fading to
    /// transparent, so edges blend instead of stair-stepping.
    fn fill_poly_convex(&mut self, points: &[Vector2], color: Color) {
        if points.len() < 3 || color.is_transparent() {
            return;
        }
        let texture = self.null.texture;
        let uv = self.null.uv;
        let col = color.packed();
        let base = self.base_index();
        let n = points.len();

        if !self.antialiasing {
            let mut local = Vec::with_capacity((n - 2) * 3);
            for i in 2..n {
                local.extend_from_slice(&[0, (i - 1) as u16, i as u16]);
            }
            for &p in points {
                self.vertex(p, uv, col);
            }
            self.push_indices(texture, base, &local);
            return;
        }

        let col_trans = Color { a: 0, ..color }.packed();
        // Vertex layout: 2*i = inner (opaque), 2*i+1 = outer (transparent).
        let mut local = Vec::with_capacity((n - 2) * 3 + n * 6);
        for i in 2..n {
            local.extend_from_slice(&[0, ((i - 1) * 2) as u16, (i * 2) as u16]);
        }
        for i0 in 0..n {
            let i1 = (i0 + 1) % n;
            local.extend_from_slice(&[
                (i0 * 2) as u16,
                (i0 * 2 + 1) as u16,
                (i1 * 2 + 1) as u16,
                (i0 * 2) as u16,
                (i1 * 2 + 1) as u16,
                (i1 * 2) as u16,
            ]);
        }

        // Averaged edge normals give each point an outward direction.
        let mut normals = vec![Vector2::default(); n];
        for i0 in 0..n {
            let i1 = (i0 + 1) % n;
            let d = points[i1] - points[i0];
            let len = d.len();
            let inv = if len > 0.0 { 1.0 / len } else { 0.0 };
            let normal = Vector2::new(d.y * inv, -d.x * inv);
            normals[i0] = Vector2::new(normals[i0].x + normal.x, normals[i0].y + normal.y);
            normals[i1] = Vector2::new(normals[i1].x + normal.x, normals[i1].y + normal.y);
        }
        for i in 0..n {
            let m = normals[i];
            let len2 = m.x * m.x + m.y * m.y;
            let scale = if len2 > 1e-6 { (1.0 / len2).min(100.0) } else { 0.0 };
            let m = Vector2::new(m.x * scale, m.y * scale).scale(AA_SIZE * 0.5);
            self.vertex(points[i] - m, uv, col);
            self.vertex(points[i] + m, uv, col_trans);
        }
        self.push_indices(texture, base, &local);
    }

    /// Strokes a polyline with axis-free quads, one per segment. With
    /// anti-aliasing on each quad gets a fringe strip on both sides fading
    /// to transparent, the same technique as [`DrawList::fill_poly_convex`].
    fn stroke_poly_line(&mut self, points: &[Vector2], color: Color, closed: bool, thickness: f32) {
        if points.len() < 2 || color.is_transparent() {
            return;
        }
        let texture = self.null.texture;
        let uv = self.null.uv;
        let col = color.packed();
        let col_trans = Color { a: 0, ..color }.packed();
        let count = if closed { points.len() } else { points.len() - 1 };

        for i0 in 0..count {
            let i1 = (i0 + 1) % points.len();
            let (p0, p1) = (points[i0], points[i1]);
            let d = p1 - p0;
            let len = d.len();
            if len <= 0.0 {
                continue;
            }
            let half = thickness * 0.5 / len;
            let normal = Vector2::new(d.y * half, -d.x * half);
            let base = self.base_index();
            self.vertex(p0 + normal, uv, col);
            self.vertex(p1 + normal, uv, col);
            self.vertex(p1 - normal, uv, col);
            self.vertex(p0 - normal, uv, col);
            self.push_indices(texture, base, &[0, 1, 2, 0, 2, 3]);
            if self.antialiasing {
                let feather = Vector2::new(d.y / len, -d.x / len).scale(AA_SIZE);
                self.vertex(p0 + normal + feather, uv, col_trans);
                self.vertex(p1 + normal + feather, uv, col_trans);
                self.vertex(p1 - normal - feather, uv, col_trans);
                self.vertex(p0 - normal - feather, uv, col_trans);
                self.push_indices(texture, base, &[4, 5, 1, 4, 1, 0, 3, 2, 6, 3, 6, 7]);
            }
        }
    }

    // --- primitives ---

    pub fn stroke_line(&mut self, a: Vector2, b: Vector2, color: Color, thickness: f32) {
        self.path_clear();
        self.path_line_to(a);
        self.path_line_to(b);
        self.path_stroke(color, false, thickness);
    }

    pub fn stroke_curve(
        &mut self,
        begin: Vector2,
        ctrl: [Vector2; 2],
        end: Vector2,
        color: Color,
        thickness: f32,
    ) {
        const SEGMENTS: u32 = 24;
        self.path_clear();
        self.path_line_to(begin);
        for i in 1..=SEGMENTS {
            let t = i as f32 / SEGMENTS as f32;
            let u = 1.0 - t;
            let w1 = u * u * u;
            let w2 = 3.0 * u * u * t;
            let w3 = 3.0 * u * t * t;
            let w4 = t * t * t;
            self.path_line_to(Vector2::new(
                w1 * begin.x + w2 * ctrl[0].x + w3 * ctrl[1].x + w4 * end.x,
                w1 * begin.y + w2 * ctrl[0].y + w3 * ctrl[1].y + w4 * end.y,
            ));
        }
        self.path_stroke(color, false, thickness);
    }

    pub fn fill_rect(&mut self, rect: Rect, rounding: f32, color: Color) {
        self.path_clear();
        self.path_rect_to(
            Vector2::new(rect.x, rect.y),
            Vector2::new(rect.x + rect.w, rect.y + rect.h),
            rounding,
        );
        self.path_fill(color);
    }

    pub fn fill_circle(&mut self, rect: Rect, color: Color) {
        let center = Vector2::new(rect.x + rect.w * 0.5, rect.y + rect.h * 0.5);
        let (rx, ry) = (rect.w * 0.5, rect.h * 0.5);
        let segments = self.circle_segment_count.max(3);
        self.path_clear();
        for i in 0..segments {
            let a = i as f32 / segments as f32 * core::f32::consts::TAU;
            self.path
                .push(Vector2::new(center.x + a.cos() * rx, center.y + a.sin() * ry));
        }
        self.path_fill(color);
    }

    pub fn fill_arc(&mut self, center: Vector2, radius: f32, a_min: f32, a_max: f32, color: Color) {
        let segments = self.circle_segment_count.max(3);
        self.path_clear();
        self.path_line_to(center);
        self.path_arc_to(center, radius, a_min, a_max, segments);
        self.path_fill(color);
    }

    pub fn fill_triangle(&mut self, a: Vector2, b: Vector2, c: Vector2, color: Color) {
        self.path_clear();
        self.path_line_to(a);
        self.path_line_to(b);
        self.path_line_to(c);
        self.path_fill(color);
    }

    pub fn add_image(&mut self, rect: Rect, image: Image) {
        let (uv0, uv1) = if image.is_subimage() {
            let (w, h) = (image.w as f32, image.h as f32);
            let r = image.region;
            (
                Vector2::new(r[0] as f32 / w, r[1] as f32 / h),
                Vector2::new((r[0] + r[2]) as f32 / w, (r[1] + r[3]) as f32 / h),
            )
        } else {
            (Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0))
        };
        self.textured_quad(image.handle, rect, uv0, uv1, Color::rgb(255, 255, 255));
    }

    fn textured_quad(&mut self, texture: Handle, rect: Rect, uv0: Vector2, uv1: Vector2, color: Color) {
        let col = color.packed();
        let base = self.base_index();
        self.vertex(Vector2::new(rect.x, rect.y), uv0, col);
        self.vertex(Vector2::new(rect.x + rect.w, rect.y), Vector2::new(uv1.x, uv0.y), col);
        self.vertex(Vector2::new(rect.x + rect.w, rect.y + rect.h), uv1, col);
        self.vertex(Vector2::new(rect.x, rect.y + rect.h), Vector2::new(uv0.x, uv1.y), col);
        self.push_indices(texture, base, &[0, 1, 2, 0, 2, 3]);
    }

    /// Emits one textured quad per glyph, pen starting at the rect's
    /// top-left corner. The following codepoint is handed to the font for
    /// implementations that kern.
    pub fn add_text(&mut self, font: UserFontRef, rect: Rect, text: &str, height: f32, color: Color) {
        if text.is_empty() || color.is_transparent() {
            return;
        }
        let texture = font.texture();
        let mut pen_x = rect.x;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let c = if (c as u32) < 0x20 { utf8::INVALID } else { c };
            let glyph = font.glyph(height, c, chars.peek().copied());
            if glyph.width > 0.0 && glyph.height > 0.0 {
                let quad = Rect::new(
                    pen_x + glyph.offset.x,
                    rect.y + glyph.offset.y,
                    glyph.width,
                    glyph.height,
                );
                self.textured_quad(texture, quad, glyph.uv[0], glyph.uv[1], color);
            }
            pen_x += glyph.xadvance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::FixedWidthFont;
    use std::rc::Rc;

    fn list() -> DrawList {
        DrawList::new(NullTexture::default(), false)
    }

    #[test]
    fn plain_rect_is_a_two_triangle_fan() {
        let mut dl = list();
        dl.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgb(1, 2, 3));
        assert_eq!(dl.vertices().len(), 4);
        assert_eq!(dl.indices().len(), 6);
        assert_eq!(dl.batches().len(), 1);
        assert_eq!(dl.batches()[0].elem_count, 6);
    }

    #[test]
    fn antialiased_fill_adds_fringe_ring() {
        let mut dl = DrawList::new(NullTexture::default(), true);
        dl.fill_triangle(
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(5.0, 10.0),
            Color::rgb(255, 0, 0),
        );
        // 3 points: 6 vertices (inner+outer), fan (1 tri) + ring (6 tris).
        assert_eq!(dl.vertices().len(), 6);
        assert_eq!(dl.indices().len(), 3 + 18);
        // Outer ring vertices carry zero alpha.
        let outer = dl.vertices()[1].color;
        assert_eq!(outer >> 24, 0);
        let inner = dl.vertices()[0].color;
        assert_eq!(inner >> 24, 0xFF);
    }

    #[test]
    fn antialiased_stroke_adds_fringe_strips() {
        let mut dl = DrawList::new(NullTexture::default(), true);
        dl.stroke_line(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), Color::rgb(255, 0, 0), 2.0);
        // One segment: 4 core vertices plus 4 fringe, 6 + 12 indices.
        assert_eq!(dl.vertices().len(), 8);
        assert_eq!(dl.indices().len(), 18);
        assert_eq!(dl.vertices()[0].color >> 24, 0xFF);
        assert_eq!(dl.vertices()[4].color >> 24, 0);
        // Fringe sits one feather width beyond the core edge.
        assert_eq!(dl.vertices()[0].position[1], -1.0);
        assert_eq!(dl.vertices()[4].position[1], -2.0);
    }

    #[test]
    fn batches_split_on_clip_change() {
        let mut dl = list();
        dl.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgb(1, 2, 3));
        dl.add_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
        dl.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), 0.0, Color::rgb(1, 2, 3));
        assert_eq!(dl.batches().len(), 2);
        assert_eq!(dl.batches()[1].clip_rect, Rect::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn batches_split_on_texture_change() {
        let mut dl = list();
        dl.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgb(1, 2, 3));
        dl.add_image(Rect::new(0.0, 0.0, 4.0, 4.0), Image::id(7));
        dl.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgb(1, 2, 3));
        let textures: Vec<Handle> = dl.batches().iter().map(|b| b.texture).collect();
        assert_eq!(textures, vec![Handle::Id(0), Handle::Id(7), Handle::Id(0)]);
    }

    #[test]
    fn same_state_primitives_share_a_batch() {
        let mut dl = list();
        dl.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgb(1, 2, 3));
        dl.stroke_line(Vector2::new(0.0, 0.0), Vector2::new(4.0, 4.0), Color::rgb(9, 9, 9), 1.0);
        assert_eq!(dl.batches().len(), 1);
        assert_eq!(dl.batches()[0].elem_count, 12);
    }

    #[test]
    fn text_emits_one_quad_per_glyph() {
        let mut dl = list();
        let font = Rc::new(FixedWidthFont::new(10.0, 6.0));
        dl.add_text(font, Rect::new(0.0, 0.0, 100.0, 10.0), "abc", 10.0, Color::rgb(255, 255, 255));
        assert_eq!(dl.vertices().len(), 12);
        assert_eq!(dl.indices().len(), 18);
        // Pen advances by one glyph width per character.
        assert_eq!(dl.vertices()[4].position[0], 6.0);
        assert_eq!(dl.vertices()[8].position[0], 12.0);
    }

    #[test]
    fn rounded_rect_path_has_corner_arcs() {
        let mut dl = list();
        dl.path_clear();
        dl.path_rect_to(Vector2::new(0.0, 0.0), Vector2::new(20.0, 20.0), 4.0);
        assert!(dl.path.len() > 4);
    }
}
