/// An RGBA color with byte components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb_f(r: f32, g: f32, b: f32) -> Self {
        Self::rgba_f(r, g, b, 1.0)
    }

    pub fn rgba_f(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::rgba(
            (r.clamp(0.0, 1.0) * 255.0) as u8,
            (g.clamp(0.0, 1.0) * 255.0) as u8,
            (b.clamp(0.0, 1.0) * 255.0) as u8,
            (a.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }

    pub fn hsv(h: u8, s: u8, v: u8) -> Self {
        Self::hsva(h, s, v, 255)
    }

    pub fn hsva(h: u8, s: u8, v: u8, a: u8) -> Self {
        Self::hsva_f(
            h as f32 / 255.0,
            s as f32 / 255.0,
            v as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn hsva_f(h: f32, s: f32, v: f32, a: f32) -> Self {
        if s <= 0.0 {
            return Self::rgba_f(v, v, v, a);
        }
        let h = if h >= 1.0 { 0.0 } else { h } * 6.0;
        let i = h.floor();
        let f = h - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match i as i32 {
            0 => Self::rgba_f(v, t, p, a),
            1 => Self::rgba_f(q, v, p, a),
            2 => Self::rgba_f(p, v, t, a),
            3 => Self::rgba_f(p, q, v, a),
            4 => Self::rgba_f(t, p, v, a),
            _ => Self::rgba_f(v, p, q, a),
        }
    }

    /// Packs the color as 0xAABBGGRR, the layout vertex buffers use.
    pub const fn packed(&self) -> u32 {
        (self.r as u32) | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
    }

    pub const fn from_u32(value: u32) -> Self {
        Self::rgba(
            (value & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            ((value >> 16) & 0xFF) as u8,
            ((value >> 24) & 0xFF) as u8,
        )
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Self::rgb(value.0, value.1, value.2)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8, u8)) -> Self {
        Self::rgba(value.0, value.1, value.2, value.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_round_trips() {
        let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(Color::from_u32(c.packed()), c);
    }

    #[test]
    fn hsv_grey_ignores_hue() {
        assert_eq!(Color::hsva_f(0.3, 0.0, 0.5, 1.0), Color::hsva_f(0.9, 0.0, 0.5, 1.0));
    }

    #[test]
    fn hsv_primary() {
        let red = Color::hsva_f(0.0, 1.0, 1.0, 1.0);
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));
    }
}
