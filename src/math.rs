#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn len(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl core::ops::Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Screen-space rectangle with position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle so large it clips nothing.
    pub const fn null() -> Self {
        Self::new(-8192.0, -8192.0, 16384.0, 16384.0)
    }

    pub fn contains(&self, p: Vector2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Clips `self` against `clip`, returning the overlapping region.
    /// Degenerates to a zero-size rectangle when the two do not overlap.
    pub fn intersect(&self, clip: &Rect) -> Rect {
        let x0 = self.x.max(clip.x);
        let y0 = self.y.max(clip.y);
        let x1 = (self.x + self.w).min(clip.x + clip.w);
        let y1 = (self.y + self.h).min(clip.y + clip.h);
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    pub fn shrink(&self, amount: f32) -> Rect {
        let amount = amount.min(self.w / 2.0).min(self.h / 2.0);
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.w - 2.0 * amount,
            self.h - 2.0 * amount,
        )
    }

    pub fn pad(&self, pad: Vector2) -> Rect {
        self.shrink_xy(pad.x, pad.y)
    }

    fn shrink_xy(&self, px: f32, py: f32) -> Rect {
        let px = px.min(self.w / 2.0);
        let py = py.min(self.h / 2.0);
        Rect::new(self.x + px, self.y + py, self.w - 2.0 * px, self.h - 2.0 * py)
    }

    pub fn pos(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.w, self.h)
    }
}

/// Integer rectangle, used for atlas regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Recti {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl Recti {
    pub const fn new(x: i16, y: i16, w: i16, h: i16) -> Self {
        Self { x, y, w, h }
    }
}

pub(crate) fn clamp(min: f32, value: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Rect::new(50.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(50.0, 50.0, 10.0, 10.0);
        let c = a.intersect(&b);
        assert_eq!(c.w, 0.0);
        assert_eq!(c.h, 0.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vector2::new(0.0, 0.0)));
        assert!(!r.contains(Vector2::new(10.0, 10.0)));
    }
}
