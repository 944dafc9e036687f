//! Append-only drawing command log.
//!
//! Every widget draws by appending tagged records here; a render backend
//! replays them in storage order once per frame. Records are linked by
//! index so a popup region recorded mid-frame can be spliced to the end of
//! its window's stream without copying payloads (see `layout::panel_end`).

use crate::color::Color;
use crate::font::UserFontRef;
use crate::math::{Rect, Vector2};

/// Backend resource handle, either a bare id or a pointer-sized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Id(i32),
    Ptr(usize),
}

impl Default for Handle {
    fn default() -> Self {
        Handle::Id(0)
    }
}

/// Reference to a backend texture, optionally restricted to a sub-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Image {
    pub handle: Handle,
    pub w: u16,
    pub h: u16,
    pub region: [u16; 4],
}

impl Image {
    pub fn id(id: i32) -> Self {
        Self {
            handle: Handle::Id(id),
            ..Default::default()
        }
    }

    pub fn ptr(ptr: usize) -> Self {
        Self {
            handle: Handle::Ptr(ptr),
            ..Default::default()
        }
    }

    pub fn sub_id(id: i32, w: u16, h: u16, region: [u16; 4]) -> Self {
        Self {
            handle: Handle::Id(id),
            w,
            h,
            region,
        }
    }

    pub fn is_subimage(&self) -> bool {
        self.w != 0 || self.h != 0
    }
}

/// One recorded drawing primitive.
#[derive(Clone)]
pub enum CommandKind {
    Scissor {
        rect: Rect,
    },
    Line {
        begin: Vector2,
        end: Vector2,
        color: Color,
    },
    Curve {
        begin: Vector2,
        ctrl: [Vector2; 2],
        end: Vector2,
        color: Color,
    },
    Rect {
        rect: Rect,
        rounding: f32,
        color: Color,
    },
    Circle {
        rect: Rect,
        color: Color,
    },
    Arc {
        center: Vector2,
        radius: f32,
        angles: [f32; 2],
        color: Color,
    },
    Triangle {
        a: Vector2,
        b: Vector2,
        c: Vector2,
        color: Color,
    },
    Text {
        rect: Rect,
        text: String,
        font: UserFontRef,
        height: f32,
        background: Color,
        foreground: Color,
    },
    Image {
        rect: Rect,
        image: Image,
    },
}

impl core::fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Scissor { rect } => f.debug_struct("Scissor").field("rect", rect).finish(),
            Self::Line { begin, end, .. } => {
                f.debug_struct("Line").field("begin", begin).field("end", end).finish()
            }
            Self::Curve { begin, end, .. } => {
                f.debug_struct("Curve").field("begin", begin).field("end", end).finish()
            }
            Self::Rect { rect, .. } => f.debug_struct("Rect").field("rect", rect).finish(),
            Self::Circle { rect, .. } => f.debug_struct("Circle").field("rect", rect).finish(),
            Self::Arc { center, radius, .. } => f
                .debug_struct("Arc")
                .field("center", center)
                .field("radius", radius)
                .finish(),
            Self::Triangle { a, b, c, .. } => f
                .debug_struct("Triangle")
                .field("a", a)
                .field("b", b)
                .field("c", c)
                .finish(),
            Self::Text { rect, text, .. } => f
                .debug_struct("Text")
                .field("rect", rect)
                .field("text", text)
                .finish(),
            Self::Image { rect, .. } => f.debug_struct("Image").field("rect", rect).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    /// Index of the successor in replay order. Rewritten when a popup
    /// region is spliced; `None` marks the current tail.
    pub(crate) next: Option<u32>,
}

/// Region markers delimiting a popup's commands inside its parent buffer.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PopupRegion {
    /// Last command recorded before the region, `None` if the region
    /// starts the buffer.
    pub parent: Option<u32>,
    pub first: u32,
    pub last: u32,
}

/// Per-window append-only command stream.
pub struct CommandBuffer {
    commands: Vec<Command>,
    begin: Option<u32>,
    last: Option<u32>,
    /// Active clip rectangle; primitives fully outside are dropped at
    /// record time when clipping is enabled.
    pub clip: Rect,
    pub use_clipping: bool,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CommandBuffer {
    pub fn new(use_clipping: bool) -> Self {
        Self {
            commands: Vec::new(),
            begin: None,
            last: None,
            clip: Rect::null(),
            use_clipping,
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.begin = None;
        self.last = None;
        self.clip = Rect::null();
    }

    pub fn is_empty(&self) -> bool {
        self.begin.is_none()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    fn push(&mut self, kind: CommandKind) -> u32 {
        let index = self.commands.len() as u32;
        self.commands.push(Command { kind, next: None });
        match self.last {
            Some(last) => self.commands[last as usize].next = Some(index),
            None => self.begin = Some(index),
        }
        self.last = Some(index);
        index
    }

    fn clipped_out(&self, bounds: &Rect) -> bool {
        self.use_clipping && !self.clip.intersects(bounds)
    }

    /// Sets the active clip rectangle and records it. Back-to-back clip
    /// changes overwrite the pending scissor record in place instead of
    /// appending a redundant one, which is why `last` always tracks the
    /// most recent record.
    pub fn scissor(&mut self, rect: Rect) {
        self.clip = rect;
        if let Some(last) = self.last {
            if let CommandKind::Scissor { rect: pending } = &mut self.commands[last as usize].kind {
                *pending = rect;
                return;
            }
        }
        self.push(CommandKind::Scissor { rect });
    }

    pub fn line(&mut self, begin: Vector2, end: Vector2, color: Color) {
        if color.is_transparent() {
            return;
        }
        let bounds = Rect::new(
            begin.x.min(end.x),
            begin.y.min(end.y),
            (end.x - begin.x).abs(),
            (end.y - begin.y).abs(),
        );
        if self.clipped_out(&bounds) {
            return;
        }
        self.push(CommandKind::Line { begin, end, color });
    }

    pub fn curve(&mut self, begin: Vector2, ctrl: [Vector2; 2], end: Vector2, color: Color) {
        if color.is_transparent() {
            return;
        }
        self.push(CommandKind::Curve {
            begin,
            ctrl,
            end,
            color,
        });
    }

    pub fn rect(&mut self, rect: Rect, rounding: f32, color: Color) {
        if color.is_transparent() || self.clipped_out(&rect) {
            return;
        }
        self.push(CommandKind::Rect {
            rect,
            rounding,
            color,
        });
    }

    pub fn circle(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() || self.clipped_out(&rect) {
            return;
        }
        self.push(CommandKind::Circle { rect, color });
    }

    pub fn arc(&mut self, center: Vector2, radius: f32, a_min: f32, a_max: f32, color: Color) {
        if color.is_transparent() {
            return;
        }
        let bounds = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        if self.clipped_out(&bounds) {
            return;
        }
        self.push(CommandKind::Arc {
            center,
            radius,
            angles: [a_min, a_max],
            color,
        });
    }

    pub fn triangle(&mut self, a: Vector2, b: Vector2, c: Vector2, color: Color) {
        if color.is_transparent() {
            return;
        }
        let min_x = a.x.min(b.x).min(c.x);
        let min_y = a.y.min(b.y).min(c.y);
        let bounds = Rect::new(
            min_x,
            min_y,
            a.x.max(b.x).max(c.x) - min_x,
            a.y.max(b.y).max(c.y) - min_y,
        );
        if self.clipped_out(&bounds) {
            return;
        }
        self.push(CommandKind::Triangle { a, b, c, color });
    }

    pub fn image(&mut self, rect: Rect, image: Image) {
        if self.clipped_out(&rect) {
            return;
        }
        self.push(CommandKind::Image { rect, image });
    }

    pub fn text(
        &mut self,
        rect: Rect,
        text: &str,
        font: UserFontRef,
        height: f32,
        background: Color,
        foreground: Color,
    ) {
        if text.is_empty() || self.clipped_out(&rect) {
            return;
        }
        self.push(CommandKind::Text {
            rect,
            text: text.to_string(),
            font,
            height,
            background,
            foreground,
        });
    }

    /// Index of the most recently appended record; used by the popup
    /// machinery to delimit a region before recording into it.
    pub(crate) fn tail(&self) -> Option<u32> {
        self.last
    }

    pub(crate) fn successor(&self, index: Option<u32>) -> Option<u32> {
        match index {
            Some(i) => self.commands[i as usize].next,
            None => self.begin,
        }
    }

    /// Moves the region `[first..=last]` to the end of the replay chain by
    /// rewriting links; payloads stay where they are. This retroactively
    /// resolves popup draw order: a popup recorded mid-content replays
    /// after everything queued for the owning window.
    pub(crate) fn splice_to_end(&mut self, region: PopupRegion) {
        if self.last == Some(region.last) {
            return; // already the tail
        }
        let after = self.commands[region.last as usize].next;
        match region.parent {
            Some(parent) => self.commands[parent as usize].next = after,
            None => self.begin = after,
        }
        let tail = self.last.expect("non-empty buffer with a recorded region");
        self.commands[tail as usize].next = Some(region.first);
        self.commands[region.last as usize].next = None;
        self.last = Some(region.last);
    }

    /// Lazy forward walk over the replay chain. Restartable; backward or
    /// random access is unsupported by design.
    pub fn iter(&self) -> CommandIter<'_> {
        CommandIter {
            buffer: self,
            next: self.begin,
        }
    }
}

pub struct CommandIter<'a> {
    buffer: &'a CommandBuffer,
    next: Option<u32>,
}

impl<'a> Iterator for CommandIter<'a> {
    type Item = &'a Command;

    fn next(&mut self) -> Option<&'a Command> {
        let index = self.next?;
        let command = &self.buffer.commands[index as usize];
        self.next = command.next;
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    #[test]
    fn records_replay_in_storage_order() {
        let mut buf = CommandBuffer::new(false);
        buf.rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, red());
        buf.line(Vector2::new(0.0, 0.0), Vector2::new(5.0, 5.0), red());
        buf.circle(Rect::new(1.0, 1.0, 4.0, 4.0), red());
        let kinds: Vec<_> = buf.iter().map(|c| core::mem::discriminant(&c.kind)).collect();
        assert_eq!(kinds.len(), 3);
        assert!(matches!(buf.iter().next().unwrap().kind, CommandKind::Rect { .. }));
        assert!(matches!(buf.iter().last().unwrap().kind, CommandKind::Circle { .. }));
    }

    #[test]
    fn fully_clipped_primitives_are_dropped() {
        let mut buf = CommandBuffer::new(true);
        buf.scissor(Rect::new(0.0, 0.0, 100.0, 100.0));
        buf.rect(Rect::new(200.0, 200.0, 10.0, 10.0), 0.0, red());
        buf.rect(Rect::new(50.0, 50.0, 10.0, 10.0), 0.0, red());
        // scissor + the one visible rect
        assert_eq!(buf.iter().count(), 2);
    }

    #[test]
    fn transparent_primitives_are_dropped() {
        let mut buf = CommandBuffer::new(false);
        buf.rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::rgba(1, 2, 3, 0));
        assert!(buf.is_empty());
    }

    #[test]
    fn scissor_changes_coalesce_in_place() {
        let mut buf = CommandBuffer::new(true);
        buf.scissor(Rect::new(0.0, 0.0, 50.0, 50.0));
        buf.scissor(Rect::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(buf.iter().count(), 1);
        match buf.iter().next().unwrap().kind {
            CommandKind::Scissor { rect } => assert_eq!(rect, Rect::new(10.0, 10.0, 50.0, 50.0)),
            _ => panic!("expected scissor"),
        }
        // A primitive in between keeps both scissors.
        buf.rect(Rect::new(11.0, 11.0, 5.0, 5.0), 0.0, red());
        buf.scissor(Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(buf.iter().count(), 3);
    }

    #[test]
    fn splice_moves_region_to_tail() {
        let mut buf = CommandBuffer::new(false);
        buf.line(Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0), red()); // pre
        let parent = buf.tail();
        buf.line(Vector2::new(2.0, 0.0), Vector2::new(2.0, 1.0), red()); // popup
        buf.line(Vector2::new(3.0, 0.0), Vector2::new(3.0, 1.0), red()); // popup
        let first = buf.successor(parent).unwrap();
        let last = buf.tail().unwrap();
        buf.line(Vector2::new(4.0, 0.0), Vector2::new(4.0, 1.0), red()); // post

        buf.splice_to_end(PopupRegion { parent, first, last });

        let xs: Vec<f32> = buf
            .iter()
            .map(|c| match c.kind {
                CommandKind::Line { begin, .. } => begin.x,
                _ => panic!("expected line"),
            })
            .collect();
        assert_eq!(xs, vec![1.0, 4.0, 2.0, 3.0]);
    }

    #[test]
    fn splice_of_leading_region() {
        let mut buf = CommandBuffer::new(false);
        let parent = buf.tail();
        buf.line(Vector2::new(1.0, 0.0), Vector2::new(0.0, 0.0), red());
        let first = buf.successor(parent).unwrap();
        let last = buf.tail().unwrap();
        buf.line(Vector2::new(2.0, 0.0), Vector2::new(0.0, 0.0), red());
        buf.splice_to_end(PopupRegion { parent, first, last });
        let xs: Vec<f32> = buf
            .iter()
            .map(|c| match c.kind {
                CommandKind::Line { begin, .. } => begin.x,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(xs, vec![2.0, 1.0]);
    }
}
