//! Root per-frame state machine: window lifecycle and frame boundaries.
//!
//! A [`Context`] is an explicit instance passed by the caller, never global
//! state. Per frame the caller feeds input, brackets each window between
//! [`Context::begin`] and [`Context::end`], replays [`Context::commands`]
//! and finishes with [`Context::clear`]. Windows persist across frames
//! keyed by a hash of their title; a window the caller stops beginning is
//! reclaimed once its last-touched sequence number falls more than one
//! frame behind.

use std::hash::Hasher;

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHasher};
use tracing::{trace, warn};

use crate::buffer::{Buffer, MemoryStatus};
use crate::command::{Command, CommandBuffer};
use crate::edit::Clipboard;
use crate::font::UserFontRef;
use crate::input::Input;
use crate::layout::Layout;
use crate::math::{Rect, Vector2};
use crate::style::Style;

bitflags! {
    /// Per-window behavior switches, independent of each other.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// Outline around the window body.
        const BORDER = 1 << 0;
        /// Outline around the header as well.
        const BORDER_HEADER = 1 << 1;
        /// Dragging the header moves the window.
        const MOVABLE = 1 << 2;
        /// Dragging the corner affordance resizes the window.
        const SCALABLE = 1 << 3;
        /// Close icon in the header; clicking hides the window.
        const CLOSABLE = 1 << 4;
        /// Minimize icon in the header; clicking collapses to the header.
        const MINIMIZABLE = 1 << 5;
        /// Window height tracks its content instead of its given bounds.
        const DYNAMIC = 1 << 6;
        const NO_SCROLLBAR = 1 << 7;
        /// Title text in the header.
        const TITLE = 1 << 8;
    }
}

/// Popup bookkeeping inside the owning window. One popup can be live per
/// window at a time; combos, menus and tooltips all go through this slot.
#[derive(Debug, Default)]
pub(crate) struct PopupState {
    pub name: u64,
    pub active: bool,
    /// Sequence the popup was last begun in; a gap resets `active`.
    pub seq: u32,
    /// Screen rectangle the popup covered last frame; clicks outside it
    /// close a non-blocking popup.
    pub body: Rect,
    /// Region markers for the end-of-frame command splice.
    pub region: Option<crate::command::PopupRegion>,
}

pub(crate) struct Window {
    pub name: u64,
    pub bounds: Rect,
    pub flags: WindowFlags,
    pub scroll: Vector2,
    pub minimized: bool,
    pub closed: bool,
    /// Last sequence number this window was begun in.
    pub seq: u32,
    pub buffer: CommandBuffer,
    pub popup: PopupState,
    /// Open state of tree nodes, keyed by title hash.
    pub trees: FxHashMap<u64, bool>,
    /// Scroll offsets of groups, keyed by title hash.
    pub groups: FxHashMap<u64, Vector2>,
}

impl Window {
    fn new(name: u64, bounds: Rect, flags: WindowFlags, seq: u32) -> Self {
        Self {
            name,
            bounds,
            flags,
            scroll: Vector2::default(),
            minimized: false,
            closed: false,
            seq,
            buffer: CommandBuffer::new(true),
            popup: PopupState::default(),
            trees: FxHashMap::default(),
            groups: FxHashMap::default(),
        }
    }
}

pub(crate) fn name_hash(title: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(title.as_bytes());
    hasher.finish()
}

/// Frame diagnostics; protocol violations are corrected, then counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// `begin` calls that found a previous window still open.
    pub unmatched_begins: u32,
    /// `end` calls without a window being built.
    pub unmatched_ends: u32,
    /// Style stack entries force-drained at frame clear.
    pub leaked_style_pushes: u32,
}

pub struct Context {
    pub input: Input,
    pub style: Style,
    pub(crate) memory: Buffer,
    pub(crate) clipboard: Option<Box<dyn Clipboard>>,
    pub(crate) seq: u32,
    pub(crate) windows: Vec<Option<Window>>,
    freelist: Vec<usize>,
    /// Window slots in paint order, back to front.
    order: Vec<usize>,
    names: FxHashMap<u64, usize>,
    /// Focused window, receiving interaction priority.
    pub(crate) active: Option<usize>,
    /// Window currently between `begin` and `end`.
    pub(crate) current: Option<usize>,
    /// Layout stack: window panel at the bottom, groups/popups above.
    pub(crate) layouts: Vec<Layout>,
    diagnostics: Diagnostics,
}

const FRAME_ARENA_SIZE: usize = 16 * 1024;

impl Context {
    pub fn new(font: UserFontRef) -> Self {
        Self {
            input: Input::default(),
            style: Style::new(font),
            memory: Buffer::with_default_allocator(FRAME_ARENA_SIZE),
            clipboard: None,
            seq: 0,
            windows: Vec::new(),
            freelist: Vec::new(),
            order: Vec::new(),
            names: FxHashMap::default(),
            active: None,
            current: None,
            layouts: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Starts building a window. Returns whether content should be laid
    /// out; a collapsed or closed window returns `false` but still accepts
    /// the full widget call sequence as inert no-ops, so caller code runs
    /// unconditionally.
    pub fn begin(&mut self, title: &str, bounds: Rect, flags: WindowFlags) -> bool {
        if self.current.is_some() {
            warn!(title, "begin while another window is open, auto-ending it");
            self.diagnostics.unmatched_begins += 1;
            self.end();
        }

        let name = name_hash(title);
        let idx = match self.names.get(&name) {
            Some(&idx) => idx,
            None => {
                let window = Window::new(name, bounds, flags, self.seq);
                let idx = match self.freelist.pop() {
                    Some(idx) => {
                        self.windows[idx] = Some(window);
                        idx
                    }
                    None => {
                        self.windows.push(Some(window));
                        self.windows.len() - 1
                    }
                };
                self.names.insert(name, idx);
                self.order.push(idx);
                idx
            }
        };

        {
            let Some(window) = self.windows[idx].as_mut() else {
                return false;
            };
            if window.seq == self.seq && window.buffer.len() > 0 {
                warn!(title, "window begun twice in one frame");
            }
            window.seq = self.seq;
            window.flags = flags;
            window.buffer.clear();
        }

        // Pressing inside a window focuses it. The press transition only;
        // testing the release as well would let an earlier-begun window
        // re-contest focus on the release frame.
        let win_bounds = self.windows[idx].as_ref().map(|w| w.bounds).unwrap_or_default();
        if self
            .input
            .has_mouse_click_down_in_rect(crate::input::Button::Left, win_bounds, true)
        {
            self.active = Some(idx);
        }
        if self.active.is_none() {
            self.active = Some(idx);
        }

        self.current = Some(idx);
        self.panel_begin(idx, title);

        let window = self.windows[idx].as_ref();
        window.map(|w| !w.minimized && !w.closed).unwrap_or(false)
    }

    /// Finishes the current window: scrollbars, scaler, border, and the
    /// popup region splice all happen here.
    pub fn end(&mut self) {
        let Some(idx) = self.current.take() else {
            warn!("end without a matching begin");
            self.diagnostics.unmatched_ends += 1;
            return;
        };
        self.panel_end(idx);
        self.layouts.clear();
    }

    /// Advances the frame: reclaims abandoned windows, drains leaked style
    /// pushes and resets the frame arena.
    pub fn clear(&mut self) {
        if self.current.is_some() {
            warn!("frame cleared with an open window, auto-ending it");
            self.diagnostics.unmatched_begins += 1;
            self.end();
        }
        // Reclaim against the frame just finished, before advancing: a
        // window begun this frame has a gap of 0 and one that skipped a
        // single frame a gap of 1, which is still within the grace period.
        let seq = self.seq;
        for idx in 0..self.windows.len() {
            let reclaim = match &self.windows[idx] {
                Some(window) => seq.wrapping_sub(window.seq) > 1,
                None => false,
            };
            if reclaim {
                if let Some(window) = self.windows[idx].take() {
                    trace!(name = window.name, "reclaiming abandoned window");
                    self.names.remove(&window.name);
                }
                self.freelist.push(idx);
                self.order.retain(|&o| o != idx);
                if self.active == Some(idx) {
                    self.active = None;
                }
            }
        }

        self.seq = self.seq.wrapping_add(1);

        let leaked = self.style.reset_all();
        if leaked > 0 {
            warn!(leaked, "style stack entries not popped before frame end");
            self.diagnostics.leaked_style_pushes += leaked as u32;
        }

        self.memory.reset();
        trace!(seq = self.seq, "frame cleared");
    }

    /// Replays the command stream of every window begun this frame, in
    /// paint order. A window inside its reclaim grace period still holds
    /// last frame's recording; replaying it would ghost stale primitives
    /// into the current frame.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.order
            .iter()
            .filter_map(|&idx| self.windows[idx].as_ref())
            .filter(|window| window.seq == self.seq)
            .flat_map(|window| window.buffer.iter())
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Allocation statistics of the frame arena.
    pub fn memory_status(&self) -> MemoryStatus {
        self.memory.status()
    }

    /// Number of live window records.
    pub fn window_count(&self) -> usize {
        self.windows.iter().filter(|w| w.is_some()).count()
    }

    /// Whether the window named `title` currently exists.
    pub fn window_is_live(&self, title: &str) -> bool {
        self.names.contains_key(&name_hash(title))
    }

    /// Un-hides a window previously closed through its close icon.
    pub fn window_show(&mut self, title: &str) {
        if let Some(&idx) = self.names.get(&name_hash(title)) {
            if let Some(window) = self.windows[idx].as_mut() {
                window.closed = false;
            }
        }
    }

    pub fn window_bounds(&self, title: &str) -> Option<Rect> {
        let idx = *self.names.get(&name_hash(title))?;
        self.windows[idx].as_ref().map(|w| w.bounds)
    }

    pub(crate) fn window_mut(&mut self, idx: usize) -> Option<&mut Window> {
        self.windows.get_mut(idx).and_then(Option::as_mut)
    }

    pub(crate) fn window_ref(&self, idx: usize) -> Option<&Window> {
        self.windows.get(idx).and_then(Option::as_ref)
    }

    /// Command buffer the current layout records into. Popups and groups
    /// share their owning window's buffer.
    pub(crate) fn buffer_mut(&mut self) -> Option<&mut CommandBuffer> {
        let idx = self.layouts.last()?.buf_win;
        self.window_mut(idx).map(|w| &mut w.buffer)
    }
}
