//! Panel lifecycle and the per-frame layout cursor.
//!
//! A [`Layout`] is transient per (window, frame): created by `begin`,
//! advanced by every widget, destroyed by `end`. Rows hand out widget
//! rectangles left to right, top to bottom; groups and popups push nested
//! layouts onto the same stack so nesting is explicit state, not call-stack
//! recursion.

use tracing::warn;

use crate::color::Color;
use crate::command::PopupRegion;
use crate::context::{name_hash, Context, WindowFlags};
use crate::input::Button;
use crate::math::{Rect, Vector2};
use crate::style::{StyleColor, StyleProperty};

/// Scroll offset change per mouse wheel tick, in pixels.
const SCROLL_STEP: f32 = 25.0;
const MIN_WINDOW_SIZE: f32 = 40.0;
const TREE_INDENT: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    #[default]
    None,
    /// Even split of the panel width.
    DynamicEven,
    /// Window-relative ratios given up front.
    DynamicRatio,
    /// Window-relative ratios pushed one widget at a time.
    DynamicCustom,
    /// Fixed pixel width for every column.
    StaticFixed,
    /// Pixel widths pushed one widget at a time.
    StaticCustom,
    /// Caller-positioned rectangles in a window-relative canvas.
    SpaceDynamic,
    /// Caller-positioned rectangles in pixels.
    SpaceStatic,
}

#[derive(Debug, Default)]
pub(crate) struct RowLayout {
    pub kind: RowKind,
    pub index: u32,
    pub columns: u32,
    /// Row advance, item height plus vertical item spacing.
    pub height: f32,
    pub ratios: Vec<f32>,
    pub item_width: f32,
    pub item_offset: f32,
    /// Ratio consumed so far in a ratio-based row.
    pub filled: f32,
    /// Rectangle set by `layout_space_push`.
    pub item: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayoutKind {
    Window,
    Group { name: u64 },
    Popup { nonblock: bool },
}

/// Transient cursor/geometry state while a panel is being built.
#[derive(Debug)]
pub(crate) struct Layout {
    pub kind: LayoutKind,
    /// Owning window slot.
    pub win: usize,
    /// Window whose command buffer receives the drawing; groups and popups
    /// inherit it from their parent layout.
    pub buf_win: usize,
    pub bounds: Rect,
    pub clip: Rect,
    pub at_x: f32,
    pub at_y: f32,
    pub max_x: f32,
    /// Width available to rows (bounds minus reserved scrollbar).
    pub width: f32,
    pub height: f32,
    pub header_h: f32,
    pub menu_h: f32,
    pub row: RowLayout,
    /// Scroll offset snapshot applied to the cursor.
    pub offset: Vector2,
    /// Read-only mode: widgets draw but never interact.
    pub rom: bool,
    /// Collapsed/closed: layout queries work, drawing is suppressed.
    pub hidden: bool,
    pub dynamic: bool,
    pub tree_depth: u32,
    pub menu_start: f32,
}

impl Layout {
    fn inert(win: usize) -> Self {
        Self {
            kind: LayoutKind::Window,
            win,
            buf_win: win,
            bounds: Rect::default(),
            clip: Rect::default(),
            at_x: 0.0,
            at_y: 0.0,
            max_x: 0.0,
            width: 0.0,
            height: 0.0,
            header_h: 0.0,
            menu_h: 0.0,
            row: RowLayout::default(),
            offset: Vector2::default(),
            rom: true,
            hidden: true,
            dynamic: false,
            tree_depth: 0,
            menu_start: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Dynamic,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeType {
    /// Section header with a background, for top-level grouping.
    Tab,
    /// Plain collapsible node.
    Node,
}

impl Context {
    // ===============================================================
    //
    //                          PANEL
    //
    // ===============================================================

    pub(crate) fn panel_begin(&mut self, idx: usize, title: &str) {
        let padding = self.style.property(StyleProperty::Padding);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let scrollbar_size = self.style.property(StyleProperty::ScrollbarSize).x;
        let font_height = self.style.font_height;
        let font = self.style.font.clone();
        let window_color = self.style.color(StyleColor::Window);
        let header_color = self.style.color(StyleColor::Header);
        let text_color = self.style.color(StyleColor::Text);
        let header = self.style.header;

        let Some(window) = self.window_ref(idx) else {
            self.layouts.push(Layout::inert(idx));
            return;
        };
        let mut bounds = window.bounds;
        let flags = window.flags;
        let mut minimized = window.minimized;
        let mut closed = window.closed;
        let scroll = window.scroll;
        let rom = self.active != Some(idx);

        let has_header = flags
            .intersects(WindowFlags::TITLE | WindowFlags::CLOSABLE | WindowFlags::MINIMIZABLE);
        let header_h = if has_header {
            font_height + 2.0 * item_padding.y + 2.0 * padding.y
        } else {
            0.0
        };

        // Header drag moves the window before anything is drawn at the old
        // position.
        if flags.contains(WindowFlags::MOVABLE) && !rom {
            let grab_h = if has_header { header_h } else { font_height + 2.0 * padding.y };
            let grab = Rect::new(bounds.x, bounds.y, bounds.w, grab_h);
            if self.input.is_mouse_down(Button::Left)
                && self.input.is_mouse_prev_hovering_rect(grab)
            {
                bounds.x += self.input.mouse.delta.x;
                bounds.y += self.input.mouse.delta.y;
            }
        }

        if closed {
            if let Some(window) = self.window_mut(idx) {
                window.bounds = bounds;
            }
            self.layouts.push(Layout::inert(idx));
            return;
        }

        // Header interaction and drawing.
        let mut header_symbols: Vec<(Rect, char)> = Vec::new();
        if has_header {
            let header_rect = Rect::new(bounds.x, bounds.y, bounds.w, header_h);
            let symbol_size = font_height;
            let mut symbol_x = bounds.x + bounds.w - padding.x - symbol_size;
            if flags.contains(WindowFlags::CLOSABLE) {
                let rect = Rect::new(
                    symbol_x,
                    bounds.y + padding.y + item_padding.y,
                    symbol_size,
                    symbol_size,
                );
                if !rom && self.input.mouse_clicked(Button::Left, rect) {
                    closed = true;
                }
                header_symbols.push((rect, header.close_symbol));
                symbol_x -= symbol_size + item_padding.x;
            }
            if flags.contains(WindowFlags::MINIMIZABLE) {
                let rect = Rect::new(
                    symbol_x,
                    bounds.y + padding.y + item_padding.y,
                    symbol_size,
                    symbol_size,
                );
                if !rom && self.input.mouse_clicked(Button::Left, rect) {
                    minimized = !minimized;
                }
                let symbol = if minimized { header.maximize_symbol } else { header.minimize_symbol };
                header_symbols.push((rect, symbol));
            }

            if let Some(window) = self.window_mut(idx) {
                window.buffer.rect(header_rect, 0.0, header_color);
                if flags.contains(WindowFlags::TITLE) {
                    let text_rect = Rect::new(
                        bounds.x + padding.x,
                        bounds.y + padding.y + item_padding.y,
                        bounds.w - 2.0 * padding.x,
                        font_height,
                    );
                    window.buffer.text(
                        text_rect,
                        title,
                        font.clone(),
                        font_height,
                        header_color,
                        text_color,
                    );
                }
                for (rect, symbol) in &header_symbols {
                    let mut tmp = [0u8; 4];
                    window.buffer.text(
                        *rect,
                        symbol.encode_utf8(&mut tmp),
                        font.clone(),
                        font_height,
                        header_color,
                        text_color,
                    );
                }
            }
        }

        let hidden = minimized;
        let dynamic = flags.contains(WindowFlags::DYNAMIC);
        let body = Rect::new(bounds.x, bounds.y + header_h, bounds.w, bounds.h - header_h);
        if !hidden && !dynamic {
            if let Some(window) = self.window_mut(idx) {
                window.buffer.rect(body, 0.0, window_color);
            }
        }

        let reserved = if flags.contains(WindowFlags::NO_SCROLLBAR) { 0.0 } else { scrollbar_size };
        let clip = if hidden { Rect::default() } else { body };
        if let Some(window) = self.window_mut(idx) {
            window.bounds = bounds;
            window.minimized = minimized;
            window.closed = closed;
            window.buffer.scissor(clip);
        }

        self.layouts.push(Layout {
            kind: LayoutKind::Window,
            win: idx,
            buf_win: idx,
            bounds,
            clip,
            at_x: bounds.x + padding.x,
            at_y: body.y + padding.y - scroll.y,
            max_x: 0.0,
            width: bounds.w - reserved,
            height: bounds.h,
            header_h,
            menu_h: 0.0,
            row: RowLayout::default(),
            offset: scroll,
            rom,
            hidden: hidden || closed,
            dynamic,
            tree_depth: 0,
            menu_start: 0.0,
        });
    }

    pub(crate) fn panel_end(&mut self, idx: usize) {
        while self.layouts.len() > 1 {
            warn!("window ended with an open group or popup, auto-closing");
            self.layouts.pop();
        }
        let Some(layout) = self.layouts.pop() else {
            return;
        };

        let padding = self.style.property(StyleProperty::Padding);
        let scrollbar_size = self.style.property(StyleProperty::ScrollbarSize).x;
        let scaler_size = self.style.property(StyleProperty::ScalerSize);
        let border_color = self.style.color(StyleColor::Border);
        let scrollbar_color = self.style.color(StyleColor::Scrollbar);
        let cursor_color = self.style.color(StyleColor::ScrollbarCursor);
        let scaler_color = self.style.color(StyleColor::Scaler);

        let Some(window) = self.window_ref(idx) else {
            return;
        };
        let mut bounds = window.bounds;
        let mut scroll = window.scroll;
        let flags = window.flags;
        let region = window.popup.region;
        let rom = layout.rom;
        let hidden = layout.hidden;

        let body_y = bounds.y + layout.header_h + layout.menu_h;
        let body_h = bounds.h - layout.header_h - layout.menu_h;
        // Cursor position relative to the unscrolled content start gives
        // the total content height.
        let content_h = (layout.at_y + layout.row.height + scroll.y)
            - (bounds.y + layout.header_h + padding.y);

        if flags.contains(WindowFlags::DYNAMIC) && !hidden {
            bounds.h =
                (content_h + layout.header_h + layout.menu_h + padding.y).max(MIN_WINDOW_SIZE);
        }

        // Vertical scrollbar.
        if !flags.contains(WindowFlags::NO_SCROLLBAR) && !hidden && content_h > body_h {
            let track = Rect::new(bounds.x + layout.width, body_y, scrollbar_size, body_h);
            if !rom {
                if self.input.is_mouse_hovering_rect(bounds) {
                    scroll.y -= self.input.mouse.scroll_delta * SCROLL_STEP;
                }
                let cursor_h = (body_h * body_h / content_h).max(10.0);
                let cursor_y = track.y + scroll.y / content_h * body_h;
                let cursor = Rect::new(track.x, cursor_y, scrollbar_size, cursor_h);
                if self.input.is_mouse_down(Button::Left)
                    && self.input.is_mouse_prev_hovering_rect(cursor)
                {
                    scroll.y += self.input.mouse.delta.y * (content_h / body_h);
                }
            }
            scroll.y = crate::math::clamp(0.0, scroll.y, content_h - body_h);
            let cursor_h = (body_h * body_h / content_h).max(10.0);
            let cursor_y = track.y + scroll.y / content_h * body_h;
            if let Some(window) = self.window_mut(idx) {
                window.buffer.rect(track, 0.0, scrollbar_color);
                window.buffer.rect(
                    Rect::new(track.x, cursor_y, scrollbar_size, cursor_h),
                    0.0,
                    cursor_color,
                );
            }
        } else {
            scroll.y = 0.0;
        }

        // Corner scaler.
        if flags.contains(WindowFlags::SCALABLE) && !hidden {
            let scaler = Rect::new(
                bounds.x + bounds.w - scaler_size.x,
                bounds.y + bounds.h - scaler_size.y,
                scaler_size.x,
                scaler_size.y,
            );
            if !rom
                && self.input.is_mouse_down(Button::Left)
                && self.input.is_mouse_prev_hovering_rect(scaler)
            {
                bounds.w = (bounds.w + self.input.mouse.delta.x).max(MIN_WINDOW_SIZE);
                bounds.h = (bounds.h + self.input.mouse.delta.y).max(MIN_WINDOW_SIZE);
            }
            if let Some(window) = self.window_mut(idx) {
                window.buffer.triangle(
                    Vector2::new(scaler.x + scaler.w, scaler.y),
                    Vector2::new(scaler.x + scaler.w, scaler.y + scaler.h),
                    Vector2::new(scaler.x, scaler.y + scaler.h),
                    scaler_color,
                );
            }
        }

        if flags.contains(WindowFlags::BORDER) && !hidden {
            let b = bounds;
            if let Some(window) = self.window_mut(idx) {
                let buf = &mut window.buffer;
                buf.line(Vector2::new(b.x, b.y), Vector2::new(b.x + b.w, b.y), border_color);
                buf.line(
                    Vector2::new(b.x + b.w, b.y),
                    Vector2::new(b.x + b.w, b.y + b.h),
                    border_color,
                );
                buf.line(
                    Vector2::new(b.x + b.w, b.y + b.h),
                    Vector2::new(b.x, b.y + b.h),
                    border_color,
                );
                buf.line(Vector2::new(b.x, b.y + b.h), Vector2::new(b.x, b.y), border_color);
            }
        }

        if let Some(window) = self.window_mut(idx) {
            window.bounds = bounds;
            window.scroll = scroll;
            // Popup commands replay after everything the window queued.
            if let Some(region) = region {
                window.buffer.splice_to_end(region);
                window.popup.region = None;
            }
            window.buffer.scissor(Rect::null());
        }
    }

    // ===============================================================
    //
    //                          ROW LAYOUT
    //
    // ===============================================================

    /// Finalizes the row in progress and starts a fresh one.
    fn row_reset(&mut self, height: f32, columns: u32, kind: RowKind) {
        let spacing = self.style.property(StyleProperty::ItemSpacing);
        let Some(layout) = self.layouts.last_mut() else {
            return;
        };
        layout.at_y += layout.row.height;
        layout.row.kind = kind;
        layout.row.height = height + spacing.y;
        layout.row.columns = columns;
        layout.row.index = 0;
        layout.row.item_offset = 0.0;
        layout.row.filled = 0.0;
        layout.row.ratios.clear();
    }

    /// Starts a row of `columns` evenly sized widgets, `height` pixels
    /// tall, scaling with the window width.
    pub fn layout_row_dynamic(&mut self, height: f32, columns: u32) {
        self.row_reset(height, columns.max(1), RowKind::DynamicEven);
    }

    /// Starts a row of `columns` widgets with a fixed pixel width each.
    pub fn layout_row_static(&mut self, height: f32, item_width: f32, columns: u32) {
        self.row_reset(height, columns.max(1), RowKind::StaticFixed);
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.item_width = item_width;
        }
    }

    /// Starts a row where each widget takes the given fraction of the
    /// panel width.
    pub fn layout_row(&mut self, height: f32, ratios: &[f32]) {
        self.row_reset(height, ratios.len().max(1) as u32, RowKind::DynamicRatio);
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.ratios.extend_from_slice(ratios);
        }
    }

    /// Starts a row whose widths are pushed one widget at a time with
    /// [`Context::layout_row_push`].
    pub fn layout_row_begin(&mut self, format: LayoutFormat, height: f32, columns: u32) {
        let kind = match format {
            LayoutFormat::Dynamic => RowKind::DynamicCustom,
            LayoutFormat::Static => RowKind::StaticCustom,
        };
        self.row_reset(height, columns.max(1), kind);
    }

    /// Pushes the next widget's width: a panel-width fraction for dynamic
    /// rows, pixels for static rows.
    pub fn layout_row_push(&mut self, value: f32) {
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.ratios.push(value);
        }
    }

    pub fn layout_row_end(&mut self) {
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.index = layout.row.columns;
        }
    }

    /// Opens a free-placement canvas `height` pixels tall for up to
    /// `widget_count` caller-positioned rectangles.
    pub fn layout_space_begin(&mut self, format: LayoutFormat, height: f32, widget_count: u32) {
        let kind = match format {
            LayoutFormat::Dynamic => RowKind::SpaceDynamic,
            LayoutFormat::Static => RowKind::SpaceStatic,
        };
        self.row_reset(height, widget_count.max(1), kind);
    }

    /// Positions the next widget inside the space canvas: fractions of the
    /// canvas for dynamic format, pixels for static.
    pub fn layout_space_push(&mut self, rect: Rect) {
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.item = rect;
        }
    }

    pub fn layout_space_end(&mut self) {
        if let Some(layout) = self.layouts.last_mut() {
            layout.row.index = layout.row.columns;
            layout.row.item = Rect::default();
        }
    }

    /// Maps a space-canvas local position to screen coordinates.
    pub fn layout_space_to_screen(&self, local: Vector2) -> Vector2 {
        let Some(layout) = self.layouts.last() else {
            return local;
        };
        Vector2::new(local.x + layout.at_x, local.y + layout.at_y)
    }

    pub fn layout_space_to_local(&self, screen: Vector2) -> Vector2 {
        let Some(layout) = self.layouts.last() else {
            return screen;
        };
        Vector2::new(screen.x - layout.at_x, screen.y - layout.at_y)
    }

    pub fn layout_space_rect_to_screen(&self, local: Rect) -> Rect {
        let pos = self.layout_space_to_screen(local.pos());
        Rect::new(pos.x, pos.y, local.w, local.h)
    }

    pub fn layout_space_rect_to_local(&self, screen: Rect) -> Rect {
        let pos = self.layout_space_to_local(screen.pos());
        Rect::new(pos.x, pos.y, screen.w, screen.h)
    }

    /// Rectangle the next widget will occupy, without consuming it.
    pub fn layout_peek(&self) -> Rect {
        let Some(layout) = self.layouts.last() else {
            return Rect::default();
        };
        let (index, at_y) = if layout.row.index >= layout.row.columns {
            (0, layout.at_y + layout.row.height)
        } else {
            (layout.row.index, layout.at_y)
        };
        self.row_item_bounds(index, at_y, layout.row.item_offset, layout.row.filled)
    }

    fn row_item_bounds(&self, index: u32, at_y: f32, item_offset: f32, filled: f32) -> Rect {
        let spacing = self.style.property(StyleProperty::ItemSpacing);
        let padding = self.style.property(StyleProperty::Padding);
        let Some(layout) = self.layouts.last() else {
            return Rect::default();
        };
        let row = &layout.row;
        let columns = row.columns.max(1) as f32;
        let indent = layout.tree_depth as f32 * TREE_INDENT;
        let panel_space =
            layout.width - 2.0 * padding.x - indent - spacing.x * (row.columns.max(1) - 1) as f32;
        let at_x = layout.at_x + indent;
        let item_h = row.height - spacing.y;

        match row.kind {
            RowKind::None | RowKind::DynamicEven => {
                let w = panel_space / columns;
                let x = at_x + panel_space * (index as f32 / columns) + spacing.x * index as f32;
                Rect::new(x, at_y, w, item_h)
            }
            RowKind::DynamicRatio | RowKind::DynamicCustom => {
                let ratio = row.ratios.get(index as usize).copied().unwrap_or(0.0);
                let x = at_x + panel_space * filled + spacing.x * index as f32;
                Rect::new(x, at_y, panel_space * ratio, item_h)
            }
            RowKind::StaticFixed => {
                let x = at_x + item_offset + spacing.x * index as f32;
                Rect::new(x, at_y, row.item_width, item_h)
            }
            RowKind::StaticCustom => {
                let w = row.ratios.get(index as usize).copied().unwrap_or(0.0);
                let x = at_x + item_offset + spacing.x * index as f32;
                Rect::new(x, at_y, w, item_h)
            }
            RowKind::SpaceDynamic => {
                let canvas_h = row.height - spacing.y;
                Rect::new(
                    at_x + row.item.x * panel_space,
                    at_y + row.item.y * canvas_h,
                    row.item.w * panel_space,
                    row.item.h * canvas_h,
                )
            }
            RowKind::SpaceStatic => {
                Rect::new(at_x + row.item.x, at_y + row.item.y, row.item.w, row.item.h)
            }
        }
    }

    /// Consumes and returns the next widget rectangle, wrapping to a new
    /// row when the current one is full.
    pub(crate) fn alloc_space(&mut self) -> Rect {
        // Widgets before any row declaration get an implicit single-column
        // row of one text line.
        let needs_default = self
            .layouts
            .last()
            .map(|l| l.row.kind == RowKind::None && l.row.columns == 0)
            .unwrap_or(false);
        if needs_default {
            let item_padding = self.style.property(StyleProperty::ItemPadding);
            let height = self.style.font_height + 2.0 * item_padding.y;
            self.layout_row_dynamic(height, 1);
        }

        let wrap = self
            .layouts
            .last()
            .map(|l| l.row.index >= l.row.columns)
            .unwrap_or(false);
        let row_start = {
            let Some(layout) = self.layouts.last_mut() else {
                return Rect::default();
            };
            if wrap {
                layout.at_y += layout.row.height;
                layout.row.index = 0;
                layout.row.item_offset = 0.0;
                layout.row.filled = 0.0;
            }
            (layout.row.index == 0 && layout.dynamic && !layout.hidden).then(|| {
                Rect::new(layout.bounds.x, layout.at_y, layout.bounds.w, layout.row.height)
            })
        };
        // A dynamic window has no pre-drawn body; each row paints its own
        // background strip before its widgets draw over it.
        if let Some(bg) = row_start {
            let color = self.style.color(StyleColor::Window);
            if let Some(buffer) = self.buffer_mut() {
                buffer.rect(bg, 0.0, color);
            }
        }

        let (index, at_y, item_offset, filled) = match self.layouts.last() {
            Some(l) => (l.row.index, l.at_y, l.row.item_offset, l.row.filled),
            None => return Rect::default(),
        };
        let bounds = self.row_item_bounds(index, at_y, item_offset, filled);

        if let Some(layout) = self.layouts.last_mut() {
            match layout.row.kind {
                RowKind::DynamicRatio | RowKind::DynamicCustom => {
                    layout.row.filled +=
                        layout.row.ratios.get(index as usize).copied().unwrap_or(0.0);
                }
                RowKind::StaticFixed | RowKind::StaticCustom => {
                    layout.row.item_offset += bounds.w;
                }
                _ => {}
            }
            layout.row.index += 1;
            layout.max_x = layout.max_x.max(bounds.x + bounds.w);
        }
        bounds
    }

    // ===============================================================
    //
    //                          TREES
    //
    // ===============================================================

    /// Collapsible section header; returns whether its body is open. Every
    /// call returning `true` must be matched by [`Context::layout_pop`].
    pub fn layout_push(&mut self, ty: TreeType, title: &str, initial_open: bool) -> bool {
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let font_height = self.style.font_height;
        let font = self.style.font.clone();
        let text_color = self.style.color(StyleColor::Text);
        let tab_color = self.style.color(StyleColor::TabHeader);

        self.layout_row_dynamic(font_height + 2.0 * item_padding.y, 1);
        let bounds = self.alloc_space();
        let (rom, hidden, win) = match self.layouts.last() {
            Some(l) => (l.rom, l.hidden, l.win),
            None => return false,
        };

        let hash = name_hash(title);
        let clicked = !rom && !hidden && self.input.mouse_clicked(Button::Left, bounds);
        let open = {
            let Some(window) = self.window_mut(win) else {
                return false;
            };
            let state = window.trees.entry(hash).or_insert(initial_open);
            if clicked {
                *state = !*state;
            }
            *state
        };

        if !hidden {
            let symbol = bounds.h * 0.5;
            let sym_x = bounds.x + item_padding.x;
            let sym_y = bounds.y + (bounds.h - symbol) * 0.5;
            let (a, b, c) = if open {
                // Downward triangle.
                (
                    Vector2::new(sym_x, sym_y),
                    Vector2::new(sym_x + symbol, sym_y),
                    Vector2::new(sym_x + symbol * 0.5, sym_y + symbol),
                )
            } else {
                // Rightward triangle.
                (
                    Vector2::new(sym_x, sym_y),
                    Vector2::new(sym_x + symbol, sym_y + symbol * 0.5),
                    Vector2::new(sym_x, sym_y + symbol),
                )
            };
            let text_rect = Rect::new(
                sym_x + symbol + 2.0 * item_padding.x,
                bounds.y + item_padding.y,
                bounds.w - symbol - 3.0 * item_padding.x,
                font_height,
            );
            let background = if ty == TreeType::Tab {
                tab_color
            } else {
                Color::rgba(0, 0, 0, 0)
            };
            if let Some(buffer) = self.buffer_mut() {
                if ty == TreeType::Tab {
                    buffer.rect(bounds, 0.0, tab_color);
                }
                buffer.triangle(a, b, c, text_color);
                buffer.text(text_rect, title, font, font_height, background, text_color);
            }
        }

        if open {
            if let Some(layout) = self.layouts.last_mut() {
                layout.tree_depth += 1;
            }
        }
        open
    }

    /// Closes the innermost open tree section.
    pub fn layout_pop(&mut self) {
        let Some(layout) = self.layouts.last_mut() else {
            return;
        };
        if layout.tree_depth == 0 {
            warn!("layout_pop without an open tree section");
            return;
        }
        layout.tree_depth -= 1;
    }

    // ===============================================================
    //
    //                          GROUPS
    //
    // ===============================================================

    /// Opens a scrollable sub-region in the next widget slot. Returns
    /// `false` (needing no `group_end`) when the slot is clipped away or
    /// the window is hidden.
    pub fn group_begin(&mut self, title: &str, flags: WindowFlags) -> bool {
        let bounds = self.alloc_space();
        let padding = self.style.property(StyleProperty::Padding);
        let scrollbar_size = self.style.property(StyleProperty::ScrollbarSize).x;
        let border_color = self.style.color(StyleColor::Border);

        let Some(parent) = self.layouts.last() else {
            return false;
        };
        if parent.hidden || !parent.clip.intersects(&bounds) {
            return false;
        }
        let win = parent.win;
        let buf_win = parent.buf_win;
        let rom = parent.rom;
        let clip = parent.clip.intersect(&bounds);

        let name = name_hash(title);
        let scroll = self
            .window_ref(win)
            .and_then(|w| w.groups.get(&name).copied())
            .unwrap_or_default();

        let reserved = if flags.contains(WindowFlags::NO_SCROLLBAR) { 0.0 } else { scrollbar_size };
        if let Some(buffer) = self.buffer_mut() {
            if flags.contains(WindowFlags::BORDER) {
                buffer.rect(bounds, 0.0, border_color);
            }
            buffer.scissor(clip);
        }

        self.layouts.push(Layout {
            kind: LayoutKind::Group { name },
            win,
            buf_win,
            bounds,
            clip,
            at_x: bounds.x + padding.x,
            at_y: bounds.y + padding.y - scroll.y,
            max_x: 0.0,
            width: bounds.w - reserved,
            height: bounds.h,
            header_h: 0.0,
            menu_h: 0.0,
            row: RowLayout::default(),
            offset: scroll,
            rom,
            hidden: false,
            dynamic: false,
            tree_depth: 0,
            menu_start: 0.0,
        });
        true
    }

    /// Closes the innermost group: clamps and persists its scroll offset,
    /// draws its scrollbar and restores the parent clip.
    pub fn group_end(&mut self) {
        let is_group = matches!(
            self.layouts.last().map(|l| &l.kind),
            Some(LayoutKind::Group { .. })
        );
        if !is_group {
            warn!("group_end without a matching group_begin");
            return;
        }
        let Some(layout) = self.layouts.pop() else {
            return;
        };
        let LayoutKind::Group { name } = layout.kind else {
            return;
        };

        let padding = self.style.property(StyleProperty::Padding);
        let scrollbar_size = self.style.property(StyleProperty::ScrollbarSize).x;
        let scrollbar_color = self.style.color(StyleColor::Scrollbar);
        let cursor_color = self.style.color(StyleColor::ScrollbarCursor);

        let mut scroll = layout.offset;
        let content_h =
            (layout.at_y + layout.row.height + scroll.y) - (layout.bounds.y + padding.y);
        let body_h = layout.bounds.h;

        let mut scrollbar: Option<(Rect, Rect)> = None;
        if content_h > body_h && scrollbar_size > 0.0 {
            if !layout.rom && self.input.is_mouse_hovering_rect(layout.bounds) {
                scroll.y -= self.input.mouse.scroll_delta * SCROLL_STEP;
            }
            scroll.y = crate::math::clamp(0.0, scroll.y, content_h - body_h);
            let track = Rect::new(
                layout.bounds.x + layout.width,
                layout.bounds.y,
                scrollbar_size,
                body_h,
            );
            let cursor_h = (body_h * body_h / content_h).max(10.0);
            let cursor_y = track.y + scroll.y / content_h * body_h;
            scrollbar = Some((track, Rect::new(track.x, cursor_y, scrollbar_size, cursor_h)));
        } else {
            scroll.y = 0.0;
        }

        if let Some(window) = self.window_mut(layout.win) {
            window.groups.insert(name, scroll);
        }
        let parent_clip = self.layouts.last().map(|l| l.clip).unwrap_or(Rect::null());
        if let Some(buffer) = self.buffer_mut() {
            if let Some((track, cursor)) = scrollbar {
                buffer.rect(track, 0.0, scrollbar_color);
                buffer.rect(cursor, 0.0, cursor_color);
            }
            buffer.scissor(parent_clip);
        }
    }

    // ===============================================================
    //
    //                          MENUBAR
    //
    // ===============================================================

    /// Starts the menubar region. Rows laid out until
    /// [`Context::menubar_end`] stay fixed above the scrolled content.
    pub fn menubar_begin(&mut self) {
        let Some(layout) = self.layouts.last_mut() else {
            return;
        };
        // The menubar must not scroll with the content; undo the offset
        // while it is laid out.
        layout.at_y += layout.offset.y;
        layout.menu_start = layout.at_y + layout.row.height;
    }

    /// Ends the menubar region and shrinks the content clip below it.
    pub fn menubar_end(&mut self) {
        let clip = {
            let Some(layout) = self.layouts.last_mut() else {
                return;
            };
            layout.at_y += layout.row.height;
            layout.row = RowLayout::default();
            layout.menu_h = layout.at_y - layout.menu_start;
            layout.at_y -= layout.offset.y;
            let bottom = layout.clip.y + layout.clip.h;
            let top = layout.menu_start + layout.menu_h;
            layout.clip = Rect::new(layout.clip.x, top, layout.clip.w, (bottom - top).max(0.0));
            layout.clip
        };
        if let Some(buffer) = self.buffer_mut() {
            buffer.scissor(clip);
        }
    }

    pub(crate) fn record_popup_region(&mut self, win: usize, region: PopupRegion) {
        if let Some(window) = self.window_mut(win) {
            window.popup.region = Some(region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::FixedWidthFont;
    use std::rc::Rc;

    fn ctx() -> Context {
        let mut ctx = Context::new(Rc::new(FixedWidthFont::new(13.0, 7.0)));
        ctx.input.begin();
        ctx.input.end();
        ctx
    }

    fn zero_chrome(ctx: &mut Context) {
        ctx.style
            .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.style
            .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
            .unwrap();
    }

    #[test]
    fn dynamic_row_divides_width_evenly() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(30.0, 3);
        let a = ctx.alloc_space();
        let b = ctx.alloc_space();
        let c = ctx.alloc_space();
        ctx.end();
        ctx.clear();

        assert_eq!(a, Rect::new(0.0, 0.0, 100.0, 30.0));
        assert_eq!(b, Rect::new(100.0, 0.0, 100.0, 30.0));
        assert_eq!(c, Rect::new(200.0, 0.0, 100.0, 30.0));
        assert_eq!(c.x + c.w, 300.0);
    }

    #[test]
    fn rows_wrap_and_advance_vertically() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 200.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(20.0, 2);
        let a = ctx.alloc_space();
        let _b = ctx.alloc_space();
        let c = ctx.alloc_space(); // wraps to the second row
        ctx.end();
        ctx.clear();

        assert_eq!(a.y, 0.0);
        assert_eq!(c.y, 20.0);
        assert_eq!(c.x, a.x);
    }

    #[test]
    fn static_row_uses_fixed_widths() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_static(24.0, 80.0, 3);
        let a = ctx.alloc_space();
        let b = ctx.alloc_space();
        ctx.end();
        ctx.clear();

        assert_eq!(a.w, 80.0);
        assert_eq!(b.x, 80.0);
    }

    #[test]
    fn ratio_row_partitions_by_fraction() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 200.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row(20.0, &[0.25, 0.75]);
        let a = ctx.alloc_space();
        let b = ctx.alloc_space();
        ctx.end();
        ctx.clear();

        assert_eq!(a.w, 50.0);
        assert_eq!(b.x, 50.0);
        assert_eq!(b.w, 150.0);
    }

    #[test]
    fn space_layout_maps_local_rects() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(10.0, 20.0, 200.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_space_begin(LayoutFormat::Static, 100.0, 4);
        ctx.layout_space_push(Rect::new(5.0, 7.0, 30.0, 40.0));
        let r = ctx.alloc_space();
        assert_eq!(r, Rect::new(15.0, 27.0, 30.0, 40.0));

        let screen = ctx.layout_space_to_screen(Vector2::new(0.0, 0.0));
        let back = ctx.layout_space_to_local(screen);
        assert_eq!(back, Vector2::new(0.0, 0.0));
        ctx.layout_space_end();
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn layout_peek_does_not_consume() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(30.0, 3);
        let peeked = ctx.layout_peek();
        let taken = ctx.alloc_space();
        assert_eq!(peeked, taken);
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn tree_state_persists_across_frames() {
        let mut ctx = ctx();
        for _ in 0..2 {
            ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
            let open = ctx.layout_push(TreeType::Tab, "section", true);
            assert!(open);
            if open {
                ctx.layout_pop();
            }
            ctx.end();
            ctx.clear();
            ctx.input.begin();
            ctx.input.end();
        }
    }

    #[test]
    fn open_tree_indents_content() {
        let mut ctx = ctx();
        zero_chrome(&mut ctx);
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(20.0, 1);
        let before = ctx.alloc_space();
        if ctx.layout_push(TreeType::Node, "n", true) {
            ctx.layout_row_dynamic(20.0, 1);
            let inside = ctx.alloc_space();
            assert!(inside.x > before.x);
            assert!(inside.w < before.w);
            ctx.layout_pop();
        }
        ctx.layout_row_dynamic(20.0, 1);
        let after = ctx.alloc_space();
        assert_eq!(after.x, before.x);
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn group_scroll_persists_per_window() {
        let mut ctx = ctx();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(100.0, 1);
        if ctx.group_begin("g", WindowFlags::empty()) {
            ctx.layout_row_dynamic(30.0, 1);
            for _ in 0..10 {
                ctx.alloc_space();
            }
            ctx.group_end();
        }
        ctx.end();
        ctx.clear();
        assert!(ctx.window_is_live("w"));
    }
}
