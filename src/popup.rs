//! Popups and the widgets built from them: combos, contextual menus,
//! menubar menus and tooltips.
//!
//! A popup records into its owning window's command buffer between begin
//! and end markers; the window's `end` splices that span behind everything
//! else the window queued, so popup pixels always land on top without a
//! second buffer. One popup can be live per window at a time.

use tracing::warn;

use crate::color::Color;
use crate::command::{Image, PopupRegion};
use crate::context::{name_hash, Context};
use crate::input::Button;
use crate::layout::{Layout, LayoutKind, RowLayout};
use crate::math::{Rect, Vector2};
use crate::style::{StyleColor, StyleProperty};
use crate::widgets::{icon_cell, SymbolType, TextAlign, WidgetState};

/// Headroom given to a growing popup before its real height is known.
const POPUP_MAX_HEIGHT: f32 = 16384.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    /// Fixed bounds given up front.
    Static,
    /// Height grows with the content, like a dynamic window.
    Dynamic,
}

/// Optional leading cell of a popup-backed menu row.
#[derive(Debug, Clone, Copy)]
enum ItemDecoration {
    None,
    Icon(Image),
    Symbol(SymbolType),
}

impl Context {
    // ===============================================================
    //
    //                          POPUP
    //
    // ===============================================================

    /// Opens a blocking popup over the current window, `bounds` relative
    /// to the window body. Returns whether content should be laid out;
    /// while it is open the rest of the window is read-only. A popup
    /// closed with [`Context::popup_close`] stays closed until the caller
    /// stops beginning it for a frame.
    pub fn popup_begin(&mut self, kind: PopupKind, title: &str, bounds: Rect) -> bool {
        self.popup_begin_impl(kind, title, bounds, None)
    }

    fn popup_begin_impl(
        &mut self,
        kind: PopupKind,
        title: &str,
        bounds: Rect,
        trigger: Option<Rect>,
    ) -> bool {
        let window_color = self.style.color(StyleColor::Combo);
        let border_color = self.style.color(StyleColor::Border);
        let padding = self.style.property(StyleProperty::Padding);

        let Some(parent) = self.layouts.last() else {
            warn!(title, "popup outside a window");
            return false;
        };
        if !matches!(parent.kind, LayoutKind::Window) {
            warn!(title, "popup must be begun at window level");
            return false;
        }
        let win = parent.win;
        let hidden = parent.hidden;
        let origin = Vector2::new(parent.bounds.x, parent.bounds.y + parent.header_h);

        let name = name_hash(title);
        let seq = self.seq;
        let nonblock = trigger.is_some();
        let active = {
            let Some(window) = self.window_mut(win) else {
                return false;
            };
            let popup = &mut window.popup;
            if popup.name != name || seq.wrapping_sub(popup.seq) > 1 {
                // Fresh popup; a non-blocking one waits for its trigger.
                popup.name = name;
                popup.active = !nonblock;
                popup.body = Rect::default();
            }
            popup.seq = seq;
            popup.active
        };
        if !active || hidden {
            return false;
        }

        let body = if nonblock {
            // Trigger-anchored popups are positioned in screen space.
            bounds
        } else {
            Rect::new(origin.x + bounds.x, origin.y + bounds.y, bounds.w, bounds.h)
        };
        let dynamic = kind == PopupKind::Dynamic;
        let clip = if dynamic {
            Rect::new(body.x, body.y, body.w, POPUP_MAX_HEIGHT)
        } else {
            body
        };

        // Everything recorded before this marker stays below the popup.
        let parent_tail = self.window_ref(win).map(|w| w.buffer.tail()).unwrap_or(None);
        if let Some(window) = self.window_mut(win) {
            window.popup.region = Some(PopupRegion {
                parent: parent_tail,
                first: 0,
                last: 0,
            });
            window.buffer.scissor(clip);
            if !dynamic {
                window.buffer.rect(body, 0.0, window_color);
                if !border_color.is_transparent() {
                    let b = body;
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
        }

        // The window underneath goes read-only while the popup is up.
        if let Some(parent) = self.layouts.last_mut() {
            parent.rom = true;
        }

        self.layouts.push(Layout {
            kind: LayoutKind::Popup { nonblock },
            win,
            buf_win: win,
            bounds: body,
            clip,
            at_x: body.x + padding.x,
            at_y: body.y + padding.y,
            max_x: 0.0,
            width: body.w,
            height: body.h,
            header_h: 0.0,
            menu_h: 0.0,
            row: RowLayout::default(),
            offset: Vector2::default(),
            rom: false,
            hidden: false,
            dynamic,
            tree_depth: 0,
            menu_start: 0.0,
        });
        true
    }

    /// Closes the live popup; its content still draws this frame.
    pub fn popup_close(&mut self) {
        let Some(win) = self.layouts.last().map(|l| l.win) else {
            return;
        };
        if let Some(window) = self.window_mut(win) {
            window.popup.active = false;
        }
    }

    /// Finishes the popup: delimits its command span for the end-of-frame
    /// splice and restores the window clip.
    pub fn popup_end(&mut self) {
        let is_popup = matches!(
            self.layouts.last().map(|l| &l.kind),
            Some(LayoutKind::Popup { .. })
        );
        if !is_popup {
            warn!("popup_end without a matching popup_begin");
            return;
        }
        let Some(layout) = self.layouts.pop() else {
            return;
        };
        let padding = self.style.property(StyleProperty::Padding);
        let win = layout.win;

        let mut body = layout.bounds;
        if layout.dynamic {
            let content_h = (layout.at_y + layout.row.height) - (body.y + padding.y);
            body.h = content_h + padding.y;
        }

        let parent_clip = self.layouts.last().map(|l| l.clip).unwrap_or(Rect::null());
        if let Some(window) = self.window_mut(win) {
            window.popup.body = body;
            let region = window.popup.region.take();
            let (first, last) = {
                let first = window.buffer.successor(region.as_ref().and_then(|r| r.parent));
                (first, window.buffer.tail())
            };
            window.popup.region = match (region, first, last) {
                (Some(region), Some(first), Some(last)) => Some(PopupRegion {
                    parent: region.parent,
                    first,
                    last,
                }),
                _ => None,
            };
            window.buffer.scissor(parent_clip);
        }
    }

    /// Trigger-anchored popup closing on any click outside its body or
    /// trigger. Shared machinery of combos, contextual menus and menus.
    fn nonblock_begin(&mut self, title: &str, body: Rect, trigger: Rect, button: Button) -> bool {
        let name = name_hash(title);
        let Some(win) = self.layouts.last().map(|l| l.win) else {
            return false;
        };
        let pressed = self.input.is_mouse_pressed(Button::Left)
            || self.input.is_mouse_pressed(Button::Right);
        let toggle = self.input.mouse_clicked(button, trigger);
        let outside = pressed
            && !self.input.is_mouse_hovering_rect(trigger)
            && !self
                .window_ref(win)
                .map(|w| w.popup.body.contains(self.input.mouse.pos))
                .unwrap_or(false);
        let frame_seq = self.seq;
        {
            let Some(window) = self.window_mut(win) else {
                return false;
            };
            let popup = &mut window.popup;
            let live = popup.name == name && frame_seq.wrapping_sub(popup.seq) <= 1;
            let was_active = live && popup.active;
            let active = if toggle {
                !was_active
            } else if was_active && outside {
                false
            } else {
                was_active
            };
            popup.name = name;
            popup.active = active;
            popup.seq = frame_seq;
            if !live {
                popup.body = Rect::default();
            }
        }
        self.popup_begin_impl(PopupKind::Dynamic, title, body, Some(trigger))
    }

    // ===============================================================
    //
    //                          COMBO
    //
    // ===============================================================

    /// Drop-down selector showing `selected`; true while the list is open.
    /// Each open combo must be closed with [`Context::combo_end`].
    pub fn combo_begin_text(&mut self, title: &str, selected: &str, max_height: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Combo);
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
        }
        self.draw_text(header, selected, TextAlign::Left, background, text_color);
        let sym = Rect::new(
            header.x + header.w - header.h,
            header.y + header.h * 0.25,
            header.h * 0.5,
            header.h * 0.5,
        );
        self.draw_symbol(SymbolType::TriangleDown, sym, text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, header.w, max_height);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Combo whose header shows a color swatch instead of text.
    pub fn combo_begin_color(&mut self, title: &str, color: Color, max_height: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Combo);
        let text_color = self.style.color(StyleColor::Text);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
            let swatch = Rect::new(
                header.x + item_padding.x,
                header.y + item_padding.y,
                header.w - header.h - 2.0 * item_padding.x,
                header.h - 2.0 * item_padding.y,
            );
            buffer.rect(swatch, 0.0, color);
        }
        let sym = Rect::new(
            header.x + header.w - header.h,
            header.y + header.h * 0.25,
            header.h * 0.5,
            header.h * 0.5,
        );
        self.draw_symbol(SymbolType::TriangleDown, sym, text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, header.w, max_height);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Combo whose header shows an image instead of text.
    pub fn combo_begin_image(&mut self, title: &str, image: Image, max_height: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Combo);
        let text_color = self.style.color(StyleColor::Text);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
            let inner = Rect::new(
                header.x + item_padding.x,
                header.y + item_padding.y,
                header.w - header.h - 2.0 * item_padding.x,
                header.h - 2.0 * item_padding.y,
            );
            buffer.image(inner, image);
        }
        let sym = Rect::new(
            header.x + header.w - header.h,
            header.y + header.h * 0.25,
            header.h * 0.5,
            header.h * 0.5,
        );
        self.draw_symbol(SymbolType::TriangleDown, sym, text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, header.w, max_height);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Combo showing both an image and the selected label in its header.
    pub fn combo_begin_icon(
        &mut self,
        title: &str,
        selected: &str,
        image: Image,
        max_height: f32,
    ) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Combo);
        let text_color = self.style.color(StyleColor::Text);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let (cell, text_rect) = icon_cell(header, TextAlign::Left);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
            buffer.image(cell.pad(item_padding), image);
        }
        self.draw_text(text_rect, selected, TextAlign::Left, background, text_color);
        let sym = Rect::new(
            header.x + header.w - header.h,
            header.y + header.h * 0.25,
            header.h * 0.5,
            header.h * 0.5,
        );
        self.draw_symbol(SymbolType::TriangleDown, sym, text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, header.w, max_height);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Selectable row inside an open combo; closes the combo when picked.
    pub fn combo_item(&mut self, title: &str) -> bool {
        let picked = self.popup_item(title);
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Combo row with a leading image cell.
    pub fn combo_item_icon(&mut self, image: Image, title: &str, align: TextAlign) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Icon(image));
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Combo row with a leading symbol cell.
    pub fn combo_item_symbol(&mut self, symbol: SymbolType, title: &str, align: TextAlign) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Symbol(symbol));
        if picked {
            self.popup_close();
        }
        picked
    }

    pub fn combo_close(&mut self) {
        self.popup_close();
    }

    pub fn combo_end(&mut self) {
        self.popup_end();
    }

    // ===============================================================
    //
    //                          CONTEXTUAL
    //
    // ===============================================================

    /// Right-click menu over `trigger_bounds`, opening at the click
    /// position. True while open; must then be closed with
    /// [`Context::contextual_end`].
    pub fn contextual_begin(&mut self, title: &str, size: Vector2, trigger_bounds: Rect) -> bool {
        let anchor = self
            .window_ref(self.layouts.last().map(|l| l.win).unwrap_or(0))
            .filter(|w| w.popup.active && w.popup.name == name_hash(title))
            .map(|w| w.popup.body.pos())
            .unwrap_or(self.input.mouse.pos);
        let body = Rect::new(anchor.x, anchor.y, size.x, size.y);
        self.nonblock_begin(title, body, trigger_bounds, Button::Right)
    }

    /// Row inside an open contextual menu; closes it when picked.
    pub fn contextual_item(&mut self, title: &str) -> bool {
        let picked = self.popup_item(title);
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Contextual row with a leading image cell.
    pub fn contextual_item_icon(&mut self, image: Image, title: &str, align: TextAlign) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Icon(image));
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Contextual row with a leading symbol cell.
    pub fn contextual_item_symbol(
        &mut self,
        symbol: SymbolType,
        title: &str,
        align: TextAlign,
    ) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Symbol(symbol));
        if picked {
            self.popup_close();
        }
        picked
    }

    pub fn contextual_close(&mut self) {
        self.popup_close();
    }

    pub fn contextual_end(&mut self) {
        self.popup_end();
    }

    // ===============================================================
    //
    //                          MENU
    //
    // ===============================================================

    /// Menubar drop-down behind a text button; lay the menubar out with
    /// [`Context::menubar_begin`] first. True while open.
    pub fn menu_begin_text(&mut self, title: &str, width: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Header);
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
        }
        self.draw_text(header, title, TextAlign::Centered, background, text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, width, 0.0);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Menubar drop-down behind an image button.
    pub fn menu_icon_begin(&mut self, title: &str, image: Image, width: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Header);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
            buffer.image(header.pad(item_padding), image);
        }
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, width, 0.0);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Menubar drop-down behind a symbol button.
    pub fn menu_symbol_begin(&mut self, title: &str, symbol: SymbolType, width: f32) -> bool {
        let (header, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let background = self.style.color(StyleColor::Header);
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(header, 0.0, background);
        }
        self.draw_symbol(symbol, header.shrink(header.h * 0.25), text_color);
        if state == WidgetState::Rom {
            return false;
        }

        let body = Rect::new(header.x, header.y + header.h, width, 0.0);
        self.nonblock_begin(title, body, header, Button::Left)
    }

    /// Row inside an open menu; closes the menu when picked.
    pub fn menu_item(&mut self, title: &str) -> bool {
        let picked = self.popup_item(title);
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Menu row with a leading image cell.
    pub fn menu_item_icon(&mut self, image: Image, title: &str, align: TextAlign) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Icon(image));
        if picked {
            self.popup_close();
        }
        picked
    }

    /// Menu row with a leading symbol cell.
    pub fn menu_item_symbol(&mut self, symbol: SymbolType, title: &str, align: TextAlign) -> bool {
        let picked = self.popup_item_impl(title, align, ItemDecoration::Symbol(symbol));
        if picked {
            self.popup_close();
        }
        picked
    }

    pub fn menu_close(&mut self) {
        self.popup_close();
    }

    pub fn menu_end(&mut self) {
        self.popup_end();
    }

    /// One full-width hoverable row, shared by the popup-backed menus.
    fn popup_item(&mut self, title: &str) -> bool {
        self.popup_item_impl(title, TextAlign::Left, ItemDecoration::None)
    }

    fn popup_item_impl(&mut self, title: &str, align: TextAlign, deco: ItemDecoration) -> bool {
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let font_height = self.style.font_height;
        self.layout_row_dynamic(font_height + 2.0 * item_padding.y, 1);
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let hovering = self.input.is_mouse_hovering_rect(bounds);
        let background = if hovering {
            self.style.color(StyleColor::SelectableHover)
        } else {
            self.style.color(StyleColor::Combo)
        };
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, 0.0, background);
        }
        let text_rect = match deco {
            ItemDecoration::None => bounds,
            ItemDecoration::Icon(image) => {
                let (cell, rest) = icon_cell(bounds, TextAlign::Left);
                if let Some(buffer) = self.buffer_mut() {
                    buffer.image(cell.pad(item_padding), image);
                }
                rest
            }
            ItemDecoration::Symbol(symbol) => {
                let (cell, rest) = icon_cell(bounds, TextAlign::Left);
                self.draw_symbol(symbol, cell.shrink(cell.h * 0.25), text_color);
                rest
            }
        };
        self.draw_text(text_rect, title, align, background, text_color);
        state == WidgetState::Valid && self.input.mouse_clicked(Button::Left, bounds)
    }

    // ===============================================================
    //
    //                          TOOLTIP
    //
    // ===============================================================

    /// Tooltip with caller-driven rows, anchored below the mouse cursor.
    /// True while it should be laid out; close with
    /// [`Context::tooltip_end`]. Shows on every frame it is begun, so the
    /// caller gates it on a hover test.
    pub fn tooltip_begin(&mut self, width: f32) -> bool {
        let font_height = self.style.font_height;
        let Some(parent) = self.layouts.last() else {
            return false;
        };
        if !matches!(parent.kind, LayoutKind::Window) {
            warn!("tooltip must be begun at window level");
            return false;
        }
        let win = parent.win;
        let origin = Vector2::new(parent.bounds.x, parent.bounds.y + parent.header_h);
        let pos = self.input.mouse.pos;
        let bounds = Rect::new(pos.x - origin.x, pos.y + font_height - origin.y, width, 0.0);

        // Tooltips carry no open/close state; begun means visible.
        let name = name_hash("tooltip");
        let frame_seq = self.seq;
        {
            let Some(window) = self.window_mut(win) else {
                return false;
            };
            let popup = &mut window.popup;
            popup.name = name;
            popup.active = true;
            popup.seq = frame_seq;
        }
        self.popup_begin_impl(PopupKind::Dynamic, "tooltip", bounds, None)
    }

    pub fn tooltip_end(&mut self) {
        self.popup_end();
    }

    /// One-line tooltip at the mouse cursor. Draws on top of the window
    /// through the popup splice, so it can be emitted mid-frame.
    pub fn tooltip(&mut self, text: &str) {
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let font = self.style.font.clone();
        let font_height = self.style.font_height;
        let background = self.style.color(StyleColor::Combo);
        let border_color = self.style.color(StyleColor::Border);
        let text_color = self.style.color(StyleColor::Text);

        let Some(layout) = self.layouts.last() else {
            return;
        };
        if layout.hidden {
            return;
        }
        let win = layout.win;
        let has_region = self
            .window_ref(win)
            .map(|w| w.popup.region.is_some())
            .unwrap_or(true);

        let text_w = font.width(font_height, text);
        let pos = self.input.mouse.pos;
        let body = Rect::new(
            pos.x,
            pos.y + font_height,
            text_w + 2.0 * item_padding.x,
            font_height + 2.0 * item_padding.y,
        );
        let text_rect = body.pad(item_padding);

        let parent_tail = self.window_ref(win).map(|w| w.buffer.tail()).unwrap_or(None);
        let Some(window) = self.window_mut(win) else {
            return;
        };
        window.buffer.scissor(Rect::null());
        window.buffer.rect(body, 0.0, background);
        window
            .buffer
            .rect(Rect::new(body.x, body.y, body.w, 1.0), 0.0, border_color);
        window
            .buffer
            .text(text_rect, text, font, font_height, background, text_color);
        let restore = self.layouts.last().map(|l| l.clip).unwrap_or(Rect::null());
        if let Some(window) = self.window_mut(win) {
            window.buffer.scissor(restore);
            // A live popup owns the splice slot; the tooltip then stays in
            // append order.
            if !has_region {
                let first = window.buffer.successor(parent_tail);
                if let (Some(first), Some(last)) = (first, window.buffer.tail()) {
                    window.popup.region = Some(PopupRegion {
                        parent: parent_tail,
                        first,
                        last,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::context::WindowFlags;
    use crate::font::testing::FixedWidthFont;
    use std::rc::Rc;

    fn ctx() -> Context {
        let mut ctx = Context::new(Rc::new(FixedWidthFont::new(13.0, 7.0)));
        ctx.input.begin();
        ctx.input.end();
        ctx
    }

    fn rect_xs(ctx: &Context) -> Vec<f32> {
        ctx.commands()
            .filter_map(|c| match &c.kind {
                CommandKind::Rect { rect, .. } => Some(rect.x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn popup_commands_replay_after_window_content() {
        let mut ctx = ctx();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(30.0, 1);
        // Window primitive before the popup.
        if let Some(buffer) = ctx.buffer_mut() {
            buffer.rect(Rect::new(101.0, 0.0, 5.0, 5.0), 0.0, Color::rgb(255, 0, 0));
        }
        let open = ctx.popup_begin(PopupKind::Static, "p", Rect::new(50.0, 50.0, 100.0, 100.0));
        assert!(open);
        // Marker inside the popup clip rect so it survives recording.
        if let Some(buffer) = ctx.buffer_mut() {
            buffer.rect(Rect::new(102.0, 52.0, 5.0, 5.0), 0.0, Color::rgb(0, 255, 0));
        }
        ctx.popup_end();
        // Window primitive after the popup.
        if let Some(buffer) = ctx.buffer_mut() {
            buffer.rect(Rect::new(103.0, 0.0, 5.0, 5.0), 0.0, Color::rgb(0, 0, 255));
        }
        ctx.end();

        let xs = rect_xs(&ctx);
        let pre = xs.iter().position(|&x| x == 101.0).unwrap();
        let inside = xs.iter().position(|&x| x == 102.0).unwrap();
        let post = xs.iter().position(|&x| x == 103.0).unwrap();
        // Both window primitives replay before the popup's content.
        assert!(pre < inside);
        assert!(post < inside);
        ctx.clear();
    }

    #[test]
    fn popup_close_persists_until_abandoned() {
        let mut ctx = ctx();
        let bounds = Rect::new(10.0, 10.0, 80.0, 80.0);

        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(ctx.popup_begin(PopupKind::Static, "p", bounds));
        ctx.popup_close();
        ctx.popup_end();
        ctx.end();
        ctx.clear();

        // Still begun every frame: stays closed.
        ctx.input.begin();
        ctx.input.end();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(!ctx.popup_begin(PopupKind::Static, "p", bounds));
        ctx.end();
        ctx.clear();

        // Two frames without the popup reset it.
        for _ in 0..2 {
            ctx.input.begin();
            ctx.input.end();
            ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
            ctx.end();
            ctx.clear();
        }
        ctx.input.begin();
        ctx.input.end();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(ctx.popup_begin(PopupKind::Static, "p", bounds));
        ctx.popup_end();
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn open_popup_makes_parent_window_read_only() {
        let mut ctx = ctx();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(ctx.popup_begin(PopupKind::Static, "p", Rect::new(50.0, 50.0, 100.0, 100.0)));
        ctx.popup_end();
        assert!(ctx.layouts.last().map(|l| l.rom).unwrap_or(false));
        ctx.end();
        ctx.clear();
    }

    fn combo_frame(ctx: &mut Context, picked: &mut Option<usize>) -> bool {
        ctx.style
            .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.style
            .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(20.0, 1);
        let open = ctx.combo_begin_text("colors", "red", 100.0);
        if open {
            for (i, item) in ["red", "green", "blue"].iter().enumerate() {
                if ctx.combo_item(item) {
                    *picked = Some(i);
                }
            }
            ctx.combo_end();
        }
        ctx.end();
        ctx.clear();
        open
    }

    #[test]
    fn combo_opens_on_header_click_and_picks_item() {
        let mut ctx = ctx();
        let mut picked = None;

        assert!(!combo_frame(&mut ctx, &mut picked));

        // Click the header: (0,0)-(300,20).
        ctx.input.begin();
        ctx.input.motion(10.0, 10.0);
        ctx.input.button(Button::Left, 10.0, 10.0, true);
        ctx.input.end();
        combo_frame(&mut ctx, &mut picked);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 10.0, false);
        ctx.input.end();
        assert!(combo_frame(&mut ctx, &mut picked));
        assert_eq!(picked, None);

        // Items start below the header at y=20, one text line each
        // (13px font + item padding). Click the first item row.
        ctx.input.begin();
        ctx.input.motion(10.0, 25.0);
        ctx.input.button(Button::Left, 10.0, 25.0, true);
        ctx.input.end();
        combo_frame(&mut ctx, &mut picked);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 25.0, false);
        ctx.input.end();
        combo_frame(&mut ctx, &mut picked);
        assert_eq!(picked, Some(0));

        // Picking closed it.
        assert!(!combo_frame(&mut ctx, &mut picked));
    }

    fn icon_combo_frame(ctx: &mut Context, picked: &mut Option<usize>) -> bool {
        ctx.style
            .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.style
            .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(20.0, 1);
        let open = ctx.combo_begin_icon("colors", "red", Image::id(3), 100.0);
        if open {
            for (i, item) in ["red", "green", "blue"].iter().enumerate() {
                if ctx.combo_item_symbol(SymbolType::Circle, item, TextAlign::Left) {
                    *picked = Some(i);
                }
            }
            ctx.combo_end();
        }
        ctx.end();
        ctx.clear();
        open
    }

    #[test]
    fn decorated_combo_opens_and_picks_item() {
        let mut ctx = ctx();
        let mut picked = None;

        assert!(!icon_combo_frame(&mut ctx, &mut picked));

        // Click the header: (0,0)-(300,20).
        ctx.input.begin();
        ctx.input.motion(10.0, 10.0);
        ctx.input.button(Button::Left, 10.0, 10.0, true);
        ctx.input.end();
        icon_combo_frame(&mut ctx, &mut picked);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 10.0, false);
        ctx.input.end();
        assert!(icon_combo_frame(&mut ctx, &mut picked));
        assert_eq!(picked, None);

        // Click the first item row below the header.
        ctx.input.begin();
        ctx.input.motion(10.0, 25.0);
        ctx.input.button(Button::Left, 10.0, 25.0, true);
        ctx.input.end();
        icon_combo_frame(&mut ctx, &mut picked);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 25.0, false);
        ctx.input.end();
        icon_combo_frame(&mut ctx, &mut picked);
        assert_eq!(picked, Some(0));
        assert!(!icon_combo_frame(&mut ctx, &mut picked));
    }

    #[test]
    fn region_tooltip_lays_out_rows_over_content() {
        let mut ctx = ctx();
        ctx.input.begin();
        ctx.input.motion(40.0, 40.0);
        ctx.input.end();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(ctx.tooltip_begin(120.0));
        ctx.layout_row_dynamic(20.0, 1);
        ctx.label("hint", TextAlign::Left);
        ctx.tooltip_end();
        ctx.end();

        let texts: Vec<_> = ctx
            .commands()
            .filter_map(|c| match &c.kind {
                CommandKind::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(texts.iter().any(|t| t == "hint"));
        ctx.clear();

        // Shown again next frame without any open/close bookkeeping.
        ctx.input.begin();
        ctx.input.end();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        assert!(ctx.tooltip_begin(120.0));
        ctx.tooltip_end();
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn nonblock_popup_closes_on_outside_click() {
        let mut ctx = ctx();
        let mut picked = None;

        // Open via header click.
        ctx.input.begin();
        ctx.input.motion(10.0, 10.0);
        ctx.input.button(Button::Left, 10.0, 10.0, true);
        ctx.input.end();
        combo_frame(&mut ctx, &mut picked);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 10.0, false);
        ctx.input.end();
        assert!(combo_frame(&mut ctx, &mut picked));

        // Press far outside both header and body.
        ctx.input.begin();
        ctx.input.motion(290.0, 290.0);
        ctx.input.button(Button::Left, 290.0, 290.0, true);
        ctx.input.end();
        assert!(!combo_frame(&mut ctx, &mut picked));
        assert_eq!(picked, None);
    }

    #[test]
    fn tooltip_draws_after_window_content() {
        let mut ctx = ctx();
        ctx.input.begin();
        ctx.input.motion(40.0, 40.0);
        ctx.input.end();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
        if let Some(buffer) = ctx.buffer_mut() {
            buffer.rect(Rect::new(104.0, 0.0, 5.0, 5.0), 0.0, Color::rgb(255, 0, 0));
        }
        ctx.tooltip("hint");
        ctx.end();

        let texts: Vec<_> = ctx
            .commands()
            .filter_map(|c| match &c.kind {
                CommandKind::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(texts.iter().any(|t| t == "hint"));
        ctx.clear();
    }

    #[test]
    fn symbol_menu_opens_under_menubar_entry() {
        let mut ctx = ctx();
        let mut hit = false;

        ctx.input.begin();
        ctx.input.motion(10.0, 10.0);
        ctx.input.button(Button::Left, 10.0, 10.0, true);
        ctx.input.end();
        let frame = |ctx: &mut Context, hit: &mut bool| -> bool {
            ctx.style
                .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.style
                .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
            ctx.menubar_begin();
            ctx.layout_row_static(20.0, 60.0, 1);
            let open = ctx.menu_symbol_begin("gear", SymbolType::Plus, 120.0);
            if open {
                if ctx.menu_item_icon(Image::id(9), "settings", TextAlign::Left) {
                    *hit = true;
                }
                ctx.menu_end();
            }
            ctx.menubar_end();
            ctx.end();
            ctx.clear();
            open
        };
        frame(&mut ctx, &mut hit);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 10.0, false);
        ctx.input.end();
        assert!(frame(&mut ctx, &mut hit));
        assert!(!hit);
    }

    #[test]
    fn menu_opens_under_menubar_entry() {
        let mut ctx = ctx();
        let mut hit = false;

        // Open the menu by clicking its menubar entry.
        ctx.input.begin();
        ctx.input.motion(10.0, 10.0);
        ctx.input.button(Button::Left, 10.0, 10.0, true);
        ctx.input.end();
        let frame = |ctx: &mut Context, hit: &mut bool| -> bool {
            ctx.style
                .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.style
                .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 300.0), WindowFlags::NO_SCROLLBAR);
            ctx.menubar_begin();
            ctx.layout_row_static(20.0, 60.0, 1);
            let open = ctx.menu_begin_text("file", 120.0);
            if open {
                if ctx.menu_item("quit") {
                    *hit = true;
                }
                ctx.menu_end();
            }
            ctx.menubar_end();
            ctx.end();
            ctx.clear();
            open
        };
        frame(&mut ctx, &mut hit);
        ctx.input.begin();
        ctx.input.button(Button::Left, 10.0, 10.0, false);
        ctx.input.end();
        assert!(frame(&mut ctx, &mut hit));
        assert!(!hit);
    }
}
