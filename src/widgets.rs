//! Built-in widgets: acquisition of row space, interaction, drawing.
//!
//! Every widget follows the same shape: take the next rectangle from the
//! layout cursor, decide interactivity from the widget state, read the
//! input snapshot, and append primitives to the owning window's command
//! buffer. Widgets hold no state of their own; anything persistent lives
//! with the caller or on the window record.

use crate::color::Color;
use crate::command::Image;
use crate::context::Context;
use crate::edit::{EditBox, Filter};
use crate::input::{Button, Key};
use crate::math::{clamp, Rect, Vector2};
use crate::style::{StyleColor, StyleProperty, StyleRounding};

/// Visibility/interactivity of a widget's rectangle this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Zero-sized, clipped away or in a hidden window: skip drawing too.
    Invalid,
    Valid,
    /// Draw but never interact (unfocused window, popup open above).
    Rom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Centered,
    Right,
}

/// Header symbols drawable without a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    X,
    Plus,
    Minus,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Circle,
    Rect,
}

impl Context {
    /// Takes the next widget rectangle and classifies it. Public so custom
    /// caller-side widgets compose with the built-in ones.
    pub fn widget(&mut self) -> (Rect, WidgetState) {
        let bounds = self.alloc_space();
        let Some(layout) = self.layouts.last() else {
            return (bounds, WidgetState::Invalid);
        };
        if layout.hidden || bounds.w <= 0.0 || bounds.h <= 0.0 || !layout.clip.intersects(&bounds)
        {
            (bounds, WidgetState::Invalid)
        } else if layout.rom {
            (bounds, WidgetState::Rom)
        } else {
            (bounds, WidgetState::Valid)
        }
    }

    /// Consumes `columns` widget slots without drawing anything.
    pub fn spacing(&mut self, columns: u32) {
        for _ in 0..columns {
            self.alloc_space();
        }
    }

    /// Horizontal rule through the next widget slot.
    pub fn seperator(&mut self) {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return;
        }
        let color = self.style.color(StyleColor::Border);
        let y = bounds.y + bounds.h * 0.5;
        if let Some(buffer) = self.buffer_mut() {
            buffer.line(Vector2::new(bounds.x, y), Vector2::new(bounds.x + bounds.w, y), color);
        }
    }

    // ===============================================================
    //
    //                          TEXT
    //
    // ===============================================================

    pub(crate) fn draw_text(
        &mut self,
        bounds: Rect,
        text: &str,
        align: TextAlign,
        background: Color,
        foreground: Color,
    ) {
        let font = self.style.font.clone();
        let height = self.style.font_height;
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let text_width = font.width(height, text);
        let inner = bounds.pad(item_padding);
        let x = match align {
            TextAlign::Left => inner.x,
            TextAlign::Centered => inner.x + ((inner.w - text_width) * 0.5).max(0.0),
            TextAlign::Right => inner.x + (inner.w - text_width).max(0.0),
        };
        let rect = Rect::new(x, inner.y + ((inner.h - height) * 0.5).max(0.0), inner.w, height);
        if let Some(buffer) = self.buffer_mut() {
            buffer.text(rect, text, font, height, background, foreground);
        }
    }

    pub fn text_colored(&mut self, text: &str, align: TextAlign, color: Color) {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return;
        }
        let background = self.style.color(StyleColor::Window);
        self.draw_text(bounds, text, align, background, color);
    }

    pub fn text(&mut self, text: &str, align: TextAlign) {
        let color = self.style.color(StyleColor::Text);
        self.text_colored(text, align, color);
    }

    pub fn label(&mut self, text: &str, align: TextAlign) {
        self.text(text, align);
    }

    pub fn label_colored(&mut self, text: &str, align: TextAlign, color: Color) {
        self.text_colored(text, align, color);
    }

    /// Multi-line text, greedily word-wrapped to the slot width.
    pub fn text_wrap(&mut self, text: &str) {
        let color = self.style.color(StyleColor::Text);
        self.text_wrap_colored(text, color);
    }

    pub fn label_colored_wrap(&mut self, text: &str, color: Color) {
        self.text_wrap_colored(text, color);
    }

    pub fn text_wrap_colored(&mut self, text: &str, color: Color) {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return;
        }
        let font = self.style.font.clone();
        let height = self.style.font_height;
        let spacing = self.style.property(StyleProperty::ItemSpacing);
        let background = self.style.color(StyleColor::Window);

        let mut y = bounds.y;
        let mut line = String::new();
        let mut flush = Vec::new();
        for word in text.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if font.width(height, &candidate) > bounds.w && !line.is_empty() {
                flush.push((Rect::new(bounds.x, y, bounds.w, height), line.clone()));
                y += height + spacing.y;
                line = word.to_string();
            } else {
                line = candidate;
            }
            if y + height > bounds.y + bounds.h {
                break;
            }
        }
        if !line.is_empty() && y + height <= bounds.y + bounds.h {
            flush.push((Rect::new(bounds.x, y, bounds.w, height), line));
        }
        if let Some(buffer) = self.buffer_mut() {
            for (rect, text) in &flush {
                buffer.text(*rect, text, font.clone(), height, background, color);
            }
        }
    }

    // ===============================================================
    //
    //                          BUTTONS
    //
    // ===============================================================

    fn button_background(&self, bounds: Rect, state: WidgetState) -> (Color, bool) {
        let hovering = self.input.is_mouse_hovering_rect(bounds);
        let down = self.input.is_mouse_down(Button::Left);
        let interactive = state == WidgetState::Valid;
        let background = if interactive && hovering && down {
            self.style.color(StyleColor::ButtonActive)
        } else if interactive && hovering {
            self.style.color(StyleColor::ButtonHover)
        } else {
            self.style.color(StyleColor::Button)
        };
        let clicked = interactive && self.input.mouse_clicked(Button::Left, bounds);
        (background, clicked)
    }

    /// Push button with a centered label; true on click release inside.
    pub fn button_text(&mut self, title: &str) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (background, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
        }
        self.draw_text(bounds, title, TextAlign::Centered, background, text_color);
        clicked
    }

    /// Flat color swatch button.
    pub fn button_color(&mut self, color: Color) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (_, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, color);
        }
        clicked
    }

    /// Button showing a geometric symbol instead of text.
    pub fn button_symbol(&mut self, symbol: SymbolType) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (background, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        let color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
        }
        let inner = bounds.shrink(bounds.h * 0.25);
        self.draw_symbol(symbol, inner, color);
        clicked
    }

    /// Button showing an image over the full widget rectangle.
    pub fn button_image(&mut self, image: Image) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (background, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
            buffer.image(bounds.pad(item_padding), image);
        }
        clicked
    }

    /// Labeled button with a symbol cell; `align` places the symbol at the
    /// left or right edge.
    pub fn button_text_symbol(&mut self, symbol: SymbolType, title: &str, align: TextAlign) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (background, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        let text_color = self.style.color(StyleColor::Text);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
        }
        let (cell, text_rect) = icon_cell(bounds, align);
        self.draw_symbol(symbol, cell.shrink(cell.h * 0.25), text_color);
        self.draw_text(text_rect, title, TextAlign::Centered, background, text_color);
        clicked
    }

    /// Labeled button with an image cell; `align` places the image at the
    /// left or right edge.
    pub fn button_text_image(&mut self, image: Image, title: &str, align: TextAlign) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let (background, clicked) = self.button_background(bounds, state);
        let rounding = self.style.rounding(StyleRounding::Button);
        let text_color = self.style.color(StyleColor::Text);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let (cell, text_rect) = icon_cell(bounds, align);
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
            buffer.image(cell.pad(item_padding), image);
        }
        self.draw_text(text_rect, title, TextAlign::Centered, background, text_color);
        clicked
    }

    pub(crate) fn draw_symbol(&mut self, symbol: SymbolType, r: Rect, color: Color) {
        let font = self.style.font.clone();
        let height = self.style.font_height;
        let Some(buffer) = self.buffer_mut() else {
            return;
        };
        match symbol {
            SymbolType::X | SymbolType::Plus | SymbolType::Minus => {
                let glyph = match symbol {
                    SymbolType::X => "x",
                    SymbolType::Plus => "+",
                    _ => "-",
                };
                buffer.text(r, glyph, font, height, Color::rgba(0, 0, 0, 0), color);
            }
            SymbolType::TriangleUp => buffer.triangle(
                Vector2::new(r.x + r.w * 0.5, r.y),
                Vector2::new(r.x + r.w, r.y + r.h),
                Vector2::new(r.x, r.y + r.h),
                color,
            ),
            SymbolType::TriangleDown => buffer.triangle(
                Vector2::new(r.x, r.y),
                Vector2::new(r.x + r.w, r.y),
                Vector2::new(r.x + r.w * 0.5, r.y + r.h),
                color,
            ),
            SymbolType::TriangleLeft => buffer.triangle(
                Vector2::new(r.x + r.w, r.y),
                Vector2::new(r.x + r.w, r.y + r.h),
                Vector2::new(r.x, r.y + r.h * 0.5),
                color,
            ),
            SymbolType::TriangleRight => buffer.triangle(
                Vector2::new(r.x, r.y),
                Vector2::new(r.x + r.w, r.y + r.h * 0.5),
                Vector2::new(r.x, r.y + r.h),
                color,
            ),
            SymbolType::Circle => buffer.circle(r, color),
            SymbolType::Rect => buffer.rect(r, 0.0, color),
        }
    }

    // ===============================================================
    //
    //                          TOGGLES
    //
    // ===============================================================

    fn toggle(&mut self, title: &str, active: bool, radio: bool) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return active;
        }
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let toggle_color = self.style.color(StyleColor::Toggle);
        let hover_color = self.style.color(StyleColor::ToggleHover);
        let cursor_color = self.style.color(StyleColor::ToggleCursor);
        let text_color = self.style.color(StyleColor::Text);
        let background = self.style.color(StyleColor::Window);
        let font = self.style.font.clone();
        let font_height = self.style.font_height;

        let size = bounds.h.min(font_height + item_padding.y);
        let select = Rect::new(bounds.x, bounds.y + (bounds.h - size) * 0.5, size, size);
        let interactive = state == WidgetState::Valid;
        let toggled = interactive && self.input.mouse_clicked(Button::Left, bounds);
        let next = if toggled {
            if radio { true } else { !active }
        } else {
            active
        };
        let hovering = interactive && self.input.is_mouse_hovering_rect(bounds);
        let box_color = if hovering { hover_color } else { toggle_color };
        let cursor = select.shrink(size * 0.25);
        let text_rect = Rect::new(
            select.x + size + item_padding.x,
            bounds.y + (bounds.h - font_height) * 0.5,
            bounds.w - size - item_padding.x,
            font_height,
        );
        if let Some(buffer) = self.buffer_mut() {
            if radio {
                buffer.circle(select, box_color);
                if next {
                    buffer.circle(cursor, cursor_color);
                }
            } else {
                buffer.rect(select, 0.0, box_color);
                if next {
                    buffer.rect(cursor, 0.0, cursor_color);
                }
            }
            buffer.text(text_rect, title, font, font_height, background, text_color);
        }
        next
    }

    /// Checkbox taking and returning the state by value.
    pub fn check(&mut self, title: &str, active: bool) -> bool {
        self.toggle(title, active, false)
    }

    /// Checkbox mutating the state in place; true when it changed.
    pub fn checkbox(&mut self, title: &str, active: &mut bool) -> bool {
        let old = *active;
        *active = self.toggle(title, old, false);
        old != *active
    }

    /// Radio button; returns whether this option is now the selected one.
    pub fn option(&mut self, title: &str, active: bool) -> bool {
        self.toggle(title, active, true)
    }

    /// Radio button mutating the state in place; true when it changed.
    pub fn radio(&mut self, title: &str, active: &mut bool) -> bool {
        let old = *active;
        *active = self.toggle(title, old, true);
        old != *active
    }

    // ===============================================================
    //
    //                          SELECTABLE
    //
    // ===============================================================

    /// Highlightable label toggling on click; true when the value changed.
    pub fn selectable(&mut self, title: &str, align: TextAlign, value: &mut bool) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return false;
        }
        let interactive = state == WidgetState::Valid;
        let clicked = interactive && self.input.mouse_clicked(Button::Left, bounds);
        if clicked {
            *value = !*value;
        }
        let hovering = interactive && self.input.is_mouse_hovering_rect(bounds);
        let background = if *value {
            self.style.color(StyleColor::Selectable)
        } else if hovering {
            self.style.color(StyleColor::SelectableHover)
        } else {
            self.style.color(StyleColor::Window)
        };
        let text_color = if *value {
            self.style.color(StyleColor::SelectableText)
        } else {
            self.style.color(StyleColor::Text)
        };
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, 0.0, background);
        }
        self.draw_text(bounds, title, align, background, text_color);
        clicked
    }

    /// By-value selectable front-end.
    pub fn select(&mut self, title: &str, align: TextAlign, active: bool) -> bool {
        let mut value = active;
        self.selectable(title, align, &mut value);
        value
    }

    // ===============================================================
    //
    //                          SLIDER / PROGRESS
    //
    // ===============================================================

    /// Horizontal slider mutating `value`; true when it changed.
    pub fn slider_float(&mut self, min: f32, value: &mut f32, max: f32, step: f32) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid || max <= min {
            return false;
        }
        let slider_color = self.style.color(StyleColor::Slider);
        let cursor_base = self.style.color(StyleColor::SliderCursor);
        let cursor_hover = self.style.color(StyleColor::SliderCursorHover);
        let cursor_active = self.style.color(StyleColor::SliderCursorActive);
        let rounding = self.style.rounding(StyleRounding::Slider);
        let item_padding = self.style.property(StyleProperty::ItemPadding);

        let old = *value;
        let track = bounds.pad(item_padding);
        let interactive = state == WidgetState::Valid;
        let dragging = interactive
            && self.input.is_mouse_down(Button::Left)
            && self
                .input
                .has_mouse_click_down_in_rect(Button::Left, bounds, true);
        if dragging {
            let ratio = clamp(0.0, (self.input.mouse.pos.x - track.x) / track.w, 1.0);
            let raw = min + ratio * (max - min);
            let stepped = if step > 0.0 { min + ((raw - min) / step).round() * step } else { raw };
            *value = clamp(min, stepped, max);
        }
        *value = clamp(min, *value, max);

        let cursor_w = (track.h).max(8.0);
        let ratio = (*value - min) / (max - min);
        let cursor_x = track.x + ratio * (track.w - cursor_w);
        let cursor = Rect::new(cursor_x, track.y, cursor_w, track.h);
        let hovering = interactive && self.input.is_mouse_hovering_rect(bounds);
        let cursor_color = if dragging {
            cursor_active
        } else if hovering {
            cursor_hover
        } else {
            cursor_base
        };
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(track, rounding, slider_color);
            buffer.rect(cursor, rounding, cursor_color);
        }
        old != *value
    }

    /// By-value slider front-end over [`Context::slider_float`].
    pub fn slide_float(&mut self, min: f32, value: f32, max: f32, step: f32) -> f32 {
        let mut value = value;
        self.slider_float(min, &mut value, max, step);
        value
    }

    /// Integer slider mutating `value`; true when it changed.
    pub fn slider_int(&mut self, min: i32, value: &mut i32, max: i32, step: i32) -> bool {
        let mut v = *value as f32;
        let changed = self.slider_float(min as f32, &mut v, max as f32, step.max(1) as f32);
        *value = v.round() as i32;
        changed
    }

    /// By-value integer slider front-end.
    pub fn slide_int(&mut self, min: i32, value: i32, max: i32, step: i32) -> i32 {
        let mut value = value;
        self.slider_int(min, &mut value, max, step);
        value
    }

    /// Progress bar; with `modifiable` the caller's value follows clicks
    /// and drags. True when the value changed.
    pub fn progress(&mut self, current: &mut usize, max: usize, modifiable: bool) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid || max == 0 {
            return false;
        }
        let background = self.style.color(StyleColor::Progress);
        let cursor_base = self.style.color(StyleColor::ProgressCursor);
        let cursor_hover = self.style.color(StyleColor::ProgressCursorHover);
        let cursor_active = self.style.color(StyleColor::ProgressCursorActive);
        let rounding = self.style.rounding(StyleRounding::Progress);

        let old = *current;
        let interactive = state == WidgetState::Valid && modifiable;
        let dragging = interactive
            && self.input.is_mouse_down(Button::Left)
            && self
                .input
                .has_mouse_click_down_in_rect(Button::Left, bounds, true);
        if dragging {
            let ratio = clamp(0.0, (self.input.mouse.pos.x - bounds.x) / bounds.w, 1.0);
            *current = (ratio * max as f32).round() as usize;
        }
        *current = (*current).min(max);

        let hovering = self.input.is_mouse_hovering_rect(bounds);
        let cursor_color = if dragging {
            cursor_active
        } else if interactive && hovering {
            cursor_hover
        } else {
            cursor_base
        };
        let fill = Rect::new(
            bounds.x,
            bounds.y,
            bounds.w * (*current as f32 / max as f32),
            bounds.h,
        );
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, background);
            buffer.rect(fill, rounding, cursor_color);
        }
        old != *current
    }

    // ===============================================================
    //
    //                          EDIT
    //
    // ===============================================================

    /// Single-line text input over caller-owned [`EditBox`] state. Returns
    /// whether the box is active after this frame.
    pub fn edit_box(&mut self, edit: &mut EditBox) -> bool {
        let (bounds, state) = self.widget();
        if state == WidgetState::Invalid {
            return edit.active;
        }
        let input_color = self.style.color(StyleColor::Input);
        let text_color = self.style.color(StyleColor::InputText);
        let cursor_color = self.style.color(StyleColor::InputCursor);
        let rounding = self.style.rounding(StyleRounding::Input);
        let item_padding = self.style.property(StyleProperty::ItemPadding);
        let font = self.style.font.clone();
        let font_height = self.style.font_height;

        let interactive = state == WidgetState::Valid;
        if interactive && self.input.is_mouse_pressed(Button::Left) {
            edit.active = self.input.is_mouse_hovering_rect(bounds);
        }

        if edit.active && interactive {
            let mut text = [0u8; crate::input::INPUT_MAX];
            let fed = self.input.text();
            let fed_len = fed.len();
            text[..fed_len].copy_from_slice(fed);
            if fed_len > 0 {
                edit.insert_bytes(&text[..fed_len]);
            }
            if self.input.is_key_pressed(Key::Backspace) {
                edit.delete_backward();
            }
            if self.input.is_key_pressed(Key::Del) {
                edit.delete_forward();
            }
            if self.input.is_key_pressed(Key::Left) {
                edit.move_left();
            }
            if self.input.is_key_pressed(Key::Right) {
                edit.move_right();
            }
            if self.input.is_key_pressed(Key::Enter) {
                edit.active = false;
            }
            if self.input.is_key_pressed(Key::Copy) || self.input.is_key_pressed(Key::Cut) {
                let cut = self.input.is_key_pressed(Key::Cut);
                if let Some(mut clipboard) = self.clipboard.take() {
                    let text = if edit.selection.is_empty() {
                        edit.text().to_string()
                    } else {
                        edit.selected_text().to_string()
                    };
                    clipboard.copy(&text);
                    if cut {
                        if edit.selection.is_empty() {
                            edit.clear();
                        } else {
                            edit.delete_backward();
                        }
                    }
                    self.clipboard = Some(clipboard);
                }
            }
            if self.input.is_key_pressed(Key::Paste) {
                if let Some(mut clipboard) = self.clipboard.take() {
                    clipboard.paste(edit);
                    self.clipboard = Some(clipboard);
                }
            }
        }

        let inner = bounds.pad(item_padding);
        let cursor_x = inner.x + font.width(font_height, &edit.text()[..edit.cursor()]);
        let active = edit.active;
        let visible_text_rect = Rect::new(
            inner.x,
            inner.y + ((inner.h - font_height) * 0.5).max(0.0),
            inner.w,
            font_height,
        );
        if let Some(buffer) = self.buffer_mut() {
            buffer.rect(bounds, rounding, input_color);
            buffer.text(
                visible_text_rect,
                edit.text(),
                font,
                font_height,
                input_color,
                text_color,
            );
            if active {
                buffer.line(
                    Vector2::new(cursor_x, inner.y),
                    Vector2::new(cursor_x, inner.y + inner.h),
                    cursor_color,
                );
            }
        }
        edit.active
    }

    /// Convenience front-end over [`Context::edit_box`] for a caller-owned
    /// `String`, with the cursor pinned to the end. Returns whether the
    /// content changed.
    pub fn edit_string(
        &mut self,
        text: &mut String,
        max: usize,
        active: &mut bool,
        filter: Option<Filter>,
    ) -> bool {
        let mut edit = EditBox::new(text.len().max(max).max(1), filter);
        edit.assign(text);
        edit.active = *active;
        self.edit_box(&mut edit);
        *active = edit.active;
        let mut new_text = edit.text().to_string();
        while new_text.len() > max {
            new_text.pop();
        }
        let changed = new_text != *text;
        *text = new_text;
        changed
    }
}

/// Splits a widget rectangle into a square icon cell, placed by `align`,
/// and the remainder for the label.
pub(crate) fn icon_cell(bounds: Rect, align: TextAlign) -> (Rect, Rect) {
    let side = bounds.h;
    match align {
        TextAlign::Right => (
            Rect::new(bounds.x + bounds.w - side, bounds.y, side, side),
            Rect::new(bounds.x, bounds.y, bounds.w - side, bounds.h),
        ),
        _ => (
            Rect::new(bounds.x, bounds.y, side, side),
            Rect::new(bounds.x + side, bounds.y, bounds.w - side, bounds.h),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WindowFlags;
    use crate::font::testing::FixedWidthFont;
    use std::rc::Rc;

    fn ctx() -> Context {
        let mut ctx = Context::new(Rc::new(FixedWidthFont::new(13.0, 7.0)));
        ctx.input.begin();
        ctx.input.end();
        ctx
    }

    fn click(ctx: &mut Context, x: f32, y: f32) {
        ctx.input.begin();
        ctx.input.motion(x, y);
        ctx.input.button(Button::Left, x, y, true);
        ctx.input.end();
        run_noop_frame(ctx);
        ctx.input.begin();
        ctx.input.button(Button::Left, x, y, false);
        ctx.input.end();
    }

    // Interaction tests need the widget rect known up front; widgets are
    // probed at fixed positions inside a chrome-less window.
    fn begin_plain(ctx: &mut Context) {
        ctx.style
            .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.style
            .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
            .unwrap();
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.layout_row_dynamic(30.0, 1);
    }

    fn run_noop_frame(ctx: &mut Context) {
        ctx.begin("w", Rect::new(0.0, 0.0, 300.0, 240.0), WindowFlags::NO_SCROLLBAR);
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn button_fires_on_release_inside() {
        let mut ctx = ctx();
        // Frame 1: no interaction.
        begin_plain(&mut ctx);
        assert!(!ctx.button_text("ok"));
        ctx.end();
        ctx.clear();

        // Press and release inside the first row (0,0)-(300,30).
        click(&mut ctx, 20.0, 10.0);
        begin_plain(&mut ctx);
        assert!(ctx.button_text("ok"));
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn button_ignores_release_outside() {
        let mut ctx = ctx();
        begin_plain(&mut ctx);
        ctx.button_text("ok");
        ctx.end();
        ctx.clear();

        click(&mut ctx, 20.0, 200.0); // below the only row
        begin_plain(&mut ctx);
        assert!(!ctx.button_text("ok"));
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn image_button_fires_and_draws_its_image() {
        let mut ctx = ctx();
        begin_plain(&mut ctx);
        ctx.button_image(Image::id(7));
        ctx.end();
        let drew_image = ctx.commands().any(|c| {
            matches!(&c.kind, crate::command::CommandKind::Image { image, .. }
                if image.handle == crate::command::Handle::Id(7))
        });
        assert!(drew_image);
        ctx.clear();

        click(&mut ctx, 20.0, 10.0);
        begin_plain(&mut ctx);
        assert!(ctx.button_image(Image::id(7)));
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn labeled_symbol_button_fires_on_release_inside() {
        let mut ctx = ctx();
        begin_plain(&mut ctx);
        ctx.button_text_symbol(SymbolType::TriangleRight, "play", TextAlign::Left);
        ctx.end();
        ctx.clear();

        click(&mut ctx, 20.0, 10.0);
        begin_plain(&mut ctx);
        assert!(ctx.button_text_symbol(SymbolType::TriangleRight, "play", TextAlign::Left));
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn icon_cell_follows_alignment() {
        let bounds = Rect::new(10.0, 0.0, 100.0, 20.0);
        let (left_cell, left_text) = icon_cell(bounds, TextAlign::Left);
        assert_eq!(left_cell, Rect::new(10.0, 0.0, 20.0, 20.0));
        assert_eq!(left_text.x, 30.0);
        let (right_cell, right_text) = icon_cell(bounds, TextAlign::Right);
        assert_eq!(right_cell, Rect::new(90.0, 0.0, 20.0, 20.0));
        assert_eq!(right_text.w, 80.0);
    }

    #[test]
    fn wrapped_label_keeps_its_color() {
        let mut ctx = ctx();
        begin_plain(&mut ctx);
        ctx.layout_row_dynamic(60.0, 1);
        ctx.label_colored_wrap("one two three", Color::rgb(200, 10, 10));
        ctx.end();
        let colored = ctx.commands().any(|c| {
            matches!(&c.kind, crate::command::CommandKind::Text { foreground, .. }
                if *foreground == Color::rgb(200, 10, 10))
        });
        assert!(colored);
        ctx.clear();
    }

    #[test]
    fn checkbox_toggles_on_click() {
        let mut ctx = ctx();
        let mut checked = false;
        begin_plain(&mut ctx);
        assert!(!ctx.checkbox("opt", &mut checked));
        ctx.end();
        ctx.clear();

        click(&mut ctx, 10.0, 10.0);
        begin_plain(&mut ctx);
        assert!(ctx.checkbox("opt", &mut checked));
        assert!(checked);
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn slider_tracks_horizontal_drag() {
        let mut ctx = ctx();
        let mut value = 0.0f32;
        // Press inside the slider and hold with the mouse at 50%.
        ctx.input.begin();
        ctx.input.motion(150.0, 10.0);
        ctx.input.button(Button::Left, 150.0, 10.0, true);
        ctx.input.end();
        begin_plain(&mut ctx);
        ctx.style
            .push_property(StyleProperty::ItemPadding, Vector2::new(0.0, 0.0))
            .unwrap();
        let changed = ctx.slider_float(0.0, &mut value, 10.0, 0.5);
        ctx.end();
        ctx.clear();
        assert!(changed);
        assert_eq!(value, 5.0);
    }

    #[test]
    fn slide_wrappers_match_mutating_variants() {
        let mut ctx = ctx();
        begin_plain(&mut ctx);
        ctx.layout_row_dynamic(30.0, 2);
        let by_value = ctx.slide_float(0.0, 3.0, 10.0, 0.5);
        let mut mutated = 3.0;
        ctx.slider_float(0.0, &mut mutated, 10.0, 0.5);
        ctx.end();
        ctx.clear();
        assert_eq!(by_value, mutated);
    }

    #[test]
    fn slider_clamps_out_of_range_value() {
        let mut ctx = ctx();
        let mut value = 42.0f32;
        begin_plain(&mut ctx);
        ctx.slider_float(0.0, &mut value, 10.0, 1.0);
        ctx.end();
        ctx.clear();
        assert_eq!(value, 10.0);
    }

    #[test]
    fn progress_is_inert_when_not_modifiable() {
        let mut ctx = ctx();
        let mut current = 3usize;
        ctx.input.begin();
        ctx.input.motion(150.0, 10.0);
        ctx.input.button(Button::Left, 150.0, 10.0, true);
        ctx.input.end();
        begin_plain(&mut ctx);
        let changed = ctx.progress(&mut current, 10, false);
        ctx.end();
        ctx.clear();
        assert!(!changed);
        assert_eq!(current, 3);
    }

    #[test]
    fn edit_box_focuses_on_click_and_accepts_text() {
        let mut ctx = ctx();
        let mut edit = EditBox::new(64, None);

        // Click into the edit box row.
        ctx.input.begin();
        ctx.input.motion(20.0, 10.0);
        ctx.input.button(Button::Left, 20.0, 10.0, true);
        ctx.input.end();
        begin_plain(&mut ctx);
        assert!(ctx.edit_box(&mut edit));
        ctx.end();
        ctx.clear();

        // Type into it.
        ctx.input.begin();
        ctx.input.button(Button::Left, 20.0, 10.0, false);
        ctx.input.unicode('h');
        ctx.input.unicode('i');
        ctx.input.end();
        begin_plain(&mut ctx);
        ctx.edit_box(&mut edit);
        ctx.end();
        ctx.clear();
        assert_eq!(edit.text(), "hi");

        // Enter deactivates.
        ctx.input.begin();
        ctx.input.key(Key::Enter, true);
        ctx.input.end();
        begin_plain(&mut ctx);
        assert!(!ctx.edit_box(&mut edit));
        ctx.end();
        ctx.clear();
    }

    #[test]
    fn widgets_in_unfocused_window_do_not_interact() {
        let mut ctx = ctx();
        let bounds = Rect::new(0.0, 0.0, 300.0, 240.0);
        let two_windows = |ctx: &mut Context| -> bool {
            ctx.style
                .push_property(StyleProperty::Padding, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.style
                .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
                .unwrap();
            ctx.begin("w", bounds, WindowFlags::NO_SCROLLBAR);
            ctx.layout_row_dynamic(30.0, 1);
            let clicked = ctx.button_text("ok");
            ctx.end();
            // Overlapping window begun last claims the click focus.
            ctx.begin("top", bounds, WindowFlags::NO_SCROLLBAR);
            ctx.end();
            ctx.clear();
            clicked
        };
        two_windows(&mut ctx);

        ctx.input.begin();
        ctx.input.motion(20.0, 10.0);
        ctx.input.button(Button::Left, 20.0, 10.0, true);
        ctx.input.end();
        two_windows(&mut ctx);
        ctx.input.begin();
        ctx.input.button(Button::Left, 20.0, 10.0, false);
        ctx.input.end();
        assert!(!two_windows(&mut ctx));
    }
}
