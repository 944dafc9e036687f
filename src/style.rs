//! Color/geometry/font configuration with bounded save/restore stacks.
//!
//! Every visual constant widgets read lives in one table so callers can
//! temporarily override a value (`push_*`), draw, and restore (`pop_*`).
//! The four stacks are independent: popping the color stack can never
//! disturb a pushed property, font or font height.

use crate::color::Color;
use crate::errors::StyleError;
use crate::font::UserFontRef;
use crate::math::Vector2;

/// Capacity of each of the four style stacks.
pub const MAX_STYLE_STACK: usize = 32;

/// Slots of the style color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum StyleColor {
    Text,
    TextHovering,
    TextActive,
    Window,
    Header,
    Border,
    Button,
    ButtonHover,
    ButtonActive,
    Toggle,
    ToggleHover,
    ToggleCursor,
    Selectable,
    SelectableHover,
    SelectableText,
    Slider,
    SliderCursor,
    SliderCursorHover,
    SliderCursorActive,
    Progress,
    ProgressCursor,
    ProgressCursorHover,
    ProgressCursorActive,
    Input,
    InputCursor,
    InputText,
    Combo,
    Scrollbar,
    ScrollbarCursor,
    ScrollbarCursorHover,
    ScrollbarCursorActive,
    TabHeader,
    Scaler,
}

pub const COLOR_COUNT: usize = 33;

/// Slots of the geometry property table; each value is a 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum StyleProperty {
    ItemSpacing,
    ItemPadding,
    Padding,
    ScalerSize,
    ScrollbarSize,
    Size,
}

pub const PROPERTY_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum StyleRounding {
    Button,
    Slider,
    Progress,
    Check,
    Input,
    Scrollbar,
}

pub const ROUNDING_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAlign {
    Left,
    Right,
}

/// Window header icon configuration.
#[derive(Debug, Clone, Copy)]
pub struct StyleHeader {
    pub align: HeaderAlign,
    pub close_symbol: char,
    pub minimize_symbol: char,
    pub maximize_symbol: char,
}

impl Default for StyleHeader {
    fn default() -> Self {
        Self {
            align: HeaderAlign::Right,
            close_symbol: 'x',
            minimize_symbol: '-',
            maximize_symbol: '+',
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SavedColor {
    slot: StyleColor,
    value: Color,
}

#[derive(Debug, Clone, Copy)]
struct SavedProperty {
    slot: StyleProperty,
    value: Vector2,
}

struct SavedFont {
    font: UserFontRef,
    height: f32,
}

#[derive(Default)]
struct StyleStack {
    colors: Vec<SavedColor>,
    properties: Vec<SavedProperty>,
    fonts: Vec<SavedFont>,
    font_heights: Vec<f32>,
}

pub struct Style {
    pub font: UserFontRef,
    /// Active font pixel height; starts at the font's natural height.
    pub font_height: f32,
    pub colors: [Color; COLOR_COUNT],
    pub properties: [Vector2; PROPERTY_COUNT],
    pub rounding: [f32; ROUNDING_COUNT],
    pub header: StyleHeader,
    stack: StyleStack,
}

impl Style {
    /// Builds the stock dark theme around the given font.
    pub fn new(font: UserFontRef) -> Self {
        let mut colors = [Color::rgb(45, 45, 45); COLOR_COUNT];
        colors[StyleColor::Text as usize] = Color::rgb(190, 190, 190);
        colors[StyleColor::TextHovering as usize] = Color::rgb(220, 220, 220);
        colors[StyleColor::TextActive as usize] = Color::rgb(240, 240, 240);
        colors[StyleColor::Window as usize] = Color::rgb(40, 40, 40);
        colors[StyleColor::Header as usize] = Color::rgb(30, 30, 30);
        colors[StyleColor::Border as usize] = Color::rgb(65, 65, 65);
        colors[StyleColor::Button as usize] = Color::rgb(50, 50, 50);
        colors[StyleColor::ButtonHover as usize] = Color::rgb(58, 58, 58);
        colors[StyleColor::ButtonActive as usize] = Color::rgb(70, 70, 70);
        colors[StyleColor::Toggle as usize] = Color::rgb(55, 55, 55);
        colors[StyleColor::ToggleHover as usize] = Color::rgb(65, 65, 65);
        colors[StyleColor::ToggleCursor as usize] = Color::rgb(150, 150, 150);
        colors[StyleColor::Selectable as usize] = Color::rgb(50, 50, 50);
        colors[StyleColor::SelectableHover as usize] = Color::rgb(60, 60, 60);
        colors[StyleColor::SelectableText as usize] = Color::rgb(190, 190, 190);
        colors[StyleColor::Slider as usize] = Color::rgb(38, 38, 38);
        colors[StyleColor::SliderCursor as usize] = Color::rgb(100, 100, 100);
        colors[StyleColor::SliderCursorHover as usize] = Color::rgb(120, 120, 120);
        colors[StyleColor::SliderCursorActive as usize] = Color::rgb(150, 150, 150);
        colors[StyleColor::Progress as usize] = Color::rgb(38, 38, 38);
        colors[StyleColor::ProgressCursor as usize] = Color::rgb(100, 100, 100);
        colors[StyleColor::ProgressCursorHover as usize] = Color::rgb(120, 120, 120);
        colors[StyleColor::ProgressCursorActive as usize] = Color::rgb(150, 150, 150);
        colors[StyleColor::Input as usize] = Color::rgb(45, 45, 45);
        colors[StyleColor::InputCursor as usize] = Color::rgb(190, 190, 190);
        colors[StyleColor::InputText as usize] = Color::rgb(190, 190, 190);
        colors[StyleColor::Combo as usize] = Color::rgb(45, 45, 45);
        colors[StyleColor::Scrollbar as usize] = Color::rgb(40, 40, 40);
        colors[StyleColor::ScrollbarCursor as usize] = Color::rgb(80, 80, 80);
        colors[StyleColor::ScrollbarCursorHover as usize] = Color::rgb(100, 100, 100);
        colors[StyleColor::ScrollbarCursorActive as usize] = Color::rgb(120, 120, 120);
        colors[StyleColor::TabHeader as usize] = Color::rgb(48, 48, 48);
        colors[StyleColor::Scaler as usize] = Color::rgb(100, 100, 100);

        let mut properties = [Vector2::default(); PROPERTY_COUNT];
        properties[StyleProperty::ItemSpacing as usize] = Vector2::new(4.0, 4.0);
        properties[StyleProperty::ItemPadding as usize] = Vector2::new(4.0, 4.0);
        properties[StyleProperty::Padding as usize] = Vector2::new(8.0, 4.0);
        properties[StyleProperty::ScalerSize as usize] = Vector2::new(16.0, 16.0);
        properties[StyleProperty::ScrollbarSize as usize] = Vector2::new(10.0, 10.0);
        properties[StyleProperty::Size as usize] = Vector2::new(64.0, 64.0);

        let font_height = font.height();
        Self {
            font,
            font_height,
            colors,
            properties,
            rounding: [0.0; ROUNDING_COUNT],
            header: StyleHeader::default(),
            stack: StyleStack::default(),
        }
    }

    pub fn color(&self, slot: StyleColor) -> Color {
        self.colors[slot as usize]
    }

    pub fn property(&self, slot: StyleProperty) -> Vector2 {
        self.properties[slot as usize]
    }

    pub fn rounding(&self, slot: StyleRounding) -> f32 {
        self.rounding[slot as usize]
    }

    pub fn push_color(&mut self, slot: StyleColor, value: Color) -> Result<(), StyleError> {
        if self.stack.colors.len() >= MAX_STYLE_STACK {
            return Err(StyleError::StackFull(MAX_STYLE_STACK));
        }
        self.stack.colors.push(SavedColor {
            slot,
            value: self.colors[slot as usize],
        });
        self.colors[slot as usize] = value;
        Ok(())
    }

    pub fn pop_color(&mut self) -> Result<(), StyleError> {
        let saved = self.stack.colors.pop().ok_or(StyleError::StackEmpty)?;
        self.colors[saved.slot as usize] = saved.value;
        Ok(())
    }

    pub fn push_property(&mut self, slot: StyleProperty, value: Vector2) -> Result<(), StyleError> {
        if self.stack.properties.len() >= MAX_STYLE_STACK {
            return Err(StyleError::StackFull(MAX_STYLE_STACK));
        }
        self.stack.properties.push(SavedProperty {
            slot,
            value: self.properties[slot as usize],
        });
        self.properties[slot as usize] = value;
        Ok(())
    }

    pub fn pop_property(&mut self) -> Result<(), StyleError> {
        let saved = self.stack.properties.pop().ok_or(StyleError::StackEmpty)?;
        self.properties[saved.slot as usize] = saved.value;
        Ok(())
    }

    /// Swaps in another font, saving the current font together with the
    /// active height so a pop restores both.
    pub fn push_font(&mut self, font: UserFontRef) -> Result<(), StyleError> {
        if self.stack.fonts.len() >= MAX_STYLE_STACK {
            return Err(StyleError::StackFull(MAX_STYLE_STACK));
        }
        self.stack.fonts.push(SavedFont {
            font: self.font.clone(),
            height: self.font_height,
        });
        self.font_height = font.height();
        self.font = font;
        Ok(())
    }

    pub fn pop_font(&mut self) -> Result<(), StyleError> {
        let saved = self.stack.fonts.pop().ok_or(StyleError::StackEmpty)?;
        self.font = saved.font;
        self.font_height = saved.height;
        Ok(())
    }

    pub fn push_font_height(&mut self, height: f32) -> Result<(), StyleError> {
        if self.stack.font_heights.len() >= MAX_STYLE_STACK {
            return Err(StyleError::StackFull(MAX_STYLE_STACK));
        }
        self.stack.font_heights.push(self.font_height);
        self.font_height = height;
        Ok(())
    }

    pub fn pop_font_height(&mut self) -> Result<(), StyleError> {
        self.font_height = self.stack.font_heights.pop().ok_or(StyleError::StackEmpty)?;
        Ok(())
    }

    /// Drains the color stack restoring saved values in reverse order.
    /// Returns how many entries were left behind by the caller.
    pub fn reset_colors(&mut self) -> usize {
        let leftover = self.stack.colors.len();
        while self.pop_color().is_ok() {}
        leftover
    }

    pub fn reset_properties(&mut self) -> usize {
        let leftover = self.stack.properties.len();
        while self.pop_property().is_ok() {}
        leftover
    }

    pub fn reset_font(&mut self) -> usize {
        let leftover = self.stack.fonts.len();
        while self.pop_font().is_ok() {}
        leftover
    }

    pub fn reset_font_height(&mut self) -> usize {
        let leftover = self.stack.font_heights.len();
        while self.pop_font_height().is_ok() {}
        leftover
    }

    /// Frame-end safety net: drains all four stacks so a missing pop
    /// cannot corrupt the next frame's visuals. Returns the total number
    /// of leftover entries, which is a caller error worth reporting.
    pub fn reset_all(&mut self) -> usize {
        self.reset_colors()
            + self.reset_properties()
            + self.reset_font()
            + self.reset_font_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::FixedWidthFont;
    use std::rc::Rc;

    fn style() -> Style {
        Style::new(Rc::new(FixedWidthFont::new(13.0, 7.0)))
    }

    #[test]
    fn colors_restore_in_reverse_order() {
        let mut style = style();
        let original = style.color(StyleColor::Text);
        style.push_color(StyleColor::Text, Color::rgb(1, 0, 0)).unwrap();
        style.push_color(StyleColor::Text, Color::rgb(2, 0, 0)).unwrap();
        style.push_color(StyleColor::Text, Color::rgb(3, 0, 0)).unwrap();
        style.pop_color().unwrap();
        assert_eq!(style.color(StyleColor::Text), Color::rgb(2, 0, 0));
        style.pop_color().unwrap();
        assert_eq!(style.color(StyleColor::Text), Color::rgb(1, 0, 0));
        style.pop_color().unwrap();
        assert_eq!(style.color(StyleColor::Text), original);
    }

    #[test]
    fn pop_empty_is_reported() {
        let mut style = style();
        assert_eq!(style.pop_color(), Err(StyleError::StackEmpty));
        assert_eq!(style.pop_property(), Err(StyleError::StackEmpty));
        assert_eq!(style.pop_font(), Err(StyleError::StackEmpty));
        assert_eq!(style.pop_font_height(), Err(StyleError::StackEmpty));
    }

    #[test]
    fn push_past_capacity_is_an_error() {
        let mut style = style();
        for _ in 0..MAX_STYLE_STACK {
            style.push_font_height(20.0).unwrap();
        }
        assert_eq!(
            style.push_font_height(20.0),
            Err(StyleError::StackFull(MAX_STYLE_STACK))
        );
    }

    #[test]
    fn stacks_are_independent() {
        let mut style = style();
        let original_spacing = style.property(StyleProperty::ItemSpacing);
        style.push_color(StyleColor::Window, Color::rgb(9, 9, 9)).unwrap();
        style
            .push_property(StyleProperty::ItemSpacing, Vector2::new(0.0, 0.0))
            .unwrap();
        // Popping the color stack leaves the property override alone.
        style.pop_color().unwrap();
        assert_eq!(style.property(StyleProperty::ItemSpacing), Vector2::new(0.0, 0.0));
        style.pop_property().unwrap();
        assert_eq!(style.property(StyleProperty::ItemSpacing), original_spacing);
    }

    #[test]
    fn reset_reports_leftovers() {
        let mut style = style();
        style.push_color(StyleColor::Text, Color::rgb(1, 2, 3)).unwrap();
        style.push_font_height(30.0).unwrap();
        assert_eq!(style.reset_all(), 2);
        assert_eq!(style.reset_all(), 0);
    }

    #[test]
    fn pop_font_restores_height() {
        let mut style = style();
        let other = Rc::new(FixedWidthFont::new(22.0, 9.0));
        style.push_font(other).unwrap();
        assert_eq!(style.font_height, 22.0);
        style.pop_font().unwrap();
        assert_eq!(style.font_height, 13.0);
    }
}
