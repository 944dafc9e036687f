//! Double-buffered per-frame device snapshot.
//!
//! The platform layer brackets its event feed with [`Input::begin`] and
//! [`Input::end`] once per frame; widgets only ever read the finished
//! snapshot through the pure query functions.

use crate::math::{Rect, Vector2};
use crate::utf8;

/// Maximum bytes of UTF-8 text input accepted per frame; excess is dropped,
/// never buffered into the next frame.
pub const INPUT_MAX: usize = 16;

/// Logical keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Key {
    Shift,
    Del,
    Enter,
    Tab,
    Backspace,
    Copy,
    Cut,
    Paste,
    Left,
    Right,
}

pub(crate) const KEY_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Button {
    Left,
    Middle,
    Right,
}

pub(crate) const BUTTON_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct MouseButton {
    pub down: bool,
    /// Number of down-state transitions this frame.
    pub clicked: u32,
    /// Mouse position latched at the most recent transition.
    pub clicked_pos: Vector2,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mouse {
    pub buttons: [MouseButton; BUTTON_COUNT],
    pub pos: Vector2,
    /// Position at the previous frame's end.
    pub prev: Vector2,
    /// Travel distance between the previous and current frame.
    pub delta: Vector2,
    pub scroll_delta: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    pub down: bool,
    pub clicked: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Keyboard {
    pub keys: [KeyState; KEY_COUNT],
    text: [u8; INPUT_MAX],
    text_len: usize,
}

impl Keyboard {
    pub fn text(&self) -> &[u8] {
        &self.text[..self.text_len]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Input {
    pub keyboard: Keyboard,
    pub mouse: Mouse,
}

impl Input {
    /// Starts a new frame of event recording: transition counts and the
    /// text buffer reset, the current mouse position becomes "previous".
    pub fn begin(&mut self) {
        for button in &mut self.mouse.buttons {
            button.clicked = 0;
        }
        for key in &mut self.keyboard.keys {
            key.clicked = 0;
        }
        self.keyboard.text_len = 0;
        self.mouse.scroll_delta = 0.0;
        self.mouse.prev = self.mouse.pos;
        self.mouse.delta = Vector2::default();
    }

    /// Finishes the frame's event recording, deriving the motion delta.
    pub fn end(&mut self) {
        self.mouse.delta = self.mouse.pos - self.mouse.prev;
    }

    pub fn motion(&mut self, x: f32, y: f32) {
        self.mouse.pos = Vector2::new(x, y);
    }

    pub fn key(&mut self, key: Key, down: bool) {
        let state = &mut self.keyboard.keys[key as usize];
        if state.down != down {
            state.clicked += 1;
        }
        state.down = down;
    }

    pub fn button(&mut self, button: Button, x: f32, y: f32, down: bool) {
        let state = &mut self.mouse.buttons[button as usize];
        if state.down != down {
            state.clicked_pos = Vector2::new(x, y);
            state.clicked += 1;
        }
        state.down = down;
    }

    pub fn scroll(&mut self, delta: f32) {
        self.mouse.scroll_delta += delta;
    }

    /// Appends one codepoint to the frame's text buffer. Input past
    /// [`INPUT_MAX`] bytes is dropped.
    pub fn unicode(&mut self, codepoint: char) {
        let len = self.keyboard.text_len;
        let written = utf8::encode(codepoint, &mut self.keyboard.text[len..]);
        self.keyboard.text_len += written;
    }

    /// ASCII byte feed. Bytes past 0x7F are fragments of a multibyte
    /// sequence, not codepoints, and are dropped; use [`Input::unicode`]
    /// or [`Input::glyph`] for non-ASCII text.
    pub fn char(&mut self, c: u8) {
        if c.is_ascii() {
            self.unicode(c as char);
        }
    }

    pub fn glyph(&mut self, glyph: &[u8]) {
        let (codepoint, n) = utf8::decode(glyph);
        if n > 0 {
            self.unicode(codepoint);
        }
    }

    // --- queries, pure functions of the snapshot ---

    pub fn is_mouse_down(&self, button: Button) -> bool {
        self.mouse.buttons[button as usize].down
    }

    /// True iff the button transitioned to down this frame.
    pub fn is_mouse_pressed(&self, button: Button) -> bool {
        let b = &self.mouse.buttons[button as usize];
        b.down && b.clicked > 0
    }

    /// True iff the button transitioned to up this frame.
    pub fn is_mouse_released(&self, button: Button) -> bool {
        let b = &self.mouse.buttons[button as usize];
        !b.down && b.clicked > 0
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keyboard.keys[key as usize].down
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        let k = &self.keyboard.keys[key as usize];
        k.down && k.clicked > 0
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        let k = &self.keyboard.keys[key as usize];
        !k.down && k.clicked > 0
    }

    pub fn is_mouse_hovering_rect(&self, rect: Rect) -> bool {
        rect.contains(self.mouse.pos)
    }

    pub fn is_mouse_prev_hovering_rect(&self, rect: Rect) -> bool {
        rect.contains(self.mouse.prev)
    }

    /// True iff the button changed state this frame with the transition
    /// position inside `rect`.
    pub fn has_mouse_click_in_rect(&self, button: Button, rect: Rect) -> bool {
        let b = &self.mouse.buttons[button as usize];
        b.clicked > 0 && rect.contains(b.clicked_pos)
    }

    pub fn has_mouse_click_down_in_rect(&self, button: Button, rect: Rect, down: bool) -> bool {
        let b = &self.mouse.buttons[button as usize];
        self.has_mouse_click_in_rect(button, rect) && b.down == down
    }

    pub fn is_mouse_click_in_rect(&self, button: Button, rect: Rect) -> bool {
        self.has_mouse_click_down_in_rect(button, rect, false)
    }

    pub fn any_mouse_click_in_rect(&self, rect: Rect) -> bool {
        [Button::Left, Button::Middle, Button::Right]
            .into_iter()
            .any(|b| self.has_mouse_click_in_rect(b, rect))
    }

    /// Hovering and clicked this frame.
    pub fn mouse_clicked(&self, button: Button, rect: Rect) -> bool {
        self.is_mouse_hovering_rect(rect) && self.is_mouse_click_in_rect(button, rect)
    }

    pub fn text(&self) -> &[u8] {
        self.keyboard.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_triggers_fire_on_transition_frames_only() {
        let mut input = Input::default();

        // frame 1: up
        input.begin();
        input.end();
        assert!(!input.is_mouse_pressed(Button::Left));
        assert!(!input.is_mouse_released(Button::Left));

        // frame 2: down
        input.begin();
        input.button(Button::Left, 5.0, 5.0, true);
        input.end();
        assert!(input.is_mouse_pressed(Button::Left));
        assert!(!input.is_mouse_released(Button::Left));

        // frame 3: still down, no event
        input.begin();
        input.end();
        assert!(input.is_mouse_down(Button::Left));
        assert!(!input.is_mouse_pressed(Button::Left));
        assert!(!input.is_mouse_released(Button::Left));

        // frame 4: up
        input.begin();
        input.button(Button::Left, 5.0, 5.0, false);
        input.end();
        assert!(!input.is_mouse_pressed(Button::Left));
        assert!(input.is_mouse_released(Button::Left));
    }

    #[test]
    fn click_position_latched_at_transition() {
        let mut input = Input::default();
        input.begin();
        input.button(Button::Left, 10.0, 20.0, true);
        input.motion(90.0, 90.0);
        input.end();
        assert!(input.has_mouse_click_in_rect(Button::Left, Rect::new(0.0, 0.0, 30.0, 30.0)));
        assert!(!input.has_mouse_click_in_rect(Button::Left, Rect::new(80.0, 80.0, 30.0, 30.0)));
    }

    #[test]
    fn text_input_capped_per_frame() {
        let mut input = Input::default();
        input.begin();
        for _ in 0..INPUT_MAX + 4 {
            input.unicode('x');
        }
        input.end();
        assert_eq!(input.text().len(), INPUT_MAX);

        // Dropped input does not leak into the next frame.
        input.begin();
        input.end();
        assert!(input.text().is_empty());
    }

    #[test]
    fn multibyte_text_never_splits() {
        let mut input = Input::default();
        input.begin();
        for _ in 0..5 {
            input.unicode('€'); // 3 bytes each
        }
        input.end();
        // 5 * 3 = 15 fits, a sixth would not and must be dropped whole.
        input.unicode('€');
        assert_eq!(input.text().len(), 15);
    }

    #[test]
    fn char_feed_accepts_ascii_only() {
        let mut input = Input::default();
        input.begin();
        input.char(b'a');
        input.char(0xC3); // lead byte of a multibyte sequence, not a codepoint
        input.char(b'b');
        input.end();
        assert_eq!(input.text(), b"ab");
    }

    #[test]
    fn motion_delta_computed_at_end() {
        let mut input = Input::default();
        input.motion(10.0, 10.0);
        input.begin();
        input.motion(25.0, 18.0);
        input.end();
        assert_eq!(input.mouse.delta, Vector2::new(15.0, 8.0));
    }
}
