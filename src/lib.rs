//! Render-backend-agnostic immediate mode GUI core.
//!
//! Widgets are plain function calls made every frame; the library keeps no
//! retained widget tree. Each window records draw primitives into a command
//! buffer the caller replays with whatever renderer it has, so the crate
//! never touches a GPU, a window system or an input device itself.
//!
//! A frame looks like this:
//!
//! ```no_run
//! # use kog::{Context, Rect, WindowFlags};
//! # fn frame(ctx: &mut Context, checked: &mut bool) {
//! ctx.input.begin();
//! // feed mouse/keyboard events here
//! ctx.input.end();
//!
//! if ctx.begin("demo", Rect::new(50.0, 50.0, 220.0, 200.0), WindowFlags::TITLE) {
//!     ctx.layout_row_dynamic(30.0, 1);
//!     if ctx.button_text("press me") {
//!         // reacted the same frame it happened
//!     }
//!     ctx.checkbox("option", checked);
//! }
//! ctx.end();
//!
//! for command in ctx.commands() {
//!     // hand each primitive to the renderer
//! }
//! ctx.clear();
//! # }
//! ```
//!
//! Text rendering goes through the [`font::UserFont`] capability trait; the
//! [`font`] module can also bake TTF data into a single atlas texture for
//! renderers that want one. The [`draw`] module optionally tessellates the
//! command stream into anti-aliased vertex/index buffers.

pub mod buffer;
pub mod color;
pub mod command;
pub mod context;
pub mod draw;
pub mod edit;
pub mod errors;
pub mod font;
pub mod input;
pub mod layout;
pub mod math;
pub mod popup;
pub mod style;
pub mod utf8;
pub mod widgets;

pub use buffer::{Allocator, Buffer, BufferSide, MemoryStatus};
pub use color::Color;
pub use command::{Command, CommandBuffer, CommandKind, Handle, Image};
pub use context::{Context, Diagnostics, WindowFlags};
pub use draw::{DrawBatch, DrawList, DrawVertex, NullTexture};
pub use edit::{Clipboard, EditBox, Filter};
pub use errors::{FontError, StyleError};
pub use font::{Font, FontConfig, UserFont, UserFontGlyph, UserFontRef};
pub use input::{Button, Input, Key};
pub use layout::{LayoutFormat, TreeType};
pub use math::{Rect, Recti, Vector2};
pub use popup::PopupKind;
pub use style::{Style, StyleColor, StyleProperty, StyleRounding};
pub use widgets::{SymbolType, TextAlign, WidgetState};
