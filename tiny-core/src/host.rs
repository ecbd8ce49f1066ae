//! The host windowing contract consumed by the presentation core.
//!
//! A [`Host`] wraps the native windowing system (Win32 in production,
//! [`MockHost`](crate::mock::MockHost) in tests). The core never calls
//! native APIs directly; it drives a host through this trait and keeps
//! all policy (liveness, close handling, pixel conversion) on its side.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

// ── Geometry ─────────────────────────────────────────────────────

/// A rectangle in screen or client coordinates (right/bottom exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rectangle of the given size anchored at the origin.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// A `width × height` rectangle centred on a `screen` of the given size.
    ///
    /// Windows larger than the screen get a negative origin. Arithmetic is
    /// done in `i64` and saturates at the `i32` bounds.
    pub fn centered(screen: (i32, i32), width: i32, height: i32) -> Self {
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let (sw, sh) = (i64::from(screen.0), i64::from(screen.1));
        let (w, h) = (i64::from(width), i64::from(height));
        let left = (sw - w) / 2;
        let top = (sh - h) / 2;
        Self::new(clamp(left), clamp(top), clamp(left + w), clamp(top + h))
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

// ── Window class / style ─────────────────────────────────────────

/// Registration parameters for the process-wide window class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClass {
    pub name: &'static str,
    /// Repaint the whole client area on horizontal/vertical resize.
    pub redraw_on_resize: bool,
    /// Give each window its own private device context.
    pub own_context: bool,
}

impl WindowClass {
    /// The class every Tiny surface is created from.
    pub const TINY: WindowClass = WindowClass {
        name: "TinyRTSClass",
        redraw_on_resize: true,
        own_context: true,
    };
}

/// Decorations requested for a surface window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyle {
    pub caption: bool,
    pub system_menu: bool,
    pub minimize_box: bool,
}

impl WindowStyle {
    /// Caption, system menu and minimise box; not resizable.
    pub const FIXED: WindowStyle = WindowStyle {
        caption: true,
        system_menu: true,
        minimize_box: true,
    };
}

// ── Bitmap descriptor ────────────────────────────────────────────

/// Pixel storage of a [`BitmapInfo`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw pixels, no palette or bit masks (`BI_RGB`).
    Uncompressed,
}

/// Describes the pixel buffer handed to [`Host::stretch_blit`].
///
/// Always 32 bits per pixel, uncompressed BGRA, rows top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfo {
    pub width: u32,
    pub height: u32,
    pub bit_count: u16,
    pub compression: Compression,
    /// First row in memory is the top row of the image.
    pub top_down: bool,
}

impl BitmapInfo {
    pub const fn bgra32(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_count: 32,
            compression: Compression::Uncompressed,
            top_down: true,
        }
    }

    /// Byte length of a buffer this descriptor covers.
    pub const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * (self.bit_count as usize / 8)
    }
}

// ── Messages ─────────────────────────────────────────────────────

/// Host messages the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// The user asked the window to close (X button, Alt-F4).
    Close,
    /// The window is being destroyed.
    Destroy,
    /// Anything else, identified by its native message id.
    Other(u32),
}

/// What the host must do after the core handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// Destroy the window; this produces a [`WindowMessage::Destroy`].
    DestroyWindow,
    /// The core consumed the message.
    Handled,
    /// Defer to the host's default handling.
    Default,
}

// ── WindowState ──────────────────────────────────────────────────

/// Per-window state reachable from the host's message dispatch.
///
/// The host binds one of these to each native window (through the
/// window's user-data slot, or a side table keyed by handle) and routes
/// every dispatched message to [`on_message`](Self::on_message).
#[derive(Debug)]
pub struct WindowState {
    alive: Cell<bool>,
}

impl WindowState {
    pub fn new() -> Self {
        Self {
            alive: Cell::new(true),
        }
    }

    /// `false` once a destroy notification has been observed. Never resets.
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// The window message handler.
    ///
    /// Close and destroy are distinct: a close request only asks the host
    /// to destroy the window, and the liveness flag drops when the
    /// resulting destroy notification arrives.
    pub fn on_message(&self, message: WindowMessage) -> MessageAction {
        match message {
            WindowMessage::Close => MessageAction::DestroyWindow,
            WindowMessage::Destroy => {
                if self.alive.replace(false) {
                    tracing::debug!("destroy notification received");
                }
                MessageAction::Handled
            }
            WindowMessage::Other(_) => MessageAction::Default,
        }
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Host trait ───────────────────────────────────────────────────

/// Native windowing capabilities required by [`Surface`](crate::surface::Surface).
///
/// Every method must be called from the thread that owns the
/// [`Platform`](crate::platform::Platform) wrapping this host.
pub trait Host {
    /// Opaque native window handle.
    type Window: Copy + Eq + fmt::Debug;
    /// Opaque drawing context handle.
    type Context: Copy + fmt::Debug;

    /// Register `class`, loading its icon, cursor and background brush.
    fn register_class(&self, class: &WindowClass) -> Result<()>;

    /// Width and height of the primary display.
    fn screen_size(&self) -> (i32, i32);

    /// Grow a client rectangle to the outer window rectangle for `style`.
    fn adjust_window_rect(&self, client: Rect, style: WindowStyle) -> Result<Rect>;

    /// Create a hidden window and bind `state` to it for message dispatch.
    fn create_window(
        &self,
        class: &WindowClass,
        title: &str,
        frame: Rect,
        style: WindowStyle,
        state: Rc<WindowState>,
    ) -> Result<Self::Window>;

    fn show_window(&self, window: Self::Window, visible: bool);

    /// Dispatch every queued message without blocking, then return.
    fn drain_messages(&self);

    /// Destroy `window`, delivering its destroy notification.
    fn destroy_window(&self, window: Self::Window) -> Result<()>;

    fn acquire_context(&self, window: Self::Window) -> Result<Self::Context>;

    /// Best-effort; never fails.
    fn release_context(&self, window: Self::Window, context: Self::Context);

    /// Stretch `pixels` (described by `info`) onto `dest` of the context.
    fn stretch_blit(
        &self,
        context: Self::Context,
        dest: Rect,
        info: &BitmapInfo,
        pixels: &[u8],
    ) -> Result<()>;
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_on_primary_display() {
        let rc = Rect::centered((1920, 1080), 960, 600);
        assert_eq!(rc, Rect::new(480, 240, 1440, 840));
        assert_eq!((rc.width(), rc.height()), (960, 600));
    }

    #[test]
    fn oversized_window_gets_negative_origin() {
        let rc = Rect::centered((800, 600), 1000, 700);
        assert_eq!((rc.left, rc.top), (-100, -50));
        assert_eq!((rc.width(), rc.height()), (1000, 700));
    }

    #[test]
    fn largest_window_keeps_its_size() {
        let rc = Rect::centered((1920, 1080), i32::MAX, 600);
        assert_eq!(rc.width(), i32::MAX);
        assert!(rc.left < 0);
    }

    #[test]
    fn bitmap_info_is_32bpp() {
        let info = BitmapInfo::bgra32(320, 200);
        assert_eq!(info.bit_count, 32);
        assert_eq!(info.compression, Compression::Uncompressed);
        assert!(info.top_down);
        assert_eq!(info.byte_len(), 320 * 200 * 4);
    }

    #[test]
    fn close_requests_destroy_without_dropping_liveness() {
        let state = WindowState::new();
        assert_eq!(state.on_message(WindowMessage::Close), MessageAction::DestroyWindow);
        assert!(state.is_alive());
    }

    #[test]
    fn destroy_clears_liveness_for_good() {
        let state = WindowState::new();
        assert_eq!(state.on_message(WindowMessage::Destroy), MessageAction::Handled);
        assert!(!state.is_alive());

        state.on_message(WindowMessage::Other(0x000F));
        state.on_message(WindowMessage::Destroy);
        assert!(!state.is_alive());
    }

    #[test]
    fn unknown_messages_defer_to_host() {
        let state = WindowState::new();
        assert_eq!(state.on_message(WindowMessage::Other(0x0200)), MessageAction::Default);
        assert!(state.is_alive());
    }
}
