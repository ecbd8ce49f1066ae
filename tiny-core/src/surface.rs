//! A native window bound to a presentation scratch buffer.
//!
//! Lifecycle: `Created → Shown → Closed`. The transition to `Closed` is
//! driven by the host's destroy notification, observed by [`Surface::pump`].
//!
//! Presentation converts the caller's RGBA framebuffer into the surface's
//! BGRA scratch buffer and stretch-blits it onto the physical client
//! rectangle at the configured integer scale.

use std::rc::Rc;

use tracing::{info, warn};

use crate::config::SurfaceConfig;
use crate::error::{Result, TinyError};
use crate::host::{BitmapInfo, Host, Rect, WindowState, WindowStyle};
use crate::pixel::{Framebuffer, ScratchBuffer, convert_rgba_to_bgra};
use crate::platform::Platform;

/// Lifecycle phase of a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    /// Window exists but has never been shown.
    Created,
    /// Window has been shown and is receiving messages.
    Shown,
    /// Destroy notification observed. Terminal.
    Closed,
}

/// One on-screen window plus its presentation state.
///
/// Holds an `Rc` to its [`WindowState`], so a surface never leaves the
/// thread it was created on.
pub struct Surface<'p, H: Host> {
    platform: &'p Platform<H>,
    window: H::Window,
    state: Rc<WindowState>,
    config: SurfaceConfig,
    physical: (i32, i32),
    phase: SurfacePhase,
    visible: bool,
    scratch: ScratchBuffer,
}

impl<'p, H: Host> Surface<'p, H> {
    /// Create a hidden window sized `width·scale × height·scale`, centred on
    /// the primary display.
    pub fn create(platform: &'p Platform<H>, config: SurfaceConfig) -> Result<Self> {
        let config = config.normalized();
        let (width, height) = config.physical_size()?;
        let class = platform.ensure_class()?;
        let host = platform.host();

        let client = Rect::centered(host.screen_size(), width, height);
        let frame = host.adjust_window_rect(client, WindowStyle::FIXED)?;

        let state = Rc::new(WindowState::new());
        let window = host.create_window(
            class,
            &config.title,
            frame,
            WindowStyle::FIXED,
            Rc::clone(&state),
        )?;

        info!(
            title = %config.title,
            logical = ?(config.width, config.height),
            scale = config.scale,
            physical = ?(width, height),
            "surface created"
        );

        Ok(Self {
            platform,
            window,
            state,
            config,
            physical: (width, height),
            phase: SurfacePhase::Created,
            visible: false,
            scratch: ScratchBuffer::new(),
        })
    }

    /// Make the window visible. No-op if it already is.
    pub fn show(&mut self) {
        if self.phase == SurfacePhase::Closed {
            warn!("show() on a closed surface ignored");
            return;
        }
        if self.visible {
            return;
        }
        self.platform.host().show_window(self.window, true);
        self.visible = true;
        if self.phase == SurfacePhase::Created {
            self.phase = SurfacePhase::Shown;
            info!(title = %self.config.title, "surface shown");
        }
    }

    /// Hide the window. No-op if it is already hidden.
    pub fn hide(&mut self) {
        if self.phase == SurfacePhase::Closed {
            warn!("hide() on a closed surface ignored");
            return;
        }
        if !self.visible {
            return;
        }
        self.platform.host().show_window(self.window, false);
        self.visible = false;
    }

    /// Drain pending host messages without blocking and report liveness.
    ///
    /// Returns `false` from the moment a destroy notification has been
    /// observed, and on every call after that.
    pub fn pump(&mut self) -> bool {
        if self.phase == SurfacePhase::Closed {
            return false;
        }
        self.platform.host().drain_messages();
        if !self.state.is_alive() {
            self.phase = SurfacePhase::Closed;
            self.visible = false;
            info!(title = %self.config.title, "surface closed");
            return false;
        }
        true
    }

    /// Convert `frame` to BGRA and stretch it over the physical client area.
    ///
    /// The drawing context is released exactly once, whether or not the
    /// blit succeeds.
    pub fn present(&mut self, frame: &Framebuffer) -> Result<()> {
        if self.phase == SurfacePhase::Closed || !self.state.is_alive() {
            return Err(TinyError::SurfaceClosed);
        }
        let host = self.platform.host();
        let context = ContextGuard::acquire(host, self.window)?;

        let pixels = self.scratch.prepare(frame.pixel_count());
        convert_rgba_to_bgra(frame.pixels(), pixels);

        let info = BitmapInfo::bgra32(frame.width(), frame.height());
        let dest = Rect::from_size(self.physical.0, self.physical.1);
        host.stretch_blit(context.context, dest, &info, self.scratch.as_bytes())
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn window(&self) -> H::Window {
        self.window
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Client size in screen pixels (logical size × scale).
    pub fn physical_size(&self) -> (i32, i32) {
        self.physical
    }

    pub fn scale(&self) -> u32 {
        self.config.scale
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }
}

impl<H: Host> Drop for Surface<'_, H> {
    fn drop(&mut self) {
        if self.state.is_alive() {
            if let Err(e) = self.platform.host().destroy_window(self.window) {
                warn!("failed to destroy window on drop: {e}");
            }
        }
    }
}

// ── ContextGuard ─────────────────────────────────────────────────

/// A drawing context released when dropped.
struct ContextGuard<'h, H: Host> {
    host: &'h H,
    window: H::Window,
    context: H::Context,
}

impl<'h, H: Host> ContextGuard<'h, H> {
    fn acquire(host: &'h H, window: H::Window) -> Result<Self> {
        let context = host.acquire_context(window)?;
        Ok(Self {
            host,
            window,
            context,
        })
    }
}

impl<H: Host> Drop for ContextGuard<'_, H> {
    fn drop(&mut self) {
        self.host.release_context(self.window, self.context);
    }
}

// ── Tests ────────────────────────────────────────────────────────
