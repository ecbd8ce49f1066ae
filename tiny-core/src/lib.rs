//! # tiny-core
//!
//! Platform layer for Tiny RTS: opens a native window, pumps the OS
//! message loop, and presents an in-memory RGBA framebuffer at an
//! integer pixel scale.
//!
//! This crate contains:
//! - **Pixels**: `Rgba`, `Framebuffer`, RGBA → BGRA conversion, `ScratchBuffer`
//! - **Config**: `SurfaceConfig` with normalisation of the scale factor
//! - **Host**: the `Host` trait every windowing backend implements
//! - **Platform**: process-wide capability object (thread pin, class registration)
//! - **Surface**: one window plus its presentation state machine
//! - **Driver**: `FrameDriver`, the fixed-tick pump/present/sleep loop
//! - **Win32**: `Win32Host` (Windows only)
//! - **Mock**: `MockHost`, an in-memory host for tests
//! - **Error**: `TinyError`, the typed `thiserror`-based error hierarchy

pub mod config;
pub mod driver;
pub mod error;
pub mod host;
pub mod mock;
pub mod pixel;
pub mod platform;
pub mod surface;

#[cfg(target_os = "windows")]
pub mod win32;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use config::SurfaceConfig;
pub use driver::{DEFAULT_TICK, FrameDriver, RunSummary};
pub use error::{Result, TinyError};
pub use host::{
    BitmapInfo, Compression, Host, MessageAction, Rect, WindowClass, WindowMessage, WindowState, WindowStyle,
};
pub use mock::MockHost;
pub use pixel::{Framebuffer, PixelFormat, Rgba, ScratchBuffer, convert_rgba_to_bgra};
pub use platform::Platform;
pub use surface::{Surface, SurfacePhase};

#[cfg(target_os = "windows")]
pub use win32::Win32Host;
