//! Error types for the Tiny platform layer.
//!
//! All fallible operations return `Result<T, TinyError>`. Host failures
//! are surfaced immediately and never retried.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TinyError>;

/// The canonical error type for the platform layer.
#[derive(Debug, Error)]
pub enum TinyError {
    // ── Host Errors ──────────────────────────────────────────────
    /// A host windowing call reported failure.
    #[error("{call} failed: {message}")]
    Platform {
        /// Host entry point that failed (e.g. `RegisterClassExW`).
        call: &'static str,
        /// Diagnostic reported by the host (last-error text).
        message: String,
    },

    /// A window-affine call was made off the thread that owns the platform.
    #[error("window operation attempted from a thread other than the platform thread")]
    WrongThread,

    // ── Surface Errors ───────────────────────────────────────────
    /// The surface already received its destroy notification.
    #[error("surface is closed")]
    SurfaceClosed,

    /// A framebuffer's pixel vector does not match its dimensions.
    #[error("invalid framebuffer: expected {expected} pixels, got {actual}")]
    InvalidFramebuffer { expected: usize, actual: usize },

    /// The scaled window size does not fit native window coordinates.
    #[error("surface too large: {width}x{height} at scale {scale}")]
    SurfaceTooLarge { width: u32, height: u32, scale: u32 },

    // ── Application Errors ───────────────────────────────────────
    /// A configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TinyError {
    /// Build a [`TinyError::Platform`] from a host call name and its diagnostic.
    pub fn platform(call: &'static str, diagnostic: impl std::fmt::Display) -> Self {
        TinyError::Platform {
            call,
            message: diagnostic.to_string(),
        }
    }

    /// Whether this error came from the host windowing system.
    pub fn is_platform(&self) -> bool {
        matches!(self, TinyError::Platform { .. })
    }
}

// ── Tests ────────────────────────────────────────────────────────
