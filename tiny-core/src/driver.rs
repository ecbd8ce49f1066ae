//! Fixed-tick frame loop.
//!
//! Each tick pumps the surface, lets the caller draw into the
//! framebuffer, presents it, then sleeps out the rest of the tick
//! interval. The loop ends when the window closes or a present fails.
//!
//! Everything runs on the calling thread; use a current-thread Tokio
//! runtime so the sleeps never move the loop to another worker.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use crate::config::SurfaceConfig;
use crate::error::Result;
use crate::host::Host;
use crate::pixel::{Framebuffer, Rgba};
use crate::platform::Platform;
use crate::surface::Surface;

/// Default tick interval (~100 Hz upper bound).
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Outcome of a loop that ended because the window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames presented.
    pub ticks: u64,
}

/// Owns a surface and the framebuffer presented into it every tick.
pub struct FrameDriver<'p, H: Host> {
    surface: Surface<'p, H>,
    framebuffer: Framebuffer,
    tick: Duration,
}

impl<'p, H: Host> FrameDriver<'p, H> {
    /// Wrap an existing surface. The framebuffer matches its logical size
    /// and starts out opaque black.
    pub fn new(surface: Surface<'p, H>) -> Self {
        let (width, height) = surface.logical_size();
        Self {
            surface,
            framebuffer: Framebuffer::filled(width, height, Rgba::BLACK),
            tick: DEFAULT_TICK,
        }
    }

    /// Create a surface from `config`, show it, and wrap it.
    pub fn open(platform: &'p Platform<H>, config: SurfaceConfig) -> Result<Self> {
        let mut surface = Surface::create(platform, config)?;
        surface.show();
        Ok(Self::new(surface))
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn surface(&self) -> &Surface<'p, H> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<'p, H> {
        &mut self.surface
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Present the current framebuffer every tick until the window closes.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.run_with(|_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `draw(framebuffer, tick)` before
    /// every present.
    ///
    /// A present failure is fatal: it is logged, returned, and no further
    /// pump or present happens.
    pub async fn run_with<F>(&mut self, mut draw: F) -> Result<RunSummary>
    where
        F: FnMut(&mut Framebuffer, u64),
    {
        let mut ticks: u64 = 0;

        loop {
            let tick_start = Instant::now();

            if !self.surface.pump() {
                break;
            }

            draw(&mut self.framebuffer, ticks);

            if let Err(e) = self.surface.present(&self.framebuffer) {
                error!(tick = ticks, "present failed: {e}");
                return Err(e);
            }
            ticks += 1;

            Self::pace(tick_start, self.tick).await;
        }

        info!(ticks, "window closed; frame loop finished");
        Ok(RunSummary { ticks })
    }

    /// Sleep for the remainder of the tick interval.
    async fn pace(tick_start: Instant, interval: Duration) {
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            tokio::time::sleep(interval - elapsed).await;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
