//! Tiny RTS entry point.
//!
//! ```text
//! tiny-rts                     Run with defaults (320×200 at 3×)
//! tiny-rts --config <path>     Use custom config TOML
//! tiny-rts --scale 2           Override the pixel scale
//! tiny-rts --gen-config        Dump default config and exit
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiny_rts::config::{DEFAULT_CONFIG_PATH, GameConfig};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tiny-rts", about = "Tiny RTS", version)]
struct Cli {
    /// Path to configuration TOML file [default: tiny-rts.toml].
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Integer pixel scale (overrides config).
    #[arg(short, long)]
    scale: Option<u32>,

    /// Window title (overrides config).
    #[arg(short, long)]
    title: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&GameConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // A named file must load; the default path may be absent.
    let mut config = match &cli.config {
        Some(path) => match GameConfig::load_strict(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::load(Path::new(DEFAULT_CONFIG_PATH)),
    };
    if let Some(scale) = cli.scale {
        config.window.scale = scale;
    }
    if let Some(title) = cli.title {
        config.window.title = title;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("tiny-rts v{}", env!("CARGO_PKG_VERSION"));

    run(config).await;
    Ok(())
}

#[cfg(target_os = "windows")]
async fn run(config: GameConfig) {
    use tiny_core::{FrameDriver, Platform, Rgba, Win32Host};

    let tick = config.tick_interval();

    let host = match Win32Host::new() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let platform = Platform::new(host);

    // ── 1. Open the window ──────────────────────────────────────

    let mut driver = match FrameDriver::open(&platform, config.window) {
        Ok(driver) => driver.with_tick(tick),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // ── 2. Frame loop ───────────────────────────────────────────

    match driver.run_with(|fb, _| fb.fill(Rgba::GREEN)).await {
        Ok(summary) => info!(ticks = summary.ticks, "shutting down"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_os = "windows"))]
async fn run(_config: GameConfig) {
    eprintln!("tiny-rts: only Windows is supported");
    std::process::exit(1);
}
