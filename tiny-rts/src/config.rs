//! Game configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tiny_core::{SurfaceConfig, TinyError};

/// Config file looked up when none is named on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "tiny-rts.toml";

/// Top-level configuration for the game binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Window size, scale and title.
    pub window: SurfaceConfig,
    /// Frame loop timing.
    pub timing: TimingConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Frame loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Tick interval in milliseconds.
    pub tick_ms: u64,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: SurfaceConfig::default()
                .with_size(320, 200)
                .with_scale(3)
                .with_title("Tiny RTS"),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_ms: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl GameConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("cannot read config {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Load a file the user named explicitly. Missing or invalid files are
    /// errors rather than a silent fallback.
    pub fn load_strict(path: &Path) -> tiny_core::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TinyError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| TinyError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Write default config to a file.
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tiny-rts-{}-{name}", std::process::id()))
    }

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&GameConfig::default()).unwrap();
        assert!(text.contains("[window]"));
        assert!(text.contains("tick_ms"));
        assert!(text.contains("Tiny RTS"));
    }

    #[test]
    fn roundtrip_config() {
        let text = toml::to_string_pretty(&GameConfig::default()).unwrap();
        let parsed: GameConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.window.width, 320);
        assert_eq!(parsed.window.height, 200);
        assert_eq!(parsed.window.scale, 3);
        assert_eq!(parsed.window.physical_size().unwrap(), (960, 600));
        assert_eq!(parsed.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn partial_config_keeps_game_defaults() {
        let parsed: GameConfig = toml::from_str("[timing]\ntick_ms = 16\n").unwrap();
        assert_eq!(parsed.timing.tick_ms, 16);
        assert_eq!(parsed.window.title, "Tiny RTS");
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = GameConfig::load(&temp_path("absent.toml"));
        assert_eq!(cfg.window.scale, 3);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = temp_path("invalid.toml");
        std::fs::write(&path, "window = 7").unwrap();
        let cfg = GameConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.window.width, 320);
    }

    #[test]
    fn unreadable_path_falls_back_to_defaults() {
        // A directory exists but cannot be read as a file.
        let cfg = GameConfig::load(&std::env::temp_dir());
        assert_eq!(cfg.window.title, "Tiny RTS");
    }

    #[test]
    fn strict_load_reports_missing_file() {
        let err = GameConfig::load_strict(&temp_path("strict-absent.toml")).unwrap_err();
        assert!(matches!(err, TinyError::Config(_)));
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn strict_load_reports_parse_errors() {
        let path = temp_path("strict-invalid.toml");
        std::fs::write(&path, "[timing]\ntick_ms = \"fast\"\n").unwrap();
        let result = GameConfig::load_strict(&path);
        std::fs::remove_file(&path).unwrap();
        let err = result.unwrap_err();
        assert!(matches!(err, TinyError::Config(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn strict_load_reads_valid_file() {
        let path = temp_path("strict-valid.toml");
        std::fs::write(&path, "[window]\nwidth = 320\nheight = 200\nscale = 2\n").unwrap();
        let result = GameConfig::load_strict(&path);
        std::fs::remove_file(&path).unwrap();
        let cfg = result.unwrap();
        assert_eq!(cfg.window.physical_size().unwrap(), (640, 400));
    }

    #[test]
    fn written_default_loads_back() {
        let path = temp_path("default.toml");
        GameConfig::write_default(&path).unwrap();
        let cfg = GameConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.window.title, "Tiny RTS");
        assert_eq!(cfg.timing.tick_ms, 10);
    }
}
