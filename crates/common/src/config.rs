//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LipsyncResult;
use crate::framerate::FrameRate;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where viseme presets are stored.
    pub presets_dir: PathBuf,

    /// Bone (or other animation target) the generated keyframes drive.
    pub target_bone: String,

    /// Default timing settings for compilation.
    pub timing: TimingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default timing parameters, mirroring host render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingDefaults {
    /// Integer render frame rate.
    pub fps: u32,

    /// Frame rate divisor (`fps / fps_base` is the effective rate).
    pub fps_base: f64,

    /// Emit a keyframe every N frames.
    pub frame_step: u32,

    /// Cross-fade over the first N frames of each cue.
    pub blend_frames: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "lipsyncer=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            presets_dir: dirs_default_presets(),
            target_bone: "mouth_ctrl".to_string(),
            timing: TimingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TimingDefaults {
    fn default() -> Self {
        Self {
            fps: 24,
            fps_base: 1.0,
            frame_step: 1,
            blend_frames: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl TimingDefaults {
    /// Validated rational frame rate.
    pub fn frame_rate(&self) -> LipsyncResult<FrameRate> {
        FrameRate::new(self.fps, self.fps_base)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("lipsyncer").join("config.json")
}

/// Default presets directory.
fn dirs_default_presets() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("lipsyncer").join("presets")
}
