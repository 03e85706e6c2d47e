//! Configuration file handling for lumafx.
//!
//! Loads configuration from `~/.config/lumafx/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::animator::AnimatorOptions;
use crate::dither::Dither;
use crate::engine::EngineOptions;
use crate::glyph::Charset;

/// Configuration file structure for lumafx.
/// Loaded from ~/.config/lumafx/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub columns: Option<u32>,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub dither: Option<String>,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub gamma: bool,
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default)]
    pub fps: Option<f64>,
}

// Manual impl so a missing [render] section and an empty one agree.
impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            columns: None,
            charset: None,
            dither: None,
            invert: false,
            gamma: false,
            color: true,
            fps: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AnimationConfig {
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub grid_cols: Option<u32>,
    #[serde(default)]
    pub grid_rows: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub reduced_motion: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the `[render]` and `[ui]` sections into engine options.
    ///
    /// Unset fields keep the engine defaults. Name fields resolve with a
    /// logged warning and a fallback rather than an error; numeric ranges
    /// are clamped by the engine itself.
    pub fn engine_options(&self) -> EngineOptions {
        let mut options = EngineOptions::default();
        if let Some(columns) = self.render.columns {
            options.columns = columns;
        }
        if let Some(ref name) = self.render.charset {
            options.charset = Charset::resolve(name);
        }
        if let Some(ref name) = self.render.dither {
            options.dither = Dither::resolve(name);
        }
        options.invert = self.render.invert;
        options.gamma = self.render.gamma;
        options.color = self.render.color;
        if let Some(fps) = self.render.fps {
            options.target_fps = fps;
        }
        options.reduced_motion = self.ui.reduced_motion;
        options
    }

    /// Resolve the `[animation]` and `[ui]` sections into animator options.
    pub fn animator_options(&self) -> AnimatorOptions {
        let mut options = AnimatorOptions::default();
        if let Some(seed) = self.animation.seed {
            options.seed = seed;
        }
        if let Some(cols) = self.animation.grid_cols {
            options.grid_cols = cols;
        }
        if let Some(rows) = self.animation.grid_rows {
            options.grid_rows = rows;
        }
        options.reduced_motion = self.ui.reduced_motion;
        options
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("lumafx").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/lumafx/config.toml")
        })
}
