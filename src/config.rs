// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// The file is looked up in the current directory, then in the working
// directory next to the shaders. Provides sensible defaults if config file
// is missing or has errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub shaders: ShaderConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "opengl".to_string(),
            width: 640,
            height: 480,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub clear_color: [f32; 4],
    pub vsync: bool,
    /// Requested MSAA sample count. Advisory only, never forced on the
    /// framebuffer config.
    pub multisample_hint: u8,
    pub depth_test: bool,
    /// Draw back faces as outlines (front faces stay filled)
    pub back_face_wireframe: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vsync: true,
            multisample_hint: 4,
            depth_test: true,
            back_face_wireframe: true,
        }
    }
}

/// Shader file names, resolved against the working directory
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: "shader_vs.glsl".to_string(),
            fragment: "shader_ps.glsl".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_to_file: bool,
    pub log_file: String,
    pub log_max_bytes: u64,
    pub log_max_files: usize,
    pub show_fps: bool,
    pub fps_interval_secs: f64,
    pub gl_debug_output: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_to_file: true,
            log_file: "log.txt".to_string(),
            log_max_bytes: 8000,
            log_max_files: 3,
            show_fps: true,
            fps_interval_secs: 0.25,
            gl_debug_output: true,
        }
    }
}

impl DebugConfig {
    /// FPS sampling window. Values that are not a positive, representable
    /// duration fall back to 0.25s.
    pub fn fps_interval(&self) -> Duration {
        match Duration::try_from_secs_f64(self.fps_interval_secs) {
            Ok(interval) if !interval.is_zero() => interval,
            _ => {
                log::warn!(
                    "Invalid fps_interval_secs {}, using 0.25s",
                    self.fps_interval_secs
                );
                Duration::from_millis(250)
            }
        }
    }
}

/// Name of the configuration file looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Load `config.toml` from the current directory, else from the
    /// working directory. Falls back to defaults when neither exists or the
    /// file cannot be parsed.
    pub fn load(working_dir: &str) -> Self {
        let candidates = Self::candidate_paths(working_dir);
        Self::load_first(&candidates).unwrap_or_else(|e| {
            // Logging isn't initialised yet at this point
            eprintln!("Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Config::default()
        })
    }

    /// Lookup order for the configuration file
    pub fn candidate_paths(working_dir: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        let beside_executable = crate::environment::shader_path(working_dir, CONFIG_FILE);
        if beside_executable != paths[0] {
            paths.push(beside_executable);
        }
        paths
    }

    /// Load the first existing file in `candidates`, or defaults if none exist.
    pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        match candidates.iter().find(|path| (*path).as_ref().exists()) {
            Some(path) => Self::load_from_path(path),
            None => {
                log::info!("No {} found, using defaults", CONFIG_FILE);
                Ok(Config::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }
}
