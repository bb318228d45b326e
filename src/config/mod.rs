// SPDX-License-Identifier: MPL-2.0
//! This module handles the engine's configuration, including loading and saving
//! tuning parameters to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! The configuration is organized into logical sections:
//! - `[navigation]` - Wheel throttling and drag-to-navigate distance
//! - `[tools]` - Zoom factor, scale bounds and window/level sensitivity
//! - `[preload]` - Background preloading of every frame
//! - `[fetch]` - Retry policy and timeout for remote references
//! - `[render]` - Windowed frame cache of the renderer
//!
//! Every numeric value is optional in the file and clamped to its bounds
//! (see [`defaults`]) when read through the accessor methods.
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Pass a directory to `load_with_override()`/`save_with_override()`
//! 3. Set `SCANLENS_CONFIG_DIR` environment variable
//! 4. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use scanlens::config;
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.navigation.wheel_throttle_ms = Some(80);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "ScanLens";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "SCANLENS_CONFIG_DIR";

// =============================================================================
// Section Structs
// =============================================================================

/// Frame navigation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationConfig {
    /// Minimum interval between accepted wheel transitions, in milliseconds.
    #[serde(
        default = "default_wheel_throttle_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub wheel_throttle_ms: Option<u64>,

    /// Vertical drag distance in pixels that advances one frame.
    #[serde(
        default = "default_drag_step_px",
        skip_serializing_if = "Option::is_none"
    )]
    pub drag_step_px: Option<f32>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wheel_throttle_ms: default_wheel_throttle_ms(),
            drag_step_px: default_drag_step_px(),
        }
    }
}

impl NavigationConfig {
    /// Returns the clamped wheel throttle interval.
    #[must_use]
    pub fn wheel_throttle(&self) -> Duration {
        let ms = self
            .wheel_throttle_ms
            .unwrap_or(DEFAULT_WHEEL_THROTTLE_MS)
            .clamp(MIN_WHEEL_THROTTLE_MS, MAX_WHEEL_THROTTLE_MS);
        Duration::from_millis(ms)
    }

    /// Returns the clamped drag distance per frame step.
    #[must_use]
    pub fn drag_step(&self) -> f32 {
        clamp_f32(
            self.drag_step_px,
            DEFAULT_DRAG_STEP_PX,
            MIN_DRAG_STEP_PX,
            MAX_DRAG_STEP_PX,
        )
    }
}

/// Interaction tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Scale multiplier per zoom-in wheel notch.
    #[serde(
        default = "default_zoom_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub zoom_factor: Option<f32>,

    /// Smallest view scale.
    #[serde(default = "default_min_scale", skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<f32>,

    /// Largest view scale.
    #[serde(default = "default_max_scale", skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<f32>,

    /// Window width/center change per dragged pixel.
    #[serde(
        default = "default_window_level_sensitivity",
        skip_serializing_if = "Option::is_none"
    )]
    pub window_level_sensitivity: Option<f32>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            zoom_factor: default_zoom_factor(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            window_level_sensitivity: default_window_level_sensitivity(),
        }
    }
}

impl ToolsConfig {
    /// Returns the clamped zoom factor.
    #[must_use]
    pub fn zoom_factor(&self) -> f32 {
        clamp_f32(
            self.zoom_factor,
            DEFAULT_ZOOM_FACTOR,
            MIN_ZOOM_FACTOR,
            MAX_ZOOM_FACTOR,
        )
    }

    /// Returns the `(min, max)` scale bounds, always ordered and positive.
    #[must_use]
    pub fn scale_bounds(&self) -> (f32, f32) {
        let min = clamp_f32(self.min_scale, MIN_SCALE, MIN_SCALE, MAX_SCALE);
        let max = clamp_f32(self.max_scale, MAX_SCALE, MIN_SCALE, MAX_SCALE);
        if min <= max {
            (min, max)
        } else {
            (max, min)
        }
    }

    /// Returns the clamped window/level sensitivity.
    #[must_use]
    pub fn window_level_sensitivity(&self) -> f32 {
        clamp_f32(
            self.window_level_sensitivity,
            DEFAULT_WINDOW_LEVEL_SENSITIVITY,
            MIN_WINDOW_LEVEL_SENSITIVITY,
            MAX_WINDOW_LEVEL_SENSITIVITY,
        )
    }
}

/// Background preloading settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreloadConfig {
    /// Decode every frame ahead of display after a load.
    #[serde(default = "default_preload_enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: default_preload_enabled(),
        }
    }
}

impl PreloadConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Remote fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Total number of attempts, including the first one.
    #[serde(default = "default_max_attempts", skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry, in milliseconds.
    #[serde(
        default = "default_initial_backoff_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_backoff_ms: Option<u64>,

    /// Upper bound of the retry delay, in milliseconds.
    #[serde(
        default = "default_max_backoff_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_backoff_ms: Option<u64>,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
            .unwrap_or(DEFAULT_FETCH_ATTEMPTS)
            .clamp(MIN_FETCH_ATTEMPTS, MAX_FETCH_ATTEMPTS)
    }

    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        let ms = self
            .initial_backoff_ms
            .unwrap_or(DEFAULT_INITIAL_BACKOFF_MS)
            .min(MAX_BACKOFF_LIMIT_MS);
        Duration::from_millis(ms)
    }

    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        let ms = self
            .max_backoff_ms
            .unwrap_or(DEFAULT_MAX_BACKOFF_MS)
            .min(MAX_BACKOFF_LIMIT_MS);
        Duration::from_millis(ms).max(self.initial_backoff())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout_secs
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

/// Renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Windowed frames kept for repaints that only pan or zoom.
    #[serde(default = "default_cache_frames", skip_serializing_if = "Option::is_none")]
    pub cache_frames: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cache_frames: default_cache_frames(),
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn cache_frames(&self) -> usize {
        self.cache_frames
            .unwrap_or(DEFAULT_RENDER_CACHE_FRAMES)
            .clamp(MIN_RENDER_CACHE_FRAMES, MAX_RENDER_CACHE_FRAMES)
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Engine configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub preload: PreloadConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_wheel_throttle_ms() -> Option<u64> {
    Some(DEFAULT_WHEEL_THROTTLE_MS)
}

fn default_drag_step_px() -> Option<f32> {
    Some(DEFAULT_DRAG_STEP_PX)
}

fn default_zoom_factor() -> Option<f32> {
    Some(DEFAULT_ZOOM_FACTOR)
}

fn default_min_scale() -> Option<f32> {
    Some(MIN_SCALE)
}

fn default_max_scale() -> Option<f32> {
    Some(MAX_SCALE)
}

fn default_window_level_sensitivity() -> Option<f32> {
    Some(DEFAULT_WINDOW_LEVEL_SENSITIVITY)
}

fn default_preload_enabled() -> Option<bool> {
    Some(true)
}

fn default_max_attempts() -> Option<u32> {
    Some(DEFAULT_FETCH_ATTEMPTS)
}

fn default_initial_backoff_ms() -> Option<u64> {
    Some(DEFAULT_INITIAL_BACKOFF_MS)
}

fn default_max_backoff_ms() -> Option<u64> {
    Some(DEFAULT_MAX_BACKOFF_MS)
}

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_cache_frames() -> Option<usize> {
    Some(DEFAULT_RENDER_CACHE_FRAMES)
}

/// Clamps an optional float setting, treating NaN like an absent value.
fn clamp_f32(value: Option<f32>, default: f32, min: f32, max: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => default,
    }
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config directory with an optional override.
///
/// # Resolution Order
///
/// 1. `override_path` parameter (if `Some`)
/// 2. `SCANLENS_CONFIG_DIR` environment variable (if set and non-empty)
/// 3. Platform-specific config directory (with app name appended)
pub fn config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!("failed to load {}: {err}", path.display())),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}
