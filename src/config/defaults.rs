// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the engine. Constants are organized by category.
//!
//! # Categories
//!
//! - **Navigation**: Wheel throttling and drag-to-navigate distance
//! - **Tools**: Zoom factor, scale bounds, window/level sensitivity
//! - **Fetch**: Retry attempts, backoff and request timeout
//! - **Render**: Rendered-frame cache capacity

// ==========================================================================
// Navigation Defaults
// ==========================================================================

/// Default minimum interval between two accepted wheel transitions (ms).
pub const DEFAULT_WHEEL_THROTTLE_MS: u64 = 50;

/// Minimum wheel throttle interval (ms). Zero disables throttling.
pub const MIN_WHEEL_THROTTLE_MS: u64 = 0;

/// Maximum wheel throttle interval (ms).
pub const MAX_WHEEL_THROTTLE_MS: u64 = 1_000;

/// Default vertical drag distance (px) that advances one frame.
pub const DEFAULT_DRAG_STEP_PX: f32 = 12.0;

/// Minimum drag distance per frame step (px).
pub const MIN_DRAG_STEP_PX: f32 = 1.0;

/// Maximum drag distance per frame step (px).
pub const MAX_DRAG_STEP_PX: f32 = 200.0;

// ==========================================================================
// Tool Defaults
// ==========================================================================

/// Scale multiplier applied per zoom-in wheel notch (inverse for zoom-out).
pub const DEFAULT_ZOOM_FACTOR: f32 = 1.1;

/// Smallest accepted zoom factor.
pub const MIN_ZOOM_FACTOR: f32 = 1.01;

/// Largest accepted zoom factor.
pub const MAX_ZOOM_FACTOR: f32 = 2.0;

/// Lower bound of the view scale.
pub const MIN_SCALE: f32 = 0.05;

/// Upper bound of the view scale.
pub const MAX_SCALE: f32 = 20.0;

/// Default window width/center change per dragged pixel.
pub const DEFAULT_WINDOW_LEVEL_SENSITIVITY: f32 = 1.0;

/// Minimum window/level sensitivity.
pub const MIN_WINDOW_LEVEL_SENSITIVITY: f32 = 0.05;

/// Maximum window/level sensitivity.
pub const MAX_WINDOW_LEVEL_SENSITIVITY: f32 = 50.0;

/// Narrowest window width the Window-Level tool can produce.
pub const MIN_WINDOW_WIDTH: f32 = 1.0;

// ==========================================================================
// Fetch Defaults
// ==========================================================================

/// Default number of fetch attempts before giving up.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Minimum fetch attempts.
pub const MIN_FETCH_ATTEMPTS: u32 = 1;

/// Maximum fetch attempts.
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

/// Delay before the first retry (ms); doubles on each further retry.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 250;

/// Upper bound of the retry delay (ms).
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 4_000;

/// Largest configurable retry delay (ms).
pub const MAX_BACKOFF_LIMIT_MS: u64 = 60_000;

/// Default per-request timeout (seconds).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Minimum per-request timeout (seconds).
pub const MIN_FETCH_TIMEOUT_SECS: u64 = 1;

/// Maximum per-request timeout (seconds).
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 600;

// ==========================================================================
// Render Defaults
// ==========================================================================

/// Number of windowed frames kept by the renderer for cheap repaints.
pub const DEFAULT_RENDER_CACHE_FRAMES: usize = 8;

/// Minimum windowed frames kept (the frame on screen).
pub const MIN_RENDER_CACHE_FRAMES: usize = 1;

/// Maximum windowed frames kept.
pub const MAX_RENDER_CACHE_FRAMES: usize = 256;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Navigation validation
    assert!(DEFAULT_WHEEL_THROTTLE_MS >= MIN_WHEEL_THROTTLE_MS);
    assert!(DEFAULT_WHEEL_THROTTLE_MS <= MAX_WHEEL_THROTTLE_MS);
    assert!(MIN_DRAG_STEP_PX > 0.0);
    assert!(DEFAULT_DRAG_STEP_PX >= MIN_DRAG_STEP_PX);
    assert!(DEFAULT_DRAG_STEP_PX <= MAX_DRAG_STEP_PX);

    // Tool validation
    assert!(MIN_ZOOM_FACTOR > 1.0);
    assert!(DEFAULT_ZOOM_FACTOR >= MIN_ZOOM_FACTOR);
    assert!(DEFAULT_ZOOM_FACTOR <= MAX_ZOOM_FACTOR);
    assert!(MIN_SCALE > 0.0);
    assert!(MAX_SCALE > MIN_SCALE);
    assert!(MIN_WINDOW_WIDTH > 0.0);
    assert!(DEFAULT_WINDOW_LEVEL_SENSITIVITY >= MIN_WINDOW_LEVEL_SENSITIVITY);
    assert!(DEFAULT_WINDOW_LEVEL_SENSITIVITY <= MAX_WINDOW_LEVEL_SENSITIVITY);

    // Fetch validation
    assert!(MIN_FETCH_ATTEMPTS > 0);
    assert!(DEFAULT_FETCH_ATTEMPTS >= MIN_FETCH_ATTEMPTS);
    assert!(DEFAULT_FETCH_ATTEMPTS <= MAX_FETCH_ATTEMPTS);
    assert!(DEFAULT_INITIAL_BACKOFF_MS <= DEFAULT_MAX_BACKOFF_MS);
    assert!(DEFAULT_MAX_BACKOFF_MS <= MAX_BACKOFF_LIMIT_MS);
    assert!(DEFAULT_FETCH_TIMEOUT_SECS >= MIN_FETCH_TIMEOUT_SECS);
    assert!(DEFAULT_FETCH_TIMEOUT_SECS <= MAX_FETCH_TIMEOUT_SECS);

    // Render validation
    assert!(MIN_RENDER_CACHE_FRAMES > 0);
    assert!(DEFAULT_RENDER_CACHE_FRAMES >= MIN_RENDER_CACHE_FRAMES);
    assert!(DEFAULT_RENDER_CACHE_FRAMES <= MAX_RENDER_CACHE_FRAMES);
};
