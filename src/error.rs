// SPDX-License-Identifier: MPL-2.0
//! Error types for loading, extracting, decoding and interacting with frames.
//!
//! Archive-level failures ([`FetchError`], [`ExtractError`]) are fatal to a
//! load. Per-frame failures ([`DecodeError`]) are recorded on the frame's cache
//! entry. [`ToolError`] is informational only and never changes state.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Fetch(FetchError),
    Extract(ExtractError),
    Decode(DecodeError),
    Tool(ToolError),
    /// The viewer was torn down and accepts no more work.
    Closed,
}

/// Failure to retrieve the bytes behind a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Http { status: u16 },

    /// Connection, TLS or body transfer failure.
    Network(String),

    /// A local path does not exist.
    NotFound(String),

    /// A local file could not be read.
    Io(String),

    /// Every attempt failed; carries the last underlying failure.
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Returns whether another attempt could succeed.
    ///
    /// Client errors (4xx) and missing local files are permanent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { status } => *status >= 500 || *status == 408 || *status == 429,
            FetchError::Network(_) => true,
            FetchError::NotFound(_) | FetchError::Io(_) | FetchError::Exhausted { .. } => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http { status } => write!(f, "HTTP status {status}"),
            FetchError::Network(msg) => write!(f, "network failure: {msg}"),
            FetchError::NotFound(path) => write!(f, "not found: {path}"),
            FetchError::Io(msg) => write!(f, "I/O error: {msg}"),
            FetchError::Exhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure to turn archive bytes into a frame manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The archive could not be parsed at all.
    Corrupt(String),

    /// The archive parsed but held no structured or raster frame.
    Empty,
}

impl ExtractError {
    /// Returns the i18n-style message key for this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            ExtractError::Corrupt(_) => "error-load-archive-corrupt",
            ExtractError::Empty => "error-load-archive-empty",
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Corrupt(msg) => write!(f, "archive is corrupt: {msg}"),
            ExtractError::Empty => write!(f, "archive contains no displayable frames"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Failure to decode a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The encoding is recognised but not handled (compressed DICOM, big endian, ...).
    Unsupported(String),

    /// The payload is truncated or inconsistent.
    Malformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Unsupported(msg) => write!(f, "unsupported encoding: {msg}"),
            DecodeError::Malformed(msg) => write!(f, "malformed frame: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}

/// A tool request that was accepted but had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolError {
    /// Window/level adjustment was requested on a raster frame.
    WindowLevelUnsupported,

    /// No frame is displayed yet.
    NoFrame,
}

impl ToolError {
    /// Returns the i18n-style message key for this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            ToolError::WindowLevelUnsupported => "notification-window-level-unsupported",
            ToolError::NoFrame => "notification-no-frame",
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::WindowLevelUnsupported => {
                write!(f, "window/level does not apply to raster frames")
            }
            ToolError::NoFrame => write!(f, "no frame is displayed"),
        }
    }
}

impl std::error::Error for ToolError {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Fetch(e) => write!(f, "Fetch Error: {}", e),
            Error::Extract(e) => write!(f, "Extract Error: {}", e),
            Error::Decode(e) => write!(f, "Decode Error: {}", e),
            Error::Tool(e) => write!(f, "Tool Error: {}", e),
            Error::Closed => write!(f, "viewer has been torn down"),
        }
    }
}

impl Error {
    /// Returns the i18n-style message key used when notifying the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            Error::Io(_) => "error-io",
            Error::Config(_) => "error-config",
            Error::Fetch(_) => "error-load-fetch",
            Error::Extract(e) => e.message_key(),
            Error::Decode(_) => "error-decode",
            Error::Tool(e) => e.message_key(),
            Error::Closed => "error-viewer-closed",
        }
    }
}

impl std::error::Error for Error {}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl From<ExtractError> for Error {
    fn from(err: ExtractError) -> Self {
        Error::Extract(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<ToolError> for Error {
    fn from(err: ToolError) -> Self {
        Error::Tool(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
