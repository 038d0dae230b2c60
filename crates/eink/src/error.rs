//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during drawing and flushing
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level bus and pin errors
//! - [`StoreError`](crate::framebuffer::StoreError) - Framebuffer storage errors
//!
//! Coordinates outside the panel are never an error: runs are clamped, and a
//! run clamped to nothing covers 0 pixels.
//!
//! ## Example
//!
//! ```
//! use eink::{Builder, Dimensions, BuilderError};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(200, 4); // Shorter than one byte row
//! assert!(result.is_err());
//! ```

/// Maximum panel width (source outputs) accepted by [`Dimensions`](crate::config::Dimensions)
pub const MAX_WIDTH: u16 = 640;

/// Maximum panel height (gate outputs) accepted by [`Dimensions`](crate::config::Dimensions)
pub const MAX_HEIGHT: u16 = 640;

/// Errors that can occur when drawing to or flushing the display
///
/// Generic over the interface and store error types so callers can match on
/// the underlying hardware error.
#[derive(Debug)]
pub enum Error<IE, SE> {
    /// Interface error (bus, GPIO or busy timeout)
    Interface(IE),
    /// Framebuffer storage error
    ///
    /// Only reachable with fallible stores such as
    /// [`ExternalBuffer`](crate::framebuffer::ExternalBuffer).
    Store(SE),
}

impl<IE: core::fmt::Debug, SE: core::fmt::Debug> core::fmt::Display for Error<IE, SE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::Store(e) => write!(f, "Framebuffer error: {e:?}"),
        }
    }
}

impl<IE: core::fmt::Debug, SE: core::fmt::Debug> core::error::Error for Error<IE, SE> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before
    /// building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels requested
        width: u16,
        /// Height in pixels requested
        height: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::MissingDimensions => write!(f, "Dimensions must be specified"),
            BuilderError::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_WIDTH}x{MAX_HEIGHT}, height must be at least 8)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
