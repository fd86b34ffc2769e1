//! Engine-wide error type.
//!
//! Sub-crates define their own error enums and wrap `WpError` as one variant
//! via `#[from]` where coordinates cross the crate boundary.

use thiserror::Error;

/// Errors raised by `wp-core` value types.
#[derive(Debug, Error)]
pub enum WpError {
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

/// Shorthand result type for all `wp-*` crates.
pub type WpResult<T> = Result<T, WpError>;
