//! Error types for wp-geocode.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single geocoding call or of loading a geocoder table.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("address not found: {0:?}")]
    NotFound(String),

    #[error("geocoding service error: {0}")]
    Service(String),

    #[error("geocoding call exceeded {0:?}")]
    Timeout(Duration),

    #[error("{0} timed-out geocoding calls are still running")]
    Saturated(usize),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Failure to obtain the address records themselves.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("record source answered HTTP {0}")]
    Status(u16),

    #[error("could not decode records: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;
