use thiserror::Error;
use wp_core::WpError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("rejected waypoint: {0}")]
    InvalidCoordinate(#[from] WpError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
