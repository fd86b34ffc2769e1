use thiserror::Error;

use wp_core::DestinationId;
use wp_route::RouteError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no anchor location; the route cannot start")]
    NoAnchor,

    #[error("destination {0} does not exist")]
    UnknownDestination(DestinationId),

    #[error("destinations were already loaded for this session")]
    DestinationsAlreadyLoaded,

    #[error("route error: {0}")]
    Route(#[from] RouteError),

    #[error("session configuration error: {0}")]
    Config(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Why the location provider could not supply a position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("permission to access location was denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("heading sensor unavailable: {0}")]
    Unavailable(String),
}
