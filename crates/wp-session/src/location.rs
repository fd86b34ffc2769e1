//! The device location collaborator.

use wp_core::Coordinate;

use crate::LocationError;

/// Supplies the user's current position.  Asked once per session.
pub trait LocationProvider {
    fn current_position(&self) -> Result<Coordinate, LocationError>;
}

impl<F> LocationProvider for F
where
    F: Fn() -> Result<Coordinate, LocationError>,
{
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        self()
    }
}

/// A provider that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}
