//! A point appended to the travelled route.

use wp_core::Coordinate;

/// A coordinate plus optional descriptive metadata.
///
/// Fields are private: a `Waypoint` is assembled once with the `with_*`
/// methods and never changes after it is handed to a
/// [`RouteTracker`](crate::RouteTracker).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    coordinate:   Coordinate,
    address:      Option<String>,
    name:         Option<String>,
    reference_id: Option<String>,
}

impl Waypoint {
    /// A bare waypoint with no metadata.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address:      None,
            name:         None,
            reference_id: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// External reference (e.g. a loan account number) carried through for
    /// display and export.
    pub fn with_reference_id(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }
}

impl From<Coordinate> for Waypoint {
    fn from(coordinate: Coordinate) -> Self {
        Self::new(coordinate)
    }
}
