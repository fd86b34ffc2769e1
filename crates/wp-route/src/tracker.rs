//! `RouteTracker`: append-only waypoint sequence and cumulative distance.

use log::debug;

use wp_core::{path_length_km, Coordinate};

use crate::{RouteResult, Waypoint};

/// Owns the travelled path for one session.
///
/// The tracker starts empty with a total of `0.0`.  The only mutation is
/// [`append_waypoint`](Self::append_waypoint); `total_distance_km` cannot be
/// set directly and always equals the path length of `[anchor] + waypoints`
/// for the anchor passed to the most recent append.
#[derive(Debug, Clone, Default)]
pub struct RouteTracker {
    waypoints:         Vec<Waypoint>,
    total_distance_km: f64,
}

impl RouteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `waypoint` and recompute the total from `anchor`.
    ///
    /// The same waypoint may be appended any number of times; each append
    /// adds a new leg.  Returns the new total in kilometres.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidCoordinate`](crate::RouteError) if either
    /// the waypoint or the anchor is NaN or out of range.  The tracker is left
    /// unchanged in that case.
    pub fn append_waypoint(&mut self, waypoint: Waypoint, anchor: Coordinate) -> RouteResult<f64> {
        anchor.validate()?;
        waypoint.coordinate().validate()?;

        debug!(
            "appending waypoint #{} at {}",
            self.waypoints.len(),
            waypoint.coordinate()
        );
        self.waypoints.push(waypoint);
        self.total_distance_km = path_length_km(self.path(anchor));

        Ok(self.total_distance_km)
    }

    /// Cumulative distance in kilometres from the anchor through every
    /// waypoint.
    #[inline]
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// Waypoints in the order they were appended.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// `anchor` followed by every waypoint coordinate; the polyline to draw.
    pub fn path(&self, anchor: Coordinate) -> impl Iterator<Item = Coordinate> + '_ {
        std::iter::once(anchor).chain(self.waypoints.iter().map(Waypoint::coordinate))
    }

    /// Per-leg breakdown starting at `anchor`.  Yields one [`Leg`] per
    /// waypoint.
    pub fn legs(&self, anchor: Coordinate) -> Legs<'_> {
        Legs {
            prev:      anchor,
            waypoints: self.waypoints.iter(),
        }
    }
}

// ── Legs ──────────────────────────────────────────────────────────────────────

/// One segment of the travelled path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg<'a> {
    pub from:        Coordinate,
    pub to:          &'a Waypoint,
    pub distance_km: f64,
}

/// Iterator returned by [`RouteTracker::legs`].
pub struct Legs<'a> {
    prev:      Coordinate,
    waypoints: std::slice::Iter<'a, Waypoint>,
}

impl<'a> Iterator for Legs<'a> {
    type Item = Leg<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let to = self.waypoints.next()?;
        let from = self.prev;
        self.prev = to.coordinate();
        Some(Leg {
            from,
            to,
            distance_km: from.distance_km(to.coordinate()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.waypoints.size_hint()
    }
}

impl ExactSizeIterator for Legs<'_> {}
