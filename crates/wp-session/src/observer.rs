//! Session observer trait for progress reporting.

use wp_geocode::{DestinationSet, SkippedRecord};
use wp_route::RouteTracker;

use crate::AnchorState;

/// Callbacks invoked by [`Session`](crate::Session) at key points.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SessionObserver {
    /// Called once the location provider has answered (or failed).
    fn on_anchor(&mut self, _anchor: &AnchorState) {}

    /// Called for every record the resolver dropped, in input order.
    fn on_record_skipped(&mut self, _skipped: &SkippedRecord) {}

    /// Called once the destination set is frozen.
    fn on_destinations_loaded(&mut self, _destinations: &DestinationSet) {}

    /// Called after each successful append with the length of the new leg.
    fn on_waypoint_appended(&mut self, _route: &RouteTracker, _leg_km: f64) {}
}

/// A [`SessionObserver`] that does nothing.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
