//! One map session: anchor, destination set, route, and heading slot.

use log::{error, info, warn};

use wp_core::{Coordinate, DestinationId};
use wp_geocode::{
    fetch_records_or_empty, CancelToken, DestinationSet, GeocodeResolver, Geocoder, RecordSource,
    ResolverConfig,
};
#[cfg(feature = "http")]
use wp_geocode::HttpRecordSource;
use wp_route::{RouteTracker, Waypoint};

use crate::{
    HeadingSlot, LocationError, LocationProvider, MapLauncher, NavigationTarget, SessionConfig,
    SessionError, SessionObserver, SessionResult,
};

// ── Anchor ────────────────────────────────────────────────────────────────────

/// Where the route starts, or why it cannot.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorState {
    /// [`Session::start`] has not run yet.
    Pending,
    /// The user's start location.  Fixed for the rest of the session.
    Known(Coordinate),
    /// The location provider failed; the session runs degraded and no
    /// waypoint can be appended.
    Unavailable(LocationError),
}

impl AnchorState {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            AnchorState::Known(c) => Some(*c),
            _ => None,
        }
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Outcome of [`Session::load_destinations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub fetched:   usize,
    pub resolved:  usize,
    pub skipped:   usize,
    pub cancelled: bool,
}

/// Outcome of [`Session::select_destination`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub destination:    DestinationId,
    /// Platform map URL for turn-by-turn directions.
    pub navigation_url: String,
    /// Length of the leg this selection added.
    pub leg_km:         f64,
    /// Route total after the append.
    pub total_km:       f64,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One map session.  Build with [`SessionBuilder`](crate::SessionBuilder).
///
/// All mutation goes through `&mut self`, so a session has a single writer
/// by construction.  To end a session from another thread while destinations
/// are still resolving, cancel the token from
/// [`cancel_token`](Self::cancel_token).
pub struct Session<O: SessionObserver> {
    pub(crate) config:       SessionConfig,
    pub(crate) anchor:       AnchorState,
    pub(crate) destinations: Option<DestinationSet>,
    pub(crate) route:        RouteTracker,
    pub(crate) heading:      HeadingSlot,
    pub(crate) cancel:       CancelToken,
    pub(crate) observer:     O,
}

impl<O: SessionObserver> Session<O> {
    /// Ask `location` for the anchor.
    ///
    /// Only the first call queries the provider; later calls return the
    /// stored state.  Failure puts the session in degraded mode rather than
    /// returning an error.
    pub fn start<L: LocationProvider + ?Sized>(&mut self, location: &L) -> &AnchorState {
        if self.anchor != AnchorState::Pending {
            return &self.anchor;
        }

        self.anchor = match location.current_position() {
            Ok(c) if c.is_valid() => {
                info!("session anchor at {c}");
                AnchorState::Known(c)
            }
            Ok(c) => {
                error!("location provider returned invalid position {c}");
                AnchorState::Unavailable(LocationError::Unavailable(format!("invalid position {c}")))
            }
            Err(e) => {
                error!("error getting location: {e}");
                AnchorState::Unavailable(e)
            }
        };

        self.observer.on_anchor(&self.anchor);
        &self.anchor
    }

    /// Fetch records from `source` and resolve them with `geocoder`.
    ///
    /// A fetch failure yields zero destinations.  Resolution is sequential;
    /// unresolvable records are skipped and reported to the observer.
    ///
    /// Cancellation is final for the session.  A load that is cancelled
    /// mid-batch stores nothing, and once the session is cancelled every call
    /// returns a cancelled summary without touching `source` or `geocoder`.
    ///
    /// # Errors
    ///
    /// [`SessionError::DestinationsAlreadyLoaded`] if a previous call already
    /// stored a destination set.
    pub fn load_destinations<S, G>(&mut self, source: &S, geocoder: G) -> SessionResult<LoadSummary>
    where
        S: RecordSource + ?Sized,
        G: Geocoder + 'static,
    {
        if self.destinations.is_some() {
            return Err(SessionError::DestinationsAlreadyLoaded);
        }
        if self.cancel.is_cancelled() {
            warn!("session cancelled; not fetching destinations");
            return Ok(LoadSummary {
                fetched:   0,
                resolved:  0,
                skipped:   0,
                cancelled: true,
            });
        }

        let records = fetch_records_or_empty(source);
        let fetched = records.len();

        let report = GeocodeResolver::new(geocoder)
            .with_config(ResolverConfig {
                call_timeout: self.config.geocode_timeout(),
                ..ResolverConfig::default()
            })
            .with_cancel_token(self.cancel.clone())
            .resolve(records);

        let summary = LoadSummary {
            fetched,
            resolved:  report.resolved_count(),
            skipped:   report.skipped_count(),
            cancelled: report.cancelled,
        };

        if report.cancelled {
            warn!("destination loading cancelled; discarding partial results");
            return Ok(summary);
        }

        for skipped in &report.skipped {
            self.observer.on_record_skipped(skipped);
        }

        let set = DestinationSet::new(report.destinations);
        self.observer.on_destinations_loaded(&set);
        self.destinations = Some(set);

        Ok(summary)
    }

    /// [`load_destinations`](Self::load_destinations) from the configured
    /// `records_endpoint` over HTTP.
    ///
    /// # Errors
    ///
    /// [`SessionError::Config`] if no endpoint is configured or the HTTP
    /// client cannot be built.  An unreachable endpoint or a non-2xx answer
    /// is not an error; it yields zero destinations.
    #[cfg(feature = "http")]
    pub fn load_destinations_from_config<G>(&mut self, geocoder: G) -> SessionResult<LoadSummary>
    where
        G: Geocoder + 'static,
    {
        let endpoint = self
            .config
            .records_endpoint
            .clone()
            .ok_or_else(|| SessionError::Config("records_endpoint is not set".into()))?;
        let source = HttpRecordSource::with_timeout(endpoint, self.config.fetch_timeout())
            .map_err(|e| SessionError::Config(e.to_string()))?;
        self.load_destinations(&source, geocoder)
    }

    /// Add destination `id` to the route and build its navigation URL.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoAnchor`] before a successful [`start`](Self::start).
    /// - [`SessionError::UnknownDestination`] if `id` is not in the set.
    ///
    /// The route is unchanged on error.
    pub fn select_destination(&mut self, id: DestinationId) -> SessionResult<Selection> {
        let anchor = self.anchor.coordinate().ok_or(SessionError::NoAnchor)?;
        let dest = self
            .destinations
            .as_ref()
            .and_then(|set| set.get(id))
            .ok_or(SessionError::UnknownDestination(id))?;

        let navigation_url = NavigationTarget::new(dest.coordinate, self.config.navigation_label.as_str())
            .url(self.config.platform);
        let waypoint = waypoint_for(dest.coordinate, dest.address(), dest.name(), dest.reference_id());

        let from = self.route.last().map_or(anchor, Waypoint::coordinate);
        let leg_km = from.distance_km(waypoint.coordinate());
        let total_km = self.route.append_waypoint(waypoint, anchor)?;

        info!("selected {id}: leg {leg_km:.2} km, total {total_km:.2} km");
        self.observer.on_waypoint_appended(&self.route, leg_km);

        Ok(Selection {
            destination: id,
            navigation_url,
            leg_km,
            total_km,
        })
    }

    /// [`select_destination`](Self::select_destination), then open the URL
    /// with `launcher`.  A launch failure is logged and does not undo the
    /// append.
    pub fn select_and_navigate<M: MapLauncher + ?Sized>(
        &mut self,
        id: DestinationId,
        launcher: &M,
    ) -> SessionResult<Selection> {
        let selection = self.select_destination(id)?;
        if let Err(e) = launcher.open(&selection.navigation_url) {
            warn!("could not open map app for {id}: {e}");
        }
        Ok(selection)
    }

    /// Great-circle distance from the anchor to destination `id`.
    pub fn distance_to(&self, id: DestinationId) -> SessionResult<f64> {
        let anchor = self.anchor.coordinate().ok_or(SessionError::NoAnchor)?;
        let dest = self
            .destinations
            .as_ref()
            .and_then(|set| set.get(id))
            .ok_or(SessionError::UnknownDestination(id))?;
        Ok(anchor.distance_km(dest.coordinate))
    }

    /// Stop any in-flight destination loading and release the heading sensor.
    pub fn end(&mut self) {
        self.cancel.cancel();
        self.heading.unsubscribe();
        info!(
            "session ended: {} waypoints, {:.2} km",
            self.route.len(),
            self.route.total_distance_km()
        );
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn anchor(&self) -> &AnchorState {
        &self.anchor
    }

    /// `None` until [`load_destinations`](Self::load_destinations) succeeds.
    pub fn destinations(&self) -> Option<&DestinationSet> {
        self.destinations.as_ref()
    }

    pub fn route(&self) -> &RouteTracker {
        &self.route
    }

    pub fn total_distance_km(&self) -> f64 {
        self.route.total_distance_km()
    }

    pub fn heading(&self) -> &HeadingSlot {
        &self.heading
    }

    pub fn heading_mut(&mut self) -> &mut HeadingSlot {
        &mut self.heading
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

fn waypoint_for(coordinate: Coordinate, address: &str, name: &str, reference_id: &str) -> Waypoint {
    let mut w = Waypoint::new(coordinate);
    if !address.is_empty() {
        w = w.with_address(address);
    }
    if !name.is_empty() {
        w = w.with_name(name);
    }
    if !reference_id.is_empty() {
        w = w.with_reference_id(reference_id);
    }
    w
}
