//! The session's immutable destination set with a spatial index.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lon]` points narrows nearest and
//! radius queries.  The tree ranks candidates by planar distance in degree
//! space; every distance returned to the caller is the exact haversine value
//! from `wp-core`.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use wp_core::{Coordinate, DestinationId, EARTH_RADIUS_KM};

use crate::ResolvedDestination;

/// Kilometres per degree of arc on the haversine sphere.
const KM_PER_DEG: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct DestinationEntry {
    point: [f64; 2], // [lat, lon]
    id:    DestinationId,
}

impl RTreeObject for DestinationEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for DestinationEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── DestinationSet ────────────────────────────────────────────────────────────

/// Resolved destinations in resolution order, addressable by
/// [`DestinationId`].
///
/// Built once per session and never modified afterwards.
pub struct DestinationSet {
    destinations: Vec<ResolvedDestination>,
    spatial_idx:  RTree<DestinationEntry>,
}

impl DestinationSet {
    pub fn new(destinations: Vec<ResolvedDestination>) -> Self {
        let entries: Vec<DestinationEntry> = destinations
            .iter()
            .enumerate()
            .map(|(i, d)| DestinationEntry {
                point: [d.coordinate.latitude, d.coordinate.longitude],
                id:    DestinationId(i as u32),
            })
            .collect();

        Self {
            destinations,
            spatial_idx: RTree::bulk_load(entries),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, id: DestinationId) -> Option<&ResolvedDestination> {
        self.destinations.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DestinationId, &ResolvedDestination)> + '_ {
        self.destinations
            .iter()
            .enumerate()
            .map(|(i, d)| (DestinationId(i as u32), d))
    }

    pub fn as_slice(&self) -> &[ResolvedDestination] {
        &self.destinations
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The destination with the smallest great-circle distance to `point`,
    /// with that distance in kilometres.
    ///
    /// Candidates come from the R-tree in planar order until none left can
    /// beat the best haversine distance seen.  Near a pole or the
    /// antimeridian every destination is checked.
    ///
    /// Returns `None` only if the set is empty.
    pub fn nearest(&self, point: Coordinate) -> Option<(DestinationId, f64)> {
        let query = [point.latitude, point.longitude];
        let mut best: Option<(DestinationId, f64)> = None;

        for e in self.spatial_idx.nearest_neighbor_iter(&query) {
            if let Some((_, best_km)) = best {
                match degree_bound_2(point, best_km) {
                    Some(bound_2) if e.distance_2(&query) > bound_2 => break,
                    Some(_) => {}
                    None => return self.by_distance_from(point).into_iter().next(),
                }
            }
            let km = point.distance_km(self.destinations[e.id.index()].coordinate);
            if best.is_none_or(|(_, b)| km < b) {
                best = Some((e.id, km));
            }
        }
        best
    }

    /// Every destination within `radius_km` of `point`, nearest first.
    pub fn within_km(&self, point: Coordinate, radius_km: f64) -> Vec<(DestinationId, f64)> {
        let mut hits: Vec<(DestinationId, f64)> = match degree_bound_2(point, radius_km) {
            Some(bound_2) => self
                .spatial_idx
                .nearest_neighbor_iter(&[point.latitude, point.longitude])
                .take_while(|e| e.distance_2(&[point.latitude, point.longitude]) <= bound_2)
                .map(|e| (e.id, point.distance_km(self.destinations[e.id.index()].coordinate)))
                .filter(|&(_, d)| d <= radius_km)
                .collect(),
            // Near a pole or the antimeridian the degree box is not a safe
            // prefilter; check everything.
            None => self
                .by_distance_from(point)
                .into_iter()
                .filter(|&(_, d)| d <= radius_km)
                .collect(),
        };
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    /// All destinations with their distance from `point`, nearest first.
    pub fn by_distance_from(&self, point: Coordinate) -> Vec<(DestinationId, f64)> {
        let mut all: Vec<(DestinationId, f64)> = self
            .iter()
            .map(|(id, d)| (id, point.distance_km(d.coordinate)))
            .collect();
        all.sort_by(|a, b| a.1.total_cmp(&b.1));
        all
    }
}

impl Default for DestinationSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Squared degree-space radius that contains every point within `radius_km`
/// of `center`, or `None` when the box would cross a pole or the
/// antimeridian.
fn degree_bound_2(center: Coordinate, radius_km: f64) -> Option<f64> {
    let dlat = radius_km / KM_PER_DEG;
    let max_lat = center.latitude.abs() + dlat;
    if max_lat >= 90.0 {
        return None;
    }
    // From the haversine term: cos²(max_lat) · sin²(Δlon/2) ≤ sin²(r/2R).
    let s = (radius_km / EARTH_RADIUS_KM * 0.5).sin() / max_lat.to_radians().cos();
    if s >= 1.0 {
        return None;
    }
    let dlon = (2.0 * s.asin()).to_degrees();
    if center.longitude - dlon < -180.0 || center.longitude + dlon > 180.0 {
        return None;
    }
    Some(dlat * dlat + dlon * dlon)
}
