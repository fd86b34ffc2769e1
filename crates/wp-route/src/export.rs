//! CSV export of the travelled route.
//!
//! One row per leg:
//!
//! ```csv
//! seq,from_lat,from_lon,to_lat,to_lon,leg_km,cumulative_km,name,reference_id
//! 0,0.000000,0.000000,0.000000,1.000000,111.194927,111.194927,,
//! ```
//!
//! `name` and `reference_id` are empty when the waypoint carries none.

use std::io::Write;
use std::path::Path;

use csv::Writer;

use wp_core::Coordinate;

use crate::{RouteResult, RouteTracker};

const HEADER: [&str; 9] = [
    "seq",
    "from_lat",
    "from_lon",
    "to_lat",
    "to_lon",
    "leg_km",
    "cumulative_km",
    "name",
    "reference_id",
];

/// Write the route's legs, starting at `anchor`, to a CSV file at `path`.
pub fn write_route_csv(path: &Path, route: &RouteTracker, anchor: Coordinate) -> RouteResult<()> {
    let file = std::fs::File::create(path)?;
    write_route_writer(file, route, anchor)
}

/// Like [`write_route_csv`] but accepts any `Write` sink.
pub fn write_route_writer<W: Write>(
    sink: W,
    route: &RouteTracker,
    anchor: Coordinate,
) -> RouteResult<()> {
    let mut w = Writer::from_writer(sink);
    w.write_record(HEADER)?;

    let mut cumulative = 0.0;
    for (seq, leg) in route.legs(anchor).enumerate() {
        cumulative += leg.distance_km;
        let to = leg.to.coordinate();
        w.write_record(&[
            seq.to_string(),
            format!("{:.6}", leg.from.latitude),
            format!("{:.6}", leg.from.longitude),
            format!("{:.6}", to.latitude),
            format!("{:.6}", to.longitude),
            format!("{:.6}", leg.distance_km),
            format!("{:.6}", cumulative),
            leg.to.name().unwrap_or_default().to_owned(),
            leg.to.reference_id().unwrap_or_default().to_owned(),
        ])?;
    }

    w.flush()?;
    Ok(())
}
