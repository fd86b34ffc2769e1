//! route_walk — end-to-end walk through one waypath session.
//!
//! A collector starts in central London, pulls the day's pickup records,
//! resolves them against a small offline gazetteer, and visits four of
//! them.  One record has an address the gazetteer does not know and one has
//! no address at all; both are skipped without stopping the batch.
//!
//! Set `RUST_LOG=debug` to see every geocoding call.

use std::path::Path;

use anyhow::Result;
use log::info;
use serde_json::json;

use wp_core::{Coordinate, DestinationId};
use wp_geocode::{JsonRecordSource, SkippedRecord, StaticGeocoder};
use wp_route::{write_route_csv, RouteTracker};
use wp_session::{
    AnchorState, FixedLocation, HeadingSource, HeadingSubscription, MapLauncher, SensorError,
    SessionBuilder, SessionConfig, SessionObserver,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const START: Coordinate = Coordinate { latitude: 51.5074, longitude: -0.1278 }; // Trafalgar Square
const OUTPUT_DIR: &str  = "output/route_walk";

const SESSION_TOML: &str = r#"
platform           = "ios"
navigation_label   = "Pickup"
geocode_timeout_ms = 2000
"#;

// ── Gazetteer CSV ─────────────────────────────────────────────────────────────

const GAZETTEER_CSV: &str = "\
address,latitude,longitude\n\
Westminster Bridge Road,51.5008,-0.1177\n\
Camden High Street,51.5390,-0.1426\n\
Brick Lane,51.5215,-0.0717\n\
Greenwich Church Street,51.4812,-0.0090\n\
Kings Road,51.4872,-0.1687\n\
";

// ── Device stand-ins ──────────────────────────────────────────────────────────

struct FixedCompass(f64);

struct FixedReading(f64);

impl HeadingSubscription for FixedReading {
    fn heading_deg(&self) -> Option<f64> {
        Some(self.0)
    }

    fn remove(self: Box<Self>) {
        info!("compass listener removed");
    }
}

impl HeadingSource for FixedCompass {
    fn subscribe(&self) -> Result<Box<dyn HeadingSubscription>, SensorError> {
        Ok(Box::new(FixedReading(self.0)))
    }
}

struct PrintLauncher;

impl MapLauncher for PrintLauncher {
    fn open(&self, url: &str) -> Result<(), String> {
        println!("  open {url}");
        Ok(())
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ConsoleObserver {
    skipped: usize,
    legs:    usize,
}

impl SessionObserver for ConsoleObserver {
    fn on_anchor(&mut self, anchor: &AnchorState) {
        println!("Anchor: {anchor:?}");
    }

    fn on_record_skipped(&mut self, skipped: &SkippedRecord) {
        self.skipped += 1;
        println!(
            "  skipped #{} {:?}: {}",
            skipped.index, skipped.record.pickup_address, skipped.reason
        );
    }

    fn on_waypoint_appended(&mut self, route: &RouteTracker, leg_km: f64) {
        self.legs += 1;
        println!(
            "  leg {:>2}: {:>7.3} km   total {:>7.3} km",
            self.legs,
            leg_km,
            route.total_distance_km()
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== route_walk — waypath session ===");
    println!();

    // 1. Config and session.
    let config = SessionConfig::from_toml_str(SESSION_TOML)?;
    let mut session = SessionBuilder::new(config)
        .observer(ConsoleObserver::default())
        .heading_source(Box::new(FixedCompass(72.5)))
        .build()?;
    println!("Camera heading: {:.1}°", session.heading().heading_deg());

    // 2. Anchor.
    session.start(&FixedLocation(START));

    // 3. Records, as the collection service would return them.
    let payload = json!([
        { "pickupaddress1": "Westminster Bridge Road", "customername": "A. Okafor",  "loancardaccountno": "000417" },
        { "pickupaddress1": "Camden High Street",      "customername": "B. Nowak",   "loancardaccountno": 9921 },
        { "pickupaddress1": "Atlantis Avenue",         "customername": "C. Reyes",   "loancardaccountno": "001288" },
        { "pickupaddress1": "",                        "customername": "D. Ito",     "loancardaccountno": null },
        { "pickupaddress1": "Brick Lane",              "customername": "E. Haddad",  "loancardaccountno": "003050" },
        { "pickupaddress1": "Greenwich Church Street", "customername": "F. Lindqvist" },
    ]);
    let source = JsonRecordSource::from_bytes(serde_json::to_vec(&payload)?);
    let geocoder = StaticGeocoder::from_csv_reader(GAZETTEER_CSV.as_bytes())?;

    println!("Resolving records against {} gazetteer entries", geocoder.len());
    let summary = session.load_destinations(&source, geocoder)?;
    println!(
        "Fetched {} records: {} resolved, {} skipped",
        summary.fetched, summary.resolved, summary.skipped
    );
    println!();

    // 4. Destinations by distance from the anchor.
    let destinations = session.destinations().map(|d| d.by_distance_from(START)).unwrap_or_default();
    println!("{:<6} {:<26} {:<14} {:>9}", "Id", "Address", "Customer", "Km");
    println!("{}", "-".repeat(58));
    for &(id, km) in &destinations {
        if let Some(d) = session.destinations().and_then(|set| set.get(id)) {
            println!("{:<6} {:<26} {:<14} {:>9.3}", id.0, d.address(), d.name(), km);
        }
    }
    println!();

    // 5. Visit: nearest first, then back out past the start.
    println!("Visiting:");
    for id in [DestinationId(0), DestinationId(2), DestinationId(3), DestinationId(1)] {
        session.select_and_navigate(id, &PrintLauncher)?;
    }
    println!();

    // 6. Export.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let route_path = Path::new(OUTPUT_DIR).join("route.csv");
    write_route_csv(&route_path, session.route(), START)?;

    // 7. Summary.
    println!("Route: {} waypoints, {:.3} km", session.route().len(), session.total_distance_km());
    println!(
        "Observer: {} legs, {} skipped records",
        session.observer().legs,
        session.observer().skipped
    );
    println!("  {}", route_path.display());

    session.end();
    Ok(())
}
