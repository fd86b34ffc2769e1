//! The geocoding capability and an in-memory table implementation.
//!
//! # Pluggability
//!
//! The resolver calls geocoding through the [`Geocoder`] trait, so a platform
//! geocoder, a web API client, or a fixed lookup table can be swapped in
//! without touching the batch logic.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use wp_core::Coordinate;

use crate::{GeocodeError, GeocodeResult};

// ── Geocoder trait ────────────────────────────────────────────────────────────

/// Address string → zero or more coordinate candidates, best first.
///
/// An empty `Vec` and an `Err` are both treated as "unresolvable" by the
/// resolver; implementations may use whichever is natural for their backend.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a call can be moved onto a helper
/// thread when the resolver enforces a per-call timeout.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        (**self).geocode(address)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        (**self).geocode(address)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        (**self).geocode(address)
    }
}

// ── StaticGeocoder ────────────────────────────────────────────────────────────

/// Fixed address → coordinate table.
///
/// Lookups ignore surrounding whitespace and ASCII case.  Unknown addresses
/// yield an empty candidate list rather than an error.
///
/// # CSV format
///
/// ```csv
/// address,latitude,longitude
/// "221B Baker Street, London",51.5237,-0.1585
/// ```
///
/// Repeating an address adds a further candidate after the existing ones.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    table: HashMap<String, Vec<Coordinate>>,
}

#[derive(Deserialize)]
struct GazetteerRow {
    address:   String,
    latitude:  f64,
    longitude: f64,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coordinate` as a candidate for `address`.
    pub fn insert(&mut self, address: &str, coordinate: Coordinate) -> &mut Self {
        self.table.entry(normalize(address)).or_default().push(coordinate);
        self
    }

    /// Load a table from a CSV file (see the type-level docs for the format).
    pub fn from_csv_path(path: &Path) -> GeocodeResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Like [`from_csv_path`](Self::from_csv_path) but accepts any `Read`
    /// source.
    pub fn from_csv_reader<R: Read>(reader: R) -> GeocodeResult<Self> {
        let mut geocoder = Self::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for row in csv_reader.deserialize::<GazetteerRow>() {
            let row = row?;
            geocoder.insert(&row.address, Coordinate::new(row.latitude, row.longitude));
        }
        Ok(geocoder)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        if address.trim().is_empty() {
            return Err(GeocodeError::NotFound(address.to_owned()));
        }
        Ok(self.table.get(&normalize(address)).cloned().unwrap_or_default())
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
