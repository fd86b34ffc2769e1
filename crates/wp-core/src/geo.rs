//! Geographic coordinate type and great-circle distance.
//!
//! `Coordinate` uses `f64` latitude/longitude.  Route totals are summed over
//! many legs and displayed to two decimals of a kilometre, so single
//! precision would drift visibly on long sessions.

use std::fmt;

use crate::{WpError, WpResult};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 geographic coordinate in decimal degrees.
///
/// `new` does not validate; use [`Coordinate::try_new`] or
/// [`Coordinate::validate`] at any boundary where NaN or out-of-range values
/// could enter.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub latitude:  f64,
    pub longitude: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Construct a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(latitude: f64, longitude: f64) -> WpResult<Self> {
        let c = Self::new(latitude, longitude);
        c.validate()?;
        Ok(c)
    }

    /// `true` if both components are finite and within
    /// `[-90, 90]` × `[-180, 180]`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns `WpError::InvalidCoordinate` unless [`is_valid`](Self::is_valid).
    pub fn validate(&self) -> WpResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(WpError::InvalidCoordinate {
                latitude:  self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Haversine great-circle distance in kilometres.
    ///
    /// Symmetric, non-negative, and zero for identical points.  Antipodal
    /// points give `π · R`.  NaN components propagate NaN; validation is the
    /// caller's job.
    pub fn distance_km(self, other: Coordinate) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let h = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        // Rounding can push h a hair outside [0, 1] near antipodes.
        let h = h.clamp(0.0, 1.0);

        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    /// `(latitude, longitude)`.
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Free-function form of [`Coordinate::distance_km`].
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    a.distance_km(b)
}

/// Sum of great-circle distances over every consecutive pair in `points`.
///
/// Returns `0.0` for fewer than two points.
pub fn path_length_km<I>(points: I) -> f64
where
    I: IntoIterator<Item = Coordinate>,
{
    let mut iter = points.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for p in iter {
        total += prev.distance_km(p);
        prev = p;
    }
    total
}
