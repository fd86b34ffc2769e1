//! Hand-off to the platform's map application for turn-by-turn directions.
//!
//! The session never navigates itself.  Selecting a destination produces a
//! URL in the platform's map scheme:
//!
//! | Platform  | URL                                   |
//! |-----------|---------------------------------------|
//! | `ios`     | `maps:0,0?q=<label>@<lat>,<lon>`      |
//! | `android` | `geo:0,0?q=<lat>,<lon>(<label>)`      |
//!
//! The label is percent-encoded.  Opening the URL is up to a
//! [`MapLauncher`]; a launch failure never affects the route.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use wp_core::Coordinate;

/// Target platform for the map URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    #[default]
    Android,
}

/// A destination to hand to the external map app.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationTarget {
    pub coordinate: Coordinate,
    pub label:      String,
}

impl NavigationTarget {
    pub fn new(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: label.into(),
        }
    }

    /// The platform map URL for this target.
    pub fn url(&self, platform: Platform) -> String {
        let lat = self.coordinate.latitude;
        let lon = self.coordinate.longitude;
        let label = encode_label(&self.label);
        match platform {
            Platform::Ios     => format!("maps:0,0?q={label}@{lat},{lon}"),
            Platform::Android => format!("geo:0,0?q={lat},{lon}({label})"),
        }
    }
}

/// Opens a map URL on the device.
pub trait MapLauncher {
    fn open(&self, url: &str) -> Result<(), String>;
}

/// Everything outside the RFC 3986 unreserved set.
const LABEL: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

fn encode_label(label: &str) -> String {
    utf8_percent_encode(label, LABEL).to_string()
}
