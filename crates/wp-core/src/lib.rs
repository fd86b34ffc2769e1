//! `wp-core` — foundational types for the `waypath` route-accumulation engine.
//!
//! This crate is a dependency of every other `wp-*` crate.  It has no `wp-*`
//! dependencies and a single required external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`geo`]     | `Coordinate`, haversine `distance_km`, `path_length_km`   |
//! | [`ids`]     | `DestinationId`                                           |
//! | [`error`]   | `WpError`, `WpResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{WpError, WpResult};
pub use geo::{distance_km, path_length_km, Coordinate, EARTH_RADIUS_KM};
pub use ids::DestinationId;
