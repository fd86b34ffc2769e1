//! `wp-route` — the travelled path and its cumulative distance.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`waypoint`]  | `Waypoint` — coordinate plus optional metadata              |
//! | [`tracker`]   | `RouteTracker`, `Leg`, `Legs`                               |
//! | [`export`]    | `write_route_csv`, `write_route_writer`                     |
//! | [`error`]     | `RouteError`, `RouteResult<T>`                              |
//!
//! # Distance model
//!
//! The route always starts at a fixed **anchor** (the user's start location)
//! that is not itself stored as a waypoint:
//!
//! ```text
//! total = d(anchor, w[0]) + d(w[0], w[1]) + … + d(w[n-2], w[n-1])
//! ```
//!
//! The total is recomputed from the anchor on every append.  Waypoints are
//! never removed or reordered.

pub mod error;
pub mod export;
pub mod tracker;
pub mod waypoint;


pub use error::{RouteError, RouteResult};
pub use export::{write_route_csv, write_route_writer};
pub use tracker::{Leg, Legs, RouteTracker};
pub use waypoint::Waypoint;
