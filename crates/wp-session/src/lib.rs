//! `wp-session` — one map session from start location to travelled route.
//!
//! # Lifecycle
//!
//! ```text
//! SessionBuilder::new(config).build()
//!   ① start(location)            — acquire the anchor once; denial → degraded
//!   ② load_destinations(src, g)  — fetch records (failure → none), resolve
//!                                  sequentially, freeze the DestinationSet
//!   ③ select_destination(id)*    — navigation URL + append waypoint; needs ①
//!   ④ end() / drop               — cancel resolution, release heading sensor
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`session`]    | `Session`, `AnchorState`, `Selection`, `LoadSummary`      |
//! | [`builder`]    | `SessionBuilder`                                          |
//! | [`config`]     | `SessionConfig` (TOML)                                    |
//! | [`location`]   | `LocationProvider` trait, `FixedLocation`                 |
//! | [`navigation`] | `Platform`, `NavigationTarget`, `MapLauncher`             |
//! | [`sensor`]     | `HeadingSource`, `HeadingSubscription`, `HeadingSlot`     |
//! | [`observer`]   | `SessionObserver`, `NoopObserver`                         |
//! | [`error`]      | `SessionError`, `LocationError`, `SensorError`            |

pub mod builder;
pub mod config;
pub mod error;
pub mod location;
pub mod navigation;
pub mod observer;
pub mod sensor;
pub mod session;


pub use builder::SessionBuilder;
pub use config::SessionConfig;
pub use error::{LocationError, SensorError, SessionError, SessionResult};
pub use location::{FixedLocation, LocationProvider};
pub use navigation::{MapLauncher, NavigationTarget, Platform};
pub use observer::{NoopObserver, SessionObserver};
pub use sensor::{HeadingSlot, HeadingSource, HeadingSubscription};
pub use session::{AnchorState, LoadSummary, Selection, Session};
