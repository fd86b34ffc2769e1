//! `wp-geocode` — turning raw address records into map destinations.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`record`]    | `AddressRecord`, `ResolvedDestination`                        |
//! | [`geocoder`]  | `Geocoder` trait, `StaticGeocoder`                            |
//! | [`resolver`]  | `GeocodeResolver`, `resolve_all`, `CancelToken`, `ResolveReport` |
//! | [`source`]    | `RecordSource` trait, JSON/CSV loaders, `HttpRecordSource`    |
//! | [`index`]     | `DestinationSet` (R-tree backed nearest / radius queries)     |
//! | [`error`]     | `GeocodeError`, `FetchError`                                  |
//!
//! # Failure model
//!
//! Resolution is a batch in which every record stands alone.  A record whose
//! geocoding call fails, times out, or yields no usable candidate is skipped
//! and reported; it never aborts the batch and never appears in the output
//! with a placeholder coordinate.  A record source that cannot be reached
//! degrades to zero records via [`fetch_records_or_empty`].
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `http`  | Enables [`source::HttpRecordSource`] (blocking `reqwest`).    |
//! | `serde` | Derives `Serialize`/`Deserialize` on `ResolvedDestination`.   |

pub mod error;
pub mod geocoder;
pub mod index;
pub mod record;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{FetchError, FetchResult, GeocodeError, GeocodeResult};
pub use geocoder::{Geocoder, StaticGeocoder};
pub use index::DestinationSet;
pub use record::{AddressRecord, ResolvedDestination};
pub use resolver::{
    resolve_all, CancelToken, GeocodeResolver, ResolveReport, ResolverConfig, SkipReason,
    SkippedRecord,
};
pub use source::{
    fetch_records_or_empty, load_records_csv, load_records_json, JsonRecordSource, RecordSource,
};
#[cfg(feature = "http")]
pub use source::HttpRecordSource;
