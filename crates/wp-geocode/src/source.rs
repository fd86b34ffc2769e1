//! Where address records come from.
//!
//! The production source is a single HTTP GET returning a JSON array (see
//! [`record`](crate::record) for the wire format): no pagination, no
//! authentication, no retry.  Tests and offline runs use the JSON and CSV
//! loaders on local readers instead.
//!
//! A source that fails is not fatal to a session.  [`fetch_records_or_empty`]
//! logs the failure and yields zero records, so the map simply shows no
//! destinations.

use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use log::{error, info};
use serde::Deserialize;

use crate::{AddressRecord, FetchError, FetchResult};

// ── RecordSource trait ────────────────────────────────────────────────────────

/// Supplier of the session's raw address records.
pub trait RecordSource {
    fn fetch(&self) -> FetchResult<Vec<AddressRecord>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn fetch(&self) -> FetchResult<Vec<AddressRecord>> {
        (**self).fetch()
    }
}

impl RecordSource for Vec<AddressRecord> {
    fn fetch(&self) -> FetchResult<Vec<AddressRecord>> {
        Ok(self.clone())
    }
}

/// Fetch from `source`, degrading any failure to an empty list.
pub fn fetch_records_or_empty<S: RecordSource + ?Sized>(source: &S) -> Vec<AddressRecord> {
    match source.fetch() {
        Ok(records) => {
            info!("fetched {} address records", records.len());
            records
        }
        Err(e) => {
            error!("error fetching address records: {e}; continuing with none");
            Vec::new()
        }
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Decode a JSON array of records from any `Read` source.
pub fn load_records_json<R: Read>(reader: R) -> FetchResult<Vec<AddressRecord>> {
    serde_json::from_reader(reader).map_err(|e| FetchError::Decode(e.to_string()))
}

/// A [`RecordSource`] that decodes a JSON payload held in memory or read once
/// from a reader.
///
/// The reader is consumed on the first successful read; later calls decode
/// the buffered bytes again.  A failed read keeps the reader, so the next
/// `fetch` reports the I/O error again rather than an empty payload.
pub struct JsonRecordSource {
    payload: Mutex<Payload>,
}

enum Payload {
    Pending(Box<dyn Read + Send>),
    Buffered(Vec<u8>),
}

impl JsonRecordSource {
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            payload: Mutex::new(Payload::Pending(Box::new(reader))),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Mutex::new(Payload::Buffered(bytes.into())),
        }
    }

    pub fn from_path(path: &Path) -> FetchResult<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }
}

impl RecordSource for JsonRecordSource {
    fn fetch(&self) -> FetchResult<Vec<AddressRecord>> {
        let mut payload = self
            .payload
            .lock()
            .map_err(|_| FetchError::Transport("record source lock poisoned".into()))?;

        let bytes = match std::mem::replace(&mut *payload, Payload::Buffered(Vec::new())) {
            Payload::Buffered(bytes) => bytes,
            Payload::Pending(mut reader) => {
                let mut buf = Vec::new();
                if let Err(e) = reader.read_to_end(&mut buf) {
                    *payload = Payload::Pending(reader);
                    return Err(e.into());
                }
                buf
            }
        };

        let records = load_records_json(bytes.as_slice());
        *payload = Payload::Buffered(bytes);
        records
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CsvAddressRow {
    #[serde(rename = "pickupaddress1", alias = "pickup_address", default)]
    pickup_address:  String,
    #[serde(rename = "customername", alias = "customer_name", default)]
    customer_name:   String,
    #[serde(rename = "loancardaccountno", alias = "loan_account_no", default)]
    loan_account_no: String,
}

/// Load records from CSV with a header row.
///
/// Header names follow the JSON wire names (`pickupaddress1,customername,
/// loancardaccountno`) or their snake_case forms.  All values are read as
/// text, so account numbers keep leading zeros.
pub fn load_records_csv<R: Read>(reader: R) -> FetchResult<Vec<AddressRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CsvAddressRow>()
        .map(|row| {
            let row = row.map_err(|e| FetchError::Decode(e.to_string()))?;
            Ok(AddressRecord {
                pickup_address:  row.pickup_address,
                customer_name:   row.customer_name,
                loan_account_no: row.loan_account_no,
            })
        })
        .collect()
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

#[cfg(feature = "http")]
pub use http::HttpRecordSource;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use log::debug;

    use super::load_records_json;
    use crate::{AddressRecord, FetchError, FetchResult, RecordSource};

    /// GET a fixed endpoint and decode its JSON array body.
    pub struct HttpRecordSource {
        endpoint: String,
        client:   reqwest::blocking::Client,
    }

    impl HttpRecordSource {
        pub fn new(endpoint: impl Into<String>) -> FetchResult<Self> {
            Self::with_timeout(endpoint, None)
        }

        pub fn with_timeout(endpoint: impl Into<String>, timeout: Option<Duration>) -> FetchResult<Self> {
            let mut builder = reqwest::blocking::Client::builder();
            if let Some(t) = timeout {
                builder = builder.timeout(t);
            }
            let client = builder
                .build()
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Ok(Self {
                endpoint: endpoint.into(),
                client,
            })
        }

        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    impl RecordSource for HttpRecordSource {
        fn fetch(&self) -> FetchResult<Vec<AddressRecord>> {
            debug!("GET {}", self.endpoint);
            let response = self
                .client
                .get(&self.endpoint)
                .send()
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let body = response
                .bytes()
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            load_records_json(body.as_ref())
        }
    }
}
