//! Address records as delivered by the remote data source, and their resolved
//! form.
//!
//! # Wire format
//!
//! The data source returns a JSON array of objects:
//!
//! ```json
//! [
//!   { "pickupaddress1": "221B Baker Street, London",
//!     "customername": "S. Holmes",
//!     "loancardaccountno": "LN-0001" }
//! ]
//! ```
//!
//! The camelCase names `pickupAddress`, `customerName` and `loanAccountNo`
//! are accepted as aliases.  Each field may be missing, `null`, or a number;
//! all of these decode to a string so one odd row cannot fail the whole
//! array.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use wp_core::Coordinate;

/// One unresolved row from the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(
        rename = "pickupaddress1",
        alias = "pickupAddress",
        alias = "pickup_address",
        default,
        deserialize_with = "lenient_string"
    )]
    pub pickup_address: String,

    #[serde(
        rename = "customername",
        alias = "customerName",
        alias = "customer_name",
        default,
        deserialize_with = "lenient_string"
    )]
    pub customer_name: String,

    #[serde(
        rename = "loancardaccountno",
        alias = "loanAccountNo",
        alias = "loan_account_no",
        default,
        deserialize_with = "lenient_string"
    )]
    pub loan_account_no: String,
}

impl AddressRecord {
    pub fn new(
        pickup_address: impl Into<String>,
        customer_name: impl Into<String>,
        loan_account_no: impl Into<String>,
    ) -> Self {
        Self {
            pickup_address:  pickup_address.into(),
            customer_name:   customer_name.into(),
            loan_account_no: loan_account_no.into(),
        }
    }
}

/// An [`AddressRecord`] whose address geocoded to `coordinate`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedDestination {
    pub record:     AddressRecord,
    pub coordinate: Coordinate,
}

impl ResolvedDestination {
    pub fn address(&self) -> &str {
        &self.record.pickup_address
    }

    pub fn name(&self) -> &str {
        &self.record.customer_name
    }

    pub fn reference_id(&self) -> &str {
        &self.record.loan_account_no
    }
}

// ── Lenient string decoding ───────────────────────────────────────────────────

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientString)
}

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(LenientString)
    }
}
