//! Harvested record entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::normalizer::{clean_description, clean_price};

/// Column order of the output table
pub const RECORD_HEADER: [&str; 5] = ["store", "date", "link", "description", "price"];

/// One harvested listing row.
///
/// Field order matches [`RECORD_HEADER`]; the CSV sink serializes the struct
/// positionally, so reordering fields changes the file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub store: String,
    pub date: NaiveDate,
    pub link: Option<String>,
    pub description: String,
    pub price: String,
}

impl Record {
    /// Build a record from raw extracted values, normalizing description and price.
    pub fn from_raw(
        store: &str,
        date: NaiveDate,
        link: Option<String>,
        raw_description: &str,
        raw_price: &str,
    ) -> Self {
        Self {
            store: store.to_string(),
            date,
            link,
            description: clean_description(raw_description),
            price: clean_price(raw_price),
        }
    }
}
