//! Listing Harvester - scroll-driven product listing collection
//!
//! Walks a paginated listing site, scrolls each page until lazily loaded
//! content stops growing, extracts description/price/link triples with CSS
//! selectors, and appends normalized rows to a dated CSV file.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub mod test_utils;

pub use application::{HarvestSummary, Harvester};
pub use domain::Record;
pub use infrastructure::{HarvestConfig, HarvestError};
