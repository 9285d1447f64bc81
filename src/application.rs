//! Application layer module
//!
//! Orchestrates a harvest: scroll each page to its end, extract listings,
//! and hand normalized records to the sink.

pub mod extractor;
pub mod harvester;
pub mod scroll_driver;
pub mod settle;

pub use extractor::{ListingCounts, RawListing, SelectorExtractor};
pub use harvester::{HarvestSummary, Harvester};
pub use scroll_driver::ScrollDriver;
pub use settle::{Deadline, SettlePolicy};
