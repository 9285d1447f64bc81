//! Domain module - listing records and the rules that shape them
//!
//! - `normalizer`: description and price cleaning
//! - `pagination`: page number to URL mapping
//! - `record`: the output row

pub mod normalizer;
pub mod pagination;
pub mod record;

pub use normalizer::{clean_description, clean_price};
pub use pagination::{PagePlan, PageTarget, PaginationMode};
pub use record::{RECORD_HEADER, Record};
