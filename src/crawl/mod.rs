//! # Crawl
//! Browser-driven steps of a cycle: one category search, then detail
//! enrichment of the records picked from it.
//!
//! Both steps tolerate slow or failing responses. A missed listing response
//! falls back to whatever the page currently shows; a missed detail response
//! leaves the record with its listing fields.

pub mod detail;
pub mod list;

pub use detail::enrich_details;
pub use list::search_category;
