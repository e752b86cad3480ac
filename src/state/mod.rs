//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `CatalogPhase`: phase of the sequential catalog crawl (idle, paging, done)
//! - `LinkSet`: insertion-ordered, deduplicated set of discovered book links

mod catalog_phase;
mod link_set;

// Re-export main types
pub use catalog_phase::CatalogPhase;
pub use link_set::LinkSet;
