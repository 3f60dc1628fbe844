//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: visited detail URLs, the current listing page, the
//!   accumulated records and the success/failure counters of one run

mod crawl_state;

pub use crawl_state::CrawlState;
