//! Crawler module for listing discovery and detail extraction
//!
//! This module contains the harvesting pipeline, including:
//! - HTTP fetching with the politeness pause
//! - Bounded retries with a run-wide failure ceiling
//! - Pagination discovery of detail URLs
//! - Fallback-chain extraction of exercise records
//! - Overall category coordination

mod coordinator;
pub mod discovery;
pub mod extractor;
mod fetcher;
mod parser;
pub mod retry;

pub use coordinator::{run_category, Coordinator, RunSummary};
pub use discovery::{parse_listing, DiscoveryOutcome, PaginationDiscoverer, StopReason};
pub use extractor::{extract_record, DetailExtractor, ExtractContext, ExtractionReport, FieldSource};
pub use fetcher::{build_http_client, Transport};
pub use parser::resolve_link;
pub use retry::{CallState, RetryBudget, RetryController};
