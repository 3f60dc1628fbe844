//! Configuration module for Rep-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every section has defaults, so a run without a file
//! uses the built-in category registry and the stock politeness settings.
//!
//! # Example
//!
//! ```no_run
//! use rep_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Politeness delay: {}ms", config.crawler.politeness_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_categories, CategoryConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
    BASE_URL,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default};
