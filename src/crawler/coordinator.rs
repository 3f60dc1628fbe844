//! Category crawl coordination
//!
//! This module drives one category from start to finish:
//! - Discovering detail URLs across the paginated listing
//! - Extracting every detail page in discovery order
//! - Folding failed extractions into placeholder records
//! - Writing periodic checkpoints and the final module

use crate::config::{CategoryConfig, Config};
use crate::crawler::discovery::{DiscoveryOutcome, PaginationDiscoverer};
use crate::crawler::extractor::{DetailExtractor, ExtractContext};
use crate::crawler::fetcher::Transport;
use crate::crawler::retry::{RetryBudget, RetryController};
use crate::model::{link_alternatives, ExerciseGroup, ExerciseRecord, MAX_ALTERNATIVES};
use crate::output::{write_final_module, CheckpointWriter};
use crate::state::CrawlState;
use crate::ScraperError;
use std::path::{Path, PathBuf};

/// Outcome of one category run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub category: String,
    /// Absent when discovery produced nothing to extract
    pub discovery: Option<DiscoveryOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    /// Location of the final module, if one was written
    pub output_path: Option<PathBuf>,
    /// Set when the failure ceiling cut the extraction short
    pub stopped_early: bool,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Share of attempted detail pages that were fully extracted, in percent
    pub fn success_rate(&self) -> f64 {
        if self.attempted() == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted() as f64 * 100.0
    }
}

/// Main coordinator for a single category
pub struct Coordinator {
    config: Config,
    category: CategoryConfig,
    transport: Transport,
    retry: RetryController,
    state: CrawlState,
    checkpoint: CheckpointWriter,
    output_path: PathBuf,
}

impl Coordinator {
    /// Creates a coordinator for the category registered under `category_key`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScraperError::UnknownCategory)` - No such key in the registry
    /// * `Err(ScraperError)` - The HTTP client could not be built
    pub fn new(config: Config, category_key: &str) -> Result<Self, ScraperError> {
        let category = config
            .category(category_key)
            .cloned()
            .ok_or_else(|| ScraperError::UnknownCategory(category_key.to_string()))?;
        let transport = Transport::from_config(&config)?;
        Ok(Self::with_transport(config, category, transport))
    }

    /// Creates a coordinator around an existing transport
    pub fn with_transport(config: Config, category: CategoryConfig, transport: Transport) -> Self {
        let output_path = category.output_file(&config.output.directory);
        let checkpoint = CheckpointWriter::new(
            &output_path,
            config.output.type_import.clone(),
            category.variable_name.clone(),
            config.crawler.checkpoint_interval,
        );
        let retry = RetryController::new(RetryBudget::from_config(&config.crawler));

        Self {
            config,
            category,
            transport,
            retry,
            state: CrawlState::new(),
            checkpoint,
            output_path,
        }
    }

    pub fn category(&self) -> &CategoryConfig {
        &self.category
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn checkpoint(&self) -> &CheckpointWriter {
        &self.checkpoint
    }

    fn group(&self, exercises: Vec<ExerciseRecord>) -> ExerciseGroup {
        ExerciseGroup {
            body_part: self.category.body_part.clone(),
            exercises,
        }
    }

    fn save_checkpoint(&self, total: usize) {
        let group = self.group(self.state.records().to_vec());
        if let Err(e) = self
            .checkpoint
            .write(&group, self.state.success_count(), total)
        {
            tracing::warn!("Failed to save progress: {}", e);
        }
    }

    /// Runs the category to completion
    ///
    /// A failure ceiling hit during extraction stops the loop, but the
    /// records gathered so far are still written as a complete module.
    /// The same hit during discovery has nothing to write and is returned
    /// as an error.
    pub async fn run(mut self) -> Result<RunSummary, ScraperError> {
        tracing::info!("Starting to scrape {} exercises...", self.category.body_part);

        let discoverer = PaginationDiscoverer::new(
            &self.transport,
            &self.category.url,
            self.config.crawler.runaway_page_limit,
        );
        let discovery = discoverer.run(&mut self.retry, &mut self.state).await?;

        let urls = self.state.detail_urls().to_vec();
        if urls.is_empty() {
            tracing::error!(
                "No exercise URLs found. Check the website structure or your internet connection."
            );
            return Ok(RunSummary {
                category: self.category.key.clone(),
                discovery: None,
                succeeded: 0,
                failed: 0,
                output_path: None,
                stopped_early: false,
            });
        }

        let total = urls.len();
        let mut stopped_early = false;
        let extractor = DetailExtractor::new(&self.transport);

        for (index, url) in urls.iter().enumerate() {
            let ordinal = index + 1;
            tracing::info!("Processing exercise {}/{}", ordinal, total);

            let context = ExtractContext {
                url,
                ordinal,
                id_prefix: &self.category.id_prefix,
                body_part: &self.category.body_part,
            };

            match extractor.fetch_record(&mut self.retry, &context).await {
                Ok(report) => {
                    self.state.record_success(report.record);
                    if self.checkpoint.is_due(self.state.success_count()) {
                        self.save_checkpoint(total);
                    }
                }
                Err(e) => {
                    tracing::warn!("Using placeholder for {}: {}", url, e);
                    self.state.record_failure(ExerciseRecord::placeholder(
                        &self.category.id_prefix,
                        &self.category.body_part,
                        ordinal,
                    ));
                    if e.is_fatal() {
                        tracing::error!("Stopping extraction: {}", e);
                        stopped_early = true;
                        break;
                    }
                }
            }
        }

        let succeeded = self.state.success_count();
        let failed = self.state.failure_count();
        let mut records = self.state.into_records();
        if self.config.crawler.link_alternatives {
            link_alternatives(&mut records, MAX_ALTERNATIVES);
        }
        let group = ExerciseGroup {
            body_part: self.category.body_part.clone(),
            exercises: records,
        };

        write_final_module(
            &self.output_path,
            &self.category,
            &self.config.output.type_import,
            &group,
        )?;
        if let Err(e) = self.checkpoint.clear() {
            tracing::warn!("Failed to remove temporary file: {}", e);
        }

        let summary = RunSummary {
            category: self.category.key.clone(),
            discovery: Some(discovery),
            succeeded,
            failed,
            output_path: Some(self.output_path),
            stopped_early,
        };
        tracing::info!(
            "Success rate: {}/{} ({:.1}%)",
            summary.succeeded,
            summary.attempted(),
            summary.success_rate()
        );
        Ok(summary)
    }
}

/// Runs the category registered under `category_key`
///
/// This is the main entry point for harvesting. It will:
/// 1. Resolve the category in the configured registry
/// 2. Build the HTTP transport
/// 3. Discover and extract every exercise
/// 4. Write the final module and remove the checkpoint
pub async fn run_category(config: Config, category_key: &str) -> Result<RunSummary, ScraperError> {
    Coordinator::new(config, category_key)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category() {
        let result = Coordinator::new(Config::default(), "forearms-and-toes");
        assert!(matches!(result, Err(ScraperError::UnknownCategory(key)) if key == "forearms-and-toes"));
    }

    #[test]
    fn test_output_locations() {
        let mut config = Config::default();
        config.output.directory = PathBuf::from("out");
        let coordinator = Coordinator::new(config, "abs").unwrap();

        assert_eq!(coordinator.output_path(), Path::new("out/abs.ts"));
        assert_eq!(coordinator.checkpoint().path(), Path::new("out/abs.temp.ts"));
        assert_eq!(coordinator.category().body_part, "Abs");
    }

    #[test]
    fn test_detects_leftover_checkpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.directory = dir.path().to_path_buf();

        let coordinator = Coordinator::new(config.clone(), "abs").unwrap();
        assert!(!coordinator.checkpoint().exists());

        std::fs::write(dir.path().join("abs.temp.ts"), "// partial\n").unwrap();
        let coordinator = Coordinator::new(config, "abs").unwrap();
        assert!(coordinator.checkpoint().exists());
    }

    #[test]
    fn test_success_rate() {
        let summary = RunSummary {
            category: "abs".to_string(),
            discovery: None,
            succeeded: 3,
            failed: 1,
            output_path: None,
            stopped_early: false,
        };
        assert_eq!(summary.attempted(), 4);
        assert!((summary.success_rate() - 75.0).abs() < f64::EPSILON);
    }
}
