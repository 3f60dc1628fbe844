use crate::model::ExerciseRecord;
use std::collections::HashSet;

/// Progress of one category crawl
///
/// The visited set guarantees that no detail URL is collected twice, no
/// matter how many listing pages repeat it.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    detail_urls: Vec<String>,
    current_page: u32,
    records: Vec<ExerciseRecord>,
    success_count: usize,
    failure_count: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detail URL unless it was collected before; returns true if new
    pub fn mark_discovered(&mut self, url: &str) -> bool {
        if self.is_visited(url) {
            return false;
        }
        self.visited.insert(url.to_string());
        self.detail_urls.push(url.to_string());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Detail URLs in discovery order
    pub fn detail_urls(&self) -> &[String] {
        &self.detail_urls
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn advance_page(&mut self) {
        self.current_page += 1;
    }

    /// Appends a fully extracted record
    pub fn record_success(&mut self, record: ExerciseRecord) {
        self.records.push(record);
        self.success_count += 1;
    }

    /// Appends the placeholder standing in for a failed extraction
    pub fn record_failure(&mut self, placeholder: ExerciseRecord) {
        self.records.push(placeholder);
        self.failure_count += 1;
    }

    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ExerciseRecord> {
        self.records
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_discovered_dedups() {
        let mut state = CrawlState::new();
        assert!(state.mark_discovered("https://example.com/a"));
        assert!(state.mark_discovered("https://example.com/b"));
        assert!(!state.mark_discovered("https://example.com/a"));

        assert_eq!(
            state.detail_urls(),
            &["https://example.com/a".to_string(), "https://example.com/b".to_string()]
        );
        assert!(state.is_visited("https://example.com/b"));
    }

    #[test]
    fn test_success_and_failure_counts() {
        let mut state = CrawlState::new();
        state.record_success(ExerciseRecord::placeholder("abs", "Abs", 1));
        state.record_failure(ExerciseRecord::placeholder("abs", "Abs", 2));
        state.record_success(ExerciseRecord::placeholder("abs", "Abs", 3));

        assert_eq!(state.success_count(), 2);
        assert_eq!(state.failure_count(), 1);
        assert_eq!(state.records().len(), 3);
        assert_eq!(state.records()[1].id, "abs-2");
    }

    #[test]
    fn test_advance_page() {
        let mut state = CrawlState::new();
        assert_eq!(state.current_page(), 0);
        state.advance_page();
        state.advance_page();
        assert_eq!(state.current_page(), 2);
    }
}
