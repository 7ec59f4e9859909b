//! Run statistics
//!
//! The coordinator fills a [`CrawlReport`] as it goes and returns it when the
//! crawl reaches its terminal state.

use crate::crawler::SkipReason;
use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Counters and outcome of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stop_reason: Option<StopReason>,

    /// Listing pages requested
    pub pages_visited: u32,
    /// Listing pages whose fetch failed
    pub pages_failed: u32,

    /// Candidates extracted across all pages
    pub candidates_found: u64,
    /// Candidates skipped because their image URL was already seen
    pub duplicates: u64,
    /// Candidates skipped because their detail URL had no id
    pub missing_ids: u64,
    /// Candidates skipped because their image file already existed
    pub already_present: u64,
    /// Detail pages that could not be fetched
    pub detail_failures: u64,

    /// Images written to disk
    pub images_saved: u32,
    pub skipped_fetch_failed: u64,
    pub skipped_not_image: u64,
    pub skipped_write_failed: u64,

    /// Metadata rows appended
    pub metadata_rows: u64,
    /// Metadata rows that failed to persist
    pub metadata_failures: u64,

    /// Polite pauses taken
    pub pauses: u64,

    pub images_dir: PathBuf,
    pub metadata_path: PathBuf,
}

impl CrawlReport {
    pub fn new(images_dir: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            stop_reason: None,
            pages_visited: 0,
            pages_failed: 0,
            candidates_found: 0,
            duplicates: 0,
            missing_ids: 0,
            already_present: 0,
            detail_failures: 0,
            images_saved: 0,
            skipped_fetch_failed: 0,
            skipped_not_image: 0,
            skipped_write_failed: 0,
            metadata_rows: 0,
            metadata_failures: 0,
            pauses: 0,
            images_dir: images_dir.into(),
            metadata_path: metadata_path.into(),
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::FetchFailed => self.skipped_fetch_failed += 1,
            SkipReason::NotImage => self.skipped_not_image += 1,
            SkipReason::WriteFailed => self.skipped_write_failed += 1,
        }
    }

    pub fn images_skipped(&self) -> u64 {
        self.skipped_fetch_failed + self.skipped_not_image + self.skipped_write_failed
    }

    pub fn finish(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in whole seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    if let Some(reason) = report.stop_reason {
        println!("  Stop reason: {}", reason);
    }
    println!();

    println!("Listing:");
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Pages failed: {}", report.pages_failed);
    println!("  Candidates found: {}", report.candidates_found);
    println!("  Duplicates skipped: {}", report.duplicates);
    println!("  Missing card ids: {}", report.missing_ids);
    if report.already_present > 0 {
        println!("  Already on disk: {}", report.already_present);
    }
    println!();

    println!("Images:");
    println!("  Saved: {}", report.images_saved);
    println!("  Skipped: {}", report.images_skipped());
    println!("  Fetch failed: {}", report.skipped_fetch_failed);
    println!("  Not an image: {}", report.skipped_not_image);
    println!("  Write failed: {}", report.skipped_write_failed);
    println!("  Detail pages unavailable: {}", report.detail_failures);
    println!();

    println!("Metadata:");
    println!("  Rows appended: {}", report.metadata_rows);
    println!("  Rows failed: {}", report.metadata_failures);
    println!();

    println!("Images directory: {}", report.images_dir.display());
    println!("Metadata table: {}", report.metadata_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = CrawlReport::new("images", "images/metadata.csv");
        assert_eq!(report.images_saved, 0);
        assert_eq!(report.images_skipped(), 0);
        assert_eq!(report.stop_reason, None);
        assert_eq!(report.duration_seconds(), None);
    }

    #[test]
    fn test_record_skip() {
        let mut report = CrawlReport::new("images", "images/metadata.csv");
        report.record_skip(SkipReason::NotImage);
        report.record_skip(SkipReason::NotImage);
        report.record_skip(SkipReason::FetchFailed);

        assert_eq!(report.skipped_not_image, 2);
        assert_eq!(report.skipped_fetch_failed, 1);
        assert_eq!(report.images_skipped(), 3);
    }

    #[test]
    fn test_finish() {
        let mut report = CrawlReport::new("images", "images/metadata.csv");
        report.finish(StopReason::QuotaReached);

        assert_eq!(report.stop_reason, Some(StopReason::QuotaReached));
        assert!(report.duration_seconds().unwrap() >= 0);
    }
}
