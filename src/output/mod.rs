//! Output module for persisting crawl results
//!
//! This module handles:
//! - Appending one metadata row per saved image (CSV)
//! - Summarizing a finished run
//!
//! Image files themselves are written by the crawler's image materializer.

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvMetadataSink;
pub use stats::{print_report, CrawlReport};
pub use traits::{MetadataSink, SinkError, SinkResult};
