//! State module for tracking crawl progress
//!
//! This module provides the state owned by the coordinator for one run.
//!
//! # Components
//!
//! - `CrawlPhase`: Where the crawl state machine currently is (listing, processing, done)
//! - `StopReason`: Why the crawl reached `Done`
//! - `SeenSet`: Image URLs already dispatched this run
//! - `Quota`: Confirmed image saves against the configured maximum

mod crawl_state;
mod progress;

// Re-export main types
pub use crawl_state::{CrawlPhase, StopReason};
pub use progress::{Quota, SeenSet};
