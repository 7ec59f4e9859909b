/// Crawl state machine definitions
///
/// The coordinator moves through these phases:
/// `Listing(1)` → `Processing { .. }` → `Listing(2)` → … → `Done(reason)`.
use crate::crawler::ListingCandidate;
use std::fmt;

/// The current phase of a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlPhase {
    /// About to fetch the given 1-based listing page
    Listing(u32),

    /// Working through the candidates of one listing page
    Processing {
        /// The page the candidates came from
        page: u32,
        /// Candidates in document order
        candidates: Vec<ListingCandidate>,
        /// Index of the next candidate to handle
        index: usize,
    },

    /// The crawl has finished
    Done(StopReason),
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The configured number of images was saved
    QuotaReached,

    /// The configured `max-pages` ceiling was passed
    PageCeiling,

    /// Too many listing pages in a row produced no candidates
    EmptyPages,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuotaReached => "quota_reached",
            Self::PageCeiling => "page_ceiling",
            Self::EmptyPages => "empty_pages",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
