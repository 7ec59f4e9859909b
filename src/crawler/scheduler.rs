//! Polite request pacing
//!
//! The crawl is strictly sequential, so rate limiting reduces to one fixed pause
//! after every listing fetch and after every card attempt. Duplicate hits never
//! pause.

use std::time::Duration;

/// Inserts the polite delay between outbound requests
#[derive(Debug, Clone)]
pub struct Pacer {
    /// The fixed pause
    delay: Duration,

    /// Pauses taken so far
    pauses: u64,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pauses: 0 }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Sleeps for the polite delay
    pub async fn pause(&mut self) {
        self.pauses += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pauses(&self) -> u64 {
        self.pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pause_counts() {
        let mut pacer = Pacer::from_millis(0);
        pacer.pause().await;
        pacer.pause().await;
        assert_eq!(pacer.pauses(), 2);
    }

    #[tokio::test]
    async fn test_pause_waits_for_delay() {
        let mut pacer = Pacer::from_millis(30);
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(pacer.delay(), Duration::from_millis(30));
    }
}
