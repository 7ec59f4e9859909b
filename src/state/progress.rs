use std::collections::HashSet;

/// Image URLs already dispatched during this run
///
/// Grows monotonically and lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure membership test
    pub fn contains(&self, image_url: &str) -> bool {
        self.urls.contains(image_url)
    }

    /// Records a URL; returns false if it was already present
    pub fn insert(&mut self, image_url: &str) -> bool {
        self.urls.insert(image_url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Confirmed image saves against the run's maximum
#[derive(Debug, Clone)]
pub struct Quota {
    saved: u32,
    max: u32,
}

impl Quota {
    pub fn new(max: u32) -> Self {
        Self { saved: 0, max }
    }

    /// Counts one confirmed save; never moves past the maximum
    pub fn record_save(&mut self) {
        if self.saved < self.max {
            self.saved += 1;
        }
    }

    pub fn is_reached(&self) -> bool {
        self.saved >= self.max
    }

    pub fn saved(&self) -> u32 {
        self.saved
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_set_insert_once() {
        let mut seen = SeenSet::new();
        assert!(seen.is_empty());
        assert!(!seen.contains("https://polkrf.ru/u/1.jpg"));

        assert!(seen.insert("https://polkrf.ru/u/1.jpg"));
        assert!(!seen.insert("https://polkrf.ru/u/1.jpg"));
        assert!(seen.contains("https://polkrf.ru/u/1.jpg"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_quota_stops_at_max() {
        let mut quota = Quota::new(2);
        assert!(!quota.is_reached());

        quota.record_save();
        assert!(!quota.is_reached());
        quota.record_save();
        assert!(quota.is_reached());

        quota.record_save();
        assert_eq!(quota.saved(), 2);
        assert_eq!(quota.max(), 2);
    }
}
