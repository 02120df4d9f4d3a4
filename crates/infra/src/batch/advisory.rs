//! Progress expectations shown to operators before a run. Not behaviour-critical.

use crate::config::BatchConfig;

/// Rough duration of a run over `item_count` items at the default rate.
pub fn estimate_duration(item_count: usize) -> String {
    BatchConfig::default().estimate_duration(item_count)
}

/// Whether `item_count` items warrant a batching notice at the default threshold.
pub fn should_use_batching(item_count: usize) -> bool {
    BatchConfig::default().should_use_batching(item_count)
}

impl BatchConfig {
    /// `ceil(count / items_per_second)` seconds, shown in seconds, minutes or hours.
    pub fn estimate_duration(&self, item_count: usize) -> String {
        let rate = u64::from(self.items_per_second.max(1));
        let seconds = (item_count as u64).div_ceil(rate);

        if seconds < 60 {
            format!("Estimated time: {seconds} seconds")
        } else if seconds < 3600 {
            format!("Estimated time: {} minutes", seconds.div_ceil(60))
        } else {
            format!("Estimated time: {} hours", seconds.div_ceil(3600))
        }
    }

    pub fn should_use_batching(&self, item_count: usize) -> bool {
        item_count > self.batching_threshold
    }

    /// Notice for large selections; `None` at or below the threshold.
    pub fn batch_info_message(&self, item_count: usize) -> Option<String> {
        if !self.should_use_batching(item_count) {
            return None;
        }
        Some(format!(
            "Processing {item_count} items in batches of {}. {}",
            self.chunk_size,
            self.estimate_duration(item_count)
        ))
    }
}
