use nexus_core::FlaggedItem;

use super::BatchPromptFormatter;

/// Number of leading items formatted to estimate the per-item cost
const SAMPLE_SIZE: usize = 5;
/// Rough characters-per-token ratio
const CHARS_PER_TOKEN: usize = 4;

/// Decides whether a batch fits one request and how to split it if not
#[derive(Debug, Clone, Copy)]
pub struct BatchSizer {
    max_items_per_request: usize,
    max_token_budget: usize,
}

impl BatchSizer {
    pub fn new(max_items_per_request: usize, max_token_budget: usize) -> Self {
        Self {
            max_items_per_request: max_items_per_request.max(1),
            max_token_budget,
        }
    }

    pub fn max_items_per_request(&self) -> usize {
        self.max_items_per_request
    }

    pub fn max_token_budget(&self) -> usize {
        self.max_token_budget
    }

    /// Approximate token count of a batch
    ///
    /// Formats only the first [`SAMPLE_SIZE`] items and extrapolates their
    /// average to the whole batch.
    pub fn estimate_tokens(&self, items: &[FlaggedItem]) -> usize {
        if items.is_empty() {
            return 0;
        }

        let sample = &items[..items.len().min(SAMPLE_SIZE)];
        let sample_tokens = BatchPromptFormatter::format_items(sample).len() / CHARS_PER_TOKEN;
        let avg_per_item = sample_tokens as f64 / sample.len() as f64;

        (avg_per_item * items.len() as f64).ceil() as usize
    }

    /// True when the batch exceeds the item cap or the token budget.
    /// A single item can never be split further.
    pub fn should_split(&self, items: &[FlaggedItem]) -> bool {
        if items.len() <= 1 {
            return false;
        }
        items.len() > self.max_items_per_request
            || self.estimate_tokens(items) > self.max_token_budget
    }

    /// Chunk size for a split: at most three chunks on the first split,
    /// never more than the per-request cap
    pub fn chunk_size(&self, len: usize) -> usize {
        self.max_items_per_request.min(len.div_ceil(3)).max(1)
    }

    /// Partition items into order-preserving chunks
    pub fn plan_split<'a>(&self, items: &'a [FlaggedItem]) -> Vec<&'a [FlaggedItem]> {
        if items.is_empty() {
            return Vec::new();
        }
        items.chunks(self.chunk_size(items.len())).collect()
    }
}

impl Default for BatchSizer {
    fn default() -> Self {
        Self::new(20, 30_000)
    }
}
