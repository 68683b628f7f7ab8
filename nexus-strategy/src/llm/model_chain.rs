/// Ordered remote models, most preferred first
///
/// The index only moves forward: each step trades quality or cost for
/// availability, and a chain never recovers within one analyzer's lifetime.
#[derive(Debug, Clone)]
pub struct ModelFallbackChain {
    models: Vec<String>,
    index: usize,
}

impl ModelFallbackChain {
    /// Create a chain; an empty list yields a chain whose `current` is empty
    pub fn new(models: Vec<String>) -> Self {
        if models.is_empty() {
            tracing::warn!("Model fallback chain created without models");
        }
        Self { models, index: 0 }
    }

    /// Model at the current position
    pub fn current(&self) -> &str {
        self.models
            .get(self.index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Step to the next model
    ///
    /// # Returns
    /// `false` when already on the last model (chain exhausted); the index
    /// is left unchanged in that case
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.models.len() {
            self.index += 1;
            tracing::warn!("Falling back to model: {}", self.current());
            true
        } else {
            false
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_exhausted(&self) -> bool {
        self.index + 1 >= self.models.len()
    }
}
