//! Extraction options and configuration.

use crate::parallel::SplitOptions;

/// Options for extracting fragments, sentences and image regions.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Error handling mode for pages that cannot be interpreted
    pub error_mode: ErrorMode,

    /// Page-range splitting
    pub split: SplitOptions,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to interpret).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.split = self.split.sequential();
        self
    }

    /// Set the worker budget.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.split = self.split.with_max_workers(workers);
        self
    }

    /// Set the maximum pages per worker range.
    pub fn with_chunk_size(mut self, pages: usize) -> Self {
        self.split = self.split.with_chunk_size(pages);
        self
    }

    /// Replace the split options wholesale.
    pub fn with_split(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    #[default]
    Strict,
    /// Log the failure and treat the page as empty
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .lenient()
            .with_max_workers(3)
            .with_chunk_size(4)
            .sequential();

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.split.max_workers, 3);
        assert_eq!(options.split.chunk_size, 4);
        assert!(!options.split.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.split.parallel);
        assert_eq!(options.split.chunk_size, 10);
    }
}
