//! Page-range work splitting.
//!
//! Extraction, image detection and highlighting all split a document into
//! contiguous page ranges, process each range on a bounded rayon pool with
//! its own document handle, and concatenate the per-range results in page
//! order. Small documents skip the pool and run as a single range, which
//! produces the same output as the partitioned path.

use std::ops::Range;

use rayon::prelude::*;

use crate::error::{Error, Result};

/// Largest range handed to a single worker.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Default worker budget: available cores, capped at [`MAX_DEFAULT_WORKERS`].
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(MAX_DEFAULT_WORKERS)
}

/// A half-open range of zero-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    /// First page index
    pub start: usize,
    /// One past the last page index
    pub end: usize,
}

impl PageRange {
    /// Create a new range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of pages in the range.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range holds no pages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a page index falls inside the range.
    pub fn contains(&self, page_index: usize) -> bool {
        page_index >= self.start && page_index < self.end
    }

    /// The page indices as a standard range.
    pub fn pages(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// How a document is partitioned across workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Whether to use the worker pool at all
    pub parallel: bool,

    /// Worker budget (threads in the pool)
    pub max_workers: usize,

    /// Maximum pages per range; documents at or below this size are not split
    pub chunk_size: usize,
}

impl SplitOptions {
    /// Create split options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the worker pool.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the worker budget.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Set the maximum pages per range.
    pub fn with_chunk_size(mut self, pages: usize) -> Self {
        self.chunk_size = pages.max(1);
        self
    }

    /// Whether a document of `total_pages` is processed as one unit.
    pub fn is_single_unit(&self, total_pages: usize) -> bool {
        !self.parallel || total_pages <= self.chunk_size
    }

    /// Ranges for a document of `total_pages`, honoring the single-unit rule.
    pub fn ranges(&self, total_pages: usize) -> Vec<PageRange> {
        if self.is_single_unit(total_pages) {
            vec![PageRange::new(0, total_pages)]
        } else {
            page_ranges(total_pages, self.max_workers, self.chunk_size)
        }
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: default_max_workers(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Partition `[0, total_pages)` into contiguous, non-overlapping ranges.
///
/// The range size spreads the pages over the worker budget but never
/// exceeds `chunk_size`. The result depends only on the three arguments.
pub fn page_ranges(total_pages: usize, max_workers: usize, chunk_size: usize) -> Vec<PageRange> {
    let size = (total_pages / max_workers.max(1))
        .max(1)
        .min(chunk_size.max(1));

    (0..total_pages)
        .step_by(size)
        .map(|start| PageRange::new(start, (start + size).min(total_pages)))
        .collect()
}

/// Run `worker` once per range on a pool of `max_workers` threads.
///
/// Results come back in range order. The first failing range fails the
/// whole call; no partial results are returned.
pub fn map_ranges<R, F>(ranges: &[PageRange], max_workers: usize, worker: F) -> Result<Vec<R>>
where
    R: Send,
    F: Fn(PageRange) -> Result<R> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()
        .map_err(|e| Error::Other(format!("Failed to build worker pool: {}", e)))?;

    pool.install(|| {
        ranges
            .par_iter()
            .map(|range| {
                log::debug!("Worker processing pages {}..{}", range.start, range.end);
                worker(*range).map_err(|e| Error::Worker {
                    start: range.start,
                    end: range.end,
                    message: e.to_string(),
                })
            })
            .collect()
    })
}

/// Process a document's pages and concatenate the per-range results.
///
/// Documents that fit in one range (or a sequential configuration) call
/// `worker` directly with `0..total_pages`.
pub fn process_pages<T, F>(total_pages: usize, options: &SplitOptions, worker: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(PageRange) -> Result<Vec<T>> + Sync,
{
    if options.is_single_unit(total_pages) {
        return worker(PageRange::new(0, total_pages));
    }

    let ranges = page_ranges(total_pages, options.max_workers, options.chunk_size);
    log::debug!(
        "Splitting {} pages into {} ranges across {} workers",
        total_pages,
        ranges.len(),
        options.max_workers
    );

    let parts = map_ranges(&ranges, options.max_workers, worker)?;
    Ok(parts.into_iter().flatten().collect())
}
