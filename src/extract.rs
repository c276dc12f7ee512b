//! Document-level extraction entry points.
//!
//! Every function here opens the document fresh, runs the pages through the
//! page-range splitter and returns results in page order. Nothing is cached
//! between calls.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Fragment, ImageRegion, PageContent, Sentence, TextBlock};
use crate::parallel::process_pages;
use crate::parser::{read_page_range, ExtractOptions, PdfDocument};
use crate::sentences::split_blocks;

/// Sentences and images of a whole document, from one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    /// Number of pages in the document
    pub page_count: usize,
    /// All reconstructed sentences, in page order
    pub sentences: Vec<Sentence>,
    /// All image regions, in page order
    pub images: Vec<ImageRegion>,
}

/// Number of pages in a document.
pub fn page_count<P: AsRef<Path>>(path: P) -> Result<usize> {
    Ok(PdfDocument::open(path)?.page_count())
}

/// Interpret every page and map it through `per_page`, in page order.
pub fn extract_pages<T, F>(path: &Path, options: &ExtractOptions, per_page: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(PageContent) -> Vec<T> + Sync,
{
    let total = page_count(path)?;
    process_pages(total, &options.split, |range| {
        Ok(read_page_range(path, range, options)?
            .into_iter()
            .flat_map(&per_page)
            .collect())
    })
}

/// All page contents of a document.
pub fn extract_page_contents<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<PageContent>> {
    extract_pages(path.as_ref(), options, |page| vec![page])
}

/// All text blocks, in page and reading order.
pub fn extract_text_blocks<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<TextBlock>> {
    extract_pages(path.as_ref(), options, |page| page.blocks)
}

/// All fragments of all blocks, in page and reading order.
pub fn extract_fragments<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<Fragment>> {
    extract_pages(path.as_ref(), options, |page| {
        page.blocks.into_iter().flat_map(|b| b.fragments).collect()
    })
}

/// All reconstructed sentences, in page order.
pub fn extract_sentences<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<Sentence>> {
    extract_pages(path.as_ref(), options, |page| split_blocks(&page.blocks))
}

/// All image regions, in page order.
pub fn image_regions<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<ImageRegion>> {
    extract_pages(path.as_ref(), options, |page| page.images)
}

/// Sentences and image regions together, reading each page once.
pub fn extract_document<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<DocumentExtraction> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let pages = extract_page_contents(path, options)?;
    let page_count = page_count(path)?;

    let mut extraction = DocumentExtraction {
        page_count,
        ..Default::default()
    };
    for page in pages {
        extraction.sentences.extend(split_blocks(&page.blocks));
        extraction.images.extend(page.images);
    }

    log::info!(
        "Extracted {} sentences and {} images from {} pages of {}",
        extraction.sentences.len(),
        extraction.images.len(),
        extraction.page_count,
        path.display()
    );
    Ok(extraction)
}
