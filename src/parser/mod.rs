//! PDF parsing module.
//!
//! Turns a page into [`PageContent`]: text blocks built from positioned
//! fragments plus the rectangles where images are drawn.

mod backend;
mod content;
mod fonts;
mod layout;
mod options;

pub use backend::{PageBox, PdfDocument};
pub use content::{ContentInterpreter, Matrix, PageMarks, TextRun};
pub use fonts::{strip_subset_tag, FontMetrics};
pub use layout::build_blocks;
pub use options::{ErrorMode, ExtractOptions};

use std::path::Path;

use crate::error::Result;
use crate::model::{ImageRegion, PageContent};
use crate::parallel::PageRange;

/// Interpret one page of an open document.
pub fn read_page(doc: &PdfDocument, page_index: usize) -> Result<PageContent> {
    let page_box = doc.page_box(page_index)?;
    let content = doc.page_content(page_index)?;
    let resources = doc.page_resources(page_index)?;

    let marks = ContentInterpreter::new(doc, page_box).run_page(&content, resources)?;
    log::trace!(
        "Page {}: {} runs, {} images",
        page_index,
        marks.runs.len(),
        marks.images.len()
    );

    Ok(PageContent {
        page_index,
        blocks: build_blocks(marks.runs, page_index),
        images: marks
            .images
            .into_iter()
            .map(|rect| ImageRegion::new(rect, page_index))
            .collect(),
    })
}

/// Open `path` and interpret the pages of `range` that exist.
///
/// In lenient mode a page that fails to interpret is logged and returned
/// empty; in strict mode the first failure is returned.
pub fn read_page_range(path: &Path, range: PageRange, options: &ExtractOptions) -> Result<Vec<PageContent>> {
    let doc = PdfDocument::open(path)?;
    let end = range.end.min(doc.page_count());

    let mut pages = Vec::with_capacity(range.len());
    for page_index in range.start..end {
        match read_page(&doc, page_index) {
            Ok(page) => pages.push(page),
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", page_index, e);
                pages.push(PageContent {
                    page_index,
                    ..Default::default()
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(pages)
}
