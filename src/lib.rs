//! # mooowu
//!
//! Readable prose extraction and sentence highlighting for PDF documents.
//!
//! The library reads the positioned text of each page, rebuilds sentences
//! from the text blocks, drops sentences set entirely in code fonts or
//! hidden behind images, and writes highlight annotations for chosen
//! sentences into a copy of the document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mooowu::{analyze_pdf, highlight_pdf, read_pdf};
//!
//! fn main() -> mooowu::Result<()> {
//!     // Readable text, one sentence per line
//!     let text = read_pdf("paper.pdf")?;
//!
//!     // Highlight the first sentence into paper_highlighted.pdf
//!     let first = text.lines().next().unwrap_or_default().to_string();
//!     let report = highlight_pdf("paper.pdf", &[first])?;
//!     println!("Wrote {}", report.output_path.display());
//!
//!     let analysis = analyze_pdf("paper.pdf")?;
//!     println!("{} of {} sentences are prose", analysis.highlightable_sentence_count, analysis.sentence_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Sentence reconstruction**: sentences keep the fragments they were built from
//! - **Content filtering**: monospace (code) and image-covered text is excluded
//! - **Highlight annotations**: standard `/Highlight` annotations with appearance streams
//! - **Parallel processing**: large documents are split by page range across a Rayon pool

pub mod detect;
pub mod error;
pub mod extract;
pub mod filter;
pub mod highlight;
pub mod model;
pub mod parallel;
pub mod parser;
pub mod sentences;
pub mod tools;

// Re-export commonly used types
pub use detect::{detect_version_from_bytes, detect_version_from_path, is_pdf_bytes};
pub use error::{Error, Result};
pub use extract::{
    extract_document, extract_fragments, extract_sentences, extract_text_blocks, image_regions,
    page_count, DocumentExtraction,
};
pub use filter::{
    classify, filter_code_fragments, filter_image_overlapping, filter_sentences, is_code_fragment,
    overlaps_image, FragmentKind,
};
pub use highlight::{
    highlight_fragments, highlight_sentences, highlight_text, Color, HighlightOptions,
    SearchHighlight,
};
pub use model::{Fragment, ImageRegion, PageContent, Rect, Sentence, TextBlock};
pub use parallel::{page_ranges, PageRange, SplitOptions};
pub use parser::{ErrorMode, ExtractOptions, PdfDocument};
pub use sentences::{split_block, split_sentence_texts};
pub use tools::{to_json, Analysis, HighlightReport, JsonFormat, PdfTools};

use std::path::Path;

/// Extract the readable text of a PDF: surviving sentences, one per line.
///
/// # Example
///
/// ```no_run
/// let text = mooowu::read_pdf("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn read_pdf<P: AsRef<Path>>(path: P) -> Result<String> {
    PdfTools::new().read(path)
}

/// Highlight sentences of a PDF by exact text into `<stem>_highlighted.pdf`.
///
/// Sentences that are not found are reported as warnings.
pub fn highlight_pdf<P: AsRef<Path>>(path: P, sentences: &[String]) -> Result<HighlightReport> {
    PdfTools::new().highlight(path, sentences, None, None)
}

/// Page, sentence and image statistics of a PDF.
pub fn analyze_pdf<P: AsRef<Path>>(path: P) -> Result<Analysis> {
    PdfTools::new().analyze(path)
}

/// Surviving (highlightable) sentences of a PDF, with their fragments.
pub fn highlightable_sentences<P: AsRef<Path>>(path: P) -> Result<Vec<Sentence>> {
    PdfTools::new().highlightable_sentences(path)
}
