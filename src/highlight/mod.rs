//! Highlight writing.
//!
//! Fragments are highlighted on a copy of the source document; the source
//! file is never modified. Large requests on large documents are split by
//! page range: each worker annotates its own copy reduced to its range and
//! saves it into a scoped temporary directory, and the parts are joined in
//! page order into the output.

mod annotation;
mod merge;
mod options;

pub use annotation::{pdf_date_now, HighlightAnnotation};
pub use merge::{concatenate, merge_files, retain_page_range};
pub use options::{Color, HighlightOptions, DEFAULT_MIN_PARALLEL_FRAGMENTS};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::extract::extract_fragments;
use crate::model::{Fragment, Sentence};
use crate::parallel::{map_ranges, page_ranges, PageRange};
use crate::parser::PdfDocument;

/// Result of highlighting every fragment that contains a search string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHighlight {
    /// Path of the written document
    pub output_path: PathBuf,
    /// Number of fragments highlighted
    pub match_count: usize,
}

/// Default output path: `<stem>_highlighted.<ext>` next to the source.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());
    source.with_file_name(format!("{}_highlighted.{}", stem, ext))
}

/// Highlight fragments and write the result.
///
/// Fragments on pages beyond the document's page count are skipped.
/// Returns the output path.
pub fn highlight_fragments<P: AsRef<Path>>(
    source: P,
    fragments: &[Fragment],
    options: &HighlightOptions,
) -> Result<PathBuf> {
    let source = source.as_ref();
    let output = options
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(source));

    let doc = PdfDocument::open(source)?;
    let total = doc.page_count();

    if options.split.is_single_unit(total) || fragments.len() < options.min_parallel_fragments {
        annotate_whole(doc, fragments, &output, options)?;
    } else {
        drop(doc);
        annotate_partitioned(source, total, fragments, &output, options)?;
    }

    log::info!(
        "Highlighted {} fragments into {}",
        fragments.len(),
        output.display()
    );
    Ok(output)
}

/// Highlight every fragment of the given sentences.
pub fn highlight_sentences<P: AsRef<Path>>(
    source: P,
    sentences: &[Sentence],
    options: &HighlightOptions,
) -> Result<PathBuf> {
    let fragments: Vec<Fragment> = sentences
        .iter()
        .flat_map(|s| s.fragments().iter().cloned())
        .collect();
    highlight_fragments(source, &fragments, options)
}

/// Highlight every fragment whose text contains `needle`.
///
/// The output document is written even when nothing matches.
pub fn highlight_text<P: AsRef<Path>>(
    source: P,
    needle: &str,
    options: &HighlightOptions,
) -> Result<SearchHighlight> {
    let source = source.as_ref();
    let extract_options = options.extract_options();

    let matches: Vec<Fragment> = if needle.is_empty() {
        Vec::new()
    } else {
        extract_fragments(source, &extract_options)?
            .into_iter()
            .filter(|f| f.text.contains(needle))
            .collect()
    };

    let output_path = highlight_fragments(source, &matches, options)?;
    Ok(SearchHighlight {
        output_path,
        match_count: matches.len(),
    })
}

/// Annotate fragments on an open document and save it to `output`.
fn annotate_whole(
    mut doc: PdfDocument,
    fragments: &[Fragment],
    output: &Path,
    options: &HighlightOptions,
) -> Result<()> {
    annotate(&mut doc, fragments, PageRange::new(0, usize::MAX), options)?;
    doc.save_as(output)
}

/// Add highlights for the fragments whose page lies in `range`.
fn annotate(
    doc: &mut PdfDocument,
    fragments: &[Fragment],
    range: PageRange,
    options: &HighlightOptions,
) -> Result<usize> {
    let total = doc.page_count();
    let mut count = 0;

    for fragment in fragments.iter().filter(|f| range.contains(f.page_index)) {
        if fragment.page_index >= total {
            log::debug!(
                "Skipping fragment on page {} (document has {} pages)",
                fragment.page_index,
                total
            );
            continue;
        }

        HighlightAnnotation::for_page_rect(doc, fragment.page_index, &fragment.bbox, options.color)?
            .with_opacity(options.opacity)
            .add_to_page(doc, fragment.page_index)?;
        count += 1;
    }

    Ok(count)
}

/// Annotate each page range on its own copy, then join the parts.
fn annotate_partitioned(
    source: &Path,
    total: usize,
    fragments: &[Fragment],
    output: &Path,
    options: &HighlightOptions,
) -> Result<()> {
    let ranges = page_ranges(total, options.split.max_workers, options.split.chunk_size);
    let workdir = tempfile::Builder::new().prefix("mooowu-highlight").tempdir()?;
    log::debug!(
        "Highlighting {} pages in {} ranges under {}",
        total,
        ranges.len(),
        workdir.path().display()
    );

    let parts = map_ranges(&ranges, options.split.max_workers, |range| {
        annotate_range(source, range, fragments, workdir.path(), options)
    })?;

    // The work directory is removed when dropped, after the merge
    merge_files(&parts, output)
}

/// Worker: annotate one range and save it; `None` for an empty range.
fn annotate_range(
    source: &Path,
    range: PageRange,
    fragments: &[Fragment],
    workdir: &Path,
    options: &HighlightOptions,
) -> Result<Option<PathBuf>> {
    let mut doc = PdfDocument::open(source)?;
    let end = range.end.min(doc.page_count());
    if range.start >= end {
        return Ok(None);
    }
    let range = PageRange::new(range.start, end);

    // Page indices are absolute until the document is reduced
    let count = annotate(&mut doc, fragments, range, options)?;
    retain_page_range(&mut doc, range);

    let path = workdir.join(format!("part_{:06}.pdf", range.start));
    doc.save_as(&path)?;
    log::debug!(
        "Pages {}..{}: {} highlights written to {}",
        range.start,
        range.end,
        count,
        path.display()
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/docs/report.pdf")),
            PathBuf::from("/docs/report_highlighted.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("notes.PDF")),
            PathBuf::from("notes_highlighted.PDF")
        );
        assert_eq!(
            default_output_path(Path::new("/tmp/noext")),
            PathBuf::from("/tmp/noext_highlighted.pdf")
        );
    }

    #[test]
    fn test_highlight_missing_source() {
        let result = highlight_fragments("/nope/missing.pdf", &[], &HighlightOptions::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
