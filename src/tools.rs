//! Tool endpoints: read, highlight, analyze and search.
//!
//! These are the operations an agent host calls. Each one takes an explicit
//! path, re-reads the document and returns a serializable response.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::extract_document;
use crate::filter::filter_sentences;
use crate::highlight::{highlight_fragments, highlight_text, Color, HighlightOptions, SearchHighlight};
use crate::model::{Fragment, Sentence};
use crate::parallel::SplitOptions;
use crate::parser::{ErrorMode, ExtractOptions};

/// JSON output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a response to JSON.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };

    Ok(json)
}

/// Response of the highlight endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightReport {
    /// The written document, or the source when nothing matched
    pub output_path: PathBuf,
    /// Number of requested sentences that matched
    pub highlighted_count: usize,
    /// Number of requested sentences
    pub total_requested: usize,
    /// One entry per unmatched request
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Response of the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub page_count: usize,
    pub sentence_count: usize,
    pub highlightable_sentence_count: usize,
    /// Sentences removed entirely by filtering (code or image overlap)
    pub code_block_sentence_count: usize,
    pub image_count: usize,
    pub highlightable_sentences: Vec<String>,
}

/// The tool endpoints with their configuration.
///
/// # Example
///
/// ```no_run
/// use mooowu::PdfTools;
///
/// let tools = PdfTools::new().lenient();
/// let text = tools.read("paper.pdf")?;
/// let report = tools.highlight("paper.pdf", &[text.lines().next().unwrap_or("").to_string()], None, None)?;
/// println!("{} highlighted", report.highlighted_count);
/// # Ok::<(), mooowu::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfTools {
    /// Extraction options
    pub extract: ExtractOptions,
    /// Highlight options
    pub highlight: HighlightOptions,
}

impl PdfTools {
    /// Create tools with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip pages that fail to interpret instead of failing.
    pub fn lenient(mut self) -> Self {
        self.extract.error_mode = ErrorMode::Lenient;
        self.highlight = self.highlight.lenient();
        self
    }

    /// Never split work across threads.
    pub fn sequential(mut self) -> Self {
        self.extract = self.extract.sequential();
        self.highlight = self.highlight.sequential();
        self
    }

    /// Use the same split options for extraction and highlighting.
    pub fn with_split(mut self, split: SplitOptions) -> Self {
        self.extract.split = split.clone();
        self.highlight.split = split;
        self
    }

    /// Set the worker budget.
    pub fn with_max_workers(self, workers: usize) -> Self {
        let split = self.extract.split.clone().with_max_workers(workers);
        self.with_split(split)
    }

    /// Set the default highlight color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.highlight.color = color;
        self
    }

    /// Surviving sentences of a document.
    pub fn highlightable_sentences<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Sentence>> {
        let extraction = extract_document(path, &self.extract)?;
        Ok(filter_sentences(&extraction.sentences, &extraction.images))
    }

    /// Readable text: surviving sentence texts joined by newlines.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let sentences = self.highlightable_sentences(path)?;
        Ok(sentences
            .iter()
            .map(Sentence::text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Highlight requested sentences by exact text match.
    ///
    /// Unmatched requests become warnings. When nothing matches, no file
    /// is written and the source path is reported.
    pub fn highlight<P: AsRef<Path>>(
        &self,
        path: P,
        sentences: &[String],
        output_path: Option<&Path>,
        color: Option<Color>,
    ) -> Result<HighlightReport> {
        let path = path.as_ref();
        let available = self.highlightable_sentences(path)?;

        let mut fragments: Vec<Fragment> = Vec::new();
        let mut warnings = Vec::new();
        let mut highlighted_count = 0;

        for requested in sentences {
            match available.iter().find(|s| s.text() == requested.as_str()) {
                Some(sentence) => {
                    fragments.extend(sentence.fragments().iter().cloned());
                    highlighted_count += 1;
                }
                None => warnings.push(format!("Sentence not found: {}", requested)),
            }
        }

        if fragments.is_empty() {
            log::info!("No requested sentence matched in {}", path.display());
            return Ok(HighlightReport {
                output_path: path.to_path_buf(),
                highlighted_count: 0,
                total_requested: sentences.len(),
                warnings,
            });
        }

        let mut options = self.highlight.clone();
        if let Some(output) = output_path {
            options.output_path = Some(output.to_path_buf());
        }
        if let Some(color) = color {
            options.color = color;
        }

        let output_path = highlight_fragments(path, &fragments, &options)?;
        Ok(HighlightReport {
            output_path,
            highlighted_count,
            total_requested: sentences.len(),
            warnings,
        })
    }

    /// Page, sentence and image statistics.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let extraction = extract_document(path, &self.extract)?;
        let highlightable = filter_sentences(&extraction.sentences, &extraction.images);

        Ok(Analysis {
            page_count: extraction.page_count,
            sentence_count: extraction.sentences.len(),
            highlightable_sentence_count: highlightable.len(),
            code_block_sentence_count: extraction.sentences.len() - highlightable.len(),
            image_count: extraction.images.len(),
            highlightable_sentences: highlightable.iter().map(|s| s.text().to_string()).collect(),
        })
    }

    /// Highlight every fragment containing `needle` and write the output.
    pub fn search<P: AsRef<Path>>(
        &self,
        path: P,
        needle: &str,
        output_path: Option<&Path>,
        color: Option<Color>,
    ) -> Result<SearchHighlight> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let mut options = self.highlight.clone();
        if let Some(output) = output_path {
            options.output_path = Some(output.to_path_buf());
        }
        if let Some(color) = color {
            options.color = color;
        }
        highlight_text(path, needle, &options)
    }
}
