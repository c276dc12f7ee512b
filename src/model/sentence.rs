//! Reconstructed sentences.

use serde::Serialize;

use super::{Fragment, Rect};

/// A unit of prose spanning one or more fragments of a single text block.
///
/// Sentences are only produced by [`crate::sentences::split_block`] and
/// narrowed by [`crate::filter::filter_sentences`]; every fragment belongs to
/// the sentence's page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    text: String,
    fragments: Vec<Fragment>,
    page_index: usize,
}

impl Sentence {
    pub(crate) fn new(text: String, mut fragments: Vec<Fragment>, page_index: usize) -> Self {
        for fragment in &mut fragments {
            fragment.page_index = page_index;
        }
        Self {
            text,
            fragments,
            page_index,
        }
    }

    /// Same sentence text, carrying only `fragments`.
    pub(crate) fn with_fragments(&self, fragments: Vec<Fragment>) -> Self {
        Self::new(self.text.clone(), fragments, self.page_index)
    }

    /// The sentence text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Contributing fragments, in block order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Union rectangle of all fragments, or the zero rectangle if none.
    pub fn bbox(&self) -> Rect {
        Rect::union_all(self.fragments.iter().map(|f| &f.bbox)).unwrap_or_default()
    }
}
