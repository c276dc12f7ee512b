//! Sentence reconstruction from text blocks.
//!
//! A block's text is split at sentence boundaries (terminal punctuation
//! followed by whitespace) and each piece is attributed the fragments of
//! the block whose text overlaps it by substring containment in either
//! direction. A piece no fragment matches is attributed the whole block.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Sentence, TextBlock};

fn sentence_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence boundary pattern"))
}

/// Split text into trimmed, non-empty sentence texts.
///
/// The terminal punctuation stays with the sentence it ends.
pub fn split_sentence_texts(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for m in sentence_boundary().find_iter(text) {
        // Punctuation is one byte; the whitespace after it is dropped
        pieces.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reconstruct the sentences of one block.
pub fn split_block(block: &TextBlock) -> Vec<Sentence> {
    if block.fragments.is_empty() {
        return Vec::new();
    }

    split_sentence_texts(&block.text())
        .into_iter()
        .map(|text| {
            let mut fragments: Vec<_> = block
                .fragments
                .iter()
                .filter(|f| text.contains(f.text.as_str()) || f.text.contains(text.as_str()))
                .cloned()
                .collect();

            if fragments.is_empty() {
                // Sentence boundary fell mid-fragment on both sides
                fragments = block.fragments.clone();
            }

            Sentence::new(text, fragments, block.page_index)
        })
        .collect()
}

/// Reconstruct the sentences of many blocks, in block order.
pub fn split_blocks<'a, I>(blocks: I) -> Vec<Sentence>
where
    I: IntoIterator<Item = &'a TextBlock>,
{
    blocks.into_iter().flat_map(split_block).collect()
}
