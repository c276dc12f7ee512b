//! Positioned text fragments, text blocks and image regions.

use serde::{Deserialize, Serialize};

use super::Rect;

/// A minimal positioned run of text with a uniform font and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// The text content (never blank after extraction)
    pub text: String,
    /// Bounding box in page coordinates
    pub bbox: Rect,
    /// Font name with any subset tag removed (e.g. "Helvetica-Bold")
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Zero-based page index
    pub page_index: usize,
}

impl Fragment {
    /// Create a new fragment.
    pub fn new(
        text: impl Into<String>,
        bbox: impl Into<Rect>,
        font_name: impl Into<String>,
        font_size: f32,
        page_index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            bbox: bbox.into(),
            font_name: font_name.into(),
            font_size,
            page_index,
        }
    }
}

/// A group of fragments in reading order, as segmented by the layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Fragments in reading order
    pub fragments: Vec<Fragment>,
    /// Bounding rectangle of all fragments
    pub bbox: Rect,
    /// Zero-based page index
    pub page_index: usize,
}

impl TextBlock {
    /// Create a block; its bbox is the union of the fragment boxes.
    ///
    /// Every fragment is re-tagged with `page_index`.
    pub fn new(mut fragments: Vec<Fragment>, page_index: usize) -> Self {
        for fragment in &mut fragments {
            fragment.page_index = page_index;
        }
        let bbox = Rect::union_all(fragments.iter().map(|f| &f.bbox)).unwrap_or_default();
        Self {
            fragments,
            bbox,
            page_index,
        }
    }

    /// The fragments' texts joined with a single space.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the block has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// The bounding box of a non-text (image) placement on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageRegion {
    /// Bounding box in page coordinates
    pub bbox: Rect,
    /// Zero-based page index
    pub page_index: usize,
}

impl ImageRegion {
    /// Create a new image region.
    pub fn new(bbox: impl Into<Rect>, page_index: usize) -> Self {
        Self {
            bbox: bbox.into(),
            page_index,
        }
    }
}

/// Everything the extractor reads from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Zero-based page index
    pub page_index: usize,
    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,
    /// Image placements in content-stream order
    pub images: Vec<ImageRegion>,
}
