//! Data model for extracted page content.
//!
//! All types are request-scoped: they are created fresh by each extraction
//! call and never cached across calls.

mod fragment;
mod geometry;
mod sentence;

pub use fragment::{Fragment, ImageRegion, PageContent, TextBlock};
pub use geometry::Rect;
pub use sentence::Sentence;
