//! Content filtering: code detection and image-overlap removal.
//!
//! A fragment is code when its font name contains a known monospace marker,
//! and image-obscured when its bounding box intersects an image drawn on
//! the same page. Both predicates are pure; filtering never reorders.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Fragment, ImageRegion, Sentence};

/// Case-insensitive font name markers that identify monospace (code) fonts.
pub const MONOSPACE_FONT_MARKERS: [&str; 13] = [
    "courier",
    "mono",
    "consolas",
    "menlo",
    "monaco",
    "source code",
    "fira",
    "jetbrains",
    "inconsolata",
    "lucida console",
    "dejavu sans mono",
    "liberation mono",
    "cour",
];

/// How a fragment is treated by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Readable prose
    Prose,
    /// Set in a monospace font
    Code,
    /// Overlaps an image on its page
    ImageObscured,
}

/// Whether a fragment is set in a monospace font.
pub fn is_code_fragment(fragment: &Fragment) -> bool {
    let font = fragment.font_name.to_lowercase();
    MONOSPACE_FONT_MARKERS.iter().any(|marker| font.contains(marker))
}

/// Whether a fragment overlaps any image on its own page.
pub fn overlaps_image(fragment: &Fragment, images: &[ImageRegion]) -> bool {
    images
        .iter()
        .any(|image| image.page_index == fragment.page_index && fragment.bbox.intersects(&image.bbox))
}

/// Classify a fragment. Code takes precedence over image overlap.
pub fn classify(fragment: &Fragment, images: &[ImageRegion]) -> FragmentKind {
    if is_code_fragment(fragment) {
        FragmentKind::Code
    } else if overlaps_image(fragment, images) {
        FragmentKind::ImageObscured
    } else {
        FragmentKind::Prose
    }
}

/// Remove monospace fragments.
pub fn filter_code_fragments(fragments: &[Fragment]) -> Vec<Fragment> {
    fragments
        .iter()
        .filter(|f| !is_code_fragment(f))
        .cloned()
        .collect()
}

/// Remove fragments that overlap an image on the same page.
pub fn filter_image_overlapping(fragments: &[Fragment], images: &[ImageRegion]) -> Vec<Fragment> {
    let index = ImageIndex::new(images);
    fragments
        .iter()
        .filter(|f| !index.overlaps(f))
        .cloned()
        .collect()
}

/// Keep only sentences with at least one prose fragment, narrowed to those
/// fragments.
pub fn filter_sentences(sentences: &[Sentence], images: &[ImageRegion]) -> Vec<Sentence> {
    let index = ImageIndex::new(images);

    sentences
        .iter()
        .filter_map(|sentence| {
            let kept: Vec<Fragment> = sentence
                .fragments()
                .iter()
                .filter(|f| !is_code_fragment(f) && !index.overlaps(f))
                .cloned()
                .collect();

            if kept.is_empty() {
                log::trace!("Dropping sentence on page {}: {:?}", sentence.page_index(), sentence.text());
                None
            } else {
                Some(sentence.with_fragments(kept))
            }
        })
        .collect()
}

/// Image regions grouped by page.
struct ImageIndex<'a> {
    by_page: HashMap<usize, Vec<&'a ImageRegion>>,
}

impl<'a> ImageIndex<'a> {
    fn new(images: &'a [ImageRegion]) -> Self {
        let mut by_page: HashMap<usize, Vec<&'a ImageRegion>> = HashMap::new();
        for image in images {
            by_page.entry(image.page_index).or_default().push(image);
        }
        Self { by_page }
    }

    fn overlaps(&self, fragment: &Fragment) -> bool {
        self.by_page
            .get(&fragment.page_index)
            .is_some_and(|images| images.iter().any(|i| fragment.bbox.intersects(&i.bbox)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str, font: &str, bbox: (f32, f32, f32, f32), page: usize) -> Fragment {
        Fragment::new(text, bbox, font, 12.0, page)
    }

    #[test]
    fn test_monospace_detection() {
        for font in [
            "Courier",
            "cour",
            "Consolas",
            "Monaco",
            "Source Code Pro",
            "FiraCode-Regular",
            "Courier-Bold",
            "JetBrainsMono-Regular",
            "Lucida Console",
        ] {
            let f = fragment("x = 1", font, (0.0, 0.0, 10.0, 10.0), 0);
            assert!(is_code_fragment(&f), "{} should be code", font);
        }

        for font in ["Helvetica", "Times-Roman", "Arial", "Georgia"] {
            let f = fragment("Prose.", font, (0.0, 0.0, 10.0, 10.0), 0);
            assert!(!is_code_fragment(&f), "{} should be prose", font);
        }
    }

    #[test]
    fn test_marker_is_substring_match() {
        // Any name containing a marker counts
        let f = fragment("Title", "Monotype Corsiva", (0.0, 0.0, 10.0, 10.0), 0);
        assert!(is_code_fragment(&f));
    }

    #[test]
    fn test_image_overlap_is_per_page() {
        let images = vec![ImageRegion::new((72.0, 100.0, 200.0, 200.0), 1)];

        let inside = fragment("Caption", "Helvetica", (80.0, 140.0, 250.0, 152.0), 1);
        let other_page = fragment("Caption", "Helvetica", (80.0, 140.0, 250.0, 152.0), 0);
        let above = fragment("Above", "Helvetica", (72.0, 62.0, 200.0, 74.0), 1);

        assert!(overlaps_image(&inside, &images));
        assert!(!overlaps_image(&other_page, &images));
        assert!(!overlaps_image(&above, &images));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let images = vec![ImageRegion::new((72.0, 100.0, 200.0, 200.0), 0)];
        let touching = fragment("Edge", "Helvetica", (72.0, 88.0, 200.0, 100.0), 0);
        assert!(!overlaps_image(&touching, &images));
    }

    #[test]
    fn test_classify_prefers_code() {
        let images = vec![ImageRegion::new((0.0, 0.0, 100.0, 100.0), 0)];
        let code = fragment("let x", "Courier", (10.0, 10.0, 50.0, 20.0), 0);
        let obscured = fragment("label", "Helvetica", (10.0, 10.0, 50.0, 20.0), 0);
        let prose = fragment("text", "Helvetica", (10.0, 110.0, 50.0, 120.0), 0);

        assert_eq!(classify(&code, &images), FragmentKind::Code);
        assert_eq!(classify(&obscured, &images), FragmentKind::ImageObscured);
        assert_eq!(classify(&prose, &images), FragmentKind::Prose);
    }

    #[test]
    fn test_filters_preserve_order_and_are_idempotent() {
        let fragments = vec![
            fragment("a", "Helvetica", (0.0, 0.0, 10.0, 10.0), 0),
            fragment("b", "Courier", (0.0, 20.0, 10.0, 30.0), 0),
            fragment("c", "Helvetica", (0.0, 40.0, 10.0, 50.0), 0),
            fragment("d", "Helvetica", (0.0, 60.0, 10.0, 70.0), 0),
        ];
        let images = vec![ImageRegion::new((0.0, 35.0, 10.0, 45.0), 0)];

        let no_code = filter_code_fragments(&fragments);
        assert_eq!(no_code.iter().map(|f| f.text.as_str()).collect::<Vec<_>>(), ["a", "c", "d"]);
        assert_eq!(filter_code_fragments(&no_code), no_code);

        let visible = filter_image_overlapping(&no_code, &images);
        assert_eq!(visible.iter().map(|f| f.text.as_str()).collect::<Vec<_>>(), ["a", "d"]);
        assert_eq!(filter_image_overlapping(&visible, &images), visible);
    }

    #[test]
    fn test_filter_sentences() {
        let images = vec![ImageRegion::new((0.0, 100.0, 300.0, 200.0), 0)];
        let sentences = vec![
            Sentence::new(
                "Mixed sentence.".to_string(),
                vec![
                    fragment("Mixed", "Helvetica", (0.0, 50.0, 40.0, 62.0), 0),
                    fragment("sentence.", "Courier", (45.0, 50.0, 100.0, 62.0), 0),
                ],
                0,
            ),
            Sentence::new(
                "print(x)".to_string(),
                vec![fragment("print(x)", "Courier", (0.0, 70.0, 60.0, 82.0), 0)],
                0,
            ),
            Sentence::new(
                "Caption.".to_string(),
                vec![fragment("Caption.", "Helvetica", (10.0, 150.0, 60.0, 162.0), 0)],
                0,
            ),
        ];

        let kept = filter_sentences(&sentences, &images);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text(), "Mixed sentence.");
        assert_eq!(kept[0].fragments().len(), 1);
        assert_eq!(kept[0].fragments()[0].text, "Mixed");
    }

    #[test]
    fn test_refiltering_sentences_is_stable() {
        let images = vec![
            ImageRegion::new((0.0, 100.0, 300.0, 200.0), 0),
            ImageRegion::new((0.0, 0.0, 300.0, 40.0), 1),
        ];
        let sentences = vec![
            Sentence::new(
                "Prose then code.".to_string(),
                vec![
                    fragment("Prose then", "Helvetica", (0.0, 50.0, 80.0, 62.0), 0),
                    fragment("code.", "Menlo-Regular", (85.0, 50.0, 120.0, 62.0), 0),
                ],
                0,
            ),
            Sentence::new(
                "Half hidden.".to_string(),
                vec![
                    fragment("Half", "Helvetica", (0.0, 90.0, 40.0, 102.0), 0),
                    fragment("hidden.", "Helvetica", (0.0, 210.0, 60.0, 222.0), 0),
                ],
                0,
            ),
            Sentence::new(
                "Second page.".to_string(),
                vec![fragment("Second page.", "Helvetica", (0.0, 150.0, 90.0, 162.0), 1)],
                1,
            ),
        ];

        let once = filter_sentences(&sentences, &images);
        assert_eq!(once.len(), 3);
        assert_eq!(once[1].fragments().len(), 1);
        assert_eq!(filter_sentences(&once, &images), once);
    }
}
