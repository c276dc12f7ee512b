//! Integration tests for highlight writing and the tool endpoints.

mod common;

use common::{highlight_counts, numbered_pages, write_pdf, PageBuilder};
use mooowu::{
    extract_sentences, highlight_sentences, Color, ExtractOptions, HighlightOptions, PdfTools,
    SplitOptions,
};

#[test]
fn test_highlight_writes_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "report.pdf",
        vec![PageBuilder::new()
            .text(72.0, 72.0, 12.0, "Keep reading this line.")
            .text(72.0, 120.0, 12.0, "Highlight this line.")],
    );

    let report = PdfTools::new()
        .highlight(&path, &["Highlight this line.".to_string()], None, None)
        .unwrap();

    assert_eq!(report.highlighted_count, 1);
    assert_eq!(report.total_requested, 1);
    assert!(report.warnings.is_empty());
    assert_eq!(report.output_path, dir.path().join("report_highlighted.pdf"));
    assert_eq!(highlight_counts(&report.output_path), vec![1]);

    // The source is untouched
    assert_eq!(highlight_counts(&path), vec![0]);
}

#[test]
fn test_highlight_annotation_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "geometry.pdf",
        vec![PageBuilder::new().text(72.0, 100.0, 12.0, "A line to mark.")],
    );
    let output = dir.path().join("marked.pdf");

    let sentences = extract_sentences(&path, &ExtractOptions::default()).unwrap();
    let options = HighlightOptions::new()
        .with_output_path(&output)
        .with_color(Color::new(0.0, 1.0, 0.0).unwrap());
    highlight_sentences(&path, &sentences, &options).unwrap();

    let doc = lopdf::Document::load(&output).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let annots = page.get(b"Annots").unwrap().as_array().unwrap();
    let annot = doc
        .get_dictionary(annots[0].as_reference().unwrap())
        .unwrap();

    let rect: Vec<f32> = annot
        .get(b"Rect")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect();
    // Baseline at 692 in PDF space, 12pt with 0.8/0.2 ascent/descent
    assert!((rect[0] - 72.0).abs() < 0.5);
    assert!((rect[1] - 689.6).abs() < 0.5);
    assert!((rect[3] - 701.6).abs() < 0.5);

    let color: Vec<f32> = annot
        .get(b"C")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect();
    assert_eq!(color, vec![0.0, 1.0, 0.0]);
    assert_eq!(annot.get(b"QuadPoints").unwrap().as_array().unwrap().len(), 8);
    assert!(annot.get(b"AP").is_ok());
}

#[test]
fn test_no_match_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "plain.pdf",
        vec![PageBuilder::new().text(72.0, 72.0, 12.0, "Only this sentence.")],
    );

    let report = PdfTools::new()
        .highlight(&path, &["Not in the document.".to_string()], None, None)
        .unwrap();

    assert_eq!(report.highlighted_count, 0);
    assert_eq!(report.total_requested, 1);
    assert_eq!(report.warnings, vec!["Sentence not found: Not in the document."]);
    assert_eq!(report.output_path, path);
    assert!(!dir.path().join("plain_highlighted.pdf").exists());
}

#[test]
fn test_partial_match_reports_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "partial.pdf",
        vec![PageBuilder::new().text(72.0, 72.0, 12.0, "One is here. Two is here.")],
    );
    let output = dir.path().join("out.pdf");

    let report = PdfTools::new()
        .highlight(
            &path,
            &[
                "One is here.".to_string(),
                "Three is missing.".to_string(),
                "Two is here.".to_string(),
            ],
            Some(output.as_path()),
            Some(Color::new(1.0, 0.5, 0.0).unwrap()),
        )
        .unwrap();

    assert_eq!(report.highlighted_count, 2);
    assert_eq!(report.total_requested, 3);
    assert_eq!(report.warnings, vec!["Sentence not found: Three is missing."]);
    assert_eq!(report.output_path, output);
    // Both sentences share the line's single fragment
    assert_eq!(highlight_counts(&output), vec![2]);
}

#[test]
fn test_code_sentence_cannot_be_highlighted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "code.pdf",
        vec![PageBuilder::new()
            .text(72.0, 72.0, 12.0, "Prose comes first.")
            .code(72.0, 120.0, 10.0, "fn main() {}")],
    );

    let report = PdfTools::new()
        .highlight(&path, &["fn main() {}".to_string()], None, None)
        .unwrap();
    assert_eq!(report.highlighted_count, 0);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_parallel_highlight_preserves_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "long.pdf", numbered_pages(25));
    let output = dir.path().join("long_marked.pdf");

    let requested: Vec<String> = (1..=25).map(|i| format!("Page {} opens here.", i)).collect();
    let tools = PdfTools::new().with_split(SplitOptions::new().with_max_workers(4).with_chunk_size(4));
    let report = tools
        .highlight(&path, &requested, Some(output.as_path()), None)
        .unwrap();

    assert_eq!(report.highlighted_count, 25);
    assert!(report.warnings.is_empty());
    assert_eq!(highlight_counts(&output), vec![1; 25]);

    // Page order survives the split and merge
    let sentences = extract_sentences(&output, &ExtractOptions::new().sequential()).unwrap();
    assert_eq!(sentences.len(), 50);
    for (i, pair) in sentences.chunks(2).enumerate() {
        assert_eq!(pair[0].text(), format!("Page {} opens here.", i + 1));
        assert_eq!(pair[0].page_index(), i);
    }

    // No partition files are left behind
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_parallel_and_sequential_highlight_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "agree.pdf", numbered_pages(12));
    let sentences = extract_sentences(&path, &ExtractOptions::default()).unwrap();

    let sequential = dir.path().join("sequential.pdf");
    highlight_sentences(
        &path,
        &sentences,
        &HighlightOptions::new().sequential().with_output_path(&sequential),
    )
    .unwrap();

    let split = dir.path().join("split.pdf");
    highlight_sentences(
        &path,
        &sentences,
        &HighlightOptions::new()
            .with_split(SplitOptions::new().with_max_workers(3).with_chunk_size(2))
            .with_output_path(&split),
    )
    .unwrap();

    assert_eq!(highlight_counts(&sequential), vec![2; 12]);
    assert_eq!(highlight_counts(&split), highlight_counts(&sequential));
}

#[test]
fn test_search_highlights_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "search.pdf", numbered_pages(3));

    let result = PdfTools::new().search(&path, "Page 2", None, None).unwrap();
    assert_eq!(result.match_count, 1);
    assert_eq!(result.output_path, dir.path().join("search_highlighted.pdf"));
    assert_eq!(highlight_counts(&result.output_path), vec![0, 1, 0]);

    let none = PdfTools::new().search(&path, "absent", None, None).unwrap();
    assert_eq!(none.match_count, 0);
    assert_eq!(highlight_counts(&none.output_path), vec![0, 0, 0]);
}

#[test]
fn test_highlight_missing_file() {
    let result = PdfTools::new().highlight("/does/not/exist.pdf", &["A.".to_string()], None, None);
    assert!(matches!(result, Err(mooowu::Error::NotFound(_))));
}
