//! Benchmarks for mooowu extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks read synthetic documents written to a temporary directory.

use std::path::{Path, PathBuf};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Creates a synthetic PDF with a few paragraphs of prose and a code block per page.
fn create_test_pdf(dir: &Path, page_count: usize) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => dictionary! { "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica", "Encoding" => "WinAnsiEncoding" },
            "F2" => dictionary! { "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Courier", "Encoding" => "WinAnsiEncoding" },
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 0..page_count {
        let mut operations = Vec::new();
        for line in 0..30 {
            let (font, size) = if line % 10 == 9 { ("F2", 10) } else { ("F1", 12) };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]));
            operations.push(Operation::new("Td", vec![72.into(), (720 - line * 20).into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(format!(
                    "Page {} line {} has prose. It ends here.",
                    i + 1,
                    line + 1
                ))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(format!("bench_{}.pdf", page_count));
    doc.save(&path).unwrap();
    path
}

/// Benchmark sentence splitting on plain text.
fn bench_sentence_split(c: &mut Criterion) {
    let text = "The first sentence ends here. A second one follows! Does a third ask? ".repeat(50);

    c.bench_function("split_sentence_texts", |b| {
        b.iter(|| mooowu::split_sentence_texts(black_box(&text)));
    });
}

/// Benchmark extraction at various sizes, sequential and split.
fn bench_extraction(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("extract_sentences");
    group.sample_size(10);

    for page_count in [1, 10, 40] {
        let path = create_test_pdf(dir.path(), page_count);

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let options = mooowu::ExtractOptions::new().sequential();
            b.iter(|| mooowu::extract_sentences(black_box(&path), &options).unwrap());
        });

        group.bench_function(format!("{}_pages_split", page_count), |b| {
            let options = mooowu::ExtractOptions::new().with_chunk_size(5);
            b.iter(|| mooowu::extract_sentences(black_box(&path), &options).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the analyze endpoint, which also filters.
fn bench_analyze(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = create_test_pdf(dir.path(), 10);
    let tools = mooowu::PdfTools::new();

    c.bench_function("analyze_10_pages", |b| {
        b.iter(|| tools.analyze(black_box(&path)).unwrap());
    });
}

criterion_group!(benches, bench_sentence_split, bench_extraction, bench_analyze);
criterion_main!(benches);
