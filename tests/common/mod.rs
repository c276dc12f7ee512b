//! Synthetic PDF fixtures for integration tests.
//!
//! Positions are given top-left relative on a US Letter page: `y` is the
//! text baseline measured down from the top edge.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

enum Item {
    Text {
        font: &'static str,
        size: f32,
        x: f32,
        y: f32,
        text: String,
    },
    Image {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    },
}

/// One page of a fixture document.
#[derive(Default)]
pub struct PageBuilder {
    items: Vec<Item>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line of Helvetica text.
    pub fn text(mut self, x: f32, y: f32, size: f32, text: &str) -> Self {
        self.items.push(Item::Text {
            font: "F1",
            size,
            x,
            y,
            text: text.to_string(),
        });
        self
    }

    /// A line of Courier text.
    pub fn code(mut self, x: f32, y: f32, size: f32, text: &str) -> Self {
        self.items.push(Item::Text {
            font: "F2",
            size,
            x,
            y,
            text: text.to_string(),
        });
        self
    }

    /// An image covering the top-left relative rectangle.
    pub fn image(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.items.push(Item::Image { x0, y0, x1, y1 });
        self
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        for item in &self.items {
            match item {
                Item::Text {
                    font,
                    size,
                    x,
                    y,
                    text,
                } => {
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), (*size).into()]));
                    ops.push(Operation::new("Td", vec![(*x).into(), (PAGE_HEIGHT - y).into()]));
                    ops.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
                    ops.push(Operation::new("ET", vec![]));
                }
                Item::Image { x0, y0, x1, y1 } => {
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new(
                        "cm",
                        vec![
                            (x1 - x0).into(),
                            0.into(),
                            0.into(),
                            (y1 - y0).into(),
                            (*x0).into(),
                            (PAGE_HEIGHT - y1).into(),
                        ],
                    ));
                    ops.push(Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]));
                    ops.push(Operation::new("Q", vec![]));
                }
            }
        }
        ops
    }
}

/// Build a document from page builders.
pub fn build_document(pages: Vec<PageBuilder>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let courier = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0x80],
    ));
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => helvetica, "F2" => courier },
        "XObject" => dictionary! { "Im0" => image },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in &pages {
        let content = Content {
            operations: page.operations(),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
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
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Build and save a document; returns its path.
pub fn write_pdf(dir: &Path, name: &str, pages: Vec<PageBuilder>) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_document(pages);
    doc.save(&path).expect("save fixture");
    path
}

/// `count` pages, each holding two sentences naming the page.
pub fn numbered_pages(count: usize) -> Vec<PageBuilder> {
    (0..count)
        .map(|i| {
            PageBuilder::new().text(
                72.0,
                72.0,
                12.0,
                &format!("Page {} opens here. Page {} closes here.", i + 1, i + 1),
            )
        })
        .collect()
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Number of highlight annotations on each page, in page order.
pub fn highlight_counts(path: &Path) -> Vec<usize> {
    let doc = Document::load(path).expect("load output");
    page_ids(&doc)
        .into_iter()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).expect("page dictionary");
            let annots = match page.get(b"Annots") {
                Ok(Object::Array(a)) => a.clone(),
                Ok(Object::Reference(id)) => doc
                    .get_object(*id)
                    .and_then(Object::as_array)
                    .cloned()
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            annots
                .iter()
                .filter_map(|a| a.as_reference().ok())
                .filter_map(|id| doc.get_dictionary(id).ok())
                .filter(|d| matches!(d.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Highlight"))
                .count()
        })
        .collect()
}

/// The text drawn on each page, in page order.
pub fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("load output");
    let pages: Vec<u32> = doc.get_pages().into_keys().collect();
    pages
        .into_iter()
        .map(|n| doc.extract_text(&[n]).unwrap_or_default())
        .collect()
}
