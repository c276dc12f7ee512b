//! Highlight annotation dictionaries.
//!
//! Each highlight is a `/Subtype /Highlight` annotation with QuadPoints and
//! a normal appearance stream, so viewers draw it without regenerating
//! appearances.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::Rect;
use crate::parser::PdfDocument;

use super::options::Color;

/// Annotation flag: print the annotation with the page.
const FLAG_PRINT: i64 = 4;

/// A highlight over one rectangle, in PDF user space.
#[derive(Debug, Clone)]
pub struct HighlightAnnotation {
    /// `[x0, y0, x1, y1]` with `y0` the bottom edge
    pub rect: [f32; 4],
    /// Highlight color
    pub color: Color,
    /// Fill opacity
    pub opacity: f32,
    /// Creation/modification date (PDF date format)
    pub date: String,
}

impl HighlightAnnotation {
    /// Highlight a page-space rectangle on a page of `doc`.
    pub fn for_page_rect(doc: &PdfDocument, page_index: usize, rect: &Rect, color: Color) -> Result<Self> {
        let page_box = doc.page_box(page_index)?;
        Ok(Self {
            rect: page_box.to_user_rect(rect),
            color,
            opacity: 1.0,
            date: pdf_date_now(),
        })
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// QuadPoints: top-left, top-right, bottom-left, bottom-right.
    pub fn quad_points(&self) -> [f32; 8] {
        let [x0, y0, x1, y1] = self.rect;
        [x0, y1, x1, y1, x0, y0, x1, y0]
    }

    /// Build the annotation dictionary; `appearance` is the `/AP /N` stream.
    pub fn build(&self, appearance: ObjectId) -> Dictionary {
        let [r, g, b] = self.color.to_array();
        dictionary! {
            "Type" => "Annot",
            "Subtype" => "Highlight",
            "Rect" => real_array(&self.rect),
            "QuadPoints" => real_array(&self.quad_points()),
            "C" => real_array(&[r, g, b]),
            "CA" => Object::Real(self.opacity),
            "F" => Object::Integer(FLAG_PRINT),
            "M" => Object::string_literal(self.date.as_str()),
            "CreationDate" => Object::string_literal(self.date.as_str()),
            "AP" => dictionary! { "N" => appearance },
        }
    }

    /// The normal appearance: the rectangle filled with multiply blending.
    pub fn appearance_stream(&self) -> Result<Stream> {
        let [x0, y0, x1, y1] = self.rect;
        let [r, g, b] = self.color.to_array();

        let content = Content {
            operations: vec![
                Operation::new("gs", vec![Object::Name(b"GS0".to_vec())]),
                Operation::new("rg", vec![r.into(), g.into(), b.into()]),
                Operation::new(
                    "re",
                    vec![x0.into(), y0.into(), (x1 - x0).into(), (y1 - y0).into()],
                ),
                Operation::new("f", vec![]),
            ],
        };
        let bytes = content
            .encode()
            .map_err(|e| Error::Other(format!("Failed to encode appearance stream: {}", e)))?;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => real_array(&self.rect),
            "Resources" => dictionary! {
                "ExtGState" => dictionary! {
                    "GS0" => dictionary! {
                        "Type" => "ExtGState",
                        "BM" => "Multiply",
                        "ca" => Object::Real(self.opacity),
                        "CA" => Object::Real(self.opacity),
                    },
                },
            },
        };
        Ok(Stream::new(dict, bytes))
    }

    /// Add the annotation to a page and return the annotation's object id.
    pub fn add_to_page(&self, doc: &mut PdfDocument, page_index: usize) -> Result<ObjectId> {
        let page_id = doc.page_id(page_index)?;
        let raw = doc.raw_doc_mut();

        let appearance = raw.add_object(self.appearance_stream()?);
        let annotation = raw.add_object(self.build(appearance));
        append_annotation(doc, page_id, annotation)?;
        Ok(annotation)
    }
}

/// Append an annotation reference to a page's `/Annots`, whether the array
/// is absent, inline or stored as a separate object.
fn append_annotation(doc: &mut PdfDocument, page_id: ObjectId, annotation: ObjectId) -> Result<()> {
    let raw = doc.raw_doc_mut();
    let existing = raw.get_dictionary(page_id)?.get(b"Annots").ok().cloned();

    match existing {
        Some(Object::Reference(array_id)) => {
            if let Ok(Object::Array(annots)) = raw.get_object_mut(array_id) {
                annots.push(Object::Reference(annotation));
                return Ok(());
            }
            // Dangling or not an array: replace with an inline array
            raw.get_dictionary_mut(page_id)?
                .set("Annots", vec![Object::Reference(annotation)]);
        }
        Some(Object::Array(mut annots)) => {
            annots.push(Object::Reference(annotation));
            raw.get_dictionary_mut(page_id)?.set("Annots", annots);
        }
        _ => {
            raw.get_dictionary_mut(page_id)?
                .set("Annots", vec![Object::Reference(annotation)]);
        }
    }

    Ok(())
}

fn real_array(values: &[f32]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
}

/// Current UTC time as a PDF date string.
pub fn pdf_date_now() -> String {
    chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
}
