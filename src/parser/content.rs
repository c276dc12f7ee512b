//! Content stream interpretation.
//!
//! Walks a page's operators with a graphics-state stack and produces
//! positioned text runs (one per show operator) and image placements, both
//! in page space.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::Rect;

use super::backend::{decode_text_simple, get_number, stream_bytes, PageBox, PdfDocument};
use super::fonts::FontMetrics;

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: usize = 8;

/// TJ adjustment (thousandths of an em) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A 2D affine transformation `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build a matrix from six numeric operands.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        let v: Vec<f32> = operands.iter().filter_map(get_number).collect();
        (v.len() == 6).then(|| Self::new(v[0], v[1], v[2], v[3], v[4], v[5]))
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit y vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// A string drawn by one show operator.
#[derive(Debug, Clone)]
pub struct TextRun {
    /// Decoded text
    pub text: String,
    /// Bounding box in page space
    pub bbox: Rect,
    /// Baseline position in page space
    pub baseline: f32,
    /// Font name
    pub font_name: String,
    /// Effective font size
    pub font_size: f32,
}

/// Everything drawn on a page that extraction cares about.
#[derive(Debug, Clone, Default)]
pub struct PageMarks {
    pub runs: Vec<TextRun>,
    pub images: Vec<Rect>,
}

struct LoadedFont<'a> {
    metrics: FontMetrics,
    dict: Option<&'a Dictionary>,
}

impl LoadedFont<'_> {
    fn decode(&self, doc: &LopdfDocument, bytes: &[u8]) -> String {
        self.dict
            .and_then(|dict| dict.get_font_encoding(doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

#[derive(Clone)]
struct GraphicsState<'a> {
    ctm: Matrix,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
    font: Option<Rc<LoadedFont<'a>>>,
    font_size: f32,
}

impl GraphicsState<'_> {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: None,
            font_size: 0.0,
        }
    }
}

enum TextItem<'b> {
    Bytes(&'b [u8]),
    Adjust(f32),
}

/// Fonts loaded from one resource dictionary.
#[derive(Default)]
struct FontCache<'a> {
    fonts: HashMap<Vec<u8>, Rc<LoadedFont<'a>>>,
}

/// Interprets page and form content streams.
pub struct ContentInterpreter<'a> {
    doc: &'a PdfDocument,
    page_box: PageBox,
    fallback_font: Rc<LoadedFont<'a>>,
    marks: PageMarks,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter for a page with the given MediaBox.
    pub fn new(doc: &'a PdfDocument, page_box: PageBox) -> Self {
        Self {
            doc,
            page_box,
            fallback_font: Rc::new(LoadedFont {
                metrics: FontMetrics::fallback("Helvetica"),
                dict: None,
            }),
            marks: PageMarks::default(),
        }
    }

    /// Interpret a page's content and return its marks.
    pub fn run_page(mut self, content: &[u8], resources: Option<&'a Dictionary>) -> Result<PageMarks> {
        self.run(content, resources, GraphicsState::new(Matrix::identity()), 0)?;
        Ok(self.marks)
    }

    fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState<'a>,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(content)
            .map_err(|e| Error::PdfParse(format!("Failed to decode content: {}", e)))?;

        let mut fonts = FontCache::default();
        let mut stack: Vec<GraphicsState<'a>> = Vec::new();
        let mut gs = initial;
        let mut tm = Matrix::identity();
        let mut tlm = Matrix::identity();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        gs.ctm = m.multiply(&gs.ctm);
                    }
                }
                "BT" => {
                    tm = Matrix::identity();
                    tlm = Matrix::identity();
                }
                "Tc" => {
                    if let Some(v) = first_number(operands) {
                        gs.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = first_number(operands) {
                        gs.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = first_number(operands) {
                        gs.horizontal_scale = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(v) = first_number(operands) {
                        gs.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(v) = first_number(operands) {
                        gs.rise = v;
                    }
                }
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Ok(name) = operands[0].as_name() {
                            gs.font = Some(self.load_font(&mut fonts, resources, name));
                        }
                        gs.font_size = get_number(&operands[1]).unwrap_or(gs.font_size);
                    }
                }
                "Td" | "TD" => {
                    let v: Vec<f32> = operands.iter().filter_map(get_number).collect();
                    if v.len() >= 2 {
                        if op.operator == "TD" {
                            gs.leading = -v[1];
                        }
                        tlm = Matrix::translate(v[0], v[1]).multiply(&tlm);
                        tm = tlm;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translate(0.0, -gs.leading).multiply(&tlm);
                    tm = tlm;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&gs, &mut tm, &[TextItem::Bytes(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(arr)) = operands.first() {
                        let items: Vec<TextItem> = arr
                            .iter()
                            .filter_map(|item| match item {
                                Object::String(bytes, _) => Some(TextItem::Bytes(bytes)),
                                other => get_number(other).map(TextItem::Adjust),
                            })
                            .collect();
                        self.show(&gs, &mut tm, &items);
                    }
                }
                "'" => {
                    tlm = Matrix::translate(0.0, -gs.leading).multiply(&tlm);
                    tm = tlm;
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&gs, &mut tm, &[TextItem::Bytes(bytes)]);
                    }
                }
                "\"" => {
                    if operands.len() >= 3 {
                        gs.word_spacing = get_number(&operands[0]).unwrap_or(gs.word_spacing);
                        gs.char_spacing = get_number(&operands[1]).unwrap_or(gs.char_spacing);
                        tlm = Matrix::translate(0.0, -gs.leading).multiply(&tlm);
                        tm = tlm;
                        if let Object::String(bytes, _) = &operands[2] {
                            self.show(&gs, &mut tm, &[TextItem::Bytes(bytes)]);
                        }
                    }
                }
                "Do" => {
                    if let Some(Ok(name)) = operands.first().map(Object::as_name) {
                        self.draw_xobject(resources, name, &gs, depth)?;
                    }
                }
                "BI" => self.place_image(&gs.ctm),
                _ => {}
            }
        }

        Ok(())
    }

    fn load_font(
        &self,
        cache: &mut FontCache<'a>,
        resources: Option<&'a Dictionary>,
        name: &[u8],
    ) -> Rc<LoadedFont<'a>> {
        if let Some(font) = cache.fonts.get(name) {
            return Rc::clone(font);
        }

        let resource_name = String::from_utf8_lossy(name).into_owned();
        let dict = resources
            .and_then(|res| self.doc.dict_get(res, b"Font"))
            .and_then(|fonts| match fonts {
                Object::Dictionary(d) => Some(d),
                _ => None,
            })
            .and_then(|fonts| self.doc.dict_get(fonts, name))
            .and_then(|font| match font {
                Object::Dictionary(d) => Some(d),
                _ => None,
            });

        let font = match dict {
            Some(dict) => LoadedFont {
                metrics: FontMetrics::from_dict(self.doc, &resource_name, dict),
                dict: Some(dict),
            },
            None => {
                log::debug!("Font resource /{} not found, using fallback metrics", resource_name);
                LoadedFont {
                    metrics: FontMetrics::fallback(&resource_name),
                    dict: None,
                }
            }
        };

        let font = Rc::new(font);
        cache.fonts.insert(name.to_vec(), Rc::clone(&font));
        font
    }

    /// Show a string, advancing the text matrix and recording a run.
    fn show(&mut self, gs: &GraphicsState<'a>, tm: &mut Matrix, items: &[TextItem]) {
        let font = gs
            .font
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.fallback_font));
        let size = gs.font_size;
        let scale = gs.horizontal_scale;

        let mut text = String::new();
        let mut cursor = 0.0f32;
        let mut first_glyph: Option<f32> = None;
        let mut last_glyph_end = 0.0f32;

        for item in items {
            match item {
                TextItem::Bytes(bytes) => {
                    text.push_str(&font.decode(self.doc.raw_doc(), bytes));
                    for code in font.metrics.codes(bytes) {
                        first_glyph.get_or_insert(cursor);
                        let glyph = font.metrics.glyph_width(code) / 1000.0 * size;
                        let word = if code == 32 && !font.metrics.is_two_byte() {
                            gs.word_spacing
                        } else {
                            0.0
                        };
                        last_glyph_end = cursor + glyph * scale;
                        cursor += (glyph + gs.char_spacing + word) * scale;
                    }
                }
                TextItem::Adjust(amount) => {
                    cursor -= amount / 1000.0 * size * scale;
                    if -amount > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(char::is_whitespace)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        let trm = tm.multiply(&gs.ctm);
        *tm = Matrix::translate(cursor, 0.0).multiply(tm);

        let Some(start) = first_glyph else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        let top = font.metrics.ascent / 1000.0 * size + gs.rise;
        let bottom = font.metrics.descent / 1000.0 * size + gs.rise;
        let corners: Vec<(f32, f32)> = [
            (start, bottom),
            (last_glyph_end, bottom),
            (start, top),
            (last_glyph_end, top),
        ]
        .iter()
        .map(|&(x, y)| {
            let (ux, uy) = trm.apply(x, y);
            self.page_box.to_page(ux, uy)
        })
        .collect();

        let Some(bbox) = Rect::from_points(&corners) else {
            return;
        };
        let (bx, by) = trm.apply(start, gs.rise);
        let (_, baseline) = self.page_box.to_page(bx, by);

        self.marks.runs.push(TextRun {
            text,
            bbox,
            baseline,
            font_name: font.metrics.name.clone(),
            font_size: size * trm.vertical_scale(),
        });
    }

    fn draw_xobject(
        &mut self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
        gs: &GraphicsState<'a>,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|res| doc.dict_get(res, b"XObject"))
            .and_then(|xobjects| match xobjects {
                Object::Dictionary(d) => Some(d),
                _ => None,
            })
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| doc.resolve_stream(obj))
        else {
            log::debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return Ok(());
        };

        let subtype = doc
            .dict_get(&stream.dict, b"Subtype")
            .and_then(|o| o.as_name_str().ok())
            .unwrap_or("");

        match subtype {
            "Image" => self.place_image(&gs.ctm),
            "Form" => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("Form XObject nesting exceeds {} levels, skipping", MAX_FORM_DEPTH);
                    return Ok(());
                }
                let matrix = match doc.dict_get(&stream.dict, b"Matrix") {
                    Some(Object::Array(values)) => {
                        let values: Vec<Object> = values.iter().map(|v| doc.resolve(v).clone()).collect();
                        Matrix::from_operands(&values).unwrap_or_default()
                    }
                    _ => Matrix::identity(),
                };
                let form_resources = match doc.dict_get(&stream.dict, b"Resources") {
                    Some(Object::Dictionary(d)) => Some(d),
                    _ => resources,
                };

                let mut form_state = gs.clone();
                form_state.ctm = matrix.multiply(&gs.ctm);
                let content = stream_bytes(stream)?;
                self.run(&content, form_resources, form_state, depth + 1)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Record an image drawn into the unit square under `ctm`.
    fn place_image(&mut self, ctm: &Matrix) {
        let corners: Vec<(f32, f32)> = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
            .iter()
            .map(|&(x, y)| {
                let (ux, uy) = ctm.apply(x, y);
                self.page_box.to_page(ux, uy)
            })
            .collect();

        if let Some(rect) = Rect::from_points(&corners) {
            self.marks.images.push(rect);
        }
    }
}

fn first_number(operands: &[Object]) -> Option<f32> {
    operands.first().and_then(get_number)
}
