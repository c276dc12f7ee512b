//! Document access backed by lopdf.
//!
//! [`PdfDocument`] is the only place that opens, queries and saves
//! documents; the interpreter, the extractor and the highlight writer go
//! through it instead of touching lopdf object lookups directly.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::detect_version_from_path;
use crate::error::{Error, Result};
use crate::model::Rect;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_PAGE_KEYS: [&[u8]; 4] =
    [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Maximum page-tree depth walked when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// The MediaBox of a page in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub llx: f32,
    /// Lower-left y
    pub lly: f32,
    /// Upper-right x
    pub urx: f32,
    /// Upper-right y
    pub ury: f32,
}

impl PageBox {
    /// US Letter, the fallback when a page declares no usable MediaBox.
    pub fn letter() -> Self {
        Self {
            llx: 0.0,
            lly: 0.0,
            urx: 612.0,
            ury: 792.0,
        }
    }

    /// Page width in points.
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    /// Page height in points.
    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Map a user-space point to page space (top-left origin, y down).
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.llx, self.ury - y)
    }

    /// Map a page-space rectangle back to user space as `[x0, y0, x1, y1]`
    /// with `y0` the bottom edge.
    pub fn to_user_rect(&self, rect: &Rect) -> [f32; 4] {
        [
            rect.x0 + self.llx,
            self.ury - rect.y1,
            rect.x1 + self.llx,
            self.ury - rect.y0,
        ]
    }
}

/// An open PDF document.
pub struct PdfDocument {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF file.
    ///
    /// Fails with [`Error::NotFound`] before any parsing if the path does
    /// not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        detect_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        log::debug!("Opened {} ({} pages)", path.display(), doc.get_pages().len());
        Ok(Self::from_lopdf(doc))
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        crate::detect::detect_version_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_lopdf(doc))
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_lopdf(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Object id of the page at a zero-based index.
    pub fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(page_index, self.pages.len()))
    }

    /// Direct access to the underlying lopdf document.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Mutable access to the underlying lopdf document.
    pub fn raw_doc_mut(&mut self) -> &mut LopdfDocument {
        &mut self.doc
    }

    /// Consume the handle and return the lopdf document.
    pub fn into_raw(self) -> LopdfDocument {
        self.doc
    }

    /// Save the document to `path`.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.doc.save(path.as_ref())?;
        Ok(())
    }

    /// Follow references until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        for _ in 0..MAX_TREE_DEPTH {
            match current {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(next) => current = next,
                    Err(_) => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Resolve an object to a dictionary, if it is one (streams excluded).
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Resolve an object to a stream, if it is one.
    pub fn resolve_stream<'a>(&'a self, obj: &'a Object) -> Option<&'a Stream> {
        match self.resolve(obj) {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Look up a dictionary entry and resolve it.
    pub fn dict_get<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        dict.get(key).ok().map(|obj| self.resolve(obj))
    }

    /// Look up a numeric dictionary entry.
    pub fn dict_number(&self, dict: &Dictionary, key: &[u8]) -> Option<f32> {
        self.dict_get(dict, key).and_then(get_number)
    }

    /// Look up a page attribute, walking up the page tree for inherited keys.
    pub fn page_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(self.resolve(value));
            }
            let parent = node.get(b"Parent").ok()?;
            node = self.resolve_dict(parent)?;
        }
        None
    }

    /// The page's MediaBox, defaulting to US Letter.
    pub fn page_box(&self, page_index: usize) -> Result<PageBox> {
        let page_id = self.page_id(page_index)?;
        let media_box = self
            .page_attribute(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .map(|arr| {
                arr.iter()
                    .take(4)
                    .map(|o| get_number(self.resolve(o)))
                    .collect::<Option<Vec<f32>>>()
            });

        Ok(match media_box {
            Some(Some(v)) => PageBox {
                llx: v[0].min(v[2]),
                lly: v[1].min(v[3]),
                urx: v[0].max(v[2]),
                ury: v[1].max(v[3]),
            },
            _ => PageBox::letter(),
        })
    }

    /// The page's resource dictionary, inherited if necessary.
    pub fn page_resources(&self, page_index: usize) -> Result<Option<&Dictionary>> {
        let page_id = self.page_id(page_index)?;
        Ok(self
            .page_attribute(page_id, b"Resources")
            .and_then(|obj| match obj {
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            }))
    }

    /// The concatenated, decoded content streams of a page.
    ///
    /// A page without `/Contents` has empty content.
    pub fn page_content(&self, page_index: usize) -> Result<Vec<u8>> {
        let page_id = self.page_id(page_index)?;
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => self.resolve(obj),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(stream) => stream_bytes(stream),
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    if let Some(stream) = self.resolve_stream(part) {
                        content.extend_from_slice(&stream_bytes(stream)?);
                        content.push(b'\n');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse(format!(
                "Page {}: invalid content stream",
                page_index
            ))),
        }
    }

    /// Copy inherited page attributes onto every page dictionary so pages
    /// stay self-contained when moved into another page tree.
    pub fn materialize_inherited_attributes(&mut self) {
        let mut updates: Vec<(ObjectId, &'static [u8], Object)> = Vec::new();
        for &page_id in &self.pages {
            let Ok(page_dict) = self.doc.get_dictionary(page_id) else {
                continue;
            };
            for key in INHERITABLE_PAGE_KEYS {
                if page_dict.has(key) {
                    continue;
                }
                if let Some(value) = self.page_attribute(page_id, key) {
                    updates.push((page_id, key, value.clone()));
                }
            }
        }

        for (page_id, key, value) in updates {
            if let Ok(dict) = self.doc.get_dictionary_mut(page_id) {
                dict.set(key, value);
            }
        }
    }
}

/// Stream payload, decoded when the stream declares filters.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| Error::PdfParse(e.to_string()))
    } else {
        Ok(stream.content.clone())
    }
}

/// Extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
