//! Splitting a document into page ranges and joining the parts back.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::parallel::PageRange;
use crate::parser::PdfDocument;

/// Reduce a document to the pages of `range`.
///
/// Inherited page attributes are copied onto each page first so the kept
/// pages render the same once their original page tree is gone.
pub fn retain_page_range(doc: &mut PdfDocument, range: PageRange) {
    doc.materialize_inherited_attributes();

    let total = doc.page_count();
    // lopdf page numbers are one-based
    let outside: Vec<u32> = (0..total)
        .filter(|i| !range.contains(*i))
        .map(|i| (i + 1) as u32)
        .collect();

    let raw = doc.raw_doc_mut();
    if !outside.is_empty() {
        raw.delete_pages(&outside);
    }
    raw.prune_objects();

    let kept = std::mem::replace(raw, LopdfDocument::with_version("1.5"));
    *doc = PdfDocument::from_lopdf(kept);
}

/// Concatenate documents, preserving page order.
pub fn concatenate(parts: Vec<LopdfDocument>) -> Result<LopdfDocument> {
    let mut max_id = 1;
    let mut version = String::from("1.5");
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut part in parts {
        part.renumber_objects_with(max_id);
        max_id = part.max_id + 1;
        if part.version > version {
            version = part.version.clone();
        }

        let page_ids: Vec<ObjectId> = part.get_pages().into_values().collect();
        let page_set: BTreeSet<ObjectId> = page_ids.iter().copied().collect();
        for id in &page_ids {
            pages.push((*id, part.get_object(*id)?.clone()));
        }

        for (id, object) in part.objects {
            if page_set.contains(&id) {
                continue;
            }
            match object_type(&object) {
                Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    objects.insert(id, object);
                }
            }
        }
    }

    if pages.is_empty() {
        return Err(Error::Other("No pages to merge".to_string()));
    }

    let mut merged = LopdfDocument::with_version(version.as_str());
    merged.objects = objects;

    let pages_id = (max_id, 0);
    let catalog_id = (max_id + 1, 0);
    let mut kids = Vec::with_capacity(pages.len());

    for (id, object) in pages {
        if let Object::Dictionary(mut dict) = object {
            dict.set("Parent", pages_id);
            merged.objects.insert(id, Object::Dictionary(dict));
            kids.push(Object::Reference(id));
        }
    }

    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = catalog_id.0;
    merged.renumber_objects();

    Ok(merged)
}

/// Load partition files in order and save their concatenation to `output`.
///
/// A missing partition (an empty range) is skipped.
pub fn merge_files(parts: &[Option<PathBuf>], output: &Path) -> Result<()> {
    let mut docs = Vec::with_capacity(parts.len());
    for path in parts.iter().flatten() {
        if !path.exists() {
            log::warn!("Partition file {} is missing, skipping", path.display());
            continue;
        }
        docs.push(LopdfDocument::load(path)?);
    }

    let mut merged = concatenate(docs)?;
    merged.save(output)?;
    Ok(())
}

fn object_type(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").ok().and_then(|t| t.as_name().ok())
}
