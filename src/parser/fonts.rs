//! Font metrics for glyph positioning.
//!
//! Only what layout needs is read: advance widths, ascent and descent, and
//! whether codes are one or two bytes wide.

use std::collections::HashMap;

use lopdf::{Dictionary, Object};

use super::backend::{get_number, PdfDocument};

const DEFAULT_ASCENT: f32 = 800.0;
const DEFAULT_DESCENT: f32 = -200.0;

/// Metrics of a font resource, in glyph space units (1/1000 em).
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Base font name with any subset tag removed
    pub name: String,
    /// Ascent above the baseline
    pub ascent: f32,
    /// Descent below the baseline (negative)
    pub descent: f32,
    two_byte: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    default_width: f32,
    width_scale: f32,
}

impl FontMetrics {
    /// Read metrics from a font dictionary.
    pub fn from_dict(doc: &PdfDocument, resource_name: &str, dict: &Dictionary) -> Self {
        let subtype = doc
            .dict_get(dict, b"Subtype")
            .and_then(|o| o.as_name_str().ok())
            .unwrap_or("Type1");

        let name = doc
            .dict_get(dict, b"BaseFont")
            .and_then(|o| o.as_name_str().ok())
            .map(|n| strip_subset_tag(n).to_string())
            .unwrap_or_else(|| resource_name.to_string());

        let mut metrics = Self::fallback(&name);

        if subtype == "Type0" {
            metrics.two_byte = true;
            metrics.default_width = 1000.0;
            let descendant = doc
                .dict_get(dict, b"DescendantFonts")
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| doc.resolve_dict(o));

            if let Some(cid_font) = descendant {
                if let Some(dw) = doc.dict_number(cid_font, b"DW") {
                    metrics.default_width = dw;
                }
                if let Some(Object::Array(w)) = doc.dict_get(cid_font, b"W") {
                    metrics.cid_widths = parse_cid_widths(doc, w);
                }
                metrics.read_descriptor(doc, cid_font);
            }
            return metrics;
        }

        metrics.first_char = doc
            .dict_number(dict, b"FirstChar")
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        if let Some(Object::Array(widths)) = doc.dict_get(dict, b"Widths") {
            metrics.widths = widths
                .iter()
                .map(|w| get_number(doc.resolve(w)).unwrap_or(0.0))
                .collect();
        }

        if subtype == "Type3" {
            // Type3 widths are in glyph space; scale through the font matrix
            if let Some(Object::Array(matrix)) = doc.dict_get(dict, b"FontMatrix") {
                if let Some(sx) = matrix.first().and_then(|o| get_number(doc.resolve(o))) {
                    metrics.width_scale = sx * 1000.0;
                }
            }
        }

        metrics.read_descriptor(doc, dict);
        metrics
    }

    /// Metrics estimated from the font name alone.
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            two_byte: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: standard_width(name),
            width_scale: 1.0,
        }
    }

    /// Whether character codes are two bytes wide.
    pub fn is_two_byte(&self) -> bool {
        self.two_byte
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Advance width of a code in 1/1000 em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        let width = if self.two_byte {
            self.cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width)
        } else {
            code.checked_sub(self.first_char)
                .and_then(|i| self.widths.get(i as usize))
                .copied()
                .filter(|w| *w > 0.0)
                .unwrap_or(self.default_width)
        };
        width * self.width_scale
    }

    fn read_descriptor(&mut self, doc: &PdfDocument, font: &Dictionary) {
        let Some(descriptor) = doc
            .dict_get(font, b"FontDescriptor")
            .and_then(|o| match o {
                Object::Dictionary(d) => Some(d),
                _ => None,
            })
        else {
            return;
        };

        if let Some(ascent) = doc.dict_number(descriptor, b"Ascent").filter(|a| *a > 0.0) {
            self.ascent = ascent;
        }
        if let Some(descent) = doc.dict_number(descriptor, b"Descent").filter(|d| *d < 0.0) {
            self.descent = descent;
        }
        if !self.two_byte {
            if let Some(missing) = doc.dict_number(descriptor, b"MissingWidth").filter(|w| *w > 0.0) {
                self.default_width = missing;
            }
        }
    }
}

/// Remove a subset prefix such as `ABCDEF+` from a font name.
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

/// Average advance width for a font known only by name.
fn standard_width(name: &str) -> f32 {
    let lower = name.to_lowercase();
    if lower.contains("courier") || lower.contains("mono") {
        600.0
    } else if lower.contains("helvetica") || lower.contains("arial") {
        556.0
    } else {
        500.0
    }
}

/// Highest CID addressable by a two-byte code.
const MAX_CID: u32 = 0xFFFF;

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
///
/// Entries starting past [`MAX_CID`] are skipped and ranges are clamped to it.
fn parse_cid_widths(doc: &PdfDocument, w: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < w.len() {
        let Some(first) = get_number(doc.resolve(&w[i])).and_then(to_cid) else {
            break;
        };

        match w.get(i + 1).map(|o| doc.resolve(o)) {
            Some(Object::Array(list)) => {
                if first <= MAX_CID {
                    for (offset, value) in list.iter().enumerate() {
                        let Some(code) = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| first.checked_add(offset))
                            .filter(|code| *code <= MAX_CID)
                        else {
                            break;
                        };
                        if let Some(width) = get_number(doc.resolve(value)) {
                            widths.insert(code, width);
                        }
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(width)) = (
                    get_number(last).and_then(to_cid),
                    w.get(i + 2).and_then(|o| get_number(doc.resolve(o))),
                ) else {
                    break;
                };
                if first <= MAX_CID && last >= first {
                    for code in first..=last.min(MAX_CID) {
                        widths.insert(code, width);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// A CID from a `/W` number; negative and non-finite values are rejected.
fn to_cid(value: f32) -> Option<u32> {
    if value.is_finite() && value >= 0.0 {
        Some(value.min(u32::MAX as f32) as u32)
    } else {
        None
    }
}
