//! Scanned vs. natively-authored document detection

use crate::images::{count_images, inherited_attribute, page_image_names};
use crate::metadata::decode_text_string;
use lazy_static::lazy_static;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use regex::bytes::Regex;
use shared_types::DocumentNature;
use tracing::debug;

/// Image coverage above which a page is a scan whatever its text
const FULL_COVERAGE: f64 = 0.85;
/// Coverage at which a page with an OCR text layer still counts as scanned
const OCR_COVERAGE: f64 = 0.70;
const OCR_TEXT_LIMIT: usize = 800;
/// Share of scanned pages that makes the whole document a scan
const SCANNED_PAGE_RATIO: f64 = 0.60;

/// US Letter, used when a page has no usable `/MediaBox`
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

lazy_static! {
    static ref FONT_RE: Regex = Regex::new(r"/Font\b").unwrap();
    static ref IMAGE_RE: Regex = Regex::new(r"/Subtype\s*/Image\b").unwrap();
    static ref BEGIN_TEXT_RE: Regex = Regex::new(r"\bBT\b").unwrap();
}

/// Page coverage and text/image counts a nature decision is made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatureEvidence {
    pub text_chars: usize,
    pub image_count: usize,
    /// Pages mostly covered by images
    pub scanned_pages: usize,
    /// Pages whose coverage was measured (0 for the byte heuristic)
    pub total_pages: usize,
    /// True when counts come from the raw-byte heuristic
    pub from_bytes: bool,
}

impl NatureEvidence {
    pub fn nature(&self) -> DocumentNature {
        if self.total_pages > 0
            && self.scanned_pages as f64 / self.total_pages as f64 >= SCANNED_PAGE_RATIO
        {
            return DocumentNature::Scan;
        }

        let scanned = (self.text_chars <= 3 && self.image_count >= 1)
            || (self.image_count >= 3 && self.text_chars < 15);
        if self.text_chars >= 20 || !scanned {
            DocumentNature::Native
        } else {
            DocumentNature::Scan
        }
    }
}

/// Whether one page reads as a scanned image
pub fn page_is_scanned(coverage: f64, text_chars: usize) -> bool {
    coverage >= FULL_COVERAGE || (coverage >= OCR_COVERAGE && text_chars <= OCR_TEXT_LIMIT)
}

/// Guess whether a PDF is a scan or a native document
pub fn detect_nature(bytes: &[u8]) -> DocumentNature {
    let evidence = match Document::load_mem(bytes) {
        Ok(doc) => structural_evidence(&doc),
        Err(e) => {
            debug!("Falling back to byte heuristic for nature detection: {}", e);
            byte_evidence(bytes)
        }
    };
    let nature = evidence.nature();
    debug!(
        "Nature {} (scanned pages: {}/{}, text chars: {}, images: {}, from bytes: {})",
        nature,
        evidence.scanned_pages,
        evidence.total_pages,
        evidence.text_chars,
        evidence.image_count,
        evidence.from_bytes
    );
    nature
}

/// Measure image coverage and shown text of every page of a parsed document
pub fn structural_evidence(doc: &Document) -> NatureEvidence {
    let mut text = String::new();
    let mut scanned_pages = 0;
    let pages = doc.get_pages();

    for page_id in pages.values() {
        let page = page_layout(doc, *page_id);
        if page_is_scanned(page.coverage, page.text.trim().chars().count()) {
            scanned_pages += 1;
        }
        text.push_str(&page.text);
    }

    NatureEvidence {
        text_chars: text.trim().chars().count(),
        image_count: count_images(doc),
        scanned_pages,
        total_pages: pages.len(),
        from_bytes: false,
    }
}

struct PageLayout {
    text: String,
    /// Image area drawn on the page over the page area
    coverage: f64,
}

fn page_layout(doc: &Document, page_id: ObjectId) -> PageLayout {
    let mut layout = PageLayout {
        text: String::new(),
        coverage: 0.0,
    };
    let Ok(content) = doc.get_page_content(page_id) else {
        return layout;
    };
    let Ok(content) = Content::decode(&content) else {
        return layout;
    };

    let media_box = media_box(doc, page_id);
    let page_area = ((media_box[2] - media_box[0]) * (media_box[3] - media_box[1])).max(1.0);
    let images = page_image_names(doc, page_id);

    let mut ctm = Matrix::IDENTITY;
    let mut saved = Vec::new();
    let mut image_area = 0.0;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => ctm = saved.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.then(&ctm);
                }
            }
            "Do" => {
                let is_image = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .map(|name| images.contains(name))
                    .unwrap_or(false);
                if is_image {
                    image_area += ctm.unit_square_area_within(&media_box);
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                for operand in &op.operands {
                    push_operand_text(operand, &mut layout.text);
                }
            }
            _ => {}
        }
    }

    layout.coverage = image_area / page_area;
    layout
}

/// Normalized `[x0, y0, x1, y1]` page box
fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let Ok(Some(Object::Array(items))) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return DEFAULT_MEDIA_BOX;
    };
    let values: Vec<f64> = items.iter().filter_map(number).collect();
    let &[x0, y0, x1, y1] = values.as_slice() else {
        return DEFAULT_MEDIA_BOX;
    };
    [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Affine transform `[a b c d e f]` as written by the `cm` operator
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values: Vec<f64> = operands.iter().filter_map(number).collect();
        let m: [f64; 6] = values.try_into().ok()?;
        Some(Matrix(m))
    }

    /// `self` applied first, then `outer`
    fn then(&self, outer: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = outer.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Area of the image unit square's bounding box, clipped to `clip`
    fn unit_square_area_within(&self, clip: &[f64; 4]) -> f64 {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        let x0 = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).max(clip[0]);
        let y0 = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).max(clip[1]);
        let x1 = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max).min(clip[2]);
        let y1 = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).min(clip[3]);
        let area = (x1 - x0).max(0.0) * (y1 - y0).max(0.0);
        if area.is_finite() {
            area
        } else {
            0.0
        }
    }
}

fn push_operand_text(operand: &Object, out: &mut String) {
    match operand {
        Object::String(bytes, _) => out.push_str(&decode_text_string(bytes)),
        Object::Array(items) => items.iter().for_each(|item| push_operand_text(item, out)),
        _ => {}
    }
}

/// Heuristic over raw bytes, blind to anything inside compressed streams
pub fn byte_evidence(bytes: &[u8]) -> NatureEvidence {
    let fonts = FONT_RE.find_iter(bytes).count();
    let images = IMAGE_RE.find_iter(bytes).count();
    let begin_text = BEGIN_TEXT_RE.find_iter(bytes).count();

    let text_chars = if begin_text > 0 {
        10 * begin_text
    } else if fonts > 0 {
        50
    } else {
        0
    };

    NatureEvidence {
        text_chars,
        image_count: images,
        scanned_pages: 0,
        total_pages: 0,
        from_bytes: true,
    }
}
