//! Embedded raster image extraction
//!
//! Walks every page's `/XObject` resources, keeps image XObjects that pass an
//! [`ImageFilter`], and decodes their samples to 8-bit grayscale.
//!
//! Supported encodings: raw samples, `FlateDecode` (with PNG / TIFF
//! predictors) and `DCTDecode`. Images using other filters (JBIG2, JPX,
//! CCITT, LZW) are skipped rather than treated as errors.

use crate::error::ExtractionError;
use crate::metadata::resolve;
use flate2::read::ZlibDecoder;
use image::GrayImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, warn};

/// Maximum depth when walking `/Parent` links for inherited resources
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Largest image decoded, in pixels
const MAX_PIXELS: usize = 1 << 27;

/// Shape constraints an image must satisfy to be analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFilter {
    pub min_width: u32,
    pub min_height: u32,
    pub max_channels: u8,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            max_channels: 4,
        }
    }
}

impl ImageFilter {
    pub fn accepts(&self, width: u32, height: u32, channels: u8) -> bool {
        width >= self.min_width && height >= self.min_height && channels <= self.max_channels
    }
}

/// A decoded embedded image
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// 1-based page number the image was found on
    pub page: u32,
    pub object_id: ObjectId,
    /// Color components of the source image (before grayscale conversion)
    pub channels: u8,
    pub gray: GrayImage,
}

/// Extract every qualifying image of the document, page by page.
///
/// An image referenced from several pages is returned once per page.
pub fn extract_images(
    doc: &Document,
    filter: &ImageFilter,
) -> Result<Vec<RasterImage>, ExtractionError> {
    let mut images = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let Some(resources) = page_resources(doc, page_id)? else {
            continue;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            continue;
        };
        let xobjects = resolve(doc, xobjects)?
            .as_dict()
            .map_err(|_| ExtractionError::Malformed("/XObject is not a dictionary".to_string()))?;

        for (_name, entry) in xobjects.iter() {
            let Object::Reference(id) = entry else {
                continue;
            };
            let Ok(stream) = doc.get_object(*id).and_then(Object::as_stream) else {
                continue;
            };
            if !is_image(&stream.dict) {
                continue;
            }

            match decode_image(doc, resources, stream, filter) {
                Ok(Some((gray, channels))) => images.push(RasterImage {
                    page: page_number,
                    object_id: *id,
                    channels,
                    gray,
                }),
                Ok(None) => {}
                Err(e) => warn!("Skipping image {:?} on page {}: {}", id, page_number, e),
            }
        }
    }

    debug!("Extracted {} qualifying images", images.len());
    Ok(images)
}

/// Count image XObjects referenced from page resources, without decoding
pub fn count_images(doc: &Document) -> usize {
    doc.get_pages()
        .values()
        .map(|page_id| page_image_names(doc, *page_id).len())
        .sum()
}

/// Resource names under which a page's image XObjects are drawn
pub(crate) fn page_image_names(doc: &Document, page_id: ObjectId) -> HashSet<Vec<u8>> {
    let Ok(Some(resources)) = page_resources(doc, page_id) else {
        return HashSet::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve(doc, o).ok())
        .and_then(|o| o.as_dict().ok())
    else {
        return HashSet::new();
    };
    xobjects
        .iter()
        .filter(|(_, entry)| {
            entry
                .as_reference()
                .and_then(|id| doc.get_object(id))
                .and_then(Object::as_stream)
                .map(|s| is_image(&s.dict))
                .unwrap_or(false)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Image"))
}

/// Page attribute, following `/Parent` inheritance
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, ExtractionError> {
    let mut node = doc.get_object(page_id)?.as_dict()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_object(parent)?.as_dict()?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Option<&Dictionary>, ExtractionError> {
    Ok(inherited_attribute(doc, page_id, b"Resources")?.and_then(|res| res.as_dict().ok()))
}

#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorModel>,
        hival: usize,
        lookup: Vec<u8>,
    },
    Other(u8),
}

impl ColorModel {
    fn components(&self) -> u8 {
        match self {
            ColorModel::Gray | ColorModel::Indexed { .. } => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
            ColorModel::Other(n) => *n,
        }
    }

    fn from_object(doc: &Document, resources: &Dictionary, obj: &Object, depth: usize) -> Self {
        if depth > 4 {
            return ColorModel::Other(1);
        }
        let Ok(obj) = resolve(doc, obj) else {
            return ColorModel::Other(1);
        };
        match obj {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"CalGray" | b"G" => ColorModel::Gray,
                b"DeviceRGB" | b"CalRGB" | b"RGB" => ColorModel::Rgb,
                b"DeviceCMYK" | b"CMYK" => ColorModel::Cmyk,
                other => resources
                    .get(b"ColorSpace")
                    .ok()
                    .and_then(|cs| resolve(doc, cs).ok())
                    .and_then(|cs| cs.as_dict().ok())
                    .and_then(|cs| cs.get(other).ok())
                    .map(|named| Self::from_object(doc, resources, named, depth + 1))
                    .unwrap_or(ColorModel::Other(1)),
            },
            Object::Array(items) => Self::from_array(doc, resources, items, depth),
            _ => ColorModel::Other(1),
        }
    }

    fn from_array(doc: &Document, resources: &Dictionary, items: &[Object], depth: usize) -> Self {
        let family = items.first().and_then(|o| o.as_name().ok()).unwrap_or(b"");
        match family {
            b"CalGray" => ColorModel::Gray,
            b"CalRGB" => ColorModel::Rgb,
            b"Lab" => ColorModel::Other(3),
            b"Separation" => ColorModel::Other(1),
            b"ICCBased" => {
                let n = items
                    .get(1)
                    .and_then(|o| resolve(doc, o).ok())
                    .and_then(|o| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"N").and_then(Object::as_i64).ok())
                    .unwrap_or(3);
                match n {
                    1 => ColorModel::Gray,
                    3 => ColorModel::Rgb,
                    4 => ColorModel::Cmyk,
                    n => ColorModel::Other(n.clamp(1, 32) as u8),
                }
            }
            b"DeviceN" => {
                let n = items
                    .get(1)
                    .and_then(|o| resolve(doc, o).ok())
                    .and_then(|o| o.as_array().ok())
                    .map(|names| names.len())
                    .unwrap_or(1);
                ColorModel::Other(n.clamp(1, 32) as u8)
            }
            b"Indexed" | b"I" => {
                let base = items
                    .get(1)
                    .map(|b| Self::from_object(doc, resources, b, depth + 1))
                    .unwrap_or(ColorModel::Rgb);
                let hival = items
                    .get(2)
                    .and_then(|o| o.as_i64().ok())
                    .unwrap_or(255)
                    .clamp(0, 255) as usize;
                let lookup = items
                    .get(3)
                    .and_then(|o| resolve(doc, o).ok())
                    .and_then(|o| match o {
                        Object::String(bytes, _) => Some(bytes.clone()),
                        Object::Stream(s) => decode_filters(s).ok().flatten(),
                        _ => None,
                    })
                    .unwrap_or_default();
                ColorModel::Indexed {
                    base: Box::new(base),
                    hival,
                    lookup,
                }
            }
            _ => ColorModel::Other(1),
        }
    }

    /// Convert one pixel's samples (already scaled to 0..=255, or a raw
    /// palette index for indexed images) to a luminance value
    fn to_luma(&self, samples: &[u8]) -> u8 {
        match self {
            ColorModel::Gray | ColorModel::Other(_) => samples[0],
            ColorModel::Rgb => luma(samples[0], samples[1], samples[2]),
            ColorModel::Cmyk => {
                let (r, g, b) = cmyk_to_rgb(samples[0], samples[1], samples[2], samples[3]);
                luma(r, g, b)
            }
            ColorModel::Indexed {
                base,
                hival,
                lookup,
            } => {
                let index = (samples[0] as usize).min(*hival);
                let width = base.components() as usize;
                match lookup.get(index * width..index * width + width) {
                    Some(entry) => base.to_luma(entry),
                    None => 0,
                }
            }
        }
    }
}

/// ITU-R BT.601 luminance, rounded
fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> (u8, u8, u8) {
    let channel = |v: u8| ((255 - v as u32) * (255 - k as u32) / 255) as u8;
    (channel(c), channel(m), channel(y))
}

/// Decode one image stream to grayscale.
///
/// Returns `Ok(None)` when the image is filtered out or uses an encoding
/// this module does not handle.
fn decode_image(
    doc: &Document,
    resources: &Dictionary,
    stream: &Stream,
    filter: &ImageFilter,
) -> Result<Option<(GrayImage, u8)>, ExtractionError> {
    let dict = &stream.dict;
    if matches!(dict.get(b"ImageMask").and_then(Object::as_bool), Ok(true)) {
        return Ok(None);
    }

    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let model = dict
        .get(b"ColorSpace")
        .map(|cs| ColorModel::from_object(doc, resources, cs, 0))
        .unwrap_or(ColorModel::Gray);

    let filters = filter_names(dict);
    let is_jpeg = filters
        .last()
        .map(|f| f == b"DCTDecode" || f == b"DCT")
        .unwrap_or(false);

    if !is_jpeg && !filter.accepts(width, height, model.components()) {
        debug!("Image {}x{} ({} channels) filtered out", width, height, model.components());
        return Ok(None);
    }

    if is_jpeg {
        let prefix = &filters[..filters.len() - 1];
        let Some(data) = apply_filters(&stream.content, prefix, dict)? else {
            return Ok(None);
        };
        let decoded = image::load_from_memory_with_format(&data, image::ImageFormat::Jpeg)
            .map_err(|e| ExtractionError::Decode {
                object: "DCTDecode".to_string(),
                reason: e.to_string(),
            })?;
        let channels = decoded.color().channel_count();
        let gray = decoded.to_luma8();
        if !filter.accepts(gray.width(), gray.height(), channels) {
            return Ok(None);
        }
        return Ok(Some((gray, channels)));
    }

    let Some(data) = apply_filters(&stream.content, &filters, dict)? else {
        debug!("Unsupported image filter chain {:?}", filters_as_strings(&filters));
        return Ok(None);
    };
    let bpc = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8) as u32;
    let invert = decode_is_inverted(dict);

    let gray = samples_to_gray(&data, width, height, bpc, &model, invert)?;
    Ok(Some((gray, model.components())))
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32, ExtractionError> {
    let value = dict.get(key).and_then(Object::as_i64).map_err(|_| {
        ExtractionError::Malformed(format!(
            "image without /{}",
            String::from_utf8_lossy(key)
        ))
    })?;
    u32::try_from(value)
        .map_err(|_| ExtractionError::Malformed(format!("image dimension {} out of range", value)))
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

fn filters_as_strings(filters: &[Vec<u8>]) -> Vec<String> {
    filters
        .iter()
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect()
}

fn decode_params(dict: &Dictionary, index: usize) -> Option<&Dictionary> {
    match dict.get(b"DecodeParms").ok()? {
        Object::Dictionary(d) => (index == 0).then_some(d),
        Object::Array(items) => items.get(index).and_then(|o| o.as_dict().ok()),
        _ => None,
    }
}

/// Run a generic stream (e.g. an indexed palette) through its filters
fn decode_filters(stream: &Stream) -> Result<Option<Vec<u8>>, ExtractionError> {
    let filters = filter_names(&stream.dict);
    Ok(apply_filters(&stream.content, &filters, &stream.dict)?.map(Cow::into_owned))
}

fn apply_filters<'a>(
    content: &'a [u8],
    filters: &[Vec<u8>],
    dict: &Dictionary,
) -> Result<Option<Cow<'a, [u8]>>, ExtractionError> {
    let mut data = Cow::Borrowed(content);
    for (index, name) in filters.iter().enumerate() {
        match name.as_slice() {
            b"FlateDecode" | b"Fl" => {
                let inflated = inflate(&data)?;
                let unpredicted = match decode_params(dict, index) {
                    Some(params) => match undo_predictor(inflated, params)? {
                        Some(bytes) => bytes,
                        None => return Ok(None),
                    },
                    None => inflated,
                };
                data = Cow::Owned(unpredicted);
            }
            _ => return Ok(None),
        }
    }
    Ok(Some(data))
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    if let Err(e) = decoder.read_to_end(&mut out) {
        // Truncated streams are common; keep what was recovered
        if out.is_empty() {
            return Err(ExtractionError::Decode {
                object: "FlateDecode".to_string(),
                reason: e.to_string(),
            });
        }
    }
    Ok(out)
}

/// Reverse a PNG (>= 10) or TIFF (2) predictor. `None` for unsupported
/// combinations.
fn undo_predictor(data: Vec<u8>, params: &Dictionary) -> Result<Option<Vec<u8>>, ExtractionError> {
    let int = |key: &[u8], default: i64| params.get(key).and_then(Object::as_i64).unwrap_or(default);
    let predictor = int(b"Predictor", 1);
    let colors = int(b"Colors", 1).max(1) as usize;
    let bpc = int(b"BitsPerComponent", 8).max(1) as usize;
    let columns = int(b"Columns", 1).max(1) as usize;

    let pixel_bits = colors
        .checked_mul(bpc)
        .filter(|&bits| bits <= 32 * 16)
        .ok_or_else(|| ExtractionError::Malformed(format!("predictor with {} colors", colors)))?;
    let bytes_per_pixel = pixel_bits.div_ceil(8).max(1);
    let row_len = pixel_bits
        .checked_mul(columns)
        .map(|bits| bits.div_ceil(8))
        .filter(|&len| len <= MAX_PIXELS)
        .ok_or_else(|| ExtractionError::Malformed(format!("predictor with {} columns", columns)))?;

    match predictor {
        1 => Ok(Some(data)),
        2 if bpc == 8 => {
            let mut out = data;
            for row in out.chunks_mut(row_len) {
                for i in bytes_per_pixel..row.len() {
                    row[i] = row[i].wrapping_add(row[i - bytes_per_pixel]);
                }
            }
            Ok(Some(out))
        }
        p if p >= 10 => Ok(Some(undo_png_predictor(&data, row_len, bytes_per_pixel)?)),
        _ => Ok(None),
    }
}

fn undo_png_predictor(
    data: &[u8],
    row_len: usize,
    bpp: usize,
) -> Result<Vec<u8>, ExtractionError> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];

    for chunk in data.chunks(row_len + 1) {
        if chunk.len() < 2 {
            break;
        }
        let kind = chunk[0];
        let mut row = chunk[1..].to_vec();
        row.resize(row_len, 0);

        for i in 0..row_len {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };
            let predicted = match kind {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                other => {
                    return Err(ExtractionError::Decode {
                        object: "FlateDecode".to_string(),
                        reason: format!("unknown PNG filter type {}", other),
                    })
                }
            };
            row[i] = row[i].wrapping_add(predicted);
        }

        out.extend_from_slice(&row);
        prev = row;
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn decode_is_inverted(dict: &Dictionary) -> bool {
    let Ok(Object::Array(items)) = dict.get(b"Decode") else {
        return false;
    };
    let number = |o: &Object| match o {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    };
    match (items.first().and_then(number), items.get(1).and_then(number)) {
        (Some(lo), Some(hi)) => lo > hi,
        _ => false,
    }
}

/// Unpack raw samples and convert them to grayscale
fn samples_to_gray(
    data: &[u8],
    width: u32,
    height: u32,
    bpc: u32,
    model: &ColorModel,
    invert: bool,
) -> Result<GrayImage, ExtractionError> {
    if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
        return Err(ExtractionError::Malformed(format!(
            "unsupported BitsPerComponent {}",
            bpc
        )));
    }

    let comps = model.components() as usize;
    let w = width as usize;
    let h = height as usize;
    let oversized = || {
        ExtractionError::Malformed(format!("image dimensions {}x{} too large", width, height))
    };
    let pixel_count = w.checked_mul(h).filter(|&n| n <= MAX_PIXELS).ok_or_else(oversized)?;
    let row_len = w
        .checked_mul(comps)
        .and_then(|n| n.checked_mul(bpc as usize))
        .ok_or_else(oversized)?
        .div_ceil(8);
    let data_len = row_len.checked_mul(h).ok_or_else(oversized)?;
    if data.len() < data_len {
        return Err(ExtractionError::Malformed(format!(
            "image data too short: {} bytes for {}x{}",
            data.len(),
            width,
            height
        )));
    }

    // Palette indices must not be rescaled
    let is_indexed = matches!(model, ColorModel::Indexed { .. });
    let max_value = (1u32 << bpc.min(8)) - 1;

    let mut pixels = Vec::with_capacity(pixel_count);
    let mut samples = vec![0u8; comps];

    for y in 0..h {
        let row = &data[y * row_len..(y + 1) * row_len];
        for x in 0..w {
            for (c, slot) in samples.iter_mut().enumerate() {
                let index = x * comps + c;
                let raw = match bpc {
                    8 => row[index] as u32,
                    16 => row[index * 2] as u32,
                    _ => {
                        let bit = index * bpc as usize;
                        let byte = row[bit / 8] as u32;
                        let shift = 8 - bpc as usize - (bit % 8);
                        (byte >> shift) & max_value
                    }
                };
                *slot = if is_indexed || bpc >= 8 {
                    raw as u8
                } else {
                    (raw * 255 / max_value) as u8
                };
            }
            let value = model.to_luma(&samples);
            pixels.push(if invert { 255 - value } else { value });
        }
    }

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| ExtractionError::Malformed("image buffer size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use lopdf::content::{Content, Operation};
    use std::io::Write;

    /// Single-page document whose page shows the given image streams
    fn doc_with_images(images: Vec<Stream>) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();
        for (i, stream) in images.into_iter().enumerate() {
            let id = doc.add_object(stream);
            let name = format!("Im{}", i);
            xobjects.set(name.clone(), Object::Reference(id));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        let page_id = doc.add_object(page);

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn image_stream(width: i64, height: i64, color_space: &str, data: Vec<u8>, flate: bool) -> Stream {
        let mut dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width)),
            ("Height", Object::Integer(height)),
            ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);
        let content = if flate {
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data).unwrap();
            encoder.finish().unwrap()
        } else {
            data
        };
        Stream::new(dict, content)
    }

    #[test]
    fn test_extracts_flate_gray_image() {
        let data: Vec<u8> = (0..120 * 110).map(|i| (i % 256) as u8).collect();
        let doc = doc_with_images(vec![image_stream(120, 110, "DeviceGray", data.clone(), true)]);

        let images = extract_images(&doc, &ImageFilter::default()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].page, 1);
        assert_eq!(images[0].channels, 1);
        assert_eq!(images[0].gray.dimensions(), (120, 110));
        assert_eq!(images[0].gray.as_raw(), &data);
    }

    #[test]
    fn test_rgb_is_converted_to_luma() {
        let data: Vec<u8> = [255u8, 0, 0].repeat(100 * 100);
        let doc = doc_with_images(vec![image_stream(100, 100, "DeviceRGB", data, false)]);

        let images = extract_images(&doc, &ImageFilter::default()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].channels, 3);
        assert_eq!(images[0].gray.get_pixel(0, 0).0[0], 76);
    }

    #[test]
    fn test_small_images_are_excluded() {
        let small = image_stream(99, 200, "DeviceGray", vec![0; 99 * 200], false);
        let large = image_stream(150, 150, "DeviceGray", vec![0; 150 * 150], false);
        let doc = doc_with_images(vec![small, large]);

        let images = extract_images(&doc, &ImageFilter::default()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].gray.width(), 150);
        assert_eq!(count_images(&doc), 2);
    }

    #[test]
    fn test_unsupported_filter_is_skipped() {
        let mut stream = image_stream(200, 200, "DeviceGray", vec![0; 10], false);
        stream.dict.set("Filter", Object::Name(b"JBIG2Decode".to_vec()));
        let doc = doc_with_images(vec![stream]);

        assert!(extract_images(&doc, &ImageFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_png_up_predictor() {
        // Two rows of 3 bytes, second row encoded with the Up filter
        let encoded = vec![0, 10, 20, 30, 2, 1, 1, 1];
        let params = Dictionary::from_iter(vec![
            ("Predictor", Object::Integer(12)),
            ("Columns", Object::Integer(3)),
        ]);
        let decoded = undo_predictor(encoded, &params).unwrap().unwrap();
        assert_eq!(decoded, vec![10, 20, 30, 11, 21, 31]);
    }

    #[test]
    fn test_one_bit_samples_are_scaled() {
        // 8 pixels per byte, alternating black / white
        let model = ColorModel::Gray;
        let gray = samples_to_gray(&[0b0101_0101], 8, 1, 1, &model, false).unwrap();
        assert_eq!(gray.as_raw(), &vec![0, 255, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn test_indexed_palette_lookup() {
        let model = ColorModel::Indexed {
            base: Box::new(ColorModel::Rgb),
            hival: 1,
            lookup: vec![0, 0, 0, 255, 255, 255],
        };
        let gray = samples_to_gray(&[0, 1], 2, 1, 8, &model, false).unwrap();
        assert_eq!(gray.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn test_huge_dimensions_are_rejected() {
        let err = samples_to_gray(&[0u8; 16], u32::MAX, u32::MAX, 8, &ColorModel::Cmyk, false)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));

        let err = samples_to_gray(&[0u8; 16], 1 << 31, 1 << 30, 16, &ColorModel::Cmyk, false)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn test_oversized_image_is_skipped_not_fatal() {
        let huge = u32::MAX as i64;
        let doc = doc_with_images(vec![image_stream(huge, huge, "DeviceCMYK", vec![0u8; 64], false)]);

        assert!(extract_images(&doc, &ImageFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_predictor_with_huge_columns_is_rejected() {
        let params = Dictionary::from_iter(vec![
            ("Predictor", Object::Integer(12)),
            ("Colors", Object::Integer(4)),
            ("Columns", Object::Integer(i64::MAX)),
        ]);
        let err = undo_predictor(vec![2, 0, 0, 0, 0], &params).unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }
}
