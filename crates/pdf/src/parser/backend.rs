use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// An object identifier mirroring `lopdf::ObjectId`: (object number, generation number).
///
/// Identifies pages and form XObjects alike; both can own a resource
/// dictionary.
pub type PageId = (u32, u16);

/// Page-tree nodes are walked at most this many levels up when looking for
/// inherited attributes.  Guards against `/Parent` cycles.
const MAX_INHERIT_DEPTH: usize = 32;

/// References are followed at most this many times when resolving a value.
const MAX_RESOLVE_DEPTH: usize = 8;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
    /// Font subtype (e.g. `Type1`, `TrueType`, `Type0`).
    pub subtype: Option<String>,
    /// Encoding entry from the font dictionary, if present.
    pub encoding: Option<String>,
    /// Character code of the first entry in `widths`.
    pub first_char: u32,
    /// `/Widths` in thousandths of text space, empty when absent.
    pub widths: Vec<f32>,
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// This enum decouples the interpreter from the concrete `lopdf::Object`
/// type so that it can be driven by pure data in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// An external object invoked by the `Do` operator.
#[derive(Debug, Clone, PartialEq)]
pub enum XObject {
    Image {
        width: u32,
        height: u32,
    },
    Form {
        id: PageId,
        /// Form matrix `[a b c d e f]`, identity when absent.
        matrix: [f32; 6],
        bbox: Option<[f32; 4]>,
        /// Decompressed content stream.
        content: Vec<u8>,
    },
    /// PostScript XObjects and anything else with an unknown subtype.
    Other { subtype: String },
}

/// A page annotation (`/Annots` entry).
#[derive(Debug, Clone, PartialEq)]
pub struct BackendAnnotation {
    pub subtype: String,
    /// `/Rect` as `[llx, lly, urx, ury]`.
    pub rect: [f32; 4],
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// References are preserved as `PdfValue::Reference`.  Stream dictionaries
/// are converted but the raw stream bytes are discarded (they must be
/// obtained through [`PdfBackend::page_content`]).
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Stream(stream) => PdfValue::Dict(
            stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1 (PDFDocEncoding for the printable range).
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
///
/// The content-stream interpreter only talks to this trait, so it can be
/// tested against mock implementations that hand out pre-decoded operators.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Return the raw (possibly compressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode raw string bytes found in a text-showing operator, using any
    /// font-specific encoding information the backend can find for the given
    /// page and font name.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Resolve the XObject called `name` in the resources of `owner`, a page
    /// (with resources inherited from the page tree) or a form XObject.
    /// `Ok(None)` when the name is not defined.
    fn xobject(&self, owner: PageId, name: &[u8]) -> Result<Option<XObject>, PdfError>;

    /// Annotations attached to a page, in `/Annots` order.
    fn page_annotations(&self, page: PageId) -> Result<Vec<BackendAnnotation>, PdfError>;

    /// Page dimensions `(width, height)` from the (possibly inherited)
    /// MediaBox.
    fn page_dimensions(&self, page: PageId) -> Result<(f32, f32), PdfError>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &lopdf::Document {
        &self.doc
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Extract metadata from the PDF trailer's Info dictionary.
    ///
    /// Returns a `BTreeMap` of keys such as `"Title"`, `"Author"`,
    /// `"Creator"`, `"Producer"`, `"Subject"`, `"Keywords"`,
    /// `"CreationDate"`, and `"ModDate"`.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let info_dict = match self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| self.resolve(obj).as_dict().ok())
        {
            Some(d) => d,
            None => return meta,
        };

        let keys: &[&[u8]] = &[
            b"Title",
            b"Author",
            b"Creator",
            b"Producer",
            b"Subject",
            b"Keywords",
            b"CreationDate",
            b"ModDate",
        ];

        for key in keys {
            if let Ok(obj) = info_dict.get(key) {
                let value = match self.resolve(obj) {
                    lopdf::Object::String(bytes, _) => decode_text_simple(bytes),
                    lopdf::Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    _ => continue,
                };
                meta.insert(String::from_utf8_lossy(key).into_owned(), value);
            }
        }

        meta
    }

    // -- private helpers ----------------------------------------------------

    /// Follow references until a direct object is reached.  Dangling
    /// references resolve to `Null`.
    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> &'a lopdf::Object {
        static NULL: lopdf::Object = lopdf::Object::Null;
        let mut current = obj;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                lopdf::Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(next) => current = next,
                    Err(_) => return &NULL,
                },
                _ => return current,
            }
        }
        current
    }

    /// The dictionary of a page or stream object.
    fn object_dict(&self, id: PageId) -> Result<&lopdf::Dictionary, PdfError> {
        let obj = self
            .doc
            .get_object(id)
            .map_err(|e| PdfError::Parse(format!("cannot get object {:?}: {}", id, e)))?;
        match obj {
            lopdf::Object::Dictionary(d) => Ok(d),
            lopdf::Object::Stream(s) => Ok(&s.dict),
            other => Err(PdfError::Parse(format!(
                "object {:?} is not a dictionary: {:?}",
                id, other
            ))),
        }
    }

    /// Look up `key` on a page dictionary, walking up the page tree through
    /// `/Parent` until it is found.
    fn find_inherited<'a>(
        &'a self,
        dict: &'a lopdf::Dictionary,
        key: &[u8],
    ) -> Option<&'a lopdf::Object> {
        let mut current = dict;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(obj) = current.get(key) {
                return Some(self.resolve(obj));
            }
            let parent = current.get(b"Parent").ok()?;
            current = self.resolve(parent).as_dict().ok()?;
        }
        None
    }

    /// Convert an array of (possibly indirect) numbers to `f32` values.
    fn array_to_f32s(&self, objects: &[lopdf::Object]) -> Result<Vec<f32>, PdfError> {
        objects
            .iter()
            .map(|obj| match self.resolve(obj) {
                lopdf::Object::Integer(i) => Ok(*i as f32),
                lopdf::Object::Real(f) => Ok(*f),
                other => Err(PdfError::Parse(format!(
                    "expected number in array, got {:?}",
                    other
                ))),
            })
            .collect()
    }

    fn rect_from(&self, obj: &lopdf::Object) -> Option<[f32; 4]> {
        let arr = self.resolve(obj).as_array().ok()?;
        let nums = self.array_to_f32s(arr).ok()?;
        match nums.as_slice() {
            [a, b, c, d, ..] => Some([*a, *b, *c, *d]),
            _ => None,
        }
    }

    fn integer_entry(&self, dict: &lopdf::Dictionary, key: &[u8]) -> Option<i64> {
        match self.resolve(dict.get(key).ok()?) {
            lopdf::Object::Integer(i) => Some(*i),
            lopdf::Object::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    fn name_entry(&self, dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
        match self.resolve(dict.get(key).ok()?) {
            lopdf::Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            _ => None,
        }
    }

    /// Look up the encoding name for a font on a page.
    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        self.name_entry(font_dict, b"Encoding")
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let mut result = Vec::with_capacity(fonts_map.len());
        for (name, dict) in &fonts_map {
            let widths = dict
                .get(b"Widths")
                .ok()
                .and_then(|obj| self.resolve(obj).as_array().ok())
                .and_then(|arr| self.array_to_f32s(arr).ok())
                .unwrap_or_default();
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font: self.name_entry(dict, b"BaseFont"),
                subtype: self.name_entry(dict, b"Subtype"),
                encoding: self.name_entry(dict, b"Encoding"),
                first_char: self
                    .integer_entry(dict, b"FirstChar")
                    .and_then(|c| u32::try_from(c).ok())
                    .unwrap_or(0),
                widths,
            });
        }

        Ok(result)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(convert_object).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Some(enc_name) = self.font_encoding_name(page, font_name) {
            // Identity-H / Identity-V fonts typically use 2-byte CID codes
            // that map to Unicode.
            if enc_name.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
                let code_units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                    return decoded;
                }
            }
        }

        decode_text_simple(bytes)
    }

    fn xobject(&self, owner: PageId, name: &[u8]) -> Result<Option<XObject>, PdfError> {
        let owner_dict = self.object_dict(owner)?;
        let resources = match self
            .find_inherited(owner_dict, b"Resources")
            .and_then(|r| r.as_dict().ok())
        {
            Some(r) => r,
            None => return Ok(None),
        };
        let xobjects = match resources
            .get(b"XObject")
            .ok()
            .and_then(|x| self.resolve(x).as_dict().ok())
        {
            Some(x) => x,
            None => return Ok(None),
        };
        let entry = match xobjects.get(name) {
            Ok(entry) => entry,
            Err(_) => return Ok(None),
        };
        let id = entry.as_reference().unwrap_or(owner);
        let stream = match self.resolve(entry).as_stream() {
            Ok(s) => s,
            Err(_) => {
                log::warn!(
                    "XObject {} is not a stream",
                    String::from_utf8_lossy(name)
                );
                return Ok(None);
            }
        };

        let subtype = self.name_entry(&stream.dict, b"Subtype").unwrap_or_default();
        let xobject = match subtype.as_str() {
            "Image" => XObject::Image {
                width: self
                    .integer_entry(&stream.dict, b"Width")
                    .unwrap_or(0)
                    .max(0) as u32,
                height: self
                    .integer_entry(&stream.dict, b"Height")
                    .unwrap_or(0)
                    .max(0) as u32,
            },
            "Form" => {
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| self.resolve(m).as_array().ok())
                    .and_then(|arr| self.array_to_f32s(arr).ok())
                    .and_then(|nums| <[f32; 6]>::try_from(nums.as_slice()).ok())
                    .unwrap_or([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
                let bbox = stream.dict.get(b"BBox").ok().and_then(|b| self.rect_from(b));
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                XObject::Form {
                    id,
                    matrix,
                    bbox,
                    content,
                }
            }
            _ => XObject::Other { subtype },
        };

        Ok(Some(xobject))
    }

    fn page_annotations(&self, page: PageId) -> Result<Vec<BackendAnnotation>, PdfError> {
        let page_dict = self.object_dict(page)?;
        let annots = match page_dict
            .get(b"Annots")
            .ok()
            .and_then(|a| self.resolve(a).as_array().ok())
        {
            Some(a) => a,
            None => return Ok(Vec::new()),
        };

        let mut result = Vec::with_capacity(annots.len());
        for annot in annots {
            let dict = match self.resolve(annot).as_dict() {
                Ok(d) => d,
                Err(_) => continue,
            };
            let rect = match dict.get(b"Rect").ok().and_then(|r| self.rect_from(r)) {
                Some(r) => r,
                None => continue,
            };
            result.push(BackendAnnotation {
                subtype: self.name_entry(dict, b"Subtype").unwrap_or_default(),
                rect,
            });
        }
        Ok(result)
    }

    fn page_dimensions(&self, page: PageId) -> Result<(f32, f32), PdfError> {
        let page_dict = self.object_dict(page)?;
        let media_box = self
            .find_inherited(page_dict, b"MediaBox")
            .and_then(|obj| self.rect_from(obj))
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;

        Ok((media_box[2] - media_box[0], media_box[3] - media_box[1]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FixtureImage, FixturePage};

    // -- decode_text_simple -------------------------------------------------

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("Hello, world!".as_bytes()), "Hello, world!");
    }

    #[test]
    fn decode_text_simple_latin1() {
        // 0xE4 is U+00E4 in Latin-1 but not valid standalone UTF-8.
        let input: &[u8] = &[0x4B, 0xE4, 0x6C, 0x6C, 0x61];
        assert_eq!(decode_text_simple(input), "K\u{00E4}lla");
    }

    #[test]
    fn decode_text_simple_utf16be_basic() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(input), "AB");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_simple(input), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    // -- get_number_from_value ----------------------------------------------

    #[test]
    fn get_number_accepts_integers_and_reals() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(-10)), Some(-10.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
    }

    #[test]
    fn get_number_from_non_numeric() {
        assert_eq!(get_number_from_value(&PdfValue::Null), None);
        assert_eq!(get_number_from_value(&PdfValue::Name(b"Foo".to_vec())), None);
        assert_eq!(get_number_from_value(&PdfValue::Reference((1, 0))), None);
    }

    // -- convert_object -----------------------------------------------------

    #[test]
    fn convert_nested_array_in_dict() {
        let mut dict = lopdf::Dictionary::new();
        dict.set(
            "Box",
            lopdf::Object::Array(vec![
                lopdf::Object::Integer(0),
                lopdf::Object::Real(612.0),
            ]),
        );
        match convert_object(&lopdf::Object::Dictionary(dict)) {
            PdfValue::Dict(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(
                    entries[0].1,
                    PdfValue::Array(vec![PdfValue::Integer(0), PdfValue::Real(612.0)]),
                );
            }
            other => panic!("expected Dict, got {:?}", other),
        }
    }

    #[test]
    fn convert_reference() {
        let obj = lopdf::Object::Reference((7, 0));
        assert_eq!(convert_object(&obj), PdfValue::Reference((7, 0)));
    }

    // -- LopdfBackend ---------------------------------------------------------

    #[test]
    fn load_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn inherited_media_box_and_resources() {
        let bytes = fixtures::build(&[FixturePage {
            images: vec![FixtureImage {
                name: "Im1",
                pixel_width: 181,
                pixel_height: 182,
                x: 20.0,
                y: 735.0,
                width: 181.0,
                height: 182.0,
            }],
            ..FixturePage::default()
        }]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let page = *backend.pages().get(&1).unwrap();

        let (w, h) = backend.page_dimensions(page).unwrap();
        assert!((w - 595.0).abs() < 0.01);
        assert!((h - 842.0).abs() < 0.01);

        assert_eq!(
            backend.xobject(page, b"Im1").unwrap(),
            Some(XObject::Image {
                width: 181,
                height: 182
            })
        );
        assert_eq!(backend.xobject(page, b"Missing").unwrap(), None);
    }

    #[test]
    fn annotations_are_listed() {
        let bytes = fixtures::build(&[FixturePage {
            link_annotation: Some([100.0, 100.0, 200.0, 120.0]),
            ..FixturePage::default()
        }]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let page = *backend.pages().get(&1).unwrap();

        let annots = backend.page_annotations(page).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].subtype, "Link");
        assert_eq!(annots[0].rect, [100.0, 100.0, 200.0, 120.0]);
    }

    #[test]
    fn metadata_reads_info_dictionary() {
        let bytes = fixtures::build(&[FixturePage::default()]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        assert_eq!(
            backend.metadata().get("Title").map(String::as_str),
            Some("Fixture")
        );
    }

    #[test]
    fn font_widths_are_read() {
        let bytes = fixtures::build(&fixtures::text_pages(&["x"]));
        let mut doc = lopdf::Document::load_mem(&bytes).unwrap();
        let helvetica = lopdf::Object::Name(b"Helvetica".to_vec());
        let font_id = doc
            .objects
            .iter()
            .find(|(_, obj)| {
                obj.as_dict()
                    .map_or(false, |d| d.get(b"BaseFont").ok() == Some(&helvetica))
            })
            .map(|(id, _)| *id)
            .unwrap();
        let font = doc.get_object_mut(font_id).unwrap().as_dict_mut().unwrap();
        font.set("FirstChar", lopdf::Object::Integer(32));
        font.set(
            "Widths",
            vec![lopdf::Object::Integer(250), lopdf::Object::Real(300.0)],
        );
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();

        let backend = LopdfBackend::load_bytes(&out).unwrap();
        let page = *backend.pages().get(&1).unwrap();
        let fonts = backend.page_fonts(page).unwrap();
        let regular = fonts.iter().find(|f| f.name == b"F1").unwrap();
        assert_eq!(regular.first_char, 32);
        assert_eq!(regular.widths, vec![250.0, 300.0]);

        let bold = fonts.iter().find(|f| f.name == b"F2").unwrap();
        assert!(bold.widths.is_empty());
    }
}
