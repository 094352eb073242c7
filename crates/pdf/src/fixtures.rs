//! In-memory PDF builder for tests.
//!
//! Produces small but structurally real documents (page tree, inherited
//! MediaBox and fonts, image XObjects, annotations) through `lopdf`, so the
//! whole pipeline can be exercised without binary fixtures on disk.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

#[derive(Debug, Clone, Default)]
pub struct FixtureText {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone)]
pub struct FixtureImage {
    pub name: &'static str,
    pub pixel_width: i64,
    pub pixel_height: i64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One page of a fixture document.  Boxes are `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    pub text: Vec<FixtureText>,
    pub images: Vec<FixtureImage>,
    /// Stroked straight segments from `(x1, y1)` to `(x2, y2)`.
    pub lines: Vec<[f32; 4]>,
    /// Filled rectangles.
    pub rects: Vec<[f32; 4]>,
    /// Filled Bézier shapes spanning the given box.
    pub curves: Vec<[f32; 4]>,
    pub link_annotation: Option<[f32; 4]>,
}

impl FixturePage {
    pub fn with_text(mut self, x: f32, y: f32, size: f32, text: &str) -> Self {
        self.text.push(FixtureText {
            x,
            y,
            size,
            text: text.to_string(),
            bold: false,
        });
        self
    }

    pub fn with_line(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.lines.push([x1, y1, x2, y2]);
        self
    }

    pub fn with_rect(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.rects.push([x1, y1, x2, y2]);
        self
    }

    pub fn with_curve(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.curves.push([x1, y1, x2, y2]);
        self
    }

    pub fn with_image(mut self, image: FixtureImage) -> Self {
        self.images.push(image);
        self
    }
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn operations(page: &FixturePage) -> Vec<Operation> {
    let mut ops = Vec::new();

    for text in &page.text {
        let font = if text.bold { "F2" } else { "F1" };
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), real(text.size)],
        ));
        ops.push(Operation::new(
            "Tm",
            vec![
                real(1.0),
                real(0.0),
                real(0.0),
                real(1.0),
                real(text.x),
                real(text.y),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(text.text.as_str())],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    for [x1, y1, x2, y2] in &page.lines {
        ops.push(Operation::new("m", vec![real(*x1), real(*y1)]));
        ops.push(Operation::new("l", vec![real(*x2), real(*y2)]));
        ops.push(Operation::new("S", vec![]));
    }

    for [x1, y1, x2, y2] in &page.rects {
        ops.push(Operation::new(
            "re",
            vec![real(*x1), real(*y1), real(x2 - x1), real(y2 - y1)],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    for [x1, y1, x2, y2] in &page.curves {
        ops.push(Operation::new("m", vec![real(*x1), real(*y1)]));
        ops.push(Operation::new(
            "c",
            vec![
                real(*x1),
                real(*y2),
                real(*x2),
                real(*y2),
                real(*x2),
                real(*y1),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    for image in &page.images {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                real(image.width),
                real(0.0),
                real(0.0),
                real(image.height),
                real(image.x),
                real(image.y),
            ],
        ));
        ops.push(Operation::new(
            "Do",
            vec![Object::Name(image.name.as_bytes().to_vec())],
        ));
        ops.push(Operation::new("Q", vec![]));
    }

    ops
}

/// Build a complete PDF from the given pages and return its bytes.
///
/// MediaBox and the font resources live on the root `Pages` node so that
/// pages have to inherit them.  Pages that place images carry their own
/// `Resources` with both fonts and XObjects.
pub fn build(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let fonts = dictionary! {
        "F1" => regular_id,
        "F2" => bold_id,
    };

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: operations(page),
        };
        let encoded = content.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };

        if !page.images.is_empty() {
            let mut xobjects = lopdf::Dictionary::new();
            for image in &page.images {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => Object::Integer(image.pixel_width),
                        "Height" => Object::Integer(image.pixel_height),
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => Object::Integer(8),
                    },
                    vec![0u8; 4],
                ));
                xobjects.set(image.name, image_id);
            }
            page_dict.set(
                "Resources",
                dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => xobjects,
                },
            );
        }

        if let Some([x1, y1, x2, y2]) = page.link_annotation {
            let annot_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![real(x1), real(y1), real(x2), real(y2)],
            });
            page_dict.set("Annots", vec![Object::Reference(annot_id)]);
        }

        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => dictionary! { "Font" => fonts },
            "MediaBox" => vec![real(0.0), real(0.0), real(595.0), real(842.0)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Fixture"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = doc.save_to(&mut buf);
    buf
}

/// One page per entry, each carrying a single 12pt line of text.
pub fn text_pages<S: AsRef<str>>(texts: &[S]) -> Vec<FixturePage> {
    texts
        .iter()
        .map(|t| FixturePage::default().with_text(72.0, 700.0, 12.0, t.as_ref()))
        .collect()
}
