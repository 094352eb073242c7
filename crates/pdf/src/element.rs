//! The page element tree produced by the content-stream interpreter.
//!
//! A page is a flat list of top-level [`PageElement`]s in content-stream
//! order.  Text objects and form XObjects are containers; everything else is
//! a leaf carrying a [`BoundingBox`].

use serde::Serialize;

use crate::geometry::BoundingBox;

/// One shown character (or decoded glyph run, for multi-char glyphs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    pub bbox: BoundingBox,
    pub font_size: f32,
    pub text: String,
    pub font_name: String,
}

/// A pre-grouped line of text, for producers that already know line
/// boundaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLineElement {
    pub bbox: BoundingBox,
    pub font_size: f32,
    pub text: String,
}

/// A placed image XObject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageElement {
    pub bbox: BoundingBox,
    /// Resource name the image was invoked with (`Im1`).
    pub name: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum PageElement {
    /// A `BT..ET` text object.  `bbox` is the union of its children, `None`
    /// when nothing was shown.
    TextContainer {
        bbox: Option<BoundingBox>,
        children: Vec<PageElement>,
    },
    TextLine(TextLineElement),
    Character(Glyph),
    Image(ImageElement),
    /// A form XObject with its interpreted content.
    Figure {
        bbox: BoundingBox,
        name: String,
        children: Vec<PageElement>,
    },
    Line(BoundingBox),
    Curve(BoundingBox),
    Rectangle(BoundingBox),
    Annotation {
        bbox: BoundingBox,
        subtype: String,
    },
    /// Content the interpreter recognises but does not model (inline
    /// images, shadings, forms nested too deeply).
    Unsupported {
        kind: String,
    },
}

impl PageElement {
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            PageElement::TextContainer { bbox, .. } => *bbox,
            PageElement::TextLine(line) => Some(line.bbox),
            PageElement::Character(glyph) => Some(glyph.bbox),
            PageElement::Image(image) => Some(image.bbox),
            PageElement::Figure { bbox, .. } => Some(*bbox),
            PageElement::Line(bbox) | PageElement::Curve(bbox) | PageElement::Rectangle(bbox) => {
                Some(*bbox)
            }
            PageElement::Annotation { bbox, .. } => Some(*bbox),
            PageElement::Unsupported { .. } => None,
        }
    }

    /// Short kind label used in logs and the hierarchy dump.
    pub fn kind_name(&self) -> &str {
        match self {
            PageElement::TextContainer { .. } => "LTTextBox",
            PageElement::TextLine(_) => "LTTextLine",
            PageElement::Character(_) => "LTChar",
            PageElement::Image(_) => "LTImage",
            PageElement::Figure { .. } => "LTFigure",
            PageElement::Line(_) => "LTLine",
            PageElement::Curve(_) => "LTCurve",
            PageElement::Rectangle(_) => "LTRect",
            PageElement::Annotation { .. } => "LTAnno",
            PageElement::Unsupported { kind } => kind.as_str(),
        }
    }

    /// Child elements of container kinds, empty for leaves.
    pub fn children(&self) -> &[PageElement] {
        match self {
            PageElement::TextContainer { children, .. } | PageElement::Figure { children, .. } => {
                children
            }
            _ => &[],
        }
    }
}

/// The interpreted content of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPage {
    /// 0-based page index within its document.
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub elements: Vec<PageElement>,
}

impl LayoutPage {
    /// All glyphs on the page in document order, descending into
    /// containers.
    pub fn glyphs(&self) -> Vec<&Glyph> {
        let mut out = Vec::new();
        for element in &self.elements {
            collect_glyphs(element, &mut out);
        }
        out
    }
}

fn collect_glyphs<'a>(element: &'a PageElement, out: &mut Vec<&'a Glyph>) {
    match element {
        PageElement::Character(glyph) => out.push(glyph),
        other => {
            for child in other.children() {
                collect_glyphs(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(text: &str, x: f32) -> PageElement {
        PageElement::Character(Glyph {
            bbox: BoundingBox::new(x, 0.0, x + 5.0, 10.0),
            font_size: 10.0,
            text: text.to_string(),
            font_name: "Helvetica".to_string(),
        })
    }

    #[test]
    fn test_glyphs_descend_into_containers() {
        let page = LayoutPage {
            index: 0,
            width: 595.0,
            height: 842.0,
            elements: vec![
                PageElement::TextContainer {
                    bbox: None,
                    children: vec![glyph("a", 0.0)],
                },
                PageElement::Figure {
                    bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                    name: "Fm0".to_string(),
                    children: vec![PageElement::TextContainer {
                        bbox: None,
                        children: vec![glyph("b", 5.0)],
                    }],
                },
                PageElement::Line(BoundingBox::new(0.0, 0.0, 100.0, 0.0)),
            ],
        };
        let text: String = page.glyphs().iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_unsupported_has_no_bbox() {
        let el = PageElement::Unsupported {
            kind: "inline-image".to_string(),
        };
        assert!(el.bbox().is_none());
        assert_eq!(el.kind_name(), "inline-image");
        assert!(el.children().is_empty());
    }

    #[test]
    fn test_serialized_elements_are_tagged() {
        let el = PageElement::Unsupported {
            kind: "inline-image".to_string(),
        };
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["element"], "unsupported");
        assert_eq!(value["kind"], "inline-image");

        let line = PageElement::Line(BoundingBox::new(0.0, 0.0, 10.0, 0.0));
        let line = serde_json::to_value(&line).unwrap();
        assert_eq!(line["element"], "line");
        assert_eq!(line["x2"], 10.0);
    }
}
