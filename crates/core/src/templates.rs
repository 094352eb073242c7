//! Anchor templates for the two known cover generations.
//!
//! Coordinates are PDF points with the origin at the bottom-left of an A4
//! page, measured on reference documents produced with each template.  The
//! tolerances are empirical; they absorb the sub-point rounding that
//! re-rendered covers show.

use coverscan_pdf::PageElement;
use serde::{Deserialize, Serialize};

use crate::evidence::{Evidence, Generation};

/// Element kinds a graphic anchor can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Image,
    Figure,
    Line,
    Curve,
    Rectangle,
}

impl ElementKind {
    pub fn of(element: &PageElement) -> Option<ElementKind> {
        match element {
            PageElement::Image(_) => Some(ElementKind::Image),
            PageElement::Figure { .. } => Some(ElementKind::Figure),
            PageElement::Line(_) => Some(ElementKind::Line),
            PageElement::Curve(_) => Some(ElementKind::Curve),
            PageElement::Rectangle(_) => Some(ElementKind::Rectangle),
            _ => None,
        }
    }
}

/// Where a graphic anchor expects its element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placement {
    /// Lower-left corner at `(x, y)` with the given size.
    At {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// A horizontal rule starting near `(x, y)`.  Shorter than `min_length`
    /// never matches; a length differing from `length` is reported.
    Rule {
        x: f32,
        y: f32,
        length: f32,
        min_length: f32,
    },
    /// Covers `left..right` horizontally and stays within `bottom..top`.
    Spans {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicAnchor {
    pub name: String,
    pub kinds: Vec<ElementKind>,
    pub placement: Placement,
    pub tolerance: f32,
    /// Vertical tolerance when it differs from `tolerance`.
    #[serde(default)]
    pub y_tolerance: Option<f32>,
    /// Position error up to which the element still matches, with a
    /// diagnostic.
    #[serde(default)]
    pub drift: Option<f32>,
    pub evidence: Evidence,
    #[serde(default)]
    pub generation: Option<Generation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextPosition {
    /// Line starts at `(x, y)`, `y` being the bottom of the line.
    Origin { x: f32, y: f32 },
    /// Line lies within the vertical band `bottom..top`.
    Band { bottom: f32, top: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnchor {
    pub name: String,
    pub position: TextPosition,
    pub tolerance: f32,
    /// The line must contain one of these.  Empty accepts any text.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub min_font_size: Option<f32>,
    pub evidence: Evidence,
    #[serde(default)]
    pub generation: Option<Generation>,
}

/// The anchors tested against one kind of page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateSet {
    pub graphics: Vec<GraphicAnchor>,
    pub text: Vec<TextAnchor>,
}

fn graphic(
    name: &str,
    kinds: &[ElementKind],
    placement: Placement,
    tolerance: f32,
    evidence: Evidence,
    generation: Generation,
) -> GraphicAnchor {
    GraphicAnchor {
        name: name.to_string(),
        kinds: kinds.to_vec(),
        placement,
        tolerance,
        y_tolerance: None,
        drift: None,
        evidence,
        generation: Some(generation),
    }
}

fn text(
    name: &str,
    position: TextPosition,
    tolerance: f32,
    keywords: &[&str],
    evidence: Evidence,
) -> TextAnchor {
    TextAnchor {
        name: name.to_string(),
        position,
        tolerance,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        min_font_size: None,
        evidence,
        generation: None,
    }
}

fn band(bottom: f32, top: f32) -> TextPosition {
    TextPosition::Band { bottom, top }
}

impl TemplateSet {
    /// Front cover anchors.
    pub fn front_cover() -> Self {
        use ElementKind::*;

        let graphics = vec![
            graphic(
                "KTH logo",
                &[Image, Figure],
                Placement::At {
                    x: 20.0,
                    y: 735.0,
                    width: 181.0,
                    height: 182.0,
                },
                2.0,
                Evidence::PossibleKthLogo,
                Generation::New,
            ),
            graphic(
                "KTH logo (small)",
                &[Image, Figure],
                Placement::At {
                    x: 38.0,
                    y: 736.25,
                    width: 72.85,
                    height: 72.85,
                },
                2.0,
                Evidence::PossibleKthLogo,
                Generation::New,
            ),
            graphic(
                "KTH logotype",
                &[Image, Figure],
                Placement::At {
                    x: 451.65,
                    y: 790.15,
                    width: 104.85,
                    height: 18.95,
                },
                2.0,
                Evidence::KthLogotype,
                Generation::New,
            ),
            GraphicAnchor {
                drift: Some(12.0),
                ..graphic(
                    "cover bottom rule",
                    &[Line, Rectangle],
                    Placement::Rule {
                        x: 37.4,
                        y: 31.94,
                        length: 518.7,
                        min_length: 490.0,
                    },
                    2.0,
                    Evidence::NewCoverBottomRule,
                    Generation::New,
                )
            },
            graphic(
                "old cover bottom image",
                &[Curve, Image, Figure],
                Placement::Spans {
                    left: 0.0,
                    right: 595.0,
                    bottom: 0.0,
                    top: 135.0,
                },
                2.0,
                Evidence::OldCoverBottomImage,
                Generation::Old,
            ),
        ];

        let text = vec![
            text(
                "place and year",
                band(37.09, 45.09),
                2.0,
                &["Stockholm, Sweden"],
                Evidence::CoverPlaceEnglish,
            ),
            text(
                "place and year",
                band(37.09, 45.09),
                2.0,
                &["Stockholm, Sverige"],
                Evidence::CoverPlaceSwedish,
            ),
            text(
                "subject area",
                band(654.68, 680.95),
                2.0,
                &["Degree Project", "Degree project", "Examensarbete"],
                Evidence::CoverSubjectArea,
            ),
            text(
                "level and credits",
                band(617.65, 644.20),
                2.0,
                &["cycle", "nivå", "credits", "hp"],
                Evidence::CoverLevelAndCredits,
            ),
            TextAnchor {
                min_font_size: Some(20.0),
                ..text("title", band(519.54, 573.71), 2.0, &[], Evidence::CoverTitle)
            },
            text("author", band(476.38, 488.38), 2.0, &[], Evidence::CoverAuthor),
        ];

        TemplateSet { graphics, text }
    }

    /// Back cover anchors.
    pub fn back_cover() -> Self {
        use ElementKind::*;

        let graphics = vec![
            GraphicAnchor {
                y_tolerance: Some(12.0),
                ..graphic(
                    "back cover line",
                    &[Line, Rectangle],
                    Placement::Rule {
                        x: 19.427,
                        y: 33.375,
                        length: 508.1,
                        min_length: 490.0,
                    },
                    25.0,
                    Evidence::NewBackCoverLine,
                    Generation::New,
                )
            },
            graphic(
                "old back cover image",
                &[Image, Figure],
                Placement::At {
                    x: 0.0,
                    y: 1.0,
                    width: 595.0,
                    height: 131.0,
                },
                2.0,
                Evidence::OldBackCoverImage,
                Generation::Old,
            ),
            graphic(
                "old back cover curve",
                &[Curve],
                Placement::Spans {
                    left: 0.0,
                    right: 595.0,
                    bottom: 0.0,
                    top: 135.0,
                },
                2.0,
                Evidence::OldBackCoverImage,
                Generation::Old,
            ),
        ];

        let origin = |x, y| TextPosition::Origin { x, y };
        let text = vec![
            text("old TRITA", origin(34.010, 167.625), 2.0, &["TRITA"], Evidence::TritaNumber),
            text("new TRITA", origin(38.685, 61.240), 2.0, &["TRITA"], Evidence::TritaNumber),
            text("old URL", origin(37.0, 65.0), 2.0, &["www.kth.se"], Evidence::WwwUrl),
            text("new URL", origin(38.685, 36.457), 2.0, &["www.kth.se"], Evidence::WwwUrl),
        ];

        TemplateSet { graphics, text }
    }
}
