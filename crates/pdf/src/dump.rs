//! Flat dump of a page's element hierarchy for manual inspection.

use std::fmt;

use serde::Serialize;

use crate::element::{LayoutPage, PageElement};
use crate::geometry::BoundingBox;

/// Column header printed above a dump.
pub const HEADER: &str = "element                        x1  y1  x2  y2   text\n\
                          ------------------------------ --- --- --- ---- -----";

/// One element of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyRow {
    pub depth: usize,
    pub kind: String,
    pub bbox: Option<BoundingBox>,
    pub text: String,
}

impl fmt::Display for HierarchyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut name = format!("{}{}", "  ".repeat(self.depth), self.kind);
        name.truncate(30);
        write!(f, "{:<30} ", name)?;
        if let Some(b) = &self.bbox {
            for v in [b.x1, b.y1, b.x2, b.y2] {
                write!(f, "{:<4.0}", v)?;
            }
        }
        write!(f, " {}", self.text)
    }
}

/// Text of an element and all its descendants, in document order.
fn element_text(element: &PageElement) -> String {
    match element {
        PageElement::Character(g) => g.text.clone(),
        PageElement::TextLine(line) => line.text.clone(),
        PageElement::Image(img) => format!("{} {}x{}", img.name, img.pixel_width, img.pixel_height),
        PageElement::TextContainer { children, .. } => {
            children.iter().map(element_text).collect::<String>()
        }
        _ => String::new(),
    }
}

fn visit(element: &PageElement, depth: usize, rows: &mut Vec<HierarchyRow>) {
    rows.push(HierarchyRow {
        depth,
        kind: element.kind_name().to_string(),
        bbox: element.bbox(),
        text: element_text(element).trim().to_string(),
    });
    for child in element.children() {
        visit(child, depth + 1, rows);
    }
}

/// Flatten `page` into rows, the page itself first at depth 0.
pub fn hierarchy(page: &LayoutPage) -> Vec<HierarchyRow> {
    let mut rows = vec![HierarchyRow {
        depth: 0,
        kind: "LTPage".to_string(),
        bbox: Some(BoundingBox::new(0.0, 0.0, page.width, page.height)),
        text: String::new(),
    }];
    for element in &page.elements {
        visit(element, 1, &mut rows);
    }
    rows
}
