//! Glyph widths for simple fonts.
//!
//! A font's own `/FirstChar` + `/Widths` array wins.  Fonts that omit it
//! (the standard 14 are allowed to) fall back to the built-in AFM widths
//! of the common faces, and anything else to [`None`] so the interpreter
//! can use its size-based estimate.

use unicode_normalization::UnicodeNormalization;

use super::backend::BackendFontInfo;

/// AFM advance widths for ASCII 32..=126, in thousandths of an em.
type AsciiWidths = [u16; 95];

#[rustfmt::skip]
const HELVETICA: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER: AsciiWidths = [600; 95];

/// Built-in widths for a base font name, ignoring any `ABCDEF+` subset tag.
fn standard_widths(base_font: &str) -> Option<&'static AsciiWidths> {
    let name = match base_font.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 => rest,
        _ => base_font,
    };
    match name {
        "Helvetica" | "Helvetica-Oblique" | "ArialMT" | "Arial" | "Arial-ItalicMT" => {
            Some(&HELVETICA)
        }
        "Helvetica-Bold" | "Helvetica-BoldOblique" | "Arial-BoldMT" | "Arial,Bold" => {
            Some(&HELVETICA_BOLD)
        }
        "Times-Roman" | "TimesNewRomanPSMT" => Some(&TIMES_ROMAN),
        n if n.starts_with("Courier") => Some(&COURIER),
        _ => None,
    }
}

/// Width source for the font currently selected with `Tf`.
#[derive(Debug, Clone, Default)]
pub struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    standard: Option<&'static AsciiWidths>,
}

impl FontMetrics {
    pub fn for_font(info: &BackendFontInfo) -> Self {
        FontMetrics {
            first_char: info.first_char,
            widths: info.widths.clone(),
            standard: info.base_font.as_deref().and_then(standard_widths),
        }
    }

    /// Advance of one glyph in thousandths of an em.  `code` is the byte
    /// shown for single-byte fonts; `ch` is what it decoded to.
    pub fn width(&self, code: Option<u32>, ch: char) -> Option<f32> {
        let declared = code
            .and_then(|c| c.checked_sub(self.first_char))
            .and_then(|i| self.widths.get(i as usize));
        if let Some(w) = declared {
            return Some(*w);
        }

        let table = self.standard?;
        // Accented Latin letters share the width of their base letter.
        let base = if ch.is_ascii() {
            ch
        } else {
            std::iter::once(ch).nfd().next()?
        };
        let index = (base as u32).checked_sub(32)?;
        table.get(index as usize).map(|w| f32::from(*w))
    }
}
