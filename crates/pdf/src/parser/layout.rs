//! Content-stream interpreter producing the page element tree.
//!
//! Every shown character becomes a [`PageElement::Character`] positioned in
//! user space, every `BT..ET` object becomes a text container, painted
//! subpaths become lines, rectangles or curves, and `Do` invocations become
//! images or nested figures.  Side effects (I/O) live behind the
//! [`PdfBackend`] trait provided by the caller.
//!
//! # Pipeline
//!
//! ```text
//! content ops  ->  graphics + text state machine  ->  PageElement[]
//!   (per page)      q/Q cm BT/ET T* Tj/TJ paths Do      (+ annotations)
//! ```

use super::backend::{
    get_number_from_value, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue, XObject,
};
use super::metrics::FontMetrics;
use crate::element::{Glyph, ImageElement, LayoutPage, PageElement};
use crate::geometry::BoundingBox;
use crate::PdfError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Glyph advance as a fraction of font size for fonts with neither
/// `/Widths` nor built-in metrics.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Distance from the baseline to the bottom of a glyph box, as a fraction of
/// font size.  Matches the descent of the standard sans-serif faces.
pub const DESCENT_RATIO: f32 = 0.21;

/// Form XObjects nested deeper than this are reported as unsupported.
const MAX_FORM_DEPTH: usize = 8;

/// The identity 2x3 matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Matrix helpers
// ---------------------------------------------------------------------------

/// `lhs × rhs` in PDF's row-vector convention: transforming a point by the
/// result is transforming it by `lhs` first, then by `rhs`.
fn multiply(lhs: &[f32; 6], rhs: &[f32; 6]) -> [f32; 6] {
    [
        lhs[0] * rhs[0] + lhs[1] * rhs[2],
        lhs[0] * rhs[1] + lhs[1] * rhs[3],
        lhs[2] * rhs[0] + lhs[3] * rhs[2],
        lhs[2] * rhs[1] + lhs[3] * rhs[3],
        lhs[4] * rhs[0] + lhs[5] * rhs[2] + rhs[4],
        lhs[4] * rhs[1] + lhs[5] * rhs[3] + rhs[5],
    ]
}

fn transform(m: &[f32; 6], x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

/// Bounding box of the image of the rectangle `(x1, y1)-(x2, y2)` under `m`.
fn transform_rect(m: &[f32; 6], x1: f32, y1: f32, x2: f32, y2: f32) -> Option<BoundingBox> {
    BoundingBox::from_points([
        transform(m, x1, y1),
        transform(m, x2, y1),
        transform(m, x1, y2),
        transform(m, x2, y2),
    ])
}

fn matrix_operands(operands: &[PdfValue]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let vals: Vec<f32> = operands
        .iter()
        .take(6)
        .filter_map(get_number_from_value)
        .collect();
    <[f32; 6]>::try_from(vals.as_slice()).ok()
}

fn point_operands(operands: &[PdfValue]) -> Vec<(f32, f32)> {
    let nums: Vec<f32> = operands.iter().filter_map(get_number_from_value).collect();
    nums.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Mutable state tracked while walking a content stream's text objects.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key, not the full name).
    font_key: Vec<u8>,
    /// Resolved base-font name for the current font.
    font_name: String,
    /// Current font size in text-space units.
    font_size: f32,
    metrics: FontMetrics,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix -- set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).  Default 1.0.
    horiz_scale: f32,
    /// Character spacing (Tc).
    char_spacing: f32,
    /// Word spacing (Tw).
    word_spacing: f32,
    /// Text rise (Ts).
    text_rise: f32,
    /// Leading (TL).
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            metrics: FontMetrics::default(),
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn set_font(&mut self, key: Vec<u8>, base_font: &str, size: f32, metrics: FontMetrics) {
        self.font_key = key;
        self.font_size = size;
        self.font_name = base_font.to_string();
        self.metrics = metrics;
    }

    /// Horizontal advance of one glyph in unscaled text space, from its
    /// width in thousandths of an em when known.
    fn glyph_advance(&self, width: Option<f32>) -> f32 {
        match width {
            Some(w) => w / 1000.0 * self.font_size,
            None => self.font_size * APPROX_CHAR_WIDTH_RATIO,
        }
    }
}

/// Resolve a font resource name to its [`BackendFontInfo`].
fn resolve_font<'a>(key: &[u8], fonts: &'a [BackendFontInfo]) -> Option<&'a BackendFontInfo> {
    fonts.iter().find(|info| info.name == key)
}

fn handle_tf(operands: &[PdfValue], fonts: &[BackendFontInfo], state: &mut TextState) {
    if operands.len() < 2 {
        return;
    }
    let key = match &operands[0] {
        PdfValue::Name(n) => n.clone(),
        PdfValue::Str(s) => s.clone(),
        _ => return,
    };
    let size = get_number_from_value(&operands[1]).unwrap_or(0.0);
    if let Some(info) = resolve_font(&key, fonts) {
        let base = info.base_font.as_deref().unwrap_or("");
        state.set_font(key, base, size, FontMetrics::for_font(info));
    } else {
        // Font not in resource dict -- keep the key anyway.
        let name = String::from_utf8_lossy(&key).to_string();
        state.set_font(key, &name, size, FontMetrics::default());
    }
}

fn handle_tm(operands: &[PdfValue], state: &mut TextState) {
    if let Some(m) = matrix_operands(operands) {
        state.text_matrix = m;
        state.line_matrix = m;
    }
}

// ---------------------------------------------------------------------------
// Internal: path construction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Subpath {
    /// Points in user space, including Bézier control points.
    points: Vec<(f32, f32)>,
    has_curve: bool,
    closed: bool,
    /// Built by `re`.
    is_rect: bool,
}

impl Subpath {
    fn classify(&self) -> Option<PageElement> {
        if self.points.len() < 2 {
            return None;
        }
        let bbox = BoundingBox::from_points(self.points.iter().copied())?;
        if self.is_rect || self.is_axis_aligned_quad() {
            return Some(PageElement::Rectangle(bbox));
        }
        if !self.has_curve && self.points.len() == 2 {
            return Some(PageElement::Line(bbox));
        }
        Some(PageElement::Curve(bbox))
    }

    /// A closed `m l l l` (optionally repeating the first point) whose edges
    /// alternate between horizontal and vertical.
    fn is_axis_aligned_quad(&self) -> bool {
        if self.has_curve {
            return false;
        }
        let mut pts = self.points.clone();
        if pts.len() == 5 && pts.first() == pts.last() {
            pts.pop();
        } else if !self.closed {
            return false;
        }
        if pts.len() != 4 {
            return false;
        }
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0)];
        let horizontal = |(a, b): (usize, usize)| pts[a].1 == pts[b].1;
        let vertical = |(a, b): (usize, usize)| pts[a].0 == pts[b].0;
        (horizontal(edges[0]) && vertical(edges[1]) && horizontal(edges[2]) && vertical(edges[3]))
            || (vertical(edges[0])
                && horizontal(edges[1])
                && vertical(edges[2])
                && horizontal(edges[3]))
    }
}

#[derive(Debug, Default)]
struct PathBuilder {
    done: Vec<Subpath>,
    current: Option<Subpath>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f32, f32)) {
        self.end_subpath();
        self.current = Some(Subpath {
            points: vec![p],
            ..Subpath::default()
        });
    }

    fn extend(&mut self, pts: &[(f32, f32)], curve: bool) {
        let sub = self.current.get_or_insert_with(Subpath::default);
        sub.points.extend_from_slice(pts);
        sub.has_curve |= curve;
    }

    fn close(&mut self) {
        if let Some(sub) = self.current.as_mut() {
            sub.closed = true;
        }
    }

    fn rect(&mut self, corners: [(f32, f32); 4]) {
        self.end_subpath();
        self.done.push(Subpath {
            points: corners.to_vec(),
            has_curve: false,
            closed: true,
            is_rect: true,
        });
    }

    fn end_subpath(&mut self) {
        if let Some(sub) = self.current.take() {
            self.done.push(sub);
        }
    }

    /// Consume the path, classifying each subpath.
    fn paint(&mut self) -> Vec<PageElement> {
        self.end_subpath();
        std::mem::take(&mut self.done)
            .iter()
            .filter_map(Subpath::classify)
            .collect()
    }

    fn discard(&mut self) {
        self.current = None;
        self.done.clear();
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Walks the content streams of one page.
struct Interpreter<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    fonts: Vec<BackendFontInfo>,
}

impl Interpreter<'_> {
    /// Interpret `ops` under the initial transformation `ctm`.  `owner` is
    /// the page or form whose resources resolve `Do` names.
    fn run(
        &self,
        ops: &[ContentOp],
        ctm: [f32; 6],
        owner: PageId,
        depth: usize,
    ) -> Vec<PageElement> {
        let mut out: Vec<PageElement> = Vec::new();
        let mut ctm = ctm;
        let mut saved: Vec<[f32; 6]> = Vec::new();
        let mut state = TextState::default();
        let mut text_object: Option<Vec<PageElement>> = None;
        let mut path = PathBuilder::default();

        for op in ops {
            match op.operator.as_str() {
                // -- Graphics state -----------------------------------------
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(prev) = saved.pop() {
                        ctm = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(&op.operands) {
                        ctm = multiply(&m, &ctm);
                    }
                }

                // -- Text object delimiters --------------------------------
                "BT" => {
                    state.text_matrix = IDENTITY_MATRIX;
                    state.line_matrix = IDENTITY_MATRIX;
                    if let Some(children) = text_object.replace(Vec::new()) {
                        push_container(&mut out, children);
                    }
                }
                "ET" => {
                    if let Some(children) = text_object.take() {
                        push_container(&mut out, children);
                    }
                }

                // -- Font and position -------------------------------------
                "Tf" => handle_tf(&op.operands, &self.fonts, &mut state),
                "Tm" => handle_tm(&op.operands, &mut state),
                "Td" => {
                    if let [tx, ty, ..] = op.operands.as_slice() {
                        let tx = get_number_from_value(tx).unwrap_or(0.0);
                        let ty = get_number_from_value(ty).unwrap_or(0.0);
                        state.translate_line(tx, ty);
                    }
                }
                "TD" => {
                    // TD is equivalent to: -ty TL ; tx ty Td
                    if let [tx, ty, ..] = op.operands.as_slice() {
                        let tx = get_number_from_value(tx).unwrap_or(0.0);
                        let ty = get_number_from_value(ty).unwrap_or(0.0);
                        state.leading = -ty;
                        state.translate_line(tx, ty);
                    }
                }
                "T*" => state.translate_line(0.0, -state.leading),
                "TL" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.leading = v;
                    }
                }

                // -- Spacing / scaling --------------------------------------
                "Tc" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.horiz_scale = v / 100.0;
                    }
                }
                "Ts" => {
                    if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                        state.text_rise = v;
                    }
                }

                // -- Show text ----------------------------------------------
                "Tj" => {
                    if let Some(first) = op.operands.first() {
                        let sink = text_object.as_mut().unwrap_or(&mut out);
                        self.show_string(first, &mut state, &ctm, sink);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(arr)) = op.operands.first() {
                        let sink = text_object.as_mut().unwrap_or(&mut out);
                        self.show_array(arr, &mut state, &ctm, sink);
                    }
                }
                "'" => {
                    state.translate_line(0.0, -state.leading);
                    if let Some(first) = op.operands.first() {
                        let sink = text_object.as_mut().unwrap_or(&mut out);
                        self.show_string(first, &mut state, &ctm, sink);
                    }
                }
                "\"" => {
                    // " aw ac string  =>  set Tw, Tc, T*, Tj
                    if let [aw, ac, string, ..] = op.operands.as_slice() {
                        if let Some(aw) = get_number_from_value(aw) {
                            state.word_spacing = aw;
                        }
                        if let Some(ac) = get_number_from_value(ac) {
                            state.char_spacing = ac;
                        }
                        state.translate_line(0.0, -state.leading);
                        let sink = text_object.as_mut().unwrap_or(&mut out);
                        self.show_string(string, &mut state, &ctm, sink);
                    }
                }

                // -- Path construction --------------------------------------
                "m" => {
                    if let Some(&(x, y)) = point_operands(&op.operands).first() {
                        path.move_to(transform(&ctm, x, y));
                    }
                }
                "l" | "c" | "v" | "y" => {
                    let pts: Vec<(f32, f32)> = point_operands(&op.operands)
                        .into_iter()
                        .map(|(x, y)| transform(&ctm, x, y))
                        .collect();
                    path.extend(&pts, op.operator != "l");
                }
                "h" => path.close(),
                "re" => {
                    let nums: Vec<f32> = op
                        .operands
                        .iter()
                        .filter_map(get_number_from_value)
                        .collect();
                    if let [x, y, w, h, ..] = nums.as_slice() {
                        path.rect([
                            transform(&ctm, *x, *y),
                            transform(&ctm, x + w, *y),
                            transform(&ctm, x + w, y + h),
                            transform(&ctm, *x, y + h),
                        ]);
                    }
                }

                // -- Path painting ------------------------------------------
                "S" | "f" | "F" | "f*" | "B" | "B*" => out.extend(path.paint()),
                "s" | "b" | "b*" => {
                    path.close();
                    out.extend(path.paint());
                }
                "n" => path.discard(),

                // -- External objects ---------------------------------------
                "Do" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        if let Some(element) = self.invoke(name, &ctm, owner, depth) {
                            out.push(element);
                        }
                    }
                }
                "BI" => out.push(PageElement::Unsupported {
                    kind: "inline-image".to_string(),
                }),
                "sh" => out.push(PageElement::Unsupported {
                    kind: "shading".to_string(),
                }),

                _ => {}
            }
        }

        // Unterminated text object.
        if let Some(children) = text_object.take() {
            push_container(&mut out, children);
        }

        out
    }

    /// Resolve and place the XObject `name`.  Missing XObjects are skipped.
    fn invoke(
        &self,
        name: &[u8],
        ctm: &[f32; 6],
        owner: PageId,
        depth: usize,
    ) -> Option<PageElement> {
        let display = String::from_utf8_lossy(name).into_owned();
        let mut found = self.backend.xobject(owner, name);
        if matches!(found, Ok(None)) && owner != self.page_id {
            // Forms without their own resources use the page's.
            found = self.backend.xobject(self.page_id, name);
        }
        let xobject = match found {
            Ok(Some(x)) => x,
            Ok(None) => {
                log::warn!("XObject /{} not found in resources", display);
                return None;
            }
            Err(e) => {
                log::warn!("cannot resolve XObject /{}: {}", display, e);
                return None;
            }
        };

        match xobject {
            XObject::Image { width, height } => {
                let bbox = transform_rect(ctm, 0.0, 0.0, 1.0, 1.0)?;
                Some(PageElement::Image(ImageElement {
                    bbox,
                    name: display,
                    pixel_width: width,
                    pixel_height: height,
                }))
            }
            XObject::Form {
                id,
                matrix,
                bbox,
                content,
            } => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("form /{} nested deeper than {}", display, MAX_FORM_DEPTH);
                    return Some(PageElement::Unsupported {
                        kind: "nested-form".to_string(),
                    });
                }
                let form_ctm = multiply(&matrix, ctm);
                let children = match self.backend.decode_content(&content) {
                    Ok(ops) => self.run(&ops, form_ctm, id, depth + 1),
                    Err(e) => {
                        log::warn!("cannot decode form /{}: {}", display, e);
                        Vec::new()
                    }
                };
                let bbox = bbox
                    .and_then(|[x1, y1, x2, y2]| transform_rect(&form_ctm, x1, y1, x2, y2))
                    .or_else(|| union_of(&children))
                    .unwrap_or_else(|| {
                        let (x, y) = transform(&form_ctm, 0.0, 0.0);
                        BoundingBox::new(x, y, x, y)
                    });
                Some(PageElement::Figure {
                    bbox,
                    name: display,
                    children,
                })
            }
            XObject::Other { subtype } => Some(PageElement::Unsupported {
                kind: format!("xobject:{}", subtype),
            }),
        }
    }

    fn decode(&self, val: &PdfValue, state: &TextState) -> String {
        match val {
            PdfValue::Str(bytes) => {
                let decoded = self.backend.decode_text(self.page_id, &state.font_key, bytes);
                if decoded.is_empty() {
                    super::backend::decode_text_simple(bytes)
                } else {
                    decoded
                }
            }
            _ => String::new(),
        }
    }

    /// Decode an operand and emit one glyph per character, advancing the
    /// text position.  Shared by `Tj`, `'`, and `"`.
    fn show_string(
        &self,
        operand: &PdfValue,
        state: &mut TextState,
        ctm: &[f32; 6],
        sink: &mut Vec<PageElement>,
    ) {
        let text = self.decode(operand, state);
        // Single-byte strings keep their codes for `/Widths` lookups.
        let codes = match operand {
            PdfValue::Str(bytes) if bytes.len() == text.chars().count() => Some(bytes.as_slice()),
            _ => None,
        };
        for (i, ch) in text.chars().enumerate() {
            let code = codes.and_then(|c| c.get(i)).map(|b| u32::from(*b));
            let advance = state.glyph_advance(state.metrics.width(code, ch));
            sink.push(PageElement::Character(emit_glyph(ch, advance, state, ctm)));
            let mut tx = advance + state.char_spacing;
            if ch == ' ' {
                tx += state.word_spacing;
            }
            state.advance_x(tx * state.horiz_scale);
        }
    }

    /// Process a `TJ` array: elements are either strings to render or numeric
    /// adjustments in thousandths of a unit of text space.
    fn show_array(
        &self,
        arr: &[PdfValue],
        state: &mut TextState,
        ctm: &[f32; 6],
        sink: &mut Vec<PageElement>,
    ) {
        for elem in arr {
            match elem {
                PdfValue::Str(_) => self.show_string(elem, state, ctm, sink),
                val => {
                    // Negative value = move right, positive = move left.
                    if let Some(adj) = get_number_from_value(val) {
                        let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                        state.advance_x(dx);
                    }
                }
            }
        }
    }
}

/// Build the glyph for `ch`, `advance` wide, at the current text position.
fn emit_glyph(ch: char, advance: f32, state: &TextState, ctm: &[f32; 6]) -> Glyph {
    let trm = multiply(&state.text_matrix, ctm);
    let width = advance * state.horiz_scale;
    let bottom = state.text_rise - DESCENT_RATIO * state.font_size;
    let top = bottom + state.font_size;
    let bbox = transform_rect(&trm, 0.0, bottom, width, top)
        .unwrap_or_else(|| BoundingBox::new(trm[4], trm[5], trm[4], trm[5]));
    let scale = (trm[2].powi(2) + trm[3].powi(2)).sqrt();

    Glyph {
        bbox,
        font_size: (state.font_size * scale).abs(),
        text: ch.to_string(),
        font_name: state.font_name.clone(),
    }
}

fn union_of(elements: &[PageElement]) -> Option<BoundingBox> {
    elements
        .iter()
        .filter_map(PageElement::bbox)
        .reduce(|acc, b| acc.union(&b))
}

fn push_container(out: &mut Vec<PageElement>, children: Vec<PageElement>) {
    out.push(PageElement::TextContainer {
        bbox: union_of(&children),
        children,
    });
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interpret one page into a [`LayoutPage`].
///
/// `index` is the 0-based position of the page in its document.  A missing
/// MediaBox falls back to A4; an undecodable content stream is an error.
pub fn interpret_page(
    backend: &dyn PdfBackend,
    page_id: PageId,
    index: usize,
) -> Result<LayoutPage, PdfError> {
    let (width, height) = backend.page_dimensions(page_id).unwrap_or_else(|e| {
        log::warn!("page {}: {}; assuming A4", index, e);
        (595.0, 842.0)
    });
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_default();

    let interpreter = Interpreter {
        backend,
        page_id,
        fonts,
    };
    let mut elements = interpreter.run(&ops, IDENTITY_MATRIX, page_id, 0);

    match backend.page_annotations(page_id) {
        Ok(annots) => {
            elements.extend(annots.into_iter().map(|a| PageElement::Annotation {
                bbox: BoundingBox::new(a.rect[0], a.rect[1], a.rect[2], a.rect[3]),
                subtype: a.subtype,
            }))
        }
        Err(e) => log::warn!("page {}: cannot read annotations: {}", index, e),
    }

    log::debug!(
        "page {}: {} top-level elements from {} operators",
        index,
        elements.len(),
        ops.len()
    );

    Ok(LayoutPage {
        index,
        width,
        height,
        elements,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
