//! Soft template matching.
//!
//! An element inside an anchor's tolerance yields the anchor's evidence.
//! An element that is recognisably the anchor's landmark but sits outside
//! the tolerance (a keyword elsewhere on the page, a rule within drift
//! distance) still yields the evidence, together with an [`ErrorTag`]
//! describing the offset.  Both functions are pure: the same input always
//! produces the same outcome.

use coverscan_pdf::geometry::near;
use coverscan_pdf::{BoundingBox, PageElement, ReconstructedLine};

use crate::evidence::{ErrorTag, Evidence, Generation, MatchOutcome};
use crate::templates::{ElementKind, GraphicAnchor, Placement, TemplateSet, TextAnchor, TextPosition};

/// A successful fit of one anchor; `errors` is empty for an exact fit.
#[derive(Debug)]
struct Fit {
    errors: Vec<ErrorTag>,
    generation: Option<Generation>,
}

fn fit_graphic(anchor: &GraphicAnchor, bbox: &BoundingBox) -> Option<Fit> {
    let tol = anchor.tolerance;
    let y_tol = anchor.y_tolerance.unwrap_or(tol);
    let mut errors = Vec::new();

    let positioned = |x: f32, y: f32| -> Option<Vec<ErrorTag>> {
        if near(bbox.x1, x, tol) && near(bbox.y1, y, y_tol) {
            return Some(Vec::new());
        }
        let drift = anchor.drift?;
        if near(bbox.x1, x, drift) && near(bbox.y1, y, drift) {
            return Some(vec![ErrorTag::new(format!(
                "{} off by {:.2},{:.2}",
                anchor.name,
                bbox.x1 - x,
                bbox.y1 - y
            ))]);
        }
        None
    };

    match anchor.placement {
        Placement::At {
            x,
            y,
            width,
            height,
        } => {
            if !(near(bbox.width(), width, tol) && near(bbox.height(), height, tol)) {
                return None;
            }
            errors.extend(positioned(x, y)?);
        }
        Placement::Rule {
            x,
            y,
            length,
            min_length,
        } => {
            let actual = bbox.width();
            if actual.is_nan() || actual < min_length {
                return None;
            }
            errors.extend(positioned(x, y)?);
            if !near(actual, length, tol) {
                errors.push(ErrorTag::new(format!(
                    "cover line length off by {:.2}",
                    actual - length
                )));
            }
        }
        Placement::Spans {
            left,
            right,
            bottom,
            top,
        } => {
            let covers = bbox.x1 <= left + tol
                && bbox.x2 >= right - tol
                && bbox.y1 >= bottom - tol
                && bbox.y2 <= top + tol;
            if !covers {
                return None;
            }
        }
    }

    Some(Fit {
        errors,
        generation: anchor.generation,
    })
}

/// Record the best fit among the anchors sharing one evidence.  An exact
/// fit of one anchor silences the diagnostics of its alternatives.
fn record_best(outcome: &mut MatchOutcome, evidence: Evidence, fits: Vec<Fit>) {
    let Some(best) = fits.into_iter().min_by_key(|fit| fit.errors.len()) else {
        return;
    };
    outcome.evidence.insert(evidence);
    outcome.errors.extend(best.errors);
    if let Some(generation) = best.generation {
        outcome.generations.insert(generation);
    }
}

/// Evidence groups in first-appearance order.
fn evidence_groups<'a, A, F>(anchors: &'a [A], evidence_of: F) -> Vec<(Evidence, Vec<&'a A>)>
where
    F: Fn(&A) -> Evidence,
{
    let mut groups: Vec<(Evidence, Vec<&A>)> = Vec::new();
    for anchor in anchors {
        let evidence = evidence_of(anchor);
        match groups.iter_mut().find(|(e, _)| *e == evidence) {
            Some((_, members)) => members.push(anchor),
            None => groups.push((evidence, vec![anchor])),
        }
    }
    groups
}

/// Match one graphic element (image, figure, line, curve, rectangle).
/// Text and container kinds never match.
pub fn match_element(element: &PageElement, templates: &TemplateSet) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let (Some(kind), Some(bbox)) = (ElementKind::of(element), element.bbox()) else {
        return outcome;
    };
    if !bbox.is_valid() {
        return outcome;
    }

    for (evidence, anchors) in evidence_groups(&templates.graphics, |a| a.evidence) {
        let fits: Vec<Fit> = anchors
            .into_iter()
            .filter(|a| a.kinds.contains(&kind))
            .filter_map(|a| fit_graphic(a, &bbox))
            .collect();
        record_best(&mut outcome, evidence, fits);
    }
    outcome
}

fn in_position(anchor: &TextAnchor, bbox: &BoundingBox) -> bool {
    let tol = anchor.tolerance;
    match anchor.position {
        TextPosition::Origin { x, y } => bbox.origin_near(x, y, tol),
        TextPosition::Band { bottom, top } => bbox.y1 >= bottom - tol && bbox.y2 <= top + tol,
    }
}

fn keyword_of<'a>(anchor: &'a TextAnchor, text: &str) -> Option<&'a str> {
    anchor
        .keywords
        .iter()
        .map(String::as_str)
        .find(|k| text.contains(k))
}

/// Match one reconstructed line against the text anchors.
pub fn match_line(line: &ReconstructedLine, templates: &TemplateSet) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    if line.text.trim().is_empty() || !line.bbox.is_valid() {
        return outcome;
    }

    for (evidence, anchors) in evidence_groups(&templates.text, |a| a.evidence) {
        let sized: Vec<&TextAnchor> = anchors
            .into_iter()
            .filter(|a| a.min_font_size.map_or(true, |min| line.font_size >= min))
            .collect();

        let mut fits = Vec::new();
        let mut stray_keyword = None;
        for anchor in sized {
            let keyword = keyword_of(anchor, &line.text);
            if !anchor.keywords.is_empty() && keyword.is_none() {
                continue;
            }
            if in_position(anchor, &line.bbox) {
                fits.push(Fit {
                    errors: Vec::new(),
                    generation: anchor.generation,
                });
            } else if let Some(k) = keyword {
                stray_keyword.get_or_insert(k);
            }
        }

        if fits.is_empty() {
            if let Some(k) = stray_keyword {
                let b = &line.bbox;
                fits.push(Fit {
                    errors: vec![ErrorTag::new(format!(
                        "'{}' present, but not where expected: {:.3},{:.3} to {:.3},{:.3}",
                        k, b.x1, b.y1, b.x2, b.y2
                    ))],
                    generation: None,
                });
            }
        }
        record_best(&mut outcome, evidence, fits);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscan_pdf::ImageElement;

    fn image(x: f32, y: f32, w: f32, h: f32) -> PageElement {
        PageElement::Image(ImageElement {
            bbox: BoundingBox::new(x, y, x + w, y + h),
            name: "Im1".to_string(),
            pixel_width: 100,
            pixel_height: 100,
        })
    }

    fn line(text: &str, x: f32, y: f32, size: f32) -> ReconstructedLine {
        ReconstructedLine {
            text: text.to_string(),
            bbox: BoundingBox::new(x, y, x + 0.5 * size * text.len() as f32, y + size),
            font_size: size,
        }
    }

    // ==================== Graphic anchors ====================

    #[test]
    fn test_logo_at_expected_position() {
        let outcome = match_element(&image(20.0, 735.0, 181.0, 182.0), &TemplateSet::front_cover());
        assert!(outcome.has(Evidence::PossibleKthLogo));
        assert!(outcome.errors.is_empty());
        assert!(outcome.generations.contains(&Generation::New));
    }

    #[test]
    fn test_logo_with_wrong_size_does_not_match() {
        let outcome = match_element(&image(20.0, 735.0, 150.0, 182.0), &TemplateSet::front_cover());
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_zero_sized_image_matches_nothing() {
        let outcome = match_element(&image(0.0, 0.0, 0.0, 0.0), &TemplateSet::front_cover());
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_back_cover_line_within_wide_tolerance() {
        let rule = PageElement::Line(BoundingBox::new(19.427, 33.375, 527.528, 33.375));
        let outcome = match_element(&rule, &TemplateSet::back_cover());
        assert!(outcome.has(Evidence::NewBackCoverLine));
        assert!(outcome.errors.is_empty());

        let rect = PageElement::Rectangle(BoundingBox::new(37.0, 32.0, 556.0, 33.0));
        assert!(match_element(&rect, &TemplateSet::back_cover()).has(Evidence::NewBackCoverLine));
    }

    #[test]
    fn test_short_rule_does_not_match() {
        let rule = PageElement::Line(BoundingBox::new(19.427, 33.375, 300.0, 33.375));
        assert!(match_element(&rule, &TemplateSet::back_cover()).is_empty());
    }

    #[test]
    fn test_rule_drift_and_length_are_reported() {
        let rule = PageElement::Line(BoundingBox::new(40.4, 36.94, 539.1, 36.94));
        let outcome = match_element(&rule, &TemplateSet::front_cover());
        assert!(outcome.has(Evidence::NewCoverBottomRule));
        let errors: Vec<&str> = outcome.errors.iter().map(ErrorTag::as_str).collect();
        assert_eq!(
            errors,
            vec!["cover bottom rule off by 3.00,5.00", "cover line length off by -20.00"]
        );
    }

    #[test]
    fn test_full_bleed_curve_is_old_generation() {
        let curve = PageElement::Curve(BoundingBox::new(-1.0, 0.0, 600.0, 105.0));
        let outcome = match_element(&curve, &TemplateSet::front_cover());
        assert!(outcome.has(Evidence::OldCoverBottomImage));
        assert_eq!(
            outcome.generations.iter().collect::<Vec<_>>(),
            vec![&Generation::Old]
        );
    }

    #[test]
    fn test_text_elements_are_not_graphics() {
        let container = PageElement::TextContainer {
            bbox: Some(BoundingBox::new(20.0, 735.0, 201.0, 917.0)),
            children: vec![],
        };
        assert!(match_element(&container, &TemplateSet::front_cover()).is_empty());
    }

    // ==================== Text anchors ====================

    #[test]
    fn test_trita_at_new_position() {
        let outcome = match_line(
            &line("TRITA-EECS-EX-2023:1", 38.685, 61.24, 10.0),
            &TemplateSet::back_cover(),
        );
        assert!(outcome.has(Evidence::TritaNumber));
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_trita_elsewhere_is_soft_match() {
        let outcome = match_line(
            &line("TRITA-EECS-EX-2023:1", 300.0, 400.0, 10.0),
            &TemplateSet::back_cover(),
        );
        assert!(outcome.has(Evidence::TritaNumber));
        assert_eq!(outcome.errors.len(), 1);
        let message = outcome.errors.iter().next().unwrap().to_string();
        assert!(message.starts_with("'TRITA' present, but not where expected: 300.000,400.000"));
    }

    #[test]
    fn test_position_without_keyword_is_not_enough() {
        let outcome = match_line(&line("Some title", 38.685, 61.24, 10.0), &TemplateSet::back_cover());
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_band_anchors() {
        let templates = TemplateSet::front_cover();
        let place = match_line(&line("Stockholm, Sverige 2023", 38.52, 37.09, 8.0), &templates);
        assert!(place.has(Evidence::CoverPlaceSwedish));
        assert!(!place.has(Evidence::CoverPlaceEnglish));

        let title = match_line(&line("A Title", 71.03, 519.54, 26.0), &templates);
        assert!(title.has(Evidence::CoverTitle));

        let small = match_line(&line("A Title", 71.03, 519.54, 12.0), &templates);
        assert!(!small.has(Evidence::CoverTitle));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let templates = TemplateSet::back_cover();
        let l = line("www.kth.se", 120.0, 300.0, 8.0);
        assert_eq!(match_line(&l, &templates), match_line(&l, &templates));

        let rule = PageElement::Line(BoundingBox::new(19.427, 33.375, 527.528, 33.375));
        assert_eq!(
            match_element(&rule, &templates),
            match_element(&rule, &templates)
        );
    }
}
