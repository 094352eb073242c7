//! Content rules for the front cover.
//!
//! Each rule looks at a piece of cover text together with its font size
//! and reports a known defect: leftovers from the old template, subject
//! phrasing the degree programmes do not allow, wrong level or credits.
//! Rules run on every reconstructed line and on every run of consecutive
//! lines sharing a font size, because cover fields often wrap.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use coverscan_pdf::geometry::near;
use coverscan_pdf::{BoundingBox, ReconstructedLine};
use regex::Regex;

use crate::evidence::ErrorTag;

pub const FULL_PAGE_PICTURE: &str = "The cover is just a full page picture";
pub const OLD_SCHOOL_NAME: &str = "Found old cover with school name";
pub const STATED_SPECIALIZATION: &str = "Found error in cover with stated specialization";
pub const INCORRECT_MAJOR: &str = "Found error in cover with incorrect major subject";
pub const BOTH_LANGUAGES: &str =
    "Found error in cover with both English and Swedish for the degree project";
pub const INCORRECT_LEVEL: &str = "Found error in cover with incorrect level";
pub const LEVEL_ERROR: &str = "Found error in level";
pub const INCORRECT_CREDITS: &str = "Found error in cover incorrect number of credits";
pub const REPEATED_PLACE: &str = "Found error in cover with repeated Stockholm, Sverige and date";
pub const CYCLE_CASE: &str = "Case error in cycle";

/// Font sizes are compared this closely.
const SIZE_TOLERANCE: f32 = 0.1;

const MAIN_SUBJECTS: [&str; 7] = [
    "DEGREE PROJECT IN COMPUTER SCIENCE AND ENGINEERING",
    "Degree Project in Computer Science and Engineering",
    "Degree project in Computer Science and Engineering",
    "Degree project in Computer Science with",
    "DEGREE PROJECT IN ELECTRICAL ENGINEERING",
    "Degree Project in Electrical Engineering",
    "Degree project in Electrical Engineering",
];

const SPECIALISATIONS: [&str; 5] = [
    "specialising in ",
    "specializing in ",
    "specialisation in ",
    "Specialisation in ",
    "SPECIALISING IN ",
];

/// Subjects that are always stated with a specialisation.
const SPECIALISED_SUBJECTS: [&str; 2] = [
    "Degree project in Systems, Control and Robotics",
    "Degree Project in Information and Network Engineering",
];

const INCORRECT_SUBJECTS: [&str; 10] = [
    "Degree Project in Interactive Media Technology",
    "Degree project in Interactive Media Technology",
    "Degree project in Interaction Design",
    "Degree Project in Media Technology",
    "Degree project in data science",
    "DEGREE PROJECT IN MEDIA TECHNOLOGY",
    "Degree project in machine learning",
    "Degree Project in Machine Learning",
    "Degree Project in School of Electrical Engineering and Computer Science",
    "Degree project in Master's Programme, Systems, Control and Robotics",
];

/// Subjects that only show up with their spaces lost.
const INCORRECT_SUBJECTS_COMPACT: [&str; 2] = [
    "DegreeProjectinInteractiveMediaTechnology",
    "DegreeProjectinComputerScienceandEngineering,specializingin",
];

static REPEATED_PLACE_AND_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Stockholm, (Sverige|Sweden) \d{4}\s*Stockholm, (Sverige|Sweden) \d{4}")
        .expect("valid regex")
});

static CYCLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(first|second|third) cycle\b|\b(grundnivå|avancerad nivå|forskarnivå)")
        .expect("valid regex")
});

const CYCLE_SPELLINGS: [&str; 6] = [
    "First cycle",
    "Second cycle",
    "Third cycle",
    "Grundnivå",
    "Avancerad nivå",
    "Forskarnivå",
];

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn states_specialization(text: &str) -> bool {
    let subject = MAIN_SUBJECTS.iter().any(|s| text.contains(s));
    (subject && SPECIALISATIONS.iter().any(|s| text.contains(s)))
        || SPECIALISED_SUBJECTS.iter().any(|s| text.contains(s))
}

/// Defects visible in one piece of cover text set in `size` points.
pub fn check_text(text: &str, size: f32) -> BTreeSet<ErrorTag> {
    let mut errors = BTreeSet::new();
    let mut add = |tag: &str| {
        errors.insert(ErrorTag::from(tag));
    };
    let squeezed = compact(text);

    if size < 11.0 && text.contains("KTH ROYAL INSTITUTE OF TECHNOLOGY") && text.contains("SCHOOL OF ") {
        add(OLD_SCHOOL_NAME);
    }
    if size < 8.1 && text.contains("ELECTRICAL ENGINEERING AND COMPUTER SCIENCE") {
        add(OLD_SCHOOL_NAME);
    }
    if text.contains("SCHOOL OF ELECTRICAL ENGINEERING AND COMPUTER SCIENCE")
        || squeezed.contains("SCHOOLOFELECTRICALENGINEERINGANDCOMPUTERSCIENCE")
    {
        add(OLD_SCHOOL_NAME);
    }
    if near(size, 8.0, SIZE_TOLERANCE)
        && text.contains("E L E C T R I C A L   E N G I N E E R I N G   A N D   C O M P U T E R   S C I E N C E")
    {
        add(OLD_SCHOOL_NAME);
    }

    if states_specialization(text) {
        add(STATED_SPECIALIZATION);
    }

    if INCORRECT_SUBJECTS.iter().any(|s| text.contains(s))
        || INCORRECT_SUBJECTS_COMPACT.iter().any(|s| squeezed.contains(s))
    {
        add(INCORRECT_MAJOR);
    }

    if text.contains("Examensarbete inom ") && text.contains("Degree project in ") {
        add(BOTH_LANGUAGES);
    }

    if near(size, 12.0, SIZE_TOLERANCE) {
        if text.contains("Master’s dissertation") {
            add(INCORRECT_LEVEL);
        }
        if text.contains("Second cycle 120  credits") {
            add(INCORRECT_CREDITS);
        }
        if text.contains("Master’s Programme, ICT Innovation, 120 credit") {
            add(LEVEL_ERROR);
            add(INCORRECT_CREDITS);
        }
    }

    if REPEATED_PLACE_AND_DATE.is_match(text) {
        add(REPEATED_PLACE);
    }

    let miscased = CYCLE
        .find_iter(text)
        .any(|m| !CYCLE_SPELLINGS.contains(&m.as_str()));
    if miscased {
        add(CYCLE_CASE);
    }

    errors
}

/// Consecutive lines with the same font size, joined with spaces.
pub fn size_runs(lines: &[ReconstructedLine]) -> Vec<(f32, String)> {
    let mut runs: Vec<(f32, String)> = Vec::new();
    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some((size, run)) = runs.last_mut() {
            if near(*size, line.font_size, SIZE_TOLERANCE) {
                run.push(' ');
                run.push_str(text);
                continue;
            }
        }
        runs.push((line.font_size, text.to_string()));
    }
    runs
}

/// Whether an image covers the whole A4 page.
pub fn is_full_page_picture(image: &BoundingBox) -> bool {
    near(image.x1, 0.0, 1.0)
        && near(image.y1, 0.0, 1.0)
        && near(image.x2, 595.0, 1.0)
        && (near(image.y2, 841.0, 1.0) || near(image.y2, 842.0, 1.0))
}

/// Every content rule over a cover page.
pub fn check_cover(lines: &[ReconstructedLine], images: &[BoundingBox]) -> BTreeSet<ErrorTag> {
    let mut errors = BTreeSet::new();
    if images.iter().any(is_full_page_picture) {
        errors.insert(ErrorTag::from(FULL_PAGE_PICTURE));
    }
    for line in lines {
        errors.extend(check_text(&line.text, line.font_size));
    }
    for (size, text) in size_runs(lines) {
        errors.extend(check_text(&text, size));
    }
    errors
}
