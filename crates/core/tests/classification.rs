//! End-to-end classification over generated PDFs.

use std::cell::RefCell;

use coverscan_core::batch::{extract_front_matter, run_batch, BatchOptions, FileStatus, RowStatus, ERROR_COLUMN};
use coverscan_core::{
    check_front_cover, find_back_cover, find_for_diva, page_or_sentinel, select_front_matter, AnalysisContext,
    Config, CoverVersion, Evidence, FrontMatterOptions, PageSource, Sheet, StopReason,
};
use coverscan_pdf::fixtures::{build, text_pages, FixtureImage, FixturePage};
use coverscan_pdf::{LayoutDocument, LayoutPage, PdfError};

/// Glyph boxes start this far below the baseline.
const DESCENT: f32 = 0.21;

/// Records which pages a classifier asked for.
struct Counting<'a> {
    inner: &'a LayoutDocument,
    requested: RefCell<Vec<usize>>,
}

impl<'a> Counting<'a> {
    fn new(inner: &'a LayoutDocument) -> Self {
        Counting {
            inner,
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl PageSource for Counting<'_> {
    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn page(&self, index: usize) -> Result<LayoutPage, PdfError> {
        self.requested.borrow_mut().push(index);
        self.inner.page(index)
    }
}

fn document(pages: &[FixturePage]) -> LayoutDocument {
    LayoutDocument::from_bytes(&build(pages)).unwrap()
}

/// Text whose line box starts at `(x, bottom)`.
fn text_at(page: FixturePage, x: f32, bottom: f32, size: f32, text: &str) -> FixturePage {
    page.with_text(x, bottom + DESCENT * size, size, text)
}

fn back_cover() -> FixturePage {
    let page = FixturePage::default().with_line(19.427, 33.375, 527.527, 33.375);
    let page = text_at(page, 38.685, 61.240, 10.0, "TRITA-EECS-EX-2023:100");
    text_at(page, 38.685, 36.457, 10.0, "www.kth.se")
}

// ==================== Front cover ====================

#[test]
fn test_new_front_cover() {
    let cover = FixturePage::default()
        .with_image(FixtureImage {
            name: "Im1",
            pixel_width: 181,
            pixel_height: 182,
            x: 20.0,
            y: 735.0,
            width: 181.0,
            height: 182.0,
        })
        .with_line(37.4, 31.94, 556.1, 31.94);
    let doc = document(&[cover, FixturePage::default()]);
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "new.pdf");

    assert_eq!(check_front_cover(&doc, &mut ctx).unwrap(), CoverVersion::New);
    let result = ctx.into_classification();
    assert!(result.evidence.contains(&Evidence::PossibleKthLogo));
    assert!(result.evidence.contains(&Evidence::NewCoverBottomRule));
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn test_old_front_cover() {
    let cover = FixturePage::default()
        .with_image(FixtureImage {
            name: "Im1",
            pixel_width: 0,
            pixel_height: 0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        })
        .with_curve(-1.0, 0.0, 600.0, 105.0);
    let doc = document(&[cover]);
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "old.pdf");

    assert_eq!(check_front_cover(&doc, &mut ctx).unwrap(), CoverVersion::Old);
    let result = ctx.into_classification();
    assert!(result.evidence.contains(&Evidence::OldCoverBottomImage));
    assert!(!result.evidence.contains(&Evidence::PossibleKthLogo));
}

#[test]
fn test_drifted_cover_rule_is_reported() {
    let cover = FixturePage::default().with_line(42.4, 31.94, 561.1, 31.94);
    let doc = document(&[cover]);
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "drift.pdf");

    assert_eq!(check_front_cover(&doc, &mut ctx).unwrap(), CoverVersion::New);
    let errors: Vec<String> = ctx
        .classification()
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("cover bottom rule off by 5.00"), "{:?}", errors);
}

// ==================== Back cover ====================

#[test]
fn test_back_cover_scan_stops_at_match() {
    let mut pages = text_pages(&["Cover", "Abstract", "Chapter 1", "References"]);
    pages.push(back_cover());
    pages.push(FixturePage::default().with_text(72.0, 700.0, 12.0, "Blank"));
    let doc = document(&pages);
    let source = Counting::new(&doc);
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "back.pdf");

    let found = find_back_cover(&source, &mut ctx).unwrap();
    assert_eq!(found, Some(4));
    assert_eq!(page_or_sentinel(found), 4);
    assert_eq!(*source.requested.borrow(), vec![5, 4]);

    let result = ctx.into_classification();
    assert_eq!(result.cover_version, CoverVersion::New);
    assert_eq!(result.found_back_cover_page, Some(4));
    assert!(result.evidence.contains(&Evidence::TritaNumber));
    assert!(result.evidence.contains(&Evidence::WwwUrl));
    assert!(result.evidence.contains(&Evidence::NewBackCoverLine));
}

#[test]
fn test_missing_back_cover_is_sentinel() {
    let doc = document(&text_pages(&["Cover", "Abstract", "Body"]));
    let source = Counting::new(&doc);
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "none.pdf");

    let found = find_back_cover(&source, &mut ctx).unwrap();
    assert_eq!(page_or_sentinel(found), -1);
    assert_eq!(*source.requested.borrow(), vec![2, 1, 0]);
    assert_eq!(ctx.classification().cover_version, CoverVersion::None);
}

// ==================== For DIVA ====================

#[test]
fn test_for_diva_page() {
    let doc = document(&text_pages(&["Cover", "Abstract", "Body", "For DIVA", "Back"]));
    let config = Config::default();
    let mut ctx = AnalysisContext::new(&config, "diva.pdf");
    assert_eq!(find_for_diva(&doc, &mut ctx).unwrap(), Some(3));
}

// ==================== Front matter ====================

#[test]
fn test_front_matter_page_cap() {
    let texts: Vec<String> = (0..40).map(|i| format!("Page {}", i)).collect();
    let doc = document(&text_pages(&texts));
    let source = Counting::new(&doc);
    let config = Config::default();
    let ctx = AnalysisContext::new(&config, "long.pdf");

    let selection = select_front_matter(&source, &ctx, &FrontMatterOptions::default()).unwrap();
    assert_eq!(selection.stop, StopReason::Ceiling);
    assert_eq!(selection.pages, (0..25).collect::<Vec<_>>());
    assert!(source.requested.borrow().iter().all(|&i| i < 25));
}

#[test]
fn test_front_matter_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("a-FULLTEXT01.pdf");
    let broken = dir.path().join("b-FULLTEXT01.pdf");
    std::fs::write(
        &good,
        build(&text_pages(&["Cover", "Abstract", "Contents", "References", "Body"])),
    )
    .unwrap();
    std::fs::write(&broken, b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog").unwrap();

    let config = Config::default();
    let mut seen = 0;
    let extraction = extract_front_matter(
        &[good, broken],
        &config,
        &FrontMatterOptions::default(),
        |_| seen += 1,
    )
    .unwrap();

    assert_eq!(seen, 2);
    assert_eq!(extraction.page_count, 3);
    match &extraction.files[0].status {
        FileStatus::Selected { selection } => assert_eq!(selection.pages, vec![0, 2, 3]),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(extraction.files[1].status, FileStatus::Failed { .. }));

    let merged = LayoutDocument::from_bytes(&extraction.pdf.unwrap()).unwrap();
    assert_eq!(merged.page_count(), 3);
}

// ==================== Batch ====================

#[test]
fn test_batch_isolates_broken_documents() {
    let dir = tempfile::tempdir().unwrap();
    let mut pages = text_pages(&["Cover", "Body"]);
    pages.push(back_cover());
    std::fs::write(dir.path().join("1-FULLTEXT01.pdf"), build(&pages)).unwrap();
    std::fs::write(dir.path().join("2-FULLTEXT01.pdf"), b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog").unwrap();
    let pages = vec![FixturePage::default().with_text(72.0, 700.0, 12.0, "Cover"), back_cover()];
    std::fs::write(dir.path().join("3-FULLTEXT01.pdf"), build(&pages)).unwrap();

    let mut sheet = Sheet::from_csv(
        "PID,FullTextLink,Name\n\
         1,https://example.org/smash/get/diva2:1/FULLTEXT01.pdf,One\n\
         2,https://example.org/smash/get/diva2:2/FULLTEXT01.pdf,Two\n\
         3,https://example.org/smash/get/diva2:3/FULLTEXT01.pdf,Three\n"
            .as_bytes(),
    )
    .unwrap();
    let config = Config::default();
    let options = BatchOptions {
        pdf_dir: dir.path().to_path_buf(),
        ..BatchOptions::default()
    };

    let outcomes = run_batch(&mut sheet, &options, |path, id| {
        let doc = LayoutDocument::open(path)?;
        let mut ctx = AnalysisContext::new(&config, id);
        let page = find_back_cover(&doc, &mut ctx)?;
        Ok(vec![("back_cover_page".to_string(), page_or_sentinel(page).to_string())])
    })
    .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].status, RowStatus::Processed);
    assert!(matches!(outcomes[1].status, RowStatus::Failed(_)));
    assert_eq!(outcomes[2].status, RowStatus::Processed);
    assert!(outcomes[1].results.is_empty());

    let page = sheet.column("back_cover_page").unwrap();
    let error = sheet.column(ERROR_COLUMN).unwrap();
    assert_eq!(sheet.get(0, page), Some("2"));
    assert_eq!(sheet.get(0, error), None);
    assert!(sheet.get(1, error).is_some());
    assert_eq!(sheet.get(1, page), None);
    assert_eq!(sheet.get(2, page), Some("1"));
    assert_eq!(sheet.get(2, error), None);
}
