//! Core library for coverscan
//!
//! This crate holds the classification engine behind the `coverscan`
//! command line tool: everything that turns interpreted PDF pages into
//! conclusions about a thesis (cover generation, back cover page, "For
//! DIVA" page, front matter pages) and the report tables those
//! conclusions are written into.
//!
//! # Architecture Overview
//!
//! The project uses a three-crate layout:
//!
//! - **`coverscan_pdf`**: PDF interpretation, line reconstruction and page extraction
//! - **`coverscan_core`** (this crate): classification on top of interpreted pages
//! - **`coverscan`**: argument parsing, progress output and file handling (the shell)
//!
//! Classifiers never open files themselves.  They pull pages through the
//! [`PageSource`] trait, which is implemented for a parsed
//! [`LayoutDocument`](coverscan_pdf::LayoutDocument) as well as for a plain
//! slice of pages, so every classifier can be tested with hand-built pages.
//! The report and batch modules are the exception: they read spreadsheets
//! and walk directories on behalf of the shell.
//!
//! # Module Organization
//!
//! - [`templates`]: anchor geometry for front and back covers
//! - [`matcher`]: tolerance-based matching of elements and lines against anchors
//! - [`walker`]: per-page traversal of the element tree
//! - [`classify`]: back cover, For DIVA, front cover and front matter classifiers
//! - [`overrides`]: per-document exceptions for irregular theses
//! - [`config`]: TOML configuration with stock defaults
//! - [`report`] and [`batch`]: spreadsheet reports and batch drivers
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use coverscan_core::{find_back_cover, page_or_sentinel, AnalysisContext, Config};
//! use coverscan_pdf::LayoutDocument;
//!
//! let config = Config::default().with_builtin_overrides()?;
//! let document = LayoutDocument::open("1513609-FULLTEXT01.pdf")?;
//! let mut ctx = AnalysisContext::new(&config, "1513609-FULLTEXT01.pdf");
//!
//! let page = find_back_cover(&document, &mut ctx)?;
//! println!("back cover page: {}", page_or_sentinel(page));
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod overrides;
pub mod report;
pub mod source;
pub mod templates;
pub mod walker;

pub use classify::{
    check_front_cover, find_back_cover, find_for_diva, select_front_matter, FrontMatterOptions,
    FrontMatterSelection, StopReason,
};
pub use config::Config;
pub use context::AnalysisContext;
pub use error::AnalysisError;
pub use evidence::{page_or_sentinel, CoverVersion, DocumentClassification, ErrorTag, Evidence};
pub use report::Sheet;
pub use source::PageSource;
pub use templates::TemplateSet;
