//! Page classifiers.
//!
//! Each classifier pulls pages from a [`PageSource`](crate::PageSource) in
//! the order its search needs (reverse for the back cover, forward for
//! everything else) and records its findings in the
//! [`AnalysisContext`](crate::AnalysisContext).

pub mod back_cover;
pub mod cover_rules;
pub mod for_diva;
pub mod front_cover;
pub mod front_matter;

pub use back_cover::find_back_cover;
pub use for_diva::find_for_diva;
pub use front_cover::check_front_cover;
pub use front_matter::{select_front_matter, FrontMatterOptions, FrontMatterSelection, StopReason};
