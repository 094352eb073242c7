//! Analysis configuration.
//!
//! Every value has a default, so an empty TOML document (or no file at all)
//! yields the stock behaviour.  The tolerances and marker lists were tuned
//! against a reference set of theses; override them here rather than in
//! code.

use coverscan_pdf::ReconstructionParams;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::overrides::OverrideTable;
use crate::templates::{GraphicAnchor, TemplateSet, TextAnchor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Pages scanned by the front-matter classifier unless a document
    /// override says otherwise.
    pub page_ceiling: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { page_ceiling: 25 }
    }
}

/// Marker phrases, matched case-sensitively as substrings of page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub contents: Vec<String>,
    pub references: Vec<String>,
    /// Reference-list headings that only count from the fourth page on.
    pub bibliography: Vec<String>,
    /// Matched at the start of the page text.
    pub chapter_start: Vec<String>,
    /// Lists of figures and tables; end the front matter once a table of
    /// contents was seen.
    pub list_of: Vec<String>,
    /// Pages never retained (printer's notes, defence announcements).
    pub skip_pages: Vec<String>,
    pub for_diva: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            contents: strings(&[
                "Contents",
                "CONTENTS",
                "Table of contents",
                "Table of Contents",
                "Innehållsförteckning",
                "INNEHÅLLSFÖRTECKNING",
            ]),
            references: strings(&["References", "REFERENCES", "REFERENCE LIST"]),
            bibliography: strings(&[
                "Bibliography",
                "BIBLIOGRAPHY",
                "Tryckta källor",
                "Elektroniska källor",
                "Referenser",
            ]),
            chapter_start: strings(&["Chapter 1", "CHAPTER 1"]),
            list_of: strings(&["LIST OF"]),
            skip_pages: strings(&[
                "Printed by",
                "Universitetsservice US-AB",
                "public defense",
                "public defence",
            ]),
            for_diva: strings(&["€€€€ For DIVA €€€€", "€€€€ FOR DIVA €€€€", "For DIVA"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reconstruction: ReconstructionParams,
    pub limits: Limits,
    pub markers: Markers,
    /// Prepend the compiled-in override table.
    pub builtin_overrides: bool,
    pub overrides: OverrideTable,
    pub front_cover_anchors: Option<Vec<GraphicAnchor>>,
    pub front_cover_text: Option<Vec<TextAnchor>>,
    pub back_cover_anchors: Option<Vec<GraphicAnchor>>,
    pub back_cover_text: Option<Vec<TextAnchor>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reconstruction: ReconstructionParams::default(),
            limits: Limits::default(),
            markers: Markers::default(),
            builtin_overrides: true,
            overrides: OverrideTable::default(),
            front_cover_anchors: None,
            front_cover_text: None,
            back_cover_anchors: None,
            back_cover_text: None,
        }
    }
}

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, AnalysisError> {
        Ok(toml::from_str(input)?)
    }

    /// Put the compiled-in overrides in front of the configured ones, when
    /// `builtin_overrides` is set.
    pub fn with_builtin_overrides(mut self) -> Result<Self, AnalysisError> {
        if self.builtin_overrides {
            let mut table = OverrideTable::builtin()?;
            table.extend(std::mem::take(&mut self.overrides));
            self.overrides = table;
        }
        Ok(self)
    }

    pub fn front_cover_templates(&self) -> TemplateSet {
        let mut set = TemplateSet::front_cover();
        if let Some(graphics) = &self.front_cover_anchors {
            set.graphics = graphics.clone();
        }
        if let Some(text) = &self.front_cover_text {
            set.text = text.clone();
        }
        set
    }

    pub fn back_cover_templates(&self) -> TemplateSet {
        let mut set = TemplateSet::back_cover();
        if let Some(graphics) = &self.back_cover_anchors {
            set.graphics = graphics.clone();
        }
        if let Some(text) = &self.back_cover_text {
            set.text = text.clone();
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Evidence;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.limits.page_ceiling, 25);
        assert!((config.reconstruction.space_ratio - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [reconstruction]
            space_ratio = 0.3

            [markers]
            references = ["Literature"]
            "#,
        )
        .unwrap();
        assert!((config.reconstruction.space_ratio - 0.3).abs() < f32::EPSILON);
        assert!((config.reconstruction.y_tolerance - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.markers.references, vec!["Literature".to_string()]);
        assert_eq!(config.markers.contents, Markers::default().contents);
    }

    #[test]
    fn test_template_replacement() {
        let config = Config::from_toml(
            r#"
            [[back_cover_text]]
            name = "series"
            tolerance = 3.0
            keywords = ["ISRN"]
            evidence = "trita_number"
            position = { type = "origin", x = 40.0, y = 60.0 }
            "#,
        )
        .unwrap();
        let back = config.back_cover_templates();
        assert_eq!(back.text.len(), 1);
        assert_eq!(back.text[0].evidence, Evidence::TritaNumber);
        assert_eq!(back.graphics, TemplateSet::back_cover().graphics);
        assert_eq!(config.front_cover_templates(), TemplateSet::front_cover());
    }

    #[test]
    fn test_builtin_overrides_come_first() {
        let config = Config::from_toml(
            r#"
            [[overrides]]
            document = "999"
            ignore = true
            "#,
        )
        .unwrap()
        .with_builtin_overrides()
        .unwrap();
        let entries = config.overrides.entries();
        assert!(entries.len() > 1);
        assert_eq!(entries.last().map(|e| e.document.as_str()), Some("999"));

        let bare = Config {
            builtin_overrides: false,
            ..Config::default()
        }
        .with_builtin_overrides()
        .unwrap();
        assert!(bare.overrides.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        assert!(matches!(
            Config::from_toml("limits = 3"),
            Err(AnalysisError::Config(_))
        ));
    }
}
