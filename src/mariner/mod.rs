//! @acp:module "Mariner Parameters"
//! @acp:summary "Global display settings with generation-based invalidation"
//! @acp:domain symbology
//! @acp:layer state
//!
//! Conditional procedures read a [`MarinerSnapshot`]. The [`MarinerStore`]
//! keeps two counters: writes to parameters feeding conditional symbology
//! bump the symbology generation, writes to label parameters bump the text
//! generation. Resolved objects compare the generation they were built
//! against; nothing polls individual parameter values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::rules::DisplayCategory;

/// Which cached artifacts a parameter write invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Symbology,
    Text,
}

/// @acp:summary "Named mariner parameter keys"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarinerParam {
    SafetyContour,
    SafetyDepth,
    ShallowContour,
    DeepContour,
    TwoShades,
    ShallowPattern,
    SymbolizedBoundaries,
    PaperChartSymbols,
    DatumOffset,
    FullSectorLines,
    LightDescriptions,
    ShowText,
    ImportantTextOnly,
    NationalNames,
}

impl MarinerParam {
    pub fn all() -> &'static [MarinerParam] {
        &[
            MarinerParam::SafetyContour,
            MarinerParam::SafetyDepth,
            MarinerParam::ShallowContour,
            MarinerParam::DeepContour,
            MarinerParam::TwoShades,
            MarinerParam::ShallowPattern,
            MarinerParam::SymbolizedBoundaries,
            MarinerParam::PaperChartSymbols,
            MarinerParam::DatumOffset,
            MarinerParam::FullSectorLines,
            MarinerParam::LightDescriptions,
            MarinerParam::ShowText,
            MarinerParam::ImportantTextOnly,
            MarinerParam::NationalNames,
        ]
    }

    pub fn invalidates(&self) -> Invalidation {
        match self {
            MarinerParam::ShowText | MarinerParam::ImportantTextOnly | MarinerParam::NationalNames => {
                Invalidation::Text
            }
            _ => Invalidation::Symbology,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MarinerParam::SafetyContour => "safety-contour",
            MarinerParam::SafetyDepth => "safety-depth",
            MarinerParam::ShallowContour => "shallow-contour",
            MarinerParam::DeepContour => "deep-contour",
            MarinerParam::TwoShades => "two-shades",
            MarinerParam::ShallowPattern => "shallow-pattern",
            MarinerParam::SymbolizedBoundaries => "symbolized-boundaries",
            MarinerParam::PaperChartSymbols => "paper-chart-symbols",
            MarinerParam::DatumOffset => "datum-offset",
            MarinerParam::FullSectorLines => "full-sector-lines",
            MarinerParam::LightDescriptions => "light-descriptions",
            MarinerParam::ShowText => "show-text",
            MarinerParam::ImportantTextOnly => "important-text-only",
            MarinerParam::NationalNames => "national-names",
        }
    }

    pub fn from_name(name: &str) -> Option<MarinerParam> {
        MarinerParam::all().iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for MarinerParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// @acp:summary "Immutable copy of every mariner parameter"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarinerSnapshot {
    /// Metres
    pub safety_contour: f64,
    /// Metres; soundings at or above are drawn in the shallow glyph set
    pub safety_depth: f64,
    pub shallow_contour: f64,
    pub deep_contour: f64,
    pub two_shades: bool,
    pub shallow_pattern: bool,
    pub symbolized_boundaries: bool,
    pub paper_chart_symbols: bool,
    /// Added to charted depths before comparison with contours
    pub datum_offset: f64,
    pub full_sector_lines: bool,
    pub light_descriptions: bool,
    pub show_text: bool,
    pub important_text_only: bool,
    pub national_names: bool,
}

impl Default for MarinerSnapshot {
    fn default() -> Self {
        Self {
            safety_contour: 30.0,
            safety_depth: 30.0,
            shallow_contour: 2.0,
            deep_contour: 30.0,
            two_shades: false,
            shallow_pattern: false,
            symbolized_boundaries: true,
            paper_chart_symbols: false,
            datum_offset: 0.0,
            full_sector_lines: false,
            light_descriptions: true,
            show_text: true,
            important_text_only: false,
            national_names: false,
        }
    }
}

impl MarinerSnapshot {
    /// Numeric view of a parameter; booleans read as 0.0 / 1.0
    pub fn get(&self, param: MarinerParam) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match param {
            MarinerParam::SafetyContour => self.safety_contour,
            MarinerParam::SafetyDepth => self.safety_depth,
            MarinerParam::ShallowContour => self.shallow_contour,
            MarinerParam::DeepContour => self.deep_contour,
            MarinerParam::TwoShades => flag(self.two_shades),
            MarinerParam::ShallowPattern => flag(self.shallow_pattern),
            MarinerParam::SymbolizedBoundaries => flag(self.symbolized_boundaries),
            MarinerParam::PaperChartSymbols => flag(self.paper_chart_symbols),
            MarinerParam::DatumOffset => self.datum_offset,
            MarinerParam::FullSectorLines => flag(self.full_sector_lines),
            MarinerParam::LightDescriptions => flag(self.light_descriptions),
            MarinerParam::ShowText => flag(self.show_text),
            MarinerParam::ImportantTextOnly => flag(self.important_text_only),
            MarinerParam::NationalNames => flag(self.national_names),
        }
    }

    fn put(&mut self, param: MarinerParam, value: f64) {
        let on = value != 0.0;
        match param {
            MarinerParam::SafetyContour => self.safety_contour = value,
            MarinerParam::SafetyDepth => self.safety_depth = value,
            MarinerParam::ShallowContour => self.shallow_contour = value,
            MarinerParam::DeepContour => self.deep_contour = value,
            MarinerParam::TwoShades => self.two_shades = on,
            MarinerParam::ShallowPattern => self.shallow_pattern = on,
            MarinerParam::SymbolizedBoundaries => self.symbolized_boundaries = on,
            MarinerParam::PaperChartSymbols => self.paper_chart_symbols = on,
            MarinerParam::DatumOffset => self.datum_offset = value,
            MarinerParam::FullSectorLines => self.full_sector_lines = on,
            MarinerParam::LightDescriptions => self.light_descriptions = on,
            MarinerParam::ShowText => self.show_text = on,
            MarinerParam::ImportantTextOnly => self.important_text_only = on,
            MarinerParam::NationalNames => self.national_names = on,
        }
    }
}

/// @acp:summary "Shared, read-mostly mariner parameter store"
#[derive(Debug, Clone)]
pub struct MarinerStore {
    params: MarinerSnapshot,
    display_category: DisplayCategory,
    suppressed_classes: BTreeSet<String>,
    symbology_generation: u64,
    text_generation: u64,
}

impl Default for MarinerStore {
    fn default() -> Self {
        Self::new(MarinerSnapshot::default())
    }
}

impl MarinerStore {
    pub fn new(params: MarinerSnapshot) -> Self {
        Self {
            params,
            display_category: DisplayCategory::Standard,
            suppressed_classes: BTreeSet::new(),
            symbology_generation: 1,
            text_generation: 1,
        }
    }

    pub fn get(&self, param: MarinerParam) -> f64 {
        self.params.get(param)
    }

    pub fn snapshot(&self) -> MarinerSnapshot {
        self.params
    }

    /// Write a parameter; returns whether its value changed
    pub fn set(&mut self, param: MarinerParam, value: f64) -> bool {
        if self.params.get(param) == value {
            return false;
        }
        self.params.put(param, value);
        match param.invalidates() {
            Invalidation::Symbology => self.symbology_generation += 1,
            Invalidation::Text => self.text_generation += 1,
        }
        tracing::debug!("Mariner parameter {} set to {}", param, value);
        true
    }

    pub fn set_flag(&mut self, param: MarinerParam, on: bool) -> bool {
        self.set(param, if on { 1.0 } else { 0.0 })
    }

    /// Replace every parameter at once, bumping each affected generation
    pub fn replace(&mut self, params: MarinerSnapshot) {
        for &param in MarinerParam::all() {
            self.set(param, params.get(param));
        }
    }

    pub fn symbology_generation(&self) -> u64 {
        self.symbology_generation
    }

    pub fn text_generation(&self) -> u64 {
        self.text_generation
    }

    /// Most cluttered category still displayed
    pub fn display_category(&self) -> DisplayCategory {
        self.display_category
    }

    pub fn set_display_category(&mut self, category: DisplayCategory) {
        self.display_category = category;
    }

    pub fn suppress_class(&mut self, class: &str) {
        self.suppressed_classes.insert(class.to_string());
    }

    pub fn unsuppress_class(&mut self, class: &str) {
        self.suppressed_classes.remove(class);
    }

    pub fn is_class_suppressed(&self, class: &str) -> bool {
        self.suppressed_classes.contains(class)
    }

    /// Mariner-category features follow their own toggles, never this filter
    pub fn is_category_visible(&self, category: DisplayCategory) -> bool {
        category == DisplayCategory::Mariner || category <= self.display_category
    }
}
