//! @acp:module "Rule Types"
//! @acp:summary "Look-up rules, attribute constraints, priorities and definitions"
//! @acp:domain symbology
//! @acp:layer types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::GeometryKind;

/// The five S-52 look-up tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LupTable {
    SimplifiedPoints,
    PaperChartPoints,
    Lines,
    PlainBoundaries,
    SymbolizedBoundaries,
}

impl LupTable {
    pub fn all() -> &'static [LupTable] {
        &[
            LupTable::SimplifiedPoints,
            LupTable::PaperChartPoints,
            LupTable::Lines,
            LupTable::PlainBoundaries,
            LupTable::SymbolizedBoundaries,
        ]
    }

    /// Table consulted for a geometry kind in a given variant slot
    pub fn for_geometry(geometry: GeometryKind, variant: Variant) -> LupTable {
        match (geometry, variant) {
            (GeometryKind::Point, Variant::Primary) => LupTable::SimplifiedPoints,
            (GeometryKind::Point, Variant::Alternate) => LupTable::PaperChartPoints,
            (GeometryKind::Line, _) => LupTable::Lines,
            (GeometryKind::Area, Variant::Primary) => LupTable::SymbolizedBoundaries,
            (GeometryKind::Area, Variant::Alternate) => LupTable::PlainBoundaries,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LupTable::SimplifiedPoints => "simplified-points",
            LupTable::PaperChartPoints => "paper-chart-points",
            LupTable::Lines => "lines",
            LupTable::PlainBoundaries => "plain-boundaries",
            LupTable::SymbolizedBoundaries => "symbolized-boundaries",
        }
    }
}

impl fmt::Display for LupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-object rule slot.
///
/// `Primary` is simplified points / symbolized boundaries; `Alternate` is
/// paper-chart points / plain boundaries. Lines use one table for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Primary,
    Alternate,
}

impl Variant {
    pub fn index(&self) -> usize {
        match self {
            Variant::Primary => 0,
            Variant::Alternate => 1,
        }
    }

    pub fn all() -> &'static [Variant] {
        &[Variant::Primary, Variant::Alternate]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarPriority {
    /// Drawn over the radar image
    Over,
    /// Suppressed by the radar image
    Suppressed,
}

impl RadarPriority {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'O' => Some(RadarPriority::Over),
            'S' => Some(RadarPriority::Suppressed),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            RadarPriority::Over => 'O',
            RadarPriority::Suppressed => 'S',
        }
    }
}

/// Display category; ordering follows increasing clutter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayCategory {
    Base,
    Standard,
    Other,
    Mariner,
}

impl DisplayCategory {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'D' => Some(DisplayCategory::Base),
            'S' => Some(DisplayCategory::Standard),
            'O' => Some(DisplayCategory::Other),
            'M' => Some(DisplayCategory::Mariner),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            DisplayCategory::Base => 'D',
            DisplayCategory::Standard => 'S',
            DisplayCategory::Other => 'O',
            DisplayCategory::Mariner => 'M',
        }
    }
}

/// @acp:summary "Draw priority, radar priority, display category and view group"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Priority {
    /// 0 (drawn first) to 9 (drawn last)
    pub draw: u8,
    pub radar: RadarPriority,
    pub category: DisplayCategory,
    pub view_group: u32,
    /// Shown regardless of the feature's SCAMIN
    #[serde(default)]
    pub ignore_scamin: bool,
}

impl Priority {
    pub fn new(draw: u8, radar: RadarPriority, category: DisplayCategory, view_group: u32) -> Self {
        Self {
            draw: draw.min(9),
            radar,
            category,
            view_group,
            ignore_scamin: false,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::new(5, RadarPriority::Suppressed, DisplayCategory::Standard, 0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{:05}",
            self.draw,
            self.radar.code(),
            self.category.code(),
            self.view_group
        )
    }
}

/// What an attribute constraint requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "test", content = "value")]
pub enum AttrTest {
    /// Any value other than the unknown sentinel
    AnyValue,
    /// Attribute absent or unknown
    Unknown,
    Equals(String),
}

/// @acp:summary "One attribute condition of a look-up rule"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrConstraint {
    pub name: String,
    pub test: AttrTest,
}

/// S-57 attribute acronyms are six characters
const ACRONYM_LEN: usize = 6;

impl AttrConstraint {
    pub fn equals(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            test: AttrTest::Equals(value.to_string()),
        }
    }

    pub fn any_value(name: &str) -> Self {
        Self {
            name: name.to_string(),
            test: AttrTest::AnyValue,
        }
    }

    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            test: AttrTest::Unknown,
        }
    }

    /// Parse the presentation-library encoding, e.g. `CATLIT6`, `COLOUR3,4`,
    /// `DRVAL1?` or `ORIENT ` (acronym followed by a blank for "any value").
    pub fn parse(encoded: &str) -> Option<Self> {
        if encoded.len() < ACRONYM_LEN || !encoded.is_char_boundary(ACRONYM_LEN) {
            return None;
        }
        let (name, value) = encoded.split_at(ACRONYM_LEN);
        let test = match value.trim() {
            "" => AttrTest::AnyValue,
            "?" => AttrTest::Unknown,
            v => AttrTest::Equals(v.to_string()),
        };
        Some(Self {
            name: name.to_string(),
            test,
        })
    }
}

impl fmt::Display for AttrConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            AttrTest::AnyValue => write!(f, "{} ", self.name),
            AttrTest::Unknown => write!(f, "{}?", self.name),
            AttrTest::Equals(v) => write!(f, "{}{}", self.name, v),
        }
    }
}

/// @acp:summary "A look-up table row"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LupRule {
    pub class: String,
    pub table: LupTable,
    #[serde(default)]
    pub constraints: Vec<AttrConstraint>,
    /// Instruction string in the presentation mini-language
    pub instruction: String,
    pub priority: Priority,
    /// Row identifier from the source library, for diagnostics
    #[serde(default)]
    pub rcid: u32,
}

impl LupRule {
    pub fn new(class: &str, table: LupTable, instruction: &str, priority: Priority) -> Self {
        Self {
            class: class.to_string(),
            table,
            constraints: Vec::new(),
            instruction: instruction.to_string(),
            priority,
            rcid: 0,
        }
    }

    pub fn with_constraint(mut self, constraint: AttrConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add constraints from their encoded form; malformed entries are skipped
    pub fn with_encoded(mut self, encoded: &[&str]) -> Self {
        for e in encoded {
            match AttrConstraint::parse(e) {
                Some(c) => self.constraints.push(c),
                None => tracing::warn!("Malformed attribute constraint '{}' on {}", e, self.class),
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Symbol,
    Line,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// @acp:summary "Symbol, complex line or pattern definition"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// Position-independent vector drawing program
    #[serde(default)]
    pub program: String,
    /// Color tokens referenced by the program
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub bbox: BoundingBox,
    #[serde(default)]
    pub pivot: (i32, i32),
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            program: String::new(),
            colors: Vec::new(),
            bbox: BoundingBox::default(),
            pivot: (0, 0),
        }
    }
}
