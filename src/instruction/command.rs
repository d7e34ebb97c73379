//! @acp:module "Command Nodes"
//! @acp:summary "Typed drawing commands produced by the instruction compiler"
//! @acp:domain symbology
//! @acp:layer types

use std::fmt;
use std::sync::Arc;

use crate::conditional::ConditionalProcedure;
use crate::error::{Result, SymbologyError};
use crate::rules::{Definition, DisplayCategory, Priority, RadarPriority};

/// Symbol or pattern rotation
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    None,
    Degrees(f64),
    /// Rotate by the value of a feature attribute, e.g. `ORIENT`
    Attribute(String),
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::None => Ok(()),
            Rotation::Degrees(d) => write!(f, ",{}", format_number(*d)),
            Rotation::Attribute(a) => write!(f, ",{}", a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    Solid,
    Dash,
    Dotted,
}

impl LinePattern {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SOLD" => Some(LinePattern::Solid),
            "DASH" => Some(LinePattern::Dash),
            "DOTT" => Some(LinePattern::Dotted),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LinePattern::Solid => "SOLD",
            LinePattern::Dash => "DASH",
            LinePattern::Dotted => "DOTT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStyle {
    pub pattern: LinePattern,
    /// Width in 0.32 mm units
    pub width: u8,
    pub color: String,
}

/// Text source for `TX` / `TE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    /// Value of the named attribute
    Attribute(String),
    Literal(String),
    /// printf-style format applied to attribute values in order
    Format { format: String, attributes: Vec<String> },
}

/// @acp:summary "Text command parameters"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpec {
    pub content: TextContent,
    pub hjust: u8,
    pub vjust: u8,
    pub spacing: u8,
    /// Font style, weight, width and body size, e.g. `15110`
    pub chars: String,
    pub x_offset: i32,
    pub y_offset: i32,
    pub color: String,
    /// Text display group; groups below 20 are "important" text
    pub group: u32,
}

/// Radial sector boundary of a sector light
#[derive(Debug, Clone, PartialEq)]
pub struct SectorLeg {
    /// Degrees, as charted (from seaward)
    pub bearing: f64,
    pub length: f64,
    pub unit: LegUnit,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegUnit {
    Millimetres,
    NauticalMiles,
}

impl LegUnit {
    pub fn code(&self) -> char {
        match self {
            LegUnit::Millimetres => 'M',
            LegUnit::NauticalMiles => 'N',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(LegUnit::Millimetres),
            "N" => Some(LegUnit::NauticalMiles),
            _ => None,
        }
    }
}

/// Coloured arc of a sector light
#[derive(Debug, Clone, PartialEq)]
pub struct SectorArc {
    pub outline_color: String,
    pub outline_width: u8,
    pub arc_color: String,
    pub arc_width: u8,
    pub start: f64,
    pub end: f64,
    /// Millimetres on screen
    pub radius: f64,
}

/// @acp:summary "Selective priority override carried by an `OP` command"
///
/// Payload layout is eight characters: draw priority digit, radar letter,
/// display category letter, five view-group digits. `-` leaves a field
/// unchanged, and inside the view group it keeps just that digit, so
/// `14-10` rewrites four of the five. A trailing `,NOSCAMIN` makes the
/// object scale independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOverride {
    pub raw: String,
    pub draw: Option<u8>,
    pub radar: Option<RadarPriority>,
    pub category: Option<DisplayCategory>,
    /// Most significant digit first
    pub view_group: [Option<u8>; VIEW_GROUP_DIGITS],
    pub ignore_scamin: bool,
}

const OVERRIDE_LEN: usize = 8;
const VIEW_GROUP_DIGITS: usize = 5;
const NO_CHANGE: char = '-';

impl PriorityOverride {
    pub fn parse(payload: &str) -> Result<Self> {
        let mut fields = payload.split(',').map(str::trim);
        let raw = fields.next().unwrap_or_default();
        let invalid = || SymbologyError::InvalidPriorityOverride(payload.to_string());

        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != OVERRIDE_LEN {
            return Err(invalid());
        }

        let draw = match chars[0] {
            NO_CHANGE => None,
            c => Some(c.to_digit(10).ok_or_else(invalid)? as u8),
        };
        let radar = match chars[1] {
            NO_CHANGE => None,
            c => Some(RadarPriority::from_code(c).ok_or_else(invalid)?),
        };
        let category = match chars[2] {
            NO_CHANGE => None,
            c => Some(DisplayCategory::from_code(c).ok_or_else(invalid)?),
        };
        let mut view_group = [None; VIEW_GROUP_DIGITS];
        for (slot, &c) in view_group.iter_mut().zip(&chars[3..]) {
            if c != NO_CHANGE {
                *slot = Some(c.to_digit(10).ok_or_else(invalid)? as u8);
            }
        }

        let mut ignore_scamin = false;
        for flag in fields {
            match flag {
                "NOSCAMIN" => ignore_scamin = true,
                "" => {}
                other => tracing::warn!("Unknown priority override flag '{}'", other),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            draw,
            radar,
            category,
            view_group,
            ignore_scamin,
        })
    }

    /// Overwrite only the fields this override specifies
    pub fn apply(&self, priority: &mut Priority) {
        if let Some(draw) = self.draw {
            priority.draw = draw;
        }
        if let Some(radar) = self.radar {
            priority.radar = radar;
        }
        if let Some(category) = self.category {
            priority.category = category;
        }
        if self.view_group.iter().any(Option::is_some) {
            priority.view_group = self.merge_view_group(priority.view_group);
        }
        if self.ignore_scamin {
            priority.ignore_scamin = true;
        }
    }

    /// Full group when every digit is given
    pub fn fixed_view_group(&self) -> Option<u32> {
        self.view_group
            .iter()
            .try_fold(0u32, |acc, d| d.map(|d| acc * 10 + u32::from(d)))
    }

    fn merge_view_group(&self, current: u32) -> u32 {
        let span = 10u32.pow(VIEW_GROUP_DIGITS as u32);
        let mut merged = current / span * span;
        for (i, digit) in self.view_group.iter().enumerate() {
            let place = 10u32.pow((VIEW_GROUP_DIGITS - 1 - i) as u32);
            let kept = current / place % 10;
            merged += place * digit.map_or(kept, u32::from);
        }
        merged
    }
}

/// Resolved conditional procedure reference
#[derive(Clone)]
pub struct ProcedureRef {
    /// Name as written in the instruction, possibly an alias
    pub name: String,
    pub procedure: Arc<dyn ConditionalProcedure>,
}

impl fmt::Debug for ProcedureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRef")
            .field("name", &self.name)
            .field("procedure", &self.procedure.name())
            .finish()
    }
}

impl PartialEq for ProcedureRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.procedure.name() == other.procedure.name()
    }
}

/// @acp:summary "One compiled drawing instruction"
#[derive(Debug, Clone, PartialEq)]
pub enum CommandNode {
    ShowText(TextSpec),
    ShowPointSymbol {
        symbol: Arc<Definition>,
        rotation: Rotation,
    },
    ShowSimpleLine(LineStyle),
    ShowComplexLine {
        line: Arc<Definition>,
    },
    ShowAreaColor {
        color: String,
        /// 0 opaque to 4 fully transparent
        transparency: u8,
    },
    ShowAreaPattern {
        pattern: Arc<Definition>,
        rotation: Rotation,
    },
    ShowSectorArc(SectorArc),
    ShowSectorLeg(SectorLeg),
    CallConditional(ProcedureRef),
    OverridePriority(PriorityOverride),
}

impl CommandNode {
    /// Two-letter mini-language tag
    pub fn tag(&self) -> &'static str {
        match self {
            CommandNode::ShowText(spec) => match spec.content {
                TextContent::Format { .. } => "TE",
                _ => "TX",
            },
            CommandNode::ShowPointSymbol { .. } => "SY",
            CommandNode::ShowSimpleLine(_) => "LS",
            CommandNode::ShowComplexLine { .. } => "LC",
            CommandNode::ShowAreaColor { .. } => "AC",
            CommandNode::ShowAreaPattern { .. } => "AP",
            CommandNode::ShowSectorArc(_) => "CA",
            CommandNode::ShowSectorLeg(_) => "SL",
            CommandNode::CallConditional(_) => "CS",
            CommandNode::OverridePriority(_) => "OP",
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, CommandNode::CallConditional(_))
    }

    /// Referenced definition name, if any
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            CommandNode::ShowPointSymbol { symbol, .. } => Some(&symbol.name),
            CommandNode::ShowComplexLine { line } => Some(&line.name),
            CommandNode::ShowAreaPattern { pattern, .. } => Some(&pattern.name),
            _ => None,
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandNode::ShowText(spec) => {
                let source = match &spec.content {
                    TextContent::Attribute(a) => a.clone(),
                    TextContent::Literal(l) => format!("'{}'", l),
                    TextContent::Format { format, attributes } => {
                        format!("'{}','{}'", format, attributes.join(","))
                    }
                };
                write!(
                    f,
                    "{}({},{},{},{},'{}',{},{},{},{})",
                    self.tag(),
                    source,
                    spec.hjust,
                    spec.vjust,
                    spec.spacing,
                    spec.chars,
                    spec.x_offset,
                    spec.y_offset,
                    spec.color,
                    spec.group
                )
            }
            CommandNode::ShowPointSymbol { symbol, rotation } => {
                write!(f, "SY({}{})", symbol.name, rotation)
            }
            CommandNode::ShowSimpleLine(style) => {
                write!(f, "LS({},{},{})", style.pattern.code(), style.width, style.color)
            }
            CommandNode::ShowComplexLine { line } => write!(f, "LC({})", line.name),
            CommandNode::ShowAreaColor {
                color,
                transparency,
            } => {
                if *transparency == 0 {
                    write!(f, "AC({})", color)
                } else {
                    write!(f, "AC({},{})", color, transparency)
                }
            }
            CommandNode::ShowAreaPattern { pattern, rotation } => {
                write!(f, "AP({}{})", pattern.name, rotation)
            }
            CommandNode::ShowSectorArc(arc) => write!(
                f,
                "CA({},{},{},{},{},{},{})",
                arc.outline_color,
                arc.outline_width,
                arc.arc_color,
                arc.arc_width,
                format_number(arc.start),
                format_number(arc.end),
                format_number(arc.radius)
            ),
            CommandNode::ShowSectorLeg(leg) => write!(
                f,
                "SL({},{},{},{},{},{})",
                format_number(leg.bearing),
                format_number(leg.length),
                leg.unit.code(),
                leg.style.pattern.code(),
                leg.style.width,
                leg.style.color
            ),
            CommandNode::CallConditional(p) => write!(f, "CS({})", p.name),
            CommandNode::OverridePriority(o) => {
                if o.ignore_scamin {
                    write!(f, "OP({},NOSCAMIN)", o.raw)
                } else {
                    write!(f, "OP({})", o.raw)
                }
            }
        }
    }
}

/// Shortest decimal form: `135` rather than `135.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
