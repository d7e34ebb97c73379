//! @acp:module "Feature Types"
//! @acp:summary "S-57 feature model: geometry kind, extent, attributes, touch roles"
//! @acp:domain symbology
//! @acp:layer model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::attributes::CodeList;

/// Attribute value S-57 uses for "present but unknown"
pub const UNKNOWN_VALUE: &str = "";

/// Stable arena identity of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Chart cell a feature was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct CellId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Area,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Area => "area",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Axis-aligned bounding box in chart coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Degenerate extent of a single position
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Closed-interval overlap test; touching edges intersect
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// Role tag of a weak cross-feature reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TouchRole {
    /// Floating structure carrying a light or topmark
    Platform,
    /// Another sector light at the same position
    CoLocatedLight,
    /// Shallow-side depth area bordering a contour
    UnderlyingDepthArea,
    /// Shallowest depth area under a hazard
    LeastDepthArea,
}

impl TouchRole {
    pub fn all() -> &'static [TouchRole] {
        &[
            TouchRole::Platform,
            TouchRole::CoLocatedLight,
            TouchRole::UnderlyingDepthArea,
            TouchRole::LeastDepthArea,
        ]
    }
}

/// @acp:summary "A chart feature as seen by the rule engine"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Assigned by the arena on insertion
    #[serde(default = "unassigned")]
    pub id: FeatureId,
    #[serde(default)]
    pub cell: CellId,
    pub geometry: GeometryKind,
    /// S-57 object class acronym, e.g. `DEPARE`
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub extent: Extent,
    /// Depth carried by 3-D sounding geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sounding: Option<f64>,
    #[serde(default)]
    pub touch: BTreeMap<TouchRole, FeatureId>,
    #[serde(default)]
    pub highlighted: bool,
}

fn unassigned() -> FeatureId {
    FeatureId(0)
}

impl Feature {
    pub fn new(class: &str, geometry: GeometryKind) -> Self {
        Self {
            id: unassigned(),
            cell: CellId::default(),
            geometry,
            class: class.to_string(),
            attributes: BTreeMap::new(),
            extent: Extent::default(),
            sounding: None,
            touch: BTreeMap::new(),
            highlighted: false,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    pub fn at(self, x: f64, y: f64) -> Self {
        self.with_extent(Extent::point(x, y))
    }

    pub fn in_cell(mut self, cell: CellId) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_sounding(mut self, depth: f64) -> Self {
        self.sounding = Some(depth);
        self
    }

    pub fn is_class(&self, class: &str) -> bool {
        self.class == class
    }

    /// Raw attribute value, including the unknown sentinel
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    /// Present and not the unknown sentinel
    pub fn has_value(&self, name: &str) -> bool {
        self.attribute(name)
            .map(|v| v.trim() != UNKNOWN_VALUE)
            .unwrap_or(false)
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.trim().parse::<f64>().ok()
    }

    /// Integer attribute; fractional encodings are truncated
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        let raw = self.attribute(name)?.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(|v| v.trunc() as i64))
    }

    /// Enumerated-code list; empty when absent or unknown
    pub fn attr_list(&self, name: &str) -> CodeList {
        self.attribute(name)
            .map(CodeList::parse)
            .unwrap_or_default()
    }

    /// Weak link id for `role`; may point at a removed feature
    pub fn touch_id(&self, role: TouchRole) -> Option<FeatureId> {
        self.touch.get(&role).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_intersection_is_closed() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&Extent::point(1.0, 1.0)));
        assert!(!a.intersects(&Extent::point(1.0001, 0.5)));
        assert!(Extent::new(2.0, 2.0, 0.0, 0.0).intersects(&a));
    }

    #[test]
    fn test_attribute_accessors() {
        let f = Feature::new("DEPARE", GeometryKind::Area)
            .with_attr("DRVAL1", "5.5")
            .with_attr("DRVAL2", "")
            .with_attr("COLOUR", "1,3");

        assert_eq!(f.attr_f64("DRVAL1"), Some(5.5));
        assert_eq!(f.attr_i64("DRVAL1"), Some(5));
        assert!(f.has_value("DRVAL1"));
        assert!(!f.has_value("DRVAL2"));
        assert_eq!(f.attribute("DRVAL2"), Some(UNKNOWN_VALUE));
        assert_eq!(f.attr_f64("DRVAL2"), None);
        assert!(f.attribute("VALSOU").is_none());
        assert_eq!(f.attr_list("COLOUR").as_slice(), &[1, 3]);
    }
}
