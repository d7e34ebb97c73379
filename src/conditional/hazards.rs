//! @acp:module "Hazard Procedures"
//! @acp:summary "Obstructions, rocks and wrecks with isolated danger detection"
//! @acp:domain symbology
//! @acp:layer logic

use super::depth::{corrected, least_depth};
use super::quality::point_quality;
use super::soundings::sounding_symbols;
use super::{join, ConditionalProcedure, CsContext};
use crate::feature::{Feature, GeometryKind, TouchRole};

/// Hazards at or above this depth keep the generic danger symbol
const DANGER_DEPTH_LIMIT: f64 = 20.0;

const ISOLATED_DANGER: &str = "SY(ISODGR01)";
/// Draw on top, over radar, in the base display
const ISOLATED_DANGER_PRIORITY: &str = "OP(8OD14010)";

/// Depth assumed for a hazard with no charted or inferred value
fn default_depth(feature: &Feature) -> f64 {
    if feature.attr_i64("CATOBS") == Some(6) {
        return 0.01;
    }
    match feature.attr_i64("WATLEV") {
        Some(3) => 0.01,
        Some(5) => 0.0,
        _ => -15.0,
    }
}

/// Charted depth, least depth of the enclosing area, or the water level default
fn hazard_depth(ctx: &CsContext<'_>) -> (f64, bool) {
    match ctx.feature.attr_f64("VALSOU") {
        Some(valsou) => (valsou, true),
        None => (least_depth(ctx).unwrap_or_else(|| default_depth(ctx.feature)), false),
    }
}

/// Isolated danger test (UDWHAZ04).
///
/// A hazard at or above the safety contour inside water the mariner
/// considers safe is promoted to the isolated danger symbol.
pub fn isolated_danger(ctx: &CsContext<'_>, depth: f64) -> Option<String> {
    let params = ctx.mariner;
    let sc = params.safety_contour;
    if corrected(depth, params) > sc {
        return None;
    }

    let area = ctx.touch(TouchRole::LeastDepthArea)?;
    let surrounding = area.attr_f64("DRVAL1")?;
    if corrected(surrounding, params) < sc {
        return None;
    }

    let mut parts: Vec<String> = match ctx.feature.geometry {
        GeometryKind::Point => vec![ISOLATED_DANGER.to_string()],
        GeometryKind::Line => vec!["LS(DOTT,2,CHBLK)".to_string()],
        GeometryKind::Area => vec![
            "AC(DEPVS)".to_string(),
            "AP(FOULAR01)".to_string(),
            "LS(DOTT,2,CHBLK)".to_string(),
            ISOLATED_DANGER.to_string(),
        ],
    };
    parts.push(ISOLATED_DANGER_PRIORITY.to_string());
    Some(join(&parts))
}

fn watlev(feature: &Feature) -> Option<i64> {
    feature.attr_i64("WATLEV")
}

fn hazard_area(feature: &Feature) -> Vec<String> {
    let parts: &[&str] = match watlev(feature) {
        Some(1) | Some(2) => &["AC(CHBRN)", "LS(SOLD,2,CSTLN)"],
        Some(4) => &["AC(DEPIT)", "LS(DASH,2,CSTLN)"],
        _ if feature.attr_i64("CATOBS") == Some(6) => &["AP(FOULAR01)", "LS(DOTT,2,CHBLK)"],
        _ => &["AC(DEPVS)", "LS(DOTT,2,CHBLK)"],
    };
    parts.iter().map(|s| s.to_string()).collect()
}

fn hazard_line(feature: &Feature, depth: f64, known: bool, safety_contour: f64) -> Vec<String> {
    let style = if feature.attr_i64("QUAPOS").is_some_and(|q| (2..=9).contains(&q)) {
        "LC(LOWACC41)"
    } else if known && depth > safety_contour {
        "LS(DASH,2,CHBLK)"
    } else {
        "LS(DOTT,2,CHBLK)"
    };
    vec![style.to_string()]
}

/// OBSTRN04: obstructions and underwater rocks
pub struct Obstrn04;

impl Obstrn04 {
    fn point_symbol(feature: &Feature, depth: f64, known: bool) -> &'static str {
        let rock = feature.is_class("UWTROC");
        if known {
            if depth > DANGER_DEPTH_LIMIT {
                return "DANGER02";
            }
            return match (rock, watlev(feature)) {
                (true, Some(4) | Some(5)) => "UWTROC04",
                (false, Some(1) | Some(2)) => "OBSTRN11",
                (false, Some(4) | Some(5)) => "DANGER03",
                _ => "DANGER01",
            };
        }

        if rock {
            return match watlev(feature) {
                Some(3) => "UWTROC03",
                _ => "UWTROC04",
            };
        }
        if feature.attr_i64("CATOBS") == Some(6) {
            return "OBSTRN01";
        }
        match watlev(feature) {
            Some(1) | Some(2) => "OBSTRN11",
            Some(4) | Some(5) => "OBSTRN03",
            _ => "OBSTRN01",
        }
    }
}

impl ConditionalProcedure for Obstrn04 {
    fn name(&self) -> &'static str {
        "OBSTRN04"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let (depth, known) = hazard_depth(ctx);
        let danger = isolated_danger(ctx, depth);

        let mut parts = Vec::new();
        match feature.geometry {
            GeometryKind::Point => {
                match danger {
                    Some(fragment) => parts.push(fragment),
                    None => {
                        parts.push(format!("SY({})", Self::point_symbol(feature, depth, known)));
                        if known {
                            parts.extend(sounding_symbols(feature, depth, ctx.mariner));
                        }
                    }
                }
                parts.extend(point_quality(feature));
            }
            GeometryKind::Line => match danger {
                Some(fragment) => parts.push(fragment),
                None => parts.extend(hazard_line(feature, depth, known, ctx.mariner.safety_contour)),
            },
            GeometryKind::Area => match danger {
                Some(fragment) => parts.push(fragment),
                None => {
                    parts.extend(hazard_area(feature));
                    if known {
                        parts.extend(sounding_symbols(feature, depth, ctx.mariner));
                    }
                }
            },
        }

        Some(join(&parts))
    }
}

/// WRECKS02: wrecks
pub struct Wrecks02;

impl Wrecks02 {
    fn point_symbol(feature: &Feature, depth: f64, known: bool) -> &'static str {
        if known {
            return if depth <= DANGER_DEPTH_LIMIT {
                "DANGER01"
            } else {
                "DANGER02"
            };
        }
        match (feature.attr_i64("CATWRK"), watlev(feature)) {
            (Some(1), Some(3)) => "WRECKS04",
            (Some(2), Some(3)) => "WRECKS05",
            (Some(4) | Some(5), _) => "WRECKS01",
            (_, Some(1) | Some(2) | Some(4) | Some(5)) => "WRECKS01",
            _ => "WRECKS05",
        }
    }
}

impl ConditionalProcedure for Wrecks02 {
    fn name(&self) -> &'static str {
        "WRECKS02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let (depth, known) = hazard_depth(ctx);
        let danger = isolated_danger(ctx, depth);

        let mut parts = Vec::new();
        match feature.geometry {
            GeometryKind::Area => match danger {
                Some(fragment) => parts.push(fragment),
                None => {
                    let area: &[&str] = match watlev(feature) {
                        Some(1) | Some(2) => &["AC(CHBRN)", "LS(SOLD,2,CSTLN)"],
                        Some(4) => &["AC(DEPIT)", "LS(DASH,2,CSTLN)"],
                        _ => &["AC(DEPVS)", "LS(DOTT,2,CSTLN)"],
                    };
                    parts.extend(area.iter().map(|s| s.to_string()));
                    if known {
                        parts.extend(sounding_symbols(feature, depth, ctx.mariner));
                    }
                }
            },
            _ => {
                match danger {
                    Some(fragment) => parts.push(fragment),
                    None => {
                        parts.push(format!("SY({})", Self::point_symbol(feature, depth, known)));
                        if known {
                            parts.extend(sounding_symbols(feature, depth, ctx.mariner));
                        }
                    }
                }
                parts.extend(point_quality(feature));
            }
        }

        Some(join(&parts))
    }
}
