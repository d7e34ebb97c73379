//! @acp:module "Depth Procedures"
//! @acp:summary "Seabed shading, safety contour matching and least-depth inference"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! Covers DEPARE02 and DEPCNT02 with their internal helpers SEABED01,
//! SAFCON01 and DEPVAL02. All depths are corrected by the mariner's
//! datum offset before they are compared with contours.

use super::{join, ConditionalProcedure, CsContext};
use crate::feature::{Feature, GeometryKind, TouchRole};
use crate::mariner::MarinerSnapshot;

/// Draw the safety contour and keep it visible at every scale
const SAFETY_CONTOUR_PRIORITY: &str = "OP(--D13010,NOSCAMIN)";

/// Depth corrected by the datum offset
pub fn corrected(depth: f64, params: &MarinerSnapshot) -> f64 {
    depth + params.datum_offset
}

/// Positional accuracy attribute reports an inexact position
pub fn is_low_accuracy(feature: &Feature) -> bool {
    matches!(feature.attr_i64("QUAPOS"), Some(2..=9))
}

/// Depth band colour of a depth range (SEABED01).
///
/// Returns the colour token and whether the band lies shallower than the
/// safety contour.
pub fn depth_band(drval1: f64, drval2: f64, params: &MarinerSnapshot) -> (&'static str, bool) {
    let d1 = corrected(drval1, params);
    let d2 = corrected(drval2, params);
    let within = |t: f64| d1 >= t && d2 > t;

    let mut color = "DEPIT";
    let mut shallow = true;

    if params.two_shades {
        if within(0.0) {
            color = "DEPVS";
        }
        if within(params.safety_contour) {
            color = "DEPDW";
            shallow = false;
        }
    } else {
        if within(0.0) {
            color = "DEPVS";
        }
        if within(params.shallow_contour) {
            color = "DEPMS";
        }
        if within(params.safety_contour) {
            color = "DEPMD";
            shallow = false;
        }
        if within(params.deep_contour) {
            color = "DEPDW";
            shallow = false;
        }
    }

    (color, shallow)
}

/// Seabed area fill commands (SEABED01)
pub fn seabed(drval1: f64, drval2: f64, params: &MarinerSnapshot) -> Vec<String> {
    let (color, shallow) = depth_band(drval1, drval2, params);
    let mut parts = vec![format!("AC({})", color)];
    if shallow && params.shallow_pattern {
        parts.push("AP(DIAMOND1)".to_string());
    }
    parts
}

/// Least depth from the least-depth area link (DEPVAL02)
pub fn least_depth(ctx: &CsContext<'_>) -> Option<f64> {
    ctx.touch(TouchRole::LeastDepthArea)?.attr_f64("DRVAL1")
}

/// Whether a contour of depth `value` is the one drawn as safety contour.
///
/// Either it matches exactly, or it is the next deeper contour: the
/// shallow-side depth area starts above the safety contour and this
/// contour lies below it.
pub fn is_safety_contour(value: f64, ctx: &CsContext<'_>) -> bool {
    let params = ctx.mariner;
    let value = corrected(value, params);
    let sc = params.safety_contour;

    if value == sc {
        return true;
    }
    if value < sc {
        return false;
    }

    ctx.touch(TouchRole::UnderlyingDepthArea)
        .and_then(|area| area.attr_f64("DRVAL1"))
        .map(|d| corrected(d, params) < sc)
        .unwrap_or(false)
}

/// Contour line commands shared by depth contours and depth area edges
fn contour_line(value: f64, ctx: &CsContext<'_>) -> Vec<String> {
    let pattern = if is_low_accuracy(ctx.feature) {
        "DASH"
    } else {
        "SOLD"
    };

    if is_safety_contour(value, ctx) {
        let mut parts = vec![
            format!("LS({},2,DEPSC)", pattern),
            SAFETY_CONTOUR_PRIORITY.to_string(),
        ];
        parts.extend(contour_label(value));
        parts
    } else {
        vec![format!("LS({},1,DEPCN)", pattern)]
    }
}

/// Safety contour label glyphs (SAFCON01).
///
/// The value is written as up to five digit glyphs followed by a tenths
/// glyph; each glyph name encodes its position and digit.
pub fn contour_label(depth: f64) -> Vec<String> {
    if !(0.0..100_000.0).contains(&depth) {
        return Vec::new();
    }

    let tenths = (depth * 10.0 + 1e-9).floor() as i64;
    let whole = tenths / 10;
    let fraction = tenths % 10;
    let digits = whole.to_string();

    let mut parts: Vec<String> = digits
        .chars()
        .rev()
        .enumerate()
        .map(|(pos, d)| format!("SY(SAFCON{}{})", pos, d))
        .collect();
    parts.reverse();

    if whole < 10 && fraction > 0 {
        parts.push(format!("SY(SAFCON6{})", fraction));
    }
    parts
}

/// DEPARE02: depth areas and dredged areas
pub struct Depare02;

impl ConditionalProcedure for Depare02 {
    fn name(&self) -> &'static str {
        "DEPARE02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let drval1 = feature.attr_f64("DRVAL1").unwrap_or(-1.0);
        let drval2 = feature.attr_f64("DRVAL2").unwrap_or(drval1 + 0.01);

        let parts = match feature.geometry {
            GeometryKind::Area => {
                let mut parts = seabed(drval1, drval2, ctx.mariner);
                if feature.is_class("DRGARE") {
                    parts.push("AP(DRGARE01)".to_string());
                    parts.push("LS(DASH,1,CHGRF)".to_string());
                    if let Some(symbol) = super::restrictions::restriction_symbol(feature) {
                        parts.push(format!("SY({})", symbol));
                    }
                }
                parts
            }
            GeometryKind::Line => contour_line(drval1, ctx),
            GeometryKind::Point => {
                tracing::warn!("Depth area {} has point geometry", feature.id);
                vec!["SY(QUESMRK1)".to_string()]
            }
        };

        Some(join(&parts))
    }
}

/// DEPCNT02: depth contours
pub struct Depcnt02;

impl ConditionalProcedure for Depcnt02 {
    fn name(&self) -> &'static str {
        "DEPCNT02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let value = if feature.is_class("DEPARE") {
            feature.attr_f64("DRVAL1").unwrap_or(-1.0)
        } else {
            feature.attr_f64("VALDCO").unwrap_or(0.0)
        };
        Some(join(&contour_line(value, ctx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureArena;
    use crate::rules::Variant;

    fn params(sc: f64) -> MarinerSnapshot {
        MarinerSnapshot {
            safety_contour: sc,
            ..MarinerSnapshot::default()
        }
    }

    fn run(procedure: &dyn ConditionalProcedure, arena: &FeatureArena, id: crate::feature::FeatureId, p: &MarinerSnapshot) -> String {
        let feature = arena.get(id).unwrap();
        procedure
            .compute(&CsContext::new(feature, arena, p, Variant::Primary))
            .unwrap()
    }

    #[test]
    fn test_depth_band_below_safety_contour() {
        let (color, shallow) = depth_band(5.0, 15.0, &params(10.0));
        assert_eq!(color, "DEPMS");
        assert!(shallow);
    }

    #[test]
    fn test_depth_band_extremes() {
        let p = params(10.0);
        assert_eq!(depth_band(-2.0, 0.0, &p).0, "DEPIT");
        assert_eq!(depth_band(0.0, 1.0, &p).0, "DEPVS");
        assert_eq!(depth_band(10.0, 20.0, &p).0, "DEPMD");
        assert_eq!(depth_band(30.0, 50.0, &p).0, "DEPDW");
    }

    #[test]
    fn test_two_shades() {
        let mut p = params(10.0);
        p.two_shades = true;
        assert_eq!(depth_band(5.0, 15.0, &p).0, "DEPVS");
        assert_eq!(depth_band(12.0, 15.0, &p), ("DEPDW", false));
    }

    #[test]
    fn test_datum_offset_shifts_band() {
        let mut p = params(10.0);
        p.datum_offset = 6.0;
        assert_eq!(depth_band(5.0, 15.0, &p).0, "DEPMD");
    }

    #[test]
    fn test_shallow_pattern() {
        let mut p = params(10.0);
        p.shallow_pattern = true;
        assert_eq!(seabed(5.0, 15.0, &p), vec!["AC(DEPMS)", "AP(DIAMOND1)"]);
        assert_eq!(seabed(12.0, 15.0, &p), vec!["AC(DEPMD)"]);
    }

    #[test]
    fn test_dredged_area_decoration() {
        let mut arena = FeatureArena::new();
        let id = arena.insert(
            Feature::new("DRGARE", GeometryKind::Area)
                .with_attr("DRVAL1", "12")
                .with_attr("RESTRN", "7"),
        );
        let out = run(&Depare02, &arena, id, &params(10.0));
        assert_eq!(out, "AC(DEPMD);AP(DRGARE01);LS(DASH,1,CHGRF);SY(ENTRES51)");
    }

    #[test]
    fn test_contour_exact_match() {
        let mut arena = FeatureArena::new();
        let id = arena.insert(Feature::new("DEPCNT", GeometryKind::Line).with_attr("VALDCO", "10"));
        let out = run(&Depcnt02, &arena, id, &params(10.0));
        assert_eq!(out, "LS(SOLD,2,DEPSC);OP(--D13010,NOSCAMIN);SY(SAFCON11);SY(SAFCON00)");
    }

    #[test]
    fn test_contour_next_deeper_via_link() {
        let mut arena = FeatureArena::new();
        let area = arena.insert(
            Feature::new("DEPARE", GeometryKind::Area)
                .with_attr("DRVAL1", "5")
                .with_attr("DRVAL2", "15"),
        );
        let contour = arena.insert(
            Feature::new("DEPCNT", GeometryKind::Line)
                .with_attr("VALDCO", "15")
                .with_attr("QUAPOS", "4"),
        );
        let p = params(12.0);

        assert_eq!(run(&Depcnt02, &arena, contour, &p), "LS(DASH,1,DEPCN)");
        arena.set_touch(contour, TouchRole::UnderlyingDepthArea, Some(area));
        assert!(run(&Depcnt02, &arena, contour, &p).starts_with("LS(DASH,2,DEPSC);OP(--D13010,NOSCAMIN)"));
    }

    #[test]
    fn test_contour_label_digits() {
        assert_eq!(contour_label(5.5), vec!["SY(SAFCON05)", "SY(SAFCON65)"]);
        assert_eq!(contour_label(120.0), vec!["SY(SAFCON21)", "SY(SAFCON12)", "SY(SAFCON00)"]);
        assert!(contour_label(-1.0).is_empty());
        assert_eq!(contour_label(9.99999999995), vec!["SY(SAFCON11)", "SY(SAFCON00)"]);
    }
}
