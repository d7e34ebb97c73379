//! @acp:module "Mariner Object Procedures"
//! @acp:summary "Route legs, clearing lines, past tracks and new-object instructions"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! These classes are created by the navigation system rather than loaded
//! from a chart; their attributes use lowercase acronyms.

use super::{join, ConditionalProcedure, CsContext};
use crate::feature::GeometryKind;

/// LEGLIN02: planned route legs
pub struct Leglin02;

impl ConditionalProcedure for Leglin02 {
    fn name(&self) -> &'static str {
        "LEGLIN02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let mut parts = vec![match feature.attr_i64("select") {
            Some(1) => "LC(PLNRTE03)".to_string(),
            _ => "LS(DASH,2,APLRT)".to_string(),
        }];
        if feature.has_value("plnspd") {
            parts.push("TE('%4.1lf kt','plnspd',3,2,2,'15110',0,-1,APLRT,51)".to_string());
        }
        Some(join(&parts))
    }
}

/// CLRLIN01: clearing lines
pub struct Clrlin01;

impl ConditionalProcedure for Clrlin01 {
    fn name(&self) -> &'static str {
        "CLRLIN01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let mut parts = vec!["LS(SOLD,1,NINFO)".to_string()];
        match feature.attr_f64("ORIENT") {
            Some(_) => parts.push("SY(CLRLIN01,ORIENT)".to_string()),
            None => parts.push("SY(CLRLIN01)".to_string()),
        }
        if feature.has_value("clrbrg") {
            parts.push("TE('clr %03.0lf deg','clrbrg',1,1,2,'15110',0,-1,NINFO,51)".to_string());
        }
        Some(join(&parts))
    }
}

/// PASTRK01: past track
pub struct Pastrk01;

impl ConditionalProcedure for Pastrk01 {
    fn name(&self) -> &'static str {
        "PASTRK01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        // cat_pst 1: primary positioning source
        let style = match ctx.feature.attr_i64("cat_pst") {
            Some(2) => "LS(SOLD,1,SYTRK)",
            _ => "LS(SOLD,2,PSTRK)",
        };
        Some(style.to_string())
    }
}

/// SYMINS01: instructions carried by a new-object feature
pub struct Symins01;

impl ConditionalProcedure for Symins01 {
    fn name(&self) -> &'static str {
        "SYMINS01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        if feature.has_value("SYMINS") {
            return feature.attribute("SYMINS").map(|s| s.trim().to_string());
        }
        let fallback = match feature.geometry {
            GeometryKind::Point => "SY(NEWOBJ01)",
            GeometryKind::Line => "LS(DASH,2,CHMGD)",
            GeometryKind::Area => "SY(NEWOBJ01);LS(DASH,2,CHMGD)",
        };
        Some(fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureArena};
    use crate::mariner::MarinerSnapshot;
    use crate::rules::Variant;

    fn run(procedure: &dyn ConditionalProcedure, feature: &Feature) -> String {
        let arena = FeatureArena::new();
        let params = MarinerSnapshot::default();
        procedure
            .compute(&CsContext::new(feature, &arena, &params, Variant::Primary))
            .unwrap()
    }

    #[test]
    fn test_selected_leg() {
        let leg = Feature::new("leglin", GeometryKind::Line).with_attr("select", "1");
        assert_eq!(run(&Leglin02, &leg), "LC(PLNRTE03)");
        let alternate = Feature::new("leglin", GeometryKind::Line)
            .with_attr("select", "2")
            .with_attr("plnspd", "12");
        assert_eq!(
            run(&Leglin02, &alternate),
            "LS(DASH,2,APLRT);TE('%4.1lf kt','plnspd',3,2,2,'15110',0,-1,APLRT,51)"
        );
    }

    #[test]
    fn test_symins_passthrough_and_fallback() {
        let carried = Feature::new("NEWOBJ", GeometryKind::Point).with_attr("SYMINS", "SY(BCNCAR01)");
        assert_eq!(run(&Symins01, &carried), "SY(BCNCAR01)");
        let bare = Feature::new("NEWOBJ", GeometryKind::Line);
        assert_eq!(run(&Symins01, &bare), "LS(DASH,2,CHMGD)");
    }

    #[test]
    fn test_past_track_sources() {
        let secondary = Feature::new("pastrk", GeometryKind::Line).with_attr("cat_pst", "2");
        assert_eq!(run(&Pastrk01, &secondary), "LS(SOLD,1,SYTRK)");
        assert_eq!(run(&Clrlin01, &Feature::new("clrlin", GeometryKind::Line)), "LS(SOLD,1,NINFO);SY(CLRLIN01)");
    }
}
