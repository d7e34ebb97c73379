//! @acp:module "Quality Procedures"
//! @acp:summary "Positional accuracy, shoreline constructions and data coverage"
//! @acp:domain symbology
//! @acp:layer logic

use super::depth::is_low_accuracy;
use super::{join, ConditionalProcedure, CsContext};
use crate::feature::{Feature, GeometryKind};

/// Low-accuracy marker for point features (QUAPNT01)
pub fn point_quality(feature: &Feature) -> Vec<String> {
    if is_low_accuracy(feature) {
        vec!["SY(LOWACC01)".to_string()]
    } else {
        Vec::new()
    }
}

/// Coastline style by positional accuracy (QUALIN01)
pub fn line_quality(feature: &Feature) -> Vec<String> {
    if is_low_accuracy(feature) {
        return vec!["LC(LOWACC21)".to_string()];
    }
    if feature.is_class("COALNE") && feature.attr_i64("CONRAD") == Some(1) {
        return vec!["LS(SOLD,3,CHMGF)".to_string(), "LS(SOLD,1,CSTLN)".to_string()];
    }
    vec!["LS(SOLD,1,CSTLN)".to_string()]
}

/// QUAPOS01: positional quality of points and coastlines
pub struct Quapos01;

impl ConditionalProcedure for Quapos01 {
    fn name(&self) -> &'static str {
        "QUAPOS01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let parts = match ctx.feature.geometry {
            GeometryKind::Point => point_quality(ctx.feature),
            _ => line_quality(ctx.feature),
        };
        Some(join(&parts))
    }
}

/// SLCONS03: shoreline constructions
pub struct Slcons03;

impl ConditionalProcedure for Slcons03 {
    fn name(&self) -> &'static str {
        "SLCONS03"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        if feature.geometry == GeometryKind::Point {
            return Some(join(&point_quality(feature)));
        }

        let style = if is_low_accuracy(feature) {
            "LC(LOWACC01)"
        } else if matches!(feature.attr_i64("CONDTN"), Some(1) | Some(2)) {
            "LS(DASH,1,CSTLN)"
        } else if matches!(feature.attr_i64("CATSLC"), Some(6) | Some(15) | Some(16)) {
            "LS(SOLD,4,CSTLN)"
        } else if matches!(feature.attr_i64("WATLEV"), Some(3) | Some(4)) {
            "LS(DASH,2,CSTLN)"
        } else {
            "LS(SOLD,2,CSTLN)"
        };
        Some(style.to_string())
    }
}

/// DATCVR01: data coverage boundaries
pub struct Datcvr01;

impl ConditionalProcedure for Datcvr01 {
    fn name(&self) -> &'static str {
        "DATCVR01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        // CATCOV 2: no coverage available
        if ctx.feature.attr_i64("CATCOV") == Some(2) {
            return Some("AC(NODTA);AP(NODATA03);LS(SOLD,2,CHGRD)".to_string());
        }
        Some("LC(HODATA01)".to_string())
    }
}
