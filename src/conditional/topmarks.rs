//! @acp:module "Topmark Procedure"
//! @acp:summary "Topmark symbol selection by floating or rigid platform"
//! @acp:domain symbology
//! @acp:layer logic

use super::{ConditionalProcedure, CsContext};
use crate::feature::TouchRole;

const FLOATING_DEFAULT: &str = "TMARDEF2";
const RIGID_DEFAULT: &str = "TMARDEF1";

/// Symbols drawn above a buoy or light float
fn floating_symbol(topshp: i64) -> &'static str {
    match topshp {
        1 | 24 | 29 => "TOPMAR02",
        2 | 25 => "TOPMAR04",
        3 | 18 | 26 | 32 => "TOPMAR10",
        4 => "TOPMAR12",
        5 | 19 | 21 => "TOPMAR13",
        6 | 12 | 20 | 22 | 23 | 31 => "TOPMAR14",
        7 => "TOPMAR65",
        8 | 27 | 30 => "TOPMAR17",
        9 => "TOPMAR16",
        10 => "TOPMAR08",
        11 => "TOPMAR07",
        13 => "TOPMAR05",
        14 => "TOPMAR06",
        28 => "TOPMAR18",
        _ => FLOATING_DEFAULT,
    }
}

/// Symbols drawn above a beacon or fixed structure
fn rigid_symbol(topshp: i64) -> &'static str {
    match topshp {
        1 | 24 | 29 => "TOPMAR22",
        2 | 25 => "TOPMAR24",
        3 | 18 | 26 | 32 => "TOPMAR30",
        4 => "TOPMAR32",
        5 | 19 | 21 => "TOPMAR33",
        6 | 20 | 22 | 23 => "TOPMAR34",
        7 => "TOPMAR85",
        8 | 27 | 30 => "TOPMAR86",
        9 => "TOPMAR36",
        10 => "TOPMAR28",
        11 => "TOPMAR27",
        12 | 31 => "TOPMAR14",
        13 => "TOPMAR25",
        14 => "TOPMAR26",
        15 => "TOPMAR88",
        16 => "TOPMAR87",
        28 => "TOPMAR89",
        _ => RIGID_DEFAULT,
    }
}

/// TOPMAR01: topmarks
pub struct Topmar01;

impl ConditionalProcedure for Topmar01 {
    fn name(&self) -> &'static str {
        "TOPMAR01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let Some(topshp) = ctx.feature.attr_i64("TOPSHP") else {
            return Some("SY(QUESMRK1)".to_string());
        };

        let symbol = if ctx.touch(TouchRole::Platform).is_some() {
            floating_symbol(topshp)
        } else {
            rigid_symbol(topshp)
        };
        Some(format!("SY({})", symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureArena, GeometryKind};
    use crate::mariner::MarinerSnapshot;
    use crate::rules::Variant;

    #[test]
    fn test_platform_selects_table() {
        let params = MarinerSnapshot::default();
        let mut arena = FeatureArena::new();
        let buoy = arena.insert(Feature::new("BOYCAR", GeometryKind::Point));
        let mark = arena.insert(Feature::new("TOPMAR", GeometryKind::Point).with_attr("TOPSHP", "13"));

        let compute = |arena: &FeatureArena| {
            Topmar01
                .compute(&CsContext::new(arena.get(mark).unwrap(), arena, &params, Variant::Primary))
                .unwrap()
        };

        assert_eq!(compute(&arena), "SY(TOPMAR25)");
        arena.set_touch(mark, TouchRole::Platform, Some(buoy));
        assert_eq!(compute(&arena), "SY(TOPMAR05)");
    }

    #[test]
    fn test_missing_shape() {
        let params = MarinerSnapshot::default();
        let arena = FeatureArena::new();
        let mark = Feature::new("TOPMAR", GeometryKind::Point);
        assert_eq!(
            Topmar01.compute(&CsContext::new(&mark, &arena, &params, Variant::Primary)),
            Some("SY(QUESMRK1)".to_string())
        );
        assert_eq!(rigid_symbol(99), "TMARDEF1");
        assert_eq!(floating_symbol(99), "TMARDEF2");
    }
}
