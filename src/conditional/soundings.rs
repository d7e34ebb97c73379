//! @acp:module "Sounding Procedures"
//! @acp:summary "Decomposes depth values into digit glyph symbols"
//! @acp:domain symbology
//! @acp:layer logic

use super::{join, ConditionalProcedure, CsContext};
use crate::feature::Feature;
use crate::mariner::MarinerSnapshot;

/// Quality-of-sounding codes marking an unreliable depth
const UNRELIABLE_QUASOU: [u8; 5] = [3, 4, 5, 8, 9];
/// Technique-of-sounding code for a swept depth
const SWEPT_TECSOU: u8 = 6;
/// Status code for "reported, not surveyed"
const REPORTED_STATUS: u8 = 18;

/// Glyph tokens for a sounding (SNDFRM03), without the `SY()` wrapper.
///
/// Each token is the glyph-set prefix followed by a position code and a
/// digit: `SOUNDS17` is the shallow-set digit 7 in leading position.
pub fn sounding_glyphs(feature: &Feature, depth: f64, params: &MarinerSnapshot) -> Vec<String> {
    let prefix = if depth <= params.safety_depth {
        "SOUNDS"
    } else {
        "SOUNDG"
    };
    let glyph = |code: String| format!("{}{}", prefix, code);
    let mut out = Vec::new();

    if feature.attr_list("TECSOU").contains(SWEPT_TECSOU) {
        out.push(glyph("B1".to_string()));
    }

    let unreliable = feature.attr_list("QUASOU").contains_any(&UNRELIABLE_QUASOU)
        || feature.attr_list("STATUS").contains(REPORTED_STATUS)
        || matches!(feature.attr_i64("QUAPOS"), Some(2..=9));
    if unreliable {
        out.push(glyph("C2".to_string()));
    }

    if depth < 0.0 {
        out.push(glyph("A1".to_string()));
    }

    out.extend(digit_codes(depth.abs()).into_iter().map(glyph));
    out
}

/// Position/digit codes for a non-negative depth value
pub fn digit_codes(value: f64) -> Vec<String> {
    let tenths = (value * 10.0 + 1e-9).floor() as i64;
    let whole = tenths / 10;
    let fraction = tenths % 10;
    let code = |pos: u8, digit: i64| format!("{}{}", pos, digit);

    // Brackets follow the rounded value so a carry never lands in a
    // single-digit glyph
    if whole < 10 {
        let mut out = vec![code(1, whole)];
        if fraction > 0 {
            out.push(code(5, fraction));
        }
        out
    } else if whole < 31 && fraction > 0 {
        vec![code(2, whole / 10), code(1, whole % 10), code(5, fraction)]
    } else if whole < 100 {
        vec![code(1, whole / 10), code(0, whole % 10)]
    } else if whole < 1000 {
        vec![code(2, whole / 100), code(1, (whole / 10) % 10), code(0, whole % 10)]
    } else if whole < 10_000 {
        vec![
            code(2, whole / 1000),
            code(1, (whole / 100) % 10),
            code(0, (whole / 10) % 10),
            code(4, whole % 10),
        ]
    } else {
        vec![
            code(3, (whole / 10_000) % 10),
            code(2, (whole / 1000) % 10),
            code(1, (whole / 100) % 10),
            code(0, (whole / 10) % 10),
            code(4, whole % 10),
        ]
    }
}

/// Sounding symbols as instruction parts
pub fn sounding_symbols(feature: &Feature, depth: f64, params: &MarinerSnapshot) -> Vec<String> {
    sounding_glyphs(feature, depth, params)
        .into_iter()
        .map(|g| format!("SY({})", g))
        .collect()
}

/// SOUNDG02: soundings from 3-D point geometry or `VALSOU`
pub struct Soundg02;

impl ConditionalProcedure for Soundg02 {
    fn name(&self) -> &'static str {
        "SOUNDG02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        match feature.sounding.or_else(|| feature.attr_f64("VALSOU")) {
            Some(depth) => Some(join(&sounding_symbols(feature, depth, ctx.mariner))),
            None => {
                tracing::debug!("Sounding {} carries no depth", feature.id);
                Some(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::GeometryKind;

    fn plain() -> Feature {
        Feature::new("SOUNDG", GeometryKind::Point)
    }

    #[test]
    fn test_brackets() {
        assert_eq!(digit_codes(0.0), vec!["10"]);
        assert_eq!(digit_codes(7.3), vec!["17", "53"]);
        assert_eq!(digit_codes(9.99), vec!["19", "59"]);
        assert_eq!(digit_codes(15.0), vec!["11", "05"]);
        assert_eq!(digit_codes(15.4), vec!["21", "15", "54"]);
        assert_eq!(digit_codes(31.0), vec!["13", "01"]);
        assert_eq!(digit_codes(99.9), vec!["19", "09"]);
        assert_eq!(digit_codes(1234.0), vec!["21", "12", "03", "44"]);
        assert_eq!(digit_codes(12345.0), vec!["31", "22", "13", "04", "45"]);
    }

    #[test]
    fn test_carry_into_next_bracket() {
        assert_eq!(digit_codes(9.99999999995), vec!["11", "00"]);
        assert_eq!(digit_codes(30.99999999995), vec!["13", "01"]);
        assert!(digit_codes(9.99999999995).iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_prefix_follows_safety_depth() {
        let params = MarinerSnapshot {
            safety_depth: 10.0,
            ..MarinerSnapshot::default()
        };
        assert_eq!(sounding_glyphs(&plain(), 7.3, &params), vec!["SOUNDS17", "SOUNDS53"]);
        assert_eq!(sounding_glyphs(&plain(), 12.0, &params), vec!["SOUNDG11", "SOUNDG02"]);
    }

    #[test]
    fn test_markers() {
        let params = MarinerSnapshot::default();
        let swept = plain().with_attr("TECSOU", "6").with_attr("QUASOU", "4");
        assert_eq!(
            sounding_glyphs(&swept, -1.2, &params),
            vec!["SOUNDSB1", "SOUNDSC2", "SOUNDSA1", "SOUNDS11", "SOUNDS52"]
        );
    }
}
