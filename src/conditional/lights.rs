//! @acp:module "Light Procedures"
//! @acp:summary "Light flares, sector legs and arcs, and light descriptions"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! LIGHTS05 with its description helper LITDSN01.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{join, ConditionalProcedure, CsContext};
use crate::feature::{CodeList, Feature, TouchRole};
use crate::instruction::format_number;

/// Flare orientation of a light on a fixed structure
const FLARE_ANGLE: f64 = 135.0;
/// Flare orientation of a light carried by a floating platform
const FLOATING_FLARE_ANGLE: f64 = 45.0;
/// Sector leg length on screen
const LEG_LENGTH_MM: f64 = 25.0;
const ARC_RADIUS_MM: f64 = 20.0;
/// Arc radius when this sector encloses a co-located one
const OUTER_ARC_RADIUS_MM: f64 = 25.0;
/// Sweeps within this of 0 or 360 degrees are all-round
const ALL_ROUND_TOLERANCE: f64 = 0.5;
/// Nominal range assumed when `VALNMR` is missing
const DEFAULT_RANGE_NM: f64 = 9.0;
/// Text group of light descriptions
const DESCRIPTION_GROUP: u32 = 23;

/// CATLIT codes
const FLOOD_LIGHT: u8 = 8;
const SPOT_LIGHT: u8 = 11;
const STRIP_LIGHT: u8 = 9;
const DIRECTIONAL: u8 = 1;
const EMERGENCY: u8 = 17;

/// Flare symbol and arc colour of a light colour set
fn colour_style(colours: &CodeList) -> (&'static str, &'static str) {
    if colours.same_set(&[1, 3]) || colours.same_set(&[3]) {
        ("LIGHTS11", "LITRD")
    } else if colours.same_set(&[1, 4]) || colours.same_set(&[4]) {
        ("LIGHTS12", "LITGN")
    } else if colours.same_set(&[1])
        || colours.same_set(&[6])
        || colours.same_set(&[1, 6])
        || colours.same_set(&[11])
    {
        ("LIGHTS13", "LITYW")
    } else {
        ("LITDEF11", "CHMGD")
    }
}

/// Sweep of a sector in `[0, 360)`
pub fn sector_sweep(start: f64, end: f64) -> f64 {
    (end - start).rem_euclid(360.0)
}

pub fn is_all_round(sweep: f64) -> bool {
    sweep < ALL_ROUND_TOLERANCE || sweep > 360.0 - ALL_ROUND_TOLERANCE
}

/// Whether sector `inner` lies strictly inside sector `outer`, by bearing
fn encloses(outer: (f64, f64), inner: (f64, f64)) -> bool {
    let outer_sweep = sector_sweep(outer.0, outer.1);
    let start = sector_sweep(outer.0, inner.0);
    let end = start + sector_sweep(inner.0, inner.1);
    end <= outer_sweep && outer_sweep > sector_sweep(inner.0, inner.1)
}

fn sector_of(feature: &Feature) -> Option<(f64, f64)> {
    Some((feature.attr_f64("SECTR1")?, feature.attr_f64("SECTR2")?))
}

/// LIGHTS05: lights
pub struct Lights05 {
    /// Set once a light with half a sector definition has been reported
    warned_partial_sector: AtomicBool,
}

impl Default for Lights05 {
    fn default() -> Self {
        Self::new()
    }
}

impl Lights05 {
    pub fn new() -> Self {
        Self {
            warned_partial_sector: AtomicBool::new(false),
        }
    }

    fn flare(&self, ctx: &CsContext<'_>, colours: &CodeList) -> String {
        let (symbol, _) = colour_style(colours);
        let angle = if ctx.touch(TouchRole::Platform).is_some() {
            FLOATING_FLARE_ANGLE
        } else {
            FLARE_ANGLE
        };
        format!("SY({},{})", symbol, format_number(angle))
    }

    fn leg(&self, ctx: &CsContext<'_>, bearing: f64) -> String {
        let (length, unit) = if ctx.mariner.full_sector_lines {
            (
                ctx.feature.attr_f64("VALNMR").unwrap_or(DEFAULT_RANGE_NM),
                'N',
            )
        } else {
            (LEG_LENGTH_MM, 'M')
        };
        format!(
            "SL({},{},{},DASH,1,CHBLK)",
            format_number(bearing),
            format_number(length),
            unit
        )
    }

    fn description(&self, ctx: &CsContext<'_>) -> Option<String> {
        if !ctx.mariner.light_descriptions {
            return None;
        }
        let text = light_description(ctx.feature);
        if text.is_empty() {
            return None;
        }
        Some(format!(
            "TX('{}',3,2,2,'15110',2,1,CHBLK,{})",
            text, DESCRIPTION_GROUP
        ))
    }

    fn report_partial_sector(&self, feature: &Feature) {
        if !self.warned_partial_sector.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "Light {} has only one sector bearing; drawing it as all-round",
                feature.id
            );
        }
    }
}

impl ConditionalProcedure for Lights05 {
    fn name(&self) -> &'static str {
        "LIGHTS05"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let catlit = feature.attr_list("CATLIT");
        let colours = feature.attr_list("COLOUR");

        if catlit.contains(FLOOD_LIGHT) || catlit.contains(SPOT_LIGHT) {
            return Some("SY(LIGHTS82)".to_string());
        }
        if catlit.contains(STRIP_LIGHT) {
            return Some("SY(LIGHTS81)".to_string());
        }

        let mut parts = Vec::new();

        let sector = match sector_of(feature) {
            Some(s) => Some(s),
            None => {
                if feature.has_value("SECTR1") != feature.has_value("SECTR2") {
                    self.report_partial_sector(feature);
                }
                None
            }
        };
        let sector = sector.filter(|(s1, s2)| !is_all_round(sector_sweep(*s1, *s2)));

        match sector {
            Some((s1, s2)) => {
                let (_, arc_colour) = colour_style(&colours);
                let enclosed = ctx
                    .touch(TouchRole::CoLocatedLight)
                    .and_then(sector_of)
                    .map(|other| encloses((s1, s2), other))
                    .unwrap_or(false);
                let radius = if enclosed {
                    OUTER_ARC_RADIUS_MM
                } else {
                    ARC_RADIUS_MM
                };

                parts.push(self.leg(ctx, s1));
                parts.push(self.leg(ctx, s2));
                parts.push(format!(
                    "CA(OUTLW,4,{},2,{},{},{})",
                    arc_colour,
                    format_number(s1),
                    format_number(s2),
                    format_number(radius)
                ));
            }
            None => {
                parts.push(self.flare(ctx, &colours));
                if catlit.contains(DIRECTIONAL) {
                    if let Some(orient) = feature.attr_f64("ORIENT") {
                        parts.push(self.leg(ctx, orient));
                    }
                }
            }
        }

        parts.extend(self.description(ctx));
        Some(join(&parts))
    }
}

fn category_abbrev(code: u8) -> Option<&'static str> {
    Some(match code {
        1 => "Dir",
        4 => "Ldg",
        5 => "Aero",
        6 => "Obstr",
        7 => "Fog Det",
        10 => "Subsid",
        12 => "Front",
        13 => "Rear",
        14 => "Lower",
        15 => "Upper",
        16 => "Moire",
        19 => "Hor",
        20 => "Vert",
        _ => return None,
    })
}

fn character_abbrev(code: i64) -> Option<&'static str> {
    Some(match code {
        1 => "F",
        2 => "Fl",
        3 => "LFl",
        4 => "Q",
        5 => "VQ",
        6 => "UQ",
        7 => "Iso",
        8 => "Oc",
        9 => "IQ",
        10 => "IVQ",
        11 => "IUQ",
        12 => "Mo",
        13 => "FFl",
        14 => "Fl+LFl",
        15 => "Oc+Fl",
        16 => "FLFl",
        17 => "Al.Oc",
        18 => "Al.LFl",
        19 => "Al.Fl",
        20 => "Al.Gr",
        25 => "Q+LFl",
        26 => "VQ+LFl",
        27 => "UQ+LFl",
        28 => "Al",
        29 => "Al.FFl",
        _ => return None,
    })
}

fn colour_abbrev(code: u8) -> Option<&'static str> {
    Some(match code {
        1 => "W",
        3 => "R",
        4 => "G",
        5 => "Bu",
        6 => "Y",
        9 => "Am",
        10 => "Vi",
        11 => "Or",
        _ => return None,
    })
}

fn status_abbrev(code: u8) -> Option<&'static str> {
    Some(match code {
        2 => "occas",
        7 => "temp",
        8 => "priv",
        11 => "exting",
        17 => "U",
        _ => return None,
    })
}

/// Abbreviated light description (LITDSN01), e.g. `Fl(2)R.10s15m8M`.
///
/// Emergency lights produce an empty string. Single quotes are dropped so
/// the text can sit inside a quoted `TX` literal.
pub fn light_description(feature: &Feature) -> String {
    let catlit = feature.attr_list("CATLIT");
    if catlit.contains(EMERGENCY) {
        return String::new();
    }

    let mut text = String::new();

    for abbrev in catlit.as_slice().iter().filter_map(|&c| category_abbrev(c)) {
        text.push_str(abbrev);
        text.push(' ');
    }

    if let Some(abbrev) = feature.attr_i64("LITCHR").and_then(character_abbrev) {
        text.push_str(abbrev);
    }

    if let Some(group) = feature.attribute("SIGGRP").map(str::trim) {
        if !group.is_empty() && group != "()" && group != "(1)" {
            text.push_str(group);
        }
    }

    for abbrev in feature
        .attr_list("COLOUR")
        .as_slice()
        .iter()
        .filter_map(|&c| colour_abbrev(c))
    {
        text.push_str(abbrev);
    }

    let period = feature.attr_f64("SIGPER");
    let height = feature.attr_f64("HEIGHT");
    let range = feature.attr_f64("VALNMR");
    if period.is_some() || height.is_some() || range.is_some() {
        text.push('.');
    }
    if let Some(p) = period {
        text.push_str(&format!("{}s", format_number(p)));
    }
    if let Some(h) = height {
        text.push_str(&format!("{}m", format_number(h)));
    }
    if let Some(r) = range {
        text.push_str(&format!("{}M", format_number(r)));
    }

    for abbrev in feature
        .attr_list("STATUS")
        .as_slice()
        .iter()
        .filter_map(|&c| status_abbrev(c))
    {
        text.push_str(&format!(" ({})", abbrev));
    }

    // Quotes would end the TX literal early
    text.trim().chars().filter(|&c| c != '\'').collect()
}
