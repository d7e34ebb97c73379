//! @acp:module "Restriction Procedures"
//! @acp:summary "Regulated area symbols ranked by restriction type"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! Restriction ranks, strongest first: entry, anchoring, fishing, other.
//! Within a rank the `61` symbol variant marks additional restrictions of
//! a weaker rank, `71` marks informational sub-codes, `51` neither.

use super::{join, ConditionalProcedure, CsContext};
use crate::feature::{CodeList, Feature};
use crate::rules::Variant;

const ENTRY: [u8; 3] = [7, 8, 14];
const ANCHORING: [u8; 2] = [1, 2];
const FISHING: [u8; 5] = [3, 4, 5, 6, 24];
/// Restrictions other than entry, anchoring or fishing
const OTHER: [u8; 7] = [13, 16, 17, 23, 25, 26, 27];
/// Informational-only restriction codes
const INFORMATIONAL: [u8; 10] = [9, 10, 11, 12, 15, 18, 19, 20, 21, 22];

/// Area categories calling for caution
const CAUTION_CATEGORIES: [u8; 11] = [1, 8, 9, 12, 14, 18, 19, 21, 24, 25, 26];
/// Area categories that are informational
const INFO_CATEGORIES: [u8; 8] = [4, 5, 6, 7, 10, 20, 22, 23];

/// Bumps the draw priority when a 61/71 variant is chosen
const VARIANT_PRIORITY: &str = "OP(6-------)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rank {
    Entry,
    Anchoring,
    Fishing,
    Other,
}

impl Rank {
    fn of(restrn: &CodeList) -> Rank {
        if restrn.contains_any(&ENTRY) {
            Rank::Entry
        } else if restrn.contains_any(&ANCHORING) {
            Rank::Anchoring
        } else if restrn.contains_any(&FISHING) {
            Rank::Fishing
        } else {
            Rank::Other
        }
    }

    /// Codes that count as "additional" restrictions for this rank
    fn weaker(&self) -> &'static [u8] {
        match self {
            Rank::Entry => &[1, 2, 3, 4, 5, 6, 13, 16, 17, 23, 24, 25, 26, 27],
            Rank::Anchoring => &FISHING,
            Rank::Fishing => &OTHER,
            Rank::Other => &[],
        }
    }

    fn boundary(&self) -> &'static str {
        match self {
            Rank::Entry => "ENTRES51",
            Rank::Anchoring => "ACHRES51",
            Rank::Fishing => "FSHRES51",
            Rank::Other => "CTYARE51",
        }
    }
}

/// Centred symbol for a restriction list, or `None` when there is none.
fn ranked_symbol(restrn: &CodeList) -> Option<(&'static str, bool)> {
    if restrn.is_empty() {
        return None;
    }
    let rank = Rank::of(restrn);
    let info = restrn.contains_any(&INFORMATIONAL);

    let symbol = match (rank, restrn.contains_any(rank.weaker()), info) {
        (Rank::Other, _, true) => "INFARE51",
        (Rank::Other, _, false) => "RSRDEF51",
        (Rank::Entry, true, _) => "ENTRES61",
        (Rank::Entry, false, true) => "ENTRES71",
        (Rank::Entry, false, false) => "ENTRES51",
        (Rank::Anchoring, true, _) => "ACHRES61",
        (Rank::Anchoring, false, true) => "ACHRES71",
        (Rank::Anchoring, false, false) => "ACHRES51",
        (Rank::Fishing, true, _) => "FSHRES61",
        (Rank::Fishing, false, true) => "FSHRES71",
        (Rank::Fishing, false, false) => "FSHRES51",
    };
    let variant = symbol.ends_with("61") || symbol.ends_with("71");
    Some((symbol, variant))
}

/// Restriction symbol of any feature carrying `RESTRN` (RESCSP01)
pub fn restriction_symbol(feature: &Feature) -> Option<&'static str> {
    ranked_symbol(&feature.attr_list("RESTRN")).map(|(symbol, _)| symbol)
}

/// RESARE02: restricted areas
pub struct Resare02;

impl Resare02 {
    fn category_only(catrea: &CodeList) -> &'static str {
        if catrea.contains_any(&CAUTION_CATEGORIES) {
            if catrea.contains_any(&INFO_CATEGORIES) {
                "CTYARE71"
            } else {
                "CTYARE51"
            }
        } else if catrea.contains_any(&INFO_CATEGORIES) {
            "INFARE51"
        } else {
            "RSRDEF51"
        }
    }
}

impl ConditionalProcedure for Resare02 {
    fn name(&self) -> &'static str {
        "RESARE02"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        let feature = ctx.feature;
        let restrn = feature.attr_list("RESTRN");
        let mut parts = Vec::new();

        let boundary = match ranked_symbol(&restrn) {
            Some((symbol, variant)) => {
                parts.push(format!("SY({})", symbol));
                if variant {
                    parts.push(VARIANT_PRIORITY.to_string());
                }
                Rank::of(&restrn).boundary()
            }
            None => {
                let symbol = Self::category_only(&feature.attr_list("CATREA"));
                parts.push(format!("SY({})", symbol));
                if symbol.ends_with("71") {
                    parts.push(VARIANT_PRIORITY.to_string());
                }
                "CTYARE51"
            }
        };

        match ctx.variant {
            Variant::Primary => parts.push(format!("LC({})", boundary)),
            Variant::Alternate => parts.push("LS(DASH,2,CHMGD)".to_string()),
        }
        Some(join(&parts))
    }
}

/// RESTRN01: restriction symbol for any object with `RESTRN`
pub struct Restrn01;

impl ConditionalProcedure for Restrn01 {
    fn name(&self) -> &'static str {
        "RESTRN01"
    }

    fn compute(&self, ctx: &CsContext<'_>) -> Option<String> {
        restriction_symbol(ctx.feature).map(|symbol| format!("SY({})", symbol))
    }

    fn always_returns(&self) -> bool {
        false
    }
}
