//! @acp:module "LUP Selector"
//! @acp:summary "Best-match look-up rule selection by attribute constraint count"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! The first candidate of a class is its attribute-less default. Every
//! later candidate is scored by the number of satisfied constraints; a
//! present attribute failing its constraint rejects the candidate. The
//! highest score wins, a later candidate winning ties, and a candidate
//! scoring zero never displaces the default.

use crate::feature::{CodeList, Feature, UNKNOWN_VALUE};
use crate::rules::{AttrConstraint, AttrTest, LupRule};

/// Route legs choose their rule by this attribute
const LEG_CLASS: &str = "leglin";
const LEG_SELECT: &str = "select";

/// @acp:summary "Chosen rule with its position and matched constraints"
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'r> {
    pub rule: &'r LupRule,
    /// Index within the candidate list; 0 is the default rule
    pub index: usize,
    pub score: usize,
    pub matched: Vec<&'r AttrConstraint>,
}

impl<'r> Selection<'r> {
    fn default_rule(rule: &'r LupRule) -> Self {
        Self {
            rule,
            index: 0,
            score: 0,
            matched: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.index == 0
    }
}

/// Compare a constraint value with an attribute value
pub fn values_match(expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    let actual = actual.trim();

    if expected.contains(',') || actual.contains(',') {
        let wanted = CodeList::parse(expected);
        return !wanted.is_empty() && CodeList::parse(actual).same_set(wanted.as_slice());
    }
    if let (Ok(e), Ok(a)) = (expected.parse::<i64>(), actual.parse::<i64>()) {
        return e == a;
    }
    if let (Ok(e), Ok(a)) = (expected.parse::<f64>(), actual.parse::<f64>()) {
        return (e - a).abs() < 1e-9;
    }
    expected == actual
}

/// Score of a candidate, or `None` when a constraint rejects it
pub fn evaluate<'r>(rule: &'r LupRule, feature: &Feature) -> Option<(usize, Vec<&'r AttrConstraint>)> {
    let mut matched = Vec::new();

    for constraint in &rule.constraints {
        let value = feature.attribute(&constraint.name).map(str::trim);
        let hit = match (&constraint.test, value) {
            (AttrTest::Unknown, None) => true,
            (AttrTest::AnyValue, None) => continue,
            (AttrTest::Equals(_), None) => return None,
            (AttrTest::AnyValue, Some(v)) => v != UNKNOWN_VALUE,
            (AttrTest::Unknown, Some(v)) => v == UNKNOWN_VALUE,
            (AttrTest::Equals(expected), Some(v)) => values_match(expected, v),
        };
        if !hit {
            return None;
        }
        matched.push(constraint);
    }

    Some((matched.len(), matched))
}

/// @acp:summary "Pick the best-matching rule for a feature"
///
/// Returns `None` only for an empty candidate list.
pub fn select<'r>(candidates: &'r [LupRule], feature: &Feature) -> Option<Selection<'r>> {
    let (default, rest) = candidates.split_first()?;
    let mut best = Selection::default_rule(default);

    if rest.is_empty() && default.constraints.is_empty() {
        return Some(best);
    }

    if feature.class == LEG_CLASS && feature.attribute(LEG_SELECT).is_none() {
        return Some(best);
    }

    for (offset, rule) in rest.iter().enumerate() {
        let Some((score, matched)) = evaluate(rule, feature) else {
            continue;
        };
        if score > 0 && score >= best.score {
            best = Selection {
                rule,
                index: offset + 1,
                score,
                matched,
            };
        }
    }

    tracing::debug!(
        "Selected rule {} (score {}) of {} candidates for {} {}",
        best.index,
        best.score,
        candidates.len(),
        feature.class,
        feature.id
    );
    Some(best)
}
