//! Rule resolution integration tests
//!
//! End-to-end checks of selection, conditional symbology, touch links and
//! object cache invalidation through the public API.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use s52::conditional::depth::depth_band;
use s52::conditional::soundings::digit_codes;
use s52::conditional::{CsContext, ProcedureRegistry};
use s52::{
    select, CellId, CommandNode, Definition, DefinitionKind, DisplayCategory, Extent, Feature, FeatureArena, GeometryKind,
    LupRule, LupTable, MarinerParam, MarinerSnapshot, Priority, RadarPriority, RepositoryBuilder,
    RuleRepository, Symbolizer, TouchRole, Variant,
};

fn priority(draw: u8, group: u32) -> Priority {
    Priority::new(draw, RadarPriority::Suppressed, DisplayCategory::Standard, group)
}

fn rendered(commands: &[CommandNode]) -> Vec<String> {
    commands.iter().map(|c| c.to_string()).collect()
}

const SYMBOLS: [&str; 8] = [
    "BOYLAT13", "ISODGR01", "LIGHTS11", "LIGHTS12", "SOUNDG05", "SOUNDG14", "SOUNDS02", "SOUNDS11",
];

/// A small presentation library covering the classes used below
fn library() -> RuleRepository {
    let builder = RepositoryBuilder::new()
        .rule(LupRule::new("DEPARE", LupTable::SymbolizedBoundaries, "CS(DEPARE02)", priority(1, 13030)))
        .rule(LupRule::new("DEPARE", LupTable::PlainBoundaries, "CS(DEPARE02)", priority(1, 13030)))
        .rule(LupRule::new("DEPARE", LupTable::Lines, "CS(DEPARE02)", priority(5, 13030)))
        .rule(LupRule::new("DEPCNT", LupTable::Lines, "CS(DEPCNT02)", priority(5, 33020)))
        .rule(LupRule::new("LIGHTS", LupTable::SimplifiedPoints, "CS(LIGHTS05)", priority(8, 27070)))
        .rule(LupRule::new("BOYLAT", LupTable::SimplifiedPoints, "SY(BOYLAT13)", priority(8, 27010)))
        .rule(LupRule::new("OBSTRN", LupTable::SimplifiedPoints, "CS(OBSTRN04)", priority(4, 34050)))
        .rule(LupRule::new("SOUNDG", LupTable::SimplifiedPoints, "CS(SOUNDG02)", priority(6, 33010)));
    SYMBOLS
        .iter()
        .fold(builder, |b, name| b.definition(Definition::new(DefinitionKind::Symbol, name)))
        .build()
}

fn symbolizer() -> Symbolizer {
    Symbolizer::new(Arc::new(library()))
}

// =============================================================================
// LUP selection
// =============================================================================

mod selection_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Candidates from instruction and space-separated encoded constraints
    fn rules(specs: &[(&str, &str)]) -> Vec<LupRule> {
        specs
            .iter()
            .map(|(instruction, encoded)| {
                let encoded: Vec<&str> = encoded.split_whitespace().collect();
                LupRule::new("X", LupTable::SimplifiedPoints, instruction, priority(5, 0))
                    .with_encoded(&encoded)
            })
            .collect()
    }

    #[test]
    fn test_scenario_b_most_specific() {
        let candidates = rules(&[
            ("SY(DEFAULT)", ""),
            ("SY(RULE1)", "ATTR_A1"),
            ("SY(RULE2)", "ATTR_A1 ATTR_B2"),
        ]);
        let feature = Feature::new("X", GeometryKind::Point)
            .with_attr("ATTR_A", "1")
            .with_attr("ATTR_B", "2");
        let selection = select(&candidates, &feature).unwrap();
        assert_eq!(selection.rule.instruction, "SY(RULE2)");
        assert_eq!(selection.score, 2);
    }

    #[test]
    fn test_maximality_over_attribute_sets() {
        let candidates = rules(&[
            ("SY(D)", ""),
            ("SY(A)", "COLOUR3"),
            ("SY(B)", "COLOUR3 CATLIT1"),
            ("SY(C)", "CATLIT1"),
            ("SY(E)", "COLOUR3 CATLIT1 LITCHR1"),
            ("SY(F)", "LITCHR2"),
        ]);

        let values = ["", "1", "2", "3"];
        for colour in values {
            for catlit in values {
                for litchr in values {
                    let mut feature = Feature::new("X", GeometryKind::Point);
                    if !colour.is_empty() {
                        feature = feature.with_attr("COLOUR", colour);
                    }
                    if !catlit.is_empty() {
                        feature = feature.with_attr("CATLIT", catlit);
                    }
                    if !litchr.is_empty() {
                        feature = feature.with_attr("LITCHR", litchr);
                    }

                    let best = select(&candidates, &feature).unwrap();
                    let scores: Vec<usize> = candidates[1..]
                        .iter()
                        .filter_map(|r| s52::lookup::evaluate(r, &feature).map(|(s, _)| s))
                        .collect();
                    let max = scores.iter().copied().max().unwrap_or(0);
                    assert_eq!(best.score, max, "feature {:?}", feature.attributes);
                    if max == 0 {
                        assert!(best.is_default());
                    }
                }
            }
        }
    }

    #[test]
    fn test_at_most_one_conditional_call() {
        let repo = library();
        let compiler = s52::InstructionCompiler::new(&repo);
        for &table in LupTable::all() {
            for class in repo.classes(table).collect::<Vec<_>>() {
                for (index, rule) in repo.candidates(table, class).unwrap_or_default().iter().enumerate() {
                    let nodes = compiler.compile_rule(rule, index).unwrap();
                    assert!(nodes.iter().filter(|n| n.is_conditional()).count() <= 1);
                }
            }
        }
    }
}

// =============================================================================
// Conditional symbology
// =============================================================================

mod conditional_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_a_below_safety_contour() {
        let params = MarinerSnapshot {
            safety_contour: 10.0,
            two_shades: false,
            ..MarinerSnapshot::default()
        };
        let (colour, shallow) = depth_band(5.0, 15.0, &params);
        assert_eq!(colour, "DEPMS");
        assert!(shallow);
        assert_ne!(colour, "DEPIT");
        assert_ne!(colour, "DEPDW");
    }

    #[test]
    fn test_scenario_c_red_light() {
        let mut s = symbolizer();
        let id = s.insert(Feature::new("LIGHTS", GeometryKind::Point).with_attr("COLOUR", "3"));
        let commands = s.finalized_commands(id, Variant::Primary).unwrap();
        assert_eq!(commands[0].to_string(), "SY(LIGHTS11,135)");
        assert!(commands
            .iter()
            .all(|c| !matches!(c, CommandNode::ShowSectorArc(_) | CommandNode::ShowSectorLeg(_))));
    }

    #[test]
    fn test_depth_monotonicity() {
        let params = MarinerSnapshot {
            safety_contour: 10.0,
            ..MarinerSnapshot::default()
        };
        let rank = |band: &str| {
            ["DEPIT", "DEPVS", "DEPMS", "DEPMD", "DEPDW"]
                .iter()
                .position(|b| *b == band)
                .unwrap()
        };

        for two_shades in [false, true] {
            let p = MarinerSnapshot { two_shades, ..params };
            for d1 in [-3.0, 0.0, 1.5, 2.0, 5.0, 9.9, 10.0, 25.0, 30.0] {
                for width in [0.0, 0.01, 3.0, 20.0] {
                    for shift in [0.5, 1.0, 7.5, 40.0] {
                        let before = rank(depth_band(d1, d1 + width, &p).0);
                        let after = rank(depth_band(d1 + shift, d1 + width + shift, &p).0);
                        assert!(after >= before, "d1={} width={} shift={}", d1, width, shift);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sounding_round_trip() {
        for value in [0.0, 7.3, 9.99, 15.0, 31.0, 99.9, 1234.0, 12345.0_f64] {
            let digits: String = digit_codes(value)
                .iter()
                .filter(|code| !code.starts_with('5'))
                .filter_map(|code| code.chars().nth(1))
                .collect();
            let rebuilt: i64 = digits.parse().unwrap();
            assert_eq!(rebuilt, value.abs().floor() as i64, "value {}", value);
        }
    }

    #[test]
    fn test_procedures_are_deterministic() {
        let mut arena = FeatureArena::new();
        let area = arena.insert(
            Feature::new("DEPARE", GeometryKind::Area)
                .with_attr("DRVAL1", "30")
                .with_attr("DRVAL2", "50"),
        );
        let buoy = arena.insert(Feature::new("BOYLAT", GeometryKind::Point));
        let light = arena.insert(
            Feature::new("LIGHTS", GeometryKind::Point)
                .with_attr("COLOUR", "1,3")
                .with_attr("SECTR1", "45")
                .with_attr("SECTR2", "135")
                .with_attr("LITCHR", "2")
                .with_attr("SIGPER", "10"),
        );
        let rock = arena.insert(Feature::new("UWTROC", GeometryKind::Point).with_attr("VALSOU", "2.5"));
        arena.set_touch(light, TouchRole::Platform, Some(buoy));
        arena.set_touch(rock, TouchRole::LeastDepthArea, Some(area));

        let registry = ProcedureRegistry::standard();
        let params = MarinerSnapshot::default();
        for (id, name) in [(light, "LIGHTS06"), (rock, "UWTROC04"), (area, "DEPARE01")] {
            let procedure = registry.get(name).unwrap();
            let feature = arena.get(id).unwrap();
            let ctx = CsContext::new(feature, &arena, &params, Variant::Primary);
            let first = procedure.compute(&ctx);
            assert!(first.is_some());
            assert_eq!(procedure.compute(&ctx), first);
        }
    }
}

// =============================================================================
// Object cache
// =============================================================================

mod cache_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_d_missing_class() {
        let mut s = symbolizer();
        let id = s.insert(Feature::new("UNSARE", GeometryKind::Point));
        let commands = rendered(s.finalized_commands(id, Variant::Primary).unwrap());
        assert_eq!(commands, vec!["SY(QUESMRK1)".to_string()]);

        let p = s.effective_priority(id, Variant::Primary).unwrap();
        assert_eq!(p.draw, 8);
        assert_eq!(p.category, DisplayCategory::Base);
        assert!(!s.is_suppressed(id).unwrap());
    }

    #[test]
    fn test_safety_contour_change_reshades() {
        let mut s = symbolizer();
        let id = s.insert(
            Feature::new("DEPARE", GeometryKind::Area)
                .with_attr("DRVAL1", "10")
                .with_attr("DRVAL2", "20"),
        );
        assert_eq!(rendered(s.finalized_commands(id, Variant::Primary).unwrap()), vec!["AC(DEPMS)"]);

        s.set_param(MarinerParam::SafetyContour, 10.0);
        assert_eq!(rendered(s.finalized_commands(id, Variant::Primary).unwrap()), vec!["AC(DEPMD)"]);

        s.set_param(MarinerParam::TwoShades, 1.0);
        assert_eq!(rendered(s.finalized_commands(id, Variant::Primary).unwrap()), vec!["AC(DEPDW)"]);
    }

    #[test]
    fn test_attribute_edit_reselects() {
        let mut s = symbolizer();
        let id = s.insert(Feature::new("SOUNDG", GeometryKind::Point).with_attr("VALSOU", "12"));
        assert_eq!(
            rendered(s.finalized_commands(id, Variant::Primary).unwrap()),
            vec!["SY(SOUNDS11)", "SY(SOUNDS02)"]
        );

        s.set_attribute(id, "VALSOU", "45").unwrap();
        assert_eq!(
            rendered(s.finalized_commands(id, Variant::Primary).unwrap()),
            vec!["SY(SOUNDG14)", "SY(SOUNDG05)"]
        );
    }

    #[test]
    fn test_touch_links_feed_flares_and_invalidate() {
        let mut s = symbolizer();
        let ids = s
            .load_cell(
                CellId(7),
                vec![
                    Feature::new("BOYLAT", GeometryKind::Point).at(10.0, 10.0),
                    Feature::new("LIGHTS", GeometryKind::Point)
                        .with_attr("COLOUR", "4")
                        .at(10.0, 10.0),
                ],
            )
            .unwrap();
        let light = ids[1];
        assert_eq!(s.arena().touch(light, TouchRole::Platform).map(|f| f.id), Some(ids[0]));
        assert_eq!(s.finalized_commands(light, Variant::Primary).unwrap()[0].to_string(), "SY(LIGHTS12,45)");

        s.remove(ids[0]);
        assert_eq!(s.finalized_commands(light, Variant::Primary).unwrap()[0].to_string(), "SY(LIGHTS12,135)");
    }

    #[test]
    fn test_isolated_danger_in_deep_water() {
        let mut s = symbolizer();
        let region = Extent::new(0.0, 0.0, 100.0, 100.0);
        let ids = s
            .load_cell(
                CellId(1),
                vec![
                    Feature::new("DEPARE", GeometryKind::Area)
                        .with_attr("DRVAL1", "30")
                        .with_attr("DRVAL2", "50")
                        .with_extent(region),
                    Feature::new("OBSTRN", GeometryKind::Point)
                        .with_attr("VALSOU", "4")
                        .at(50.0, 50.0),
                ],
            )
            .unwrap();

        let commands = rendered(s.finalized_commands(ids[1], Variant::Primary).unwrap());
        assert_eq!(commands, vec!["SY(ISODGR01)", "OP(8OD14010)"]);
        let p = s.effective_priority(ids[1], Variant::Primary).unwrap();
        assert_eq!(p.to_string(), "8OD14010");

        let report = s.describe(ids[1], Variant::Primary).unwrap();
        assert_eq!(report.procedure.as_deref(), Some("OBSTRN04"));
        assert_eq!(report.touch.get(&TouchRole::LeastDepthArea), Some(&ids[0]));
        assert!(report.to_json().unwrap().contains("\"priority\": \"8OD14010\""));
        assert!(report.to_string().contains("OBSTRN04: SY(ISODGR01);OP(8OD14010)"));
    }

    fn hazard_cell(drval1: &str) -> Vec<Feature> {
        vec![
            Feature::new("DEPARE", GeometryKind::Area)
                .with_attr("DRVAL1", drval1)
                .with_attr("DRVAL2", "50")
                .with_extent(Extent::new(0.0, 0.0, 100.0, 100.0)),
            Feature::new("OBSTRN", GeometryKind::Point)
                .with_attr("VALSOU", "4")
                .at(50.0, 50.0),
        ]
    }

    #[test]
    fn test_edited_area_refreshes_linked_hazard() {
        let mut s = symbolizer();
        s.set_param(MarinerParam::SafetyContour, 10.0);
        let ids = s.load_cell(CellId(1), hazard_cell("30")).unwrap();
        assert_eq!(
            rendered(s.finalized_commands(ids[1], Variant::Primary).unwrap()),
            vec!["SY(ISODGR01)", "OP(8OD14010)"]
        );

        s.set_attribute(ids[0], "DRVAL1", "2").unwrap();
        let cached = rendered(s.finalized_commands(ids[1], Variant::Primary).unwrap());

        let mut fresh = symbolizer();
        fresh.set_param(MarinerParam::SafetyContour, 10.0);
        let fresh_ids = fresh.load_cell(CellId(1), hazard_cell("2")).unwrap();
        let expected = rendered(fresh.finalized_commands(fresh_ids[1], Variant::Primary).unwrap());

        assert_eq!(cached, expected);
        assert!(cached.iter().all(|c| c != "SY(ISODGR01)"));
    }

    #[test]
    fn test_non_link_attribute_edit_reaches_dependents() {
        let mut s = symbolizer();
        s.set_param(MarinerParam::SafetyContour, 10.0);
        let ids = s.load_cell(CellId(1), hazard_cell("30")).unwrap();
        s.finalized_commands(ids[1], Variant::Primary).unwrap();
        let generation = s.arena().link_generation();

        s.set_attribute(ids[0], "OBJNAM", "Outer bank").unwrap();
        assert_eq!(s.arena().link_generation(), generation);
        assert_eq!(
            rendered(s.finalized_commands(ids[1], Variant::Primary).unwrap()),
            vec!["SY(ISODGR01)", "OP(8OD14010)"]
        );
    }

    #[test]
    fn test_single_safety_contour_among_nested_areas() {
        let mut s = symbolizer();
        s.set_param(MarinerParam::SafetyContour, 12.0);
        let region = Extent::new(0.0, 0.0, 100.0, 100.0);
        let bands = [("0", "5"), ("5", "10"), ("10", "15"), ("15", "20"), ("20", "30")];
        let mut features: Vec<Feature> = bands
            .iter()
            .map(|(d1, d2)| {
                Feature::new("DEPARE", GeometryKind::Area)
                    .with_attr("DRVAL1", d1)
                    .with_attr("DRVAL2", d2)
                    .with_extent(region)
            })
            .collect();
        let depths = ["10", "15", "20", "30"];
        features.extend(depths.iter().map(|v| {
            Feature::new("DEPCNT", GeometryKind::Line)
                .with_attr("VALDCO", v)
                .with_extent(Extent::new(10.0, 40.0, 90.0, 40.0))
        }));
        let ids = s.load_cell(CellId(3), features).unwrap();

        let mut safety = Vec::new();
        for (&id, depth) in ids[bands.len()..].iter().zip(depths) {
            let commands = rendered(s.finalized_commands(id, Variant::Primary).unwrap());
            if commands.iter().any(|c| c == "LS(SOLD,2,DEPSC)") {
                safety.push(depth);
            }
        }
        assert_eq!(safety, vec!["15"]);
    }

    #[test]
    fn test_remove_cell_drops_objects() {
        let mut s = symbolizer();
        s.load_cell(CellId(1), vec![Feature::new("BOYLAT", GeometryKind::Point)]).unwrap();
        let keep = s
            .load_cell(CellId(2), vec![Feature::new("BOYLAT", GeometryKind::Point)])
            .unwrap();
        assert_eq!(s.finalize_all().unwrap(), 2);

        assert_eq!(s.remove_cell(CellId(1)), 1);
        assert_eq!(s.len(), 1);
        assert!(s.finalized_commands(keep[0], Variant::Alternate).is_ok());
    }
}
