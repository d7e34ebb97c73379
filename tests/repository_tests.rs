//! Presentation library persistence and display configuration tests
//!
//! Snapshot files, integrity validation on load and config-driven setup.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use s52::{
    Definition, DefinitionKind, DisplayCategory, Feature, GeometryKind, LupRule, LupTable,
    MarinerParam, Priority, RadarPriority, RepositoryBuilder, RuleRepository, SymbologyConfig,
    SymbologyError, Symbolizer, Variant,
};

fn priority() -> Priority {
    Priority::new(7, RadarPriority::Over, DisplayCategory::Standard, 27010)
}

fn library() -> RuleRepository {
    RepositoryBuilder::new()
        .rule(LupRule::new("BOYLAT", LupTable::SimplifiedPoints, "SY(BOYLAT23)", priority()))
        .rule(
            LupRule::new("BOYLAT", LupTable::SimplifiedPoints, "SY(BOYLAT13)", priority())
                .with_encoded(&["COLOUR3"]),
        )
        .rule(LupRule::new("BOYLAT", LupTable::PaperChartPoints, "SY(BOYLAT01)", priority()))
        .definition(Definition::new(DefinitionKind::Symbol, "BOYLAT13"))
        .definition(Definition::new(DefinitionKind::Symbol, "BOYLAT23"))
        .build()
}

// =============================================================================
// Snapshot files
// =============================================================================

mod snapshot_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plib.json");

        let repo = library();
        repo.write_json(&path).unwrap();
        let reloaded = RuleRepository::from_json(&path).unwrap();

        assert_eq!(reloaded.rule_count(), 3);
        assert_eq!(reloaded.definition_count(), 2);
        assert_eq!(reloaded.snapshot(), repo.snapshot());
    }

    #[test]
    fn test_bucket_order_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plib.json");
        library().write_json(&path).unwrap();
        let reloaded = RuleRepository::from_json(&path).unwrap();

        let bucket = reloaded.candidates(LupTable::SimplifiedPoints, "BOYLAT").unwrap();
        assert_eq!(bucket[0].instruction, "SY(BOYLAT23)");
        assert_eq!(bucket[1].constraints.len(), 1);
    }

    #[test]
    fn test_unknown_procedure_rejected() {
        let json = r#"{
            "rules": [{
                "class": "DEPARE",
                "table": "symbolized-boundaries",
                "instruction": "CS(NOSUCH01)",
                "priority": {"draw": 1, "radar": "suppressed", "category": "base", "view_group": 13030}
            }]
        }"#;
        match RuleRepository::from_json_str(json) {
            Err(SymbologyError::UnknownProcedure(name)) => assert_eq!(name, "NOSUCH01"),
            Err(SymbologyError::Json(e)) => panic!("fixture does not parse: {}", e),
            other => panic!("expected an integrity error, got {:?}", other.map(|r| r.rule_count())),
        }
    }

    #[test]
    fn test_double_conditional_rejected() {
        let result = RepositoryBuilder::new()
            .rule(LupRule::new(
                "DEPARE",
                LupTable::SymbolizedBoundaries,
                "CS(DEPARE02);CS(RESTRN01)",
                priority(),
            ))
            .build_validated();
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, SymbologyError::MultipleConditionalCalls { count: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RuleRepository::from_json(dir.path().join("absent.json")),
            Err(SymbologyError::Io(_))
        ));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_drives_symbolizer() {
        let dir = tempfile::tempdir().unwrap();
        let library_path = dir.path().join("plib.json");
        library().write_json(&library_path).unwrap();

        let mut config = SymbologyConfig {
            library: Some(library_path),
            display_category: DisplayCategory::Base,
            ..Default::default()
        };
        config.mariner.paper_chart_symbols = true;
        let config_path = dir.path().join("s52.config.json");
        config.save(&config_path).unwrap();

        let loaded = SymbologyConfig::load(&config_path).unwrap();
        let repo = loaded.load_repository().unwrap().unwrap();
        let mut s = Symbolizer::with_config(Arc::new(repo), &loaded);

        assert_eq!(s.mariner().get(MarinerParam::PaperChartSymbols), 1.0);
        let id = s.insert(Feature::new("BOYLAT", GeometryKind::Point).with_attr("COLOUR", "3"));
        assert_eq!(s.display_variant(GeometryKind::Point), Variant::Alternate);
        assert!(s.is_suppressed(id).unwrap());

        let primary = s.finalized_commands(id, Variant::Primary).unwrap();
        assert_eq!(primary[0].to_string(), "SY(BOYLAT13)");
    }

    #[test]
    fn test_no_library_configured() {
        let config = SymbologyConfig::default();
        assert!(config.load_repository().unwrap().is_none());
    }

    #[test]
    fn test_bad_library_path_has_context() {
        let config = SymbologyConfig {
            library: Some("/nonexistent/plib.json".into()),
            ..Default::default()
        };
        let err = config.load_repository().unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/plib.json"));
    }
}
