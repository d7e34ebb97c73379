//! @acp:module "Rule Repository"
//! @acp:summary "Look-up tables, definitions and procedures, read-only after build"
//! @acp:domain symbology
//! @acp:layer data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use super::types::{Definition, DefinitionKind, LupRule, LupTable};
use crate::conditional::{ConditionalProcedure, ProcedureRegistry};
use crate::error::Result;
use crate::instruction::InstructionCompiler;

/// Name of the definition substituted for unknown references
pub const PLACEHOLDER_NAME: &str = "QUESMRK1";

/// @acp:summary "Serialized form of the repository tables"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    #[serde(default)]
    pub rules: Vec<LupRule>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// @acp:summary "Presentation library tables shared by every resolved object"
#[derive(Debug, Clone)]
pub struct RuleRepository {
    /// Candidate lists in declaration order; the first rule is the default
    buckets: BTreeMap<(LupTable, String), Vec<LupRule>>,
    definitions: BTreeMap<(DefinitionKind, String), Arc<Definition>>,
    placeholders: [Arc<Definition>; 3],
    procedures: ProcedureRegistry,
}

impl RuleRepository {
    /// Load a snapshot file against the standard procedure registry
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let snapshot: RepositorySnapshot = serde_json::from_reader(BufReader::new(file))?;
        RepositoryBuilder::new().snapshot(snapshot).build_validated()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: RepositorySnapshot = serde_json::from_str(json)?;
        RepositoryBuilder::new().snapshot(snapshot).build_validated()
    }

    /// @acp:summary "Write the rule and definition tables to JSON"
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.snapshot())?;
        Ok(())
    }

    pub fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            rules: self.buckets.values().flatten().cloned().collect(),
            definitions: self.definitions.values().map(|d| (**d).clone()).collect(),
        }
    }

    /// Candidate rules for a class in a table; `None` when the class has no bucket
    pub fn candidates(&self, table: LupTable, class: &str) -> Option<&[LupRule]> {
        self.buckets
            .get(&(table, class.to_string()))
            .map(|rules| rules.as_slice())
            .filter(|rules| !rules.is_empty())
    }

    pub fn definition(&self, kind: DefinitionKind, name: &str) -> Option<Arc<Definition>> {
        self.definitions.get(&(kind, name.to_string())).cloned()
    }

    /// Definition standing in for an unknown reference of `kind`
    pub fn placeholder(&self, kind: DefinitionKind) -> Arc<Definition> {
        match kind {
            DefinitionKind::Symbol => self.placeholders[0].clone(),
            DefinitionKind::Line => self.placeholders[1].clone(),
            DefinitionKind::Pattern => self.placeholders[2].clone(),
        }
    }

    pub fn procedure(&self, name: &str) -> Option<Arc<dyn ConditionalProcedure>> {
        self.procedures.get(name)
    }

    pub fn procedures(&self) -> &ProcedureRegistry {
        &self.procedures
    }

    pub fn rule_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Classes with a bucket in `table`
    pub fn classes(&self, table: LupTable) -> impl Iterator<Item = &str> {
        self.buckets
            .keys()
            .filter(move |(t, _)| *t == table)
            .map(|(_, class)| class.as_str())
    }

    /// @acp:summary "Compile every rule, failing on the first integrity error"
    pub fn validate(&self) -> Result<()> {
        let compiler = InstructionCompiler::new(self);
        for ((table, class), rules) in &self.buckets {
            for (index, rule) in rules.iter().enumerate() {
                compiler.compile_rule(rule, index).inspect_err(|e| {
                    tracing::error!("Rule {} of {} in {} is invalid: {}", index, class, table, e);
                })?;
            }
        }
        tracing::info!(
            "Validated {} rules, {} definitions, {} procedures",
            self.rule_count(),
            self.definition_count(),
            self.procedures.len()
        );
        Ok(())
    }
}

fn placeholder(kind: DefinitionKind) -> Arc<Definition> {
    Arc::new(Definition::new(kind, PLACEHOLDER_NAME))
}

/// @acp:summary "Builder for a rule repository"
pub struct RepositoryBuilder {
    buckets: BTreeMap<(LupTable, String), Vec<LupRule>>,
    definitions: BTreeMap<(DefinitionKind, String), Arc<Definition>>,
    procedures: ProcedureRegistry,
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryBuilder {
    /// Empty tables with the standard procedure registry
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            definitions: BTreeMap::new(),
            procedures: ProcedureRegistry::standard(),
        }
    }

    pub fn procedures(mut self, procedures: ProcedureRegistry) -> Self {
        self.procedures = procedures;
        self
    }

    /// Append a rule to its class bucket, after existing rules
    pub fn rule(mut self, rule: LupRule) -> Self {
        self.buckets
            .entry((rule.table, rule.class.clone()))
            .or_default()
            .push(rule);
        self
    }

    pub fn rules<I: IntoIterator<Item = LupRule>>(self, rules: I) -> Self {
        rules.into_iter().fold(self, |b, r| b.rule(r))
    }

    /// Add a definition; a later definition of the same kind and name wins
    pub fn definition(mut self, definition: Definition) -> Self {
        let key = (definition.kind, definition.name.clone());
        if let Some(previous) = self.definitions.insert(key, Arc::new(definition)) {
            tracing::warn!("Duplicate {:?} definition {} replaced", previous.kind, previous.name);
        }
        self
    }

    pub fn snapshot(self, snapshot: RepositorySnapshot) -> Self {
        let RepositorySnapshot { rules, definitions } = snapshot;
        definitions
            .into_iter()
            .fold(self.rules(rules), |b, d| b.definition(d))
    }

    pub fn build(self) -> RuleRepository {
        let lookup = |kind: DefinitionKind| {
            self.definitions
                .get(&(kind, PLACEHOLDER_NAME.to_string()))
                .cloned()
                .unwrap_or_else(|| placeholder(kind))
        };
        let placeholders = [
            lookup(DefinitionKind::Symbol),
            lookup(DefinitionKind::Line),
            lookup(DefinitionKind::Pattern),
        ];

        RuleRepository {
            buckets: self.buckets,
            definitions: self.definitions,
            placeholders,
            procedures: self.procedures,
        }
    }

    /// Build and run [`RuleRepository::validate`]
    pub fn build_validated(self) -> Result<RuleRepository> {
        let repo = self.build();
        repo.validate()?;
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SymbologyError;
    use crate::rules::{DisplayCategory, Priority, RadarPriority};

    fn priority() -> Priority {
        Priority::new(4, RadarPriority::Suppressed, DisplayCategory::Standard, 27020)
    }

    #[test]
    fn test_candidates_keep_declaration_order() {
        let repo = RepositoryBuilder::new()
            .rule(LupRule::new("BOYLAT", LupTable::SimplifiedPoints, "SY(BOYLAT13)", priority()))
            .rule(
                LupRule::new("BOYLAT", LupTable::SimplifiedPoints, "SY(BOYLAT14)", priority())
                    .with_encoded(&["COLOUR4"]),
            )
            .build();

        let rules = repo.candidates(LupTable::SimplifiedPoints, "BOYLAT").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].instruction, "SY(BOYLAT13)");
        assert!(repo.candidates(LupTable::PaperChartPoints, "BOYLAT").is_none());
    }

    #[test]
    fn test_validate_rejects_two_conditional_calls() {
        let err = RepositoryBuilder::new()
            .rule(LupRule::new(
                "DEPARE",
                LupTable::SymbolizedBoundaries,
                "CS(DEPARE02);CS(RESTRN01)",
                priority(),
            ))
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, SymbologyError::MultipleConditionalCalls { count: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_procedure() {
        let err = RepositoryBuilder::new()
            .rule(LupRule::new("X", LupTable::Lines, "CS(NOSUCH01)", priority()))
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, SymbologyError::UnknownProcedure(name) if name == "NOSUCH01"));
    }

    #[test]
    fn test_placeholder_prefers_library_definition() {
        let mut custom = Definition::new(DefinitionKind::Symbol, PLACEHOLDER_NAME);
        custom.program = "SP(CHMGD)".to_string();
        let repo = RepositoryBuilder::new().definition(custom).build();
        assert_eq!(repo.placeholder(DefinitionKind::Symbol).program, "SP(CHMGD)");
        assert_eq!(repo.placeholder(DefinitionKind::Line).program, "");
    }

    #[test]
    fn test_json_round_trip() {
        let repo = RepositoryBuilder::new()
            .rule(LupRule::new("LIGHTS", LupTable::SimplifiedPoints, "CS(LIGHTS05)", priority()))
            .definition(Definition::new(DefinitionKind::Symbol, "LIGHTS11"))
            .build();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plib.json");
        repo.write_json(&path).unwrap();

        let loaded = RuleRepository::from_json(&path).unwrap();
        assert_eq!(loaded.snapshot(), repo.snapshot());
        assert!(loaded.definition(DefinitionKind::Symbol, "LIGHTS11").is_some());
    }
}
