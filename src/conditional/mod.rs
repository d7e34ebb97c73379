//! @acp:module "Conditional Symbology"
//! @acp:summary "Registry of named procedures computing dynamic instruction fragments"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! A conditional procedure is a pure function of the feature, its touch
//! links and a mariner parameter snapshot. It returns an instruction
//! fragment in the same mini-language as look-up rules, which the object
//! cache compiles and splices in place of the `CS` command.
//!
//! Newer revisions that forward to an older procedure unchanged are
//! registered as aliases and resolved once when registered.

pub mod depth;
pub mod hazards;
pub mod lights;
pub mod quality;
pub mod restrictions;
pub mod routes;
pub mod soundings;
pub mod topmarks;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, SymbologyError};
use crate::feature::{Feature, FeatureArena, TouchRole};
use crate::mariner::MarinerSnapshot;
use crate::rules::Variant;

/// Everything a procedure may read
#[derive(Debug, Clone, Copy)]
pub struct CsContext<'a> {
    pub feature: &'a Feature,
    pub arena: &'a FeatureArena,
    pub mariner: &'a MarinerSnapshot,
    pub variant: Variant,
}

impl<'a> CsContext<'a> {
    pub fn new(
        feature: &'a Feature,
        arena: &'a FeatureArena,
        mariner: &'a MarinerSnapshot,
        variant: Variant,
    ) -> Self {
        Self {
            feature,
            arena,
            mariner,
            variant,
        }
    }

    /// Follow a weak touch link; absent when unset or the target was removed
    pub fn touch(&self, role: TouchRole) -> Option<&'a Feature> {
        self.arena.get(self.feature.touch_id(role)?)
    }
}

/// @acp:summary "A conditional symbology procedure"
pub trait ConditionalProcedure: Send + Sync {
    /// Canonical registry name, e.g. `DEPARE02`
    fn name(&self) -> &'static str;

    /// Compute the instruction fragment for this feature
    fn compute(&self, ctx: &CsContext<'_>) -> Option<String>;

    /// Whether `None` from [`compute`](Self::compute) is an integrity error
    fn always_returns(&self) -> bool {
        true
    }
}

/// Join instruction parts into a fragment
pub(crate) fn join(parts: &[String]) -> String {
    parts.join(";")
}

/// @acp:summary "Name to procedure map with a flat alias table"
#[derive(Clone, Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<String, Arc<dyn ConditionalProcedure>>,
    /// alias -> canonical name, never chained
    aliases: BTreeMap<String, String>,
}

impl std::fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every procedure of the presentation library with its aliases
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.builtin(Arc::new(depth::Depare02), &["DEPARE01", "DEPARE03"]);
        registry.builtin(Arc::new(depth::Depcnt02), &["DEPCNT03"]);
        registry.builtin(Arc::new(lights::Lights05::new()), &["LIGHTS06"]);
        registry.builtin(
            Arc::new(hazards::Obstrn04),
            &["OBSTRN06", "OBSTRN07", "UWTROC03", "UWTROC04"],
        );
        registry.builtin(Arc::new(hazards::Wrecks02), &["WRECKS04", "WRECKS05"]);
        registry.builtin(Arc::new(restrictions::Resare02), &["RESARE04"]);
        registry.builtin(Arc::new(restrictions::Restrn01), &[]);
        registry.builtin(Arc::new(soundings::Soundg02), &["SOUNDG03"]);
        registry.builtin(Arc::new(topmarks::Topmar01), &[]);
        registry.builtin(Arc::new(quality::Quapos01), &[]);
        registry.builtin(Arc::new(quality::Slcons03), &["SLCONS04"]);
        registry.builtin(Arc::new(quality::Datcvr01), &["DATCVR02"]);
        registry.builtin(Arc::new(routes::Leglin02), &["LEGLIN03", "LEGLIN04"]);
        registry.builtin(Arc::new(routes::Symins01), &["SYMINS02"]);
        registry.builtin(Arc::new(routes::Clrlin01), &[]);
        registry.builtin(Arc::new(routes::Pastrk01), &[]);
        registry
    }

    fn builtin(&mut self, procedure: Arc<dyn ConditionalProcedure>, aliases: &[&str]) {
        let name = procedure.name().to_string();
        for alias in aliases {
            self.aliases.insert(alias.to_string(), name.clone());
        }
        self.procedures.insert(name, procedure);
    }

    /// Register a procedure under its own name
    pub fn register(&mut self, procedure: Arc<dyn ConditionalProcedure>) -> Result<()> {
        let name = procedure.name();
        if self.procedures.contains_key(name) || self.aliases.contains_key(name) {
            return Err(SymbologyError::DuplicateProcedure(name.to_string()));
        }
        self.procedures.insert(name.to_string(), procedure);
        Ok(())
    }

    /// Register `alias` for `target`; an alias of an alias is flattened
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        if self.procedures.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(SymbologyError::DuplicateProcedure(alias.to_string()));
        }
        let canonical = self
            .canonical_name(target)
            .ok_or_else(|| SymbologyError::DanglingAlias {
                alias: alias.to_string(),
                target: target.to_string(),
            })?
            .to_string();
        self.aliases.insert(alias.to_string(), canonical);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ConditionalProcedure>> {
        let canonical = self.canonical_name(name)?;
        self.procedures.get(canonical).cloned()
    }

    /// Registered name `name` resolves to
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.procedures.contains_key(name) {
            return Some(name);
        }
        self.aliases.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Canonical procedure names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(|s| s.as_str())
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ConditionalProcedure for Fixed {
        fn name(&self) -> &'static str {
            "FIXED01"
        }

        fn compute(&self, _ctx: &CsContext<'_>) -> Option<String> {
            Some("SY(FIXED01)".to_string())
        }
    }

    #[test]
    fn test_standard_registry_aliases() {
        let registry = ProcedureRegistry::standard();
        assert_eq!(registry.len(), 16);
        assert_eq!(registry.canonical_name("UWTROC04"), Some("OBSTRN04"));
        assert_eq!(registry.canonical_name("LIGHTS06"), Some("LIGHTS05"));
        assert_eq!(registry.get("DEPARE01").map(|p| p.name()), Some("DEPARE02"));
        assert!(registry.get("NOSUCH01").is_none());
    }

    #[test]
    fn test_alias_chain_is_flattened() {
        let mut registry = ProcedureRegistry::new();
        registry.register(Arc::new(Fixed)).unwrap();
        registry.alias("FIXED02", "FIXED01").unwrap();
        registry.alias("FIXED03", "FIXED02").unwrap();
        let aliases: Vec<_> = registry.aliases().collect();
        assert_eq!(aliases, vec![("FIXED02", "FIXED01"), ("FIXED03", "FIXED01")]);
    }

    #[test]
    fn test_registration_errors() {
        let mut registry = ProcedureRegistry::new();
        registry.register(Arc::new(Fixed)).unwrap();
        assert!(matches!(
            registry.register(Arc::new(Fixed)),
            Err(SymbologyError::DuplicateProcedure(_))
        ));
        assert!(matches!(
            registry.alias("X", "MISSING"),
            Err(SymbologyError::DanglingAlias { .. })
        ));
    }

    #[test]
    fn test_touch_resolves_through_arena() {
        let mut arena = FeatureArena::new();
        let buoy = arena.insert(Feature::new("BOYLAT", crate::feature::GeometryKind::Point));
        let light = arena.insert(Feature::new("LIGHTS", crate::feature::GeometryKind::Point));
        arena.set_touch(light, TouchRole::Platform, Some(buoy));
        let params = MarinerSnapshot::default();

        let feature = arena.get(light).unwrap();
        let ctx = CsContext::new(feature, &arena, &params, Variant::Primary);
        assert_eq!(ctx.touch(TouchRole::Platform).map(|f| f.id), Some(buoy));
        assert!(ctx.touch(TouchRole::CoLocatedLight).is_none());
    }
}
