//! @acp:module "Object Report"
//! @acp:summary "Cursor-pick diagnostics of a resolved object"
//! @acp:domain symbology
//! @acp:layer api

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::cache::{RuleKey, VariantSlot};
use crate::error::Result;
use crate::feature::{Feature, FeatureId, GeometryKind, TouchRole};
use crate::rules::{LupTable, Variant};

/// @acp:summary "Resolved rule, matched attributes and final commands of one object"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReport {
    pub id: FeatureId,
    pub class: String,
    pub geometry: GeometryKind,
    pub variant: Variant,
    pub table: LupTable,
    /// `None` when the placeholder rule was substituted
    pub rule_index: Option<usize>,
    pub instruction: String,
    pub matched: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    pub commands: Vec<String>,
    pub priority: String,
    pub ignore_scamin: bool,
    pub labels: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub touch: BTreeMap<TouchRole, FeatureId>,
    pub highlighted: bool,
}

impl ObjectReport {
    /// Build from a finalized slot
    pub fn new(feature: &Feature, variant: Variant, slot: &VariantSlot, labels: &[String]) -> Self {
        let binding = slot.binding();
        let key = binding.map(|b| b.key).unwrap_or(RuleKey {
            table: LupTable::for_geometry(feature.geometry, variant),
            index: None,
        });
        let priority = slot.priority();

        Self {
            id: feature.id,
            class: feature.class.clone(),
            geometry: feature.geometry,
            variant,
            table: key.table,
            rule_index: key.index,
            instruction: binding.map(|b| b.instruction.clone()).unwrap_or_default(),
            matched: binding.map(|b| b.matched.clone()).unwrap_or_default(),
            procedure: binding.and_then(|b| b.procedure.clone()),
            fragment: binding.and_then(|b| b.fragment.clone()),
            commands: slot.commands().iter().map(|c| c.to_string()).collect(),
            priority: priority.to_string(),
            ignore_scamin: priority.ignore_scamin,
            labels: labels.to_vec(),
            attributes: feature.attributes.clone(),
            touch: feature.touch.clone(),
            highlighted: feature.highlighted,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.rule_index.is_none()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

impl fmt::Display for ObjectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}) ", self.class, self.id, self.geometry)?;
        match self.rule_index {
            Some(index) => writeln!(f, "rule {} of {}", index, self.table)?,
            None => writeln!(f, "placeholder rule in {}", self.table)?,
        }
        if !self.matched.is_empty() {
            writeln!(f, "  matched: {}", self.matched.join(" "))?;
        }
        writeln!(f, "  instruction: {}", self.instruction)?;
        if let Some(procedure) = &self.procedure {
            writeln!(
                f,
                "  {}: {}",
                procedure,
                self.fragment.as_deref().unwrap_or("(none)")
            )?;
        }
        writeln!(f, "  commands: {}", self.commands.join(";"))?;
        write!(f, "  priority: {}", self.priority)?;
        if self.ignore_scamin {
            write!(f, " NOSCAMIN")?;
        }
        writeln!(f)?;
        for (role, target) in &self.touch {
            writeln!(f, "  touch {:?}: {}", role, target)?;
        }
        for label in &self.labels {
            writeln!(f, "  label: {}", label)?;
        }
        Ok(())
    }
}
