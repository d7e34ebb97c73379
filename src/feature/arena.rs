//! @acp:module "Feature Arena"
//! @acp:summary "Owns features by stable id and resolves weak touch links"
//! @acp:domain symbology
//! @acp:layer data

use std::collections::BTreeMap;

use super::types::{CellId, Feature, FeatureId, TouchRole};
use crate::error::{Result, SymbologyError};

/// @acp:summary "Arena of chart features keyed by stable integer ids"
///
/// Iteration follows id order, which is insertion order. Touch links are
/// plain ids: a link whose target has been removed resolves to `None`.
/// Every link mutation and every removal bumps [`link_generation`], which
/// resolved objects compare against to detect stale conditional output.
///
/// [`link_generation`]: FeatureArena::link_generation
#[derive(Debug, Default)]
pub struct FeatureArena {
    features: BTreeMap<FeatureId, Feature>,
    next_id: u64,
    link_generation: u64,
}

impl FeatureArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a feature, assigning its id
    pub fn insert(&mut self, mut feature: Feature) -> FeatureId {
        self.next_id += 1;
        let id = FeatureId(self.next_id);
        feature.id = id;
        self.features.insert(id, feature);
        id
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    pub fn require(&self, id: FeatureId) -> Result<&Feature> {
        self.get(id).ok_or(SymbologyError::UnknownFeature(id.0))
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.features.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.features.keys().copied()
    }

    pub fn cell_features(&self, cell: CellId) -> impl Iterator<Item = &Feature> {
        self.features.values().filter(move |f| f.cell == cell)
    }

    /// Distinct cells present in the arena, ascending
    pub fn cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.features.values().map(|f| f.cell).collect();
        cells.sort();
        cells.dedup();
        cells
    }

    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        let removed = self.features.remove(&id);
        if removed.is_some() {
            self.link_generation += 1;
        }
        removed
    }

    /// Drop every feature of a cell, returning the removed ids
    pub fn remove_cell(&mut self, cell: CellId) -> Vec<FeatureId> {
        let ids: Vec<FeatureId> = self.cell_features(cell).map(|f| f.id).collect();
        for id in &ids {
            self.features.remove(id);
        }
        if !ids.is_empty() {
            self.link_generation += 1;
        }
        ids
    }

    /// Resolve a weak link; absent when unset or the target is gone
    pub fn touch(&self, id: FeatureId, role: TouchRole) -> Option<&Feature> {
        let target = self.get(id)?.touch_id(role)?;
        self.get(target)
    }

    pub fn set_touch(&mut self, id: FeatureId, role: TouchRole, target: Option<FeatureId>) {
        let Some(feature) = self.features.get_mut(&id) else {
            tracing::warn!("Touch link on unknown feature {}", id);
            return;
        };
        let previous = match target {
            Some(t) => feature.touch.insert(role, t),
            None => feature.touch.remove(&role),
        };
        if previous != target {
            self.link_generation += 1;
        }
    }

    /// Remove all links held by features of `cell`
    pub fn clear_touch_links(&mut self, cell: CellId) {
        let mut changed = false;
        for feature in self.features.values_mut().filter(|f| f.cell == cell) {
            if !feature.touch.is_empty() {
                feature.touch.clear();
                changed = true;
            }
        }
        if changed {
            self.link_generation += 1;
        }
    }

    /// Features holding a link to `target`, under any role
    pub fn dependents(&self, target: FeatureId) -> Vec<FeatureId> {
        self.features
            .values()
            .filter(|f| f.touch.values().any(|&t| t == target))
            .map(|f| f.id)
            .collect()
    }

    pub fn link_generation(&self) -> u64 {
        self.link_generation
    }
}
