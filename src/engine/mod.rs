//! @acp:module "Symbolizer"
//! @acp:summary "Feature arena, parameter store and object cache behind one interface"
//! @acp:domain symbology
//! @acp:layer api
//!
//! The symbolizer owns the features and their resolved objects and holds
//! the repository through an `Arc`. Callers serialize access externally;
//! nothing here locks.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::SymbologyConfig;
use crate::error::{Result, SymbologyError};
use crate::feature::{CellId, Feature, FeatureArena, FeatureId, GeometryKind};
use crate::instruction::CommandNode;
use crate::mariner::{MarinerParam, MarinerStore};
use crate::object::{FinalizeContext, ObjectReport, ResolvedObject};
use crate::rules::{Priority, RuleRepository, Variant};
use crate::touch;

/// @acp:summary "Rule-resolution engine for a set of loaded chart cells"
#[derive(Debug)]
pub struct Symbolizer {
    repo: Arc<RuleRepository>,
    arena: FeatureArena,
    mariner: MarinerStore,
    objects: BTreeMap<FeatureId, ResolvedObject>,
    eager_finalize: bool,
}

impl Symbolizer {
    pub fn new(repo: Arc<RuleRepository>) -> Self {
        Self {
            repo,
            arena: FeatureArena::new(),
            mariner: MarinerStore::default(),
            objects: BTreeMap::new(),
            eager_finalize: false,
        }
    }

    pub fn with_config(repo: Arc<RuleRepository>, config: &SymbologyConfig) -> Self {
        Self {
            mariner: config.mariner_store(),
            eager_finalize: config.eager_finalize,
            ..Self::new(repo)
        }
    }

    pub fn repository(&self) -> &RuleRepository {
        &self.repo
    }

    /// Swap in a reloaded presentation library; every object is rebuilt
    pub fn set_repository(&mut self, repo: Arc<RuleRepository>) {
        self.repo = repo;
        for object in self.objects.values_mut() {
            object.invalidate();
        }
        tracing::info!("Presentation library replaced, {} objects invalidated", self.objects.len());
    }

    pub fn arena(&self) -> &FeatureArena {
        &self.arena
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.arena.get(id)
    }

    pub fn mariner(&self) -> &MarinerStore {
        &self.mariner
    }

    /// Direct store access; generation counters still drive invalidation
    pub fn mariner_mut(&mut self) -> &mut MarinerStore {
        &mut self.mariner
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Insert one feature and create its resolved object
    pub fn insert(&mut self, feature: Feature) -> FeatureId {
        let id = self.arena.insert(feature);
        self.objects.insert(id, ResolvedObject::new(id));
        id
    }

    /// @acp:summary "Load a chart cell and resolve its touch links"
    pub fn load_cell<I>(&mut self, cell: CellId, features: I) -> Result<Vec<FeatureId>>
    where
        I: IntoIterator<Item = Feature>,
    {
        let ids: Vec<FeatureId> = features
            .into_iter()
            .map(|feature| self.insert(feature.in_cell(cell)))
            .collect();
        let links = touch::resolve_cell(&mut self.arena, cell);
        tracing::info!("Loaded cell {}: {} features, {} touch links", cell.0, ids.len(), links);

        if self.eager_finalize {
            self.finalize_all()?;
        }
        Ok(ids)
    }

    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        self.objects.remove(&id);
        self.arena.remove(id)
    }

    /// Drop a cell's features and objects; links into it resolve to absent
    pub fn remove_cell(&mut self, cell: CellId) -> usize {
        let removed = self.arena.remove_cell(cell);
        for id in &removed {
            self.objects.remove(id);
        }
        tracing::info!("Unloaded cell {}: {} features", cell.0, removed.len());
        removed.len()
    }

    /// Re-run touch-link resolution over every loaded cell
    pub fn resolve_touch_links(&mut self) -> usize {
        touch::resolve_all(&mut self.arena)
    }

    /// Edit an attribute.
    ///
    /// Drops the cached commands of the feature and of every feature that
    /// reads it through a touch link. Link-deciding attributes re-run touch
    /// resolution for the feature's cell first.
    pub fn set_attribute(&mut self, id: FeatureId, name: &str, value: &str) -> Result<()> {
        let feature = self
            .arena
            .get_mut(id)
            .ok_or(SymbologyError::UnknownFeature(id.0))?;
        feature.attributes.insert(name.to_string(), value.to_string());
        let cell = feature.cell;

        if touch::LINK_ATTRIBUTES.contains(&name) {
            touch::resolve_cell(&mut self.arena, cell);
        }

        let mut stale = self.arena.dependents(id);
        stale.push(id);
        for dependent in &stale {
            if let Some(object) = self.objects.get_mut(dependent) {
                object.invalidate();
            }
        }
        tracing::debug!("Attribute {} of {} edited, {} objects invalidated", name, id, stale.len());
        Ok(())
    }

    /// Write a mariner parameter; returns whether it changed
    pub fn set_param(&mut self, param: MarinerParam, value: f64) -> bool {
        self.mariner.set(param, value)
    }

    /// Toggle the highlight flag; cached commands stay valid
    pub fn highlight(&mut self, id: FeatureId, on: bool) -> Result<()> {
        let feature = self
            .arena
            .get_mut(id)
            .ok_or(SymbologyError::UnknownFeature(id.0))?;
        feature.highlighted = on;
        Ok(())
    }

    /// Variant the renderer should draw under the current parameters
    pub fn display_variant(&self, geometry: GeometryKind) -> Variant {
        let params = self.mariner.snapshot();
        let alternate = match geometry {
            GeometryKind::Point => params.paper_chart_symbols,
            GeometryKind::Line => false,
            GeometryKind::Area => !params.symbolized_boundaries,
        };
        if alternate {
            Variant::Alternate
        } else {
            Variant::Primary
        }
    }

    fn split(&mut self) -> (FinalizeContext<'_>, &mut BTreeMap<FeatureId, ResolvedObject>) {
        (
            FinalizeContext {
                repo: &self.repo,
                arena: &self.arena,
                mariner: &self.mariner,
            },
            &mut self.objects,
        )
    }

    fn object(
        objects: &mut BTreeMap<FeatureId, ResolvedObject>,
        id: FeatureId,
    ) -> Result<&mut ResolvedObject> {
        objects.get_mut(&id).ok_or(SymbologyError::UnknownFeature(id.0))
    }

    /// @acp:summary "Fully expanded commands of an object"
    pub fn finalized_commands(&mut self, id: FeatureId, variant: Variant) -> Result<&[CommandNode]> {
        let (ctx, objects) = self.split();
        Self::object(objects, id)?.finalize(&ctx, variant)
    }

    /// Priority after conditional overrides
    pub fn effective_priority(&mut self, id: FeatureId, variant: Variant) -> Result<Priority> {
        let (ctx, objects) = self.split();
        Self::object(objects, id)?.priority(&ctx, variant)
    }

    pub fn labels(&mut self, id: FeatureId, variant: Variant) -> Result<&[String]> {
        let (ctx, objects) = self.split();
        Self::object(objects, id)?.labels(&ctx, variant)
    }

    /// Hidden by class suppression or by the display category filter
    pub fn is_suppressed(&mut self, id: FeatureId) -> Result<bool> {
        let feature = self.arena.require(id)?;
        if self.mariner.is_class_suppressed(&feature.class) {
            return Ok(true);
        }
        let variant = self.display_variant(feature.geometry);
        let priority = self.effective_priority(id, variant)?;
        Ok(!self.mariner.is_category_visible(priority.category))
    }

    /// @acp:summary "Debug dump of the resolved rule and matched attributes"
    pub fn describe(&mut self, id: FeatureId, variant: Variant) -> Result<ObjectReport> {
        let labels = self.labels(id, variant)?.to_vec();
        let feature = self.arena.require(id)?;
        let object = self
            .objects
            .get(&id)
            .ok_or(SymbologyError::UnknownFeature(id.0))?;
        Ok(ObjectReport::new(feature, variant, object.slot(variant), &labels))
    }

    /// Finalize both variants of every object in parallel
    pub fn finalize_all(&mut self) -> Result<usize> {
        let (ctx, objects) = self.split();
        objects.par_iter_mut().try_for_each(|(_, object)| {
            for &variant in Variant::all() {
                object.finalize(&ctx, variant)?;
            }
            Ok::<(), SymbologyError>(())
        })?;
        tracing::debug!("Finalized {} objects", objects.len());
        Ok(objects.len())
    }
}
