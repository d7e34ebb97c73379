//! @acp:module "Touch Links"
//! @acp:summary "Load-time pass attaching weak cross-feature references per cell"
//! @acp:domain symbology
//! @acp:layer service
//!
//! Candidates are filtered by extent intersection within the consumer's
//! cell. Platforms and co-located lights take the first match in arena
//! order. Least-depth areas take the shallowest `DRVAL1`; underlying depth
//! areas take the deepest `DRVAL2` not past the contour.

use rayon::prelude::*;

use crate::feature::{CellId, Extent, Feature, FeatureArena, FeatureId, GeometryKind, TouchRole};

/// Classes that float and therefore rotate a light flare or swap topmarks
pub const FLOATING_PLATFORMS: [&str; 8] = [
    "BOYLAT", "BOYCAR", "BOYISD", "BOYSAW", "BOYSPP", "BOYINB", "LITFLT", "LITVES",
];
/// Attributes that decide which candidate a consumer links to
pub const LINK_ATTRIBUTES: [&str; 5] = ["DRVAL1", "DRVAL2", "VALDCO", "SECTR1", "SECTR2"];
const HAZARDS: [&str; 3] = ["OBSTRN", "WRECKS", "UWTROC"];
const DEPTH_AREAS: [&str; 2] = ["DEPARE", "DRGARE"];

#[derive(Debug, Clone, Copy)]
struct DepthArea {
    id: FeatureId,
    extent: Extent,
    drval1: Option<f64>,
    drval2: Option<f64>,
}

/// Role-sorted feature lists of one cell
#[derive(Debug, Default)]
struct CellIndex {
    platforms: Vec<(FeatureId, Extent)>,
    sector_lights: Vec<(FeatureId, Extent)>,
    depth_areas: Vec<DepthArea>,
    consumers: Vec<FeatureId>,
}

fn is_sector_light(feature: &Feature) -> bool {
    feature.is_class("LIGHTS") && feature.has_value("SECTR1") && feature.has_value("SECTR2")
}

fn is_consumer(feature: &Feature) -> bool {
    match feature.class.as_str() {
        "LIGHTS" | "TOPMAR" | "DEPCNT" => true,
        "DEPARE" => feature.geometry == GeometryKind::Line,
        class => HAZARDS.contains(&class),
    }
}

impl CellIndex {
    fn build(arena: &FeatureArena, cell: CellId) -> Self {
        let mut index = CellIndex::default();
        for feature in arena.cell_features(cell) {
            let class = feature.class.as_str();
            if FLOATING_PLATFORMS.contains(&class) {
                index.platforms.push((feature.id, feature.extent));
            }
            if is_sector_light(feature) {
                index.sector_lights.push((feature.id, feature.extent));
            }
            if DEPTH_AREAS.contains(&class) && feature.geometry == GeometryKind::Area {
                index.depth_areas.push(DepthArea {
                    id: feature.id,
                    extent: feature.extent,
                    drval1: feature.attr_f64("DRVAL1"),
                    drval2: feature.attr_f64("DRVAL2"),
                });
            }
            if is_consumer(feature) {
                index.consumers.push(feature.id);
            }
        }
        index
    }

    fn first_platform(&self, feature: &Feature) -> Option<FeatureId> {
        self.platforms
            .iter()
            .find(|(_, extent)| extent.intersects(&feature.extent))
            .map(|(id, _)| *id)
    }

    fn first_co_located(&self, feature: &Feature) -> Option<FeatureId> {
        if !is_sector_light(feature) {
            return None;
        }
        self.sector_lights
            .iter()
            .find(|(id, extent)| *id != feature.id && extent.intersects(&feature.extent))
            .map(|(id, _)| *id)
    }

    /// Shallowest intersecting depth area; the earlier area wins ties
    fn least_depth_area(&self, feature: &Feature) -> Option<FeatureId> {
        let mut best: Option<(FeatureId, f64)> = None;
        for area in &self.depth_areas {
            let Some(drval1) = area.drval1 else { continue };
            if !area.extent.intersects(&feature.extent) {
                continue;
            }
            if best.map(|(_, d)| drval1 < d).unwrap_or(true) {
                best = Some((area.id, drval1));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Depth area bounded by a contour on its shallow side.
    ///
    /// The intersecting area whose `DRVAL2` is deepest without passing the
    /// contour value, so an exact `DRVAL2 == value` match always wins. The
    /// earlier area wins ties.
    fn underlying_depth_area(&self, feature: &Feature) -> Option<FeatureId> {
        let value = if feature.is_class("DEPCNT") {
            feature.attr_f64("VALDCO")?
        } else {
            feature.attr_f64("DRVAL1")?
        };
        let mut best: Option<(FeatureId, f64)> = None;
        for area in self.depth_areas.iter().filter(|area| area.id != feature.id) {
            let Some(drval2) = area.drval2 else { continue };
            if drval2 > value || !area.extent.intersects(&feature.extent) {
                continue;
            }
            if best.map(|(_, d)| drval2 > d).unwrap_or(true) {
                best = Some((area.id, drval2));
            }
        }
        best.map(|(id, _)| id)
    }

    fn links_for(&self, feature: &Feature) -> Vec<(TouchRole, Option<FeatureId>)> {
        match feature.class.as_str() {
            "LIGHTS" => vec![
                (TouchRole::Platform, self.first_platform(feature)),
                (TouchRole::CoLocatedLight, self.first_co_located(feature)),
            ],
            "TOPMAR" => vec![(TouchRole::Platform, self.first_platform(feature))],
            "DEPCNT" | "DEPARE" => vec![(
                TouchRole::UnderlyingDepthArea,
                self.underlying_depth_area(feature),
            )],
            _ => vec![(TouchRole::LeastDepthArea, self.least_depth_area(feature))],
        }
    }
}

/// @acp:summary "Attach touch links for every consumer in a cell"
///
/// Stale links are cleared when no candidate matches any more. Returns
/// the number of links set.
pub fn resolve_cell(arena: &mut FeatureArena, cell: CellId) -> usize {
    let index = CellIndex::build(arena, cell);

    let links: Vec<(FeatureId, TouchRole, Option<FeatureId>)> = {
        let shared: &FeatureArena = arena;
        index
            .consumers
            .par_iter()
            .filter_map(|&id| shared.get(id))
            .flat_map_iter(|feature| {
                index
                    .links_for(feature)
                    .into_iter()
                    .map(move |(role, target)| (feature.id, role, target))
            })
            .collect()
    };

    let mut attached = 0;
    for (id, role, target) in links {
        if target.is_some() {
            attached += 1;
        }
        arena.set_touch(id, role, target);
    }

    tracing::debug!(
        "Resolved {} touch links for {} consumers in cell {}",
        attached,
        index.consumers.len(),
        cell.0
    );
    attached
}

/// Resolve every cell in the arena
pub fn resolve_all(arena: &mut FeatureArena) -> usize {
    arena
        .cells()
        .into_iter()
        .map(|cell| resolve_cell(arena, cell))
        .sum()
}
