use bevy::prelude::*;
use constants::coordinate_system::{CONNECTION_TARGET_ELEVATION, UNITS_PER_KILOMETRE};

use crate::engine::batching::core_batch::core_instance;
use crate::engine::data::records::ResourceNode;
use crate::engine::projection::{planar_distance_squared, project};
use crate::engine::state::scene_store::{Connection, SceneAction, SceneChange, SceneStore};

/// Closest candidate found by a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceMatch {
    pub node: ResourceNode,
    pub distance_squared: f32,
}

/// Linear scan over planar squared distance. Strict `<` keeps the first
/// encountered candidate on ties.
pub fn find_nearest(
    origin: Vec3,
    candidates: impl IntoIterator<Item = ResourceNode>,
) -> Option<ResourceMatch> {
    let mut best: Option<ResourceMatch> = None;

    for node in candidates {
        if !node.lon.is_finite() || !node.lat.is_finite() {
            continue;
        }
        let position = project(node.lon, node.lat, 0.0);
        let distance_squared = planar_distance_squared(origin, position);
        if best.is_none_or(|b| distance_squared < b.distance_squared) {
            best = Some(ResourceMatch {
                node,
                distance_squared,
            });
        }
    }

    best
}

/// The connection the current store state calls for, or `None` when there
/// is no selection, the selection is unknown or not starved, or no candidate
/// of the active mode exists.
pub fn match_connection(store: &SceneStore) -> Option<Connection> {
    let id = store.selection()?;
    let datasets = store.datasets()?;
    let entity = datasets.population_by_id(id)?;
    if !store.is_starved(id) {
        return None;
    }
    // The thread starts at the hovering core; records that cannot be drawn never connect.
    let origin = core_instance(entity, true).ok()?.translation();
    let candidates = store
        .analysis_mode()
        .candidate_categories()
        .iter()
        .flat_map(|&category| datasets.infrastructure.nodes(category));
    let nearest = find_nearest(origin, candidates)?;

    Some(Connection {
        source: id.clone(),
        from: origin,
        to: project(nearest.node.lon, nearest.node.lat, CONNECTION_TARGET_ELEVATION),
        distance_km: nearest.distance_squared.sqrt() / UNITS_PER_KILOMETRE,
        resource: nearest.node.reference,
    })
}

/// Recompute the connection once per frame after selection, mode or dataset
/// changes have settled. The store is only touched when the result differs.
pub fn resolve_connection(
    mut events: ParamSet<(EventReader<SceneChange>, EventWriter<SceneChange>)>,
    mut store: ResMut<SceneStore>,
) {
    let triggered = events
        .p0()
        .read()
        .fold(false, |triggered, change| triggered || change.triggers_matching());
    if !triggered {
        return;
    }

    let connection = match_connection(&store);
    if store.connection() == connection.as_ref() {
        return;
    }

    if let Some(connection) = &connection {
        info!(
            "Connected {} to {} {} ({:.2} km)",
            connection.source,
            connection.resource.category.as_str(),
            connection.resource.index,
            connection.distance_km
        );
    }

    let change = store.dispatch(SceneAction::SetConnection(connection));
    events.p1().write(change);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::datasets::NexusDatasets;
    use crate::engine::data::records::{
        HospitalRecord, InfrastructureRecords, MarketRecord, PopulationId, PopulationRecord,
        ResourceCategory, ResourceMagnitude, ResourceRef, StarvedRecord, TransitRecord,
    };
    use crate::engine::state::analysis_mode::AnalysisMode;

    fn node(index: usize, lon: f64, lat: f64) -> ResourceNode {
        ResourceNode {
            reference: ResourceRef {
                category: ResourceCategory::Food,
                index,
            },
            lon,
            lat,
            magnitude: ResourceMagnitude::MarketRadius(1.0),
        }
    }

    fn market(lon: f64, lat: f64) -> MarketRecord {
        MarketRecord {
            id: None,
            lon,
            lat,
            radius: 1.0,
        }
    }

    fn datasets(starved: bool) -> NexusDatasets {
        NexusDatasets {
            population: vec![PopulationRecord {
                id: PopulationId::new("P1"),
                lon: 90.40,
                lat: 23.80,
                density: 40_000.0,
                growth_rate: 0.0,
                ward: String::new(),
                area: String::new(),
            }],
            infrastructure: InfrastructureRecords {
                roads: Vec::new(),
                markets: vec![market(90.41, 23.80), market(90.405, 23.80)],
                hospitals: vec![HospitalRecord {
                    id: None,
                    lon: 90.40,
                    lat: 23.802,
                }],
                transit: vec![TransitRecord {
                    id: None,
                    lon: 90.40,
                    lat: 23.79,
                    capacity: None,
                }],
            },
            starved: vec![StarvedRecord {
                id: PopulationId::new("P1"),
                is_starved: starved,
            }],
        }
    }

    fn store_with(datasets: NexusDatasets, mode: AnalysisMode) -> SceneStore {
        let mut store = SceneStore::new(mode);
        store.dispatch(SceneAction::SetDatasets(Some(datasets)));
        store.dispatch(SceneAction::SelectEntity(PopulationId::new("P1")));
        store
    }

    #[test]
    fn nearest_is_minimal_over_all_candidates() {
        let origin = project(90.40, 23.80, 0.0);
        let candidates = vec![
            node(0, 90.43, 23.81),
            node(1, 90.401, 23.799),
            node(2, 90.38, 23.80),
            node(3, 90.402, 23.803),
        ];
        let best = find_nearest(origin, candidates.clone()).expect("match");
        assert_eq!(best.node.reference.index, 1);

        for candidate in candidates {
            let d = planar_distance_squared(origin, project(candidate.lon, candidate.lat, 0.0));
            assert!(best.distance_squared <= d);
        }
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let origin = project(90.40, 23.80, 0.0);
        let best = find_nearest(
            origin,
            vec![node(0, 90.41, 23.80), node(1, 90.41, 23.80)],
        )
        .expect("match");
        assert_eq!(best.node.reference.index, 0);
    }

    #[test]
    fn empty_candidates_give_no_match() {
        assert_eq!(find_nearest(Vec3::ZERO, Vec::new()), None);
    }

    #[test]
    fn starved_selection_connects_to_nearest_market() {
        let store = store_with(datasets(true), AnalysisMode::Food);
        let connection = match_connection(&store).expect("connection");

        assert_eq!(connection.source, PopulationId::new("P1"));
        assert_eq!(
            connection.resource,
            ResourceRef {
                category: ResourceCategory::Food,
                index: 1
            }
        );
        assert_eq!(connection.to.z, CONNECTION_TARGET_ELEVATION);
        // density 40000 gives size 1.6, so the core hovers at 800
        assert!((connection.from.z - 800.0).abs() < 1e-3);
        assert!((connection.distance_km - 0.5).abs() < 1e-3);
    }

    #[test]
    fn distance_matches_planar_projection() {
        let store = store_with(datasets(true), AnalysisMode::Food);
        let connection = match_connection(&store).expect("connection");
        let expected = planar_distance_squared(connection.from, connection.to).sqrt() / 1000.0;
        assert!((connection.distance_km - expected).abs() < 1e-4);
    }

    #[test]
    fn all_mode_searches_every_category() {
        let store = store_with(datasets(true), AnalysisMode::All);
        let connection = match_connection(&store).expect("connection");
        assert_eq!(connection.resource.category, ResourceCategory::Health);
        assert!((connection.distance_km - 0.2).abs() < 1e-3);
    }

    #[test]
    fn not_starved_clears_connection() {
        let store = store_with(datasets(false), AnalysisMode::Food);
        assert_eq!(match_connection(&store), None);
    }

    #[test]
    fn unknown_selection_clears_connection() {
        let mut store = store_with(datasets(true), AnalysisMode::Food);
        store.dispatch(SceneAction::SelectEntity(PopulationId::new("missing")));
        assert_eq!(match_connection(&store), None);
    }

    #[test]
    fn empty_candidate_collection_clears_connection() {
        let mut data = datasets(true);
        data.infrastructure.markets.clear();
        let store = store_with(data, AnalysisMode::Food);
        assert_eq!(match_connection(&store), None);
    }

    #[test]
    fn matching_does_not_depend_on_loading_state() {
        let mut store = store_with(datasets(true), AnalysisMode::Food);
        store.dispatch(SceneAction::SetLoading(true));
        assert!(match_connection(&store).is_some());
    }
}
