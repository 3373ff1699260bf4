use bevy::prelude::*;

use nexus_render_engine::engine::data::datasets::NexusDatasets;
use nexus_render_engine::engine::data::records::{
    HospitalRecord, InfrastructureRecords, MarketRecord, PopulationId, PopulationRecord,
    ResourceCategory, ResourceRef, StarvedRecord,
};
use nexus_render_engine::engine::matching::nearest::resolve_connection;
use nexus_render_engine::engine::state::analysis_mode::AnalysisMode;
use nexus_render_engine::engine::state::scene_store::{SceneAction, SceneStore};
use nexus_render_engine::engine::state::systems::{NexusSet, SceneStatePlugin};

const SHIPPED_DATASETS: &str = include_str!("../assets/nexus/dhaka.datasets.json");

fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(SceneStatePlugin)
        .add_systems(Update, resolve_connection.in_set(NexusSet::Derive));
    app
}

fn send(app: &mut App, action: SceneAction) {
    app.world_mut().send_event(action);
}

fn population(id: &str, lon: f64, lat: f64) -> PopulationRecord {
    PopulationRecord {
        id: PopulationId::new(id),
        lon,
        lat,
        density: 30_000.0,
        growth_rate: 0.0,
        ward: String::new(),
        area: String::new(),
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

fn starved(ids: &[&str]) -> Vec<StarvedRecord> {
    ids.iter()
        .map(|id| StarvedRecord {
            id: PopulationId::new(*id),
            is_starved: true,
        })
        .collect()
}

fn two_market_city() -> NexusDatasets {
    NexusDatasets {
        population: vec![
            population("E1", 90.40, 23.80),
            population("E2", 90.49, 23.89),
        ],
        infrastructure: InfrastructureRecords {
            markets: vec![market(90.41, 23.81), market(90.50, 23.90)],
            ..default()
        },
        starved: starved(&["E1", "E2"]),
    }
}

fn loaded_app(datasets: NexusDatasets, mode: AnalysisMode) -> App {
    let mut app = headless_app();
    send(&mut app, SceneAction::SetDatasets(Some(datasets)));
    send(&mut app, SceneAction::SetLoading(false));
    send(&mut app, SceneAction::SetAnalysisMode(mode));
    app.update();
    app
}

fn store(app: &App) -> &SceneStore {
    app.world().resource::<SceneStore>()
}

#[test]
fn starved_selection_links_to_the_closer_market() {
    let mut app = loaded_app(two_market_city(), AnalysisMode::Food);
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E1")));
    app.update();

    let connection = store(&app).connection().expect("connection");
    assert_eq!(connection.source, PopulationId::new("E1"));
    assert_eq!(
        connection.resource,
        ResourceRef {
            category: ResourceCategory::Food,
            index: 0,
        }
    );
    assert!(connection.distance_km > 0.0);
}

#[test]
fn all_mode_with_no_resources_has_no_connection() {
    let datasets = NexusDatasets {
        population: vec![population("E1", 90.40, 23.80)],
        infrastructure: InfrastructureRecords::default(),
        starved: starved(&["E1"]),
    };
    let mut app = loaded_app(datasets, AnalysisMode::All);
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E1")));
    app.update();

    assert_eq!(store(&app).selection(), Some(&PopulationId::new("E1")));
    assert!(store(&app).connection().is_none());
}

#[test]
fn only_the_last_selection_of_a_frame_is_connected() {
    let mut app = loaded_app(two_market_city(), AnalysisMode::Food);
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E1")));
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E2")));
    app.update();

    let connection = store(&app).connection().expect("connection");
    assert_eq!(connection.source, PopulationId::new("E2"));
    assert_eq!(connection.resource.index, 1);
}

#[test]
fn switching_mode_rematches_the_current_selection() {
    let mut city = two_market_city();
    city.infrastructure.hospitals = vec![HospitalRecord {
        id: None,
        lon: 90.401,
        lat: 23.80,
    }];
    let mut app = loaded_app(city, AnalysisMode::Food);
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E1")));
    app.update();
    assert_eq!(
        store(&app).connection().map(|c| c.resource.category),
        Some(ResourceCategory::Food)
    );

    send(&mut app, SceneAction::SetAnalysisMode(AnalysisMode::Housing));
    app.update();
    assert_eq!(
        store(&app).connection().map(|c| c.resource.category),
        Some(ResourceCategory::Health)
    );

    send(&mut app, SceneAction::SetAnalysisMode(AnalysisMode::Transportation));
    app.update();
    assert!(store(&app).connection().is_none());
}

#[test]
fn non_starved_selection_stays_unconnected_across_mode_switches() {
    let mut city = two_market_city();
    city.population.push(population("E3", 90.405, 23.805));
    city.infrastructure.hospitals = vec![HospitalRecord {
        id: None,
        lon: 90.406,
        lat: 23.805,
    }];
    let mut app = loaded_app(city, AnalysisMode::Food);

    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E3")));
    app.update();
    assert_eq!(store(&app).selection(), Some(&PopulationId::new("E3")));
    assert!(store(&app).connection().is_none());

    send(&mut app, SceneAction::SetAnalysisMode(AnalysisMode::Housing));
    app.update();
    assert_eq!(store(&app).analysis_mode(), AnalysisMode::Housing);
    assert!(store(&app).connection().is_none());
}

#[test]
fn clearing_the_selection_drops_the_connection() {
    let mut app = loaded_app(two_market_city(), AnalysisMode::Food);
    send(&mut app, SceneAction::SelectEntity(PopulationId::new("E1")));
    app.update();
    assert!(store(&app).connection().is_some());

    send(&mut app, SceneAction::ClearSelection);
    app.update();
    assert!(store(&app).selection().is_none());
    assert!(store(&app).connection().is_none());
}

#[test]
fn shipped_city_connects_starved_wards_only() {
    let datasets: NexusDatasets =
        serde_json::from_str(SHIPPED_DATASETS).expect("shipped datasets parse");
    let mut app = loaded_app(datasets, AnalysisMode::Food);

    send(&mut app, SceneAction::SelectEntity(PopulationId::new("gulshan-1")));
    app.update();
    assert!(store(&app).connection().is_none());

    send(&mut app, SceneAction::SelectEntity(PopulationId::new("pallabi")));
    app.update();
    let connection = store(&app).connection().expect("connection");
    assert_eq!(connection.resource.category, ResourceCategory::Food);
}
