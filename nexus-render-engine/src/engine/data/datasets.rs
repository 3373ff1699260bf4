use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::records::{InfrastructureRecords, PopulationId, PopulationRecord, StarvedRecord};

/// Complete dataset snapshot as a Bevy asset. Mirrors the JSON contract of the
/// data-loading collaborator.
#[derive(Asset, TypePath, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NexusDatasets {
    #[serde(default)]
    pub population: Vec<PopulationRecord>,
    #[serde(default)]
    pub infrastructure: InfrastructureRecords,
    /// Starved subset produced by the external scoring collaborator.
    #[serde(default)]
    pub starved: Vec<StarvedRecord>,
}

impl NexusDatasets {
    /// Authoritative lookup used to resolve weak population references.
    pub fn population_by_id(&self, id: &PopulationId) -> Option<&PopulationRecord> {
        self.population.iter().find(|record| &record.id == id)
    }

    /// Identities flagged as starved. Entries with `isStarved: false` are ignored.
    pub fn starved_set(&self) -> HashSet<PopulationId> {
        self.starved
            .iter()
            .filter(|entry| entry.is_starved)
            .map(|entry| entry.id.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
            && self.infrastructure.resource_count() == 0
            && self.infrastructure.roads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "population": [
            {"id": "a", "lon": 90.40, "lat": 23.80, "density": 45000},
            {"id": "b", "lon": 90.45, "lat": 23.85, "density": 12000}
        ],
        "infrastructure": {
            "roads": [{"from": [90.40, 23.80], "to": [90.42, 23.81], "connectivity": 0.8}],
            "markets": [{"lon": 90.41, "lat": 23.81, "radius": 1}]
        },
        "starved": [
            {"id": "a", "isStarved": true},
            {"id": "b", "isStarved": false}
        ]
    }"#;

    #[test]
    fn snapshot_parses_with_missing_collections() {
        let datasets: NexusDatasets = serde_json::from_str(SNAPSHOT).expect("snapshot parses");
        assert_eq!(datasets.population.len(), 2);
        assert!(datasets.infrastructure.hospitals.is_empty());
        assert!(datasets.infrastructure.transit.is_empty());
        assert!(!datasets.is_empty());
    }

    #[test]
    fn starved_set_only_contains_flagged_entries() {
        let datasets: NexusDatasets = serde_json::from_str(SNAPSHOT).expect("snapshot parses");
        let starved = datasets.starved_set();
        assert!(starved.contains(&PopulationId::new("a")));
        assert!(!starved.contains(&PopulationId::new("b")));
    }

    #[test]
    fn population_lookup_by_id() {
        let datasets: NexusDatasets = serde_json::from_str(SNAPSHOT).expect("snapshot parses");
        assert_eq!(
            datasets.population_by_id(&PopulationId::new("b")).map(|r| r.density),
            Some(12000.0)
        );
        assert!(datasets.population_by_id(&PopulationId::new("zz")).is_none());
        assert!(NexusDatasets::default().is_empty());
    }
}
