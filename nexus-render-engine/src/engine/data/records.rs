use constants::category::{CategoryInfo, FOOD, HEALTH, TRANSIT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a population cluster as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulationId(pub String);

impl PopulationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One population cluster ("core").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    pub id: PopulationId,
    pub lon: f64,
    pub lat: f64,
    /// People per unit area.
    pub density: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub area: String,
}

/// Road segment between two `[lon, lat]` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadRecord {
    pub from: [f64; 2],
    pub to: [f64; 2],
    /// Connectivity score in `0..=1`.
    #[serde(default)]
    pub connectivity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub lon: f64,
    pub lat: f64,
    /// Service radius; scaled into the well radius.
    #[serde(default = "default_market_radius")]
    pub radius: f64,
}

fn default_market_radius() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub capacity: Option<f64>,
}

/// Infrastructure collections. Markets, hospitals and transit hubs are the
/// resource collections the matcher searches; roads only feed the streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRecords {
    #[serde(default)]
    pub roads: Vec<RoadRecord>,
    #[serde(default)]
    pub transit: Vec<TransitRecord>,
    #[serde(default)]
    pub markets: Vec<MarketRecord>,
    #[serde(default)]
    pub hospitals: Vec<HospitalRecord>,
}

/// Entry of the externally scored starved subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarvedRecord {
    pub id: PopulationId,
    #[serde(default = "default_starved")]
    pub is_starved: bool,
}

fn default_starved() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Food,
    Health,
    Transit,
}

impl ResourceCategory {
    pub fn info(self) -> &'static CategoryInfo {
        match self {
            Self::Food => &FOOD,
            Self::Health => &HEALTH,
            Self::Transit => &TRANSIT,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.info().name
    }
}

/// Identity of a resource node: its category and position in that collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub category: ResourceCategory,
    pub index: usize,
}

/// Category-specific magnitude field of a resource node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceMagnitude {
    MarketRadius(f64),
    Fixed,
    Capacity(Option<f64>),
}

/// Uniform read-only view over the three heterogeneous resource collections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceNode {
    pub reference: ResourceRef,
    pub lon: f64,
    pub lat: f64,
    pub magnitude: ResourceMagnitude,
}

impl InfrastructureRecords {
    /// Nodes of one category, in collection order.
    pub fn nodes(&self, category: ResourceCategory) -> Box<dyn Iterator<Item = ResourceNode> + '_> {
        let reference = move |index| ResourceRef { category, index };
        match category {
            ResourceCategory::Food => Box::new(self.markets.iter().enumerate().map(
                move |(index, m)| ResourceNode {
                    reference: reference(index),
                    lon: m.lon,
                    lat: m.lat,
                    magnitude: ResourceMagnitude::MarketRadius(m.radius),
                },
            )),
            ResourceCategory::Health => Box::new(self.hospitals.iter().enumerate().map(
                move |(index, h)| ResourceNode {
                    reference: reference(index),
                    lon: h.lon,
                    lat: h.lat,
                    magnitude: ResourceMagnitude::Fixed,
                },
            )),
            ResourceCategory::Transit => Box::new(self.transit.iter().enumerate().map(
                move |(index, t)| ResourceNode {
                    reference: reference(index),
                    lon: t.lon,
                    lat: t.lat,
                    magnitude: ResourceMagnitude::Capacity(t.capacity),
                },
            )),
        }
    }

    /// Look a node up by reference; `None` when the index is out of range.
    pub fn node(&self, reference: ResourceRef) -> Option<ResourceNode> {
        self.nodes(reference.category).nth(reference.index)
    }

    pub fn resource_count(&self) -> usize {
        self.markets.len() + self.hospitals.len() + self.transit.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_record_accepts_camel_case_keys() {
        let record: PopulationRecord = serde_json::from_str(
            r#"{"id":"pop-1","lon":90.4,"lat":23.8,"density":42000,"growthRate":0.03,"ward":"12","area":"Mirpur"}"#,
        )
        .expect("record parses");
        assert_eq!(record.id, PopulationId::new("pop-1"));
        assert_eq!(record.growth_rate, 0.03);
        assert_eq!(record.area, "Mirpur");
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let market: MarketRecord =
            serde_json::from_str(r#"{"lon":90.41,"lat":23.81}"#).expect("market parses");
        assert_eq!(market.radius, 1.0);

        let starved: StarvedRecord = serde_json::from_str(
            r#"{"id":"pop-7","position":{"x":1,"y":2,"z":3}}"#,
        )
        .expect("starved entry parses");
        assert!(starved.is_starved);
    }

    #[test]
    fn nodes_preserve_collection_order_and_identity() {
        let infrastructure = InfrastructureRecords {
            transit: vec![
                TransitRecord { id: None, lon: 90.1, lat: 23.1, capacity: Some(4000.0) },
                TransitRecord { id: None, lon: 90.2, lat: 23.2, capacity: None },
            ],
            ..Default::default()
        };

        let nodes: Vec<_> = infrastructure.nodes(ResourceCategory::Transit).collect();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].reference.index, 1);
        assert_eq!(nodes[1].magnitude, ResourceMagnitude::Capacity(None));
        assert_eq!(infrastructure.nodes(ResourceCategory::Food).count(), 0);
        assert!(infrastructure
            .node(ResourceRef { category: ResourceCategory::Transit, index: 5 })
            .is_none());
    }
}
