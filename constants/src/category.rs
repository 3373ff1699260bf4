use bevy::color::LinearRgba;

/// Display properties shared by every resource of one category.
pub struct CategoryInfo {
    pub name: &'static str,
    pub colour: LinearRgba,
    pub pulse_speed: f32,
}

pub const FOOD: CategoryInfo = CategoryInfo {
    name: "food",
    colour: LinearRgba::rgb(0.2, 0.9, 0.4),
    pulse_speed: 1.5,
};

pub const HEALTH: CategoryInfo = CategoryInfo {
    name: "health",
    colour: LinearRgba::rgb(0.3, 0.8, 0.9),
    pulse_speed: 1.0,
};

pub const TRANSIT: CategoryInfo = CategoryInfo {
    name: "transit",
    colour: LinearRgba::rgb(0.7, 0.3, 1.0),
    pulse_speed: 2.0,
};

/// Health wells have no magnitude field, so every hospital uses this radius.
pub const HEALTH_WELL_RADIUS: f32 = 80.0;

/// Multiplier from a market's service radius to its well radius.
pub const FOOD_RADIUS_MULTIPLIER: f32 = 50.0;

/// Capacity assumed for transit hubs that report none (or zero).
pub const DEFAULT_TRANSIT_CAPACITY: f64 = 1000.0;

/// Multiplier applied to `sqrt(capacity)` for transit wells.
pub const TRANSIT_RADIUS_MULTIPLIER: f32 = 0.5;
