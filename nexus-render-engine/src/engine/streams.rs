use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use constants::coordinate_system::STREAM_ELEVATION;
use constants::procedural_shader::{DEFAULT_CONNECTIVITY, STREAM_OPACITY};

use crate::engine::animation::clock::{AnimationTarget, ClockRegistry};
use crate::engine::data::error::RecordError;
use crate::engine::data::records::RoadRecord;
use crate::engine::projection::try_project;
use crate::engine::shaders::materials::{ATTRIBUTE_FLOW_PROGRESS, StreamMaterial};
use crate::engine::shaders::programs::{flow_speed, stream_colour, stream_thickness};
use crate::engine::state::scene_store::{SceneChange, SceneStore};

/// One road as an animated flow stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub index: usize,
    pub from: Vec3,
    pub to: Vec3,
    pub connectivity: f32,
    pub colour: LinearRgba,
    pub thickness: f32,
    pub flow_speed: f32,
}

#[derive(Component)]
pub struct InfrastructureStream;

/// Missing or zero connectivity reads as the moderate default.
pub fn effective_connectivity(connectivity: Option<f32>) -> Result<f32, RecordError> {
    match connectivity {
        None => Ok(DEFAULT_CONNECTIVITY),
        Some(value) if value == 0.0 => Ok(DEFAULT_CONNECTIVITY),
        Some(value) if !value.is_finite() || value < 0.0 => Err(RecordError::InvalidMagnitude {
            field: "connectivity",
            value: value as f64,
        }),
        Some(value) => Ok(value),
    }
}

pub fn stream_descriptor(index: usize, road: &RoadRecord) -> Result<StreamDescriptor, RecordError> {
    let connectivity = effective_connectivity(road.connectivity)?;
    let from = try_project(road.from[0], road.from[1], STREAM_ELEVATION)?;
    let to = try_project(road.to[0], road.to[1], STREAM_ELEVATION)?;

    Ok(StreamDescriptor {
        index,
        from,
        to,
        connectivity,
        colour: stream_colour(connectivity),
        thickness: stream_thickness(connectivity),
        flow_speed: flow_speed(connectivity),
    })
}

/// Descriptors for every valid road, in input order.
pub fn build_streams(roads: &[RoadRecord]) -> Vec<StreamDescriptor> {
    roads
        .iter()
        .enumerate()
        .filter_map(|(index, road)| match stream_descriptor(index, road) {
            Ok(stream) => Some(stream),
            Err(error) => {
                warn!("Skipping road {}: {}", index, error);
                None
            }
        })
        .collect()
}

/// Flat quad along the road, `thickness` wide, with flow progress 0 at the
/// source end and 1 at the target end.
pub fn stream_ribbon(stream: &StreamDescriptor) -> Mesh {
    let direction = (stream.to - stream.from).truncate().normalize_or_zero();
    let half_width = Vec3::new(-direction.y, direction.x, 0.0) * (stream.thickness * 0.5);

    let positions = vec![
        (stream.from - half_width).to_array(),
        (stream.from + half_width).to_array(),
        (stream.to - half_width).to_array(),
        (stream.to + half_width).to_array(),
    ];
    let progress = vec![0.0_f32, 0.0, 1.0, 1.0];

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(ATTRIBUTE_FLOW_PROGRESS, progress)
    .with_inserted_indices(Indices::U32(vec![0, 2, 1, 1, 2, 3]))
}

/// Streams are shown in every mode, so only a dataset change rebuilds them.
pub fn rebuild_streams(
    mut commands: Commands,
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    existing: Query<Entity, With<InfrastructureStream>>,
    mut registry: ResMut<ClockRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StreamMaterial>>,
) {
    let datasets_changed = changes
        .read()
        .fold(false, |changed, change| changed || *change == SceneChange::Datasets);
    if !datasets_changed {
        return;
    }

    for entity in &existing {
        registry.deregister(entity);
        commands.entity(entity).despawn();
    }

    let Some(datasets) = store.datasets() else {
        return;
    };

    let streams = build_streams(&datasets.infrastructure.roads);
    for stream in &streams {
        let material = materials.add(StreamMaterial::new(
            stream.colour,
            stream.flow_speed,
            stream.connectivity,
            STREAM_OPACITY,
        ));
        let entity = commands
            .spawn((
                Mesh3d(meshes.add(stream_ribbon(stream))),
                MeshMaterial3d(material.clone()),
                Transform::default(),
                InfrastructureStream,
            ))
            .id();
        registry.register(entity, AnimationTarget::Stream(material));
    }

    info!("Infrastructure streams rebuilt: {} roads", streams.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn road(connectivity: Option<f32>) -> RoadRecord {
        RoadRecord {
            from: [90.40, 23.80],
            to: [90.41, 23.80],
            connectivity,
        }
    }

    #[test]
    fn connectivity_drives_styling() {
        let stream = stream_descriptor(0, &road(Some(0.8))).expect("valid road");
        assert_eq!(stream.colour, LinearRgba::rgb(0.1, 0.8, 0.5));
        assert!((stream.thickness - 3.4).abs() < 1e-5);
        assert!((stream.flow_speed - 0.44).abs() < 1e-5);
        assert_eq!(stream.from.z, STREAM_ELEVATION);
        assert_eq!(stream.to.z, STREAM_ELEVATION);
    }

    #[test]
    fn missing_connectivity_uses_default() {
        let stream = stream_descriptor(0, &road(None)).expect("valid road");
        assert_eq!(stream.connectivity, DEFAULT_CONNECTIVITY);
        // 0.5 is not above the yellow threshold
        assert_eq!(stream.colour, LinearRgba::rgb(0.9, 0.3, 0.3));

        let zero = stream_descriptor(0, &road(Some(0.0))).expect("valid road");
        assert_eq!(zero.connectivity, DEFAULT_CONNECTIVITY);
    }

    #[test]
    fn invalid_roads_are_skipped() {
        let mut broken = road(Some(0.6));
        broken.to = [f64::NAN, 23.8];
        let streams = build_streams(&[road(Some(0.6)), broken, road(Some(f32::INFINITY))]);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].index, 0);
    }

    #[test]
    fn ribbon_spans_the_road_with_flow_progress() {
        let stream = stream_descriptor(0, &road(Some(1.0))).expect("valid road");
        let mesh = stream_ribbon(&stream);
        assert_eq!(mesh.count_vertices(), 4);

        let Some(VertexAttributeValues::Float32(progress)) =
            mesh.attribute(ATTRIBUTE_FLOW_PROGRESS)
        else {
            panic!("flow progress attribute missing");
        };
        assert_eq!(progress, &vec![0.0, 0.0, 1.0, 1.0]);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        // Road runs along +x, so the ribbon is offset in y by half its width.
        assert!((positions[1][1] - positions[0][1] - stream.thickness).abs() < 1e-3);
    }
}
