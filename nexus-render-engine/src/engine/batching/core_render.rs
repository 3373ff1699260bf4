use bevy::{
    core_pipeline::core_3d::Transparent3d,
    ecs::system::{SystemParamItem, lifetimeless::*},
    pbr::{
        MeshPipeline, MeshPipelineKey, RenderMeshInstances, SetMeshBindGroup, SetMeshViewBindGroup,
    },
    prelude::*,
    render::{
        Render, RenderApp, RenderSet,
        extract_component::{ExtractComponent, ExtractComponentPlugin},
        extract_resource::{ExtractResource, ExtractResourcePlugin},
        mesh::{
            MeshVertexBufferLayoutRef, RenderMesh, RenderMeshBufferInfo, allocator::MeshAllocator,
        },
        render_asset::RenderAssets,
        render_phase::{
            AddRenderCommand, DrawFunctions, PhaseItem, PhaseItemExtraIndex, RenderCommand,
            RenderCommandResult, SetItemPipeline, TrackedRenderPass, ViewSortedRenderPhases,
        },
        render_resource::*,
        renderer::RenderDevice,
        sync_world::MainEntity,
        view::{ExtractedView, NoFrustumCulling},
    },
};
use bytemuck::{Pod, Zeroable};
use constants::procedural_shader::{
    CORE_COLOUR, CORE_OPACITY, HOUSING_CORE_COLOUR, HOUSING_GLITCH_INTENSITY,
};

use super::core_batch::{CoreBatch, CoreInstance, build_core_batch};
use crate::engine::animation::clock::{AnimationTarget, ClockRegistry, SceneClock};
use crate::engine::shaders::programs::sanitize_uniform;
use crate::engine::state::analysis_mode::AnalysisMode;
use crate::engine::state::scene_store::{SceneChange, SceneStore};

const POPULATION_CORES_SHADER_PATH: &str = "shaders/population_cores.wgsl";

pub struct CoreRenderPlugin;

impl Plugin for CoreRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CoreBatch>()
            .init_resource::<CoreShaderParams>()
            .add_plugins(ExtractComponentPlugin::<CoreInstances>::default())
            .add_plugins(ExtractResourcePlugin::<CoreShaderParams>::default());

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .add_render_command::<Transparent3d, DrawPopulationCores>()
            .init_resource::<SpecializedMeshPipelines<CorePipeline>>()
            .init_resource::<PreparedCoreBindGroup>()
            .add_systems(
                Render,
                (
                    prepare_core_bind_group.in_set(RenderSet::PrepareBindGroups),
                    queue_population_cores.in_set(RenderSet::QueueMeshes),
                    prepare_core_instance_buffers.in_set(RenderSet::PrepareResources),
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };
        render_app.init_resource::<CorePipeline>();
    }
}

/// Instance data carried by the single core entity. `generation` moves on
/// with every rebuild; the render world uploads a new buffer only then.
#[derive(Component, Deref, Clone, Default, ExtractComponent)]
pub struct CoreInstances {
    #[deref]
    pub instances: Vec<CoreInstance>,
    pub generation: u64,
}

impl CoreInstances {
    pub fn replace(&mut self, instances: Vec<CoreInstance>) {
        self.instances = instances;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Marker for the entity whose sphere mesh is instanced once per core.
#[derive(Component)]
pub struct CoreCarrier;

/// Uniforms shared by every core instance.
#[derive(Resource, Clone, Copy, Debug, PartialEq, ExtractResource)]
pub struct CoreShaderParams {
    pub colour: LinearRgba,
    pub time: f32,
    pub opacity: f32,
    pub glitch_intensity: f32,
    pub glitch_enabled: bool,
}

impl Default for CoreShaderParams {
    fn default() -> Self {
        Self::for_mode(AnalysisMode::default())
    }
}

impl CoreShaderParams {
    /// Housing mode swaps in the red glitch program.
    pub fn for_mode(mode: AnalysisMode) -> Self {
        let glitch_enabled = mode.glitches_cores();
        Self {
            colour: LinearRgba::from(if glitch_enabled {
                HOUSING_CORE_COLOUR
            } else {
                CORE_COLOUR
            }),
            time: 0.0,
            opacity: CORE_OPACITY,
            glitch_intensity: if glitch_enabled {
                HOUSING_GLITCH_INTENSITY
            } else {
                0.0
            },
            glitch_enabled,
        }
    }

    pub fn set_time(&mut self, elapsed: f32) {
        self.time = sanitize_uniform(elapsed);
    }

    fn to_uniform(self) -> CoreUniform {
        CoreUniform {
            colour: [
                sanitize_uniform(self.colour.red),
                sanitize_uniform(self.colour.green),
                sanitize_uniform(self.colour.blue),
                sanitize_uniform(self.colour.alpha),
            ],
            time: sanitize_uniform(self.time),
            opacity: sanitize_uniform(self.opacity),
            glitch_intensity: sanitize_uniform(self.glitch_intensity),
            glitch_enabled: if self.glitch_enabled { 1.0 } else { 0.0 },
        }
    }
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct CoreUniform {
    colour: [f32; 4],
    time: f32,
    opacity: f32,
    glitch_intensity: f32,
    glitch_enabled: f32,
}

/// Spawn the carrier entity once; its instances are filled on dataset change.
pub fn spawn_core_carrier(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut registry: ResMut<ClockRegistry>,
) {
    let carrier = commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(1.0).mesh().uv(32, 32))),
            Transform::default(),
            Visibility::default(),
            CoreInstances::default(),
            // Instances spread across the city, far outside the unit sphere's bounds.
            NoFrustumCulling,
            CoreCarrier,
        ))
        .id();
    registry.register(carrier, AnimationTarget::Cores);
}

/// Rebuild the whole batch when the dataset snapshot changes.
pub fn rebuild_core_batch(
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    mut batch: ResMut<CoreBatch>,
    mut carriers: Query<&mut CoreInstances, With<CoreCarrier>>,
) {
    let datasets_changed = changes
        .read()
        .fold(false, |changed, change| changed || *change == SceneChange::Datasets);
    if !datasets_changed {
        return;
    }

    *batch = match store.datasets() {
        Some(datasets) => build_core_batch(&datasets.population, store.starved()),
        None => CoreBatch::default(),
    };

    for mut instances in &mut carriers {
        instances.replace(batch.instances.clone());
    }

    info!("Population core batch rebuilt: {} instances", batch.len());
}

/// Switch colour and program when the analysis mode changes.
pub fn update_core_shader_params(
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    mut params: ResMut<CoreShaderParams>,
) {
    let mode_changed = changes
        .read()
        .fold(false, |changed, change| changed || *change == SceneChange::AnalysisMode);
    if !mode_changed {
        return;
    }

    let time = params.time;
    *params = CoreShaderParams::for_mode(store.analysis_mode());
    params.set_time(time);
}

#[derive(Component)]
struct CoreInstanceBuffer {
    buffer: Buffer,
    length: usize,
    generation: u64,
}

/// Whether the uploaded buffer (if any) is stale for `instances`.
fn needs_upload(instances: &CoreInstances, uploaded: Option<u64>) -> bool {
    !instances.is_empty() && uploaded != Some(instances.generation)
}

#[derive(Resource)]
struct CorePipeline {
    shader: Handle<Shader>,
    mesh_pipeline: MeshPipeline,
    params_layout: BindGroupLayout,
}

impl FromWorld for CorePipeline {
    fn from_world(world: &mut World) -> Self {
        let mesh_pipeline = world.resource::<MeshPipeline>();
        let render_device = world.resource::<RenderDevice>();

        Self {
            shader: world.load_asset(POPULATION_CORES_SHADER_PATH),
            mesh_pipeline: mesh_pipeline.clone(),
            params_layout: create_core_params_layout(render_device),
        }
    }
}

impl SpecializedMeshPipeline for CorePipeline {
    type Key = MeshPipelineKey;

    fn specialize(
        &self,
        key: Self::Key,
        layout: &MeshVertexBufferLayoutRef,
    ) -> Result<RenderPipelineDescriptor, SpecializedMeshPipelineError> {
        let mut descriptor = self.mesh_pipeline.specialize(key, layout)?;
        descriptor.label = Some("population_cores_pipeline".into());
        descriptor.vertex.shader = self.shader.clone();
        descriptor.vertex.buffers.push(VertexBufferLayout {
            array_stride: std::mem::size_of::<CoreInstance>() as u64,
            step_mode: VertexStepMode::Instance,
            attributes: vec![
                // Position + scale
                VertexAttribute {
                    format: VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 3,
                },
                // Pulse rate, starved flag, size
                VertexAttribute {
                    format: VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 4,
                },
            ],
        });

        if let Some(fragment) = descriptor.fragment.as_mut() {
            fragment.shader = self.shader.clone();
            for target in fragment.targets.iter_mut().flatten() {
                target.blend = Some(BlendState::PREMULTIPLIED_ALPHA_BLENDING);
            }
        }
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }

        descriptor.layout.push(self.params_layout.clone());

        Ok(descriptor)
    }
}

#[derive(Resource, Default)]
struct PreparedCoreBindGroup {
    bind_group: Option<BindGroup>,
}

fn prepare_core_instance_buffers(
    mut commands: Commands,
    query: Query<(Entity, &CoreInstances, Option<&CoreInstanceBuffer>)>,
    render_device: Res<RenderDevice>,
) {
    for (entity, instances, uploaded) in &query {
        if instances.is_empty() {
            if uploaded.is_some() {
                commands.entity(entity).remove::<CoreInstanceBuffer>();
            }
            continue;
        }
        if !needs_upload(instances, uploaded.map(|buffer| buffer.generation)) {
            continue;
        }

        let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("population_core_instance_buffer"),
            contents: bytemuck::cast_slice(instances.as_slice()),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        });
        commands.entity(entity).insert(CoreInstanceBuffer {
            buffer,
            length: instances.len(),
            generation: instances.generation,
        });
    }
}

fn prepare_core_bind_group(
    mut prepared: ResMut<PreparedCoreBindGroup>,
    render_device: Res<RenderDevice>,
    pipeline: Res<CorePipeline>,
    params: Res<CoreShaderParams>,
) {
    let params_buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
        label: Some("population_core_params"),
        contents: bytemuck::bytes_of(&params.to_uniform()),
        usage: BufferUsages::UNIFORM,
    });

    prepared.bind_group = Some(render_device.create_bind_group(
        "population_core_params_bind_group",
        &pipeline.params_layout,
        &[BindGroupEntry {
            binding: 0,
            resource: params_buffer.as_entire_binding(),
        }],
    ));
}

fn queue_population_cores(
    transparent_3d_draw_functions: Res<DrawFunctions<Transparent3d>>,
    core_pipeline: Res<CorePipeline>,
    mut pipelines: ResMut<SpecializedMeshPipelines<CorePipeline>>,
    pipeline_cache: Res<PipelineCache>,
    meshes: Res<RenderAssets<RenderMesh>>,
    render_mesh_instances: Res<RenderMeshInstances>,
    carriers: Query<(Entity, &MainEntity, &CoreInstances)>,
    mut transparent_render_phases: ResMut<ViewSortedRenderPhases<Transparent3d>>,
    views: Query<(&ExtractedView, &Msaa)>,
) {
    let draw_population_cores = transparent_3d_draw_functions
        .read()
        .id::<DrawPopulationCores>();

    for (view, msaa) in &views {
        let Some(transparent_phase) = transparent_render_phases.get_mut(&view.retained_view_entity)
        else {
            continue;
        };

        let msaa_key = MeshPipelineKey::from_msaa_samples(msaa.samples());
        let view_key = msaa_key | MeshPipelineKey::from_hdr(view.hdr);
        let rangefinder = view.rangefinder3d();

        for (entity, main_entity, instances) in &carriers {
            if instances.is_empty() {
                continue;
            }
            let Some(mesh_instance) = render_mesh_instances.render_mesh_queue_data(*main_entity)
            else {
                continue;
            };
            let Some(mesh) = meshes.get(mesh_instance.mesh_asset_id) else {
                continue;
            };

            let key =
                view_key | MeshPipelineKey::from_primitive_topology(mesh.primitive_topology());
            let pipeline = match pipelines.specialize(
                &pipeline_cache,
                &core_pipeline,
                key,
                &mesh.layout,
            ) {
                Ok(pipeline) => pipeline,
                Err(error) => {
                    error!("Failed to specialise population core pipeline: {}", error);
                    continue;
                }
            };

            transparent_phase.add(Transparent3d {
                entity: (entity, *main_entity),
                pipeline,
                draw_function: draw_population_cores,
                distance: rangefinder.distance_translation(&mesh_instance.translation),
                batch_range: 0..1,
                extra_index: PhaseItemExtraIndex::None,
                indexed: true,
            });
        }
    }
}

type DrawPopulationCores = (
    SetItemPipeline,
    SetMeshViewBindGroup<0>,
    SetMeshBindGroup<1>,
    SetCoreParamsBindGroup<2>,
    DrawCoreInstances,
);

struct SetCoreParamsBindGroup<const I: usize>;

impl<P: PhaseItem, const I: usize> RenderCommand<P> for SetCoreParamsBindGroup<I> {
    type Param = SRes<PreparedCoreBindGroup>;
    type ViewQuery = ();
    type ItemQuery = ();

    #[inline]
    fn render<'w>(
        _item: &P,
        _view: (),
        _entity: Option<()>,
        prepared: SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        let prepared = prepared.into_inner();
        if let Some(bind_group) = &prepared.bind_group {
            pass.set_bind_group(I, bind_group, &[]);
            RenderCommandResult::Success
        } else {
            RenderCommandResult::Failure("missing population core bind group")
        }
    }
}

struct DrawCoreInstances;

impl<P: PhaseItem> RenderCommand<P> for DrawCoreInstances {
    type Param = (
        SRes<RenderAssets<RenderMesh>>,
        SRes<RenderMeshInstances>,
        SRes<MeshAllocator>,
    );
    type ViewQuery = ();
    type ItemQuery = Read<CoreInstanceBuffer>;

    #[inline]
    fn render<'w>(
        item: &P,
        _view: (),
        instance_buffer: Option<&'w CoreInstanceBuffer>,
        (meshes, render_mesh_instances, mesh_allocator): SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        let mesh_allocator = mesh_allocator.into_inner();

        let Some(mesh_instance) = render_mesh_instances.render_mesh_queue_data(item.main_entity())
        else {
            return RenderCommandResult::Skip;
        };
        let Some(gpu_mesh) = meshes.into_inner().get(mesh_instance.mesh_asset_id) else {
            return RenderCommandResult::Skip;
        };
        let Some(instance_buffer) = instance_buffer else {
            return RenderCommandResult::Skip;
        };
        let Some(vertex_buffer_slice) =
            mesh_allocator.mesh_vertex_slice(&mesh_instance.mesh_asset_id)
        else {
            return RenderCommandResult::Skip;
        };

        pass.set_vertex_buffer(0, vertex_buffer_slice.buffer.slice(..));
        pass.set_vertex_buffer(1, instance_buffer.buffer.slice(..));

        match &gpu_mesh.buffer_info {
            RenderMeshBufferInfo::Indexed {
                index_format,
                count,
            } => {
                let Some(index_buffer_slice) =
                    mesh_allocator.mesh_index_slice(&mesh_instance.mesh_asset_id)
                else {
                    return RenderCommandResult::Skip;
                };

                pass.set_index_buffer(index_buffer_slice.buffer.slice(..), 0, *index_format);
                pass.draw_indexed(
                    index_buffer_slice.range.start..(index_buffer_slice.range.start + count),
                    vertex_buffer_slice.range.start as i32,
                    0..instance_buffer.length as u32,
                );
            }
            RenderMeshBufferInfo::NonIndexed => {
                pass.draw(vertex_buffer_slice.range, 0..instance_buffer.length as u32);
            }
        }
        RenderCommandResult::Success
    }
}

fn create_core_params_layout(render_device: &RenderDevice) -> BindGroupLayout {
    render_device.create_bind_group_layout(
        "population_core_params_layout",
        &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::datasets::NexusDatasets;
    use crate::engine::data::records::{PopulationId, PopulationRecord};
    use crate::engine::state::scene_store::SceneAction;
    use crate::engine::state::systems::{NexusSet, SceneStatePlugin};

    #[test]
    fn housing_mode_switches_to_the_glitch_program() {
        let housing = CoreShaderParams::for_mode(AnalysisMode::Housing);
        assert!(housing.glitch_enabled);
        assert_eq!(housing.glitch_intensity, HOUSING_GLITCH_INTENSITY);
        assert_eq!(housing.colour, LinearRgba::from(HOUSING_CORE_COLOUR));

        let food = CoreShaderParams::for_mode(AnalysisMode::Food);
        assert!(!food.glitch_enabled);
        assert_eq!(food.glitch_intensity, 0.0);
        assert_eq!(food.opacity, CORE_OPACITY);
    }

    #[test]
    fn uniform_never_carries_non_finite_values() {
        let mut params = CoreShaderParams::for_mode(AnalysisMode::All);
        params.time = f32::NAN;
        params.opacity = f32::INFINITY;
        let uniform = params.to_uniform();
        assert_eq!(uniform.time, 0.0);
        assert_eq!(uniform.opacity, 0.0);
        assert_eq!(std::mem::size_of::<CoreUniform>(), 32);
    }

    #[test]
    fn instance_buffer_is_uploaded_once_per_batch() {
        let mut instances = CoreInstances::default();
        assert!(!needs_upload(&instances, None));

        instances.replace(vec![CoreInstance::zeroed()]);
        assert!(needs_upload(&instances, None));
        assert!(!needs_upload(&instances, Some(instances.generation)));

        let uploaded = instances.generation;
        instances.replace(vec![CoreInstance::zeroed(); 2]);
        assert!(needs_upload(&instances, Some(uploaded)));
    }

    #[test]
    fn batch_generation_only_moves_on_dataset_changes() {
        let mut app = App::new();
        app.add_plugins(SceneStatePlugin)
            .init_resource::<CoreBatch>()
            .add_systems(Update, rebuild_core_batch.in_set(NexusSet::Derive));
        let carrier = app
            .world_mut()
            .spawn((CoreInstances::default(), CoreCarrier))
            .id();

        let datasets = NexusDatasets {
            population: vec![PopulationRecord {
                id: PopulationId::new("core-1"),
                lon: 90.41,
                lat: 23.81,
                density: 20_000.0,
                growth_rate: 0.0,
                ward: String::new(),
                area: String::new(),
            }],
            ..default()
        };
        app.world_mut()
            .send_event(SceneAction::SetDatasets(Some(datasets)));
        app.update();

        let instances = app.world().get::<CoreInstances>(carrier).expect("carrier");
        assert_eq!(instances.generation, 1);
        assert_eq!(instances.len(), 1);

        app.world_mut()
            .send_event(SceneAction::SetAnalysisMode(AnalysisMode::Housing));
        app.update();
        let instances = app.world().get::<CoreInstances>(carrier).expect("carrier");
        assert_eq!(instances.generation, 1);
    }
}
