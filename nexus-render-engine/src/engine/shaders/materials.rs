use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    render::{
        mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError, VertexFormat,
        },
    },
};

use super::programs::{sanitize_colour, sanitize_uniform};

const WELL_SHADER_PATH: &str = "shaders/resource_well.wgsl";
const STREAM_SHADER_PATH: &str = "shaders/infrastructure_stream.wgsl";
const THREAD_SHADER_PATH: &str = "shaders/connection_thread.wgsl";

/// Per-vertex flow progress along a stream, `0` at the source end and `1` at the target.
pub const ATTRIBUTE_FLOW_PROGRESS: MeshVertexAttribute =
    MeshVertexAttribute::new("FlowProgress", 710_334_592, VertexFormat::Float32);

/// Per-vertex `index / vertex_count` along the connection tube.
pub const ATTRIBUTE_PATH_PROGRESS: MeshVertexAttribute =
    MeshVertexAttribute::new("PathProgress", 710_334_593, VertexFormat::Float32);

/// Registers the animated materials of the scene.
pub struct NexusMaterialsPlugin;

impl Plugin for NexusMaterialsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MaterialPlugin::<WellMaterial>::default(),
            MaterialPlugin::<StreamMaterial>::default(),
            MaterialPlugin::<ThreadMaterial>::default(),
        ));
    }
}

/// Animated materials expose their clock uniform through this trait so the
/// scene clock can drive them uniformly.
pub trait AnimatedMaterial: Material {
    fn set_time(&mut self, elapsed: f32);
}

#[derive(ShaderType, Debug, Clone, Copy, PartialEq)]
pub struct WellUniforms {
    pub colour: Vec4,
    pub time: f32,
    pub pulse_speed: f32,
    /// Fade radius in uv units.
    pub radius: f32,
    pub _padding: f32,
}

/// Concentric-ring disc of a resource well.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct WellMaterial {
    #[uniform(0)]
    pub uniforms: WellUniforms,
}

impl WellMaterial {
    pub fn new(colour: LinearRgba, pulse_speed: f32, uv_radius: f32) -> Self {
        Self {
            uniforms: WellUniforms {
                colour: sanitize_colour(colour).to_vec4(),
                time: 0.0,
                pulse_speed: sanitize_uniform(pulse_speed),
                radius: sanitize_uniform(uv_radius),
                _padding: 0.0,
            },
        }
    }
}

impl Material for WellMaterial {
    fn fragment_shader() -> ShaderRef {
        WELL_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        double_sided_without_depth_write(descriptor);
        Ok(())
    }
}

impl AnimatedMaterial for WellMaterial {
    fn set_time(&mut self, elapsed: f32) {
        self.uniforms.time = sanitize_uniform(elapsed);
    }
}

#[derive(ShaderType, Debug, Clone, Copy, PartialEq)]
pub struct StreamUniforms {
    pub colour: Vec4,
    pub time: f32,
    pub flow_speed: f32,
    pub brightness: f32,
    pub opacity: f32,
}

/// Flow-gradient ribbon of one road.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StreamMaterial {
    #[uniform(0)]
    pub uniforms: StreamUniforms,
}

impl StreamMaterial {
    pub fn new(colour: LinearRgba, flow_speed: f32, brightness: f32, opacity: f32) -> Self {
        Self {
            uniforms: StreamUniforms {
                colour: sanitize_colour(colour).to_vec4(),
                time: 0.0,
                flow_speed: sanitize_uniform(flow_speed),
                brightness: sanitize_uniform(brightness),
                opacity: sanitize_uniform(opacity),
            },
        }
    }
}

impl Material for StreamMaterial {
    fn vertex_shader() -> ShaderRef {
        STREAM_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        STREAM_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            ATTRIBUTE_FLOW_PROGRESS.at_shader_location(1),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        double_sided_without_depth_write(descriptor);
        Ok(())
    }
}

impl AnimatedMaterial for StreamMaterial {
    fn set_time(&mut self, elapsed: f32) {
        self.uniforms.time = sanitize_uniform(elapsed);
    }
}

#[derive(ShaderType, Debug, Clone, Copy, PartialEq)]
pub struct ThreadUniforms {
    pub colour: Vec4,
    pub time: f32,
    pub flicker_speed: f32,
    pub travel_rate: f32,
    pub base_alpha: f32,
}

/// Fragile flickering tube of the active connection.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ThreadMaterial {
    #[uniform(0)]
    pub uniforms: ThreadUniforms,
}

impl ThreadMaterial {
    pub fn new(colour: LinearRgba, flicker_speed: f32, travel_rate: f32, base_alpha: f32) -> Self {
        Self {
            uniforms: ThreadUniforms {
                colour: sanitize_colour(colour).to_vec4(),
                time: 0.0,
                flicker_speed: sanitize_uniform(flicker_speed),
                travel_rate: sanitize_uniform(travel_rate),
                base_alpha: sanitize_uniform(base_alpha),
            },
        }
    }
}

impl Material for ThreadMaterial {
    fn vertex_shader() -> ShaderRef {
        THREAD_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        THREAD_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            ATTRIBUTE_PATH_PROGRESS.at_shader_location(1),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        double_sided_without_depth_write(descriptor);
        Ok(())
    }
}

impl AnimatedMaterial for ThreadMaterial {
    fn set_time(&mut self, elapsed: f32) {
        self.uniforms.time = sanitize_uniform(elapsed);
    }
}

fn double_sided_without_depth_write(descriptor: &mut RenderPipelineDescriptor) {
    descriptor.primitive.cull_mode = None;
    if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
        depth_stencil.depth_write_enabled = false;
    }
}
