use bevy::{
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};
use constants::render_settings::{
    ARC_ELEVATION_OFFSET, ARC_SAMPLE_DIVISIONS, THREAD_RADIAL_SEGMENTS, THREAD_RADIUS,
    THREAD_TUBULAR_SEGMENTS,
};

use crate::engine::shaders::materials::ATTRIBUTE_PATH_PROGRESS;
use crate::engine::state::scene_store::Connection;

/// Divisions of the arc-length lookup table used for uniform-speed sampling.
const ARC_LENGTH_DIVISIONS: usize = 200;
const TANGENT_DELTA: f32 = 0.0001;

/// Single-control-point arc from source to target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticArc {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticArc {
    /// Control point at the planar midpoint, raised `ARC_ELEVATION_OFFSET`
    /// above the higher endpoint. The offset lifts the control point, not the
    /// curve: for endpoints at equal height the apex sits half the offset up.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let control = Vec3::new(
            (from.x + to.x) * 0.5,
            (from.y + to.y) * 0.5,
            from.z.max(to.z) + ARC_ELEVATION_OFFSET,
        );
        Self {
            start: from,
            control,
            end: to,
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }

    /// `divisions + 1` evenly parameterised points, endpoints included.
    pub fn sample(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point_at(i as f32 / divisions as f32))
            .collect()
    }
}

/// Centripetal Catmull-Rom spline through a point sequence (open ends are
/// extrapolated from the first and last segments).
#[derive(Debug, Clone)]
pub struct CatmullRomPath {
    points: Vec<Vec3>,
    cumulative_lengths: Vec<f32>,
}

impl CatmullRomPath {
    pub fn new(points: Vec<Vec3>) -> Self {
        let mut path = Self {
            points,
            cumulative_lengths: Vec::new(),
        };
        path.cumulative_lengths = path.measure();
        path
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn length(&self) -> f32 {
        self.cumulative_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at curve parameter `t` in `[0, 1]`; passes through every input point.
    pub fn point(&self, t: f32) -> Vec3 {
        let count = self.points.len();
        match count {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let scaled = (count - 1) as f32 * t.clamp(0.0, 1.0);
        let mut segment = scaled.floor() as usize;
        let mut weight = scaled - segment as f32;
        if segment >= count - 1 {
            segment = count - 2;
            weight = 1.0;
        }

        let p1 = self.points[segment];
        let p2 = self.points[segment + 1];
        let p0 = if segment > 0 {
            self.points[segment - 1]
        } else {
            p1 * 2.0 - p2
        };
        let p3 = if segment + 2 < count {
            self.points[segment + 2]
        } else {
            p2 * 2.0 - p1
        };

        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let tangent1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let tangent2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        hermite(p1, p2, tangent1, tangent2, weight)
    }

    /// Point at arc-length fraction `u` in `[0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.parameter_for_fraction(u))
    }

    /// Unit tangent at arc-length fraction `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.parameter_for_fraction(u);
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or(Vec3::X)
    }

    fn measure(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        let mut total = 0.0;
        let mut last = self.point(0.0);
        lengths.push(0.0);
        for i in 1..=ARC_LENGTH_DIVISIONS {
            let current = self.point(i as f32 / ARC_LENGTH_DIVISIONS as f32);
            total += current.distance(last);
            lengths.push(total);
            last = current;
        }
        lengths
    }

    fn parameter_for_fraction(&self, u: f32) -> f32 {
        let total = self.length();
        if total <= 0.0 {
            return u.clamp(0.0, 1.0);
        }

        let target = u.clamp(0.0, 1.0) * total;
        let index = self
            .cumulative_lengths
            .partition_point(|&length| length < target)
            .min(ARC_LENGTH_DIVISIONS);
        if index == 0 {
            return 0.0;
        }

        let before = self.cumulative_lengths[index - 1];
        let after = self.cumulative_lengths[index];
        let segment = after - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        ((index - 1) as f32 + fraction) / ARC_LENGTH_DIVISIONS as f32
    }
}

fn hermite(p1: Vec3, p2: Vec3, t1: Vec3, t2: Vec3, w: f32) -> Vec3 {
    let c2 = p1 * -3.0 + p2 * 3.0 - t1 * 2.0 - t2;
    let c3 = p1 * 2.0 - p2 * 2.0 + t1 + t2;
    p1 + t1 * w + c2 * (w * w) + c3 * (w * w * w)
}

/// Open tube extruded along a path with parallel-transport frames.
#[derive(Debug, Clone, Default)]
pub struct TubeGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// `vertex_index / vertex_count` per vertex.
    pub path_progress: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TubeGeometry {
    pub fn extrude(
        path: &CatmullRomPath,
        tubular_segments: usize,
        radius: f32,
        radial_segments: usize,
    ) -> Self {
        let tubular_segments = tubular_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let frames = parallel_transport_frames(path, tubular_segments);

        let ring = radial_segments + 1;
        let vertex_count = (tubular_segments + 1) * ring;
        let mut tube = Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            path_progress: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(tubular_segments * radial_segments * 6),
        };

        for (i, (normal, binormal)) in frames.iter().enumerate() {
            let u = i as f32 / tubular_segments as f32;
            let centre = path.point_at(u);
            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * std::f32::consts::TAU;
                let direction = (*normal * -v.cos() + *binormal * v.sin()).normalize_or_zero();
                tube.positions.push((centre + direction * radius).to_array());
                tube.normals.push(direction.to_array());
                tube.uvs.push([u, j as f32 / radial_segments as f32]);
            }
        }

        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = (ring * (j - 1) + (i - 1)) as u32;
                let b = (ring * j + (i - 1)) as u32;
                let c = (ring * j + i) as u32;
                let d = (ring * (j - 1) + i) as u32;
                tube.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let count = tube.positions.len() as f32;
        tube.path_progress = (0..tube.positions.len())
            .map(|i| i as f32 / count)
            .collect();
        tube
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn into_mesh(self) -> Mesh {
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs)
        .with_inserted_attribute(ATTRIBUTE_PATH_PROGRESS, self.path_progress)
        .with_inserted_indices(Indices::U32(self.indices))
    }
}

/// Normal and binormal per tubular ring, rotated along with the tangent so the
/// tube does not twist.
fn parallel_transport_frames(path: &CatmullRomPath, segments: usize) -> Vec<(Vec3, Vec3)> {
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| path.tangent_at(i as f32 / segments as f32))
        .collect();

    let first = tangents[0];
    let abs = first.abs();
    let seed = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let side = first.cross(seed).normalize_or(Vec3::Y);
    let mut normal = first.cross(side);
    let mut frames = Vec::with_capacity(segments + 1);
    frames.push((normal, first.cross(normal)));

    for window in tangents.windows(2) {
        let (previous, current) = (window[0], window[1]);
        let axis = previous.cross(current);
        if axis.length() > f32::EPSILON {
            let theta = previous.dot(current).clamp(-1.0, 1.0).acos();
            normal = Quat::from_axis_angle(axis.normalize(), theta) * normal;
        }
        frames.push((normal, current.cross(normal)));
    }

    frames
}

/// Geometry derived from the active connection.
#[derive(Debug, Clone)]
pub struct ConnectionPath {
    pub arc: QuadraticArc,
    pub tube: TubeGeometry,
}

/// Arc, smoothed resample and tube for a connection.
pub fn build_connection_path(connection: &Connection) -> ConnectionPath {
    let arc = QuadraticArc::between(connection.from, connection.to);
    let smoothed = CatmullRomPath::new(arc.sample(ARC_SAMPLE_DIVISIONS));
    let tube = TubeGeometry::extrude(
        &smoothed,
        THREAD_TUBULAR_SEGMENTS,
        THREAD_RADIUS,
        THREAD_RADIAL_SEGMENTS,
    );
    ConnectionPath { arc, tube }
}
