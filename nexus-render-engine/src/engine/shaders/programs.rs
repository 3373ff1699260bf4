//! CPU mirrors of the WGSL animation programs.
//!
//! Each function is pure in (elapsed time, uniforms); none reads frame index or
//! frame delta. The WGSL under `assets/shaders/` evaluates the same formulas.

use bevy::prelude::*;
use constants::procedural_shader::*;

/// GLSL/WGSL `smoothstep`, including reversed edges.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// WGSL `fract`: `x - floor(x)`, so negative phases wrap into `[0, 1)`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Replace NaN and infinities with 0 before a value reaches a uniform buffer.
pub fn sanitize_uniform(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn sanitize_colour(colour: LinearRgba) -> LinearRgba {
    LinearRgba::new(
        sanitize_uniform(colour.red),
        sanitize_uniform(colour.green),
        sanitize_uniform(colour.blue),
        sanitize_uniform(colour.alpha),
    )
}

// Pulse

pub fn pulse_scale(time: f32, pulse_rate: f32) -> f32 {
    (time * pulse_rate).sin() * PULSE_SCALE_AMPLITUDE + PULSE_SCALE_BASE
}

pub fn pulse_opacity(time: f32, pulse_rate: f32) -> f32 {
    (time * pulse_rate).sin() * PULSE_OPACITY_AMPLITUDE + PULSE_OPACITY_BASE
}

/// Secondary oscillation at twice the pulse rate. Non-starved cores get 1.
pub fn starved_flicker(time: f32, pulse_rate: f32, starved: bool) -> f32 {
    if !starved {
        return 1.0;
    }
    (time * pulse_rate * 2.0).sin() * STARVED_FLICKER_AMPLITUDE + STARVED_FLICKER_BASE
}

pub fn core_opacity(time: f32, pulse_rate: f32, starved: bool, base_opacity: f32) -> f32 {
    base_opacity * pulse_opacity(time, pulse_rate) * starved_flicker(time, pulse_rate, starved)
}

// Glitch

pub fn hash(p: Vec2) -> f32 {
    fract((p.dot(Vec2::from(HASH_DOT))).sin() * HASH_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchSample {
    pub colour: Vec3,
    pub alpha: f32,
    pub fractured: bool,
}

/// Glitch program evaluated at one surface point.
pub fn glitch(time: f32, position: Vec3, base_colour: Vec3, intensity: f32) -> GlitchSample {
    let displacement = hash(Vec2::new(time * 0.1, position.y)) * intensity;
    let shifted = Vec3::new(
        base_colour.x + displacement * 0.3,
        base_colour.y,
        base_colour.z - displacement * 0.2,
    );
    let fractured =
        hash(Vec2::new(position.x * 100.0, time * 0.05)) > GLITCH_FRACTURE_THRESHOLD;
    let instability = (time * 10.0 + position.y * 20.0).sin() * 0.2 + 0.8;

    GlitchSample {
        colour: if fractured { Vec3::X } else { shifted },
        alpha: instability * (0.7 + displacement * 0.3),
        fractured,
    }
}

// Flow gradient

pub fn flow_speed(connectivity: f32) -> f32 {
    0.2 + connectivity * 0.3
}

pub fn stream_thickness(connectivity: f32) -> f32 {
    connectivity * 3.0 + 1.0
}

/// Green, yellow or red band by connectivity.
pub fn stream_colour(connectivity: f32) -> LinearRgba {
    if connectivity > STREAM_GREEN_THRESHOLD {
        LinearRgba::rgb(0.1, 0.8, 0.5)
    } else if connectivity > STREAM_YELLOW_THRESHOLD {
        LinearRgba::rgb(0.9, 0.7, 0.2)
    } else {
        LinearRgba::rgb(0.9, 0.3, 0.3)
    }
}

pub fn flow_phase(progress: f32, time: f32, flow_speed: f32) -> f32 {
    fract(progress + time * flow_speed)
}

/// Bright band of the flow gradient, in `[0, 1]`.
pub fn flow_band(phase: f32) -> f32 {
    smoothstep(0.0, 0.2, phase) * smoothstep(1.0, 0.8, phase)
}

pub fn flow_alpha(band: f32, opacity: f32) -> f32 {
    opacity * (0.3 + band * 0.7)
}

// Radial well

pub fn well_rings(distance: f32, time: f32, pulse_speed: f32) -> f32 {
    (distance * WELL_RING_FREQUENCY - time * pulse_speed).sin() * 0.5 + 0.5
}

/// Alpha at `distance` from the disc centre in uv units. Zero at and beyond `radius`.
pub fn well_alpha(distance: f32, time: f32, pulse_speed: f32, radius: f32) -> f32 {
    smoothstep(radius, 0.0, distance) * well_rings(distance, time, pulse_speed) * 0.8
}

// Flicker thread

pub fn thread_phase(progress: f32, time: f32) -> f32 {
    fract(progress - time * THREAD_TRAVEL_RATE)
}

pub fn thread_highlight(phase: f32) -> f32 {
    smoothstep(0.0, 0.05, phase) * smoothstep(0.1, 0.05, phase)
}

pub fn thread_flicker(time: f32, flicker_speed: f32) -> f32 {
    (time * flicker_speed).sin() * 0.3 + 0.7
}

pub fn thread_alpha(progress: f32, time: f32, flicker_speed: f32) -> f32 {
    let highlight = thread_highlight(thread_phase(progress, time));
    (THREAD_BASE_ALPHA + highlight * (1.0 - THREAD_BASE_ALPHA)) * thread_flicker(time, flicker_speed)
}

/// Curve parameter of the travelling marker, looping every `1 / 0.1` seconds.
pub fn marker_parameter(time: f32) -> f32 {
    fract(time * THREAD_TRAVEL_RATE)
}
