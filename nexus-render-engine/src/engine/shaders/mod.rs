//! Shader parameter contract.
//!
//! Five animation programs (pulse, glitch, flow gradient, radial well and
//! flicker thread), each a pure function of elapsed time and a small uniform
//! set. `programs` holds the CPU mirror (also driving the travelling marker), the WGSL
//! lives in `assets/shaders/`.

/// Pure Rust evaluation of every animation program.
pub mod programs;

/// Material types binding the program uniforms for wells, streams and the thread.
pub mod materials;
