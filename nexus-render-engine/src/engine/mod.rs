//! Living Nexus engine: data-to-geometry transforms, scene state and rendering.
//!
//! Leaf modules (`projection`, `data`, `shaders`) are pure; the builders
//! (`batching`, `wells`, `streams`, `matching`, `connection`) turn store
//! snapshots into descriptors and entities; `animation` drives every animated
//! primitive from one shared clock.

pub mod animation;
pub mod assets;
pub mod batching;
pub mod camera;
pub mod connection;
pub mod core;
pub mod data;
pub mod loading;
pub mod matching;
pub mod projection;
pub mod shaders;
pub mod state;
pub mod streams;
pub mod systems;
pub mod wells;
