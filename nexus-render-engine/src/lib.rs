//! Living Nexus: a stylised 3D "data organism" of a city.
//!
//! Population clusters pulse as instanced cores, service resources glow as
//! wells, roads carry flow streams, and a selected starved core is threaded
//! to its nearest resource of the active analysis mode.

pub mod constants;
pub mod engine;
pub mod rpc;
pub mod tools;
