//! Viewport camera for the city scene.
//!
//! Z-up orbit controls (right-drag rotate, wheel zoom, WASD pan) with smooth
//! interpolation; every pose change is published to the scene store.

/// Orbit state resource, pose maths and the controller system.
pub mod viewport_camera;
