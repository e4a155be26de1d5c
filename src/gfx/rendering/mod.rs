// src/gfx/rendering/mod.rs
//! Frame rendering
//!
//! CPU rasterisation of the current scene from the fixed studio camera into
//! RGBA PNG files.

pub mod camera;
pub mod rasterizer;

// Re-export main types
pub use camera::StudioCamera;
pub use rasterizer::SilhouetteRenderer;
