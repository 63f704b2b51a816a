//! Engine data: geometry, texture registrations and per-frame uniforms.
//!
//! - `mesh` holds the quad geometry and the pixel/NDC conversion
//! - `texture` holds the (image, sampler name, GPU handle) registrations
//! - `uniforms` holds the per-frame shader inputs and the surface view

pub mod mesh;
pub mod texture;
pub mod uniforms;
