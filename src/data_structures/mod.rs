//! Scene data structures: models, textures and instances.
//!
//! - `model` contains vertices, materials, submeshes and the model aggregate
//! - `texture` contains the GPU texture wrapper
//! - `instance` holds the per-model world transformation

pub mod instance;
pub mod model;
pub mod texture;
