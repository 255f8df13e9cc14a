//! abduction-scene
//!
//! An animated night scene: a ship lowers itself over a field and beams a cow
//! up, then flies off again while the cow tumbles back down. The crate holds
//! the parts of that scene that have real logic in them and draws through a
//! pluggable renderer, wgpu by default.
//!
//! High-level modules
//! - `animation`: the two-body state machine advanced once per frame
//! - `camera`: fly camera and projection
//! - `config`: key-value configuration provider
//! - `context`: GPU context, window surface, texture loader and vertex upload
//! - `data_structures`: models, submeshes, materials, instances, GPU textures
//! - `error`: asset loading errors
//! - `flow`: window event loop driving the scene
//! - `pipelines`: wgpu pipelines for the lit scene and the sky backdrop
//! - `render`: per-frame draw list and the renderers that consume it
//! - `resources`: OBJ/MTL loading
//! - `scene`: the scene driver tying it all together
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
