//! Render pipelines and the bind group layouts they are built against.
pub mod basic;
pub mod sky;
