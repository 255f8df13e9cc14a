use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use abduction_scene::{
    data_structures::model::Submesh,
    error::AssetError,
    resources::{
        obj::{LoadOptions, parse_obj},
        texture::TextureRegistry,
    },
};

pub(crate) fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub(crate) fn fixture(name: &str) -> PathBuf {
    fixtures().join(name)
}

/// Parses in-memory OBJ text; `mtllib` names resolve against the fixtures.
pub(crate) fn parse_text(text: &str, options: LoadOptions) -> Result<Vec<Submesh>, AssetError> {
    let mut textures = TextureRegistry::new();
    parse_obj(
        Cursor::new(text.as_bytes()),
        Path::new("inline.obj"),
        &fixtures(),
        &options,
        &mut textures,
    )
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

/// Like [`parse_text`] for input that is not valid UTF-8.
pub(crate) fn parse_bytes(bytes: &[u8], options: LoadOptions) -> Result<Vec<Submesh>, AssetError> {
    let mut textures = TextureRegistry::new();
    parse_obj(
        Cursor::new(bytes),
        Path::new("inline.obj"),
        &fixtures(),
        &options,
        &mut textures,
    )
}
