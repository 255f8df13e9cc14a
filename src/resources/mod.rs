use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    data_structures::model,
    error::{AssetError, AssetErrorKind},
    resources::{obj::LoadOptions, texture::TextureLoader},
};

/**
 * This module contains all logic for loading meshes, materials and textures from external files.
 */
pub mod mtl;
pub mod obj;
pub mod texture;

/// Reads the next `N` whitespace separated tokens as floats.
pub(crate) fn parse_floats<'t, const N: usize>(
    tokens: &mut impl Iterator<Item = &'t str>,
) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

/// Hands every line of `reader` to `handle` with its 1-based number.
///
/// Decoding is lossy: bytes that are not UTF-8, such as a Latin-1 comment
/// written by an exporter, turn into U+FFFD instead of ending the read.
pub(crate) fn for_each_line<R: BufRead>(
    mut reader: R,
    path: &Path,
    mut handle: impl FnMut(usize, &str) -> Result<(), AssetError>,
) -> Result<(), AssetError> {
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| AssetError::io(path, e))?;
        if read == 0 {
            return Ok(());
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        handle(line_no, line.trim_end_matches(['\n', '\r']))?;
    }
}

pub fn load_string(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))
}

/// Loads an OBJ file and its material tables into a [`model::Model`].
///
/// `mtl_dir` is the directory that `mtllib` and `map_Kd` names are relative to.
pub fn load_model_obj(
    obj_path: impl AsRef<Path>,
    mtl_dir: impl AsRef<Path>,
    options: &LoadOptions,
    textures: &mut dyn TextureLoader,
) -> Result<model::Model, AssetError> {
    let obj_path = obj_path.as_ref();
    let file = File::open(obj_path).map_err(|e| AssetError::io(obj_path, e))?;
    let submeshes = obj::parse_obj(
        BufReader::new(file),
        obj_path,
        mtl_dir.as_ref(),
        options,
        textures,
    )?;

    let name = obj_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| obj_path.display().to_string());
    let model = model::Model::new(name, submeshes)
        .ok_or_else(|| AssetError::new(obj_path, AssetErrorKind::EmptyAsset))?;
    log::info!(
        "Loaded {} ({} submeshes, {} vertices)",
        obj_path.display(),
        model.submeshes().len(),
        model.vertex_count()
    );
    Ok(model)
}
