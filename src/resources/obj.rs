//! Streaming Wavefront OBJ parsing.
//!
//! The file is read line by line. Positions, texture coordinates and normals
//! are collected into tables that only live for the duration of one parse;
//! every face immediately resolves its references against those tables and
//! pushes concrete vertices into a [`SubmeshBuilder`]. `usemtl` closes the
//! current vertex group and opens a new one bound to the named material.
//!
//! Policies:
//! - texture coordinates are stored with a top-left origin (`v = 1 - v_raw`)
//!   unless [`LoadOptions::flip_v`] is turned off,
//! - faces must have exactly three references, anything else is rejected,
//! - references are 1-based, negative ones count back from the end of the
//!   table, and any reference outside its table fails the whole asset,
//! - a missing material table is tolerated, materials then use defaults.

use std::{
    collections::HashMap,
    io::BufRead,
    path::{Path, PathBuf},
};

use crate::{
    data_structures::model::{Material, MaterialBinding, ModelVertex, Submesh, SubmeshBuilder},
    error::{AssetError, AssetErrorKind},
    resources::{
        for_each_line,
        mtl::{MaterialTable, load_mtl},
        parse_floats,
        texture::TextureLoader,
    },
};

#[derive(Copy, Clone, Debug)]
pub struct LoadOptions {
    /// Store `1 - v` instead of `v` for texture coordinates.
    pub flip_v: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { flip_v: true }
    }
}

/// One `p[/t[/n]]` face reference before it is resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct FaceRef {
    position: i64,
    tex_coord: Option<i64>,
    normal: Option<i64>,
}

fn parse_index(raw: &str) -> Result<Option<i64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| format!("`{raw}` is not a vertex index"))
}

fn parse_face_ref(token: &str) -> Result<FaceRef, String> {
    let mut parts = token.split('/');
    let position = parts
        .next()
        .map(parse_index)
        .transpose()?
        .flatten()
        .ok_or_else(|| format!("`{token}` has no position index"))?;
    let tex_coord = parts.next().map(parse_index).transpose()?.flatten();
    let normal = parts.next().map(parse_index).transpose()?.flatten();
    if parts.next().is_some() {
        return Err(format!("`{token}` has more than three components"));
    }
    Ok(FaceRef {
        position,
        tex_coord,
        normal,
    })
}

/// Maps a 1-based (or negative, end-relative) OBJ index onto a table slot.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let slot = match index {
        0 => return None,
        i if i > 0 => (i - 1) as usize,
        i => len.checked_sub(i.unsigned_abs() as usize)?,
    };
    (slot < len).then_some(slot)
}

fn lookup<T: Copy>(table: &[T], index: i64, what: &str) -> Result<T, String> {
    resolve_index(index, table.len())
        .map(|slot| table[slot])
        .ok_or_else(|| {
            format!(
                "{what} index {index} is out of range (only {} defined)",
                table.len()
            )
        })
}

struct ObjParser<'a> {
    path: &'a Path,
    mtl_dir: &'a Path,
    options: LoadOptions,
    textures: &'a mut dyn TextureLoader,
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    materials: MaterialTable,
    bindings: HashMap<String, MaterialBinding>,
    builder: SubmeshBuilder,
}

impl<'a> ObjParser<'a> {
    fn malformed(&self, line: usize, reason: impl Into<String>) -> AssetError {
        AssetError::geometry(self.path, line, reason)
    }

    fn line(&mut self, line_no: usize, line: &str) -> Result<(), AssetError> {
        let mut tokens = line.split_whitespace();
        let Some(prefix) = tokens.next() else {
            return Ok(());
        };
        match prefix {
            "v" => {
                let position = parse_floats::<3>(&mut tokens)
                    .ok_or_else(|| self.malformed(line_no, "`v` needs three numbers"))?;
                self.positions.push(position);
            }
            "vt" => {
                let u = parse_floats::<1>(&mut tokens)
                    .ok_or_else(|| self.malformed(line_no, "`vt` needs at least one number"))?[0];
                let v = match tokens.next() {
                    Some(raw) => raw
                        .parse::<f32>()
                        .map_err(|_| self.malformed(line_no, format!("`{raw}` is not a number")))?,
                    None => 0.0,
                };
                let v = if self.options.flip_v { 1.0 - v } else { v };
                self.tex_coords.push([u, v]);
            }
            "vn" => {
                let normal = parse_floats::<3>(&mut tokens)
                    .ok_or_else(|| self.malformed(line_no, "`vn` needs three numbers"))?;
                self.normals.push(normal);
            }
            "f" => self.face(line_no, tokens.collect())?,
            "mtllib" => {
                for file_name in tokens {
                    let mtl_path = self.mtl_dir.join(file_name);
                    load_mtl(&mtl_path, &mut self.materials)?;
                }
                self.bindings.clear();
            }
            "usemtl" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| self.malformed(line_no, "`usemtl` without a name"))?;
                let binding = self.binding(name);
                self.builder.bind(binding);
            }
            _ => (),
        }
        Ok(())
    }

    fn face(&mut self, line_no: usize, refs: Vec<&str>) -> Result<(), AssetError> {
        if refs.len() != 3 {
            return Err(self.malformed(
                line_no,
                format!("faces must be triangles, found {} references", refs.len()),
            ));
        }
        let mut triangle = [ModelVertex::default(); 3];
        for (vertex, token) in triangle.iter_mut().zip(refs) {
            *vertex = self
                .vertex(token)
                .map_err(|reason| self.malformed(line_no, reason))?;
        }
        self.builder.push_triangle(triangle);
        Ok(())
    }

    fn vertex(&self, token: &str) -> Result<ModelVertex, String> {
        let face_ref = parse_face_ref(token)?;
        let position = lookup(&self.positions, face_ref.position, "position")?;
        let tex_coords = match face_ref.tex_coord {
            Some(index) => lookup(&self.tex_coords, index, "texture coordinate")?,
            None => [0.0; 2],
        };
        let normal = match face_ref.normal {
            Some(index) => lookup(&self.normals, index, "normal")?,
            None => [0.0; 3],
        };
        Ok(ModelVertex {
            position,
            tex_coords,
            normal,
        })
    }

    /// Resolves a material name once per parse; repeated activations reuse
    /// the snapshot and texture handle.
    fn binding(&mut self, name: &str) -> MaterialBinding {
        if let Some(binding) = self.bindings.get(name) {
            return binding.clone();
        }
        let material = match self.materials.get(name) {
            Some(material) => *material,
            None => {
                log::warn!(
                    "{} activates unknown material `{}`; using defaults.",
                    self.path.display(),
                    name
                );
                Material::default()
            }
        };
        let texture_path: Option<PathBuf> =
            self.materials.texture(name).map(|file| self.mtl_dir.join(file));
        let texture = texture_path
            .as_deref()
            .and_then(|path| match self.textures.load_texture(path) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!(
                        "Texture {} of material `{}` could not be loaded: {}",
                        path.display(),
                        name,
                        e
                    );
                    None
                }
            });
        let binding = MaterialBinding {
            name: Some(name.to_string()),
            material,
            texture,
            texture_path,
        };
        self.bindings.insert(name.to_string(), binding.clone());
        binding
    }
}

/// Parses OBJ text into submeshes.
///
/// `path` is only used to label errors; `mtl_dir` is where `mtllib` and
/// `map_Kd` file names are resolved.
pub fn parse_obj<R: BufRead>(
    reader: R,
    path: &Path,
    mtl_dir: &Path,
    options: &LoadOptions,
    textures: &mut dyn TextureLoader,
) -> Result<Vec<Submesh>, AssetError> {
    let mut parser = ObjParser {
        path,
        mtl_dir,
        options: *options,
        textures,
        positions: Vec::new(),
        tex_coords: Vec::new(),
        normals: Vec::new(),
        materials: MaterialTable::new(),
        bindings: HashMap::new(),
        builder: SubmeshBuilder::new(),
    };

    for_each_line(reader, path, |line_no, line| parser.line(line_no, line))?;

    let submeshes = parser.builder.finish();
    if submeshes.is_empty() {
        return Err(AssetError::new(path, AssetErrorKind::EmptyAsset));
    }
    Ok(submeshes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_refs_accept_all_obj_shapes() {
        assert_eq!(
            parse_face_ref("3/2/1"),
            Ok(FaceRef {
                position: 3,
                tex_coord: Some(2),
                normal: Some(1)
            })
        );
        assert_eq!(
            parse_face_ref("4//7"),
            Ok(FaceRef {
                position: 4,
                tex_coord: None,
                normal: Some(7)
            })
        );
        assert_eq!(
            parse_face_ref("5"),
            Ok(FaceRef {
                position: 5,
                tex_coord: None,
                normal: None
            })
        );
        assert!(parse_face_ref("/1/1").is_err());
        assert!(parse_face_ref("1/x/1").is_err());
        assert!(parse_face_ref("1/1/1/1").is_err());
    }

    #[test]
    fn indices_resolve_from_both_ends() {
        assert_eq!(resolve_index(1, 10), Some(0));
        assert_eq!(resolve_index(10, 10), Some(9));
        assert_eq!(resolve_index(11, 10), None);
        assert_eq!(resolve_index(0, 10), None);
        assert_eq!(resolve_index(-1, 10), Some(9));
        assert_eq!(resolve_index(-10, 10), Some(0));
        assert_eq!(resolve_index(-11, 10), None);
        assert_eq!(resolve_index(1, 0), None);
    }
}
